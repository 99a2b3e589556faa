//! The ODESA model: a chain of hidden layers feeding an output classifier.

use odesa_core::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::chain::{self, ClassifierFeedback, CreditOutcome, ForwardPass};
use crate::config::ModelConfig;
use crate::error::{ModelError, ModelResult};
use crate::stats::ModelStats;

/// What the model emits for one event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelOutput {
    /// Winner of every hidden layer, in chain order
    pub winners: Vec<Winner>,
    /// Winner of the classifier
    pub output_winner: Winner,
    /// Predicted class; meaningless when `output_winner` is `None`
    pub output_class: Option<ClassId>,
}

impl ModelOutput {
    fn new(winners: Vec<Winner>, prediction: Prediction) -> Self {
        Self {
            winners,
            output_winner: prediction.winner,
            output_class: prediction.class,
        }
    }

    /// Predicted class, only when the classifier fired
    pub fn predicted(&self) -> Option<ClassId> {
        self.output_winner.and(self.output_class)
    }
}

/// Layered ODESA model
///
/// Hidden layers are appended at configuration time; the output layer must be
/// attached before any event is processed.
pub struct Model {
    pub(crate) config: ModelConfig,
    pub(crate) hidden: Vec<Box<dyn HiddenLayer>>,
    pub(crate) output: Option<Box<dyn OutputLayer>>,
    stats: ModelStats,
}

impl Model {
    /// Creates an empty model
    pub fn new() -> Self {
        Self {
            config: ModelConfig::default(),
            hidden: Vec::new(),
            output: None,
            stats: ModelStats::default(),
        }
    }

    /// Creates an empty model with a specific configuration
    pub fn with_config(config: ModelConfig) -> ModelResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::new()
        })
    }

    /// Appends a hidden layer at the end of the chain
    pub fn add_hidden_layer<L>(&mut self, layer: L)
    where
        L: HiddenLayer + 'static,
    {
        debug!(index = self.hidden.len(), ?layer, "hidden layer added");
        self.hidden.push(Box::new(layer));
    }

    /// Attaches the output layer, returning the one it replaces
    pub fn add_output_layer<O>(&mut self, layer: O) -> Option<Box<dyn OutputLayer>>
    where
        O: OutputLayer + 'static,
    {
        debug!(?layer, "output layer attached");
        let previous = self.output.replace(Box::new(layer));
        if previous.is_some() {
            warn!("output layer replaced");
        }
        previous
    }

    pub fn num_hidden_layers(&self) -> usize {
        self.hidden.len()
    }

    pub fn hidden_layer(&self, index: usize) -> Option<&dyn HiddenLayer> {
        self.hidden.get(index).map(|layer| &**layer)
    }

    pub fn output_layer(&self) -> Option<&dyn OutputLayer> {
        self.output.as_deref()
    }

    pub fn has_output_layer(&self) -> bool {
        self.output.is_some()
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Running statistics
    pub fn stats(&self) -> ModelStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = ModelStats::default();
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // LEARNING
    // ═══════════════════════════════════════════════════════════════════════════

    /// Processes one event and learns from it.
    ///
    /// Every call propagates activity credit upstream; labelled events also
    /// reward or punish the layers. Without hidden layers this is
    /// [`forward_single`](Self::forward_single).
    pub fn forward(&mut self, event: Event, label: Label) -> ModelResult<ModelOutput> {
        if self.hidden.is_empty() {
            return self.forward_single(event, label);
        }

        let output = attached(&mut self.output)?;
        let pass = chain::forward_pass(&mut self.hidden, &mut *output, event)?;

        chain::record_activity(&mut self.hidden, &pass.winners, pass.prediction.winner, event.ts)?;

        let credit = match label.class() {
            Some(class) => Some(chain::assign_label_credit(
                &mut self.hidden,
                output,
                &pass,
                class,
                event.ts,
            )?),
            None => None,
        };

        self.track(&pass, label, credit);
        Ok(ModelOutput::new(pass.winners, pass.prediction))
    }

    /// Learning step that feeds the raw event straight to the classifier.
    ///
    /// Hidden layers, if any, are neither fed nor credited; `winners` is all
    /// `None`.
    pub fn forward_single(&mut self, event: Event, label: Label) -> ModelResult<ModelOutput> {
        let output = attached(&mut self.output)?;
        let pass = chain::forward_pass(&mut [], &mut *output, event)?;

        let credit = match label.class() {
            Some(class) => Some(CreditOutcome {
                punished_stage: None,
                classifier: chain::assign_single_credit(output, pass.prediction, class)?,
            }),
            None => None,
        };

        self.track(&pass, label, credit);
        Ok(ModelOutput::new(vec![None; self.hidden.len()], pass.prediction))
    }

    /// Validates a raw `[x, y, ts, p]` record and raw label, then learns.
    pub fn forward_raw(&mut self, record: &[f64], label: i64) -> ModelResult<ModelOutput> {
        let event = Event::from_slice(record)?;
        let label = Label::from_raw(label)?;
        self.forward(event, label)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // INFERENCE
    // ═══════════════════════════════════════════════════════════════════════════

    /// Propagates one event without any learning call.
    pub fn infer(&mut self, event: Event) -> ModelResult<ModelOutput> {
        if self.hidden.is_empty() {
            return self.infer_single(event);
        }

        let output = attached(&mut self.output)?;
        let pass = chain::forward_pass(&mut self.hidden, output, event)?;

        self.track(&pass, Label::Unlabelled, None);
        Ok(ModelOutput::new(pass.winners, pass.prediction))
    }

    /// Feeds the raw event straight to the classifier without learning.
    pub fn infer_single(&mut self, event: Event) -> ModelResult<ModelOutput> {
        let output = attached(&mut self.output)?;
        let pass = chain::forward_pass(&mut [], output, event)?;

        self.track(&pass, Label::Unlabelled, None);
        Ok(ModelOutput::new(vec![None; self.hidden.len()], pass.prediction))
    }

    /// Validates a raw `[x, y, ts, p]` record, then infers.
    pub fn infer_raw(&mut self, record: &[f64]) -> ModelResult<ModelOutput> {
        let event = Event::from_slice(record)?;
        self.infer(event)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // RESET
    // ═══════════════════════════════════════════════════════════════════════════

    /// Clears the temporal state of every layer, hidden layers first.
    ///
    /// Learned weights and thresholds are untouched.
    pub fn reset(&mut self) -> ModelResult<()> {
        let output = attached(&mut self.output)?;

        for layer in &mut self.hidden {
            layer.reset_time()?;
        }
        output.reset_time()?;

        if self.config.track_stats {
            self.stats.resets += 1;
        }
        debug!(hidden_layers = self.hidden.len(), "temporal state reset");
        Ok(())
    }

    fn track(&mut self, pass: &ForwardPass, label: Label, credit: Option<CreditOutcome>) {
        trace!(
            winners = ?pass.winners,
            output_winner = ?pass.prediction.winner,
            output_class = ?pass.prediction.class,
            label = label.to_raw(),
            "event processed"
        );

        if !self.config.track_stats {
            return;
        }

        let stats = &mut self.stats;
        stats.events += 1;
        if pass.prediction.is_fired() {
            stats.output_fired += 1;
        }

        if let Some(class) = label.class() {
            stats.labelled_events += 1;
            if pass.prediction.is_fired() && pass.prediction.class == Some(class) {
                stats.correct += 1;
            }
        }

        if let Some(credit) = credit {
            if credit.punished_stage.is_some() {
                stats.hidden_punishments += 1;
            }
            if credit.classifier == ClassifierFeedback::Punished {
                stats.classifier_punishments += 1;
            }
        }

        let interval = self.config.progress_interval;
        if interval > 0 && stats.events % interval == 0 {
            info!(
                events = stats.events,
                labelled = stats.labelled_events,
                accuracy = ?stats.accuracy(),
                firing_rate = ?stats.firing_rate(),
                "progress"
            );
        }
    }
}

/// The attached output layer, or `MissingOutputLayer`
fn attached(
    slot: &mut Option<Box<dyn OutputLayer>>,
) -> ModelResult<&mut (dyn OutputLayer + 'static)> {
    match slot {
        Some(layer) => Ok(&mut **layer),
        None => Err(ModelError::MissingOutputLayer),
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("config", &self.config)
            .field("hidden_layers", &self.hidden)
            .field("output_layer", &self.output)
            .field("stats", &self.stats)
            .finish()
    }
}
