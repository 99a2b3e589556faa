//! Forward propagation and credit assignment over the layer chain.
//!
//! ```text
//!  event ─► hidden[0] ─► hidden[1] ─► … ─► hidden[N-1] ─► output
//!              ▲            ▲                  ▲             │
//!              └── record ──┴── record ── … ───┴── record ───┘   (activity)
//!
//!  label:  reward hidden[0..k) · punish hidden[k] · reward/punish output
//! ```
//!
//! The functions here are free of model state so that learning and inference
//! share exactly the same propagation code.

use odesa_core::prelude::*;
use tracing::debug;

/// Result of one forward pass
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ForwardPass {
    pub winners: Vec<Winner>,
    pub prediction: Prediction,
}

/// What the classifier received from the label branch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ClassifierFeedback {
    Untouched,
    Rewarded,
    Punished,
}

/// Learning calls issued for one labelled event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CreditOutcome {
    /// Hidden stage that received `punish`, if any
    pub punished_stage: Option<usize>,
    pub classifier: ClassifierFeedback,
}

/// Feeds `event` through every hidden stage and then the classifier.
///
/// Stage 0 sees the raw event and each later stage the winner of the stage
/// before it. With an empty chain the classifier sees the raw event.
pub(crate) fn forward_pass<O>(
    hidden: &mut [Box<dyn HiddenLayer>],
    output: &mut O,
    event: Event,
) -> LayerResult<ForwardPass>
where
    O: OutputLayer + ?Sized,
{
    let ts = event.ts;
    let mut winners: Vec<Winner> = vec![None; hidden.len()];

    for (index, layer) in hidden.iter_mut().enumerate() {
        let input = match index {
            0 => StageInput::raw(event),
            _ => StageInput::upstream(winners[index - 1], ts),
        };
        winners[index] = layer.forward(input)?;
    }

    let input = match winners.last() {
        Some(last) => StageInput::upstream(*last, ts),
        None => StageInput::raw(event),
    };
    let prediction = output.forward(input)?;

    Ok(ForwardPass {
        winners,
        prediction,
    })
}

/// Activity bookkeeping, run on every learning step whatever the label.
///
/// A firing classifier marks the last stage; then, walking from the last stage
/// down to the second, each stage that fired marks the stage before it.
pub(crate) fn record_activity(
    hidden: &mut [Box<dyn HiddenLayer>],
    winners: &[Winner],
    output_winner: Winner,
    ts: Timestamp,
) -> LayerResult<()> {
    if output_winner.is_some() {
        if let Some(last) = hidden.last_mut() {
            last.record(ts)?;
        }
    }

    for index in (1..hidden.len()).rev() {
        if winners[index].is_some() {
            hidden[index - 1].record(ts)?;
        }
    }

    Ok(())
}

/// Reward/punish for a labelled event on a non-empty chain.
///
/// Stages are rewarded in order until the first silent one, which is punished
/// and ends the scan. The classifier is then rewarded on a correct class,
/// punished on a wrong one, and punished with no winner when it stayed silent
/// although the last stage fired.
pub(crate) fn assign_label_credit<O>(
    hidden: &mut [Box<dyn HiddenLayer>],
    output: &mut O,
    pass: &ForwardPass,
    label: ClassId,
    ts: Timestamp,
) -> LayerResult<CreditOutcome>
where
    O: OutputLayer + ?Sized,
{
    let mut punished_stage = None;

    for (index, (layer, winner)) in hidden.iter_mut().zip(&pass.winners).enumerate() {
        match winner {
            Some(winner) => layer.reward(*winner)?,
            None => {
                layer.punish(ts)?;
                debug!(stage = index, ts, "hidden layer punished: no winner");
                punished_stage = Some(index);
                break;
            }
        }
    }

    let last_fired = pass.winners.last().copied().flatten().is_some();
    let prediction = pass.prediction;

    let classifier = match prediction.winner {
        Some(winner) if prediction.class == Some(label) => {
            output.reward(winner)?;
            ClassifierFeedback::Rewarded
        }
        Some(winner) => {
            output.punish(Some(winner), label)?;
            debug!(
                winner,
                label,
                predicted = ?prediction.class,
                "output layer punished: wrong class"
            );
            ClassifierFeedback::Punished
        }
        None if last_fired => {
            output.punish(None, label)?;
            debug!(label, "output layer punished: silent after upstream activity");
            ClassifierFeedback::Punished
        }
        None => ClassifierFeedback::Untouched,
    };

    Ok(CreditOutcome {
        punished_stage,
        classifier,
    })
}

/// Reward/punish for a labelled event when the classifier reads raw events.
///
/// There is no upstream stage to blame, so anything but a correct winner
/// punishes the classifier.
pub(crate) fn assign_single_credit<O>(
    output: &mut O,
    prediction: Prediction,
    label: ClassId,
) -> LayerResult<ClassifierFeedback>
where
    O: OutputLayer + ?Sized,
{
    match prediction.winner {
        Some(winner) if prediction.class == Some(label) => {
            output.reward(winner)?;
            Ok(ClassifierFeedback::Rewarded)
        }
        winner => {
            output.punish(winner, label)?;
            debug!(?winner, label, "output layer punished");
            Ok(ClassifierFeedback::Punished)
        }
    }
}
