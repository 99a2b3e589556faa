//! Test layers shared by the integration tests.
//!
//! `Scripted*` layers replay a fixed list of winners and log every call into a
//! shared [`CallLog`]. `Learning*` layers carry real (toy) parameter buffers so
//! that determinism and persistence can be checked byte for byte.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use odesa_orchestration::prelude::*;
use serde::{Deserialize, Serialize};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ═══════════════════════════════════════════════════════════════════════════════
// CALL LOG
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Hidden(usize),
    Output,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Forward(Target, StageInput),
    Reward(Target, usize),
    PunishHidden(usize, Timestamp),
    PunishOutput(Winner, ClassId),
    Record(usize, Timestamp),
    ResetTime(Target),
    SaveWeights(Target, PathBuf),
    SaveThresh(Target, PathBuf),
    LoadWeights(Target, PathBuf),
    LoadThresh(Target, PathBuf),
}

impl Call {
    pub fn is_learning(&self) -> bool {
        matches!(
            self,
            Call::Reward(..) | Call::PunishHidden(..) | Call::PunishOutput(..) | Call::Record(..)
        )
    }

    pub fn is_reward_or_punish(&self) -> bool {
        matches!(self, Call::Reward(..) | Call::PunishHidden(..) | Call::PunishOutput(..))
    }
}

#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<Call>>>);

impl CallLog {
    pub fn push(&self, call: Call) {
        self.0.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().unwrap().clone()
    }

    pub fn learning_calls(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_learning).collect()
    }

    pub fn reward_or_punish_calls(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_reward_or_punish).collect()
    }

    pub fn forwards(&self) -> Vec<(Target, StageInput)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Forward(target, input) => Some((target, input)),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SCRIPTED LAYERS
// ═══════════════════════════════════════════════════════════════════════════════

/// Hidden layer that replays `script`, then keeps returning `fallback`
#[derive(Debug)]
pub struct ScriptedHidden {
    pub index: usize,
    pub log: CallLog,
    pub script: VecDeque<Winner>,
    pub fallback: Winner,
}

impl ScriptedHidden {
    pub fn new(index: usize, log: &CallLog, script: &[Winner]) -> Self {
        Self {
            index,
            log: log.clone(),
            script: script.iter().copied().collect(),
            fallback: None,
        }
    }

    /// Always emits `winner`
    pub fn constant(index: usize, log: &CallLog, winner: Winner) -> Self {
        Self {
            fallback: winner,
            ..Self::new(index, log, &[])
        }
    }

    fn target(&self) -> Target {
        Target::Hidden(self.index)
    }
}

impl Persistent for ScriptedHidden {
    fn save_weights(&self, path: &Path) -> LayerResult<()> {
        self.log.push(Call::SaveWeights(self.target(), path.to_path_buf()));
        std::fs::write(path, format!("hidden {} weights", self.index))?;
        Ok(())
    }

    fn load_weights(&mut self, path: &Path) -> LayerResult<()> {
        self.log.push(Call::LoadWeights(self.target(), path.to_path_buf()));
        std::fs::read(path)?;
        Ok(())
    }

    fn save_thresh(&self, path: &Path) -> LayerResult<()> {
        self.log.push(Call::SaveThresh(self.target(), path.to_path_buf()));
        std::fs::write(path, format!("hidden {} thresh", self.index))?;
        Ok(())
    }

    fn load_thresh(&mut self, path: &Path) -> LayerResult<()> {
        self.log.push(Call::LoadThresh(self.target(), path.to_path_buf()));
        std::fs::read(path)?;
        Ok(())
    }
}

impl HiddenLayer for ScriptedHidden {
    fn forward(&mut self, input: StageInput) -> LayerResult<Winner> {
        self.log.push(Call::Forward(self.target(), input));
        Ok(self.script.pop_front().unwrap_or(self.fallback))
    }

    fn reward(&mut self, winner: usize) -> LayerResult<()> {
        self.log.push(Call::Reward(self.target(), winner));
        Ok(())
    }

    fn punish(&mut self, ts: Timestamp) -> LayerResult<()> {
        self.log.push(Call::PunishHidden(self.index, ts));
        Ok(())
    }

    fn record(&mut self, ts: Timestamp) -> LayerResult<()> {
        self.log.push(Call::Record(self.index, ts));
        Ok(())
    }

    fn reset_time(&mut self) -> LayerResult<()> {
        self.log.push(Call::ResetTime(self.target()));
        Ok(())
    }
}

/// Classifier that replays `script`, then keeps returning `fallback`
#[derive(Debug)]
pub struct ScriptedOutput {
    pub log: CallLog,
    pub script: VecDeque<Prediction>,
    pub fallback: Prediction,
}

impl ScriptedOutput {
    pub fn new(log: &CallLog, script: &[Prediction]) -> Self {
        Self {
            log: log.clone(),
            script: script.iter().copied().collect(),
            fallback: Prediction::silent(),
        }
    }

    pub fn constant(log: &CallLog, prediction: Prediction) -> Self {
        Self {
            fallback: prediction,
            ..Self::new(log, &[])
        }
    }
}

impl Persistent for ScriptedOutput {
    fn save_weights(&self, path: &Path) -> LayerResult<()> {
        self.log.push(Call::SaveWeights(Target::Output, path.to_path_buf()));
        std::fs::write(path, "output weights")?;
        Ok(())
    }

    fn load_weights(&mut self, path: &Path) -> LayerResult<()> {
        self.log.push(Call::LoadWeights(Target::Output, path.to_path_buf()));
        std::fs::read(path)?;
        Ok(())
    }

    fn save_thresh(&self, path: &Path) -> LayerResult<()> {
        self.log.push(Call::SaveThresh(Target::Output, path.to_path_buf()));
        std::fs::write(path, "output thresh")?;
        Ok(())
    }

    fn load_thresh(&mut self, path: &Path) -> LayerResult<()> {
        self.log.push(Call::LoadThresh(Target::Output, path.to_path_buf()));
        std::fs::read(path)?;
        Ok(())
    }
}

impl OutputLayer for ScriptedOutput {
    fn forward(&mut self, input: StageInput) -> LayerResult<Prediction> {
        self.log.push(Call::Forward(Target::Output, input));
        Ok(self.script.pop_front().unwrap_or(self.fallback))
    }

    fn reward(&mut self, winner: usize) -> LayerResult<()> {
        self.log.push(Call::Reward(Target::Output, winner));
        Ok(())
    }

    fn punish(&mut self, winner: Winner, label: ClassId) -> LayerResult<()> {
        self.log.push(Call::PunishOutput(winner, label));
        Ok(())
    }

    fn reset_time(&mut self) -> LayerResult<()> {
        self.log.push(Call::ResetTime(Target::Output));
        Ok(())
    }
}

/// Model with scripted hidden layers and a scripted classifier
pub fn scripted_model(
    log: &CallLog,
    hidden: &[&[Winner]],
    output: &[Prediction],
) -> Model {
    let mut model = Model::new();
    for (index, script) in hidden.iter().enumerate() {
        model.add_hidden_layer(ScriptedHidden::new(index, log, script));
    }
    model.add_output_layer(ScriptedOutput::new(log, output));
    model
}

// ═══════════════════════════════════════════════════════════════════════════════
// LEARNING LAYERS
// ═══════════════════════════════════════════════════════════════════════════════

/// Toy parameter buffers: one weight and one threshold per neuron
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Params {
    pub weights: Vec<f64>,
    pub thresh: Vec<f64>,
}

impl Params {
    pub fn new(neurons: usize, seed: u64) -> Self {
        let weights = (0..neurons)
            .map(|i| 0.5 + ((seed + i as u64 * 7) % 11) as f64 / 10.0)
            .collect();
        Self {
            weights,
            thresh: vec![1.0; neurons],
        }
    }

    /// Winner for a scalar drive, decayed by the time since the last input
    fn winner(&self, drive: f64, decay: f64) -> Winner {
        self.weights
            .iter()
            .zip(&self.thresh)
            .map(|(w, t)| w * drive * decay - t)
            .enumerate()
            .filter(|(_, score)| *score >= 0.0)
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }
}

fn drive(input: &StageInput) -> f64 {
    let (x, y, _, p) = input.legacy_fields();
    ((x + 2 * y + 1).rem_euclid(9) + 1) as f64 * p.abs().max(1.0)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> LayerResult<()> {
    let bytes = serde_json::to_vec(value).map_err(|e| LayerError::Serialization(e.to_string()))?;
    std::fs::write(path, bytes)?;
    Ok(())
}

fn read_json(path: &Path, expected: usize) -> LayerResult<Vec<f64>> {
    let bytes = std::fs::read(path)?;
    let values: Vec<f64> =
        serde_json::from_slice(&bytes).map_err(|e| LayerError::Serialization(e.to_string()))?;
    if values.len() != expected {
        return Err(LayerError::ShapeMismatch {
            expected: format!("[{expected}]"),
            actual: format!("[{}]", values.len()),
        });
    }
    Ok(values)
}

/// Hidden layer with a decaying "time surface" and adaptive thresholds
#[derive(Debug, Clone, PartialEq)]
pub struct LearningHidden {
    pub params: Params,
    pub last_ts: Option<Timestamp>,
    pub records: usize,
}

impl LearningHidden {
    pub fn new(neurons: usize, seed: u64) -> Self {
        Self {
            params: Params::new(neurons, seed),
            last_ts: None,
            records: 0,
        }
    }
}

fn decay(last_ts: Option<Timestamp>, ts: Timestamp) -> f64 {
    match last_ts {
        Some(last) => 1.0 / (1.0 + (ts - last).abs() / 100.0),
        None => 1.0,
    }
}

impl Persistent for LearningHidden {
    fn save_weights(&self, path: &Path) -> LayerResult<()> {
        write_json(path, &self.params.weights)
    }

    fn load_weights(&mut self, path: &Path) -> LayerResult<()> {
        self.params.weights = read_json(path, self.params.weights.len())?;
        Ok(())
    }

    fn save_thresh(&self, path: &Path) -> LayerResult<()> {
        write_json(path, &self.params.thresh)
    }

    fn load_thresh(&mut self, path: &Path) -> LayerResult<()> {
        self.params.thresh = read_json(path, self.params.thresh.len())?;
        Ok(())
    }
}

impl HiddenLayer for LearningHidden {
    fn forward(&mut self, input: StageInput) -> LayerResult<Winner> {
        let ts = input.ts();
        let winner = match input {
            StageInput::Upstream { winner: None, .. } => None,
            _ => self.params.winner(drive(&input), decay(self.last_ts, ts)),
        };
        self.last_ts = Some(ts);
        Ok(winner)
    }

    fn reward(&mut self, winner: usize) -> LayerResult<()> {
        self.params.weights[winner] += 0.05;
        self.params.thresh[winner] += 0.02;
        Ok(())
    }

    fn punish(&mut self, _ts: Timestamp) -> LayerResult<()> {
        for t in &mut self.params.thresh {
            *t *= 0.9;
        }
        Ok(())
    }

    fn record(&mut self, _ts: Timestamp) -> LayerResult<()> {
        self.records += 1;
        Ok(())
    }

    fn reset_time(&mut self) -> LayerResult<()> {
        self.last_ts = None;
        Ok(())
    }
}

/// Classifier whose neuron `i` votes for class `i % classes`
#[derive(Debug, Clone, PartialEq)]
pub struct LearningOutput {
    pub params: Params,
    pub classes: usize,
    pub last_ts: Option<Timestamp>,
}

impl LearningOutput {
    pub fn new(neurons: usize, classes: usize, seed: u64) -> Self {
        Self {
            params: Params::new(neurons, seed),
            classes,
            last_ts: None,
        }
    }
}

impl Persistent for LearningOutput {
    fn save_weights(&self, path: &Path) -> LayerResult<()> {
        write_json(path, &self.params.weights)
    }

    fn load_weights(&mut self, path: &Path) -> LayerResult<()> {
        self.params.weights = read_json(path, self.params.weights.len())?;
        Ok(())
    }

    fn save_thresh(&self, path: &Path) -> LayerResult<()> {
        write_json(path, &self.params.thresh)
    }

    fn load_thresh(&mut self, path: &Path) -> LayerResult<()> {
        self.params.thresh = read_json(path, self.params.thresh.len())?;
        Ok(())
    }
}

impl OutputLayer for LearningOutput {
    fn forward(&mut self, input: StageInput) -> LayerResult<Prediction> {
        let ts = input.ts();
        let winner = match input {
            StageInput::Upstream { winner: None, .. } => None,
            _ => self.params.winner(drive(&input), decay(self.last_ts, ts)),
        };
        self.last_ts = Some(ts);
        Ok(match winner {
            Some(winner) => Prediction::fired(winner, winner % self.classes),
            None => Prediction::silent(),
        })
    }

    fn reward(&mut self, winner: usize) -> LayerResult<()> {
        self.params.weights[winner] += 0.05;
        Ok(())
    }

    fn punish(&mut self, winner: Winner, _label: ClassId) -> LayerResult<()> {
        match winner {
            Some(winner) => self.params.weights[winner] -= 0.05,
            None => {
                for t in &mut self.params.thresh {
                    *t *= 0.95;
                }
            }
        }
        Ok(())
    }

    fn reset_time(&mut self) -> LayerResult<()> {
        self.last_ts = None;
        Ok(())
    }
}

/// A small deterministic labelled event stream
pub fn event_stream(len: usize) -> Vec<(Event, Label)> {
    (0..len)
        .map(|i| {
            let event = Event::new((i * 3 % 17) as i64, (i * 5 % 13) as i64, i as f64 * 10.0, 1.0);
            let label = if i % 4 == 3 {
                Label::Unlabelled
            } else {
                Label::Class(i % 3)
            };
            (event, label)
        })
        .collect()
}
