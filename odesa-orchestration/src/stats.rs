//! Running statistics of the model

use serde::{Deserialize, Serialize};

/// Counters accumulated over the events seen by the model
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelStats {
    /// Events processed (learning and inference)
    pub events: u64,
    /// Events that carried a class label
    pub labelled_events: u64,
    /// Events on which the classifier fired
    pub output_fired: u64,
    /// Labelled events whose predicted class matched the label
    pub correct: u64,
    /// Punish calls sent to hidden layers
    pub hidden_punishments: u64,
    /// Punish calls sent to the classifier
    pub classifier_punishments: u64,
    /// Calls to `reset`
    pub resets: u64,
}

impl ModelStats {
    /// Fraction of labelled events classified correctly
    pub fn accuracy(&self) -> Option<f64> {
        (self.labelled_events > 0).then(|| self.correct as f64 / self.labelled_events as f64)
    }

    /// Fraction of events on which the classifier fired
    pub fn firing_rate(&self) -> Option<f64> {
        (self.events > 0).then(|| self.output_fired as f64 / self.events as f64)
    }
}
