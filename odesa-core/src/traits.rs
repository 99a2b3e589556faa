//! # 🎯 Traits — Layer Contracts
//!
//! Contracts that every hidden layer and output classifier implements. The
//! orchestrator only ever talks to layers through these traits:
//!
//! | Role | Trait | Produces |
//! |:-----|:------|:---------|
//! | Hidden stage | [`HiddenLayer`] | [`Winner`] |
//! | Output classifier | [`OutputLayer`] | [`Prediction`] |
//! | Both | [`Persistent`] | weight/threshold files |
//!
//! Time-surface construction, the weight update rule and threshold adaptation
//! are entirely up to the implementation.

use std::fmt::Debug;
use std::path::Path;

use crate::error::LayerResult;
use crate::event::{ClassId, Prediction, StageInput, Timestamp, Winner};

// ═══════════════════════════════════════════════════════════════════════════════
// PERSISTENCE
// ═══════════════════════════════════════════════════════════════════════════════

/// Weight and threshold tensor I/O.
///
/// The encoding is owned by the implementation; callers only pick the path.
pub trait Persistent {
    fn save_weights(&self, path: &Path) -> LayerResult<()>;

    fn load_weights(&mut self, path: &Path) -> LayerResult<()>;

    fn save_thresh(&self, path: &Path) -> LayerResult<()>;

    fn load_thresh(&mut self, path: &Path) -> LayerResult<()>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// HIDDEN LAYER
// ═══════════════════════════════════════════════════════════════════════════════

/// A hidden stage of the chain.
///
/// # Example
///
/// ```
/// use std::path::Path;
/// use odesa_core::prelude::*;
///
/// #[derive(Debug, Default)]
/// struct Relay;
///
/// impl Persistent for Relay {
///     fn save_weights(&self, _: &Path) -> LayerResult<()> { Ok(()) }
///     fn load_weights(&mut self, _: &Path) -> LayerResult<()> { Ok(()) }
///     fn save_thresh(&self, _: &Path) -> LayerResult<()> { Ok(()) }
///     fn load_thresh(&mut self, _: &Path) -> LayerResult<()> { Ok(()) }
/// }
///
/// impl HiddenLayer for Relay {
///     fn forward(&mut self, input: StageInput) -> LayerResult<Winner> {
///         Ok(match input {
///             StageInput::Raw(event) => Some(event.x as usize),
///             StageInput::Upstream { winner, .. } => winner,
///         })
///     }
///     fn reward(&mut self, _: usize) -> LayerResult<()> { Ok(()) }
///     fn punish(&mut self, _: Timestamp) -> LayerResult<()> { Ok(()) }
///     fn record(&mut self, _: Timestamp) -> LayerResult<()> { Ok(()) }
///     fn reset_time(&mut self) -> LayerResult<()> { Ok(()) }
/// }
///
/// let mut relay = Relay;
/// let winner = relay.forward(StageInput::raw(Event::new(2, 0, 1.0, 1.0))).unwrap();
/// assert_eq!(winner, Some(2));
/// ```
pub trait HiddenLayer: Persistent + Send + Debug {
    /// Processes one input and returns the neuron that fired, if any.
    fn forward(&mut self, input: StageInput) -> LayerResult<Winner>;

    /// Strengthens the response of `winner`.
    fn reward(&mut self, winner: usize) -> LayerResult<()>;

    /// The stage failed to fire on a labelled event.
    fn punish(&mut self, ts: Timestamp) -> LayerResult<()>;

    /// Marks that downstream activity followed this stage's output at `ts`.
    fn record(&mut self, ts: Timestamp) -> LayerResult<()>;

    /// Clears temporal state (time-surfaces, timers). Learned weights and
    /// thresholds must survive.
    fn reset_time(&mut self) -> LayerResult<()>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// OUTPUT LAYER
// ═══════════════════════════════════════════════════════════════════════════════

/// The terminal classifier.
pub trait OutputLayer: Persistent + Send + Debug {
    /// Processes one input and returns the winner and its class.
    fn forward(&mut self, input: StageInput) -> LayerResult<Prediction>;

    /// The winner predicted the right class.
    fn reward(&mut self, winner: usize) -> LayerResult<()>;

    /// Wrong class, or no winner at all (`winner` is `None`).
    fn punish(&mut self, winner: Winner, label: ClassId) -> LayerResult<()>;

    /// Clears temporal state only.
    fn reset_time(&mut self) -> LayerResult<()>;
}
