//! # Prelude
//!
//! ```
//! use odesa_core::prelude::*;
//! ```

pub use crate::error::{InputError, InputResult, LayerError, LayerResult};
pub use crate::event::{
    winner_from_raw, winner_to_raw, ClassId, Event, Label, Prediction, StageInput, Timestamp,
    Winner,
};
pub use crate::traits::{HiddenLayer, OutputLayer, Persistent};
