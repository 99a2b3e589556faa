//! # ⚡ ODESA-Core
//!
//! Event model and layer contracts for ODESA-style online-learning spiking
//! networks.
//!
//! ## Modules
//!
//! - [`event`]: `Event`, `Label`, `Winner`, `StageInput` and `Prediction`
//! - [`traits`]: contracts implemented by hidden layers and output classifiers
//! - [`error`]: input validation and layer errors
//!
//! The learning rules themselves live outside this crate. A hidden layer or a
//! classifier is any type implementing [`HiddenLayer`] or [`OutputLayer`];
//! `odesa-orchestration` chains them into a model.
//!
//! ## Quick Start
//!
//! ```
//! use odesa_core::prelude::*;
//!
//! let event = Event::from_slice(&[3.0, 5.0, 100.0, 1.0]).unwrap();
//! let label = Label::from_raw(-1).unwrap();
//!
//! assert_eq!(event.ts, 100.0);
//! assert!(!label.is_labelled());
//!
//! let upstream = StageInput::upstream(Some(7), event.ts);
//! assert_eq!(upstream.legacy_fields(), (0, 7, 100.0, 1.0));
//! ```

pub mod error;
pub mod event;
pub mod prelude;
pub mod traits;

pub use error::{InputError, InputResult, LayerError, LayerResult};
pub use event::{
    winner_from_raw, winner_to_raw, ClassId, Event, Label, Prediction, StageInput, Timestamp,
    Winner,
};
pub use traits::{HiddenLayer, OutputLayer, Persistent};
