//! # 🎭 odesa-orchestration — Model Orchestration
//!
//! Chains ODESA hidden layers into an output classifier, propagates events
//! forward and assigns credit backward after every event.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Model                               │
//! │  ┌───────────────────────────────────────────────────────┐  │
//! │  │            Forward pass                               │  │
//! │  │  event → hidden[0] → … → hidden[N-1] → output         │  │
//! │  └───────────────────────────────────────────────────────┘  │
//! │  ┌───────────────────────────────────────────────────────┐  │
//! │  │            Credit assignment                          │  │
//! │  │  record (activity) | reward / punish (label)          │  │
//! │  └───────────────────────────────────────────────────────┘  │
//! │  ┌───────────────────────────────────────────────────────┐  │
//! │  │            Persistence                                │  │
//! │  │  P_hidden_{i}_weights | P_output_thresh | …           │  │
//! │  └───────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use odesa_orchestration::prelude::*;
//!
//! let mut model = Model::new();
//! model.add_hidden_layer(my_feature_layer);
//! model.add_output_layer(my_classifier);
//!
//! for (event, label) in stream {
//!     let out = model.forward(event, label)?;
//! }
//! model.save("runs/gesture")?;
//! ```

mod chain;
pub mod config;
pub mod error;
pub mod model;
pub mod persistence;
pub mod stats;

pub use config::ModelConfig;
pub use error::{ModelError, ModelResult};
pub use model::{Model, ModelOutput};
pub use persistence::{LayerFiles, TensorKind};
pub use stats::ModelStats;

/// Re-exports for model users and layer implementors
pub mod prelude {
    pub use crate::{
        LayerFiles, Model, ModelConfig, ModelError, ModelOutput, ModelResult, ModelStats,
        TensorKind,
    };
    pub use odesa_core::prelude::*;
}
