//! Weight and threshold persistence, delegated layer by layer.
//!
//! Given a prefix `P`, each layer writes its own file:
//!
//! | Layer | Weights | Thresholds |
//! |:------|:--------|:-----------|
//! | hidden `i` | `P_hidden_{i}_weights.npy` | `P_hidden_{i}_thresh.npy` |
//! | output | `P_output_weights.npy` | `P_output_thresh.npy` |
//!
//! Layers are visited in chain order, the output layer last. A failure stops
//! the walk where it happened: files already written (or layers already
//! loaded) are left as they are.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use odesa_core::prelude::*;
use tracing::info;

use crate::error::{ModelError, ModelResult};
use crate::model::Model;

/// Which tensor of a layer a file holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TensorKind {
    Weights,
    Thresh,
}

impl TensorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TensorKind::Weights => "weights",
            TensorKind::Thresh => "thresh",
        }
    }

    fn save<P: Persistent + ?Sized>(self, layer: &P, path: &Path) -> LayerResult<()> {
        match self {
            TensorKind::Weights => layer.save_weights(path),
            TensorKind::Thresh => layer.save_thresh(path),
        }
    }

    fn load<P: Persistent + ?Sized>(self, layer: &mut P, path: &Path) -> LayerResult<()> {
        match self {
            TensorKind::Weights => layer.load_weights(path),
            TensorKind::Thresh => layer.load_thresh(path),
        }
    }
}

/// File names for a model saved under a prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerFiles {
    prefix: OsString,
    extension: String,
}

impl LayerFiles {
    /// The prefix is extended as raw text, so `runs/mnist` gives
    /// `runs/mnist_output_weights.npy`.
    pub fn new(prefix: impl AsRef<Path>, extension: impl Into<String>) -> Self {
        Self {
            prefix: prefix.as_ref().as_os_str().to_os_string(),
            extension: extension.into(),
        }
    }

    /// `P_hidden_{index}_{kind}.{ext}`
    pub fn hidden(&self, index: usize, kind: TensorKind) -> PathBuf {
        self.with_suffix(&format!("_hidden_{index}_{}", kind.as_str()))
    }

    /// `P_output_{kind}.{ext}`
    pub fn output(&self, kind: TensorKind) -> PathBuf {
        self.with_suffix(&format!("_output_{}", kind.as_str()))
    }

    fn with_suffix(&self, suffix: &str) -> PathBuf {
        let mut name = self.prefix.clone();
        name.push(suffix);
        name.push(".");
        name.push(&self.extension);
        PathBuf::from(name)
    }
}

impl Model {
    /// File names this model uses for `prefix`
    pub fn layer_files(&self, prefix: impl AsRef<Path>) -> LayerFiles {
        LayerFiles::new(prefix, self.config.file_extension.as_str())
    }

    /// Saves weights then thresholds of every layer
    pub fn save(&self, prefix: impl AsRef<Path>) -> ModelResult<()> {
        let prefix = prefix.as_ref();
        self.save_weights(prefix)?;
        self.save_thresh(prefix)
    }

    /// Loads weights then thresholds of every layer
    pub fn load(&mut self, prefix: impl AsRef<Path>) -> ModelResult<()> {
        let prefix = prefix.as_ref();
        self.load_weights(prefix)?;
        self.load_thresh(prefix)
    }

    pub fn save_weights(&self, prefix: impl AsRef<Path>) -> ModelResult<()> {
        self.save_tensors(prefix.as_ref(), TensorKind::Weights)
    }

    pub fn save_thresh(&self, prefix: impl AsRef<Path>) -> ModelResult<()> {
        self.save_tensors(prefix.as_ref(), TensorKind::Thresh)
    }

    pub fn load_weights(&mut self, prefix: impl AsRef<Path>) -> ModelResult<()> {
        self.load_tensors(prefix.as_ref(), TensorKind::Weights)
    }

    pub fn load_thresh(&mut self, prefix: impl AsRef<Path>) -> ModelResult<()> {
        self.load_tensors(prefix.as_ref(), TensorKind::Thresh)
    }

    fn save_tensors(&self, prefix: &Path, kind: TensorKind) -> ModelResult<()> {
        let output = self.output.as_deref().ok_or(ModelError::MissingOutputLayer)?;
        let files = self.layer_files(prefix);

        for (index, layer) in self.hidden.iter().enumerate() {
            kind.save(&**layer, &files.hidden(index, kind))?;
        }
        kind.save(output, &files.output(kind))?;

        info!(
            prefix = %prefix.display(),
            tensor = kind.as_str(),
            layers = self.hidden.len() + 1,
            "saved"
        );
        Ok(())
    }

    fn load_tensors(&mut self, prefix: &Path, kind: TensorKind) -> ModelResult<()> {
        let files = self.layer_files(prefix);
        let output = self.output.as_deref_mut().ok_or(ModelError::MissingOutputLayer)?;

        for (index, layer) in self.hidden.iter_mut().enumerate() {
            kind.load(&mut **layer, &files.hidden(index, kind))?;
        }
        kind.load(output, &files.output(kind))?;

        info!(
            prefix = %prefix.display(),
            tensor = kind.as_str(),
            layers = self.hidden.len() + 1,
            "loaded"
        );
        Ok(())
    }
}
