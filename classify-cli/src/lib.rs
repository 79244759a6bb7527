//! Host-side wrapper around the classification pipeline.
//!
//! Provides the blocking [`FileClassifier`] used by the CLI binary and the C
//! FFI surface in [`ffi`] for embedding the classifier in a non-Rust host.

use std::path::Path;

use classify_core::{
    Classifier, ClassifyError, EngineConfig, LabelTable, OnnxLoader, PipelineConfig, Prediction,
};

pub mod ffi;
pub use ffi::*;

/// Blocking classifier over image files, driving its own runtime.
///
/// The session is loaded on the first classification and reused afterwards.
pub struct FileClassifier {
    runtime: tokio::runtime::Runtime,
    classifier: Classifier<OnnxLoader>,
}

impl FileClassifier {
    /// Create a classifier with default engine and pipeline settings.
    pub fn new(model: &Path, labels: &Path) -> Result<Self, ClassifyError> {
        Self::with_config(
            model,
            labels,
            EngineConfig::default(),
            PipelineConfig::default(),
            false,
        )
    }

    pub fn with_config(
        model: &Path,
        labels: &Path,
        engine: EngineConfig,
        pipeline: PipelineConfig,
        mmap: bool,
    ) -> Result<Self, ClassifyError> {
        let labels = LabelTable::from_file(labels)?;
        let mut loader = OnnxLoader::new(model, engine);
        if mmap {
            loader = loader.with_mmap();
        }
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()?;
        Ok(Self {
            runtime,
            classifier: Classifier::new(loader, labels, pipeline),
        })
    }

    /// Classify one image file.
    pub fn classify_file(&self, path: &Path) -> Result<Prediction, ClassifyError> {
        let bytes = std::fs::read(path)?;
        let outcome = self.runtime.block_on(self.classifier.classify(&bytes))?;
        // Requests are strictly sequential here, so the result is always the
        // newest one.
        outcome
            .into_prediction()
            .ok_or_else(|| ClassifyError::EngineRun("request superseded".into()))
    }
}
