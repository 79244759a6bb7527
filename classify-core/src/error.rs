use std::time::Duration;

use thiserror::Error;

/// Everything that can go wrong while serving one classification request.
///
/// Every variant is local to the request that produced it; none of them
/// should take the process down.
#[derive(Debug, Error)]
pub enum ClassifyError {
    /// The supplied bytes could not be decoded as an image.
    #[error("could not decode input image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// The preprocessed pixel buffer disagrees with the expected tensor size.
    #[error("pixel buffer holds {actual} bytes, expected {expected}")]
    TensorShapeMismatch { expected: usize, actual: usize },

    /// The model artifact is missing or the engine rejected it.
    #[error("inference session failed to load: {0}")]
    EngineLoad(String),

    /// The forward pass failed or returned something unusable.
    #[error("inference run failed: {0}")]
    EngineRun(String),

    /// The output vector and the label table disagree in length.
    #[error("output vector holds {outputs} scores for {labels} labels")]
    LabelCount { labels: usize, outputs: usize },

    /// The forward pass did not finish within the configured deadline.
    #[error("inference did not finish within {0:?}")]
    Timeout(Duration),

    /// Reading a label file, model file or input image failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
