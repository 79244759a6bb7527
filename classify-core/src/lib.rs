//! Image classification pipeline around an external inference runtime.
//!
//! The crate turns a user-supplied image into a normalized channel-first
//! tensor, submits it to a pre-exported model through the engine boundary in
//! [`engine`], and reads the highest-scoring class back out.

pub mod decode;
pub mod engine;
pub mod error;
pub mod labels;
pub mod pipeline;
pub mod preprocess;

pub use decode::{argmax, decode, Prediction};
pub use engine::{EngineConfig, InferenceSession, OnnxLoader, OnnxSession, SessionLoader};
pub use error::ClassifyError;
pub use labels::LabelTable;
pub use pipeline::{Classifier, Outcome, PipelineConfig, Status};
