//! Boundary to the external inference engine.
//!
//! The engine is an opaque collaborator with two operations: load a session
//! from a model artifact, and run one forward pass. Both can fail and both
//! are treated as black-box failures. The production implementation is
//! backed by ONNX Runtime through the `ort` crate; tests substitute scripted
//! fakes through the same traits.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use memmap2::Mmap;
use ndarray::Array4;
use ort::session::{builder::GraphOptimizationLevel, Session, SessionInputs};
use ort::value::TensorRef;
use tracing::info;

use crate::error::ClassifyError;

/// Tensor names agreed upon when the model was exported.
///
/// The input name is a configuration constant, never derived at runtime.
/// The output name may be omitted, in which case the session's first
/// declared output is used.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    pub input_name: String,
    pub output_name: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            input_name: "data".to_string(),
            output_name: None,
        }
    }
}

/// One loaded model, able to execute forward passes.
///
/// `run` blocks the calling thread; the pipeline dispatches it to a blocking
/// worker so async tasks only suspend.
pub trait InferenceSession: Send + Sync {
    /// Execute one forward pass and return the raw output vector.
    fn run(&self, input: &Array4<f32>) -> Result<Vec<f32>, ClassifyError>;
}

/// Asynchronous session constructor, the `load(modelPath)` half of the
/// engine boundary.
pub trait SessionLoader: Send + Sync {
    type Session: InferenceSession + Send + Sync + 'static;

    fn load(&self) -> impl Future<Output = Result<Self::Session, ClassifyError>> + Send;
}

/// Loads an ONNX Runtime session from a model file.
pub struct OnnxLoader {
    model_path: PathBuf,
    config: EngineConfig,
    use_mmap: bool,
}

impl OnnxLoader {
    pub fn new<P: Into<PathBuf>>(model_path: P, config: EngineConfig) -> Self {
        Self {
            model_path: model_path.into(),
            config,
            use_mmap: false,
        }
    }

    /// Memory-map the model file instead of reading it through the engine.
    pub fn with_mmap(mut self) -> Self {
        self.use_mmap = true;
        self
    }
}

impl SessionLoader for OnnxLoader {
    type Session = OnnxSession;

    async fn load(&self) -> Result<OnnxSession, ClassifyError> {
        let path = self.model_path.clone();
        let use_mmap = self.use_mmap;
        let session = tokio::task::spawn_blocking(move || build_session(&path, use_mmap))
            .await
            .map_err(|e| ClassifyError::EngineLoad(e.to_string()))??;
        info!(model = %self.model_path.display(), "inference session loaded");
        Ok(OnnxSession {
            session: Mutex::new(session),
            config: self.config.clone(),
        })
    }
}

fn build_session(path: &Path, use_mmap: bool) -> Result<Session, ClassifyError> {
    let builder = Session::builder()
        .and_then(|b| b.with_optimization_level(GraphOptimizationLevel::Level3))
        .map_err(|e| ClassifyError::EngineLoad(e.to_string()))?;
    if use_mmap {
        let file = std::fs::File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };
        builder
            .commit_from_memory(&mmap)
            .map_err(|e| ClassifyError::EngineLoad(e.to_string()))
    } else {
        builder
            .commit_from_file(path)
            .map_err(|e| ClassifyError::EngineLoad(e.to_string()))
    }
}

/// ONNX Runtime session behind a lock, since the engine's run call needs
/// exclusive access.
pub struct OnnxSession {
    session: Mutex<Session>,
    config: EngineConfig,
}

impl InferenceSession for OnnxSession {
    fn run(&self, input: &Array4<f32>) -> Result<Vec<f32>, ClassifyError> {
        let dims: Vec<i64> = input.shape().iter().map(|&d| d as i64).collect();
        let data = input
            .as_slice()
            .ok_or_else(|| ClassifyError::EngineRun("input tensor is not contiguous".into()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| ClassifyError::EngineRun("session lock poisoned".into()))?;

        // Resolve the output name before running to avoid borrow conflicts
        // with the outputs value.
        let output_name = match &self.config.output_name {
            Some(name) => {
                if !session.outputs.iter().any(|o| o.name == *name) {
                    return Err(ClassifyError::EngineRun(format!(
                        "model declares no output named '{name}'"
                    )));
                }
                name.clone()
            }
            None => session
                .outputs
                .first()
                .map(|o| o.name.to_string())
                .ok_or_else(|| {
                    ClassifyError::EngineRun("session declares no outputs".into())
                })?,
        };

        let tensor = TensorRef::from_array_view((dims, data))
            .map_err(|e| ClassifyError::EngineRun(e.to_string()))?;
        let inputs = ort::inputs![self.config.input_name.as_str() => tensor];
        let outputs = session
            .run(SessionInputs::<0>::ValueMap(inputs))
            .map_err(|e| ClassifyError::EngineRun(e.to_string()))?;

        let (_, scores) = outputs[output_name.as_str()]
            .try_extract_tensor::<f32>()
            .map_err(|e| ClassifyError::EngineRun(e.to_string()))?;
        Ok(scores.to_vec())
    }
}
