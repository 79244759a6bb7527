//! Request pipeline tying preprocessing, the engine and decoding together.
//!
//! Each call to [`Classifier::classify`] is one asynchronous task. The
//! session is loaded once and shared across requests; a generation counter
//! makes sure a slow request can never overwrite the status of a newer one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, OnceCell};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::decode::{decode, Prediction};
use crate::engine::{InferenceSession, SessionLoader};
use crate::error::ClassifyError;
use crate::labels::LabelTable;
use crate::preprocess::{self, DEFAULT_TARGET_SIZE};

/// User-facing request status, published on every transition.
#[derive(Clone, Debug, PartialEq)]
pub enum Status {
    Idle,
    Busy,
    Done(Prediction),
    Failed(String),
}

/// What became of one request once it finished.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    /// The request was still the newest; its result was published.
    Completed(Prediction),
    /// A newer request took over; the result was dropped without a trace.
    Superseded,
}

impl Outcome {
    pub fn into_prediction(self) -> Option<Prediction> {
        match self {
            Outcome::Completed(prediction) => Some(prediction),
            Outcome::Superseded => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// Edge length of the square model input.
    pub target_size: u32,
    /// Deadline for the forward pass.
    pub timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            target_size: DEFAULT_TARGET_SIZE,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Shared classification front end.
///
/// Requests may overlap; each one carries the generation it was submitted
/// under and only the holder of the newest generation may publish status.
/// A failed session load leaves the cell empty, so the next request retries.
pub struct Classifier<L: SessionLoader> {
    loader: L,
    labels: LabelTable,
    config: PipelineConfig,
    session: OnceCell<Arc<L::Session>>,
    generation: AtomicU64,
    status: watch::Sender<Status>,
}

impl<L: SessionLoader> Classifier<L> {
    pub fn new(loader: L, labels: LabelTable, config: PipelineConfig) -> Self {
        let (status, _) = watch::channel(Status::Idle);
        Self {
            loader,
            labels,
            config,
            session: OnceCell::new(),
            generation: AtomicU64::new(0),
            status,
        }
    }

    /// Subscribe to status transitions.
    ///
    /// The channel pushes exactly on transitions; there is nothing to poll.
    pub fn status(&self) -> watch::Receiver<Status> {
        self.status.subscribe()
    }

    /// Classify one image, supplied as raw file bytes.
    ///
    /// Returns [`Outcome::Superseded`] when a newer request finished first;
    /// errors of superseded requests are returned to the caller but never
    /// published.
    pub async fn classify(&self, bytes: &[u8]) -> Result<Outcome, ClassifyError> {
        let request = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.status.send_replace(Status::Busy);
        debug!(request, "classification request started");

        match self.run_request(bytes).await {
            Ok(prediction) => {
                if self.is_latest(request) {
                    info!(request, label = %prediction.label, "classification finished");
                    self.status.send_replace(Status::Done(prediction.clone()));
                    Ok(Outcome::Completed(prediction))
                } else {
                    debug!(request, "stale result discarded");
                    Ok(Outcome::Superseded)
                }
            }
            Err(err) => {
                if self.is_latest(request) {
                    warn!(request, error = %err, "classification failed");
                    self.status.send_replace(Status::Failed(err.to_string()));
                } else {
                    debug!(request, error = %err, "stale failure discarded");
                }
                Err(err)
            }
        }
    }

    fn is_latest(&self, request: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == request
    }

    async fn run_request(&self, bytes: &[u8]) -> Result<Prediction, ClassifyError> {
        let tensor = preprocess::preprocess(bytes, self.config.target_size)?;
        let session = self.session().await?;

        let deadline = self.config.timeout;
        let pass = tokio::task::spawn_blocking(move || session.run(&tensor));
        let output = match timeout(deadline, pass).await {
            Ok(joined) => joined.map_err(|e| ClassifyError::EngineRun(e.to_string()))??,
            Err(_) => return Err(ClassifyError::Timeout(deadline)),
        };

        decode(&output, &self.labels)
    }

    /// Session accessor: the first caller loads, concurrent first requests
    /// await the same initialization instead of loading twice.
    async fn session(&self) -> Result<Arc<L::Session>, ClassifyError> {
        let session = self
            .session
            .get_or_try_init(|| async {
                let session = self.loader.load().await?;
                Ok::<_, ClassifyError>(Arc::new(session))
            })
            .await?;
        Ok(Arc::clone(session))
    }
}
