use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use classify_core::{
    Classifier, ClassifyError, InferenceSession, LabelTable, Outcome, PipelineConfig,
    SessionLoader, Status,
};
use image::{DynamicImage, Rgba, RgbaImage};
use ndarray::Array4;

/// Forward passes scripted per call: sleep, then answer.
struct ScriptedSession {
    calls: Mutex<VecDeque<(Duration, Vec<f32>)>>,
}

impl ScriptedSession {
    fn new(calls: Vec<(Duration, Vec<f32>)>) -> Self {
        Self {
            calls: Mutex::new(calls.into()),
        }
    }
}

impl InferenceSession for ScriptedSession {
    fn run(&self, _input: &Array4<f32>) -> Result<Vec<f32>, ClassifyError> {
        let (delay, scores) = self
            .calls
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected forward pass");
        std::thread::sleep(delay);
        Ok(scores)
    }
}

/// Loader handing out pre-built sessions, counting how often it ran.
struct FakeLoader {
    loads: AtomicUsize,
    load_delay: Duration,
    sessions: Mutex<VecDeque<Result<ScriptedSession, ClassifyError>>>,
}

impl FakeLoader {
    fn new(sessions: Vec<Result<ScriptedSession, ClassifyError>>) -> Arc<Self> {
        Arc::new(Self {
            loads: AtomicUsize::new(0),
            load_delay: Duration::ZERO,
            sessions: Mutex::new(sessions.into()),
        })
    }

    fn with_delay(sessions: Vec<Result<ScriptedSession, ClassifyError>>, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            loads: AtomicUsize::new(0),
            load_delay: delay,
            sessions: Mutex::new(sessions.into()),
        })
    }

    fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl SessionLoader for Arc<FakeLoader> {
    type Session = ScriptedSession;

    async fn load(&self) -> Result<ScriptedSession, ClassifyError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if !self.load_delay.is_zero() {
            tokio::time::sleep(self.load_delay).await;
        }
        self.sessions
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected session load")
    }
}

fn image_bytes() -> Vec<u8> {
    let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 8, Rgba([200, 30, 30, 255])));
    let mut bytes = Vec::new();
    img.write_to(
        &mut std::io::Cursor::new(&mut bytes),
        image::ImageFormat::Png,
    )
    .unwrap();
    bytes
}

fn fast_config() -> PipelineConfig {
    PipelineConfig {
        target_size: 8,
        timeout: Duration::from_secs(5),
    }
}

fn labels_ab() -> LabelTable {
    LabelTable::from_lines(["a", "b"])
}

#[tokio::test]
async fn session_loads_once_across_requests() {
    let loader = FakeLoader::new(vec![Ok(ScriptedSession::new(vec![
        (Duration::ZERO, vec![1.0, 0.0]),
        (Duration::ZERO, vec![0.0, 1.0]),
    ]))]);
    let classifier = Classifier::new(Arc::clone(&loader), labels_ab(), fast_config());
    let bytes = image_bytes();

    let first = classifier.classify(&bytes).await.unwrap();
    let second = classifier.classify(&bytes).await.unwrap();

    assert_eq!(first.into_prediction().unwrap().label, "a");
    assert_eq!(second.into_prediction().unwrap().label, "b");
    assert_eq!(loader.load_count(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_first_requests_share_one_load() {
    let loader = FakeLoader::with_delay(
        vec![Ok(ScriptedSession::new(vec![
            (Duration::ZERO, vec![1.0, 0.0]),
            (Duration::ZERO, vec![1.0, 0.0]),
        ]))],
        Duration::from_millis(50),
    );
    let classifier = Arc::new(Classifier::new(Arc::clone(&loader), labels_ab(), fast_config()));
    let bytes = image_bytes();

    let a = tokio::spawn({
        let classifier = Arc::clone(&classifier);
        let bytes = bytes.clone();
        async move { classifier.classify(&bytes).await }
    });
    let b = tokio::spawn({
        let classifier = Arc::clone(&classifier);
        async move { classifier.classify(&bytes).await }
    });

    a.await.unwrap().unwrap();
    b.await.unwrap().unwrap();
    assert_eq!(loader.load_count(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn stale_result_never_overwrites_newer_one() {
    let loader = FakeLoader::new(vec![Ok(ScriptedSession::new(vec![
        (Duration::from_millis(300), vec![1.0, 0.0]),
        (Duration::from_millis(10), vec![0.0, 1.0]),
    ]))]);
    let classifier = Arc::new(Classifier::new(Arc::clone(&loader), labels_ab(), fast_config()));
    let bytes = image_bytes();

    let slow = tokio::spawn({
        let classifier = Arc::clone(&classifier);
        let bytes = bytes.clone();
        async move { classifier.classify(&bytes).await }
    });
    // Let the first request reach its forward pass before starting the second.
    tokio::time::sleep(Duration::from_millis(100)).await;
    let fast = classifier.classify(&bytes).await.unwrap();

    let slow = slow.await.unwrap().unwrap();
    assert_eq!(fast.into_prediction().unwrap().label, "b");
    assert_eq!(slow, Outcome::Superseded);
    match &*classifier.status().borrow() {
        Status::Done(prediction) => assert_eq!(prediction.label, "b"),
        other => panic!("expected the newer result to stay published, got {other:?}"),
    }
}

#[tokio::test]
async fn timeout_is_a_distinct_error_and_leaves_failed_status() {
    let loader = FakeLoader::new(vec![Ok(ScriptedSession::new(vec![(
        Duration::from_millis(500),
        vec![1.0, 0.0],
    )]))]);
    let config = PipelineConfig {
        target_size: 8,
        timeout: Duration::from_millis(20),
    };
    let classifier = Classifier::new(Arc::clone(&loader), labels_ab(), config);

    let err = classifier.classify(&image_bytes()).await.unwrap_err();
    assert!(matches!(err, ClassifyError::Timeout(_)));
    assert!(matches!(&*classifier.status().borrow(), Status::Failed(_)));
}

#[tokio::test]
async fn failed_load_is_retried_on_the_next_request() {
    let loader = FakeLoader::new(vec![
        Err(ClassifyError::EngineLoad("model file missing".into())),
        Ok(ScriptedSession::new(vec![(Duration::ZERO, vec![0.0, 1.0])])),
    ]);
    let classifier = Classifier::new(Arc::clone(&loader), labels_ab(), fast_config());
    let bytes = image_bytes();

    let err = classifier.classify(&bytes).await.unwrap_err();
    assert!(matches!(err, ClassifyError::EngineLoad(_)));
    assert!(matches!(&*classifier.status().borrow(), Status::Failed(_)));

    let outcome = classifier.classify(&bytes).await.unwrap();
    assert_eq!(outcome.into_prediction().unwrap().label, "b");
    assert_eq!(loader.load_count(), 2);
}

#[tokio::test]
async fn output_label_length_mismatch_aborts_the_request() {
    let loader = FakeLoader::new(vec![Ok(ScriptedSession::new(vec![(
        Duration::ZERO,
        vec![0.1, 0.2, 0.3],
    )]))]);
    let classifier = Classifier::new(Arc::clone(&loader), labels_ab(), fast_config());

    let err = classifier.classify(&image_bytes()).await.unwrap_err();
    assert!(matches!(
        err,
        ClassifyError::LabelCount {
            labels: 2,
            outputs: 3
        }
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn status_moves_through_busy_to_done() {
    let loader = FakeLoader::new(vec![Ok(ScriptedSession::new(vec![(
        Duration::from_millis(100),
        vec![1.0, 0.0],
    )]))]);
    let classifier = Arc::new(Classifier::new(Arc::clone(&loader), labels_ab(), fast_config()));
    let mut status = classifier.status();
    assert_eq!(*status.borrow(), Status::Idle);

    let request = tokio::spawn({
        let classifier = Arc::clone(&classifier);
        async move { classifier.classify(&image_bytes()).await }
    });

    status.changed().await.unwrap();
    assert_eq!(*status.borrow(), Status::Busy);

    status.changed().await.unwrap();
    match &*status.borrow() {
        Status::Done(prediction) => assert_eq!(prediction.label, "a"),
        other => panic!("expected Done, got {other:?}"),
    }
    request.await.unwrap().unwrap();
}

#[tokio::test]
async fn undecodable_image_fails_without_touching_the_engine() {
    let loader = FakeLoader::new(vec![]);
    let classifier = Classifier::new(Arc::clone(&loader), labels_ab(), fast_config());

    let err = classifier.classify(b"not an image").await.unwrap_err();
    assert!(matches!(err, ClassifyError::ImageDecode(_)));
    assert_eq!(loader.load_count(), 0);
}
