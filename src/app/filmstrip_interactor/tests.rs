use std::sync::Mutex;

use async_trait::async_trait;

use super::*;
use crate::adapters::mock_engine::{MockBehavior, MockEngineAdapter, MockEngineLoader};
use crate::adapters::tracing_log::TracingLogAdapter;

#[derive(Default)]
struct RecordingStatus {
    messages: Mutex<Vec<String>>,
}

impl StatusSink for RecordingStatus {
    fn status(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

struct FixedSource;

#[async_trait]
impl SourceFetchPort for FixedSource {
    async fn fetch(&self, _source: &SourceRef) -> Result<Vec<u8>, DomainError> {
        Ok(b"source".to_vec())
    }
}

fn interactor(engine: Arc<MockEngineAdapter>) -> (FilmstripInteractor, Arc<MockEngineLoader>) {
    let loader = Arc::new(MockEngineLoader::new(engine));
    let handle = Arc::new(EngineHandle::new(
        Arc::clone(&loader) as Arc<dyn EngineLoader>,
        EngineSource {
            core_url: "ffmpeg".to_string(),
            wasm_url: String::new(),
        },
    ));
    let interactor = FilmstripInteractor::new(
        handle,
        Arc::new(FixedSource),
        Arc::new(TracingLogAdapter::new()),
    );
    (interactor, loader)
}

#[tokio::test]
async fn test_frames_come_back_sorted_and_engine_is_emptied() {
    let engine = Arc::new(MockEngineAdapter::with_behavior(MockBehavior {
        frames: 4,
        ..MockBehavior::default()
    }));
    let (interactor, _) = interactor(Arc::clone(&engine));
    let status = RecordingStatus::default();

    let strip = interactor
        .extract(Some(&SourceRef::new("a.mp4")), &status)
        .await
        .unwrap();

    let names: Vec<&str> = strip.frames.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["frame-001.png", "frame-002.png", "frame-003.png", "frame-004.png"]);
    assert_eq!(strip.frames[1].bytes, b"frame 2");
    assert_eq!(strip.strip_width(), 600);
    assert_eq!(strip.frame_height, 84);
    assert!(engine.file_names().is_empty());

    let argv = &engine.commands()[0];
    assert_eq!(argv[2], "-vf");
    assert_eq!(argv[3], "fps=1/5,scale=150:-1");
    assert!(argv[4].starts_with("run-") && argv[4].ends_with("frame-%03d.png"));

    let messages = status.messages.lock().unwrap().clone();
    assert!(messages.contains(&"Extracting: 50%".to_string()));
    assert_eq!(messages.last().unwrap(), "Drawing frames...");
}

#[tokio::test]
async fn test_no_frames_is_an_error() {
    let engine = Arc::new(MockEngineAdapter::with_behavior(MockBehavior::default()));
    let (interactor, _) = interactor(Arc::clone(&engine));
    let status = RecordingStatus::default();

    let err = interactor
        .extract(Some(&SourceRef::new("a.mp4")), &status)
        .await
        .unwrap_err();

    assert_eq!(err, DomainError::NoFrames);
    assert_eq!(err.to_string(), "No frames were extracted.");
    assert_eq!(
        status.messages.lock().unwrap().last().unwrap(),
        "Error loading filmstrip."
    );
    assert!(engine.file_names().is_empty());
}

#[tokio::test]
async fn test_foreign_files_are_left_alone() {
    let engine = Arc::new(MockEngineAdapter::new());
    engine.insert_file("frame-001.png", b"someone else".to_vec());
    let (interactor, _) = interactor(Arc::clone(&engine));

    let strip = interactor
        .extract(Some(&SourceRef::new("a.mp4")), &RecordingStatus::default())
        .await
        .unwrap();

    assert_eq!(strip.frames.len(), 3);
    assert_eq!(engine.file_names(), vec!["frame-001.png".to_string()]);
}

#[tokio::test]
async fn test_missing_source_skips_the_engine() {
    let engine = Arc::new(MockEngineAdapter::new());
    let (interactor, loader) = interactor(engine);

    let err = interactor
        .extract(None, &RecordingStatus::default())
        .await
        .unwrap_err();

    assert_eq!(err, DomainError::MissingSource);
    assert_eq!(loader.load_count(), 0);
}

#[tokio::test]
async fn test_failed_exec_cleans_up() {
    let engine = Arc::new(MockEngineAdapter::with_behavior(MockBehavior {
        exit_status: 1,
        frames: 2,
        ..MockBehavior::default()
    }));
    let (interactor, _) = interactor(Arc::clone(&engine));

    let err = interactor
        .extract(Some(&SourceRef::new("a.mp4")), &RecordingStatus::default())
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::EngineExec(_)));
    assert!(engine.file_names().is_empty());
}

#[tokio::test]
async fn test_abandoned_extraction_removes_staged_input() {
    let engine = Arc::new(MockEngineAdapter::with_behavior(MockBehavior {
        frames: 2,
        exec_delay: Some(std::time::Duration::from_secs(5)),
        ..MockBehavior::default()
    }));
    let (interactor, _) = interactor(Arc::clone(&engine));
    let status = RecordingStatus::default();

    let abandoned = tokio::time::timeout(
        std::time::Duration::from_millis(50),
        interactor.extract(Some(&SourceRef::new("a.mp4")), &status),
    )
    .await;
    assert!(abandoned.is_err());

    for _ in 0..20 {
        if engine.file_names().is_empty() {
            break;
        }
        tokio::task::yield_now().await;
    }
    assert!(engine.file_names().is_empty());
}
