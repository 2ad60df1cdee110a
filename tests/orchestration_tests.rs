use std::sync::{Arc, Mutex};

use tempfile::TempDir;
use trimdesk::adapters::toml_config::AppConfig;
use trimdesk::adapters::*;
use trimdesk::app::container::{AppContainer, DefaultAppContainer};
use trimdesk::app::*;
use trimdesk::domain::model::*;
use trimdesk::domain::timeline::TimelineController;
use trimdesk::ports::*;

/// Test utilities for wiring the application against temp directories
mod test_utils {
    use super::*;

    pub fn dry_run_config(root: &TempDir, user: Option<&str>) -> AppConfig {
        let mut config = AppConfig::default();
        config.dry_run = true;
        config.paths.preview_dir = root.path().join("previews");
        config.paths.output_dir = root.path().join("out");
        config.paths.store_path = root.path().join("videos.json");
        config.paths.outbox_path = root.path().join("outbox.jsonl");
        config.paths.timeline_path = root.path().join("timeline.json");
        config.session.user_id = user.map(str::to_string);
        config
    }

    pub fn write_source(root: &TempDir, name: &str, bytes: &[u8]) -> SourceRef {
        let path = root.path().join(name);
        std::fs::write(&path, bytes).unwrap();
        SourceRef::new(path.to_string_lossy())
    }

    #[derive(Default)]
    pub struct RecordingStatus {
        pub messages: Mutex<Vec<String>>,
    }

    impl StatusSink for RecordingStatus {
        fn status(&self, message: &str) {
            self.messages.lock().unwrap().push(message.to_string());
        }
    }
}

use test_utils::*;

#[tokio::test]
async fn test_timeline_to_export_to_dashboard() {
    let root = TempDir::new().unwrap();
    let container = DefaultAppContainer::new(&dry_run_config(&root, Some("user-1"))).unwrap();

    let mut timeline = TimelineController::new();
    let video = write_source(&root, "holiday.mp4", b"holiday footage");
    timeline
        .add_clip(video.clone(), "holiday", MediaType::Video, 0.0)
        .unwrap();
    timeline
        .add_clip(SourceRef::new("theme.mp3"), "theme", MediaType::Audio, 10.0)
        .unwrap();
    let clip = timeline.registry().nth(0).unwrap().id;
    timeline.reassign_track(clip, TrackId::A1).unwrap_err();

    // Audio was added last, so point the editor back at the video explicitly
    timeline.set_active_source(Some(video));
    let range = TrimRange::from_seconds(2.0, 4.5).unwrap();

    let status = RecordingStatus::default();
    let outcome = container
        .transcode_interactor()
        .export(timeline.active_source().cloned(), range, "Holiday  Cut", &status)
        .await;
    assert!(outcome.is_completed(), "{:?}", outcome);
    assert_eq!(
        std::fs::read(root.path().join("out/Holiday_Cut.mp4")).unwrap(),
        b"holiday footage"
    );
    assert_eq!(status.messages.lock().unwrap().last().unwrap(), "Export complete!");

    let form = SaveVideoForm::new("Holiday Cut", "2", "4.5");
    let state = container
        .save_video_interactor()
        .save(&RequestContext::for_path("/edit"), &form)
        .await;
    assert!(state.is_success(), "{:?}", state);

    let view = container
        .dashboard_interactor()
        .list(&RequestContext::for_path("/dashboard"))
        .await
        .unwrap();
    match view {
        DashboardView::Videos { videos, .. } => {
            assert_eq!(videos.len(), 1);
            assert_eq!(videos[0].video_data.trim, TrimData { start: 2.0, end: 4.5 });
        }
        other => panic!("expected videos, got {:?}", other),
    }
}

#[tokio::test]
async fn test_preview_and_filmstrip_share_one_engine() {
    let root = TempDir::new().unwrap();
    let source = write_source(&root, "clip.mp4", b"clip bytes");

    let engine = Arc::new(MockEngineAdapter::new());
    let loader = Arc::new(MockEngineLoader::new(Arc::clone(&engine)));
    let handle = Arc::new(EngineHandle::new(
        Arc::clone(&loader) as Arc<dyn EngineLoader>,
        EngineSource {
            core_url: "ffmpeg".to_string(),
            wasm_url: String::new(),
        },
    ));
    let fetch: Arc<dyn SourceFetchPort> = Arc::new(SourceFetchAdapter::new());
    let transcode = TranscodeInteractor::new(
        Arc::clone(&handle),
        Arc::clone(&fetch),
        Arc::new(FsDeliveryAdapter::new(root.path().join("previews"), root.path().join("out"))),
        Arc::new(TracingLogAdapter::new()),
    );
    let filmstrip = FilmstripInteractor::new(handle, fetch, Arc::new(TracingLogAdapter::new()));

    let preview_status = RecordingStatus::default();
    let strip_status = RecordingStatus::default();
    let (outcome, strip) = tokio::join!(
        transcode.preview(
            Some(source.clone()),
            TrimRange::from_seconds(0.0, 1.0).unwrap(),
            &preview_status
        ),
        filmstrip.extract(Some(&source), &strip_status),
    );

    assert!(outcome.is_completed(), "{:?}", outcome);
    assert_eq!(strip.unwrap().frames.len(), 3);
    assert_eq!(loader.load_count(), 1);
    assert!(engine.file_names().is_empty(), "{:?}", engine.file_names());

    let inputs: Vec<String> = engine.commands().iter().map(|argv| argv[1].clone()).collect();
    assert_eq!(inputs.len(), 2);
    assert_ne!(inputs[0], inputs[1]);
}

#[tokio::test]
async fn test_failed_run_keeps_previous_output() {
    let root = TempDir::new().unwrap();
    let container = DefaultAppContainer::new(&dry_run_config(&root, None)).unwrap();
    let transcode = container.transcode_interactor();
    let source = write_source(&root, "clip.mp4", b"clip bytes");
    let range = TrimRange::from_seconds(1.0, 2.0).unwrap();

    let first = transcode
        .preview(Some(source), range, &RecordingStatus::default())
        .await;
    assert!(first.is_completed());
    let previous = transcode.last_output();

    let status = RecordingStatus::default();
    let second = transcode.preview(None, range, &status).await;

    assert_eq!(second, RunOutcome::Failed(trimdesk::DomainError::MissingSource));
    assert_eq!(transcode.last_output(), previous);
    assert_eq!(
        transcode.last_status().as_deref(),
        Some("Error: No source video found.")
    );
    assert_eq!(transcode.state(), OrchestrationState::Idle);
}

#[tokio::test]
async fn test_access_policy_from_config() {
    let root = TempDir::new().unwrap();
    let mut config = dry_run_config(&root, Some("user-1"));
    config.session.role = Role::User;
    let container = DefaultAppContainer::new(&config).unwrap();
    let access = container.access_interactor();

    let decision = access.check(&RequestContext::for_path("/edit")).await.unwrap();
    assert_eq!(decision, trimdesk::domain::rules::AccessDecision::Allow);

    let decision = access.check(&RequestContext::for_path("/admin")).await.unwrap();
    assert!(matches!(
        decision,
        trimdesk::domain::rules::AccessDecision::Deny { .. }
    ));
}

#[tokio::test]
async fn test_inspect_follows_the_active_source() {
    let root = TempDir::new().unwrap();
    let container = DefaultAppContainer::new(&dry_run_config(&root, None)).unwrap();

    let mut timeline = TimelineController::new();
    let video = write_source(&root, "holiday.mp4", &[7u8; 2048]);
    timeline.add_clip(video, "holiday", MediaType::Video, 0.0).unwrap();

    let inspect = container.inspect_interactor();
    let properties = inspect.inspect(timeline.active_source()).await.unwrap();
    assert_eq!(properties.name, "holiday.mp4");
    assert_eq!(properties.size, "2 KB");
    assert_eq!(properties.dimensions, "1920 x 1080");

    let song = write_source(&root, "theme.mp3", b"tune");
    timeline.add_clip(song, "theme", MediaType::Audio, 10.0).unwrap();
    assert_eq!(inspect.inspect(timeline.active_source()).await, None);
}

#[tokio::test]
async fn test_admin_lists_users_who_saved() {
    let root = TempDir::new().unwrap();
    let mut config = dry_run_config(&root, Some("user-1"));
    config.session.name = Some("Ada".to_string());
    let container = DefaultAppContainer::new(&config).unwrap();
    let state = container
        .save_video_interactor()
        .save(&RequestContext::for_path("/edit"), &SaveVideoForm::new("Holiday", "0", "3"))
        .await;
    assert!(state.is_success(), "{:?}", state);

    let mut config = dry_run_config(&root, Some("root"));
    config.session.role = Role::Admin;
    let admin = DefaultAppContainer::new(&config).unwrap().admin_interactor();

    match admin.users(&RequestContext::for_path("/admin")).await.unwrap() {
        AdminView::Users { viewer, users } => {
            assert_eq!(viewer, "root");
            assert_eq!(users.len(), 1);
            assert_eq!(users[0].name.as_deref(), Some("Ada"));
        }
        other => panic!("expected users, got {:?}", other),
    }
}
