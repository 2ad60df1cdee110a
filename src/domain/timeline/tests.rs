use super::*;

fn add(controller: &mut TimelineController, name: &str, media_type: MediaType) -> Clip {
    controller
        .add_clip(SourceRef::new(name), name, media_type, 0.0)
        .unwrap()
}

#[test]
fn test_add_clip_places_by_media_type() {
    let mut controller = TimelineController::new();
    let video = add(&mut controller, "a.mp4", MediaType::Video);
    let audio = add(&mut controller, "b.mp3", MediaType::Audio);

    assert_eq!(video.track_id, TrackId::V1);
    assert_eq!(audio.track_id, TrackId::A1);
    assert_eq!(video.width_percent, DEFAULT_CLIP_WIDTH_PERCENT);
    assert_ne!(video.id, audio.id);
}

#[test]
fn test_add_clip_is_append_only() {
    let mut controller = TimelineController::new();
    let first = add(&mut controller, "a.mp4", MediaType::Video);
    assert_eq!(controller.registry().len(), 1);

    let second = add(&mut controller, "b.mp4", MediaType::Video);
    assert_eq!(controller.registry().len(), 2);

    assert_eq!(controller.registry().nth(0), Some(&first));
    assert_eq!(controller.registry().nth(1), Some(&second));
}

#[test]
fn test_add_clip_rejects_out_of_range_start() {
    let mut controller = TimelineController::new();
    assert!(controller
        .add_clip(SourceRef::new("a.mp4"), "a", MediaType::Video, 101.0)
        .is_err());
    assert!(controller
        .add_clip(SourceRef::new("a.mp4"), "a", MediaType::Video, f64::NAN)
        .is_err());
    assert!(controller.registry().is_empty());
}

#[test]
fn test_add_clip_tracks_active_source() {
    let mut controller = TimelineController::new();
    assert!(controller.active_source().is_none());
    add(&mut controller, "a.mp4", MediaType::Video);
    add(&mut controller, "b.mp3", MediaType::Audio);
    assert_eq!(controller.active_source(), Some(&SourceRef::new("b.mp3")));
}

#[test]
fn test_move_audio_between_audio_lanes() {
    let mut controller = TimelineController::new();
    let audio = add(&mut controller, "b.mp3", MediaType::Audio);

    let moved = controller.reassign_track(audio.id, TrackId::A2).unwrap();
    assert_eq!(moved.track_id, TrackId::A2);
    assert_eq!(controller.registry().get(audio.id).unwrap().track_id, TrackId::A2);
}

#[test]
fn test_rejected_moves_leave_registry_unchanged() {
    let mut controller = TimelineController::new();
    let video = add(&mut controller, "a.mp4", MediaType::Video);
    let audio = add(&mut controller, "b.mp3", MediaType::Audio);
    let before = controller.registry().clone();

    let err = controller.reassign_track(video.id, TrackId::A1).unwrap_err();
    assert_eq!(err.to_string(), "Video can only be on V1.");
    let err = controller.reassign_track(audio.id, TrackId::V1).unwrap_err();
    assert_eq!(err.to_string(), "Audio cannot be on V1.");

    assert_eq!(controller.registry(), &before);
}

#[test]
fn test_move_unknown_clip() {
    let mut controller = TimelineController::new();
    let err = controller.reassign_track(ClipId::new(), TrackId::A1).unwrap_err();
    assert!(matches!(err, DomainError::ClipNotFound(_)));
}

#[test]
fn test_invariant_holds_after_event_stream() {
    let mut controller = TimelineController::new();
    let video = add(&mut controller, "a.mp4", MediaType::Video);
    let audio = add(&mut controller, "b.mp3", MediaType::Audio);

    let events = vec![
        TimelineEvent::MoveClip { clip_id: video.id, track_id: TrackId::A2 },
        TimelineEvent::MoveClip { clip_id: audio.id, track_id: TrackId::A2 },
        TimelineEvent::MoveClip { clip_id: audio.id, track_id: TrackId::V1 },
        TimelineEvent::MoveClip { clip_id: video.id, track_id: TrackId::V1 },
    ];
    for event in events {
        let _ = controller.apply(event);
    }

    for clip in controller.registry().iter() {
        match clip.media_type {
            MediaType::Video => assert_eq!(clip.track_id, TrackId::V1),
            MediaType::Audio => assert_ne!(clip.track_id, TrackId::V1),
        }
    }
}

#[test]
fn test_lanes_keep_insertion_order_and_allow_overlap() {
    let mut controller = TimelineController::new();
    let first = add(&mut controller, "a.mp4", MediaType::Video);
    let second = add(&mut controller, "b.mp4", MediaType::Video);

    let lanes = controller.lanes();
    assert_eq!(lanes.len(), 3);
    assert_eq!(lanes[0].track_id, TrackId::V1);
    assert_eq!(lanes[0].clips, vec![first, second]);
    assert!(lanes[1].clips.is_empty());
}

#[test]
fn test_event_json_shape() {
    let event: TimelineEvent = serde_json::from_str(
        r#"{"type":"addClip","source":"a.mp4","title":"A","mediaType":"video","startPercent":10}"#,
    )
    .unwrap();
    let mut controller = TimelineController::new();
    let clip = controller.apply(event).unwrap();
    assert_eq!(clip.start_percent, 10.0);
}
