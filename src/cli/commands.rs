//! Command implementations

use std::path::Path;
use std::sync::Mutex;

use anyhow::{anyhow, bail, Context, Result};
use tracing::{debug, info};

use crate::adapters::toml_config::AppConfig;
use crate::app::container::AppContainer;
use crate::app::inspect_interactor::NO_VIDEO;
use crate::app::{AdminView, DashboardView, RunOutcome};
use crate::cli::args::*;
use crate::cli::Commands;
use crate::domain::model::*;
use crate::domain::rules::AccessDecision;
use crate::domain::timeline::{TimelineController, TimelineEvent};
use crate::error::TrimDeskError;
use crate::ports::StatusSink;

/// Page the editor's save form lives on
const EDITOR_PATH: &str = "/edit";

/// Execute one parsed command against the wired container
pub async fn run(command: Commands, container: &dyn AppContainer, config: &AppConfig) -> Result<()> {
    match command {
        Commands::Preview(args) => preview(args, container, config).await,
        Commands::Export(args) => export(args, container, config).await,
        Commands::Save(args) => save(args, container).await,
        Commands::List(args) => list(args, container).await,
        Commands::Filmstrip(args) => filmstrip(args, container, config).await,
        Commands::Inspect(args) => inspect(args, container, config).await,
        Commands::Users(args) => users(args, container).await,
        Commands::Timeline(args) => timeline(args, config),
        Commands::SignIn(args) => sign_in(args, container).await,
        Commands::Access(args) => access(args, container).await,
    }
}

/// Prints status lines, skipping repeats of the previous one
#[derive(Default)]
pub struct ConsoleStatus {
    last: Mutex<Option<String>>,
}

impl StatusSink for ConsoleStatus {
    fn status(&self, message: &str) {
        let mut last = self.last.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if last.as_deref() != Some(message) {
            println!("{}", message);
            *last = Some(message.to_string());
        }
    }

    fn state_changed(&self, state: OrchestrationState) {
        debug!(?state, "state changed");
    }
}

async fn preview(args: TrimArgs, container: &dyn AppContainer, config: &AppConfig) -> Result<()> {
    let source = resolve_source(args.source.as_deref(), config)?;
    let range = parse_range(&args.start, &args.end)?;
    info!("Preview {} [{} - {}]", describe(&source), range.start, range.end);

    let status = ConsoleStatus::default();
    let outcome = container
        .transcode_interactor()
        .preview(source, range, &status)
        .await;
    match completed(outcome)? {
        TranscodeOutput::Preview { url, bytes } => println!("Preview ready: {} ({} bytes)", url, bytes),
        other => bail!("unexpected output for preview: {:?}", other),
    }
    Ok(())
}

async fn export(args: ExportArgs, container: &dyn AppContainer, config: &AppConfig) -> Result<()> {
    let source = resolve_source(args.trim.source.as_deref(), config)?;
    let range = parse_range(&args.trim.start, &args.trim.end)?;
    info!("Export {} [{} - {}]", describe(&source), range.start, range.end);

    let status = ConsoleStatus::default();
    let outcome = container
        .transcode_interactor()
        .export(source, range, &args.title, &status)
        .await;
    match completed(outcome)? {
        TranscodeOutput::Download {
            file_name,
            location,
            bytes,
        } => println!("Downloaded {} to {} ({} bytes)", file_name, location, bytes),
        other => bail!("unexpected output for export: {:?}", other),
    }
    Ok(())
}

fn completed(outcome: RunOutcome) -> Result<TranscodeOutput> {
    match outcome {
        RunOutcome::Completed(output) => Ok(output),
        RunOutcome::Failed(error) => Err(TrimDeskError::Transcode(error.to_string()).into()),
        RunOutcome::Busy => Err(TrimDeskError::Busy.into()),
    }
}

async fn save(args: SaveArgs, container: &dyn AppContainer) -> Result<()> {
    let form = SaveVideoForm::new(args.title, args.start, args.end);
    let state = container
        .save_video_interactor()
        .save(&RequestContext::for_path(EDITOR_PATH), &form)
        .await;
    report(state)
}

async fn list(args: ListArgs, container: &dyn AppContainer) -> Result<()> {
    let view = container
        .dashboard_interactor()
        .list(&RequestContext::for_path(&args.path))
        .await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    match view {
        DashboardView::Videos { videos, .. } if videos.is_empty() => {
            println!("No videos yet!");
            println!("Start a new project to see it here.");
        }
        DashboardView::Videos { videos, .. } => {
            for video in videos {
                println!(
                    "{}  {:<30}  {}s - {}s  {}",
                    video.created_at.format("%Y-%m-%d %H:%M:%S"),
                    video.title,
                    video.video_data.trim.start,
                    video.video_data.trim.end,
                    video.id
                );
            }
        }
        DashboardView::Redirect { to } => bail!("Not signed in; sign in at {}", to),
        DashboardView::Denied { reason } => bail!("{}", reason),
    }
    Ok(())
}

async fn filmstrip(args: FilmstripArgs, container: &dyn AppContainer, config: &AppConfig) -> Result<()> {
    let source = resolve_source(args.source.as_deref(), config)?;
    let status = ConsoleStatus::default();
    let strip = container
        .filmstrip_interactor()
        .extract(source.as_ref(), &status)
        .await?;

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("Failed to create {}", args.out_dir.display()))?;
    for frame in &strip.frames {
        let path = args.out_dir.join(&frame.name);
        std::fs::write(&path, &frame.bytes).with_context(|| format!("Failed to write {}", path.display()))?;
    }
    println!(
        "Extracted {} frames to {} (strip {}x{})",
        strip.frames.len(),
        args.out_dir.display(),
        strip.strip_width(),
        strip.frame_height
    );
    Ok(())
}

async fn inspect(args: InspectArgs, container: &dyn AppContainer, config: &AppConfig) -> Result<()> {
    let source = resolve_source(args.source.as_deref(), config)?;
    let properties = container.inspect_interactor().inspect(source.as_ref()).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&properties)?);
        return Ok(());
    }

    match properties {
        Some(properties) => {
            println!("Name:       {}", properties.name);
            println!("Size:       {}", properties.size);
            println!("Duration:   {}", properties.duration);
            println!("Dimensions: {}", properties.dimensions);
        }
        None => println!("{}", NO_VIDEO),
    }
    Ok(())
}

async fn users(args: UsersArgs, container: &dyn AppContainer) -> Result<()> {
    let view = container
        .admin_interactor()
        .users(&RequestContext::for_path(&args.path))
        .await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    match view {
        AdminView::Users { viewer, users } => {
            println!("Welcome, {}.", viewer);
            println!("All Users");
            for user in users {
                println!(
                    "- {} ({}) - Role: {}",
                    user.name.as_deref().unwrap_or(&user.id),
                    user.email.as_deref().unwrap_or("no email"),
                    user.role
                );
            }
        }
        AdminView::Redirect { to } => bail!("Not signed in; sign in at {}", to),
        AdminView::Denied { reason } => bail!("{}", reason),
    }
    Ok(())
}

fn timeline(args: TimelineArgs, config: &AppConfig) -> Result<()> {
    let path = &config.paths.timeline_path;
    let mut controller = load_timeline(path)?;

    match args.action {
        TimelineAction::Add {
            source,
            title,
            media_type,
            start_percent,
        } => {
            let media_type = match media_type {
                Some(raw) => raw.parse::<MediaType>()?,
                None => MediaType::guess_from_name(&source),
            };
            let source = SourceRef::new(source);
            let title = title.unwrap_or_else(|| source.file_name().to_string());
            let clip = controller.add_clip(source, title, media_type, start_percent)?;
            println!("Added {} on {}: {}", clip.id, clip.track_id, clip.title);
        }
        TimelineAction::Move { clip, track } => {
            let clip_id = resolve_clip(&controller, &clip)?;
            let track: TrackId = track.parse()?;
            let clip = controller.reassign_track(clip_id, track)?;
            println!("Moved {} to {}", clip.id, clip.track_id);
        }
        TimelineAction::Apply { events } => {
            let content = std::fs::read_to_string(&events)
                .with_context(|| format!("Failed to read {}", events.display()))?;
            let events: Vec<TimelineEvent> =
                serde_json::from_str(&content).map_err(|e| TrimDeskError::TimelineFile {
                    path: events.display().to_string(),
                    message: e.to_string(),
                })?;
            // A rejected event aborts the batch; nothing is written
            for (index, event) in events.into_iter().enumerate() {
                controller
                    .apply(event)
                    .with_context(|| format!("event {} rejected", index + 1))?;
            }
            println!("Applied events; {} clips on the timeline", controller.registry().len());
        }
        TimelineAction::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(&controller.lanes())?);
            } else {
                print_lanes(&controller);
            }
            return Ok(());
        }
        TimelineAction::Reset => controller = TimelineController::new(),
    }

    save_timeline(path, &controller)
}

async fn sign_in(args: SignInArgs, container: &dyn AppContainer) -> Result<()> {
    let state = container
        .sign_in_interactor()
        .sign_in_with_email(&args.email, &args.token)
        .await;
    report(state)
}

async fn access(args: AccessArgs, container: &dyn AppContainer) -> Result<()> {
    let decision = container
        .access_interactor()
        .check(&RequestContext::for_path(&args.path))
        .await?;
    match decision {
        AccessDecision::Allow => {
            println!("Allow {}", args.path);
            Ok(())
        }
        AccessDecision::Redirect { to } => bail!("Redirect to {}", to),
        AccessDecision::Deny { reason } => bail!("{}", reason),
    }
}

fn report(state: FormState) -> Result<()> {
    match (state.success, state.error) {
        (Some(message), _) => {
            println!("{}", message);
            Ok(())
        }
        (None, Some(error)) => Err(anyhow!(error)),
        (None, None) => Err(anyhow!("Invalid input.")),
    }
}

/// Explicit source first, then the timeline's active source
fn resolve_source(explicit: Option<&str>, config: &AppConfig) -> Result<Option<SourceRef>> {
    if let Some(source) = explicit {
        return Ok(Some(SourceRef::new(source)));
    }
    let controller = load_timeline(&config.paths.timeline_path)?;
    Ok(controller.active_source().cloned())
}

fn describe(source: &Option<SourceRef>) -> String {
    source
        .as_ref()
        .map(|s| s.to_string())
        .unwrap_or_else(|| "<no source>".to_string())
}

fn parse_range(start: &str, end: &str) -> Result<TrimRange> {
    let start = TimeSpec::parse(start).map_err(|e| anyhow!("Invalid start time '{}': {}", start, e))?;
    let end = TimeSpec::parse(end).map_err(|e| anyhow!("Invalid end time '{}': {}", end, e))?;
    Ok(TrimRange::new(start, end)?)
}

fn resolve_clip(controller: &TimelineController, raw: &str) -> Result<ClipId> {
    if let Ok(position) = raw.parse::<usize>() {
        return controller
            .registry()
            .nth(position.saturating_sub(1))
            .filter(|_| position > 0)
            .map(|clip| clip.id)
            .ok_or_else(|| anyhow!("No clip at position {}", position));
    }
    Ok(raw.parse::<ClipId>()?)
}

fn print_lanes(controller: &TimelineController) {
    for lane in controller.lanes() {
        println!("{}", lane.track_id);
        for clip in &lane.clips {
            println!(
                "  {}  {:>5.1}% +{:.1}%  {} ({})",
                clip.id, clip.start_percent, clip.width_percent, clip.title, clip.source
            );
        }
    }
    if let Some(source) = controller.active_source() {
        println!("Active source: {}", source);
    }
}

/// Missing file means an empty timeline
pub fn load_timeline(path: &Path) -> Result<TimelineController> {
    match std::fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).map_err(|e| {
            TrimDeskError::TimelineFile {
                path: path.display().to_string(),
                message: e.to_string(),
            }
            .into()
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(TimelineController::new()),
        Err(e) => Err(TrimDeskError::IoError(e)).with_context(|| format!("Failed to read {}", path.display())),
    }
}

pub fn save_timeline(path: &Path, controller: &TimelineController) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let content = serde_json::to_string_pretty(controller)?;
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    debug!(file = %path.display(), clips = controller.registry().len(), "timeline saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_clip_by_position() {
        let mut controller = TimelineController::new();
        let first = controller
            .add_clip(SourceRef::new("a.mp4"), "a", MediaType::Video, 0.0)
            .unwrap();
        assert_eq!(resolve_clip(&controller, "1").unwrap(), first.id);
        assert!(resolve_clip(&controller, "0").is_err());
        assert!(resolve_clip(&controller, "2").is_err());
        assert_eq!(resolve_clip(&controller, &first.id.to_string()).unwrap(), first.id);
    }

    #[test]
    fn test_timeline_snapshot_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state/timeline.json");
        assert!(load_timeline(&path).unwrap().registry().is_empty());

        let mut controller = TimelineController::new();
        controller
            .add_clip(SourceRef::new("song.mp3"), "song", MediaType::Audio, 40.0)
            .unwrap();
        save_timeline(&path, &controller).unwrap();

        let restored = load_timeline(&path).unwrap();
        assert_eq!(restored, controller);
        assert_eq!(restored.active_source(), Some(&SourceRef::new("song.mp3")));
    }
}
