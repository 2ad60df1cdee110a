//! Clip registry and timeline controller
//!
//! The registry is an append-only, insertion-ordered list of clips. The
//! controller is the only mutation path: it reduces [`TimelineEvent`]s into
//! the registry and enforces [`TrackAssignmentRules`]. Overlapping clips on a
//! lane are allowed and nothing is ever removed.

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;
use crate::domain::model::*;
use crate::domain::rules::TrackAssignmentRules;

/// Width given to every new clip, in percent of the timeline
pub const DEFAULT_CLIP_WIDTH_PERCENT: f64 = 20.0;

/// In-memory ordered collection of clips
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClipRegistry {
    clips: Vec<Clip>,
}

impl ClipRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    pub fn get(&self, id: ClipId) -> Option<&Clip> {
        self.clips.iter().find(|clip| clip.id == id)
    }

    /// Clip by insertion position
    pub fn nth(&self, index: usize) -> Option<&Clip> {
        self.clips.get(index)
    }

    /// All clips in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Clip> {
        self.clips.iter()
    }

    /// Clips on one lane, in insertion order
    pub fn clips_on(&self, track: TrackId) -> impl Iterator<Item = &Clip> {
        self.clips.iter().filter(move |clip| clip.track_id == track)
    }

    fn push(&mut self, clip: Clip) {
        self.clips.push(clip);
    }

    fn get_mut(&mut self, id: ClipId) -> Option<&mut Clip> {
        self.clips.iter_mut().find(|clip| clip.id == id)
    }
}

/// Mutations the controller accepts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TimelineEvent {
    #[serde(rename_all = "camelCase")]
    AddClip {
        source: SourceRef,
        title: String,
        media_type: MediaType,
        #[serde(default)]
        start_percent: f64,
    },
    #[serde(rename_all = "camelCase")]
    MoveClip { clip_id: ClipId, track_id: TrackId },
}

/// One lane and its clips, ready for rendering
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LaneView {
    pub track_id: TrackId,
    pub clips: Vec<Clip>,
}

/// Single source of truth for clip placement
///
/// Serializes as a snapshot so an editing session can be resumed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineController {
    registry: ClipRegistry,
    active_source: Option<SourceRef>,
}

impl TimelineController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registry(&self) -> &ClipRegistry {
        &self.registry
    }

    /// Source of the most recently added clip; the one preview/export uses
    pub fn active_source(&self) -> Option<&SourceRef> {
        self.active_source.as_ref()
    }

    pub fn set_active_source(&mut self, source: Option<SourceRef>) {
        self.active_source = source;
    }

    /// Apply one event, returning the clip it produced or changed
    pub fn apply(&mut self, event: TimelineEvent) -> Result<Clip, DomainError> {
        match event {
            TimelineEvent::AddClip {
                source,
                title,
                media_type,
                start_percent,
            } => self.add_clip(source, title, media_type, start_percent),
            TimelineEvent::MoveClip { clip_id, track_id } => self.reassign_track(clip_id, track_id),
        }
    }

    /// Append a clip on the lane implied by its media type
    pub fn add_clip(
        &mut self,
        source: SourceRef,
        title: impl Into<String>,
        media_type: MediaType,
        start_percent: f64,
    ) -> Result<Clip, DomainError> {
        if !start_percent.is_finite() || !(0.0..=100.0).contains(&start_percent) {
            return Err(DomainError::BadArgs(format!(
                "Start position must be within 0-100%, got {}",
                start_percent
            )));
        }

        let clip = Clip {
            id: ClipId::new(),
            track_id: TrackId::default_for(media_type),
            media_type,
            source: source.clone(),
            title: title.into(),
            start_percent,
            width_percent: DEFAULT_CLIP_WIDTH_PERCENT,
        };

        tracing::debug!(clip_id = %clip.id, track = %clip.track_id, "clip added");
        self.registry.push(clip.clone());
        self.active_source = Some(source);
        Ok(clip)
    }

    /// Move a clip to another lane; rejected moves leave the registry untouched
    pub fn reassign_track(&mut self, clip_id: ClipId, target: TrackId) -> Result<Clip, DomainError> {
        let clip = self
            .registry
            .get_mut(clip_id)
            .ok_or_else(|| DomainError::ClipNotFound(clip_id.to_string()))?;

        if let Err(rejection) = TrackAssignmentRules::check(clip.media_type, target) {
            tracing::warn!(clip_id = %clip_id, target = %target, "track reassignment rejected");
            return Err(rejection);
        }

        clip.track_id = target;
        Ok(clip.clone())
    }

    /// Lanes in display order with their clips in insertion order
    pub fn lanes(&self) -> Vec<LaneView> {
        TrackId::ALL
            .iter()
            .map(|&track_id| LaneView {
                track_id,
                clips: self.registry.clips_on(track_id).cloned().collect(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests;
