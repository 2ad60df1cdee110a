// Domain rules - Business logic and policies

use serde::{Deserialize, Serialize};

use crate::domain::errors::*;
use crate::domain::model::*;

/// Which media types may occupy which lane
pub struct TrackAssignmentRules;

impl TrackAssignmentRules {
    /// Check that a clip of `media_type` may sit on `target`
    pub fn check(media_type: MediaType, target: TrackId) -> Result<(), DomainError> {
        match (media_type, target) {
            (MediaType::Video, track) if track != TrackId::VIDEO => Err(
                DomainError::TrackRejected("Video can only be on V1.".to_string()),
            ),
            (MediaType::Audio, TrackId::VIDEO) => Err(DomainError::TrackRejected(
                "Audio cannot be on V1.".to_string(),
            )),
            _ => Ok(()),
        }
    }

    pub fn allows(media_type: MediaType, target: TrackId) -> bool {
        Self::check(media_type, target).is_ok()
    }
}

/// Minimum title length accepted by the save form
pub const MIN_TITLE_CHARS: usize = 3;

/// A save form that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedSave {
    pub title: String,
    pub range: TrimRange,
}

/// Save form validation; the first failing field wins
pub struct SaveVideoValidator;

impl SaveVideoValidator {
    /// Validate in field order title, start, end, then the cross-field check
    pub fn validate(form: &SaveVideoForm) -> Result<ValidatedSave, DomainError> {
        if form.title.chars().count() < MIN_TITLE_CHARS {
            return Err(DomainError::Validation(
                "Title must be at least 3 characters.".to_string(),
            ));
        }

        let start = coerce_number(&form.start_time)
            .ok_or_else(|| DomainError::Validation("Start time must be a number.".to_string()))?;
        if start < 0.0 {
            return Err(DomainError::Validation(
                "Start time must be positive.".to_string(),
            ));
        }

        let end = coerce_number(&form.end_time)
            .ok_or_else(|| DomainError::Validation("End time must be a number.".to_string()))?;
        if end <= 0.0 {
            return Err(DomainError::Validation(
                "End time must be greater than 0.".to_string(),
            ));
        }

        if end <= start {
            return Err(DomainError::Validation(
                "End time must be after start time.".to_string(),
            ));
        }

        let range = TrimRange::from_seconds(start, end)
            .map_err(|e| DomainError::Validation(e.to_string()))?;

        Ok(ValidatedSave {
            title: form.title.clone(),
            range,
        })
    }
}

/// Form number coercion: blank means zero, anything unparsable or infinite is rejected
fn coerce_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    trimmed.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Fallback stem when the title sanitizes to nothing
pub const DEFAULT_EXPORT_STEM: &str = "clip_export";

/// Download naming for exports
pub struct ExportNaming;

impl ExportNaming {
    /// Whitespace runs become `_`, path-hostile characters become `_`, `.mp4` is appended
    pub fn file_name(title: &str) -> String {
        let mut stem = String::with_capacity(title.len());
        let mut in_whitespace = false;
        for ch in title.chars() {
            if ch.is_whitespace() {
                if !in_whitespace {
                    stem.push('_');
                }
                in_whitespace = true;
                continue;
            }
            in_whitespace = false;
            match ch {
                '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => stem.push('_'),
                c if c.is_control() => stem.push('_'),
                c => stem.push(c),
            }
        }

        if stem.is_empty() || stem.chars().all(|c| c == '.') {
            stem = DEFAULT_EXPORT_STEM.to_string();
        }

        format!("{}.mp4", stem)
    }
}

/// Result of evaluating a route against the session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "lowercase")]
pub enum AccessDecision {
    Allow,
    /// Unauthenticated on a gated route
    Redirect { to: String },
    /// Authenticated but the role is insufficient; rendered as a denial view
    Deny { reason: String },
}

/// Route access policy applied uniformly to every page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessPolicy {
    /// Prefixes that need any signed-in user
    pub gated_prefixes: Vec<String>,
    /// Prefixes that need an admin
    pub admin_prefixes: Vec<String>,
    pub sign_in_path: String,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self {
            gated_prefixes: vec!["/edit".to_string(), "/dashboard".to_string()],
            admin_prefixes: vec!["/admin".to_string()],
            sign_in_path: "/sign-in".to_string(),
        }
    }
}

impl AccessPolicy {
    pub fn decide(&self, path: &str, user: Option<&SessionUser>) -> AccessDecision {
        let needs_admin = self.admin_prefixes.iter().any(|p| path_matches(path, p));
        let needs_user = needs_admin || self.gated_prefixes.iter().any(|p| path_matches(path, p));

        if !needs_user {
            return AccessDecision::Allow;
        }

        let Some(user) = user else {
            return AccessDecision::Redirect {
                to: self.sign_in_path.clone(),
            };
        };

        if needs_admin && !user.is_admin() {
            return AccessDecision::Deny {
                reason: "Permission Denied".to_string(),
            };
        }

        AccessDecision::Allow
    }
}

/// `/dashboard` matches `/dashboard` and `/dashboard/x`, not `/dashboards`
fn path_matches(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return true;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/') || rest.starts_with('?'),
        None => false,
    }
}
