// Save video interactor - Persists the current trim as a project

use std::sync::Arc;

use crate::domain::model::*;
use crate::domain::rules::*;
use crate::ports::*;

pub const NOT_SIGNED_IN: &str = "You must be logged in to save a video.";
pub const SAVE_FAILED: &str = "Database error: Failed to save video.";
pub const SAVED: &str = "Video saved successfully!";

/// Interactor for the save action
pub struct SaveVideoInteractor {
    session_port: Arc<dyn SessionPort>,
    store_port: Arc<dyn PersistencePort>,
    log_port: Arc<dyn LogPort>,
}

impl SaveVideoInteractor {
    pub fn new(
        session_port: Arc<dyn SessionPort>,
        store_port: Arc<dyn PersistencePort>,
        log_port: Arc<dyn LogPort>,
    ) -> Self {
        Self {
            session_port,
            store_port,
            log_port,
        }
    }

    /// Session check, then validation, then storage; the first failure is reported
    pub async fn save(&self, context: &RequestContext, form: &SaveVideoForm) -> FormState {
        let user = match self.session_port.get_session(context).await {
            Ok(Some(user)) if !user.id.is_empty() => user,
            Ok(_) => return FormState::failure(NOT_SIGNED_IN),
            Err(e) => {
                self.log_port.warn(&format!("session lookup failed: {}", e)).await;
                return FormState::failure(NOT_SIGNED_IN);
            }
        };

        let validated = match SaveVideoValidator::validate(form) {
            Ok(validated) => validated,
            Err(e) => return FormState::failure(e.to_string()),
        };

        if let Err(e) = self.store_port.record_user(&user).await {
            self.log_port.error(&format!("user not recorded: {}", e)).await;
            return FormState::failure(SAVE_FAILED);
        }

        let record = NewSavedVideo {
            title: validated.title,
            user_id: user.id,
            video_data: VideoData::from(validated.range),
        };
        match self.store_port.create_saved_video(record).await {
            Ok(saved) => {
                self.log_port
                    .info(&format!("saved video {} for {}", saved.id, saved.user_id))
                    .await;
                FormState::succeeded(SAVED)
            }
            Err(e) => {
                self.log_port.error(&format!("save failed: {}", e)).await;
                FormState::failure(SAVE_FAILED)
            }
        }
    }
}
