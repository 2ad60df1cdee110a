// Dashboard interactor - Lists the signed-in user's saved projects

use std::sync::Arc;

use serde::Serialize;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::*;
use crate::ports::*;

/// What the dashboard page renders
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "camelCase")]
pub enum DashboardView {
    /// Saved projects, newest first; empty renders the "No videos yet!" panel
    Videos { user_id: String, videos: Vec<SavedVideo> },
    Redirect { to: String },
    Denied { reason: String },
}

pub struct DashboardInteractor {
    session_port: Arc<dyn SessionPort>,
    store_port: Arc<dyn PersistencePort>,
    policy: AccessPolicy,
    log_port: Arc<dyn LogPort>,
}

impl DashboardInteractor {
    pub fn new(
        session_port: Arc<dyn SessionPort>,
        store_port: Arc<dyn PersistencePort>,
        policy: AccessPolicy,
        log_port: Arc<dyn LogPort>,
    ) -> Self {
        Self {
            session_port,
            store_port,
            policy,
            log_port,
        }
    }

    pub async fn list(&self, context: &RequestContext) -> Result<DashboardView, DomainError> {
        let user = self.session_port.get_session(context).await?;

        match self.policy.decide(&context.path, user.as_ref()) {
            AccessDecision::Redirect { to } => return Ok(DashboardView::Redirect { to }),
            AccessDecision::Deny { reason } => return Ok(DashboardView::Denied { reason }),
            AccessDecision::Allow => {}
        }

        // A public dashboard path still needs someone to list for
        let Some(user) = user else {
            return Ok(DashboardView::Redirect {
                to: self.policy.sign_in_path.clone(),
            });
        };

        let videos = self.store_port.list_saved_videos(&user.id).await?;
        self.log_port
            .debug(&format!("listed {} saved videos for {}", videos.len(), user.id))
            .await;
        Ok(DashboardView::Videos {
            user_id: user.id,
            videos,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::session_static::StaticSessionAdapter;
    use crate::adapters::store_json::MemoryStoreAdapter;
    use crate::adapters::tracing_log::TracingLogAdapter;

    fn user(id: &str, role: Role) -> SessionUser {
        SessionUser {
            id: id.to_string(),
            name: None,
            email: None,
            role,
        }
    }

    fn saved(title: &str, user_id: &str) -> NewSavedVideo {
        NewSavedVideo {
            title: title.to_string(),
            user_id: user_id.to_string(),
            video_data: VideoData {
                trim: TrimData { start: 0.0, end: 5.0 },
            },
        }
    }

    fn dashboard(session: Option<SessionUser>, store: Arc<MemoryStoreAdapter>) -> DashboardInteractor {
        DashboardInteractor::new(
            Arc::new(StaticSessionAdapter::new(session)),
            store,
            AccessPolicy::default(),
            Arc::new(TracingLogAdapter::new()),
        )
    }

    #[tokio::test]
    async fn test_lists_own_videos_newest_first() {
        let store = Arc::new(MemoryStoreAdapter::new());
        store.create_saved_video(saved("Old", "u1")).await.unwrap();
        store.create_saved_video(saved("Theirs", "u2")).await.unwrap();
        store.create_saved_video(saved("New", "u1")).await.unwrap();

        let view = dashboard(Some(user("u1", Role::User)), store)
            .list(&RequestContext::for_path("/dashboard"))
            .await
            .unwrap();

        let (user_id, videos) = match view {
            DashboardView::Videos { user_id, videos } => (user_id, videos),
            other => panic!("expected videos, got {:?}", other),
        };
        assert_eq!(user_id, "u1");
        let titles: Vec<&str> = videos.iter().map(|v| v.title.as_str()).collect();
        assert_eq!(titles, vec!["New", "Old"]);
    }

    #[tokio::test]
    async fn test_anonymous_is_redirected() {
        let view = dashboard(None, Arc::new(MemoryStoreAdapter::new()))
            .list(&RequestContext::for_path("/dashboard"))
            .await
            .unwrap();
        assert_eq!(
            view,
            DashboardView::Redirect {
                to: "/sign-in".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_admin_area_denies_plain_users() {
        let view = dashboard(Some(user("u1", Role::User)), Arc::new(MemoryStoreAdapter::new()))
            .list(&RequestContext::for_path("/admin/videos"))
            .await
            .unwrap();
        assert_eq!(
            view,
            DashboardView::Denied {
                reason: "Permission Denied".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let result = dashboard(
            Some(user("u1", Role::Admin)),
            Arc::new(MemoryStoreAdapter::unavailable()),
        )
        .list(&RequestContext::for_path("/dashboard"))
        .await;
        assert!(matches!(result, Err(DomainError::Storage(_))));
    }
}
