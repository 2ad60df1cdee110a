// Admin interactor - User directory for administrators

use std::sync::Arc;

use serde::Serialize;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::*;
use crate::ports::*;

/// Page the user directory lives on
pub const ADMIN_PATH: &str = "/admin";

/// What the admin page renders
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "camelCase")]
pub enum AdminView {
    /// Every known user; `viewer` is the admin's display name
    Users { viewer: String, users: Vec<SessionUser> },
    Redirect { to: String },
    Denied { reason: String },
}

pub struct AdminInteractor {
    session_port: Arc<dyn SessionPort>,
    store_port: Arc<dyn PersistencePort>,
    policy: AccessPolicy,
    log_port: Arc<dyn LogPort>,
}

impl AdminInteractor {
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

    /// List users; only an ADMIN session gets past the guard
    pub async fn users(&self, context: &RequestContext) -> Result<AdminView, DomainError> {
        let user = self.session_port.get_session(context).await?;

        match self.policy.decide(&context.path, user.as_ref()) {
            AccessDecision::Redirect { to } => return Ok(AdminView::Redirect { to }),
            AccessDecision::Deny { reason } => return Ok(AdminView::Denied { reason }),
            AccessDecision::Allow => {}
        }

        // The directory stays admin-only even under a policy that leaves the path open
        let admin = match user {
            Some(user) if user.is_admin() => user,
            Some(_) => {
                return Ok(AdminView::Denied {
                    reason: "Permission Denied".to_string(),
                })
            }
            None => {
                return Ok(AdminView::Redirect {
                    to: self.policy.sign_in_path.clone(),
                })
            }
        };

        let users = self.store_port.list_users().await?;
        self.log_port
            .debug(&format!("{} listed {} users", admin.id, users.len()))
            .await;
        Ok(AdminView::Users {
            viewer: admin.name.unwrap_or(admin.id),
            users,
        })
    }
}
