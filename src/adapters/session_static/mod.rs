// Static session adapter - Identity supplied by configuration

use async_trait::async_trait;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

/// Answers every request with the same configured user, or with no session
pub struct StaticSessionAdapter {
    user: Option<SessionUser>,
}

impl StaticSessionAdapter {
    pub fn new(user: Option<SessionUser>) -> Self {
        Self { user }
    }

    pub fn anonymous() -> Self {
        Self { user: None }
    }
}

#[async_trait]
impl SessionPort for StaticSessionAdapter {
    async fn get_session(&self, context: &RequestContext) -> Result<Option<SessionUser>, DomainError> {
        tracing::trace!(path = %context.path, signed_in = self.user.is_some(), "session lookup");
        Ok(self.user.clone())
    }
}
