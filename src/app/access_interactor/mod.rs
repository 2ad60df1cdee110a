// Access interactor - Route guard in front of every page

use std::sync::Arc;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::*;
use crate::ports::*;

pub struct AccessInteractor {
    session_port: Arc<dyn SessionPort>,
    policy: AccessPolicy,
    log_port: Arc<dyn LogPort>,
}

impl AccessInteractor {
    pub fn new(session_port: Arc<dyn SessionPort>, policy: AccessPolicy, log_port: Arc<dyn LogPort>) -> Self {
        Self {
            session_port,
            policy,
            log_port,
        }
    }

    /// Decide whether the request may see `context.path`
    pub async fn check(&self, context: &RequestContext) -> Result<AccessDecision, DomainError> {
        let user = self.session_port.get_session(context).await?;
        let decision = self.policy.decide(&context.path, user.as_ref());
        if decision != AccessDecision::Allow {
            self.log_port
                .info(&format!("{} -> {:?}", context.path, decision))
                .await;
        }
        Ok(decision)
    }
}
