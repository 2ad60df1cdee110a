// Sign-in interactor - Email magic link behind a human verification check

use std::sync::Arc;

use crate::domain::model::FormState;
use crate::ports::*;

pub const MISSING_FIELDS: &str = "Email and token are required.";
pub const VERIFICATION_FAILED: &str = "CAPTCHA verification failed. Please try again.";
pub const LINK_FAILED: &str = "Something went wrong. Please try again.";
pub const LINK_SENT: &str = "Check your email for a sign-in link!";

pub struct SignInInteractor {
    verification_port: Arc<dyn HumanVerificationPort>,
    magic_link_port: Arc<dyn MagicLinkPort>,
    log_port: Arc<dyn LogPort>,
}

impl SignInInteractor {
    pub fn new(
        verification_port: Arc<dyn HumanVerificationPort>,
        magic_link_port: Arc<dyn MagicLinkPort>,
        log_port: Arc<dyn LogPort>,
    ) -> Self {
        Self {
            verification_port,
            magic_link_port,
            log_port,
        }
    }

    pub async fn sign_in_with_email(&self, email: &str, token: &str) -> FormState {
        let email = email.trim();
        if email.is_empty() || token.trim().is_empty() {
            return FormState::failure(MISSING_FIELDS);
        }

        match self.verification_port.verify(token).await {
            Ok(outcome) if outcome.success => {}
            Ok(outcome) => {
                self.log_port
                    .warn(&format!("verification rejected: {}", outcome.error_codes.join(", ")))
                    .await;
                return FormState::failure(VERIFICATION_FAILED);
            }
            Err(e) => {
                self.log_port.warn(&format!("verification unavailable: {}", e)).await;
                return FormState::failure(VERIFICATION_FAILED);
            }
        }

        match self.magic_link_port.send_sign_in_link(email).await {
            Ok(()) => FormState::succeeded(LINK_SENT),
            Err(e) => {
                self.log_port.error(&format!("sign-in link failed: {}", e)).await;
                FormState::failure(LINK_FAILED)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::adapters::tracing_log::TracingLogAdapter;
    use crate::domain::errors::DomainError;

    struct FixedVerifier(Result<VerificationOutcome, DomainError>);

    #[async_trait]
    impl HumanVerificationPort for FixedVerifier {
        async fn verify(&self, _token: &str) -> Result<VerificationOutcome, DomainError> {
            self.0.clone()
        }
    }

    #[derive(Default)]
    struct RecordingMailer {
        fail: bool,
        sent: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl MagicLinkPort for RecordingMailer {
        async fn send_sign_in_link(&self, email: &str) -> Result<(), DomainError> {
            if self.fail {
                return Err(DomainError::InternalError("smtp down".to_string()));
            }
            self.sent.lock().unwrap().push(email.to_string());
            Ok(())
        }
    }

    fn accepted() -> Result<VerificationOutcome, DomainError> {
        Ok(VerificationOutcome {
            success: true,
            error_codes: Vec::new(),
        })
    }

    fn sign_in(
        verdict: Result<VerificationOutcome, DomainError>,
        mailer: Arc<RecordingMailer>,
    ) -> SignInInteractor {
        SignInInteractor::new(
            Arc::new(FixedVerifier(verdict)),
            mailer,
            Arc::new(TracingLogAdapter::new()),
        )
    }

    #[tokio::test]
    async fn test_link_sent_after_verification() {
        let mailer = Arc::new(RecordingMailer::default());
        let state = sign_in(accepted(), Arc::clone(&mailer))
            .sign_in_with_email("ada@example.com", "tok")
            .await;
        assert_eq!(state, FormState::succeeded(LINK_SENT));
        assert_eq!(*mailer.sent.lock().unwrap(), vec!["ada@example.com".to_string()]);
    }

    #[tokio::test]
    async fn test_missing_fields() {
        let mailer = Arc::new(RecordingMailer::default());
        let interactor = sign_in(accepted(), Arc::clone(&mailer));
        assert_eq!(
            interactor.sign_in_with_email("", "tok").await.error.as_deref(),
            Some(MISSING_FIELDS)
        );
        assert_eq!(
            interactor.sign_in_with_email("ada@example.com", "").await.error.as_deref(),
            Some(MISSING_FIELDS)
        );
        assert!(mailer.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rejected_token_sends_nothing() {
        let mailer = Arc::new(RecordingMailer::default());
        let rejected = Ok(VerificationOutcome {
            success: false,
            error_codes: vec!["timeout-or-duplicate".to_string()],
        });
        let state = sign_in(rejected, Arc::clone(&mailer))
            .sign_in_with_email("ada@example.com", "tok")
            .await;
        assert_eq!(state.error.as_deref(), Some(VERIFICATION_FAILED));
        assert!(mailer.sent.lock().unwrap().is_empty());

        let unreachable = Err(DomainError::Verification("connection refused".to_string()));
        let state = sign_in(unreachable, Arc::clone(&mailer))
            .sign_in_with_email("ada@example.com", "tok")
            .await;
        assert_eq!(state.error.as_deref(), Some(VERIFICATION_FAILED));
    }

    #[tokio::test]
    async fn test_mailer_failure_is_generic() {
        let mailer = Arc::new(RecordingMailer {
            fail: true,
            ..RecordingMailer::default()
        });
        let state = sign_in(accepted(), mailer)
            .sign_in_with_email("ada@example.com", "tok")
            .await;
        assert_eq!(state, FormState::failure(LINK_FAILED));
    }
}
