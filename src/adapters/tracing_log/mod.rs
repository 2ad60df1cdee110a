// Tracing log adapter - Structured logging using tracing crate

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::ports::*;

/// Tracing log adapter
///
/// Filtering and formatting belong to the subscriber installed in `main`;
/// this adapter only tags events with the interactor component.
pub struct TracingLogAdapter {
    component: &'static str,
}

impl TracingLogAdapter {
    pub fn new() -> Self {
        Self::for_component("trimdesk")
    }

    pub fn for_component(component: &'static str) -> Self {
        Self { component }
    }
}

impl Default for TracingLogAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LogPort for TracingLogAdapter {
    async fn info(&self, message: &str) {
        info!(component = self.component, "{}", message);
    }

    async fn warn(&self, message: &str) {
        warn!(component = self.component, "{}", message);
    }

    async fn error(&self, message: &str) {
        error!(component = self.component, "{}", message);
    }

    async fn debug(&self, message: &str) {
        debug!(component = self.component, "{}", message);
    }
}
