// Transcode interactor - Drives preview/export runs against the engine

use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, MutexGuard, OnceCell};
use uuid::Uuid;

use crate::domain::command::*;
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::ExportNaming;
use crate::ports::*;

/// Process-wide, lazily loaded engine
///
/// The first caller runs the loader; concurrent callers wait on the same
/// initialisation. A failed load leaves the handle empty so the next run
/// tries again. The lease serialises use of the engine's filesystem.
pub struct EngineHandle {
    loader: Arc<dyn EngineLoader>,
    source: EngineSource,
    engine: OnceCell<Arc<dyn TranscodeEngine>>,
    lease: AsyncMutex<()>,
}

impl EngineHandle {
    pub fn new(loader: Arc<dyn EngineLoader>, source: EngineSource) -> Self {
        Self {
            loader,
            source,
            engine: OnceCell::new(),
            lease: AsyncMutex::new(()),
        }
    }

    /// Get the engine, loading it on first use
    pub async fn get(&self) -> Result<Arc<dyn TranscodeEngine>, DomainError> {
        let engine = self
            .engine
            .get_or_try_init(|| async {
                tracing::info!(core = %self.source.core_url, "loading transcoding engine");
                self.loader.load(&self.source).await
            })
            .await?;
        Ok(Arc::clone(engine))
    }

    /// Exclusive use of the engine filesystem for one write/exec/read span
    pub async fn lease(&self) -> MutexGuard<'_, ()> {
        self.lease.lock().await
    }
}

/// Result of asking the orchestrator to run
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// Another run was in flight; nothing happened
    Busy,
    Completed(TranscodeOutput),
    Failed(DomainError),
}

impl RunOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, RunOutcome::Completed(_))
    }
}

#[derive(Debug)]
struct OrchestratorState {
    state: OrchestrationState,
    last_status: Option<String>,
    last_output: Option<TranscodeOutput>,
}

/// Relays engine progress as status lines
struct StatusProgress<'a> {
    sink: &'a dyn StatusSink,
}

impl ProgressCallback for StatusProgress<'_> {
    fn on_progress(&self, fraction: f64) {
        let percent = (fraction.clamp(0.0, 1.0) * 100.0).round() as u32;
        self.sink.status(&format!("Processing: {}%", percent));
    }
}

/// Interactor for trim preview and export
pub struct TranscodeInteractor {
    engine: Arc<EngineHandle>,
    fetch_port: Arc<dyn SourceFetchPort>,
    delivery_port: Arc<dyn DeliveryPort>,
    log_port: Arc<dyn LogPort>,
    inner: Mutex<OrchestratorState>,
}

impl TranscodeInteractor {
    /// Create new transcode interactor with injected ports
    pub fn new(
        engine: Arc<EngineHandle>,
        fetch_port: Arc<dyn SourceFetchPort>,
        delivery_port: Arc<dyn DeliveryPort>,
        log_port: Arc<dyn LogPort>,
    ) -> Self {
        Self {
            engine,
            fetch_port,
            delivery_port,
            log_port,
            inner: Mutex::new(OrchestratorState {
                state: OrchestrationState::Idle,
                last_status: None,
                last_output: None,
            }),
        }
    }

    pub fn state(&self) -> OrchestrationState {
        self.lock().state
    }

    pub fn last_status(&self) -> Option<String> {
        self.lock().last_status.clone()
    }

    /// Output of the most recent successful run
    pub fn last_output(&self) -> Option<TranscodeOutput> {
        self.lock().last_output.clone()
    }

    pub async fn preview(
        &self,
        source: Option<SourceRef>,
        range: TrimRange,
        status: &dyn StatusSink,
    ) -> RunOutcome {
        self.run(TranscodeRequest::preview(source, range), status).await
    }

    pub async fn export(
        &self,
        source: Option<SourceRef>,
        range: TrimRange,
        title: &str,
        status: &dyn StatusSink,
    ) -> RunOutcome {
        self.run(TranscodeRequest::export(source, range, title), status)
            .await
    }

    /// One orchestration run; a trigger while another is in flight is a no-op
    ///
    /// Dropping the returned future mid-run puts the orchestrator back to
    /// Idle and removes whatever the run had staged in the engine.
    pub async fn run(&self, request: TranscodeRequest, status: &dyn StatusSink) -> RunOutcome {
        let (source, in_flight) = match self.begin(&request) {
            Begin::Busy => {
                tracing::debug!("transcode already in flight, ignoring trigger");
                return RunOutcome::Busy;
            }
            Begin::NoSource => {
                status.state_changed(OrchestrationState::Error);
                return self.fail(DomainError::MissingSource, status).await;
            }
            Begin::Started(source, in_flight) => (source, in_flight),
        };
        status.state_changed(OrchestrationState::Initializing);

        let result = self.drive(&request, &source, status).await;
        // finish/fail settle the state before their first await
        in_flight.disarm();
        match result {
            Ok(output) => self.finish(output, &request, status).await,
            Err(error) => {
                self.set_state(OrchestrationState::Error, status);
                self.fail(error, status).await
            }
        }
    }

    /// Atomically move Idle -> Initializing, or report why not
    fn begin(&self, request: &TranscodeRequest) -> Begin<'_> {
        let mut inner = self.lock();
        if !inner.state.is_idle() {
            return Begin::Busy;
        }
        match &request.source {
            None => {
                inner.state = OrchestrationState::Error;
                Begin::NoSource
            }
            Some(source) => {
                inner.state = OrchestrationState::Initializing;
                Begin::Started(
                    source.clone(),
                    InFlight {
                        inner: &self.inner,
                        armed: true,
                    },
                )
            }
        }
    }

    /// initializing -> writingInput -> executing -> readingOutput -> done
    async fn drive(
        &self,
        request: &TranscodeRequest,
        source: &SourceRef,
        status: &dyn StatusSink,
    ) -> Result<TranscodeOutput, DomainError> {
        status.status(match request.target {
            TranscodeTarget::Preview => "Initializing FFmpeg...",
            TranscodeTarget::Export => "Preparing for export...",
        });

        let engine = self.engine.get().await?;

        self.set_state(OrchestrationState::WritingInput, status);
        let input = self.fetch_port.fetch(source).await?;
        self.log_port
            .debug(&format!("fetched {} bytes from {}", input.len(), source))
            .await;

        let names = StagingNames::for_run(Uuid::new_v4());
        let plan = TranscodeCommandBuilder::trim(&request.range, &names);
        let staged = StagedRun::new(Arc::clone(&engine), &names);

        let bytes = {
            let _lease = self.engine.lease().await;
            let result = self
                .stage_execute_read(engine.as_ref(), &plan, &input, request.target, status)
                .await;
            staged.release().await;
            result?
        };
        drop(input);

        self.set_state(OrchestrationState::Done, status);
        self.deliver(request, bytes).await
    }

    async fn stage_execute_read(
        &self,
        engine: &dyn TranscodeEngine,
        plan: &TranscodePlan,
        input: &[u8],
        target: TranscodeTarget,
        status: &dyn StatusSink,
    ) -> Result<Vec<u8>, DomainError> {
        engine.write_file(&plan.input_name, input).await?;

        self.set_state(OrchestrationState::Executing, status);
        if target == TranscodeTarget::Export {
            status.status("Exporting video... (using copy codec)");
        }
        self.log_port
            .info(&format!("running engine: {}", plan.argv.join(" ")))
            .await;
        let exit = engine.exec(&plan.argv, &StatusProgress { sink: status }).await?;
        if exit != 0 {
            return Err(DomainError::EngineExec(format!("exit status {}", exit)));
        }

        self.set_state(OrchestrationState::ReadingOutput, status);
        match engine.read_file(&plan.output_name).await? {
            EnginePayload::Binary(bytes) => Ok(bytes),
            EnginePayload::Text(_) => Err(DomainError::UnexpectedOutput),
        }
    }

    async fn deliver(
        &self,
        request: &TranscodeRequest,
        bytes: Vec<u8>,
    ) -> Result<TranscodeOutput, DomainError> {
        let size = bytes.len();
        match request.target {
            TranscodeTarget::Preview => {
                let url = self.delivery_port.present_preview(&bytes).await?;
                Ok(TranscodeOutput::Preview { url, bytes: size })
            }
            TranscodeTarget::Export => {
                let file_name = ExportNaming::file_name(&request.title);
                let location = self.delivery_port.offer_download(&file_name, &bytes).await?;
                Ok(TranscodeOutput::Download {
                    file_name,
                    location,
                    bytes: size,
                })
            }
        }
    }

    async fn finish(
        &self,
        output: TranscodeOutput,
        request: &TranscodeRequest,
        status: &dyn StatusSink,
    ) -> RunOutcome {
        let message = match request.target {
            TranscodeTarget::Preview => "Trim preview complete!",
            TranscodeTarget::Export => "Export complete!",
        };
        {
            let mut inner = self.lock();
            inner.last_status = Some(message.to_string());
            inner.last_output = Some(output.clone());
            inner.state = OrchestrationState::Idle;
        }
        status.status(message);
        status.state_changed(OrchestrationState::Idle);
        self.log_port.info(message).await;
        RunOutcome::Completed(output)
    }

    /// Surface the error and reset; prior output is left as it was
    async fn fail(&self, error: DomainError, status: &dyn StatusSink) -> RunOutcome {
        let message = format!("Error: {}", error);
        {
            let mut inner = self.lock();
            inner.last_status = Some(message.clone());
            inner.state = OrchestrationState::Idle;
        }
        status.status(&message);
        status.state_changed(OrchestrationState::Idle);
        self.log_port.error(&message).await;
        RunOutcome::Failed(error)
    }

    fn set_state(&self, state: OrchestrationState, status: &dyn StatusSink) {
        self.lock().state = state;
        tracing::debug!(?state, "orchestration state");
        status.state_changed(state);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, OrchestratorState> {
        lock_state(&self.inner)
    }
}

fn lock_state(inner: &Mutex<OrchestratorState>) -> std::sync::MutexGuard<'_, OrchestratorState> {
    inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

enum Begin<'a> {
    Busy,
    NoSource,
    Started(SourceRef, InFlight<'a>),
}

/// Holds the orchestrator out of Idle for one run
///
/// An armed guard that is dropped, i.e. the run future went away before
/// settling, resets the state to Idle so later triggers are not refused.
struct InFlight<'a> {
    inner: &'a Mutex<OrchestratorState>,
    armed: bool,
}

impl InFlight<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut inner = lock_state(self.inner);
        tracing::warn!(state = ?inner.state, "transcode run dropped before completion");
        inner.state = OrchestrationState::Idle;
        inner.last_status = Some(format!("Error: {}", DomainError::Cancelled));
    }
}

/// Engine files belonging to one run
///
/// `release` removes every file carrying the run prefix. If the guard is
/// dropped unreleased the removal is spawned onto the current runtime.
pub(crate) struct StagedRun {
    engine: Arc<dyn TranscodeEngine>,
    prefix: String,
    armed: bool,
}

impl StagedRun {
    pub(crate) fn new(engine: Arc<dyn TranscodeEngine>, names: &StagingNames) -> Self {
        Self {
            engine,
            prefix: names.prefix.clone(),
            armed: true,
        }
    }

    pub(crate) async fn release(mut self) {
        remove_prefixed(self.engine.as_ref(), &self.prefix).await;
        self.armed = false;
    }
}

impl Drop for StagedRun {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let engine = Arc::clone(&self.engine);
        let prefix = std::mem::take(&mut self.prefix);
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(async move {
                    remove_prefixed(engine.as_ref(), &prefix).await;
                });
            }
            Err(_) => tracing::warn!(prefix = %prefix, "no runtime left to remove staged files"),
        }
    }
}

/// Best-effort removal of every file staged under `prefix`
async fn remove_prefixed(engine: &dyn TranscodeEngine, prefix: &str) {
    if prefix.is_empty() {
        return;
    }
    let entries = match engine.list_dir(".").await {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!(prefix = %prefix, error = %e, "staged files not listed");
            return;
        }
    };
    for entry in entries.iter().filter(|entry| !entry.is_dir && entry.name.starts_with(prefix)) {
        if let Err(e) = engine.delete_file(&entry.name).await {
            tracing::debug!(file = %entry.name, error = %e, "staged file not removed");
        }
    }
}
