// Filmstrip interactor - Extracts timeline thumbnails through the shared engine

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::app::transcode_interactor::{EngineHandle, StagedRun};
use crate::domain::command::*;
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

/// One extracted thumbnail
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilmstripFrame {
    /// Name without the run prefix, e.g. `frame-001.png`
    pub name: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

/// Thumbnails in playback order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Filmstrip {
    pub frames: Vec<FilmstripFrame>,
    pub frame_width: u32,
    pub frame_height: u32,
}

impl Filmstrip {
    /// Width of the strip with every frame laid side by side
    pub fn strip_width(&self) -> u32 {
        self.frames.len() as u32 * self.frame_width
    }
}

struct ExtractProgress<'a> {
    sink: &'a dyn StatusSink,
}

impl ProgressCallback for ExtractProgress<'_> {
    fn on_progress(&self, fraction: f64) {
        let percent = (fraction.clamp(0.0, 1.0) * 100.0).round() as u32;
        self.sink.status(&format!("Extracting: {}%", percent));
    }
}

/// Interactor for filmstrip extraction
pub struct FilmstripInteractor {
    engine: Arc<EngineHandle>,
    fetch_port: Arc<dyn SourceFetchPort>,
    log_port: Arc<dyn LogPort>,
}

impl FilmstripInteractor {
    pub fn new(
        engine: Arc<EngineHandle>,
        fetch_port: Arc<dyn SourceFetchPort>,
        log_port: Arc<dyn LogPort>,
    ) -> Self {
        Self {
            engine,
            fetch_port,
            log_port,
        }
    }

    /// Extract one frame every few seconds of `source`
    pub async fn extract(
        &self,
        source: Option<&SourceRef>,
        status: &dyn StatusSink,
    ) -> Result<Filmstrip, DomainError> {
        let result = match source {
            Some(source) => self.run(source, status).await,
            None => Err(DomainError::MissingSource),
        };

        match &result {
            Ok(strip) => {
                self.log_port
                    .info(&format!("filmstrip ready: {} frames", strip.frames.len()))
                    .await;
            }
            Err(e) => {
                status.status("Error loading filmstrip.");
                self.log_port.error(&format!("filmstrip failed: {}", e)).await;
            }
        }
        result
    }

    async fn run(&self, source: &SourceRef, status: &dyn StatusSink) -> Result<Filmstrip, DomainError> {
        status.status("Extracting: 0%");
        let engine = self.engine.get().await?;
        let input = self.fetch_port.fetch(source).await?;

        let names = StagingNames::for_run(Uuid::new_v4());
        let plan = TranscodeCommandBuilder::filmstrip(&names);

        let staged = StagedRun::new(Arc::clone(&engine), &names);

        let _lease = self.engine.lease().await;
        let result = self.extract_frames(engine.as_ref(), &plan, &names, &input, status).await;
        // Input plus any partial frames of a failed run
        staged.release().await;
        result
    }

    async fn extract_frames(
        &self,
        engine: &dyn TranscodeEngine,
        plan: &TranscodePlan,
        names: &StagingNames,
        input: &[u8],
        status: &dyn StatusSink,
    ) -> Result<Filmstrip, DomainError> {
        engine.write_file(&plan.input_name, input).await?;

        self.log_port
            .debug(&format!("running engine: {}", plan.argv.join(" ")))
            .await;
        let exit = engine.exec(&plan.argv, &ExtractProgress { sink: status }).await?;
        if exit != 0 {
            return Err(DomainError::EngineExec(format!("exit status {}", exit)));
        }

        status.status("Drawing frames...");
        let mut frame_names: Vec<String> = engine
            .list_dir(".")
            .await?
            .into_iter()
            .filter(|entry| !entry.is_dir && names.is_frame(&entry.name))
            .map(|entry| entry.name)
            .collect();
        frame_names.sort();

        if frame_names.is_empty() {
            return Err(DomainError::NoFrames);
        }

        let mut frames = Vec::with_capacity(frame_names.len());
        for name in &frame_names {
            let bytes = match engine.read_file(name).await? {
                EnginePayload::Binary(bytes) => bytes,
                EnginePayload::Text(_) => return Err(DomainError::UnexpectedOutput),
            };
            engine.delete_file(name).await?;
            frames.push(FilmstripFrame {
                name: name.trim_start_matches(names.prefix.as_str()).to_string(),
                bytes,
            });
        }

        Ok(Filmstrip {
            frames,
            frame_width: FILMSTRIP_FRAME_WIDTH,
            frame_height: FILMSTRIP_FRAME_HEIGHT,
        })
    }
}

#[cfg(test)]
mod tests;
