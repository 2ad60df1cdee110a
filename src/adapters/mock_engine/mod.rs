//! In-memory transcoding engine
//!
//! Stands in for ffmpeg on dry runs and in tests. Trim commands copy the
//! staged input to the output name untouched; filmstrip commands produce a
//! fixed number of placeholder frames. Every argv is recorded.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::errors::*;
use crate::ports::*;

/// Knobs for simulating engine behaviour
#[derive(Debug, Clone, Default)]
pub struct MockBehavior {
    /// Exit status returned by every exec
    pub exit_status: i32,
    /// Exec fails outright with this message
    pub exec_error: Option<String>,
    /// read_file answers with text instead of bytes
    pub text_output: bool,
    /// Bytes written as trim output instead of copying the input
    pub output_override: Option<Vec<u8>>,
    /// Frames produced by a `%03d` output pattern
    pub frames: usize,
    /// Exec waits this long before doing anything
    pub exec_delay: Option<Duration>,
}

/// In-memory engine adapter
pub struct MockEngineAdapter {
    files: Mutex<BTreeMap<String, Vec<u8>>>,
    commands: Mutex<Vec<Vec<String>>>,
    behavior: MockBehavior,
}

impl MockEngineAdapter {
    pub fn new() -> Self {
        Self::with_behavior(MockBehavior {
            frames: 3,
            ..MockBehavior::default()
        })
    }

    pub fn with_behavior(behavior: MockBehavior) -> Self {
        Self {
            files: Mutex::new(BTreeMap::new()),
            commands: Mutex::new(Vec::new()),
            behavior,
        }
    }

    /// Every argv passed to exec, oldest first
    pub fn commands(&self) -> Vec<Vec<String>> {
        lock(&self.commands).clone()
    }

    /// Names currently present in the virtual filesystem
    pub fn file_names(&self) -> Vec<String> {
        lock(&self.files).keys().cloned().collect()
    }

    /// Pre-seed a file, e.g. to check that a run does not touch it
    pub fn insert_file(&self, name: &str, bytes: Vec<u8>) {
        lock(&self.files).insert(name.to_string(), bytes);
    }
}

impl Default for MockEngineAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TranscodeEngine for MockEngineAdapter {
    async fn write_file(&self, name: &str, bytes: &[u8]) -> Result<(), DomainError> {
        lock(&self.files).insert(name.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn exec(&self, argv: &[String], progress: &dyn ProgressCallback) -> Result<i32, DomainError> {
        lock(&self.commands).push(argv.to_vec());

        if let Some(delay) = self.behavior.exec_delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(message) = &self.behavior.exec_error {
            return Err(DomainError::EngineExec(message.clone()));
        }

        let input_name = argv
            .iter()
            .position(|arg| arg == "-i")
            .and_then(|i| argv.get(i + 1))
            .ok_or_else(|| DomainError::EngineExec("no input given".to_string()))?;
        let output_name = argv
            .last()
            .ok_or_else(|| DomainError::EngineExec("no output given".to_string()))?;

        let input = lock(&self.files)
            .get(input_name)
            .cloned()
            .ok_or_else(|| DomainError::EngineExec(format!("{}: No such file or directory", input_name)))?;

        progress.on_progress(0.0);
        progress.on_progress(0.5);

        {
            let mut files = lock(&self.files);
            if output_name.contains("%03d") {
                for n in 1..=self.behavior.frames {
                    let name = output_name.replace("%03d", &format!("{:03}", n));
                    files.insert(name, format!("frame {}", n).into_bytes());
                }
            } else {
                let output = self.behavior.output_override.clone().unwrap_or(input);
                files.insert(output_name.clone(), output);
            }
        }

        progress.on_progress(1.0);
        Ok(self.behavior.exit_status)
    }

    async fn read_file(&self, name: &str) -> Result<EnginePayload, DomainError> {
        let files = lock(&self.files);
        let bytes = files
            .get(name)
            .ok_or_else(|| DomainError::EngineRead(format!("{}: No such file", name)))?;
        if self.behavior.text_output {
            return Ok(EnginePayload::Text(String::from_utf8_lossy(bytes).into_owned()));
        }
        Ok(EnginePayload::Binary(bytes.clone()))
    }

    async fn list_dir(&self, _path: &str) -> Result<Vec<DirEntry>, DomainError> {
        Ok(lock(&self.files)
            .keys()
            .map(|name| DirEntry {
                name: name.clone(),
                is_dir: false,
            })
            .collect())
    }

    async fn delete_file(&self, name: &str) -> Result<(), DomainError> {
        lock(&self.files)
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| DomainError::EngineWrite(format!("{}: No such file", name)))
    }
}

/// Loader handing out one shared [`MockEngineAdapter`]
pub struct MockEngineLoader {
    engine: Arc<MockEngineAdapter>,
    loads: AtomicUsize,
    failures_left: AtomicUsize,
}

impl MockEngineLoader {
    pub fn new(engine: Arc<MockEngineAdapter>) -> Self {
        Self {
            engine,
            loads: AtomicUsize::new(0),
            failures_left: AtomicUsize::new(0),
        }
    }

    /// Fail the next `count` loads
    pub fn failing(engine: Arc<MockEngineAdapter>, count: usize) -> Self {
        let loader = Self::new(engine);
        loader.failures_left.store(count, Ordering::SeqCst);
        loader
    }

    /// Number of load attempts so far
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EngineLoader for MockEngineLoader {
    async fn load(&self, _source: &EngineSource) -> Result<Arc<dyn TranscodeEngine>, DomainError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;

        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if failing {
            return Err(DomainError::EngineLoad("simulated load failure".to_string()));
        }
        Ok(Arc::clone(&self.engine) as Arc<dyn TranscodeEngine>)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
