//! External annotation producer.
//!
//! A segmentation model propagates the previous frame's annotations to the
//! next frame. The editor asks for a frame, keeps handling pointer events,
//! and later merges whatever came back through the normal store API.
//!
//! [`ProcessProducer`] runs the model as a subprocess on a background
//! thread. The command receives the frame number as its last argument,
//! prints a `{"success", "message", "error"}` status line on stdout, and
//! writes `frame_NNNNNN.json` into its output folder.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

use serde::Deserialize;
use thiserror::Error;

use crate::format::{FormatError, ImageAnnotations};
use crate::model::{FileKey, FileRef};

/// Frame 1 is the manually annotated reference; prediction starts at 2.
pub const MIN_FRAME: u32 = 2;

/// Errors from requesting or running the model.
#[derive(Error, Debug)]
pub enum ProducerError {
    /// Frame numbers below [`MIN_FRAME`] have no reference frame
    #[error("Invalid frame {0}: must be an integer greater than 1")]
    InvalidFrame(u32),

    /// The model command could not be started
    #[error("Failed to start model process '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The model ran but reported failure
    #[error("Model failed on frame {frame}: {message}")]
    ModelFailed { frame: u32, message: String },

    /// The status line was missing or not JSON
    #[error("Invalid response from model for frame {frame}: {details}")]
    InvalidResponse { frame: u32, details: String },

    /// The reported output document could not be read
    #[error("Model output for frame {frame} unreadable: {source}")]
    Output {
        frame: u32,
        #[source]
        source: FormatError,
    },

    /// The worker thread is gone
    #[error("Model worker is not running")]
    Disconnected,

    /// The file name carries no frame number
    #[error("'{0}' is not a numbered frame")]
    NotAFrame(String),

    /// No model runner was attached to the editor
    #[error("No model runner configured")]
    NotConfigured,

    /// No file is active in the editor
    #[error("No active file")]
    NoActiveFile,
}

/// Outcome of one request.
#[derive(Debug)]
pub struct ProducerResult {
    pub file: FileRef,
    pub frame: u32,
    pub outcome: Result<ImageAnnotations, ProducerError>,
}

/// Something that produces annotations for a frame asynchronously.
pub trait AnnotationProducer {
    /// Queue a request. Must not block on the model.
    fn request(&mut self, file: &FileRef, frame: u32) -> Result<(), ProducerError>;

    /// Drain finished requests without blocking.
    fn take_results(&mut self) -> Vec<ProducerResult>;

    /// Requests sent but not yet returned.
    fn pending_count(&self) -> usize {
        0
    }
}

/// Frame number from names like `frame_000002.jpg`.
pub fn frame_number(file_name: &str) -> Option<u32> {
    let stem = Path::new(file_name).file_stem()?.to_str()?;
    let digits = stem.rsplit('_').next()?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Output document name for a frame.
pub fn frame_document_name(frame: u32) -> String {
    format!("frame_{:06}.json", frame)
}

/// Command line and output folder of the model.
#[derive(Debug, Clone)]
pub struct ProcessConfig {
    pub program: String,
    /// Arguments placed before the frame number.
    pub args: Vec<String>,
    /// Folder the model writes `frame_NNNNNN.json` into.
    pub output_dir: PathBuf,
}

impl ProcessConfig {
    pub fn new(program: impl Into<String>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            output_dir: output_dir.into(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }
}

#[derive(Debug, Deserialize)]
struct ModelStatus {
    success: bool,
    #[serde(default)]
    message: String,
    #[serde(default)]
    error: Option<String>,
}

struct ModelRequest {
    file: FileRef,
    frame: u32,
}

enum ThreadMessage {
    Run(ModelRequest),
    Shutdown,
}

/// Runs the model subprocess on a background thread.
pub struct ProcessProducer {
    request_tx: Sender<ThreadMessage>,
    result_rx: Receiver<ProducerResult>,
    thread_handle: Option<JoinHandle<()>>,
    pending: HashSet<(FileKey, u32)>,
}

impl ProcessProducer {
    /// Spawn the worker thread.
    pub fn spawn(config: ProcessConfig) -> Result<Self, ProducerError> {
        let (request_tx, request_rx) = mpsc::channel::<ThreadMessage>();
        let (result_tx, result_rx) = mpsc::channel::<ProducerResult>();

        let program = config.program.clone();
        let thread_handle = thread::Builder::new()
            .name("model-runner".to_string())
            .spawn(move || {
                log::info!("Model runner thread started");
                Self::thread_loop(&config, request_rx, result_tx);
                log::info!("Model runner thread exiting");
            })
            .map_err(|source| ProducerError::Spawn { program, source })?;

        Ok(Self {
            request_tx,
            result_rx,
            thread_handle: Some(thread_handle),
            pending: HashSet::new(),
        })
    }

    fn thread_loop(
        config: &ProcessConfig,
        request_rx: Receiver<ThreadMessage>,
        result_tx: Sender<ProducerResult>,
    ) {
        loop {
            match request_rx.recv() {
                Ok(ThreadMessage::Run(request)) => {
                    let outcome = Self::run_model(config, request.frame);
                    let result = ProducerResult {
                        file: request.file,
                        frame: request.frame,
                        outcome,
                    };
                    if result_tx.send(result).is_err() {
                        log::warn!("Result channel closed, model runner exiting");
                        break;
                    }
                }
                Ok(ThreadMessage::Shutdown) => {
                    log::debug!("Received shutdown signal");
                    break;
                }
                Err(_) => {
                    log::debug!("Request channel closed, model runner exiting");
                    break;
                }
            }
        }
    }

    fn run_model(config: &ProcessConfig, frame: u32) -> Result<ImageAnnotations, ProducerError> {
        log::info!("Running model for frame {}", frame);
        let output = Command::new(&config.program)
            .args(&config.args)
            .arg(frame.to_string())
            .output()
            .map_err(|source| ProducerError::Spawn {
                program: config.program.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ProducerError::ModelFailed {
                frame,
                message: format!("exited with {}: {}", output.status, stderr.trim()),
            });
        }

        let status = Self::parse_status(frame, &stdout)?;
        if !status.success {
            return Err(ProducerError::ModelFailed {
                frame,
                message: status.error.unwrap_or(status.message),
            });
        }
        log::debug!("Model: {}", status.message);

        let path = config.output_dir.join(frame_document_name(frame));
        let json = std::fs::read_to_string(&path).map_err(|e| ProducerError::Output {
            frame,
            source: FormatError::Io(e),
        })?;
        ImageAnnotations::from_json(&json).map_err(|source| ProducerError::Output { frame, source })
    }

    /// The status is the last stdout line that parses as a status object.
    fn parse_status(frame: u32, stdout: &str) -> Result<ModelStatus, ProducerError> {
        stdout
            .lines()
            .rev()
            .map(str::trim)
            .filter(|line| line.starts_with('{'))
            .find_map(|line| serde_json::from_str::<ModelStatus>(line).ok())
            .ok_or_else(|| ProducerError::InvalidResponse {
                frame,
                details: stdout.trim().to_string(),
            })
    }
}

impl AnnotationProducer for ProcessProducer {
    fn request(&mut self, file: &FileRef, frame: u32) -> Result<(), ProducerError> {
        if frame < MIN_FRAME {
            return Err(ProducerError::InvalidFrame(frame));
        }
        let request = ModelRequest {
            file: file.clone(),
            frame,
        };
        self.request_tx
            .send(ThreadMessage::Run(request))
            .map_err(|_| ProducerError::Disconnected)?;
        self.pending.insert((file.key.clone(), frame));
        log::debug!("🤖 Requested model run for frame {}", frame);
        Ok(())
    }

    fn take_results(&mut self) -> Vec<ProducerResult> {
        let mut results = Vec::new();
        loop {
            match self.result_rx.try_recv() {
                Ok(result) => {
                    self.pending
                        .remove(&(result.file.key.clone(), result.frame));
                    results.push(result);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    log::warn!("Model runner disconnected");
                    break;
                }
            }
        }
        results
    }

    fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

impl Drop for ProcessProducer {
    fn drop(&mut self) {
        log::debug!("Shutting down model runner thread");
        let _ = self.request_tx.send(ThreadMessage::Shutdown);
        if let Some(handle) = self.thread_handle.take()
            && let Err(e) = handle.join()
        {
            log::warn!("Model runner thread panicked: {:?}", e);
        }
    }
}
