// worker.rs
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::sync::Arc;
use tracing::{debug, info};

use crate::app::backend::{Backends, Quality};
use crate::app::image_processing::{self, Compressed, Converted};
use crate::config::AppConfig;
use crate::error::{AppError, Result};
use crate::utils::get_memory_usage;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobKind {
    CompressImage,
    CompressPdf,
    ConvertToPdf,
}

impl JobKind {
    pub fn failure_title(self) -> &'static str {
        match self {
            JobKind::CompressImage => "Compression Failed",
            JobKind::CompressPdf => "PDF Compression Failed",
            JobKind::ConvertToPdf => "Conversion Failed",
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            JobKind::CompressImage => "Image compression",
            JobKind::CompressPdf => "PDF compression",
            JobKind::ConvertToPdf => "PDF conversion",
        }
    }
}

#[derive(Clone, Debug)]
pub struct JobRequest {
    pub kind: JobKind,
    pub path: PathBuf,
    pub quality: Quality,
}

#[derive(Clone, Debug)]
pub enum JobOutcome {
    Compressed(Compressed),
    Converted(Converted),
}

impl JobOutcome {
    pub fn output(&self) -> &Path {
        match self {
            JobOutcome::Compressed(c) => &c.output,
            JobOutcome::Converted(c) => &c.output,
        }
    }
}

pub enum JobUpdate {
    Stage(String),
    Finished(Result<JobOutcome>),
}

fn ignore_stage(_: &str) {}

/// Handed to an operation so it can report progress and bail out between
/// stages once cancellation was requested.
pub struct Checkpoint<'a> {
    cancel: &'a AtomicBool,
    on_stage: &'a dyn Fn(&str),
}

impl<'a> Checkpoint<'a> {
    pub fn new(cancel: &'a AtomicBool, on_stage: &'a dyn Fn(&str)) -> Self {
        Self { cancel, on_stage }
    }

    /// A checkpoint that only honours cancellation.
    pub fn silent(cancel: &'a AtomicBool) -> Self {
        Self {
            cancel,
            on_stage: &ignore_stage,
        }
    }

    pub fn stage(&self, name: &str) -> Result<()> {
        if self.cancel.load(Ordering::SeqCst) {
            return Err(AppError::Cancelled);
        }
        (self.on_stage)(name);
        Ok(())
    }
}

/// Runs a request on the calling thread.
pub fn run(
    request: &JobRequest,
    backends: &Backends,
    config: &AppConfig,
    checkpoint: &Checkpoint,
) -> Result<JobOutcome> {
    match request.kind {
        JobKind::CompressImage | JobKind::CompressPdf => {
            image_processing::compress_file(backends, config, &request.path, request.quality, checkpoint)
                .map(JobOutcome::Compressed)
        }
        JobKind::ConvertToPdf => {
            image_processing::convert_to_pdf(backends, config, &request.path, checkpoint).map(JobOutcome::Converted)
        }
    }
}

pub struct JobHandle {
    pub kind: JobKind,
    receiver: Receiver<JobUpdate>,
    cancel: Arc<AtomicBool>,
}

impl JobHandle {
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    /// Next pending update, if any. A worker that went away without
    /// finishing is reported as `JobFailed`.
    pub fn poll(&self) -> Option<JobUpdate> {
        match self.receiver.try_recv() {
            Ok(update) => Some(update),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(JobUpdate::Finished(Err(AppError::JobFailed))),
        }
    }
}

/// Starts `request` on a worker thread. `wake` is called after every
/// update so the UI can repaint.
pub fn spawn<W>(request: JobRequest, backends: Backends, config: AppConfig, wake: W) -> JobHandle
where
    W: Fn() + Send + 'static,
{
    let (sender, receiver) = channel();
    let cancel = Arc::new(AtomicBool::new(false));
    let kind = request.kind;

    let flag = cancel.clone();
    std::thread::spawn(move || {
        info!("{} started for {}", request.kind.describe(), request.path.display());
        let on_stage = |stage: &str| {
            let _ = sender.send(JobUpdate::Stage(stage.to_string()));
            wake();
        };
        let checkpoint = Checkpoint::new(&flag, &on_stage);
        let result = run(&request, &backends, &config, &checkpoint);
        debug!("{}", get_memory_usage());

        // The UI may have dropped the handle already.
        let _ = sender.send(JobUpdate::Finished(result));
        wake();
    });

    JobHandle {
        kind,
        receiver,
        cancel,
    }
}
