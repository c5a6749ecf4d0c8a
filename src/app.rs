// app.rs
pub mod backend;
pub mod file_dialogs;
pub mod formats;
pub mod gui;
pub mod image_processing;
pub mod pdf;
pub mod preview;
pub mod session;
pub mod splash;
pub mod worker;

use eframe::egui;
use eframe::App as EframeApp;
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;

use crate::app::backend::Backends;
use crate::app::gui::SlotTexture;
use crate::app::session::Session;
use crate::app::splash::Splash;
use crate::app::worker::{JobHandle, JobKind, JobRequest, JobUpdate, JobOutcome};
use crate::config::AppConfig;
use crate::error::{AppError, Result};
use crate::utils::Logger;

pub enum Screen {
    Splash(Splash),
    Main,
}

pub struct App {
    pub config: AppConfig,
    pub backends: Backends,
    pub session: Session,
    pub screen: Screen,
    pub job: Option<JobHandle>,
    pub job_stage: String,
    pub log_messages: Arc<Mutex<Vec<String>>>,
    pub logger: Logger,
    pub original_texture: SlotTexture,
    pub compressed_texture: SlotTexture,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        let log_messages = Arc::new(Mutex::new(Vec::new()));
        let logger = Logger::new(log_messages.clone());
        let splash = Splash::new(&config);
        tracing::debug!("Splash ready with {} frames", splash.frame_count());
        Self {
            backends: Backends::default(),
            session: Session::new(config.default_quality),
            screen: Screen::Splash(splash),
            job: None,
            job_stage: String::new(),
            log_messages,
            logger,
            original_texture: SlotTexture::default(),
            compressed_texture: SlotTexture::default(),
            config,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.job.is_some()
    }

    pub fn select_file(&mut self, path: PathBuf) {
        if let Some(job) = self.job.take() {
            job.cancel();
            self.logger.log(format!("{} cancelled by new selection", job.kind.describe()));
        }
        self.logger.log(format!("Selected {}", path.display()));
        self.session.select(path, self.config.preview_size);
    }

    pub fn start_compress(&mut self, ctx: &egui::Context) {
        let request = self.session.compress_request();
        self.start(request, JobKind::CompressImage, ctx);
    }

    pub fn start_convert(&mut self, ctx: &egui::Context) {
        let request = self.session.convert_request();
        self.start(request, JobKind::ConvertToPdf, ctx);
    }

    pub fn cancel_job(&mut self) {
        if let Some(job) = &self.job {
            job.cancel();
            self.job_stage = "Cancelling...".to_string();
        }
    }

    fn start(&mut self, request: Result<JobRequest>, fallback: JobKind, ctx: &egui::Context) {
        let request = match request {
            Ok(request) => request,
            Err(e) => {
                self.report_error(fallback, &e);
                return;
            }
        };
        self.logger.log(format!(
            "{} started for {}",
            request.kind.describe(),
            self.session.path().map(|p| p.display().to_string()).unwrap_or_default()
        ));
        self.job_stage = "Starting...".to_string();
        let ctx = ctx.clone();
        self.job = Some(worker::spawn(
            request,
            self.backends.clone(),
            self.config.clone(),
            move || ctx.request_repaint(),
        ));
    }

    /// Drains the running job's channel. Returns true if anything changed.
    fn poll_job(&mut self) -> bool {
        let Some(job) = &self.job else { return false };
        let mut changed = false;
        let mut finished = None;
        while let Some(update) = job.poll() {
            changed = true;
            match update {
                JobUpdate::Stage(stage) => self.job_stage = stage,
                JobUpdate::Finished(result) => {
                    finished = Some((job.kind, result));
                    break;
                }
            }
        }
        if let Some((kind, result)) = finished {
            self.job = None;
            self.finish_job(kind, result);
        }
        changed
    }

    fn finish_job(&mut self, kind: JobKind, result: Result<JobOutcome>) {
        match result {
            Ok(outcome) => {
                self.logger.log(format!(
                    "{} done: {}",
                    kind.describe(),
                    outcome.output().display()
                ));
                self.session.apply(outcome);
            }
            Err(AppError::Cancelled) => {
                self.logger.log(format!("{} cancelled", kind.describe()));
                self.session.result_text = AppError::Cancelled.to_string();
            }
            Err(e) => self.report_error(kind, &e),
        }
    }

    fn report_error(&mut self, kind: JobKind, error: &AppError) {
        if error.is_selection_error() {
            self.logger.log(error.to_string());
        } else {
            self.logger.error(error.to_string());
        }
        file_dialogs::show_error(error.dialog_title(kind), &error.to_string());
    }
}

impl EframeApp for App {
    fn update(&mut self, ctx: &egui::Context, frame: &mut eframe::Frame) {
        if let Screen::Splash(splash) = &self.screen {
            if !splash.is_finished() {
                splash.render(ctx);
                return;
            }
            self.logger.log("Launching main window");
            frame.set_decorations(true);
            frame.set_window_size(self.config.main_window_size);
            self.screen = Screen::Main;
        }

        let needs_redraw = self.poll_job();

        gui::render(self, ctx);

        if needs_redraw {
            ctx.request_repaint();
        }
    }
}
