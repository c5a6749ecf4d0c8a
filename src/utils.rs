use std::time::{Instant, Duration};
use std::sync::Arc;
use parking_lot::Mutex;
use tracing_subscriber::EnvFilter;

/// Console logging; `RUST_LOG` overrides the default `info` filter.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Activity log shown in the main window. Every message is mirrored to
/// the console through `tracing`.
#[derive(Clone)]
pub struct Logger {
    messages: Arc<Mutex<Vec<String>>>,
}

impl Logger {
    pub fn new(messages: Arc<Mutex<Vec<String>>>) -> Self {
        Logger { messages }
    }

    pub fn log(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!("{}", message);
        self.messages.lock().push(stamp(&message));
    }

    pub fn error(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::error!("{}", message);
        self.messages.lock().push(stamp(&format!("error: {}", message)));
    }
}

fn stamp(message: &str) -> String {
    let timestamp = chrono::Local::now().format("%H:%M:%S%.3f");
    format!("[{}] {}", timestamp, message)
}

pub fn measure_time<F, T>(f: F) -> (T, Duration)
where
    F: FnOnce() -> T,
{
    let start = Instant::now();
    let result = f();
    let duration = start.elapsed();
    (result, duration)
}

pub fn get_memory_usage() -> String {
    if let Ok(mem_info) = sys_info::mem_info() {
        format!(
            "Memory: Total: {} MB, Free: {} MB, Used: {} MB",
            mem_info.total / 1024,
            mem_info.free / 1024,
            mem_info.total.saturating_sub(mem_info.free) / 1024
        )
    } else {
        "Unable to get memory info".to_string()
    }
}
