//! In-memory log capture.
//!
//! Worker threads log through the global dispatcher, so capture has to be
//! installed globally. Use it only in test binaries that never call
//! [`init_tracing`](crate::init_tracing), and give each test's monitor a
//! unique name to pick out its lines.

use std::io;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{fmt, EnvFilter};

static GLOBAL: OnceLock<LogCapture> = OnceLock::new();

#[derive(Debug, Clone, Default)]
pub struct LogCapture {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    /// The process-wide capture, installed on first use at `debug` level.
    pub fn global() -> LogCapture {
        GLOBAL
            .get_or_init(|| {
                let capture = LogCapture::default();
                let _ = fmt()
                    .with_env_filter(EnvFilter::new("debug"))
                    .with_writer(capture.clone())
                    .with_ansi(false)
                    .with_target(true)
                    .try_init();
                capture
            })
            .clone()
    }

    pub fn contents(&self) -> String {
        let buf = self.buf.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Captured lines tagged with `monitor=<name>`.
    pub fn lines_for(&self, monitor: &str) -> Vec<String> {
        let tag = format!("monitor={monitor}");
        self.contents()
            .lines()
            .filter(|line| line.split_whitespace().any(|field| field == tag))
            .map(str::to_string)
            .collect()
    }
}

pub struct CaptureWriter {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl io::Write for CaptureWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = CaptureWriter;

    fn make_writer(&'a self) -> Self::Writer {
        CaptureWriter {
            buf: Arc::clone(&self.buf),
        }
    }
}
