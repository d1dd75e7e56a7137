use std::{
    fmt,
    fs::OpenOptions,
    io::Write,
    path::PathBuf,
    sync::Arc,
};

use parking_lot::Mutex;

use crate::{constants::TIMESTAMP_FORMAT, utils::clock::Clock};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogLevel {
    Info,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

/// Append-only destination for contact log lines. Implementations never fail the caller.
#[cfg_attr(test, mockall::automock)]
pub trait LogSink: Send + Sync {
    fn append(&self, line: &str);
}

/// Appends lines to a local text file.
///
/// Appends are serialized through a mutex and every line goes out in a single
/// `write_all` on an append-mode handle. An unwritable target is skipped.
pub struct FileLogSink {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileLogSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileLogSink {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }
}

impl LogSink for FileLogSink {
    fn append(&self, line: &str) {
        let _guard = self.lock.lock();

        let mut file = match OpenOptions::new().create(true).append(true).open(&self.path) {
            Ok(file) => file,
            Err(e) => {
                tracing::debug!("Contact log {} not writable, skipping: {}", self.path.display(), e);
                return;
            }
        };

        if let Err(e) = file.write_all(line.as_bytes()) {
            tracing::warn!("Failed to append to contact log {}: {}", self.path.display(), e);
        }
    }
}

/// Formats `[<timestamp>] [<LEVEL>] <message>` lines and hands them to a sink.
#[derive(Clone)]
pub struct ContactLog {
    sink: Arc<dyn LogSink>,
    clock: Arc<dyn Clock>,
}

impl ContactLog {
    pub fn new(sink: Arc<dyn LogSink>, clock: Arc<dyn Clock>) -> Self {
        ContactLog { sink, clock }
    }

    pub async fn info(&self, message: &str) {
        tracing::info!(target: "contact", "{}", message);
        self.write(LogLevel::Info, message).await;
    }

    pub async fn error(&self, message: &str) {
        tracing::error!(target: "contact", "{}", message);
        self.write(LogLevel::Error, message).await;
    }

    /// File appends run on the blocking pool. Awaiting each one keeps lines in call order.
    async fn write(&self, level: LogLevel, message: &str) {
        let timestamp = self.clock.now().format(TIMESTAMP_FORMAT);
        let line = format!("[{timestamp}] [{level}] {message}\n");
        let sink = self.sink.clone();

        if let Err(e) = tokio::task::spawn_blocking(move || sink.append(&line)).await {
            tracing::warn!("Contact log append task failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Local, TimeZone};
    use mockall::predicate::eq;
    use std::fs;
    use uuid::Uuid;

    struct FixedClock(DateTime<Local>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Local> {
            self.0
        }
    }

    fn fixed_clock() -> Arc<dyn Clock> {
        Arc::new(FixedClock(Local.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()))
    }

    #[actix_rt::test]
    async fn formats_lines_with_timestamp_and_level() {
        let mut sink = MockLogSink::new();
        sink.expect_append()
            .with(eq("[2024-01-02 03:04:05] [INFO] New contact message from: Jo (jo@example.com)\n"))
            .times(1)
            .return_const(());
        sink.expect_append()
            .with(eq("[2024-01-02 03:04:05] [ERROR] Error: Failed to send email\n"))
            .times(1)
            .return_const(());

        let log = ContactLog::new(Arc::new(sink), fixed_clock());
        log.info("New contact message from: Jo (jo@example.com)").await;
        log.error("Error: Failed to send email").await;
    }

    #[actix_rt::test]
    async fn contact_log_writes_file_lines_in_call_order() {
        let path = std::env::temp_dir().join(format!("contact-log-{}.txt", Uuid::new_v4()));
        let log = ContactLog::new(Arc::new(FileLogSink::new(&path)), fixed_clock());

        log.info("first").await;
        log.error("second").await;

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "[2024-01-02 03:04:05] [INFO] first\n[2024-01-02 03:04:05] [ERROR] second\n"
        );
        fs::remove_file(&path).ok();
    }

    #[test]
    fn file_sink_appends_lines() {
        let path = std::env::temp_dir().join(format!("contact-log-{}.txt", Uuid::new_v4()));
        let sink = FileLogSink::new(&path);

        sink.append("first\n");
        sink.append("second\n");

        assert_eq!(fs::read_to_string(&path).unwrap(), "first\nsecond\n");
        fs::remove_file(&path).ok();
    }

    #[test]
    fn file_sink_skips_unwritable_target() {
        let path = std::env::temp_dir()
            .join(format!("missing-dir-{}", Uuid::new_v4()))
            .join("contact_log.txt");
        let sink = FileLogSink::new(&path);

        sink.append("dropped\n");

        assert!(!path.exists());
    }
}
