use std::{
    fs, io,
    path::{Path, PathBuf},
    time::{Duration, SystemTime},
};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const LOG_RETENTION: Duration = Duration::from_secs(60 * 60 * 24 * 7);
const CLEANUP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Keeps the non-blocking file writer alive; dropping it flushes pending logs.
#[allow(dead_code)]
pub struct LoggerGuard(WorkerGuard);

/// Install the global subscriber: ANSI stdout plus a daily-rolling log file.
/// `RUST_LOG` overrides the configured default level.
pub fn init_logging(log_dir: impl AsRef<Path>, prefix: &str, default_level: &str) -> LoggerGuard {
    let log_dir = log_dir.as_ref().to_path_buf();

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(prefix)
        .filename_suffix("log")
        .build(&log_dir)
        .expect("Failed to create file appender");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_filter(env_filter(default_level));
    let stdout_layer = fmt::layer()
        .with_writer(io::stdout)
        .with_ansi(true)
        .with_filter(env_filter(default_level));

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stdout_layer)
        .init();

    spawn_log_cleanup(log_dir, prefix.to_string());

    LoggerGuard(guard)
}

fn env_filter(default_level: &str) -> EnvFilter {
    let level = match default_level {
        "trace" | "debug" | "info" | "warn" | "error" => default_level,
        other => {
            eprintln!("Invalid log level '{}', defaulting to 'info'", other);
            "info"
        }
    };

    EnvFilter::builder()
        .with_default_directive(level.parse().expect("static level directive"))
        .parse_lossy(std::env::var("RUST_LOG").unwrap_or_default())
}

fn spawn_log_cleanup(log_dir: PathBuf, prefix: String) {
    tokio::task::spawn(async move {
        loop {
            if let Err(e) = remove_old_logs(&log_dir, &prefix) {
                tracing::warn!("Failed to clean up old log files: {}", e);
            }
            tokio::time::sleep(CLEANUP_INTERVAL).await;
        }
    });
}

fn remove_old_logs(log_dir: &Path, prefix: &str) -> io::Result<()> {
    let now = SystemTime::now();

    for entry in fs::read_dir(log_dir)? {
        let path = entry?.path();
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !file_name.starts_with(prefix) || !file_name.ends_with(".log") {
            continue;
        }

        let modified = fs::metadata(&path)?.modified()?;
        if now.duration_since(modified).unwrap_or_default() > LOG_RETENTION {
            fs::remove_file(&path)?;
            tracing::info!("Old log file deleted: {}", file_name);
        }
    }
    Ok(())
}
