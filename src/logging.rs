use crate::config::DataPaths;
use crate::config::paths::LOG_FILE_NAME;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, ErrorKind};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber: terse human-readable lines on stderr plus
/// the application log file under the data directory.
///
/// `RUST_LOG` overrides the default levels. Keep the returned guard alive
/// until exit so buffered file output is flushed.
pub fn init(paths: &DataPaths, verbose: bool) -> Option<WorkerGuard> {
    let stderr_default = if verbose { "voicereader=debug" } else { "warn" };
    let file_default = if verbose {
        "voicereader=debug"
    } else {
        "voicereader=info"
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .with_filter(env_filter(stderr_default));

    let log_dir = paths.log_dir();
    let (file_layer, guard) = match fs::create_dir_all(&log_dir) {
        Ok(()) => {
            let appender = tracing_appender::rolling::never(&log_dir, LOG_FILE_NAME);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_thread_names(true)
                .with_filter(env_filter(file_default));
            (Some(layer), Some(guard))
        }
        Err(error) => {
            eprintln!(
                "Warning: log directory '{}' unavailable: {error}",
                log_dir.display()
            );
            (None, None)
        }
    };

    let _ = tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init();

    guard
}

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Last `lines` lines of the log file. A missing log reads as empty.
pub fn tail(log_file: &Path, lines: usize) -> Result<Vec<String>, String> {
    let file = match File::open(log_file) {
        Ok(file) => file,
        Err(error) if error.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(error) => {
            return Err(format!(
                "failed to open log '{}': {error}",
                log_file.display()
            ));
        }
    };

    let mut tail = std::collections::VecDeque::with_capacity(lines);
    for line in BufReader::new(file).lines() {
        let line = line
            .map_err(|error| format!("failed to read log '{}': {error}", log_file.display()))?;
        if lines == 0 {
            continue;
        }
        if tail.len() == lines {
            tail.pop_front();
        }
        tail.push_back(line);
    }

    Ok(tail.into())
}
