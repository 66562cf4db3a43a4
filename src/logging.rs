use once_cell::sync::OnceCell;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

static FILE_GUARD: OnceCell<WorkerGuard> = OnceCell::new();

/// Initialise logging. The default level is `info`; `debug` is used when
/// enabled in the settings file. `RUST_LOG` overrides the level only when
/// debug logging is enabled.
///
/// With `log_file` set, output goes to that file through a background
/// writer. Calling this again after a subscriber is installed does nothing.
pub fn init(debug: bool, log_file: Option<PathBuf>) {
    let level = if debug { "debug" } else { "info" };
    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    } else {
        EnvFilter::new(level)
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = match log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("."));
            let Some(name) = path.file_name() else {
                let _ = builder.try_init();
                tracing::warn!(path = %path.display(), "log file path has no file name");
                return;
            };
            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let result = builder.with_ansi(false).with_writer(writer).try_init();
            if result.is_ok() {
                let _ = FILE_GUARD.set(guard);
            }
            result
        }
        None => builder.try_init(),
    };
    if result.is_err() {
        tracing::debug!("logging already initialised");
    }
}
