//! Process-wide tracing setup for the matcher binaries.
//!
//! | variable                   | effect                                          |
//! |----------------------------|-------------------------------------------------|
//! | `RUST_LOG`                 | filter directives, default `info`               |
//! | `TM_LOG_DIR`               | write `<dir>/<app>.log`, rotated daily          |
//! | `TM_LOG_INCLUDE_BACKTRACE` | also run the default panic hook (`1`/`true`)    |
//!
//! Without `TM_LOG_DIR` logs go to stderr; stdout is reserved for reports.

use std::any::Any;
use std::panic;
use std::path::PathBuf;
use std::sync::OnceLock;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info";

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogSettings {
    pub log_dir: Option<PathBuf>,
    pub include_backtrace: bool,
}

impl LogSettings {
    pub fn from_env() -> Self {
        Self {
            log_dir: std::env::var_os("TM_LOG_DIR")
                .filter(|dir| !dir.is_empty())
                .map(PathBuf::from),
            include_backtrace: std::env::var("TM_LOG_INCLUDE_BACKTRACE")
                .map(|raw| is_truthy(&raw))
                .unwrap_or(false),
        }
    }
}

fn is_truthy(raw: &str) -> bool {
    let raw = raw.trim();
    raw == "1" || raw.eq_ignore_ascii_case("true")
}

fn payload_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "panic payload not string".into())
}

/// Logs panics as `tracing` errors. Only the first call installs the hook.
pub fn install_tracing_panic_hook(app_name: &'static str) {
    static INSTALLED: OnceLock<()> = OnceLock::new();

    INSTALLED.get_or_init(|| {
        let include_backtrace = LogSettings::from_env().include_backtrace;
        let default_hook = panic::take_hook();

        panic::set_hook(Box::new(move |info| {
            let location = info
                .location()
                .map_or_else(|| "unknown".to_string(), |loc| format!("{}:{}", loc.file(), loc.line()));

            tracing::error!(
                application = app_name,
                thread = std::thread::current().name().unwrap_or("unnamed"),
                %location,
                panic_message = %payload_message(info.payload()),
                "panic captured"
            );

            if include_backtrace {
                default_hook(info);
            }
        }));
    });
}

fn daily_file_writer(dir: PathBuf, app_name: &str) -> Option<BoxMakeWriter> {
    if let Err(err) = std::fs::create_dir_all(&dir) {
        // No subscriber exists yet, so this cannot go through tracing.
        eprintln!("cannot create log dir {}: {err}; logging to stderr", dir.display());
        return None;
    }

    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, format!("{app_name}.log")));
    let _ = LOG_GUARD.set(guard);
    Some(BoxMakeWriter::new(writer))
}

/// Installs the global fmt subscriber. Later calls are ignored.
pub fn init_tracing_subscriber(app_name: &'static str) {
    let settings = LogSettings::from_env();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match settings.log_dir.and_then(|dir| daily_file_writer(dir, app_name)) {
        Some(writer) => {
            let _ = builder.with_ansi(false).with_writer(writer).try_init();
        }
        None => {
            let _ = builder.with_writer(std::io::stderr).try_init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_message_reads_str_and_string_payloads() {
        let borrowed: Box<dyn Any + Send> = Box::new("index rebuild failed");
        let owned: Box<dyn Any + Send> = Box::new(String::from("bad weights"));
        let other: Box<dyn Any + Send> = Box::new(42_u8);

        assert_eq!(payload_message(borrowed.as_ref()), "index rebuild failed");
        assert_eq!(payload_message(owned.as_ref()), "bad weights");
        assert_eq!(payload_message(other.as_ref()), "panic payload not string");
    }

    #[test]
    fn backtrace_flag_accepts_one_and_true() {
        assert!(is_truthy("1"));
        assert!(is_truthy(" TRUE "));
        assert!(!is_truthy("yes"));
        assert!(!is_truthy("0"));
        assert!(!is_truthy(""));
    }
}
