//! Structured logging setup using tracing
//!
//! Console output is always enabled. When `logging.local_enabled` is set, a
//! second JSON layer writes to a rotating file under `logging.local_path`.

use crate::config::LoggingConfig;
use crate::domain::{CardScanError, Result};
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Guard that must be kept alive for the duration of the program
/// to ensure file logs are flushed
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

impl LoggingGuard {
    fn new(file_guard: Option<WorkerGuard>) -> Self {
        Self {
            _file_guard: file_guard,
        }
    }
}

/// Initialize the logging system
///
/// `RUST_LOG` takes precedence over `log_level_str` when set.
///
/// # Errors
///
/// Returns a configuration error for an unknown level, an uncreatable log
/// directory, or when a global subscriber is already installed.
///
/// # Example
///
/// ```no_run
/// use cardscan::logging::init_logging;
/// use cardscan::config::LoggingConfig;
///
/// let config = LoggingConfig::default();
/// let _guard = init_logging("info", &config).expect("Failed to initialize logging");
/// ```
pub fn init_logging(log_level_str: &str, config: &LoggingConfig) -> Result<LoggingGuard> {
    let log_level = parse_log_level(log_level_str)?;
    let env_filter = default_filter(log_level);

    let mut layers = Vec::new();

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_filter(env_filter.clone());
    layers.push(console_layer.boxed());

    let file_guard = if config.local_enabled {
        std::fs::create_dir_all(&config.local_path).map_err(|e| {
            CardScanError::Configuration(format!(
                "Failed to create log directory {}: {}",
                config.local_path, e
            ))
        })?;

        let file_appender = RollingFileAppender::new(
            parse_rotation(&config.local_rotation),
            &config.local_path,
            "cardscan.log",
        );
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        let file_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_writer(non_blocking)
            .with_filter(env_filter);

        layers.push(file_layer.boxed());
        Some(guard)
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .map_err(|e| CardScanError::Configuration(format!("Failed to install logger: {e}")))?;

    tracing::info!(
        level = %log_level,
        local_enabled = config.local_enabled,
        local_path = %config.local_path,
        "Logging initialized"
    );

    Ok(LoggingGuard::new(file_guard))
}

/// Run `f` with a console-only subscriber installed for the current thread
///
/// Used while configuration is loaded, before [`init_logging`] knows where
/// logs go. An unknown level falls back to `info`.
///
/// # Example
///
/// ```no_run
/// use cardscan::config;
/// use cardscan::logging::with_startup_logging;
///
/// let loaded = with_startup_logging("info", || config::load(None));
/// ```
pub fn with_startup_logging<T>(log_level_str: &str, f: impl FnOnce() -> T) -> T {
    with_startup_writer(log_level_str, std::io::stdout, f)
}

fn with_startup_writer<W, T>(log_level_str: &str, writer: W, f: impl FnOnce() -> T) -> T
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let log_level = parse_log_level(log_level_str).unwrap_or(Level::INFO);
    let subscriber = tracing_subscriber::registry().with(
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_writer(writer)
            .with_filter(default_filter(log_level)),
    );
    tracing::subscriber::with_default(subscriber, f)
}

/// Pick the effective log level
///
/// The command line wins over the configured level, and `info` applies when
/// neither is set. The result is lower-cased.
///
/// # Errors
///
/// Returns a configuration error naming the level if it is unknown.
pub fn resolve_log_level(cli_level: Option<&str>, configured: Option<&str>) -> Result<String> {
    let level = cli_level.or(configured).unwrap_or("info");
    parse_log_level(level)?;
    Ok(level.to_lowercase())
}

fn default_filter(log_level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("cardscan={log_level},tower_http={log_level}"))
    })
}

/// Parse log level from string
fn parse_log_level(level_str: &str) -> Result<Level> {
    match level_str.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(CardScanError::Configuration(format!(
            "Invalid log level: {level_str}. Must be one of: trace, debug, info, warn, error"
        ))),
    }
}

fn parse_rotation(rotation: &str) -> Rotation {
    match rotation {
        "hourly" => Rotation::HOURLY,
        "never" => Rotation::NEVER,
        _ => Rotation::DAILY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_level_valid() {
        assert_eq!(parse_log_level("trace").unwrap(), Level::TRACE);
        assert_eq!(parse_log_level("debug").unwrap(), Level::DEBUG);
        assert_eq!(parse_log_level("info").unwrap(), Level::INFO);
        assert_eq!(parse_log_level("warn").unwrap(), Level::WARN);
        assert_eq!(parse_log_level("error").unwrap(), Level::ERROR);
    }

    #[test]
    fn test_parse_log_level_case_insensitive() {
        assert_eq!(parse_log_level("Debug").unwrap(), Level::DEBUG);
        assert_eq!(parse_log_level("INFO").unwrap(), Level::INFO);
    }

    #[test]
    fn test_parse_log_level_invalid() {
        assert!(parse_log_level("verbose").is_err());
        assert!(parse_log_level("").is_err());
    }

    #[test]
    fn test_parse_rotation() {
        assert_eq!(parse_rotation("hourly"), Rotation::HOURLY);
        assert_eq!(parse_rotation("never"), Rotation::NEVER);
        assert_eq!(parse_rotation("daily"), Rotation::DAILY);
    }

    #[test]
    fn test_resolve_log_level_prefers_cli() {
        assert_eq!(resolve_log_level(Some("DEBUG"), Some("warn")).unwrap(), "debug");
        assert_eq!(resolve_log_level(None, Some("warn")).unwrap(), "warn");
        assert_eq!(resolve_log_level(None, None).unwrap(), "info");
    }

    #[test]
    fn test_resolve_log_level_rejects_unknown() {
        let err = resolve_log_level(Some("verbose"), Some("info")).unwrap_err();
        assert!(matches!(err, CardScanError::Configuration(_)));
        assert!(err.to_string().contains("verbose"));
    }

    #[derive(Clone, Default)]
    struct Captured(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    #[test]
    fn test_startup_logging_shows_config_warnings() {
        use crate::config::{config_from_env, EnvSource};

        let env = EnvSource::from_pairs([
            ("AZURE_DOCS_API_KEY", "key"),
            ("AZURE_DOCS_ENDPOINT", "https://cards.cognitiveservices.azure.com/"),
            ("AZURE_DOCS_REGION", "eastus"),
            ("AZURE_STORAGE_CONN_STRING", "AccountName=acct;AccountKey=a2V5"),
            ("AZURE_STORAGE_CONTAINER_NAME", "cards"),
        ]);

        let captured = Captured::default();
        let writer = captured.clone();
        let loaded = with_startup_writer("info", move || writer.clone(), || config_from_env(&env));

        assert!(loaded.is_ok());
        let output = captured.text();
        assert!(output.contains("Optional environment variables not set"));
        assert!(output.contains("AZURE_STORAGE_API_KEY"));
    }

    #[test]
    fn test_startup_logging_shows_missing_required() {
        use crate::config::{config_from_env, EnvSource};

        let captured = Captured::default();
        let writer = captured.clone();
        let loaded = with_startup_writer("verbose", move || writer.clone(), || {
            config_from_env(&EnvSource::from_pairs(Vec::<(&str, &str)>::new()))
        });

        assert!(loaded.is_err());
        assert!(captured.text().contains("Configuration incomplete"));
    }
}
