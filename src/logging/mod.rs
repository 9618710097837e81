//! Logging and observability
//!
//! Structured logging via `tracing`, with a console layer and an optional
//! rotating JSON file layer.
//!
//! # Example
//!
//! ```no_run
//! use cardscan::logging::init_logging;
//! use cardscan::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, resolve_log_level, with_startup_logging, LoggingGuard};

/// Log the completion of one pipeline stage
///
/// ```no_run
/// use cardscan::log_stage_complete;
/// use std::time::Instant;
///
/// let started = Instant::now();
/// log_stage_complete!("upload", started.elapsed());
/// ```
#[macro_export]
macro_rules! log_stage_complete {
    ($stage:expr, $duration:expr) => {
        tracing::info!(
            stage = $stage,
            duration_ms = $duration.as_millis() as u64,
            "Stage completed"
        );
    };
}

/// Log an error with context
///
/// ```no_run
/// use cardscan::log_error_with_context;
/// use cardscan::domain::CardScanError;
///
/// let error = CardScanError::Configuration("missing key".to_string());
/// log_error_with_context!(&error, "upload");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
