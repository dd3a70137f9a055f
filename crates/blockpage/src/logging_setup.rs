use anyhow::{Context, Result};
use blockpage_core::LogConfig;
use std::fs::File;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{
    filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, Layer,
};

/// HTTP stack targets that are only interesting when tracing
const CHATTY_TARGETS: &[&str] = &["hyper", "hyper_util", "h2", "reqwest", "tower_http"];

/// Keeps the file-logging worker alive
pub struct LogGuard {
    _guard: WorkerGuard,
}

/// Install the global subscriber described by `config`
pub fn init(config: &LogConfig) -> Result<Option<LogGuard>> {
    let filter = build_filter(config)?;

    let console_layer = config.console_output.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_filter(filter.clone())
    });

    let (file_layer, guard) = match open_log_file(config)? {
        Some((writer, guard)) => {
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(filter);
            (Some(layer), Some(LogGuard { _guard: guard }))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("A global logger is already installed")?;

    tracing::debug!("Logging initialized at level {}", config.level);
    Ok(guard)
}

/// `RUST_LOG` if set, otherwise the configured level with the HTTP stack quieted
fn build_filter(config: &LogConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(default_directives(config))
        .with_context(|| format!("Invalid log level '{}'", config.level))
}

fn default_directives(config: &LogConfig) -> String {
    let level = config.parse_level();
    let mut directives = vec![level.to_string().to_lowercase()];
    if level != tracing::level_filters::LevelFilter::TRACE {
        directives.extend(CHATTY_TARGETS.iter().map(|target| format!("{}=warn", target)));
    }
    directives.join(",")
}

/// Open today's log file for appending, pruning old files first
fn open_log_file(config: &LogConfig) -> Result<Option<(NonBlocking, WorkerGuard)>> {
    if !config.file_output {
        return Ok(None);
    }
    config
        .ensure_log_directory()
        .context("Failed to create log directory")?;
    match config.cleanup_old_logs() {
        Ok(0) => {}
        Ok(removed) => eprintln!("Removed {} old log file(s)", removed),
        Err(e) => eprintln!("Warning: Failed to clean up old log files: {}", e),
    }

    let log_path = config.current_log_path();
    let file = File::options()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file: {:?}", log_path))?;
    Ok(Some(tracing_appender::non_blocking(file)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives_quiet_http_stack() {
        let config = LogConfig {
            level: "debug".to_string(),
            ..Default::default()
        };
        let directives = default_directives(&config);
        assert!(directives.starts_with("debug,"));
        assert!(directives.contains("hyper=warn"));
        assert!(directives.contains("reqwest=warn"));
    }

    #[test]
    fn test_trace_keeps_everything() {
        let config = LogConfig {
            level: "trace".to_string(),
            ..Default::default()
        };
        assert_eq!(default_directives(&config), "trace");
    }

    #[test]
    fn test_unknown_level_falls_back_to_info() {
        let config = LogConfig {
            level: "loud".to_string(),
            ..Default::default()
        };
        assert!(default_directives(&config).starts_with("info,"));
    }

    #[test]
    fn test_log_file_only_opened_when_enabled() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = LogConfig {
            log_dir: dir.path().join("logs"),
            ..Default::default()
        };
        assert!(open_log_file(&config).unwrap().is_none());
        assert!(!config.log_dir.exists());

        config.file_output = true;
        let opened = open_log_file(&config).unwrap();
        assert!(opened.is_some());
        assert!(config.current_log_path().exists());
    }
}
