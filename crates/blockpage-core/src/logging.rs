//! Logging configuration
//!
//! Describes where and how verbosely the editor logs. Installing the actual
//! subscriber is left to the binary.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::level_filters::LevelFilter;

/// Prefix shared by all log files
pub const LOG_FILE_PREFIX: &str = "blockpage";

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Level name: trace, debug, info, warn, error
    pub level: String,
    /// Log to stderr
    pub console_output: bool,
    /// Log to a daily file in `log_dir`
    pub file_output: bool,
    /// Directory holding log files
    pub log_dir: PathBuf,
    /// Number of log files kept by [`LogConfig::cleanup_old_logs`]
    pub max_files: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            console_output: true,
            file_output: false,
            log_dir: PathBuf::from("logs"),
            max_files: 7,
        }
    }
}

impl LogConfig {
    /// Parse the configured level, falling back to INFO
    pub fn parse_level(&self) -> LevelFilter {
        match self.level.trim().to_ascii_lowercase().as_str() {
            "trace" => LevelFilter::TRACE,
            "debug" => LevelFilter::DEBUG,
            "info" => LevelFilter::INFO,
            "warn" | "warning" => LevelFilter::WARN,
            "error" => LevelFilter::ERROR,
            "off" => LevelFilter::OFF,
            _ => LevelFilter::INFO,
        }
    }

    /// Create the log directory if file output is enabled
    pub fn ensure_log_directory(&self) -> io::Result<()> {
        if self.file_output {
            fs::create_dir_all(&self.log_dir)?;
        }
        Ok(())
    }

    /// Path of today's log file
    pub fn current_log_path(&self) -> PathBuf {
        let date = chrono::Local::now().format("%Y-%m-%d");
        self.log_dir
            .join(format!("{}_{}.log", LOG_FILE_PREFIX, date))
    }

    /// Delete the oldest log files beyond `max_files`. Returns how many were removed.
    pub fn cleanup_old_logs(&self) -> io::Result<usize> {
        if !self.log_dir.exists() {
            return Ok(0);
        }

        let mut logs = log_files(&self.log_dir)?;
        if logs.len() <= self.max_files {
            return Ok(0);
        }

        // Names embed the date, so lexical order is chronological
        logs.sort();
        let excess = logs.len() - self.max_files;
        for path in &logs[..excess] {
            fs::remove_file(path)?;
        }
        Ok(excess)
    }
}

fn log_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_log = path
            .file_name()
            .and_then(|n| n.to_str())
            .map_or(false, |n| n.starts_with(LOG_FILE_PREFIX) && n.ends_with(".log"));
        if is_log {
            files.push(path);
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        let mut config = LogConfig::default();
        assert_eq!(config.parse_level(), LevelFilter::INFO);

        config.level = "DEBUG".to_string();
        assert_eq!(config.parse_level(), LevelFilter::DEBUG);

        config.level = "nonsense".to_string();
        assert_eq!(config.parse_level(), LevelFilter::INFO);
    }

    #[test]
    fn test_current_log_path_in_dir() {
        let config = LogConfig {
            log_dir: PathBuf::from("/tmp/bp-logs"),
            ..Default::default()
        };
        let path = config.current_log_path();
        assert!(path.starts_with("/tmp/bp-logs"));
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("blockpage_"));
        assert!(name.ends_with(".log"));
    }

    #[test]
    fn test_cleanup_keeps_newest() {
        let dir = tempfile::tempdir().unwrap();
        for day in 1..=5 {
            let name = format!("blockpage_2024-01-0{}.log", day);
            fs::write(dir.path().join(name), "x").unwrap();
        }
        fs::write(dir.path().join("other.txt"), "keep").unwrap();

        let config = LogConfig {
            log_dir: dir.path().to_path_buf(),
            max_files: 2,
            file_output: true,
            ..Default::default()
        };
        assert_eq!(config.cleanup_old_logs().unwrap(), 3);

        let mut remaining: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        remaining.sort();
        assert_eq!(
            remaining,
            vec![
                "blockpage_2024-01-04.log".to_string(),
                "blockpage_2024-01-05.log".to_string(),
                "other.txt".to_string()
            ]
        );
    }

    #[test]
    fn test_ensure_directory_only_with_file_output() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested/logs");

        let config = LogConfig {
            log_dir: target.clone(),
            ..Default::default()
        };
        config.ensure_log_directory().unwrap();
        assert!(!target.exists());

        let config = LogConfig {
            file_output: true,
            ..config
        };
        config.ensure_log_directory().unwrap();
        assert!(target.exists());
    }
}
