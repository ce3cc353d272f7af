//! Leveled diagnostic logging
//!
//! Diagnostics go to stderr so they never mix with the metric lines on
//! stdout. Each run gets a correlation id; debug mode adds structured
//! fields as compact JSON.

use chrono::Utc;
use colored::Colorize;
use serde_json::Value;
use uuid::Uuid;

/// Log level enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug = 0,
    Info = 1,
    Warn = 2,
    Error = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }

    fn render(&self, use_color: bool) -> String {
        if !use_color {
            return self.as_str().to_string();
        }
        match self {
            LogLevel::Debug => self.as_str().cyan().to_string(),
            LogLevel::Info => self.as_str().green().to_string(),
            LogLevel::Warn => self.as_str().yellow().to_string(),
            LogLevel::Error => self.as_str().red().to_string(),
        }
    }
}

/// Stderr logger with a per-run correlation id
#[derive(Debug, Clone)]
pub struct Logger {
    min_level: LogLevel,
    use_color: bool,
    correlation_id: Uuid,
}

impl Logger {
    /// Verbose enables info, debug enables everything
    pub fn new(verbose: bool, debug: bool, use_color: bool) -> Self {
        let min_level = if debug {
            LogLevel::Debug
        } else if verbose {
            LogLevel::Info
        } else {
            LogLevel::Warn
        };
        Self {
            min_level,
            use_color,
            correlation_id: Uuid::new_v4(),
        }
    }

    pub fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    pub fn log(&self, level: LogLevel, message: &str) {
        if level < self.min_level {
            return;
        }
        eprintln!(
            "{} [{}] {} {}",
            Utc::now().format("%H:%M:%S%.3f"),
            level.render(self.use_color),
            self.short_id(),
            message
        );
    }

    /// Log with structured fields rendered as compact JSON
    pub fn log_fields(&self, level: LogLevel, message: &str, fields: &[(&str, Value)]) {
        if level < self.min_level {
            return;
        }
        let rendered: Value = fields
            .iter()
            .map(|(key, value)| ((*key).to_string(), value.clone()))
            .collect::<serde_json::Map<String, Value>>()
            .into();
        self.log(level, &format!("{} {}", message, rendered));
    }

    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    pub fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, message);
    }

    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }

    fn short_id(&self) -> String {
        self.correlation_id.to_string()[..8].to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Error);
    }

    #[test]
    fn test_level_names() {
        assert_eq!(LogLevel::Debug.as_str(), "DEBUG");
        assert_eq!(LogLevel::Error.as_str(), "ERROR");
    }

    #[test]
    fn test_logger_does_not_panic() {
        let logger = Logger::new(true, true, false);
        logger.debug("debug line");
        logger.info("info line");
        logger.warn("warn line");
        logger.error("error line");
        logger.log_fields(
            LogLevel::Info,
            "phase complete",
            &[("servers", Value::from(10)), ("failed", Value::from(2))],
        );
    }

    #[test]
    fn test_distinct_correlation_ids() {
        let a = Logger::new(false, false, false);
        let b = Logger::new(false, false, false);
        assert_ne!(a.correlation_id(), b.correlation_id());
    }
}
