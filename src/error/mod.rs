//! Error handling for the network speed tester

use thiserror::Error;

/// Custom error types for the network speed tester
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors (flags, env, test profiles)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Server or quality directory empty or unfetchable
    #[error("Directory unavailable: {0}")]
    DirectoryUnavailable(String),

    /// All probes in a selection round failed
    #[error("No server reachable: {0}")]
    NoServerReachable(String),

    /// Fewer than two successful latency samples
    #[error("Insufficient samples: {0}")]
    InsufficientSamples(String),

    /// All workers in a throughput phase failed
    #[error("Transfer failed: {0}")]
    TransferFailed(String),

    /// Network connectivity errors
    #[error("Network error: {0}")]
    Network(String),

    /// HTTP request errors
    #[error("HTTP request error: {0}")]
    HttpRequest(String),

    /// Timeout errors
    #[error("Timeout error: {0}")]
    Timeout(String),

    /// Parsing errors (URLs, directory XML, key-value bodies)
    #[error("Parsing error: {0}")]
    Parse(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Create a new directory-unavailable error
    pub fn directory_unavailable<S: Into<String>>(message: S) -> Self {
        Self::DirectoryUnavailable(message.into())
    }

    /// Create a new no-server-reachable error
    pub fn no_server_reachable<S: Into<String>>(message: S) -> Self {
        Self::NoServerReachable(message.into())
    }

    /// Create a new insufficient-samples error
    pub fn insufficient_samples<S: Into<String>>(message: S) -> Self {
        Self::InsufficientSamples(message.into())
    }

    /// Create a new transfer-failed error
    pub fn transfer_failed<S: Into<String>>(message: S) -> Self {
        Self::TransferFailed(message.into())
    }

    /// Create a new network error
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network(message.into())
    }

    /// Create a new HTTP request error
    pub fn http_request<S: Into<String>>(message: S) -> Self {
        Self::HttpRequest(message.into())
    }

    /// Create a new timeout error
    pub fn timeout<S: Into<String>>(message: S) -> Self {
        Self::Timeout(message.into())
    }

    /// Create a new parsing error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse(message.into())
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io(message.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Get error category for logging and reporting
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG",
            Self::DirectoryUnavailable(_) => "DIRECTORY",
            Self::NoServerReachable(_) => "SELECTION",
            Self::InsufficientSamples(_) => "SAMPLES",
            Self::TransferFailed(_) => "TRANSFER",
            Self::Network(_) => "NETWORK",
            Self::HttpRequest(_) => "HTTP",
            Self::Timeout(_) => "TIMEOUT",
            Self::Parse(_) => "PARSE",
            Self::Io(_) => "IO",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Check if error is recoverable (a later run may succeed)
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::DirectoryUnavailable(_)
            | Self::NoServerReachable(_)
            | Self::InsufficientSamples(_)
            | Self::TransferFailed(_)
            | Self::Network(_)
            | Self::HttpRequest(_)
            | Self::Timeout(_) => true,
            Self::Config(_) | Self::Parse(_) | Self::Io(_) | Self::Internal(_) => false,
        }
    }

    /// Get exit code for this error type
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Parse(_) => 1, // Invalid configuration/usage
            Self::Network(_) | Self::HttpRequest(_) | Self::DirectoryUnavailable(_) => 2,
            Self::Timeout(_) => 3,
            Self::NoServerReachable(_) => 4,
            Self::TransferFailed(_) | Self::InsufficientSamples(_) => 5,
            Self::Io(_) => 6,
            Self::Internal(_) => 99, // Internal/unexpected errors
        }
    }

    /// Format error for console display with color coding
    pub fn format_for_console(&self, use_color: bool) -> String {
        let category = self.category();
        let message = self.to_string();

        if use_color {
            use colored::Colorize;
            match self {
                Self::Config(_) | Self::Parse(_) => {
                    format!("[{}] {}", category.red().bold(), message.red())
                }
                Self::Network(_) | Self::HttpRequest(_) | Self::DirectoryUnavailable(_) => {
                    format!("[{}] {}", category.yellow().bold(), message.yellow())
                }
                Self::Timeout(_) => {
                    format!("[{}] {}", category.blue().bold(), message.blue())
                }
                Self::NoServerReachable(_)
                | Self::TransferFailed(_)
                | Self::InsufficientSamples(_) => {
                    format!("[{}] {}", category.cyan().bold(), message.cyan())
                }
                Self::Io(_) => {
                    format!("[{}] {}", category.magenta().bold(), message.magenta())
                }
                Self::Internal(_) => {
                    format!("[{}] {}", category.bright_red().bold(), message.bright_red())
                }
            }
        } else {
            format!("[{}] {}", category, message)
        }
    }
}

// Standard library error conversions
impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::io(error.to_string())
    }
}

impl From<url::ParseError> for AppError {
    fn from(error: url::ParseError) -> Self {
        Self::parse(format!("URL parse error: {}", error))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::parse(format!("JSON parse error: {}", error))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::timeout(error.to_string())
        } else if error.is_connect() || error.is_request() {
            Self::network(error.to_string())
        } else {
            Self::http_request(error.to_string())
        }
    }
}

impl From<dotenv::Error> for AppError {
    fn from(error: dotenv::Error) -> Self {
        Self::config(format!("Environment file error: {}", error))
    }
}

impl From<std::num::ParseIntError> for AppError {
    fn from(error: std::num::ParseIntError) -> Self {
        Self::parse(format!("Integer parse error: {}", error))
    }
}

impl From<std::num::ParseFloatError> for AppError {
    fn from(error: std::num::ParseFloatError) -> Self {
        Self::parse(format!("Float parse error: {}", error))
    }
}

impl From<std::str::ParseBoolError> for AppError {
    fn from(error: std::str::ParseBoolError) -> Self {
        Self::parse(format!("Boolean parse error: {}", error))
    }
}

// Anyhow integration
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::internal(error.to_string())
    }
}

/// Custom Result type for the application
pub type Result<T> = std::result::Result<T, AppError>;

/// Error reporter for user-visible failure lines on stderr
pub struct ErrorReporter {
    pub use_color: bool,
    pub verbose: bool,
}

impl ErrorReporter {
    /// Create a new error reporter
    pub fn new(use_color: bool, verbose: bool) -> Self {
        Self { use_color, verbose }
    }

    /// Report an error to the user
    pub fn report_error(&self, error: &AppError) {
        eprintln!("{}", error.format_for_console(self.use_color));

        if self.verbose && error.is_recoverable() {
            if self.use_color {
                use colored::Colorize;
                eprintln!(
                    "{}",
                    "This error might be temporary. You can try running the command again."
                        .green()
                );
            } else {
                eprintln!("This error might be temporary. You can try running the command again.");
            }
        }
    }
}

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let config_error = AppError::config("Invalid configuration");
        assert_eq!(config_error.category(), "CONFIG");
        assert!(!config_error.is_recoverable());
        assert_eq!(config_error.exit_code(), 1);

        let network_error = AppError::network("Connection failed");
        assert_eq!(network_error.category(), "NETWORK");
        assert!(network_error.is_recoverable());
        assert_eq!(network_error.exit_code(), 2);
    }

    #[test]
    fn test_error_display() {
        let error = AppError::no_server_reachable("all probes failed");
        let display = error.to_string();
        assert!(display.contains("No server reachable"));
        assert!(display.contains("all probes failed"));
    }

    #[test]
    fn test_error_categories() {
        let errors = [
            AppError::config("config"),
            AppError::directory_unavailable("dir"),
            AppError::no_server_reachable("sel"),
            AppError::insufficient_samples("samples"),
            AppError::transfer_failed("transfer"),
            AppError::network("network"),
            AppError::http_request("http"),
            AppError::timeout("timeout"),
            AppError::parse("parse"),
            AppError::io("io"),
            AppError::internal("internal"),
        ];

        let expected_categories = [
            "CONFIG",
            "DIRECTORY",
            "SELECTION",
            "SAMPLES",
            "TRANSFER",
            "NETWORK",
            "HTTP",
            "TIMEOUT",
            "PARSE",
            "IO",
            "INTERNAL",
        ];

        for (error, expected) in errors.iter().zip(expected_categories.iter()) {
            assert_eq!(error.category(), *expected);
        }
    }

    #[test]
    fn test_recoverable_errors() {
        assert!(AppError::network("test").is_recoverable());
        assert!(AppError::transfer_failed("test").is_recoverable());
        assert!(AppError::timeout("test").is_recoverable());
        assert!(AppError::no_server_reachable("test").is_recoverable());

        assert!(!AppError::config("test").is_recoverable());
        assert!(!AppError::parse("test").is_recoverable());
        assert!(!AppError::internal("test").is_recoverable());
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(AppError::config("test").exit_code(), 1);
        assert_eq!(AppError::directory_unavailable("test").exit_code(), 2);
        assert_eq!(AppError::timeout("test").exit_code(), 3);
        assert_eq!(AppError::no_server_reachable("test").exit_code(), 4);
        assert_eq!(AppError::transfer_failed("test").exit_code(), 5);
        assert_eq!(AppError::io("test").exit_code(), 6);
        assert_eq!(AppError::internal("test").exit_code(), 99);
    }

    #[test]
    fn test_error_conversions() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let app_error: AppError = io_error.into();
        assert_eq!(app_error.category(), "IO");

        let parse_error = "not_a_number".parse::<i32>().unwrap_err();
        let app_error: AppError = parse_error.into();
        assert_eq!(app_error.category(), "PARSE");

        let url_error = url::Url::parse("not-a-valid-url").unwrap_err();
        let app_error: AppError = url_error.into();
        assert_eq!(app_error.category(), "PARSE");
    }

    #[test]
    fn test_console_formatting() {
        let error = AppError::transfer_failed("all workers failed");
        let formatted_no_color = error.format_for_console(false);
        let formatted_color = error.format_for_console(true);

        assert!(formatted_no_color.contains("[TRANSFER]"));
        assert!(formatted_no_color.contains("all workers failed"));
        assert!(formatted_color.contains("all workers failed"));
    }

    #[test]
    fn test_anyhow_integration() {
        let anyhow_error = anyhow::anyhow!("Test anyhow error");
        let app_error: AppError = anyhow_error.into();
        assert_eq!(app_error.category(), "INTERNAL");
    }

    #[test]
    fn test_error_reporter() {
        let reporter = ErrorReporter::new(false, true);
        let error = AppError::directory_unavailable("quality list empty");

        // Just test that it doesn't panic
        reporter.report_error(&error);
    }

    #[test]
    fn test_error_reporter_default() {
        let reporter = ErrorReporter::default();
        assert!(reporter.use_color);
        assert!(!reporter.verbose);
    }
}
