//! Metric output and live progress reporting
//!
//! Metrics go to stdout as `metric_name value` lines, one per line, so
//! the output stays scriptable. Progress dots and the banner are
//! cosmetic and only appear in verbose mode. A failed phase never emits
//! a partial metric line.

use colored::Colorize;
use std::io::Write;
use std::sync::Mutex;

/// Writes the machine-readable metric lines
#[derive(Debug, Default)]
pub struct MetricWriter;

impl MetricWriter {
    pub fn new() -> Self {
        Self
    }

    pub fn metric<V: std::fmt::Display>(&self, name: &str, value: V) {
        println!("{} {}", name, value);
    }

    /// Floating-point metric with fixed precision
    pub fn metric_f64(&self, name: &str, value: f64) {
        println!("{} {:.2}", name, value);
    }
}

/// Live progress dots: `.` per success, `*` per failure.
///
/// Callbacks arrive from concurrently completing probes and workers, so
/// writes go through a mutex-guarded handle and every dot is flushed
/// immediately. Printing never blocks on anything but the terminal.
pub struct ProgressReporter {
    enabled: bool,
    use_color: bool,
    sink: Mutex<std::io::Stdout>,
}

impl ProgressReporter {
    pub fn new(enabled: bool, use_color: bool) -> Self {
        Self {
            enabled,
            use_color,
            sink: Mutex::new(std::io::stdout()),
        }
    }

    /// One completed unit of work
    pub fn tick(&self, success: bool) {
        if !self.enabled {
            return;
        }
        let dot = if success { "." } else { "*" };
        let rendered = if self.use_color {
            if success {
                dot.green().to_string()
            } else {
                dot.red().to_string()
            }
        } else {
            dot.to_string()
        };
        if let Ok(mut sink) = self.sink.lock() {
            let _ = write!(sink, "{}", rendered);
            let _ = sink.flush();
        }
    }

    /// Terminate the dot row
    pub fn finish_row(&self) {
        if !self.enabled {
            return;
        }
        if let Ok(mut sink) = self.sink.lock() {
            let _ = writeln!(sink);
        }
    }

    /// Free-form verbose status line
    pub fn status(&self, message: &str) {
        if !self.enabled {
            return;
        }
        if let Ok(mut sink) = self.sink.lock() {
            let _ = writeln!(sink, "{}", message);
        }
    }
}

/// Verbose-mode banner
pub fn banner() -> String {
    format!(
        "{} version {}\n{}",
        crate::PKG_NAME,
        crate::VERSION,
        crate::PKG_DESCRIPTION
    )
}
