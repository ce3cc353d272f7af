//! Command-line interface

use clap::Parser;

/// Network Speed Tester - measure latency, jitter, packet loss and
/// download/upload throughput from the command line
#[derive(Parser, Debug, Clone)]
#[command(name = "network-speed-tester")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Perform latency test only
    #[arg(long)]
    pub latency: bool,

    /// Perform download test only. It includes latency test
    #[arg(long)]
    pub download: bool,

    /// Perform upload test only. It includes latency test
    #[arg(long)]
    pub upload: bool,

    /// Generate and provide a URL to the share results image
    #[arg(long)]
    pub share: bool,

    /// Show verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,

    /// Force colored output
    #[arg(long)]
    pub color: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// How many nearby servers to probe during selection
    #[arg(long, value_name = "N")]
    pub top_n: Option<usize>,

    /// How many probes to send for the packet-loss estimate
    #[arg(long, value_name = "N")]
    pub loss_probes: Option<usize>,

    /// HTTP request timeout in seconds
    #[arg(short, long)]
    pub timeout: Option<u64>,
}

impl Cli {
    /// Validate CLI arguments for conflicts
    pub fn validate(&self) -> Result<(), String> {
        if self.color && self.no_color {
            return Err("Cannot specify both --color and --no-color".to_string());
        }
        Ok(())
    }

    /// Check if colors should be enabled
    pub fn use_colors(&self) -> bool {
        if self.color {
            true
        } else if self.no_color {
            false
        } else {
            supports_color()
        }
    }
}

/// Detect whether the terminal wants colored output
fn supports_color() -> bool {
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }
    if let Ok(term) = std::env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }
    true
}
