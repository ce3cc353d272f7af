//! Network Speed Tester - Main CLI Application

use clap::Parser;
use network_speed_tester::{
    app::SpeedTest,
    cli::Cli,
    config::load_config,
    error::{ErrorReporter, Result},
};
use std::process;

#[tokio::main]
async fn main() {
    // Set up better panic handling
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panic: {}", panic_info);
        process::exit(1);
    }));

    // Parse command line arguments; clap handles --help and --version
    let cli = Cli::parse();

    if let Err(message) = cli.validate() {
        eprintln!("Error: {}", message);
        process::exit(1);
    }

    let use_colors = cli.use_colors();
    let verbose = cli.verbose;

    if let Err(e) = run_application(cli).await {
        let reporter = ErrorReporter::new(use_colors, verbose);
        reporter.report_error(&e);
        process::exit(e.exit_code());
    }
}

/// Main application logic
async fn run_application(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;

    if config.debug {
        eprintln!(
            "{} v{}",
            network_speed_tester::PKG_NAME,
            network_speed_tester::VERSION
        );
        eprintln!("Debug mode enabled");
        eprintln!(
            "  top_n: {} / quality_top_n: {}",
            config.server_top_n, config.quality_top_n
        );
        eprintln!(
            "  latency samples: {} / loss probes: {}",
            config.latency_samples, config.loss_probes
        );
        eprintln!(
            "  probe timeout: {}s / http timeout: {}s",
            config.probe_timeout_seconds, config.http_timeout_seconds
        );
    }

    let app = SpeedTest::new(config)?;
    app.run().await?;
    Ok(())
}
