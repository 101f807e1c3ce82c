//! verify-ux - loading-state check for the vtrunkd configuration GUI
//!
//! Expects the GUI front-end to be served already (by default on
//! http://localhost:3000). Run with no arguments for the standard check.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ux_verify::playwright::{Browser, PlaywrightConfig};
use ux_verify::scenario::{self, LoadingStateOptions};
use ux_verify::{MockBridge, Outcome, RunnerConfig, VerificationRunner};

#[derive(Parser, Debug)]
#[command(name = "verify-ux")]
#[command(version, about = "Verify the Generate configs loading state in the vtrunkd GUI")]
struct Args {
    /// Application URL
    #[arg(long, default_value = scenario::DEFAULT_APP_URL)]
    url: String,

    /// Screenshot output path
    #[arg(long, default_value = scenario::DEFAULT_SCREENSHOT_PATH)]
    screenshot: PathBuf,

    /// Browser to use
    #[arg(long, value_enum, default_value_t = Browser::Chromium)]
    browser: Browser,

    /// Show the browser window
    #[arg(long)]
    headed: bool,

    /// Viewport width
    #[arg(long, default_value = "1280")]
    viewport_width: u32,

    /// Viewport height
    #[arg(long, default_value = "720")]
    viewport_height: u32,

    /// Simulated backend latency of the mocked IPC bridge
    #[arg(long, default_value = "2000")]
    ipc_delay_ms: u64,

    /// Wait between the click and the class assertion
    #[arg(long, default_value = "500")]
    settle_ms: u64,

    /// Directory containing @playwright/test, exported as NODE_PATH
    #[arg(long, default_value = "node_modules")]
    node_path: PathBuf,

    /// Exit with status 1 when the check fails
    #[arg(long)]
    strict: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn runner_config(&self) -> RunnerConfig {
        RunnerConfig {
            playwright: PlaywrightConfig {
                browser: self.browser,
                headless: !self.headed,
                viewport_width: self.viewport_width,
                viewport_height: self.viewport_height,
                node_path: self.node_path.clone(),
                ..Default::default()
            },
            scenario: LoadingStateOptions {
                url: self.url.clone(),
                bridge: MockBridge::new(Duration::from_millis(self.ipc_delay_ms)),
                settle: Duration::from_millis(self.settle_ms),
                screenshot: self.screenshot.clone(),
                ..Default::default()
            },
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .with_target(false)
        .init();

    let report = VerificationRunner::new(args.runner_config()).run().await;

    match &report.outcome {
        Outcome::Passed => info!(
            "✓ {} passed ({} ms)",
            report.scenario, report.duration_ms
        ),
        Outcome::Failed(reason) => println!("Test failed: {}", reason),
    }

    if args.strict && !report.outcome.is_passed() {
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_fixed_run() {
        let args = Args::parse_from(["verify-ux"]);
        let config = args.runner_config();

        assert_eq!(config.scenario.url, "http://localhost:3000");
        assert_eq!(
            config.scenario.screenshot,
            PathBuf::from("verification/ux_verification_refined.png")
        );
        assert_eq!(config.scenario.bridge, MockBridge::default());
        assert_eq!(config.scenario.settle, Duration::from_millis(500));
        assert_eq!(config.playwright.browser, Browser::Chromium);
        assert!(config.playwright.headless);
        assert!(!args.strict);
    }

    #[test]
    fn test_flags_override_defaults() {
        let args = Args::parse_from([
            "verify-ux",
            "--browser",
            "webkit",
            "--headed",
            "--settle-ms",
            "250",
            "--strict",
        ]);
        let config = args.runner_config();

        assert_eq!(config.playwright.browser, Browser::Webkit);
        assert!(!config.playwright.headless);
        assert_eq!(config.scenario.settle, Duration::from_millis(250));
        assert!(args.strict);
    }
}
