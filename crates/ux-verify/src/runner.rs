//! Runner that ties the scenario, the Playwright script and its outcome together

use std::path::PathBuf;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::bridge;
use crate::error::{UxError, UxResult};
use crate::events::ScriptEvent;
use crate::playwright::{absolute, PlaywrightConfig, PlaywrightHandle, ScriptOutput};
use crate::scenario::{LoadingStateOptions, Scenario};

/// Pass/fail result of one verification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum Outcome {
    Passed,
    Failed(String),
}

impl Outcome {
    pub fn is_passed(&self) -> bool {
        matches!(self, Outcome::Passed)
    }
}

/// What happened during one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub scenario: String,
    pub outcome: Outcome,
    pub completed_steps: Vec<String>,
    pub ipc_messages: Vec<String>,
    pub screenshot: Option<PathBuf>,
    pub browser_closed: bool,
    pub duration_ms: u64,
}

impl RunReport {
    fn new(scenario: &str) -> Self {
        Self {
            scenario: scenario.to_string(),
            outcome: Outcome::Passed,
            completed_steps: Vec::new(),
            ipc_messages: Vec::new(),
            screenshot: None,
            browser_closed: false,
            duration_ms: 0,
        }
    }

    /// Fold the script's events into the report.
    ///
    /// Only the first failure counts; a later screenshot failure does not
    /// hide the assertion that failed before it.
    fn apply(&mut self, output: &ScriptOutput, url: &str) {
        let mut failure: Option<UxError> = None;

        for event in &output.events {
            match event {
                ScriptEvent::Console { text, .. } => {
                    if let Some(message) = bridge::intercepted_message(text) {
                        self.ipc_messages.push(message.to_string());
                    }
                }
                ScriptEvent::Step { name, .. } => self.completed_steps.push(name.clone()),
                ScriptEvent::Failed { error } => {
                    if failure.is_none() {
                        failure = Some(UxError::from_script_message(error, url));
                    }
                }
                ScriptEvent::Screenshot { path } => self.screenshot = Some(path.clone()),
                ScriptEvent::Closed => self.browser_closed = true,
            }
        }

        if failure.is_none() && !output.exit_success {
            let stderr = output.stderr.lines().next().unwrap_or("no output");
            failure = Some(UxError::Script(format!("node exited abnormally: {}", stderr)));
        }

        if let Some(err) = failure {
            self.outcome = Outcome::Failed(err.to_string());
        }
    }
}

/// Configuration for the runner
#[derive(Debug, Clone, Default)]
pub struct RunnerConfig {
    pub playwright: PlaywrightConfig,
    pub scenario: LoadingStateOptions,
}

impl RunnerConfig {
    /// The assertion window must close before the mocked call resolves,
    /// otherwise the loading class is already gone when it is checked.
    pub fn validate(&self) -> UxResult<()> {
        let settle = self.scenario.settle;
        let delay = self.scenario.bridge.delay;
        if settle >= delay {
            return Err(UxError::InvalidConfig(format!(
                "settle time ({} ms) must be shorter than the IPC delay ({} ms)",
                settle.as_millis(),
                delay.as_millis()
            )));
        }
        Ok(())
    }

    pub fn with_delays(mut self, ipc_delay: Duration, settle: Duration) -> Self {
        self.scenario.bridge.delay = ipc_delay;
        self.scenario.settle = settle;
        self
    }
}

/// Drives one verification run
pub struct VerificationRunner {
    config: RunnerConfig,
}

impl VerificationRunner {
    pub fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    /// Run the loading-state scenario.
    ///
    /// Every failure, from a missing toolchain to a failed assertion, ends up
    /// in the report's outcome; this never returns an error.
    pub async fn run(&self) -> RunReport {
        let start = Instant::now();

        let mut report = match Scenario::loading_state(self.config.scenario.clone()) {
            Ok(scenario) => {
                let mut report = RunReport::new(&scenario.name);
                if let Err(e) = self.execute(&scenario, &mut report).await {
                    report.outcome = Outcome::Failed(e.to_string());
                }
                report
            }
            Err(e) => {
                let mut report = RunReport::new("generate-configs-loading-state");
                report.outcome = Outcome::Failed(e.to_string());
                report
            }
        };

        report.duration_ms = start.elapsed().as_millis() as u64;
        report
    }

    async fn execute(&self, scenario: &Scenario, report: &mut RunReport) -> UxResult<()> {
        self.config.validate()?;

        if let Some(dir) = absolute(&scenario.screenshot.path).parent() {
            std::fs::create_dir_all(dir)?;
        }

        let playwright = PlaywrightHandle::new(self.config.playwright.clone()).await?;
        let script = playwright.build_script(scenario)?;

        info!(
            "Verifying '{}' against {} ({})",
            scenario.name,
            scenario.url(),
            playwright.config().browser.as_str()
        );

        let step_count = scenario.steps.len();
        let output = playwright
            .run_script(&script, |event| log_event(event, step_count))
            .await?;

        report.apply(&output, scenario.url());

        if !report.browser_closed {
            warn!("Script ended without confirming the browser was closed");
        }
        Ok(())
    }
}

fn log_event(event: &ScriptEvent, step_count: usize) {
    match event {
        ScriptEvent::Console { kind, text } => match bridge::intercepted_message(text) {
            Some(message) => info!("IPC call intercepted: {}", message),
            None => debug!("[console.{}] {}", kind, text),
        },
        ScriptEvent::Step { index, name } => {
            info!("✓ [{}/{}] {}", index + 1, step_count, name)
        }
        ScriptEvent::Failed { error } => {
            debug!("Script reported failure: {}", error)
        }
        ScriptEvent::Screenshot { path } => info!("Screenshot saved to {}", path.display()),
        ScriptEvent::Closed => debug!("Browser closed"),
    }
}
