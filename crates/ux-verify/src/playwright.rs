//! Playwright browser automation
//!
//! A scenario is compiled into a single Node.js script that drives
//! `@playwright/test`. The script reports progress as JSON lines on stdout
//! (see [`ScriptEvent`]) so the Rust side never has to scrape free text.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{UxError, UxResult};
use crate::events::ScriptEvent;
use crate::scenario::{Scenario, Step};

/// Playwright module the generated script requires
pub const PLAYWRIGHT_MODULE: &str = "@playwright/test";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Browser {
    pub fn as_str(&self) -> &'static str {
        match self {
            Browser::Chromium => "chromium",
            Browser::Firefox => "firefox",
            Browser::Webkit => "webkit",
        }
    }
}

/// Configuration for Playwright
#[derive(Debug, Clone)]
pub struct PlaywrightConfig {
    pub browser: Browser,
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// `node` executable
    pub node_binary: PathBuf,
    /// Directory exported as `NODE_PATH` so the script can resolve Playwright
    pub node_path: PathBuf,
}

impl Default for PlaywrightConfig {
    fn default() -> Self {
        Self {
            browser: Browser::Chromium,
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            node_binary: PathBuf::from("node"),
            node_path: PathBuf::from("node_modules"),
        }
    }
}

/// Everything the script reported during one run
#[derive(Debug, Clone, Default)]
pub struct ScriptOutput {
    pub events: Vec<ScriptEvent>,
    pub exit_success: bool,
    pub stderr: String,
}

/// Playwright browser handle
pub struct PlaywrightHandle {
    config: PlaywrightConfig,
}

impl PlaywrightHandle {
    /// Create a handle after checking that node can resolve Playwright
    pub async fn new(config: PlaywrightConfig) -> UxResult<Self> {
        let handle = Self::unchecked(config);
        handle.check_playwright_installed().await?;
        Ok(handle)
    }

    /// Create a handle without checking the toolchain
    pub fn unchecked(config: PlaywrightConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlaywrightConfig {
        &self.config
    }

    async fn check_playwright_installed(&self) -> UxResult<()> {
        let resolve = format!("require.resolve({})", serde_json::to_string(PLAYWRIGHT_MODULE)?);
        let status = self
            .node_command()
            .args(["-e", &resolve])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;

        match status {
            Ok(status) if status.success() => Ok(()),
            Ok(_) => Err(UxError::PlaywrightNotFound),
            Err(e) => Err(UxError::ScriptLaunch(format!(
                "{}: {}",
                self.config.node_binary.display(),
                e
            ))),
        }
    }

    fn node_command(&self) -> Command {
        let mut cmd = Command::new(&self.config.node_binary);
        cmd.env("NODE_PATH", absolute(&self.config.node_path));
        cmd
    }

    /// Build the Playwright script for a scenario.
    ///
    /// Steps run inside one `try`; the first failure is reported and the
    /// remaining steps are skipped. The screenshot is taken after that block
    /// and the browser is closed in the outermost `finally`.
    pub fn build_script(&self, scenario: &Scenario) -> UxResult<String> {
        let mut script = String::new();

        script.push_str(&format!(
            r#"const {{ chromium, firefox, webkit, expect }} = require({module});

const emit = (event) => console.log(JSON.stringify(event));
const describe = (error) => String((error && error.message) || error);

(async () => {{
  const browser = await {browser}.launch({{ headless: {headless} }});
  try {{
    const context = await browser.newContext({{
      viewport: {{ width: {width}, height: {height} }}
    }});
    const page = await context.newPage();
    page.on('console', msg => emit({{ event: 'console', kind: msg.type(), text: msg.text() }}));

    try {{
"#,
            module = serde_json::to_string(PLAYWRIGHT_MODULE)?,
            browser = self.config.browser.as_str(),
            headless = self.config.headless,
            width = self.config.viewport_width,
            height = self.config.viewport_height,
        ));

        for (i, step) in scenario.steps.iter().enumerate() {
            let name = step.name();
            script.push_str(&format!("\n    // Step {}: {}\n", i + 1, name));
            script.push_str(&self.step_to_js(step)?);
            script.push_str(&format!(
                "\n    emit({{ event: 'step', index: {}, name: {} }});\n",
                i,
                serde_json::to_string(&name)?
            ));
        }

        let path = absolute(&scenario.screenshot.path);
        let path = serde_json::to_string(&path.to_string_lossy())?;
        script.push_str(&format!(
            r#"
    }} catch (error) {{
      emit({{ event: 'failed', error: describe(error) }});
    }}

    try {{
      await page.screenshot({{ path: {path}, fullPage: {full_page} }});
      emit({{ event: 'screenshot', path: {path} }});
    }} catch (error) {{
      emit({{ event: 'failed', error: describe(error) }});
    }}
  }} finally {{
    await browser.close();
    emit({{ event: 'closed' }});
  }}
}})().catch(error => {{
  emit({{ event: 'failed', error: describe(error) }});
  process.exitCode = 1;
}});
"#,
            path = path,
            full_page = scenario.screenshot.full_page,
        ));

        Ok(script)
    }

    /// Convert a step to JavaScript code
    fn step_to_js(&self, step: &Step) -> UxResult<String> {
        Ok(match step {
            Step::InstallBridge { bridge, point } => bridge.install_js(*point)?,
            Step::Navigate { url } => {
                format!("    await page.goto({});", serde_json::to_string(url)?)
            }
            Step::Click { target } => {
                format!("    await {}.click();", target.locator_js()?)
            }
            Step::Settle { ms } => {
                format!("    await page.waitForTimeout({});", ms)
            }
            Step::AssertClass { target, pattern } => {
                format!(
                    "    await expect({}).toHaveClass({});",
                    target.locator_js()?,
                    pattern.js_expr()?
                )
            }
        })
    }

    /// Run a script with node, streaming its events to `on_event`.
    pub async fn run_script<F>(&self, script: &str, mut on_event: F) -> UxResult<ScriptOutput>
    where
        F: FnMut(&ScriptEvent),
    {
        let temp_dir = tempfile::tempdir()?;
        let script_path = temp_dir.path().join("verify_ux.js");
        std::fs::write(&script_path, script)?;

        debug!("Running Playwright script: {}", script_path.display());

        let mut child = self
            .node_command()
            .arg(&script_path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                UxError::ScriptLaunch(format!("{}: {}", self.config.node_binary.display(), e))
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| UxError::ScriptLaunch("stdout not captured".to_string()))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| UxError::ScriptLaunch("stderr not captured".to_string()))?;

        let stderr_task = tokio::spawn(async move {
            let mut buf = Vec::new();
            let _ = stderr.read_to_end(&mut buf).await;
            String::from_utf8_lossy(&buf).into_owned()
        });

        let mut output = ScriptOutput::default();
        // Split on raw bytes: a stray non-UTF-8 line must not end the read
        // early, or node is killed before its `finally` closes the browser.
        let mut segments = BufReader::new(stdout).split(b'\n');
        loop {
            let segment = match segments.next_segment().await {
                Ok(Some(segment)) => segment,
                Ok(None) => break,
                Err(e) => {
                    warn!("Failed to read script output: {}", e);
                    break;
                }
            };
            let line = String::from_utf8_lossy(&segment);
            let line = line.trim_end_matches('\r');
            match ScriptEvent::parse(line) {
                Some(event) => {
                    on_event(&event);
                    output.events.push(event);
                }
                None => debug!("[node] {}", line),
            }
        }

        let status = child.wait().await?;
        output.exit_success = status.success();
        output.stderr = stderr_task.await.unwrap_or_default();

        if !output.exit_success {
            warn!("Playwright script exited with {}", status);
        }

        Ok(output)
    }
}

/// Resolve a path against the current directory, leaving it untouched on failure
pub(crate) fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}
