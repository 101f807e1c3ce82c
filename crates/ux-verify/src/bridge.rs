//! Mock Tauri IPC bridge
//!
//! The GUI talks to its native backend through a single global entry point,
//! `window.__TAURI_IPC__`. The verification replaces it with an async stub
//! that logs every call, sleeps to simulate backend latency and then resolves
//! with a fixed response. The latency window is what makes the button's
//! loading state observable.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::UxResult;

/// Global the Tauri front-end calls for every backend command.
pub const IPC_ENTRY_POINT: &str = "window.__TAURI_IPC__";

/// Prefix the stub logs intercepted calls with.
pub const IPC_LOG_PREFIX: &str = "IPC call:";

/// Default simulated backend latency.
pub const DEFAULT_IPC_DELAY: Duration = Duration::from_millis(2000);

/// Response the stub resolves every call with.
///
/// Mirrors the public half of the backend's `generate_configs` result; the
/// private keys are left out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockIpcResponse {
    pub client_yaml: String,
    pub server_yaml: String,
    pub client_public_key: String,
    pub server_public_key: String,
}

impl Default for MockIpcResponse {
    fn default() -> Self {
        Self {
            client_yaml: "mock client yaml".to_string(),
            server_yaml: "mock server yaml".to_string(),
            client_public_key: "mock key".to_string(),
            server_public_key: "mock key".to_string(),
        }
    }
}

/// Where in the page lifecycle the stub gets installed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InjectionPoint {
    /// `page.addInitScript`, runs before any document script on every navigation
    BeforeNavigation,
    /// `page.evaluate`, runs once against the already loaded document
    AfterLoad,
}

/// Installable replacement for the IPC entry point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MockBridge {
    pub response: MockIpcResponse,
    #[serde(with = "duration_ms")]
    pub delay: Duration,
}

impl Default for MockBridge {
    fn default() -> Self {
        Self {
            response: MockIpcResponse::default(),
            delay: DEFAULT_IPC_DELAY,
        }
    }
}

impl MockBridge {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            ..Default::default()
        }
    }

    /// JavaScript source that assigns the stub to the entry point.
    ///
    /// The handler only touches `message` to log it; the resolved value is a
    /// fresh copy of the same object for every call.
    pub fn handler_source(&self) -> UxResult<String> {
        let response = serde_json::to_string(&self.response)?;
        let prefix = serde_json::to_string(IPC_LOG_PREFIX)?;

        Ok(format!(
            r#"{entry} = async (message) => {{
  console.log({prefix}, JSON.stringify(message));
  await new Promise(resolve => setTimeout(resolve, {delay}));
  return {response};
}};"#,
            entry = IPC_ENTRY_POINT,
            prefix = prefix,
            delay = self.delay.as_millis(),
            response = response,
        ))
    }

    /// Playwright statement installing the stub at the given point.
    pub fn install_js(&self, point: InjectionPoint) -> UxResult<String> {
        let source = serde_json::to_string(&self.handler_source()?)?;
        Ok(match point {
            InjectionPoint::BeforeNavigation => {
                format!("    await page.addInitScript({{ content: {} }});", source)
            }
            InjectionPoint::AfterLoad => {
                format!("    await page.evaluate(source => {{ (0, eval)(source); }}, {});", source)
            }
        })
    }
}

/// Extract the payload of an intercepted call from a console line.
pub fn intercepted_message(console_text: &str) -> Option<&str> {
    console_text
        .strip_prefix(IPC_LOG_PREFIX)
        .map(str::trim_start)
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
