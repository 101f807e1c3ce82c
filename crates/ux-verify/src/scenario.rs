//! Verification scenario: the ordered browser steps of one run

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::bridge::{InjectionPoint, MockBridge};
use crate::error::{UxError, UxResult};

/// Application URL served by the GUI dev server
pub const DEFAULT_APP_URL: &str = "http://localhost:3000";

/// Accessible name of the button that triggers config generation
pub const GENERATE_BUTTON: &str = "Generate configs";

/// Class the button carries while a request is in flight
pub const LOADING_CLASS_PATTERN: &str = "loading";

/// Time allowed for the class change to apply after the click
pub const DEFAULT_SETTLE: Duration = Duration::from_millis(500);

/// Screenshot written at the end of every run
pub const DEFAULT_SCREENSHOT_PATH: &str = "verification/ux_verification_refined.png";

/// An element located by ARIA role and accessible name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub role: String,
    pub name: String,
}

impl Target {
    pub fn button(name: impl Into<String>) -> Self {
        Self {
            role: "button".to_string(),
            name: name.into(),
        }
    }

    /// Playwright locator expression for this target
    pub fn locator_js(&self) -> UxResult<String> {
        Ok(format!(
            "page.getByRole({}, {{ name: {} }})",
            serde_json::to_string(&self.role)?,
            serde_json::to_string(&self.name)?,
        ))
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[name=\"{}\"]", self.role, self.name)
    }
}

/// Regular expression matched against an element's `class` attribute.
///
/// A match anywhere in the attribute passes, so `loading` accepts
/// `"btn btn-primary loading"`.
#[derive(Debug, Clone)]
pub struct ClassPattern {
    regex: Regex,
}

impl ClassPattern {
    pub fn new(pattern: &str) -> UxResult<Self> {
        if pattern.is_empty() {
            return Err(UxError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: "pattern is empty".to_string(),
            });
        }
        if let Some(at) = rust_only_group(pattern) {
            return Err(UxError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: format!("inline flags or named groups at offset {} are not portable", at),
            });
        }
        let regex = Regex::new(pattern).map_err(|e| UxError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { regex })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    pub fn is_match(&self, class_attr: &str) -> bool {
        self.regex.is_match(class_attr)
    }

    /// The pattern as a JavaScript `RegExp` constructor call.
    ///
    /// Passing the source as a string literal avoids regex-literal escaping;
    /// `ClassPattern::new` has already rejected syntax JavaScript does not share.
    pub fn js_expr(&self) -> UxResult<String> {
        Ok(format!("new RegExp({})", serde_json::to_string(self.as_str())?))
    }
}

/// Rust regex group syntax with no JavaScript equivalent: inline flags such
/// as `(?i)` and `(?P<name>...)` groups.
fn rust_only_group(pattern: &str) -> Option<usize> {
    let bytes = pattern.as_bytes();
    let mut escaped = false;
    for (i, &b) in bytes.iter().enumerate() {
        if !escaped && b == b'(' && bytes.get(i + 1) == Some(&b'?') {
            if let Some(next) = bytes.get(i + 2) {
                if next.is_ascii_alphabetic() || *next == b'-' {
                    return Some(i);
                }
            }
        }
        escaped = b == b'\\' && !escaped;
    }
    None
}

impl PartialEq for ClassPattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Serialize for ClassPattern {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ClassPattern {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let pattern = String::deserialize(deserializer)?;
        ClassPattern::new(&pattern).map_err(serde::de::Error::custom)
    }
}

/// A single browser step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Replace the IPC entry point with the mock
    InstallBridge {
        bridge: MockBridge,
        point: InjectionPoint,
    },

    /// Navigate to an absolute URL
    Navigate { url: String },

    /// Click an element once
    Click { target: Target },

    /// Wait a fixed time, no condition check
    Settle { ms: u64 },

    /// Assert the element's class attribute matches a pattern
    AssertClass { target: Target, pattern: ClassPattern },
}

impl Step {
    pub fn name(&self) -> String {
        match self {
            Step::InstallBridge { point, .. } => match point {
                InjectionPoint::BeforeNavigation => "install-bridge:init-script".to_string(),
                InjectionPoint::AfterLoad => "install-bridge:evaluate".to_string(),
            },
            Step::Navigate { url } => format!("navigate:{}", url),
            Step::Click { target } => format!("click:{}", target),
            Step::Settle { ms } => format!("settle:{}ms", ms),
            Step::AssertClass { target, pattern } => {
                format!("assert-class:{}~/{}/", target, pattern.as_str())
            }
        }
    }
}

/// Final screenshot, taken whether or not the steps succeeded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Screenshot {
    pub path: PathBuf,
    #[serde(default)]
    pub full_page: bool,
}

/// A named, ordered list of steps ending in one screenshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub steps: Vec<Step>,
    pub screenshot: Screenshot,
}

/// Knobs for the loading-state scenario
#[derive(Debug, Clone)]
pub struct LoadingStateOptions {
    pub url: String,
    pub button: String,
    pub class_pattern: String,
    pub bridge: MockBridge,
    pub settle: Duration,
    pub screenshot: PathBuf,
}

impl Default for LoadingStateOptions {
    fn default() -> Self {
        Self {
            url: DEFAULT_APP_URL.to_string(),
            button: GENERATE_BUTTON.to_string(),
            class_pattern: LOADING_CLASS_PATTERN.to_string(),
            bridge: MockBridge::default(),
            settle: DEFAULT_SETTLE,
            screenshot: PathBuf::from(DEFAULT_SCREENSHOT_PATH),
        }
    }
}

impl Scenario {
    /// Click "Generate configs" against a slow mocked backend and check the
    /// button enters its loading state.
    ///
    /// The bridge goes in as an init script so the app binds to it while
    /// bootstrapping, and again after navigation in case the app captured
    /// the global before the init script ran.
    pub fn loading_state(options: LoadingStateOptions) -> UxResult<Self> {
        let pattern = ClassPattern::new(&options.class_pattern)?;
        let button = Target::button(options.button);

        Ok(Self {
            name: "generate-configs-loading-state".to_string(),
            steps: vec![
                Step::InstallBridge {
                    bridge: options.bridge.clone(),
                    point: InjectionPoint::BeforeNavigation,
                },
                Step::Navigate { url: options.url },
                Step::InstallBridge {
                    bridge: options.bridge,
                    point: InjectionPoint::AfterLoad,
                },
                Step::Click {
                    target: button.clone(),
                },
                Step::Settle {
                    ms: options.settle.as_millis() as u64,
                },
                Step::AssertClass {
                    target: button,
                    pattern,
                },
            ],
            screenshot: Screenshot {
                path: options.screenshot,
                full_page: false,
            },
        })
    }

    /// URL of the first navigation, used to attribute navigation failures
    pub fn url(&self) -> &str {
        self.steps
            .iter()
            .find_map(|step| match step {
                Step::Navigate { url } => Some(url.as_str()),
                _ => None,
            })
            .unwrap_or_default()
    }
}
