//! Structured events the generated script prints on stdout

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One JSON line from the verification script
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ScriptEvent {
    /// Page console output, including the mock's IPC log lines
    Console { kind: String, text: String },

    /// Step `index` finished
    Step { index: usize, name: String },

    /// The top-level handler caught an error
    Failed { error: String },

    /// The screenshot was written
    Screenshot { path: PathBuf },

    /// The browser was released
    Closed,
}

impl ScriptEvent {
    /// Parse a stdout line, `None` for anything that is not an event.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if !line.starts_with('{') {
            return None;
        }
        serde_json::from_str(line).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_events() {
        assert_eq!(
            ScriptEvent::parse(r#"{"event":"step","index":3,"name":"click:button"}"#),
            Some(ScriptEvent::Step {
                index: 3,
                name: "click:button".to_string()
            })
        );
        assert_eq!(
            ScriptEvent::parse(r#"  {"event":"closed"}  "#),
            Some(ScriptEvent::Closed)
        );
        assert_eq!(
            ScriptEvent::parse(r#"{"event":"failed","error":"boom"}"#),
            Some(ScriptEvent::Failed {
                error: "boom".to_string()
            })
        );
    }

    #[test]
    fn test_ignore_non_events() {
        assert_eq!(ScriptEvent::parse("Downloading Chromium..."), None);
        assert_eq!(ScriptEvent::parse(r#"{"success":true}"#), None);
        assert_eq!(ScriptEvent::parse("{not json"), None);
    }
}
