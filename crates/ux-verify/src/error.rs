//! Error types for UX verification

use thiserror::Error;

#[derive(Error, Debug)]
pub enum UxError {
    #[error("Playwright not found. Install with: npm install @playwright/test && npx playwright install chromium")]
    PlaywrightNotFound,

    #[error("Failed to launch verification script: {0}")]
    ScriptLaunch(String),

    #[error("Navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Assertion failed: {0}")]
    AssertionFailed(String),

    #[error("Script error: {0}")]
    Script(String),

    #[error("Invalid class pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type UxResult<T> = Result<T, UxError>;

impl UxError {
    /// Classify an error message reported by the Playwright script.
    ///
    /// Playwright surfaces every failure as a JS `Error`, so the kind has to
    /// be recovered from the message text. The first line names the failing
    /// call; assertion failures keep the `Expected`/`Received` lines below it.
    pub fn from_script_message(message: &str, url: &str) -> Self {
        let lower = first_line(message).to_lowercase();

        if lower.contains("page.goto") || lower.contains("net::err_") || lower.contains("ns_error_") {
            UxError::Navigation {
                url: url.to_string(),
                reason: first_line(message),
            }
        } else if lower.contains("tohaveclass") || lower.contains("expect(") {
            UxError::AssertionFailed(without_call_log(message))
        } else if lower.contains("locator.click") || lower.contains("getbyrole") {
            UxError::ElementNotFound(first_line(message))
        } else {
            UxError::Script(first_line(message))
        }
    }
}

fn first_line(message: &str) -> String {
    message.lines().next().unwrap_or_default().trim().to_string()
}

/// The message up to Playwright's trailing `Call log:` section
fn without_call_log(message: &str) -> String {
    let end = message.find("Call log:").unwrap_or(message.len());
    message[..end].trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "http://localhost:3000";

    #[test]
    fn test_classify_navigation_failure() {
        let err = UxError::from_script_message(
            "page.goto: net::ERR_CONNECTION_REFUSED at http://localhost:3000/\nCall log:",
            URL,
        );
        assert!(matches!(err, UxError::Navigation { .. }));
        assert!(err.to_string().contains("ERR_CONNECTION_REFUSED"));
    }

    #[test]
    fn test_classify_assertion_failure() {
        let err = UxError::from_script_message(
            "Timed out 5000ms waiting for expect(locator).toHaveClass(expected)\n\nExpected pattern: /loading/\nReceived string: \"btn btn-primary\"\nCall log:\n  - expect.toHaveClass with timeout 5000ms",
            URL,
        );
        assert!(matches!(err, UxError::AssertionFailed(_)));
        assert_eq!(
            err.to_string(),
            "Assertion failed: Timed out 5000ms waiting for expect(locator).toHaveClass(expected)\n\nExpected pattern: /loading/\nReceived string: \"btn btn-primary\""
        );
    }

    #[test]
    fn test_classify_missing_element() {
        let err = UxError::from_script_message(
            "locator.click: Timeout 30000ms exceeded.\nCall log:\n  - waiting for getByRole('button', { name: 'Generate configs' })",
            URL,
        );
        assert!(matches!(err, UxError::ElementNotFound(_)));
        assert_eq!(err.to_string(), "Element not found: locator.click: Timeout 30000ms exceeded.");
    }

    #[test]
    fn test_classify_other_failure() {
        let err = UxError::from_script_message("browserType.launch: Executable doesn't exist", URL);
        assert!(matches!(err, UxError::Script(_)));
    }
}
