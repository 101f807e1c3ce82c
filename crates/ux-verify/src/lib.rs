//! vtrunkd UX verification
//!
//! Drives the configuration GUI in a headless browser and checks that the
//! "Generate configs" button enters its loading state while a (mocked)
//! backend call is in flight:
//! - Replaces the Tauri IPC entry point with a slow, fixed-response stub
//! - Compiles the steps into a Playwright script and runs it with node
//! - Reports the outcome and always leaves a screenshot behind
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 VerificationRunner (Rust)                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Scenario::loading_state() -> [Step]                        │
//! │    ├── install_bridge { init script }                       │
//! │    ├── navigate { http://localhost:3000 }                   │
//! │    ├── install_bridge { evaluate }                          │
//! │    ├── click { button "Generate configs" }                  │
//! │    ├── settle { 500 ms }                                    │
//! │    └── assert_class { /loading/ }                           │
//! │  + screenshot (outside the failure scope)                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  PlaywrightHandle                                           │
//! │    ├── build_script(scenario) -> JS                         │
//! │    └── run_script(js) -> [ScriptEvent] (JSON lines)         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  RunReport { outcome, steps, ipc_messages, screenshot }     │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod bridge;
pub mod error;
pub mod events;
pub mod playwright;
pub mod runner;
pub mod scenario;

pub use bridge::{MockBridge, MockIpcResponse};
pub use error::{UxError, UxResult};
pub use runner::{Outcome, RunReport, RunnerConfig, VerificationRunner};
pub use scenario::{Scenario, Step};
