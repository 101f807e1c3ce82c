//! Script generation and end-to-end checks for the loading-state verification
//!
//! The live test needs the GUI served on http://localhost:3000 and
//! `@playwright/test` installed; it only runs with `UX_VERIFY_LIVE=1`:
//!
//!   UX_VERIFY_LIVE=1 cargo test --package vtrunkd-ux-verify --test verification

use std::path::PathBuf;
use std::time::Duration;

use test_case::test_case;

use ux_verify::bridge::{InjectionPoint, MockBridge};
use ux_verify::playwright::{Browser, PlaywrightConfig, PlaywrightHandle};
use ux_verify::scenario::{ClassPattern, LoadingStateOptions, Scenario, Step};
use ux_verify::{Outcome, RunnerConfig, VerificationRunner};

fn build(options: LoadingStateOptions, config: PlaywrightConfig) -> String {
    let scenario = Scenario::loading_state(options).unwrap();
    PlaywrightHandle::unchecked(config).build_script(&scenario).unwrap()
}

#[test_case("btn btn-primary loading", true ; "loading appended")]
#[test_case("loading", true ; "loading only")]
#[test_case("btn is-loading", true ; "loading as substring")]
#[test_case("btn btn-primary", false ; "idle button")]
#[test_case("", false ; "no class")]
fn loading_pattern_matches_class_attribute(class_attr: &str, expected: bool) {
    let pattern = ClassPattern::new("loading").unwrap();
    assert_eq!(pattern.is_match(class_attr), expected);
}

#[test_case(Browser::Chromium, "chromium" ; "chromium")]
#[test_case(Browser::Firefox, "firefox" ; "firefox")]
#[test_case(Browser::Webkit, "webkit" ; "webkit")]
fn script_launches_selected_browser(browser: Browser, name: &str) {
    let script = build(
        LoadingStateOptions::default(),
        PlaywrightConfig {
            browser,
            ..Default::default()
        },
    );
    assert!(script.contains(&format!("await {}.launch({{ headless: true }});", name)));
}

#[test]
fn mock_bridge_is_identical_at_both_injection_points() {
    let scenario = Scenario::loading_state(LoadingStateOptions::default()).unwrap();

    let bridges: Vec<(&MockBridge, InjectionPoint)> = scenario
        .steps
        .iter()
        .filter_map(|step| match step {
            Step::InstallBridge { bridge, point } => Some((bridge, *point)),
            _ => None,
        })
        .collect();

    assert_eq!(bridges.len(), 2);
    assert_eq!(bridges[0].1, InjectionPoint::BeforeNavigation);
    assert_eq!(bridges[1].1, InjectionPoint::AfterLoad);
    assert_eq!(bridges[0].0, bridges[1].0);
    assert_eq!(
        bridges[0].0.handler_source().unwrap(),
        bridges[1].0.handler_source().unwrap()
    );
}

#[test]
fn custom_timings_reach_the_script() {
    let script = build(
        LoadingStateOptions {
            bridge: MockBridge::new(Duration::from_millis(3000)),
            settle: Duration::from_millis(750),
            ..Default::default()
        },
        PlaywrightConfig::default(),
    );

    assert!(script.contains("setTimeout(resolve, 3000)"));
    assert!(script.contains("await page.waitForTimeout(750);"));
}

#[test]
fn untrusted_text_is_quoted() {
    let script = build(
        LoadingStateOptions {
            url: "http://localhost:3000/?q='); process.exit(0); ('".to_string(),
            button: "Generate \"all\" configs".to_string(),
            ..Default::default()
        },
        PlaywrightConfig::default(),
    );

    assert!(script.contains(r#"await page.goto("http://localhost:3000/?q='); process.exit(0); ('");"#));
    assert!(script.contains(r#"{ name: "Generate \"all\" configs" }"#));
}

#[tokio::test]
async fn invalid_timings_fail_without_launching() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = RunnerConfig::default()
        .with_delays(Duration::from_millis(100), Duration::from_millis(500));
    config.scenario.screenshot = dir.path().join("shot.png");

    let report = VerificationRunner::new(config).run().await;

    match report.outcome {
        Outcome::Failed(reason) => assert!(reason.starts_with("Invalid configuration")),
        Outcome::Passed => panic!("expected invalid timings to fail"),
    }
    assert!(report.screenshot.is_none());
    assert!(!dir.path().join("shot.png").exists());
}

#[tokio::test]
async fn live_loading_state() {
    if std::env::var("UX_VERIFY_LIVE").as_deref() != Ok("1") {
        eprintln!("skipping live UX verification");
        return;
    }

    let dir = tempfile::tempdir().unwrap();
    let screenshot: PathBuf = dir.path().join("verification/ux_verification_refined.png");

    let mut config = RunnerConfig::default();
    config.scenario.screenshot = screenshot.clone();

    let report = VerificationRunner::new(config).run().await;

    assert_eq!(report.outcome, Outcome::Passed, "report: {:?}", report);
    assert_eq!(report.completed_steps.len(), 6);
    assert!(!report.ipc_messages.is_empty());
    assert!(report.browser_closed);
    assert!(screenshot.exists());
}
