//! OGC API Maps Background conformance tests
//!
//! http://www.opengis.net/spec/ogcapi-maps-1/1.0/conf/background

use crate::common::{FakeMapServer, ServerBehaviour, init_logging, suite_for};
use std::time::Duration;

use mapsprobe::config::{Config, StyleConfig, TimeoutConfig};
use mapsprobe::{AbstractTest, Suite};
use mapsprobe::error::FailureCause;
use mapsprobe::report::{CaseStatus, TestOutcome};

const BACKGROUND_TESTS: [AbstractTest; 5] = [
    AbstractTest::BgcolorDefinition,
    AbstractTest::TransparentDefinition,
    AbstractTest::VoidColorDefinition,
    AbstractTest::VoidTransparentDefinition,
    AbstractTest::BackgroundMapSuccess,
];

#[tokio::test]
async fn test_compliant_server_passes_everything() {
    init_logging();
    let server = FakeMapServer::start(ServerBehaviour::compliant()).await;

    let report = server.suite().run().await;

    for test in &report.tests {
        assert_eq!(test.outcome, TestOutcome::Passed, "{} did not pass: {:?}", test.id, test.outcome);
    }
    assert_eq!(report.passed(), AbstractTest::ALL.len());
    assert!(!report.has_failures());
}

#[tokio::test]
async fn test_case_counts() {
    init_logging();
    let server = FakeMapServer::start(ServerBehaviour::compliant()).await;
    let report = server.suite().run_tests(&BACKGROUND_TESTS).await;

    let cases = |id: &str| report.test(id).map(|t| t.cases.len()).unwrap_or_default();
    // hex, six W3C names, default white
    assert_eq!(cases("/conf/background/bgcolor-definition"), 8);
    assert_eq!(cases("/conf/background/transparent-definition"), 6);
    assert_eq!(cases("/conf/background/void-color-definition"), 3);
    assert_eq!(cases("/conf/background/void-transparent-definition"), 8);
    assert_eq!(cases("/conf/background/map-success"), 13);
}

#[tokio::test]
async fn test_skipped_without_background_conformance() {
    init_logging();
    let server = FakeMapServer::start(ServerBehaviour::compliant().without_background_conformance()).await;

    let report = server.suite().run().await;

    for test in BACKGROUND_TESTS {
        let result = report.test(test.id()).expect("test missing from report");
        match &result.outcome {
            TestOutcome::Skipped { reason } => assert!(reason.contains("conf/background"), "{}", reason),
            other => panic!("{} should be skipped, got {:?}", test, other),
        }
        assert!(result.cases.is_empty());
    }
    assert_eq!(report.skipped(), BACKGROUND_TESTS.len());
    assert!(!report.has_failures());
}

#[tokio::test]
async fn test_skipped_without_map_resource() {
    init_logging();
    let server = FakeMapServer::start(ServerBehaviour::compliant().without_map_links()).await;

    let report = server.suite().run_tests(&BACKGROUND_TESTS).await;

    assert_eq!(report.skipped(), BACKGROUND_TESTS.len());
    for test in &report.tests {
        let TestOutcome::Skipped { reason } = &test.outcome else {
            panic!("{} should be skipped", test.id);
        };
        assert!(reason.contains("No map resources"), "{}", reason);
    }
}

/// Void-transparent definition skips as a whole; map-success records its four
/// void cases as skipped and passes on the rest.
async fn assert_void_params_gated(suite: &Suite) {
    let report = suite.run_test(AbstractTest::VoidTransparentDefinition).await;
    match &report.outcome {
        TestOutcome::Skipped { reason } => assert!(reason.contains("void-transparent"), "{}", reason),
        other => panic!("expected skip, got {:?}", other),
    }
    assert!(report.cases.is_empty());

    // The matrix still runs; void cases are recorded as skipped, not dropped
    let report = suite.run_test(AbstractTest::BackgroundMapSuccess).await;
    assert_eq!(report.outcome, TestOutcome::Passed);
    assert_eq!(report.cases.len(), 13);
    let skipped: Vec<_> = report
        .cases
        .iter()
        .filter(|c| matches!(c.status, CaseStatus::Skipped { .. }))
        .collect();
    assert_eq!(skipped.len(), 4);
    assert!(skipped.iter().all(|c| c.url.is_none()));
}

#[tokio::test]
async fn test_unsupported_void_parameters_are_gated() {
    init_logging();
    let server = FakeMapServer::start(ServerBehaviour::compliant().rejecting_void_params()).await;
    let suite = server.suite();

    assert_void_params_gated(&suite).await;

    // void-color-definition is not gated, so a 400 is a failure
    let report = suite.run_test(AbstractTest::VoidColorDefinition).await;
    assert!(
        matches!(report.outcome, TestOutcome::Failed { cause: FailureCause::Status, .. }),
        "{:?}",
        report.outcome
    );
}

#[tokio::test]
async fn test_not_implemented_void_parameters_are_gated() {
    init_logging();
    let server = FakeMapServer::start(ServerBehaviour::compliant().not_implementing_void_params()).await;

    assert_void_params_gated(&server.suite()).await;
}

#[tokio::test]
async fn test_stalled_precheck_counts_as_unsupported() {
    init_logging();
    let server =
        FakeMapServer::start(ServerBehaviour::compliant().stalling_void_params(Duration::from_secs(3))).await;

    let config = Config {
        timeouts: TimeoutConfig {
            precheck_read_secs: 1,
            ..TimeoutConfig::default()
        },
        ..server.config()
    };

    assert_void_params_gated(&suite_for(config)).await;
}

#[tokio::test]
async fn test_failure_names_case_and_check() {
    init_logging();
    let server = FakeMapServer::start(ServerBehaviour::compliant().ignoring_bgcolor()).await;

    let report = server.suite().run_test(AbstractTest::BackgroundMapSuccess).await;

    let TestOutcome::Failed { cause, reason } = &report.outcome else {
        panic!("expected failure, got {:?}", report.outcome);
    };
    assert_eq!(*cause, FailureCause::Assertion);
    assert!(reason.contains("transparent=(absent), bgcolor=CC00CC"), "{}", reason);
    assert!(reason.contains("[bgcolor=CC00CC]"), "{}", reason);
    assert!(reason.contains("background alpha mismatch: expected 255"), "{}", reason);
    assert!(reason.contains("1 earlier case(s) passed"), "{}", reason);

    // Prior case kept for diagnostics, nothing recorded after the failure
    assert_eq!(report.cases.len(), 2);
    assert_eq!(report.cases[0].status, CaseStatus::Passed);
    let failed = report.failed_case().expect("failed case recorded");
    assert!(failed.url.as_deref().unwrap_or_default().contains("bgcolor=CC00CC"));
}

#[tokio::test]
async fn test_undecodable_body_is_a_decode_failure() {
    init_logging();
    let server = FakeMapServer::start(ServerBehaviour::compliant().with_garbage_body()).await;

    let report = server.suite().run_test(AbstractTest::TransparentDefinition).await;

    assert!(
        matches!(report.outcome, TestOutcome::Failed { cause: FailureCause::Decode, .. }),
        "{:?}",
        report.outcome
    );
}

#[tokio::test]
async fn test_style_background_takes_priority() {
    init_logging();
    let server = FakeMapServer::start(ServerBehaviour::compliant().with_style_background("#AADDCC")).await;

    let report = server.suite().run_test(AbstractTest::BgcolorDefinition).await;

    assert_eq!(report.outcome, TestOutcome::Passed);
    let last = report.cases.last().expect("cases recorded");
    assert_eq!(last.label, "style 'night' background");
    assert_eq!(last.query, "transparent=false&style=night");
}

#[tokio::test]
async fn test_style_background_in_css_notation() {
    init_logging();

    for background in ["rgb(170, 221, 204)", "rgba(170, 221, 204, 1)", "#adc", "hsl(160, 44%, 77%)"] {
        let server = FakeMapServer::start(ServerBehaviour::compliant().with_style_background(background)).await;
        let report = server.suite().run_test(AbstractTest::BgcolorDefinition).await;

        assert_eq!(report.outcome, TestOutcome::Passed, "{}", background);
        assert_eq!(
            report.cases.last().map(|c| c.label.as_str()),
            Some("style 'night' background"),
            "{}",
            background
        );
    }
}

#[tokio::test]
async fn test_configured_style() {
    init_logging();
    let server = FakeMapServer::start(ServerBehaviour::compliant().with_style_background("teal")).await;

    let config = Config {
        style: StyleConfig {
            id: Some("night".to_string()),
            background: Some("Teal".to_string()),
            auto_discover: false,
        },
        ..server.config()
    };
    let report = suite_for(config).run_test(AbstractTest::BgcolorDefinition).await;

    assert_eq!(report.outcome, TestOutcome::Passed);
    assert_eq!(report.cases.last().map(|c| c.label.as_str()), Some("style 'night' background"));
}

#[tokio::test]
async fn test_unresolvable_style_background_falls_back_to_white() {
    init_logging();
    let server = FakeMapServer::start(ServerBehaviour::compliant().with_style_background("notacolor")).await;

    let report = server.suite().run_test(AbstractTest::BgcolorDefinition).await;

    assert_eq!(report.outcome, TestOutcome::Passed);
    assert_eq!(
        report.cases.last().map(|c| c.label.as_str()),
        Some("default white background")
    );
}

#[tokio::test]
async fn test_style_discovery_disabled() {
    init_logging();
    let server = FakeMapServer::start(ServerBehaviour::compliant().with_style_background("#AADDCC")).await;

    let config = Config {
        style: StyleConfig {
            auto_discover: false,
            ..StyleConfig::default()
        },
        ..server.config()
    };
    let report = suite_for(config).run_test(AbstractTest::BgcolorDefinition).await;

    assert_eq!(report.outcome, TestOutcome::Passed);
    assert_eq!(
        report.cases.last().map(|c| c.label.as_str()),
        Some("default white background")
    );
}

#[tokio::test]
async fn test_report_serializes() {
    init_logging();
    let server = FakeMapServer::start(ServerBehaviour::compliant().ignoring_bgcolor()).await;

    let report = server.suite().run_tests(&[AbstractTest::TransparentDefinition]).await;
    let json = serde_json::to_value(&report).expect("report serializes");

    assert_eq!(json["tests"][0]["id"], "/conf/background/transparent-definition");
    assert_eq!(json["tests"][0]["status"], "failed");
    assert!(report.to_string().contains("FAIL /conf/background/transparent-definition"));
}
