//! End-to-end background scenarios against the fake server

use crate::common::{DATA_RGB, FakeMapServer, ServerBehaviour, init_logging};
use mapsprobe::color::Rgb24;
use mapsprobe::inspect::{MapImage, SamplingMode};
use mapsprobe::matrix::{Check, ColorParam, Extent, ParameterCase};

async fn fetch_image(url: url::Url) -> MapImage {
    let body = reqwest::get(url)
        .await
        .expect("map request failed")
        .bytes()
        .await
        .expect("map body unreadable");
    MapImage::decode(&body).expect("map is not an image")
}

#[tokio::test]
async fn test_scenario_default_is_transparent() {
    init_logging();
    let server = FakeMapServer::start(ServerBehaviour::compliant()).await;
    let suite = server.suite();
    let templates = suite.discover_templates().await.expect("map resource discovered");

    let case = ParameterCase::new("no parameters", Extent::Valid).with_checks(&[Check::BACKGROUND_ALPHA]);
    suite
        .evaluate_case(&templates.valid, &case)
        .await
        .expect("scenario 1 holds");

    let image = fetch_image(templates.valid.url()).await;
    assert!(image.sample(SamplingMode::Corners).iter().all(|s| s.alpha == 0));
    // Data in the middle stays opaque
    let center = image.sample_at(image.width() / 2, image.height() / 2);
    assert_eq!((center.rgb, center.alpha), (DATA_RGB, 255));
}

#[tokio::test]
async fn test_scenario_bgcolor_is_opaque() {
    init_logging();
    let server = FakeMapServer::start(ServerBehaviour::compliant()).await;
    let suite = server.suite();
    let templates = suite.discover_templates().await.expect("map resource discovered");

    let case = ParameterCase::new("bgcolor only", Extent::Valid)
        .with_bgcolor(Some(ColorParam::hex("CC00CC")))
        .with_checks(&[Check::BACKGROUND_RGB, Check::BACKGROUND_ALPHA]);
    suite
        .evaluate_case(&templates.valid, &case)
        .await
        .expect("scenario 2 holds");
}

#[tokio::test]
async fn test_scenario_transparent_wins_over_bgcolor() {
    init_logging();
    let server = FakeMapServer::start(ServerBehaviour::compliant()).await;
    let suite = server.suite();
    let templates = suite.discover_templates().await.expect("map resource discovered");

    let case = ParameterCase::new("transparent with bgcolor", Extent::Valid)
        .with_transparent(Some(true))
        .with_bgcolor(Some(ColorParam::hex("FF00FF")))
        .with_checks(&[Check::BACKGROUND_ALPHA]);
    suite
        .evaluate_case(&templates.valid, &case)
        .await
        .expect("scenario 3 holds");
}

#[tokio::test]
async fn test_scenario_void_color() {
    init_logging();
    let server = FakeMapServer::start(ServerBehaviour::compliant()).await;
    let suite = server.suite();
    let templates = suite.discover_templates().await.expect("map resource discovered");

    let case = ParameterCase::new("void-color only", Extent::Void)
        .with_void_color(Some(ColorParam::hex("00FF00")))
        .with_checks(&[Check::VOID_RGB]);
    suite
        .evaluate_case(&templates.void, &case)
        .await
        .expect("scenario 4 holds");

    let image = fetch_image(templates.void.url_with(&case.query_pairs())).await;
    assert!(
        image
            .sample(SamplingMode::Corners)
            .iter()
            .any(|s| s.rgb == Rgb24::new(0x00FF00))
    );
}

#[tokio::test]
async fn test_scenario_void_defaults_to_bgcolor() {
    init_logging();
    let server = FakeMapServer::start(ServerBehaviour::compliant()).await;
    let suite = server.suite();
    let templates = suite.discover_templates().await.expect("map resource discovered");

    let case = ParameterCase::new("bgcolor, no void-color", Extent::Void)
        .with_bgcolor(Some(ColorParam::hex("CC00CC")))
        .with_checks(&[Check::VOID_RGB, Check::VOID_ALPHA]);
    suite
        .evaluate_case(&templates.void, &case)
        .await
        .expect("scenario 5 holds");
}

#[tokio::test]
async fn test_wrong_color_fails_with_diagnostics() {
    init_logging();
    let server = FakeMapServer::start(ServerBehaviour::compliant().ignoring_bgcolor()).await;
    let suite = server.suite();
    let templates = suite.discover_templates().await.expect("map resource discovered");

    let case = ParameterCase::new("opaque purple", Extent::Valid)
        .with_transparent(Some(false))
        .with_bgcolor(Some(ColorParam::hex("CC00CC")))
        .with_checks(&[Check::BACKGROUND_RGB]);
    let failure = suite
        .evaluate_case(&templates.valid, &case)
        .await
        .expect_err("server ignores bgcolor");

    assert!(failure.message.contains("background RGB mismatch"), "{}", failure.message);
    assert!(failure.message.contains("#CC00CC"), "{}", failure.message);
    assert!(failure.message.contains("#FFFFFF"), "{}", failure.message);
}

#[tokio::test]
async fn test_evaluation_is_idempotent() {
    init_logging();
    let server = FakeMapServer::start(ServerBehaviour::compliant().ignoring_bgcolor()).await;
    let suite = server.suite();
    let templates = suite.discover_templates().await.expect("map resource discovered");

    let cases = [
        ParameterCase::new("passing", Extent::Valid).with_checks(&[Check::BACKGROUND_ALPHA]),
        ParameterCase::new("failing", Extent::Valid)
            .with_bgcolor(Some(ColorParam::named("NaVy")))
            .with_checks(&[Check::BACKGROUND_ALPHA, Check::BACKGROUND_RGB]),
    ];

    for case in &cases {
        let first = suite.evaluate_case(&templates.valid, case).await;
        let second = suite.evaluate_case(&templates.valid, case).await;
        assert_eq!(first, second, "verdict changed for {}", case.label);
    }
}

#[tokio::test]
async fn test_unresolvable_case_color_is_a_suite_defect() {
    init_logging();
    let server = FakeMapServer::start(ServerBehaviour::compliant()).await;
    let suite = server.suite();
    let templates = suite.discover_templates().await.expect("map resource discovered");

    let case = ParameterCase::new("bad literal", Extent::Valid)
        .with_bgcolor(Some(ColorParam::named("notacolor")))
        .with_checks(&[Check::BACKGROUND_RGB]);
    let failure = suite
        .evaluate_case(&templates.valid, &case)
        .await
        .expect_err("color literal cannot resolve");

    assert_eq!(failure.cause, mapsprobe::error::FailureCause::ColorResolution);
}
