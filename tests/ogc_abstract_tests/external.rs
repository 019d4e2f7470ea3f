//! Full suite against an external server
//!
//! ```bash
//! TEST_BASE_URL=https://maps.example.org/ogcapi cargo test --test ogc_tests -- --ignored
//! ```

use crate::common::{init_logging, suite_for};
use mapsprobe::config::Config;

#[tokio::test]
#[ignore]
async fn test_external_server() {
    init_logging();
    let base_url = std::env::var("TEST_BASE_URL").expect("TEST_BASE_URL must be set for external tests");

    let report = suite_for(Config::for_iut(base_url)).run().await;
    println!("{}", report);

    assert!(!report.has_failures(), "{} abstract test(s) failed", report.failed());
}
