use std::collections::HashSet;
use std::sync::Arc;

use folio::application::contact::ContactSubmission;
use folio::application::gateway::GatewayError;
use folio::application::portfolio::Portfolio;
use folio::infra::memory::{GatewayOp, MemoryGateway, MemoryLedger};
use metrics_util::debugging::DebuggingRecorder;
use serial_test::serial;
use time::Duration;

#[tokio::test]
#[serial]
async fn store_paths_emit_expected_metric_keys() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder
        .install()
        .expect("debug metrics recorder should install in this test process");

    let gateway = Arc::new(MemoryGateway::new());
    let portfolio = Portfolio::new(Arc::clone(&gateway) as _, None);

    // miss + fetch, then hit
    portfolio.posts.list().await.expect("cold list");
    portfolio.posts.list().await.expect("warm list");

    // shared fetch
    portfolio.projects.invalidate();
    let (first, second) = tokio::join!(portfolio.projects.list(), portfolio.projects.list());
    first.expect("first list");
    second.expect("second list");

    // failed fetch still records latency
    gateway.fail_next(GatewayOp::Select, GatewayError::transport("reset"));
    portfolio
        .messages
        .list()
        .await
        .expect_err("injected failure");

    // contact guards
    let contact = portfolio.contact(Arc::new(MemoryLedger::default()), Duration::seconds(60));
    contact
        .submit(ContactSubmission {
            name: "Bot".to_string(),
            email: "bot@example.com".to_string(),
            message: "spam".to_string(),
            honeypot: Some("filled".to_string()),
        })
        .await
        .expect("honeypot submission");

    let names: HashSet<String> = snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .map(|(composite_key, _, _, _)| composite_key.key().name().to_string())
        .collect();

    let expected = [
        "folio_store_cache_hit_total",
        "folio_store_cache_miss_total",
        "folio_store_fetch_total",
        "folio_store_fetch_shared_total",
        "folio_store_invalidation_total",
        "folio_store_fetch_ms",
        "folio_contact_rejected_total",
    ];

    for metric in expected {
        assert!(names.contains(metric), "missing metric: {metric}");
    }
}
