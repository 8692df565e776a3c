//! End-to-end: postcode in, sink row out, through the real runner with a
//! direct fetcher against mock target and sink servers.

use std::time::Duration;

use dvsa_scout::config::{AppConfig, TransportConfig};
use dvsa_scout::fetch::{DirectFetcher, RetryPolicy};
use dvsa_scout::parser::DvsaParser;
use dvsa_scout::runner::run_real;
use dvsa_scout::storage::SupabaseStorage;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(target: &MockServer, sink: &MockServer, postcodes: Vec<String>) -> AppConfig {
    AppConfig {
        supabase_url: sink.uri(),
        supabase_key: "secret".into(),
        table_name: "instructors".into(),
        upsert_on: "source_url".into(),
        test_mode: false,
        postcodes,
        request_delay: Duration::from_millis(0),
        search_url_template: format!(
            "{}/DSAFindNearestWebApp/findNearest.form?postcode={{postcode}}&lang=en",
            target.uri()
        ),
        cooldown: Duration::from_millis(1),
        cooldown_retries: 1,
        transport: TransportConfig::Direct,
    }
}

fn fast_fetcher() -> DirectFetcher {
    DirectFetcher::new(RetryPolicy {
        backoff_base: Duration::from_millis(1),
        cooldown: Duration::from_millis(1),
        ..RetryPolicy::default()
    })
    .unwrap()
}

#[tokio::test]
async fn one_key_with_no_selector_hits_writes_one_fallback_row() {
    let target = MockServer::start().await;
    let sink = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/DSAFindNearestWebApp/findNearest.form"))
        .and(query_param("postcode", "E1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<html><head><title>Results</title></head><body><p>no hits</p></body></html>",
        ))
        .expect(1)
        .mount(&target)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/instructors"))
        .and(query_param("on_conflict", "source_url"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&sink)
        .await;

    let cfg = test_config(&target, &sink, vec!["E1".into()]);
    let storage = SupabaseStorage::new(&cfg.supabase_url, &cfg.supabase_key, &cfg.table_name).unwrap();
    run_real(&cfg, &fast_fetcher(), &DvsaParser::new(), &storage).await;

    let posts = sink.received_requests().await.unwrap();
    assert_eq!(posts.len(), 1);
    let body: serde_json::Value = serde_json::from_slice(&posts[0].body).unwrap();
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["title"], "Results");
    assert_eq!(
        rows[0]["source_url"],
        format!(
            "{}/DSAFindNearestWebApp/findNearest.form?postcode=E1&lang=en",
            target.uri()
        )
    );
    assert!(rows[0]["name"].is_null());
    assert!(rows[0]["fetched_at"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn blocked_key_is_skipped_and_the_run_continues() {
    let target = MockServer::start().await;
    let sink = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("postcode", "B1"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&target)
        .await;
    Mock::given(method("GET"))
        .and(query_param("postcode", "E1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<html><head><title>Results</title></head><body></body></html>",
        ))
        .expect(1)
        .mount(&target)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&sink)
        .await;

    let cfg = test_config(&target, &sink, vec!["B1".into(), "E1".into()]);
    let storage = SupabaseStorage::new(&cfg.supabase_url, &cfg.supabase_key, &cfg.table_name).unwrap();
    run_real(&cfg, &fast_fetcher(), &DvsaParser::new(), &storage).await;

    let posts = sink.received_requests().await.unwrap();
    assert_eq!(posts.len(), 1);
    let body: serde_json::Value = serde_json::from_slice(&posts[0].body).unwrap();
    let rows = body.as_array().unwrap();
    // Only the unblocked key contributes a row.
    assert_eq!(rows.len(), 1);
    assert!(
        rows[0]["source_url"]
            .as_str()
            .unwrap()
            .contains("postcode=E1")
    );
}

#[tokio::test]
async fn every_key_failing_still_skips_the_sink_call() {
    let target = MockServer::start().await;
    let sink = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&target)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&sink)
        .await;

    let cfg = test_config(&target, &sink, vec!["E1".into(), "M1".into()]);
    let storage = SupabaseStorage::new(&cfg.supabase_url, &cfg.supabase_key, &cfg.table_name).unwrap();
    run_real(&cfg, &fast_fetcher(), &DvsaParser::new(), &storage).await;
}
