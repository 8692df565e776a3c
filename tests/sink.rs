//! Supabase sink behavior: batch upsert shape, the zero-rows
//! short-circuit and API error mapping.

use dvsa_scout::model::{InstructorRecord, StorageError};
use dvsa_scout::storage::SupabaseStorage;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn row(title: &str) -> InstructorRecord {
    InstructorRecord {
        name: None,
        postcode: None,
        phone: None,
        website: None,
        source_url: "https://example.test/find?postcode=E1".into(),
        title: title.into(),
        fetched_at: "2025-01-31T14:02:07Z".into(),
    }
}

#[tokio::test]
async fn upsert_posts_batch_with_conflict_key_and_auth() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/instructors"))
        .and(query_param("on_conflict", "source_url"))
        .and(header("apikey", "secret"))
        .and(header("authorization", "Bearer secret"))
        .and(header("prefer", "resolution=merge-duplicates,return=minimal"))
        .and(body_string_contains("\"title\":\"Results\""))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let storage = SupabaseStorage::new(&server.uri(), "secret", "instructors").unwrap();
    storage
        .upsert_rows(&[row("Results")], "source_url")
        .await
        .unwrap();
}

#[tokio::test]
async fn insert_posts_without_conflict_param() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/instructors"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let storage = SupabaseStorage::new(&server.uri(), "secret", "instructors").unwrap();
    storage.insert_rows(&[row("Results")]).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].url.query().unwrap_or("").contains("on_conflict"));
}

#[tokio::test]
async fn empty_batch_never_calls_the_sink() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let storage = SupabaseStorage::new(&server.uri(), "secret", "instructors").unwrap();
    storage.upsert_rows(&[], "source_url").await.unwrap();
    storage.insert_rows(&[]).await.unwrap();
}

#[tokio::test]
async fn api_error_surfaces_with_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("permission denied"))
        .expect(1)
        .mount(&server)
        .await;

    let storage = SupabaseStorage::new(&server.uri(), "secret", "instructors").unwrap();
    let err = storage
        .upsert_rows(&[row("Results")], "source_url")
        .await
        .unwrap_err();
    match err {
        StorageError::Api { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "permission denied");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn optional_fields_serialize_as_null() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("\"name\":null"))
        .and(body_string_contains("\"phone\":null"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let storage = SupabaseStorage::new(&server.uri(), "secret", "instructors").unwrap();
    storage
        .upsert_rows(&[row("Results")], "source_url")
        .await
        .unwrap();
}
