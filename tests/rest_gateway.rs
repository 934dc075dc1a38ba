//! Stores over the PostgREST gateway and storage client against a mock
//! backend.

use std::sync::Arc;

use bytes::Bytes;
use folio::application::assets::{AssetUploader, UploadError};
use folio::application::portfolio::Portfolio;
use folio::application::storage::StorageError;
use folio::cache::StoreError;
use folio::domain::posts::{PostDraft, PostPatch};
use folio::domain::types::ProjectStatus;
use folio::infra::backend::BackendClient;
use folio::infra::rest::RestGateway;
use folio::infra::storage::RestObjectStorage;
use httpmock::MockServer;

fn backend(server: &MockServer) -> BackendClient {
    BackendClient::new(&server.base_url(), "anon-key", Some("admin-token".to_string()))
        .expect("backend client")
}

fn portfolio(server: &MockServer) -> Portfolio {
    let backend = backend(server);
    let storage = Arc::new(RestObjectStorage::new(backend.clone()));
    Portfolio::new(
        Arc::new(RestGateway::new(backend)),
        Some(AssetUploader::new(storage, "images")),
    )
}

const POST_ROW: &str = r#"{
    "id": 7,
    "created_at": "2024-05-01T10:00:00Z",
    "title": "Hola",
    "content": "Primer post",
    "slug": "hola",
    "published": false,
    "excerpt": null,
    "image_url": null,
    "category": null,
    "category_color": null,
    "tags": null
}"#;

#[tokio::test]
async fn list_sends_order_and_credentials() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("GET")
            .path("/rest/v1/projects")
            .query_param("select", "*")
            .query_param("order", "created_at.desc")
            .header("apikey", "anon-key")
            .header("authorization", "Bearer admin-token");
        then.status(200)
            .header("content-type", "application/json")
            .body(
                r#"[{
                    "id": "5b0d2c3e-8d7a-4d59-9f0e-2f5b7b0f4a11",
                    "created_at": "2024-05-01T10:00:00Z",
                    "updated_at": "2024-05-02T10:00:00Z",
                    "name": "Folio",
                    "tags": ["rust"],
                    "stars": 3,
                    "forks": null,
                    "is_ai": false,
                    "status": "Featured"
                }]"#,
            );
    });

    let portfolio = portfolio(&server);
    let projects = portfolio.projects.list().await.expect("list");
    let again = portfolio.projects.list().await.expect("cached list");

    mock.assert_calls(1);
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0].name, "Folio");
    assert_eq!(projects[0].forks, 0);
    assert_eq!(projects[0].status, Some(ProjectStatus::Featured));
    assert!(Arc::ptr_eq(&projects, &again));
}

#[tokio::test]
async fn create_asks_for_the_stored_representation() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("POST")
            .path("/rest/v1/posts")
            .header("prefer", "return=representation")
            .json_body_includes(r#"{"title":"Hola","slug":"hola","published":false}"#);
        then.status(201)
            .header("content-type", "application/json")
            .body(format!("[{POST_ROW}]"));
    });

    let created = portfolio(&server)
        .posts
        .create(PostDraft {
            title: "  Hola ".to_string(),
            content: "Primer post".to_string(),
            slug: String::new(),
            published: false,
            excerpt: None,
            image_url: None,
            category: None,
            category_color: None,
            tags: Vec::new(),
        })
        .await
        .expect("create");

    mock.assert();
    assert_eq!(created.id, 7);
    assert!(created.tags.is_empty());
}

#[tokio::test]
async fn unique_violation_surfaces_as_conflict() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("POST").path("/rest/v1/posts");
        then.status(409)
            .header("content-type", "application/json")
            .body(
                r#"{"code":"23505","message":"duplicate key value violates unique constraint \"posts_slug_key\"","details":"Key (slug)=(hola) already exists.","hint":null}"#,
            );
    });

    let err = portfolio(&server)
        .posts
        .create(PostDraft {
            title: "Hola".to_string(),
            content: String::new(),
            slug: String::new(),
            published: false,
            excerpt: None,
            image_url: None,
            category: None,
            category_color: None,
            tags: Vec::new(),
        })
        .await
        .expect_err("conflict");

    assert!(err.is_conflict(), "unexpected error: {err:?}");
}

#[tokio::test]
async fn update_matching_no_row_is_not_found() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("PATCH")
            .path("/rest/v1/posts")
            .query_param("id", "eq.42")
            .json_body_includes(r#"{"published":true}"#);
        then.status(200)
            .header("content-type", "application/json")
            .body("[]");
    });

    let err = portfolio(&server)
        .posts
        .update(
            &42,
            PostPatch {
                published: Some(true),
                ..PostPatch::default()
            },
        )
        .await
        .expect_err("missing row");

    mock.assert();
    assert!(err.is_not_found(), "unexpected error: {err:?}");
}

#[tokio::test]
async fn get_by_slug_filters_on_the_backend() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("GET")
            .path("/rest/v1/posts")
            .query_param("slug", "eq.hola")
            .query_param("limit", "1");
        then.status(200)
            .header("content-type", "application/json")
            .body(format!("[{POST_ROW}]"));
    });

    let post = portfolio(&server)
        .posts
        .get_by_slug("hola")
        .await
        .expect("post");

    mock.assert();
    assert_eq!(post.title, "Hola");
}

#[tokio::test]
async fn upload_posts_bytes_without_upsert() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("POST")
            .path_prefix("/storage/v1/object/images/posts/")
            .path_suffix(".png")
            .header("x-upsert", "false")
            .header("content-type", "image/png")
            .body("PNGDATA");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"Key":"images/posts/cover.png"}"#);
    });

    let url = portfolio(&server)
        .posts
        .upload_asset("cover.png", Bytes::from_static(b"PNGDATA"))
        .await
        .expect("upload");

    mock.assert();
    let public_prefix = format!(
        "{}/storage/v1/object/public/images/posts/",
        server.base_url()
    );
    assert!(
        url.as_str().starts_with(&public_prefix),
        "unexpected url: {url}"
    );
}

#[tokio::test]
async fn storage_rejection_keeps_backend_message() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("POST");
        then.status(400)
            .header("content-type", "application/json")
            .body(r#"{"statusCode":"409","error":"Duplicate","message":"The resource already exists"}"#);
    });

    let err = portfolio(&server)
        .projects
        .upload_asset("logo.svg", Bytes::from_static(b"<svg/>"))
        .await
        .expect_err("rejected");

    match err {
        StoreError::Upload(UploadError::Storage(StorageError::Rejected { message, .. })) => {
            assert_eq!(message, "The resource already exists");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
