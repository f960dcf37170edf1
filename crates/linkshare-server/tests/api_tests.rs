//! HTTP tests for the compiled endpoint tree
//!
//! Every request goes through the router produced by registration, so these
//! also cover template/param naming and verb dispatch end to end.

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use chrono::{Duration, Utc};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use linkshare_server::{build, Application, Config, Share, Store};

async fn app_with_store() -> (Application, Store) {
    let store = Store::in_memory().await.unwrap();
    let app = build(&Config::default(), store.clone()).unwrap();
    (app, store)
}

async fn send(router: &Router, request: Request<Body>) -> Response {
    router.clone().oneshot(request).await.unwrap()
}

async fn get(router: &Router, uri: &str) -> Response {
    send(router, Request::get(uri).body(Body::empty()).unwrap()).await
}

async fn post_form(router: &Router, uri: &str, body: String) -> Response {
    send(
        router,
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap(),
    )
    .await
}

async fn body_bytes(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

#[tokio::test]
async fn test_every_endpoint_file_is_registered() {
    let (app, _) = app_with_store().await;

    let mut ids = app.report.attached_ids();
    ids.sort();
    assert_eq!(
        ids,
        vec![
            "shares_details_get",
            "shares_list_get",
            "shares_new_post",
            "shares_share_id_details_get",
            "shares_share_id_download_get",
        ]
    );
    assert_eq!(app.report.rejected_count(), 0);
    assert_eq!(app.report.files, 5);

    let templates: Vec<&str> = app.routes.iter().map(|r| r.template.as_str()).collect();
    assert!(templates.contains(&"/api/shares/<share_id>/details"));
    assert!(templates.contains(&"/api/shares/<share_id>/download"));
}

#[tokio::test]
async fn test_custom_prefix() {
    let store = Store::in_memory().await.unwrap();
    let mut config = Config::default();
    config.routing.prefix = "v1".into();

    let app = build(&config, store).unwrap();

    assert!(app
        .routes
        .iter()
        .all(|r| r.template.starts_with("/v1/shares/")));
    assert_eq!(get(&app.router, "/v1/shares/list").await.status(), StatusCode::OK);
    assert_eq!(
        get(&app.router, "/api/shares/list").await.status(),
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_root_route() {
    let (app, _) = app_with_store().await;

    let response = get(&app.router, "/").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"<p>Hello, World!</p>");
}

#[tokio::test]
async fn test_empty_list() {
    let (app, _) = app_with_store().await;

    let response = get(&app.router, "/api/shares/list").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, serde_json::json!([]));
}

#[tokio::test]
async fn test_create_then_fetch_and_download() {
    let (app, _) = app_with_store().await;
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("notes.txt");
    std::fs::write(&file, b"shared contents").unwrap();

    let form = format!(
        "share_path={}",
        urlencoding::encode(&file.to_string_lossy())
    );
    let response = post_form(&app.router, "/api/shares/new", form).await;
    assert_eq!(response.status(), StatusCode::OK);
    let page = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(page.contains("Success"));

    let ids = body_json(get(&app.router, "/api/shares/list").await).await;
    let ids = ids.as_array().unwrap();
    assert_eq!(ids.len(), 1);
    let id = ids[0].as_str().unwrap().to_string();
    assert!(page.contains(&id));

    let details = body_json(get(&app.router, &format!("/api/shares/{}/details", id)).await).await;
    assert_eq!(details["id"], Value::String(id.clone()));
    let canonical = std::fs::canonicalize(&file).unwrap();
    assert_eq!(details["path"], Value::String(canonical.to_string_lossy().into_owned()));

    let all = body_json(get(&app.router, "/api/shares/details").await).await;
    assert_eq!(all.as_array().unwrap().len(), 1);

    let response = get(&app.router, &format!("/api/shares/{}/download", id)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment"));
    assert!(disposition.contains("notes.txt"));
    assert_eq!(body_bytes(response).await, b"shared contents");
}

#[tokio::test]
async fn test_json_body_is_accepted() {
    let (app, store) = app_with_store().await;
    let file = tempfile::NamedTempFile::new().unwrap();

    let body = serde_json::json!({ "share_path": file.path() }).to_string();
    let response = send(
        &app.router,
        Request::post("/api/shares/new")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(store.list_ids().await.unwrap().len(), 1);
}

#[rstest]
#[case::missing_field("")]
#[case::empty_field("share_path=")]
#[case::missing_file("share_path=%2Fdefinitely%2Fnot%2Fhere.txt")]
#[tokio::test]
async fn test_invalid_share_requests(#[case] form: &str) {
    let (app, store) = app_with_store().await;

    let response = post_form(&app.router, "/api/shares/new", form.to_string()).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(store.list_ids().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_directory_cannot_be_shared() {
    let (app, _) = app_with_store().await;
    let dir = tempfile::tempdir().unwrap();

    let form = format!(
        "share_path={}",
        urlencoding::encode(&dir.path().to_string_lossy())
    );
    let response = post_form(&app.router, "/api/shares/new", form).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[rstest]
#[case::details("details")]
#[case::download("download")]
#[tokio::test]
async fn test_malformed_and_unknown_ids(#[case] action: &str) {
    let (app, _) = app_with_store().await;

    let response = get(&app.router, &format!("/api/shares/not-a-uuid/{}", action)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = get(&app.router, &format!("/api/shares/{}/{}", Uuid::new_v4(), action)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_expired_share_is_gone() {
    let (app, store) = app_with_store().await;
    let file = tempfile::NamedTempFile::new().unwrap();
    let share = Share::new(file.path(), None, Some(Utc::now() - Duration::minutes(1)));
    store.insert(&share).await.unwrap();

    let response = get(&app.router, &format!("/api/shares/{}/download", share.id)).await;
    assert_eq!(response.status(), StatusCode::GONE);

    // Metadata stays visible
    let response = get(&app.router, &format!("/api/shares/{}/details", share.id)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_verbs_are_not_interchangeable() {
    let (app, _) = app_with_store().await;

    let response = get(&app.router, "/api/shares/new").await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

    let response = post_form(&app.router, "/api/shares/list", String::new()).await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
