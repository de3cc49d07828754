use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, app_with, AppState, Credentials, Resource, ResourceStore};
use serde_json::Value;
use tower::ServiceExt;

// client_id:client_secret
const GOOD_AUTH: &str = "Basic Y2xpZW50X2lkOmNsaWVudF9zZWNyZXQ=";
// foo:bar
const BAD_AUTH: &str = "Basic Zm9vOmJhcg==";

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

fn json_request(method: &str, uri: &str, auth: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .header(http::header::AUTHORIZATION, auth)
        .body(body.to_string())
        .unwrap()
}

// --- read ---

#[tokio::test]
async fn list_all_returns_seeded_resources() {
    let resp = app().oneshot(get("/mock/resources/all")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body["code"], 100);
    assert_eq!(body["message"], "success");
    assert_eq!(body["detail"].as_array().map(Vec::len), Some(5));
}

#[tokio::test]
async fn list_ignores_unknown_query_params() {
    let resp = app()
        .oneshot(get("/mock/resources/all?client_id=cid&rnd=abcd1234"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn filter_by_name_fragment() {
    let resp = app().oneshot(get("/mock/resources?name=al")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body["detail"][0]["name"], "alpha");
    assert_eq!(body["detail"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn filter_without_match_returns_404() {
    let resp = app().oneshot(get("/mock/resources?name=zulu")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = body_json(resp).await;
    assert_eq!(body["code"], 101);
    assert_eq!(body["detail"], serde_json::json!({}));
}

#[tokio::test]
async fn get_by_id_returns_bare_resource() {
    let resp = app().oneshot(get("/mock/resources/1")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let item: Resource = body_json(resp).await;
    assert_eq!(item.name, "alpha");
    assert_eq!(item.description, "alpha is A");
}

#[tokio::test]
async fn get_missing_id_returns_404() {
    let resp = app().oneshot(get("/mock/resources/8")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = body_json(resp).await;
    assert_eq!(body["code"], 101);
    assert_eq!(body["message"], "not found");
}

// --- create ---

#[tokio::test]
async fn create_returns_201_and_stores() {
    let state = AppState::default();
    let app = app_with(state.clone());
    let resp = app
        .oneshot(json_request(
            "POST",
            "/mock/resources",
            GOOD_AUTH,
            r#"{"id":"6","name":"fox","description":"fox is F"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = body_json(resp).await;
    assert_eq!(body["message"], "created");
    assert_eq!(state.store.find("6").await.map(|r| r.name), Some("fox".into()));
}

#[tokio::test]
async fn create_duplicate_returns_409() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/mock/resources",
            GOOD_AUTH,
            r#"{"id":"1","name":"again","description":"again"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn create_missing_field_returns_422() {
    let resp = app()
        .oneshot(json_request("POST", "/mock/resources", GOOD_AUTH, r#"{"name":"fox"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = body_json(resp).await;
    assert!(body["detail"][0]["msg"].is_string());
    assert_eq!(body["detail"][0]["type"], "value_error.missing");
}

#[tokio::test]
async fn create_invalid_json_returns_422() {
    let resp = app()
        .oneshot(json_request("POST", "/mock/resources", GOOD_AUTH, "{not json"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// --- auth ---

#[tokio::test]
async fn mutating_routes_require_basic_auth() {
    for (method, uri) in [
        ("POST", "/mock/resources"),
        ("PUT", "/mock/resources/1"),
        ("DELETE", "/mock/resources/1"),
    ] {
        let resp = app()
            .oneshot(json_request(method, uri, BAD_AUTH, r#"{"name":"x"}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{method} {uri}");
        let body: Value = body_json(resp).await;
        assert_eq!(body["code"], 103);
    }
}

#[tokio::test]
async fn custom_credentials_are_enforced() {
    let state = AppState {
        store: ResourceStore::seeded(),
        credentials: Credentials::new("foo", "bar"),
    };
    let resp = app_with(state)
        .oneshot(json_request("DELETE", "/mock/resources/2", BAD_AUTH, ""))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

// --- update ---

#[tokio::test]
async fn update_changes_given_fields() {
    let resp = app()
        .oneshot(json_request(
            "PUT",
            "/mock/resources/2",
            GOOD_AUTH,
            r#"{"description":"bravo is b"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let item: Resource = body_json(resp).await;
    assert_eq!(item.name, "bravo");
    assert_eq!(item.description, "bravo is b");
}

#[tokio::test]
async fn update_missing_returns_404() {
    let resp = app()
        .oneshot(json_request("PUT", "/mock/resources/9", GOOD_AUTH, r#"{"name":"x"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- delete ---

#[tokio::test]
async fn delete_removes_resource() {
    let state = AppState::default();
    let resp = app_with(state.clone())
        .oneshot(json_request("DELETE", "/mock/resources/3", GOOD_AUTH, ""))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body["code"], 100);
    assert!(state.store.find("3").await.is_none());
}

#[tokio::test]
async fn delete_missing_returns_404_with_code_102() {
    let resp = app()
        .oneshot(json_request("DELETE", "/mock/resources/9", GOOD_AUTH, ""))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = body_json(resp).await;
    assert_eq!(body["code"], 102);
}

// --- routing ---

#[tokio::test]
async fn unknown_route_returns_404_without_body() {
    let resp = app().oneshot(get("/nope")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(body_bytes(resp).await.is_empty());
}

#[tokio::test]
async fn wrong_method_returns_405() {
    let resp = app()
        .oneshot(json_request("PATCH", "/mock/resources/1", GOOD_AUTH, "{}"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}
