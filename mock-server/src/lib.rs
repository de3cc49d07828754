//! In-memory resource service used as the remote end in client tests.
//!
//! # Design
//! Routes live under `/mock`. Reads are open; `POST`, `PUT` and `DELETE`
//! require HTTP basic auth matching the configured [`Credentials`]. Errors
//! are JSON bodies shaped `{code, message, detail}`, and body validation
//! failures answer 422 with `{detail: [{msg, type}]}`.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, Request, State},
    http::{header::AUTHORIZATION, HeaderMap, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};

const CODE_OK: u32 = 100;
const CODE_NOT_FOUND: u32 = 101;
const CODE_DELETE_MISSING: u32 = 102;
const CODE_UNAUTHORIZED: u32 = 103;
const CODE_CONFLICT: u32 = 104;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: String,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct ResourcePatch {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub name: Option<String>,
}

/// Shared, explicitly owned resource collection.
#[derive(Clone, Debug, Default)]
pub struct ResourceStore {
    items: Arc<RwLock<Vec<Resource>>>,
}

impl ResourceStore {
    pub fn new(items: Vec<Resource>) -> Self {
        Self {
            items: Arc::new(RwLock::new(items)),
        }
    }

    /// The five demo resources, `alpha` (id 1) through `echo` (id 5).
    pub fn seeded() -> Self {
        let items = ["alpha", "bravo", "charlie", "delta", "echo"]
            .iter()
            .enumerate()
            .map(|(index, name)| Resource {
                id: (index + 1).to_string(),
                name: name.to_string(),
                description: format!("{name} is {}", name[..1].to_uppercase()),
            })
            .collect();
        Self::new(items)
    }

    pub async fn all(&self) -> Vec<Resource> {
        self.items.read().await.clone()
    }

    pub async fn find(&self, id: &str) -> Option<Resource> {
        self.items.read().await.iter().find(|r| r.id == id).cloned()
    }

    /// Resources whose name contains `fragment`.
    pub async fn search(&self, fragment: &str) -> Vec<Resource> {
        let items = self.items.read().await;
        items.iter().filter(|r| r.name.contains(fragment)).cloned().collect()
    }

    /// Returns `false` when the id is already taken.
    pub async fn insert(&self, resource: Resource) -> bool {
        let mut items = self.items.write().await;
        if items.iter().any(|r| r.id == resource.id) {
            return false;
        }
        items.push(resource);
        true
    }

    pub async fn update(&self, id: &str, patch: ResourcePatch) -> Option<Resource> {
        let mut items = self.items.write().await;
        let item = items.iter_mut().find(|r| r.id == id)?;
        if let Some(name) = patch.name {
            item.name = name;
        }
        if let Some(description) = patch.description {
            item.description = description;
        }
        Some(item.clone())
    }

    pub async fn remove(&self, id: &str) -> Option<Resource> {
        let mut items = self.items.write().await;
        let index = items.iter().position(|r| r.id == id)?;
        Some(items.remove(index))
    }
}

/// Basic-auth pair expected on mutating routes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// `MOCK_CLIENT_ID` / `MOCK_CLIENT_SECRET`, defaulting to
    /// `client_id` / `client_secret`.
    pub fn from_env() -> Self {
        let read = |key: &str, default: &str| std::env::var(key).unwrap_or_else(|_| default.to_string());
        Self::new(
            read("MOCK_CLIENT_ID", "client_id"),
            read("MOCK_CLIENT_SECRET", "client_secret"),
        )
    }

    fn accepts(&self, headers: &HeaderMap) -> bool {
        let Some(encoded) = headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Basic "))
        else {
            return false;
        };
        let Ok(decoded) = BASE64.decode(encoded.trim()) else {
            return false;
        };
        let Ok(pair) = String::from_utf8(decoded) else {
            return false;
        };
        pair.split_once(':') == Some((self.username.as_str(), self.password.as_str()))
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self::new("client_id", "client_secret")
    }
}

#[derive(Clone, Debug)]
pub struct AppState {
    pub store: ResourceStore,
    pub credentials: Credentials,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            store: ResourceStore::seeded(),
            credentials: Credentials::default(),
        }
    }
}

/// Router over a freshly seeded store with the default credentials.
pub fn app() -> Router {
    app_with(AppState::default())
}

pub fn app_with(state: AppState) -> Router {
    Router::new()
        .route("/mock/resources", get(list_resources).post(create_resource))
        .route("/mock/resources/all", get(list_resources))
        .route(
            "/mock/resources/{id}",
            get(get_resource).put(update_resource).delete(delete_resource),
        )
        .layer(middleware::from_fn_with_state(state.clone(), require_basic_auth))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with(listener, AppState::default()).await
}

pub async fn run_with(listener: TcpListener, state: AppState) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "mock server listening");
    }
    axum::serve(listener, app_with(state)).await
}

fn message(status: StatusCode, code: u32, text: &str, detail: Value) -> Response {
    (
        status,
        Json(json!({"code": code, "message": text, "detail": detail})),
    )
        .into_response()
}

fn not_found(code: u32) -> Response {
    message(StatusCode::NOT_FOUND, code, "not found", json!({}))
}

fn validation_error(rejection: JsonRejection) -> Response {
    let kind = match &rejection {
        JsonRejection::JsonDataError(_) => "value_error.missing",
        JsonRejection::JsonSyntaxError(_) => "value_error.jsondecode",
        _ => "value_error",
    };
    debug!(error = %rejection.body_text(), "rejected request body");
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({"detail": [{"msg": rejection.body_text(), "type": kind}]})),
    )
        .into_response()
}

async fn require_basic_auth(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let guarded = [Method::POST, Method::PUT, Method::DELETE].contains(request.method());
    if guarded && !state.credentials.accepts(request.headers()) {
        debug!(method = %request.method(), uri = %request.uri(), "basic auth failed");
        return message(StatusCode::UNAUTHORIZED, CODE_UNAUTHORIZED, "unauthorized", json!({}));
    }
    next.run(request).await
}

async fn list_resources(State(state): State<AppState>, Query(query): Query<ListQuery>) -> Response {
    let items = match query.name.as_deref() {
        Some(fragment) => state.store.search(fragment).await,
        None => state.store.all().await,
    };
    if query.name.is_some() && items.is_empty() {
        return not_found(CODE_NOT_FOUND);
    }
    message(StatusCode::OK, CODE_OK, "success", json!(items))
}

async fn get_resource(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.store.find(&id).await {
        Some(item) => Json(item).into_response(),
        None => not_found(CODE_NOT_FOUND),
    }
}

async fn create_resource(
    State(state): State<AppState>,
    body: Result<Json<Resource>, JsonRejection>,
) -> Response {
    let Json(resource) = match body {
        Ok(body) => body,
        Err(rejection) => return validation_error(rejection),
    };
    if state.store.insert(resource).await {
        message(StatusCode::CREATED, CODE_OK, "created", json!({}))
    } else {
        message(StatusCode::CONFLICT, CODE_CONFLICT, "already exists", json!({}))
    }
}

async fn update_resource(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<ResourcePatch>, JsonRejection>,
) -> Response {
    let Json(patch) = match body {
        Ok(body) => body,
        Err(rejection) => return validation_error(rejection),
    };
    match state.store.update(&id, patch).await {
        Some(item) => Json(item).into_response(),
        None => not_found(CODE_NOT_FOUND),
    }
}

async fn delete_resource(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.store.remove(&id).await {
        Some(_) => message(StatusCode::OK, CODE_OK, "success", json!({})),
        None => not_found(CODE_DELETE_MISSING),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn store_is_seeded_with_five_resources() {
        let store = ResourceStore::seeded();
        let all = store.all().await;
        assert_eq!(all.len(), 5);
        assert_eq!(all[0].name, "alpha");
        assert_eq!(all[0].description, "alpha is A");
        assert_eq!(all[4].id, "5");
        assert_eq!(all[4].description, "echo is E");
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_ids() {
        let store = ResourceStore::seeded();
        let fox = Resource {
            id: "6".into(),
            name: "fox".into(),
            description: "fox is F".into(),
        };
        assert!(store.insert(fox.clone()).await);
        assert!(!store.insert(fox).await);
        assert_eq!(store.all().await.len(), 6);
    }

    #[tokio::test]
    async fn search_matches_name_fragments() {
        let store = ResourceStore::seeded();
        let found = store.search("al").await;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "alpha");
        assert!(store.search("zulu").await.is_empty());
    }

    #[tokio::test]
    async fn update_and_remove_missing_ids() {
        let store = ResourceStore::seeded();
        let patch = ResourcePatch {
            name: Some("x".into()),
            description: None,
        };
        assert!(store.update("9", patch).await.is_none());
        assert!(store.remove("9").await.is_none());
        assert_eq!(store.remove("1").await.map(|r| r.name), Some("alpha".to_string()));
    }

    #[test]
    fn credentials_check_basic_auth_header() {
        let credentials = Credentials::default();
        let mut headers = HeaderMap::new();
        assert!(!credentials.accepts(&headers));

        headers.insert(
            AUTHORIZATION,
            "Basic Y2xpZW50X2lkOmNsaWVudF9zZWNyZXQ=".parse().unwrap(),
        );
        assert!(credentials.accepts(&headers));

        headers.insert(AUTHORIZATION, "Basic Zm9vOmJhcg==".parse().unwrap());
        assert!(!credentials.accepts(&headers));
    }

    #[test]
    fn resource_requires_every_field() {
        let result: Result<Resource, _> = serde_json::from_str(r#"{"name":"fox"}"#);
        assert!(result.is_err());
    }
}
