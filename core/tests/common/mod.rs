//! Models and helpers shared by the integration tests.

#![allow(dead_code)]

use resource_client::api_resource;
use serde::{Deserialize, Serialize};

/// A collection-level view of the demo resources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub name: Option<String>,
    pub description: Option<String>,
}

api_resource!(Resource, prefix = "/mock", name = "/resources");

/// A single demo resource, addressed by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceId {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
}

api_resource!(ResourceId, prefix = "/mock", name = "/resources/{id}");

pub fn fox() -> ResourceId {
    ResourceId {
        id: Some("6".into()),
        name: Some("fox".into()),
        description: Some("fox is F".into()),
    }
}

/// Start the mock server on a random port and return its base URL.
pub async fn spawn_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { mock_server::run(listener).await });
    format!("http://{addr}")
}
