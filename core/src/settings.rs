//! Client settings read from the environment.

/// Defaults a [`ClientBuilder`](crate::ClientBuilder) falls back to.
///
/// | field               | variable                |
/// |---------------------|-------------------------|
/// | `resource_endpoint` | `RESOURCE_ENDPOINT`     |
/// | `client_id`         | `SERVICE_CLIENT_ID`     |
/// | `client_secret`     | `SERVICE_CLIENT_SECRET` |
/// | `http_backend`      | `HTTP_BACKEND`          |
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientSettings {
    pub resource_endpoint: Option<String>,
    pub client_id: String,
    pub client_secret: String,
    pub http_backend: Option<String>,
}

impl ClientSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup. Blank values count as absent.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        Self {
            resource_endpoint: read("RESOURCE_ENDPOINT"),
            client_id: read("SERVICE_CLIENT_ID").unwrap_or_default(),
            client_secret: read("SERVICE_CLIENT_SECRET").unwrap_or_default(),
            http_backend: read("HTTP_BACKEND"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn reads_every_variable() {
        let env: HashMap<&str, &str> = [
            ("RESOURCE_ENDPOINT", "http://localhost:8000"),
            ("SERVICE_CLIENT_ID", "client_id"),
            ("SERVICE_CLIENT_SECRET", "client_secret"),
            ("HTTP_BACKEND", "requests"),
        ]
        .into_iter()
        .collect();
        let settings = ClientSettings::from_lookup(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(settings.resource_endpoint.as_deref(), Some("http://localhost:8000"));
        assert_eq!(settings.client_id, "client_id");
        assert_eq!(settings.client_secret, "client_secret");
        assert_eq!(settings.http_backend.as_deref(), Some("requests"));
    }

    #[test]
    fn missing_and_blank_values_are_absent() {
        let settings = ClientSettings::from_lookup(|key| match key {
            "RESOURCE_ENDPOINT" => Some("   ".to_string()),
            _ => None,
        });
        assert_eq!(settings, ClientSettings::default());
    }
}
