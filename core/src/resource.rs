//! Resource descriptors: the path template bound to a resource model.
//!
//! # Design
//! A model declares its `prefix`, `name` and `suffix` once through
//! [`ApiResource`] (usually via [`api_resource!`](crate::api_resource)). The
//! client validates them into a [`ResourceDescriptor`] when it is built and
//! reads nothing from the model type afterwards. Each part may contain
//! `{placeholder}` tokens that are filled from the request parameters.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::BuildError;

/// Anything that can travel as a request body or be read from a response.
pub trait Model: Serialize + DeserializeOwned + Send + Sync + 'static {}

impl<T> Model for T where T: Serialize + DeserializeOwned + Send + Sync + 'static {}

/// A model with a remote resource path.
pub trait ApiResource: Model {
    const API_PREFIX: &'static str = "";
    const API_NAME: &'static str;
    const API_SUFFIX: &'static str = "";

    fn descriptor() -> Result<ResourceDescriptor, BuildError> {
        ResourceDescriptor::new(Self::API_PREFIX, Self::API_NAME, Self::API_SUFFIX)
    }
}

/// Attach a resource path to a model type.
///
/// ```
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Serialize, Deserialize)]
/// struct Item {
///     id: Option<String>,
/// }
///
/// resource_client::api_resource!(Item, prefix = "/mock", name = "/items/{id}");
///
/// use resource_client::ApiResource;
/// let descriptor = Item::descriptor().unwrap();
/// assert_eq!(descriptor.name(), "/items/{id}");
/// ```
#[macro_export]
macro_rules! api_resource {
    ($model:ty, prefix = $prefix:expr, name = $name:expr $(, suffix = $suffix:expr)? $(,)?) => {
        impl $crate::ApiResource for $model {
            const API_PREFIX: &'static str = $prefix;
            const API_NAME: &'static str = $name;
            $(const API_SUFFIX: &'static str = $suffix;)?
        }
    };
    ($model:ty, name = $name:expr $(, suffix = $suffix:expr)? $(,)?) => {
        impl $crate::ApiResource for $model {
            const API_NAME: &'static str = $name;
            $(const API_SUFFIX: &'static str = $suffix;)?
        }
    };
}

/// Validated path template of a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDescriptor {
    prefix: String,
    name: String,
    suffix: String,
}

impl ResourceDescriptor {
    pub fn new(prefix: &str, name: &str, suffix: &str) -> Result<Self, BuildError> {
        if name.trim().is_empty() {
            return Err(BuildError::BlankApiName);
        }
        for (part, value) in [("api_prefix", prefix), ("api_name", name), ("api_suffix", suffix)] {
            if value == "/" {
                return Err(invalid(format!("{part} can not be '/'")));
            }
            if value.ends_with('/') {
                return Err(invalid(format!("{part} must not end with '/'")));
            }
        }
        if !prefix.is_empty() && !prefix.starts_with('/') {
            return Err(invalid("api_prefix must start with '/'".to_string()));
        }
        Ok(Self {
            prefix: prefix.to_string(),
            name: name.to_string(),
            suffix: suffix.to_string(),
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }
}

fn invalid(reason: String) -> BuildError {
    BuildError::InvalidDescriptor(reason)
}

/// Replace every `{key}` in `template` with `lookup(key)`.
pub(crate) fn fill_placeholders<'a, F>(template: &str, lookup: F) -> Result<String, BuildError>
where
    F: Fn(&str) -> Option<&'a str>,
{
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let close = after
            .find('}')
            .ok_or_else(|| BuildError::UnterminatedPlaceholder(template.to_string()))?;
        let key = &after[..close];
        let value =
            lookup(key).ok_or_else(|| BuildError::MissingPlaceholder(key.to_string()))?;
        out.push_str(value);
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    Ok(out)
}
