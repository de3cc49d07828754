//! The resource client: typed CRUD operations against one resource path.
//!
//! # Design
//! `ResourceClient<M>` is bound to a model type `M` whose [`ApiResource`]
//! descriptor names the remote path. Every operation runs the same fixed
//! pipeline: build URL, build headers, build auth, call the backend verb,
//! check the status, deserialize. The client owns its backend; the backend
//! only holds a weak [`ClientRef`] back, so dropping the last client handle
//! frees both.
//!
//! Operations return an [`Operation`] builder. The model a call decodes into
//! is carried in the builder's type parameters, so choosing an
//! `extra_model::<T>()` or a `paging_model::<T>()` changes the result type
//! at compile time rather than at run time.

use std::any::type_name;
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::app::AppContext;
use crate::backends::{self, BackendConfig, BackendRef, ClientRef, HttpBackend};
use crate::error::{BuildError, ClientError, Headers, HttpException};
use crate::http::{Auth, BackendRequest, Envelope};
use crate::resource::{fill_placeholders, ApiResource, Model, ResourceDescriptor};
use crate::settings::ClientSettings;
use crate::status;
use crate::types::MessageModel;

/// Timeout applied when an operation does not set one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Request parameters, kept in insertion order.
pub type Params = serde_json::Map<String, Value>;

/// Header or auth overlay. `None` removes the key; an empty string is kept.
pub type Overrides = BTreeMap<String, Option<String>>;

/// Parameter values that never make it into a URL.
const DROPPED_VALUES: [&str; 4] = ["", "/", "?", "="];

const RND_LEN: usize = 8;

/// Who the client calls as, and where.
#[derive(Clone)]
pub(crate) struct ClientIdentity {
    resource_endpoint: String,
    client_id: String,
    client_secret: String,
}

impl ClientIdentity {
    pub(crate) fn resource_endpoint(&self) -> &str {
        &self.resource_endpoint
    }
}

impl fmt::Debug for ClientIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientIdentity")
            .field("resource_endpoint", &self.resource_endpoint)
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .finish()
    }
}

/// Shared state behind every clone of a [`ResourceClient`].
#[derive(Debug)]
pub(crate) struct ClientInner {
    descriptor: ResourceDescriptor,
    identity: ClientIdentity,
    backend: Box<dyn HttpBackend>,
    app: Option<Arc<AppContext>>,
    config: Option<BackendConfig>,
}

impl ClientInner {
    pub(crate) fn identity(&self) -> &ClientIdentity {
        &self.identity
    }

    pub(crate) fn backend(&self) -> &dyn HttpBackend {
        self.backend.as_ref()
    }

    pub(crate) fn app(&self) -> Option<&Arc<AppContext>> {
        self.app.as_ref()
    }
}

/// Async client for the resource described by `M`.
pub struct ResourceClient<M> {
    inner: Arc<ClientInner>,
    _model: PhantomData<fn() -> M>,
}

impl<M> Clone for ResourceClient<M> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            _model: PhantomData,
        }
    }
}

impl<M> fmt::Debug for ResourceClient<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceClient")
            .field("model", &type_name::<M>())
            .field("inner", &self.inner)
            .finish()
    }
}

/// Shorthand for [`ResourceClient::builder`].
pub fn api_client_builder<M: ApiResource>() -> ClientBuilder<M> {
    ResourceClient::builder()
}

/// Assembles a [`ResourceClient`].
///
/// Explicit values win over [`ClientSettings`]; settings fill whatever was
/// left unset.
pub struct ClientBuilder<M> {
    backend: Option<BackendRef>,
    resource_endpoint: Option<String>,
    client_id: Option<String>,
    client_secret: Option<String>,
    app: Option<Arc<AppContext>>,
    config: Option<BackendConfig>,
    settings: ClientSettings,
    _model: PhantomData<fn() -> M>,
}

impl<M> fmt::Debug for ClientBuilder<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("model", &type_name::<M>())
            .field("backend", &self.backend)
            .field("resource_endpoint", &self.resource_endpoint)
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

impl<M: ApiResource> ClientBuilder<M> {
    fn new() -> Self {
        Self {
            backend: None,
            resource_endpoint: None,
            client_id: None,
            client_secret: None,
            app: None,
            config: None,
            settings: ClientSettings::default(),
            _model: PhantomData,
        }
    }

    /// Backend by name (`"requests"`, `"aiohttp"`, ...) or as an instance.
    pub fn backend(mut self, backend: impl Into<BackendRef>) -> Self {
        self.backend = Some(backend.into());
        self
    }

    pub fn backend_instance(self, backend: impl HttpBackend + 'static) -> Self {
        self.backend(BackendRef::instance(backend))
    }

    pub fn resource_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.resource_endpoint = Some(endpoint.into());
        self
    }

    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    pub fn client_secret(mut self, client_secret: impl Into<String>) -> Self {
        self.client_secret = Some(client_secret.into());
        self
    }

    pub fn app(mut self, app: impl Into<Arc<AppContext>>) -> Self {
        self.app = Some(app.into());
        self
    }

    /// Configuration pushed into the backend when the client is built.
    pub fn config(mut self, config: BackendConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn settings(mut self, settings: ClientSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn build(self) -> Result<ResourceClient<M>, BuildError> {
        let ClientBuilder {
            backend,
            resource_endpoint,
            client_id,
            client_secret,
            app,
            config,
            settings,
            _model,
        } = self;

        let resource_endpoint = resource_endpoint
            .or(settings.resource_endpoint)
            .filter(|endpoint| !endpoint.trim().is_empty())
            .ok_or(BuildError::MissingEndpoint)?
            .trim_end_matches('/')
            .to_string();
        let descriptor = M::descriptor()?;
        let backend = match backend {
            Some(reference) => reference,
            None => settings
                .http_backend
                .map(BackendRef::Named)
                .ok_or(BuildError::MissingBackend)?,
        };
        let mut backend = backends::resolve(backend)?;

        let identity = ClientIdentity {
            resource_endpoint,
            client_id: client_id.unwrap_or(settings.client_id),
            client_secret: client_secret.unwrap_or(settings.client_secret),
        };
        let inner = Arc::new_cyclic(|weak| {
            backend.attach(ClientRef::new(weak.clone()), config.as_ref());
            ClientInner {
                descriptor,
                identity,
                backend,
                app,
                config,
            }
        });
        inner.backend.prepare()?;
        if let Some(app) = &inner.app {
            app.attach_client(&inner);
        }

        info!(
            model = type_name::<M>(),
            backend = inner.backend.name(),
            endpoint = %inner.identity.resource_endpoint,
            "resource client ready"
        );
        Ok(ResourceClient {
            inner,
            _model: PhantomData,
        })
    }
}

impl<M: ApiResource> ResourceClient<M> {
    pub fn builder() -> ClientBuilder<M> {
        ClientBuilder::new()
    }

    pub fn backend(&self) -> &dyn HttpBackend {
        self.inner.backend()
    }

    pub fn backend_name(&self) -> &'static str {
        self.inner.backend.name()
    }

    pub fn app(&self) -> Option<&Arc<AppContext>> {
        self.inner.app()
    }

    pub fn config(&self) -> Option<&BackendConfig> {
        self.inner.config.as_ref()
    }

    pub fn resource_endpoint(&self) -> &str {
        &self.inner.identity.resource_endpoint
    }

    pub fn client_id(&self) -> &str {
        &self.inner.identity.client_id
    }

    pub fn descriptor(&self) -> &ResourceDescriptor {
        &self.inner.descriptor
    }

    /// Whether `owner` refers to this client.
    pub fn is_owner_of(&self, owner: &ClientRef) -> bool {
        owner.points_to(&self.inner)
    }

    /// Compose the request URL.
    ///
    /// Parameters start from `client_id`, then `opt_id` and `extra_params`
    /// are merged in with null and separator-only values dropped. The merged
    /// set fills the `{placeholders}` of the descriptor and is then appended
    /// as the query string, after an optional random `rnd` value.
    pub fn get_url(
        &self,
        opt_id: &Params,
        extra_params: &Params,
        with_rnd: bool,
    ) -> Result<String, BuildError> {
        let identity = &self.inner.identity;
        let mut params = vec![("client_id".to_string(), identity.client_id.clone())];
        for (key, value) in opt_id.iter().chain(extra_params.iter()) {
            if let Some(value) = param_value(value) {
                upsert(&mut params, key, value);
            }
        }

        let lookup = |key: &str| {
            params
                .iter()
                .find(|(name, _)| name == key)
                .map(|(_, value)| value.as_str())
        };
        let descriptor = &self.inner.descriptor;
        let prefix = fill_placeholders(descriptor.prefix(), lookup)?;
        let name = fill_placeholders(descriptor.name(), lookup)?;
        let suffix = fill_placeholders(descriptor.suffix(), lookup)?;

        let mut url = identity.resource_endpoint.clone();
        for segment in [&prefix, &name, &suffix] {
            let segment = segment.trim_matches('/');
            if !segment.is_empty() {
                url.push('/');
                url.push_str(segment);
            }
        }

        if with_rnd {
            let rnd: String = rand::thread_rng()
                .sample_iter(&Alphanumeric)
                .take(RND_LEN)
                .map(char::from)
                .collect();
            upsert(&mut params, "rnd", rnd);
        }
        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(params.iter())
            .finish();
        url.push('?');
        url.push_str(&query);

        info!(url = %url, "request url");
        Ok(url)
    }

    /// Default headers overlaid with `extra`.
    pub fn get_headers(&self, extra: &Overrides) -> Headers {
        let identity = &self.inner.identity;
        let mut headers = Headers::new();
        headers.insert("Content-Type".into(), "application/json".into());
        headers.insert("X_ClientId".into(), identity.client_id.clone());
        headers.insert("X_Client_Secret".into(), identity.client_secret.clone());
        overlay(&mut headers, extra);
        headers
    }

    /// Default `{username, password}` credentials overlaid with `extra`.
    pub fn get_auth(&self, extra: &Overrides) -> Auth {
        let identity = &self.inner.identity;
        let mut auth = Headers::new();
        auth.insert("username".into(), identity.client_id.clone());
        auth.insert("password".into(), identity.client_secret.clone());
        overlay(&mut auth, extra);
        Auth::Credentials(auth)
    }

    /// POST a new resource. Succeeds on 200, 201 or 202.
    pub fn create<B: Serialize + ?Sized>(&self, body: &B) -> Operation<'_, M, Create> {
        Operation::new(
            self,
            Create {
                body: serde_json::to_value(body),
            },
        )
    }

    /// Plain POST that only accepts 200 and always answers a [`MessageModel`].
    pub fn normal_post<B: Serialize + ?Sized>(&self, body: &B) -> Operation<'_, M, NormalPost> {
        Operation::new(
            self,
            NormalPost {
                body: serde_json::to_value(body),
            },
        )
    }

    /// GET one resource (with [`Operation::opt_id`]) or a collection.
    pub fn retrieve(&self) -> Operation<'_, M, Retrieve> {
        Operation::new(
            self,
            Retrieve {
                opt_id: Params::new(),
                condition: Params::new(),
            },
        )
    }

    /// PUT `body`, to one resource with [`Operation::opt_id`] or in bulk.
    pub fn update<B: Serialize + ?Sized>(&self, body: &B) -> Operation<'_, M, Update> {
        Operation::new(
            self,
            Update {
                opt_id: Params::new(),
                body: serde_json::to_value(body),
            },
        )
    }

    /// DELETE the resource identified by `opt_id`.
    pub fn delete<I, K, V>(&self, opt_id: I) -> Operation<'_, M, Delete>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Operation::new(
            self,
            Delete {
                opt_id: collect_params(opt_id),
            },
        )
    }

    async fn dispatch(
        &self,
        verb: Verb,
        opt_id: &Params,
        knobs: &Knobs,
        body: Option<Value>,
    ) -> Result<Envelope, ClientError> {
        let url = self.get_url(opt_id, &knobs.extra_params, verb == Verb::Get)?;
        let headers = self.get_headers(&knobs.headers);
        let auth = match &knobs.auth {
            Some(native) => native.clone(),
            None => self.get_auth(&knobs.auths),
        };
        debug!(?verb, headers = ?headers.keys().collect::<Vec<_>>(), body = ?body, "request");

        let mut request = BackendRequest::new(url, knobs.timeout)
            .headers(headers)
            .auth(auth);
        request.body = body;
        let backend = self.inner.backend();
        let envelope = match verb {
            Verb::Get => backend.get(request).await?,
            Verb::Post => backend.post(request).await?,
            Verb::Put => backend.put(request).await?,
            Verb::Delete => backend.delete(request).await?,
        };
        debug!(status_code = envelope.status_code, response = ?envelope.response, "response");
        Ok(envelope)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verb {
    Get,
    Post,
    Put,
    Delete,
}

/// Stringify a parameter value, or `None` when it must be dropped.
fn param_value(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null => return None,
        Value::String(text) => text.clone(),
        other => other.to_string(),
    };
    (!DROPPED_VALUES.contains(&text.as_str())).then_some(text)
}

fn upsert(params: &mut Vec<(String, String)>, key: &str, value: String) {
    match params.iter_mut().find(|(name, _)| name == key) {
        Some(slot) => slot.1 = value,
        None => params.push((key.to_string(), value)),
    }
}

fn overlay(target: &mut Headers, extra: &Overrides) {
    for (key, value) in extra {
        match value {
            Some(value) => {
                target.insert(key.clone(), value.clone());
            }
            None => {
                target.remove(key);
            }
        }
    }
}

fn collect_params<I, K, V>(pairs: I) -> Params
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    pairs
        .into_iter()
        .map(|(key, value)| (key.into(), value.into()))
        .collect()
}

fn expect_status(envelope: &Envelope, accepted: &[u16]) -> Result<(), HttpException> {
    if accepted.contains(&envelope.status_code) {
        Ok(())
    } else {
        Err(HttpException::new(envelope.status_code))
    }
}

fn decode<T: DeserializeOwned>(envelope: Envelope) -> Result<T, ClientError> {
    serde_json::from_value(Value::Object(envelope.response)).map_err(|source| {
        ClientError::Deserialize {
            model: type_name::<T>(),
            source,
        }
    })
}

/// Result of `retrieve` and `update`, by the model that was selected.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelResult<M, X, A> {
    /// A single resource, selected by `opt_id`.
    Resource(M),
    /// The `extra_model`.
    Extra(X),
    /// The paging or bulk-update model.
    Aggregate(A),
    /// Nothing more specific was asked for.
    Message(MessageModel),
}

impl<M, X, A> ModelResult<M, X, A> {
    pub fn into_resource(self) -> Option<M> {
        match self {
            ModelResult::Resource(model) => Some(model),
            _ => None,
        }
    }

    pub fn into_extra(self) -> Option<X> {
        match self {
            ModelResult::Extra(model) => Some(model),
            _ => None,
        }
    }

    pub fn into_aggregate(self) -> Option<A> {
        match self {
            ModelResult::Aggregate(model) => Some(model),
            _ => None,
        }
    }

    pub fn into_message(self) -> Option<MessageModel> {
        match self {
            ModelResult::Message(message) => Some(message),
            _ => None,
        }
    }
}

#[doc(hidden)]
#[derive(Debug)]
pub struct Create {
    body: Result<Value, serde_json::Error>,
}

#[doc(hidden)]
#[derive(Debug)]
pub struct NormalPost {
    body: Result<Value, serde_json::Error>,
}

#[doc(hidden)]
#[derive(Debug)]
pub struct Retrieve {
    opt_id: Params,
    condition: Params,
}

#[doc(hidden)]
#[derive(Debug)]
pub struct Update {
    opt_id: Params,
    body: Result<Value, serde_json::Error>,
}

#[doc(hidden)]
#[derive(Debug)]
pub struct Delete {
    opt_id: Params,
}

/// Per-call options shared by every operation.
#[derive(Debug, Clone)]
struct Knobs {
    extra_params: Params,
    headers: Overrides,
    auths: Overrides,
    auth: Option<Auth>,
    timeout: Duration,
}

impl Default for Knobs {
    fn default() -> Self {
        Self {
            extra_params: Params::new(),
            headers: Overrides::new(),
            auths: Overrides::new(),
            auth: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// A pending call. Configure it, then `.send().await`.
///
/// `X` is the `extra_model`; `A` is the paging model for `retrieve` and the
/// bulk-update model for `update`.
#[must_use = "operations do nothing until `.send().await`"]
pub struct Operation<'c, M, Op, X = M, A = Value> {
    client: &'c ResourceClient<M>,
    op: Op,
    knobs: Knobs,
    has_extra: bool,
    has_aggregate: bool,
    _models: PhantomData<fn() -> (X, A)>,
}

impl<'c, M, Op: fmt::Debug, X, A> fmt::Debug for Operation<'c, M, Op, X, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("op", &self.op)
            .field("knobs", &self.knobs)
            .field("extra_model", &self.has_extra.then(type_name::<X>))
            .field("aggregate_model", &self.has_aggregate.then(type_name::<A>))
            .finish()
    }
}

impl<'c, M: ApiResource, Op> Operation<'c, M, Op> {
    fn new(client: &'c ResourceClient<M>, op: Op) -> Self {
        Self {
            client,
            op,
            knobs: Knobs::default(),
            has_extra: false,
            has_aggregate: false,
            _models: PhantomData,
        }
    }
}

impl<'c, M: ApiResource, Op, X, A> Operation<'c, M, Op, X, A> {
    fn retype<X2, A2>(self, has_extra: bool, has_aggregate: bool) -> Operation<'c, M, Op, X2, A2> {
        Operation {
            client: self.client,
            op: self.op,
            knobs: self.knobs,
            has_extra,
            has_aggregate,
            _models: PhantomData,
        }
    }

    /// Decode the response into `X2` instead of the default model.
    pub fn extra_model<X2: Model>(self) -> Operation<'c, M, Op, X2, A> {
        let has_aggregate = self.has_aggregate;
        self.retype(true, has_aggregate)
    }

    /// Extra query parameters, merged after `opt_id`.
    pub fn extra_params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.knobs.extra_params.extend(collect_params(params));
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.knobs.extra_params.insert(key.into(), value.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.knobs.headers.insert(name.into(), Some(value.into()));
        self
    }

    /// Remove a default header.
    pub fn drop_header(mut self, name: impl Into<String>) -> Self {
        self.knobs.headers.insert(name.into(), None);
        self
    }

    pub fn extra_headers(mut self, headers: Overrides) -> Self {
        self.knobs.headers.extend(headers);
        self
    }

    /// Use a backend-native auth value instead of the client credentials.
    pub fn auth(mut self, auth: Auth) -> Self {
        self.knobs.auth = Some(auth);
        self
    }

    /// Overlay the `{username, password}` credentials.
    pub fn extra_auths(mut self, auths: Overrides) -> Self {
        self.knobs.auths.extend(auths);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.knobs.timeout = timeout;
        self
    }
}

impl<'c, M: ApiResource, X, A> Operation<'c, M, Retrieve, X, A> {
    /// Identify a single resource.
    pub fn opt_id<I, K, V>(mut self, opt_id: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.op.opt_id.extend(collect_params(opt_id));
        self
    }

    /// Filter values merged into the query; nulls are skipped.
    pub fn condition<I, K, V>(mut self, condition: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.op.condition.extend(collect_params(condition));
        self
    }

    /// Decode collection responses into `P`.
    pub fn paging_model<P: Model>(self) -> Operation<'c, M, Retrieve, X, P> {
        let has_extra = self.has_extra;
        self.retype(has_extra, true)
    }

    pub async fn send(self) -> Result<ModelResult<M, X, A>, ClientError>
    where
        X: Model,
        A: Model,
    {
        let Retrieve { opt_id, condition } = self.op;
        let mut knobs = self.knobs;
        for (key, value) in condition {
            if !value.is_null() {
                knobs.extra_params.insert(key, value);
            }
        }

        let envelope = self
            .client
            .dispatch(Verb::Get, &opt_id, &knobs, None)
            .await?;
        expect_status(&envelope, &[status::OK])?;
        select_model(envelope, !opt_id.is_empty(), self.has_extra, self.has_aggregate)
    }
}

impl<'c, M: ApiResource, X, A> Operation<'c, M, Update, X, A> {
    /// Identify a single resource.
    pub fn opt_id<I, K, V>(mut self, opt_id: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.op.opt_id.extend(collect_params(opt_id));
        self
    }

    /// Decode bulk-update responses into `U`.
    pub fn mult_update_model<U: Model>(self) -> Operation<'c, M, Update, X, U> {
        let has_extra = self.has_extra;
        self.retype(has_extra, true)
    }

    pub async fn send(self) -> Result<ModelResult<M, X, A>, ClientError>
    where
        X: Model,
        A: Model,
    {
        let Update { opt_id, body } = self.op;
        let body = body.map_err(ClientError::Serialize)?;
        let envelope = self
            .client
            .dispatch(Verb::Put, &opt_id, &self.knobs, Some(body))
            .await?;
        expect_status(&envelope, &[status::OK])?;
        select_model(envelope, !opt_id.is_empty(), self.has_extra, self.has_aggregate)
    }
}

impl<'c, M: ApiResource, X: Model, A> Operation<'c, M, Create, X, A> {
    pub async fn send(self) -> Result<X, ClientError> {
        let body = self.op.body.map_err(ClientError::Serialize)?;
        let envelope = self
            .client
            .dispatch(Verb::Post, &Params::new(), &self.knobs, Some(body))
            .await?;
        expect_status(&envelope, &[status::OK, status::CREATED, status::ACCEPTED])?;
        decode(envelope)
    }
}

impl<'c, M: ApiResource, X, A> Operation<'c, M, NormalPost, X, A> {
    pub async fn send(self) -> Result<MessageModel, ClientError> {
        let body = self.op.body.map_err(ClientError::Serialize)?;
        let envelope = self
            .client
            .dispatch(Verb::Post, &Params::new(), &self.knobs, Some(body))
            .await?;
        expect_status(&envelope, &[status::OK])?;
        decode(envelope)
    }
}

impl<'c, M: ApiResource, X: Model, A> Operation<'c, M, Delete, X, A> {
    pub async fn send(self) -> Result<X, ClientError> {
        let envelope = self
            .client
            .dispatch(Verb::Delete, &self.op.opt_id, &self.knobs, None)
            .await?;
        expect_status(&envelope, &[status::OK])?;
        decode(envelope)
    }
}

/// Pick the result model: resource, then extra, then aggregate, then message.
fn select_model<M, X, A>(
    envelope: Envelope,
    single: bool,
    has_extra: bool,
    has_aggregate: bool,
) -> Result<ModelResult<M, X, A>, ClientError>
where
    M: DeserializeOwned,
    X: DeserializeOwned,
    A: DeserializeOwned,
{
    if single {
        decode(envelope).map(ModelResult::Resource)
    } else if has_extra {
        decode(envelope).map(ModelResult::Extra)
    } else if has_aggregate {
        decode(envelope).map(ModelResult::Aggregate)
    } else {
        decode(envelope).map(ModelResult::Message)
    }
}
