use std::collections::HashMap;
use std::sync::Arc;

use axum::http::Method;
use futures::future::BoxFuture;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::access::Scope;
use crate::auth::Credentials;
use crate::middleware::ApiResult;
use crate::model::Filter;
use crate::types::Operation;

/// Query parameters consumed by pagination or authentication, never forwarded as filters
pub const RESERVED_QUERY_PARAMS: &[&str] = &["limit", "offset", "access_token"];

/// Outcome of one handler invocation
pub type Reply = ApiResult<Value>;

/// Request handler carried by a route descriptor
pub type Handler = Arc<dyn Fn(RouteRequest) -> BoxFuture<'static, Reply> + Send + Sync>;

/// Auth block attached to role-gated routes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthConfig {
    pub strategy: String,
    pub scope: Vec<String>,
}

/// One generated route, ready to hand to the HTTP framework
#[derive(Clone)]
pub struct RouteDescriptor {
    pub method: Method,
    pub path: String,
    pub operation: Operation,
    pub handler: Handler,
    pub auth: Option<AuthConfig>,
}

impl RouteDescriptor {
    /// Run the handler for a request
    pub async fn handle(&self, request: RouteRequest) -> Reply {
        (self.handler)(request).await
    }
}

impl std::fmt::Debug for RouteDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteDescriptor")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("operation", &self.operation)
            .field("auth", &self.auth)
            .finish_non_exhaustive()
    }
}

/// Framework-independent view of an incoming request
#[derive(Debug, Clone, Default)]
pub struct RouteRequest {
    pub params: HashMap<String, String>,
    pub query: HashMap<String, String>,
    pub payload: Option<Value>,
    pub credentials: Option<Arc<dyn Credentials>>,
}

impl RouteRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn with_credentials(mut self, credentials: Arc<dyn Credentials>) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Caller scope, if the request carries credentials
    pub fn scope(&self) -> Option<Scope> {
        self.credentials.as_ref().and_then(|c| c.scope())
    }

    /// Caller identity, if the request carries credentials
    pub fn identity(&self) -> Option<String> {
        self.credentials.as_ref().and_then(|c| c.identity())
    }

    /// Query parameters forwarded verbatim to list calls
    pub fn filter(&self) -> Filter {
        self.query
            .iter()
            .filter(|(key, _)| !RESERVED_QUERY_PARAMS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), Value::String(value.clone())))
            .collect::<Map<String, Value>>()
    }
}
