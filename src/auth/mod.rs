pub mod jwt;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::http::HeaderMap;
use thiserror::Error;

use crate::access::Scope;
use crate::error::ApiError;

pub use jwt::{Claims, JwtAuthentication};

/// What a route handler may learn about the authenticated caller
pub trait Credentials: Send + Sync + std::fmt::Debug {
    /// Roles granted to the caller
    fn scope(&self) -> Option<Scope>;

    /// Identity used for owner-scoped data calls
    fn identity(&self) -> Option<String>;
}

/// Authentication strategy registered with the route generator
#[async_trait]
pub trait Authentication: Send + Sync {
    /// Name attached to the auth block of every role-gated route
    fn strategy_name(&self) -> &str;

    /// Validate the request and produce the caller's credentials
    async fn authenticate(
        &self,
        headers: &HeaderMap,
        query: &HashMap<String, String>,
    ) -> Result<Arc<dyn Credentials>, ApiError>;
}

/// Plain credentials value, handy for custom strategies
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StaticCredentials {
    pub id: Option<String>,
    pub scope: Option<Scope>,
}

impl StaticCredentials {
    pub fn new(id: impl Into<String>, scope: impl Into<Scope>) -> Self {
        Self {
            id: Some(id.into()),
            scope: Some(scope.into()),
        }
    }
}

impl Credentials for StaticCredentials {
    fn scope(&self) -> Option<Scope> {
        self.scope.clone()
    }

    fn identity(&self) -> Option<String> {
        self.id.clone()
    }
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),

    #[error("Invalid JWT secret")]
    InvalidSecret,
}
