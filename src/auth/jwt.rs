use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::http::HeaderMap;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::{Authentication, Credentials, JwtError};
use crate::access::Scope;
use crate::config::AppConfig;
use crate::error::ApiError;

/// Query parameter accepted as an alternative to the Authorization header
pub const ACCESS_TOKEN_PARAM: &str = "access_token";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Caller identity, used as the owner id
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<Scope>,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    /// Fails when the expiry lies beyond what a timestamp can represent
    pub fn new(sub: impl Into<String>, scope: Option<Scope>, expiry_hours: u64) -> Result<Self, JwtError> {
        let now = Utc::now();
        let exp = i64::try_from(expiry_hours)
            .ok()
            .and_then(Duration::try_hours)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| JwtError::TokenGeneration(format!("token expiry of {} hours is out of range", expiry_hours)))?;

        Ok(Self {
            sub: sub.into(),
            scope,
            exp: exp.timestamp(),
            iat: now.timestamp(),
        })
    }
}

impl Credentials for Claims {
    fn scope(&self) -> Option<Scope> {
        self.scope.clone()
    }

    fn identity(&self) -> Option<String> {
        Some(self.sub.clone())
    }
}

/// Bearer token strategy backed by HMAC-signed JWTs
#[derive(Clone)]
pub struct JwtAuthentication {
    secret: String,
    expiry_hours: u64,
}

impl JwtAuthentication {
    pub const STRATEGY: &'static str = "jwt";

    pub fn new(secret: impl Into<String>, expiry_hours: u64) -> Self {
        Self {
            secret: secret.into(),
            expiry_hours,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.security.jwt_secret.clone(), config.security.jwt_expiry_hours)
    }

    /// Mint a token for the given identity and roles
    pub fn issue(&self, identity: impl Into<String>, scope: Option<Scope>) -> Result<String, JwtError> {
        if self.secret.is_empty() {
            return Err(JwtError::InvalidSecret);
        }

        let claims = Claims::new(identity, scope, self.expiry_hours)?;
        let encoding_key = EncodingKey::from_secret(self.secret.as_bytes());

        encode(&Header::default(), &claims, &encoding_key)
            .map_err(|e| JwtError::TokenGeneration(e.to_string()))
    }

    /// Validate a token and extract its claims
    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        if self.secret.is_empty() {
            return Err(JwtError::InvalidSecret);
        }

        let decoding_key = DecodingKey::from_secret(self.secret.as_bytes());
        let validation = Validation::default();

        decode::<Claims>(token, &decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| JwtError::InvalidToken(e.to_string()))
    }
}

impl std::fmt::Debug for JwtAuthentication {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtAuthentication")
            .field("expiry_hours", &self.expiry_hours)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Authentication for JwtAuthentication {
    fn strategy_name(&self) -> &str {
        Self::STRATEGY
    }

    async fn authenticate(
        &self,
        headers: &HeaderMap,
        query: &HashMap<String, String>,
    ) -> Result<Arc<dyn Credentials>, ApiError> {
        let token = extract_token(headers, query).map_err(ApiError::unauthorized)?;
        let claims = self.verify(&token)?;
        Ok(Arc::new(claims))
    }
}

/// Extract the bearer token from the Authorization header or `access_token` query
fn extract_token(headers: &HeaderMap, query: &HashMap<String, String>) -> Result<String, String> {
    if let Some(auth_header) = headers.get(axum::http::header::AUTHORIZATION) {
        let auth_str = auth_header
            .to_str()
            .map_err(|_| "Invalid Authorization header format".to_string())?;

        return match auth_str.strip_prefix("Bearer ") {
            Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
            Some(_) => Err("Empty JWT token".to_string()),
            None => Err("Authorization header must use Bearer token format".to_string()),
        };
    }

    match query.get(ACCESS_TOKEN_PARAM) {
        Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
        _ => Err("Missing Authorization header".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn strategy() -> JwtAuthentication {
        JwtAuthentication::new("test-secret", 1)
    }

    #[test]
    fn issued_token_round_trips_scope_and_identity() {
        let auth = strategy();
        let token = auth.issue("25", Some(Scope::from(vec!["user", "$owner"]))).unwrap();
        let claims = auth.verify(&token).unwrap();
        assert_eq!(claims.identity().as_deref(), Some("25"));
        assert_eq!(claims.scope(), Some(Scope::from(vec!["user", "$owner"])));
    }

    #[test]
    fn empty_secret_is_rejected() {
        let auth = JwtAuthentication::new("", 1);
        assert!(matches!(auth.issue("1", None), Err(JwtError::InvalidSecret)));
    }

    #[test]
    fn oversized_expiry_is_a_generation_error() {
        for hours in [u64::MAX, i64::MAX as u64, 1 << 40] {
            let err = JwtAuthentication::new("secret", hours).issue("1", None).unwrap_err();
            assert!(matches!(err, JwtError::TokenGeneration(_)), "accepted {} hours", hours);
        }
        assert!(Claims::new("1", None, 24).is_ok());
    }

    #[test]
    fn token_signed_with_other_secret_fails() {
        let token = JwtAuthentication::new("other", 1).issue("1", None).unwrap();
        assert!(matches!(strategy().verify(&token), Err(JwtError::InvalidToken(_))));
    }

    #[tokio::test]
    async fn authenticates_from_header_or_query() {
        let auth = strategy();
        let token = auth.issue("7", Some(Scope::from("admin"))).unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        );
        let creds = auth.authenticate(&headers, &HashMap::new()).await.unwrap();
        assert_eq!(creds.identity().as_deref(), Some("7"));

        let mut query = HashMap::new();
        query.insert(ACCESS_TOKEN_PARAM.to_string(), token);
        let creds = auth.authenticate(&HeaderMap::new(), &query).await.unwrap();
        assert_eq!(creds.scope(), Some(Scope::from("admin")));
    }

    #[tokio::test]
    async fn missing_or_malformed_header_is_unauthorized() {
        let auth = strategy();
        let err = auth.authenticate(&HeaderMap::new(), &HashMap::new()).await.unwrap_err();
        assert_eq!(err.status_code(), 401);

        let mut headers = HeaderMap::new();
        headers.insert(axum::http::header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        let err = auth.authenticate(&headers, &HashMap::new()).await.unwrap_err();
        assert_eq!(err, ApiError::unauthorized("Authorization header must use Bearer token format"));
    }
}
