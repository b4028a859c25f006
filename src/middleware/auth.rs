use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::auth::{Authentication, Credentials};
use crate::error::ApiError;

/// Authenticated caller, injected into request extensions
#[derive(Clone, Debug)]
pub struct AuthUser(pub Arc<dyn Credentials>);

/// Authentication middleware for role-gated routes.
///
/// Only authenticates; whether the caller's roles suffice is decided by the
/// route handler.
pub async fn require_auth_middleware(
    State(authentication): State<Arc<dyn Authentication>>,
    query: Result<Query<HashMap<String, String>>, QueryRejection>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Response {
    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => return ApiError::from(rejection).into_response(),
    };

    match authentication.authenticate(&headers, &query).await {
        Ok(credentials) => {
            request.extensions_mut().insert(AuthUser(credentials));
            next.run(request).await
        }
        Err(api_error) => {
            tracing::debug!(
                strategy = authentication.strategy_name(),
                path = %request.uri().path(),
                "authentication failed: {}",
                api_error
            );
            api_error.into_response()
        }
    }
}
