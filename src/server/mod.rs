//! Hands generated route descriptors to axum.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Extension, Path, Query},
    middleware,
    response::{IntoResponse, Response},
    routing::{on, MethodFilter},
    Router,
};
use serde_json::Value;

use crate::auth::Authentication;
use crate::error::ApiError;
use crate::middleware::{require_auth_middleware, AuthUser};
use crate::routes::{RouteDescriptor, RouteRequest};

/// Build an axum router serving the given routes.
///
/// Routes carrying an auth block are wrapped with the authentication layer of
/// the registered strategy. Routes without one are served unauthenticated.
pub fn into_router(routes: &[RouteDescriptor], authentication: Option<Arc<dyn Authentication>>) -> Router {
    let mut router = Router::new();

    for descriptor in routes {
        let filter = match MethodFilter::try_from(descriptor.method.clone()) {
            Ok(filter) => filter,
            Err(_) => {
                tracing::warn!("skipping {} {}: unsupported method", descriptor.method, descriptor.path);
                continue;
            }
        };

        let route = descriptor.clone();
        let handler = move |params: Option<Path<HashMap<String, String>>>,
                            query: Result<Query<HashMap<String, String>>, QueryRejection>,
                            auth_user: Option<Extension<AuthUser>>,
                            body: Bytes| {
            let route = route.clone();
            async move {
                let query = match query {
                    Ok(Query(query)) => query,
                    Err(rejection) => return ApiError::from(rejection).into_response(),
                };
                let payload = match parse_body(&body) {
                    Ok(payload) => payload,
                    Err(err) => return err.into_response(),
                };

                let request = RouteRequest {
                    params: params.map(|Path(p)| p).unwrap_or_default(),
                    query,
                    payload,
                    credentials: auth_user.map(|Extension(AuthUser(c))| c),
                };

                into_response(route.handle(request).await)
            }
        };

        let mut method_router = on(filter, handler);
        match (&descriptor.auth, &authentication) {
            (Some(_), Some(strategy)) => {
                method_router =
                    method_router.layer(middleware::from_fn_with_state(strategy.clone(), require_auth_middleware));
            }
            (Some(auth), None) => {
                tracing::warn!(
                    "{} {} requires strategy '{}' but none was provided; serving unauthenticated",
                    descriptor.method,
                    descriptor.path,
                    auth.strategy
                );
            }
            _ => {}
        }

        router = router.route(&descriptor.path, method_router);
    }

    router
}

fn parse_body(body: &Bytes) -> Result<Option<Value>, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(body)
        .map(Some)
        .map_err(|e| ApiError::invalid_json(format!("Invalid JSON body: {}", e)))
}

fn into_response(reply: crate::routes::Reply) -> Response {
    match reply {
        Ok(response) => response.into_response(),
        Err(err) => err.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GenerateOptions, RootOptions, RouteOptions};
    use crate::model::MemoryModel;
    use crate::routes::{self, RouteGenerator};
    use crate::types::Operation;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::json;
    use tower::ServiceExt;

    fn router(options: GenerateOptions) -> Router {
        let generator = RouteGenerator::new(RootOptions::default(), None);
        let model = MemoryModel::new("notes").with_records(vec![json!({ "id": "n1", "body": "hi" })]);
        let descriptors = routes::generate(&generator, Arc::new(model), &options).unwrap();
        into_router(&descriptors, None)
    }

    async fn send(router: Router, method: &str, uri: &str) -> (StatusCode, Value) {
        let response = router
            .oneshot(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn static_and_param_segments_coexist() {
        let (status, body) = send(router(GenerateOptions::default()), "GET", "/notes/count").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], json!(1));

        let (status, body) = send(router(GenerateOptions::default()), "GET", "/notes/n1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["body"], "hi");
    }

    #[tokio::test]
    async fn undecodable_query_still_gets_json_envelope() {
        let (status, body) = send(router(GenerateOptions::default()), "GET", "/notes?body=%FF%FE").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["data"], json!([]));
    }

    #[tokio::test]
    async fn disabled_method_is_not_routed() {
        let options = GenerateOptions::default().route(Operation::Delete, RouteOptions::disabled());
        let (status, _) = send(router(options), "DELETE", "/notes/n1").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn restricted_route_without_strategy_refuses() {
        // No auth layer is attached, but the handler still finds no matching role
        let options = GenerateOptions::default().route(Operation::FindAll, RouteOptions::allow(["admin"]));
        let (status, body) = send(router(options), "GET", "/notes").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], json!(false));
    }

    #[test]
    fn blank_body_is_no_payload() {
        assert_eq!(parse_body(&Bytes::new()).unwrap(), None);
        assert_eq!(parse_body(&Bytes::from_static(b" \n")).unwrap(), None);
    }

    #[test]
    fn malformed_body_is_invalid_json() {
        let err = parse_body(&Bytes::from_static(b"{nope")).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_JSON");
        assert_eq!(
            parse_body(&Bytes::from_static(b"{\"a\":1}")).unwrap(),
            Some(serde_json::json!({ "a": 1 }))
        );
    }
}
