//! The single request handler behind every generated route.
//!
//! Each operation only contributes its pair of data calls; scope lookup,
//! resolution, dispatch and reply mapping are shared.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use serde_json::{json, Value};

use super::descriptor::{Handler, Reply, RouteRequest};
use crate::access::{AccessResolver, AccessScope};
use crate::error::ApiError;
use crate::middleware::ApiResponse;
use crate::model::Model;
use crate::types::Operation;

/// Default and maximum page size of the pagination route
pub const MAX_PAGE_LIMIT: usize = 20;

pub type AllAccessCall = fn(Arc<dyn Model>, RouteRequest) -> BoxFuture<'static, Reply>;
pub type OwnerAccessCall = fn(Arc<dyn Model>, RouteRequest, String) -> BoxFuture<'static, Reply>;

/// The two data calls an operation can make
#[derive(Clone, Copy)]
pub struct OperationCalls {
    pub all_access: AllAccessCall,
    pub owner_access: OwnerAccessCall,
}

impl OperationCalls {
    pub fn for_operation(operation: Operation) -> Self {
        match operation {
            Operation::FindAll => Self {
                all_access: |m, r| find_all(m, r).boxed(),
                owner_access: |m, r, o| find_all_owned(m, r, o).boxed(),
            },
            Operation::FindAllPaginated => Self {
                all_access: |m, r| find_page(m, r).boxed(),
                owner_access: |m, r, o| find_page_owned(m, r, o).boxed(),
            },
            Operation::FindOne => Self {
                all_access: |m, r| find_one(m, r).boxed(),
                owner_access: |m, r, o| find_one_owned(m, r, o).boxed(),
            },
            // No owner-scoped create exists; owners create like everyone else
            Operation::Create => Self {
                all_access: |m, r| create(m, r).boxed(),
                owner_access: |m, r, _| create(m, r).boxed(),
            },
            Operation::Update => Self {
                all_access: |m, r| update(m, r).boxed(),
                owner_access: |m, r, o| update_owned(m, r, o).boxed(),
            },
            Operation::Delete => Self {
                all_access: |m, r| destroy(m, r).boxed(),
                owner_access: |m, r, o| destroy_owned(m, r, o).boxed(),
            },
            Operation::Count => Self {
                all_access: |m, r| count(m, r).boxed(),
                owner_access: |m, _, o| count_owned(m, o).boxed(),
            },
        }
    }
}

/// Everything a handler needs, fixed at generation time
pub struct HandlerContext {
    pub model: Arc<dyn Model>,
    pub resolver: Arc<dyn AccessResolver>,
    pub allowed_roles: Option<Vec<String>>,
    /// Whether an authentication strategy is registered
    pub authenticated: bool,
    pub calls: OperationCalls,
}

pub fn build_handler(context: HandlerContext) -> Handler {
    let context = Arc::new(context);
    Arc::new(move |request: RouteRequest| {
        let context = context.clone();
        async move {
            // A panicking collaborator still yields exactly one reply
            AssertUnwindSafe(dispatch(&context, request))
                .catch_unwind()
                .await
                .unwrap_or_else(|_| {
                    tracing::error!(route = context.model.base_route(), "route handler panicked");
                    Err(ApiError::internal_server_error("An error occurred while processing your request"))
                })
        }
        .boxed()
    })
}

async fn dispatch(context: &HandlerContext, request: RouteRequest) -> Reply {
    let user_scope = if context.authenticated && context.allowed_roles.is_some() {
        request.scope()
    } else {
        None
    };

    let decision = context
        .resolver
        .resolve(user_scope.as_ref(), context.allowed_roles.as_deref());

    let model = context.model.clone();
    match decision {
        Some(AccessScope::AllAccess) => (context.calls.all_access)(model, request).await,
        Some(AccessScope::OwnerAccess) => match request.identity() {
            Some(owner) => (context.calls.owner_access)(model, request, owner).await,
            None => Err(ApiError::unauthorized("Owner access requires an authenticated identity")),
        },
        Some(AccessScope::NoAccess) => Err(ApiError::unauthorized("Unauthorized")),
        // Undecided resolver: permissive fallback to the unscoped call. Only
        // reachable through a defective resolver, never through configuration.
        None => {
            tracing::warn!(
                route = context.model.base_route(),
                "access resolver returned no decision, falling back to unscoped access"
            );
            (context.calls.all_access)(model, request).await
        }
    }
}

fn record_id(request: &RouteRequest) -> Result<String, ApiError> {
    request
        .param("id")
        .map(str::to_string)
        .ok_or_else(|| ApiError::bad_request("Missing record id"))
}

fn payload(request: &mut RouteRequest) -> Result<Value, ApiError> {
    request
        .payload
        .take()
        .ok_or_else(|| ApiError::bad_request("Missing request payload"))
}

fn page_window(request: &RouteRequest) -> Result<(usize, usize), ApiError> {
    let offset = request
        .param("offset")
        .ok_or_else(|| ApiError::bad_request("Missing pagination offset"))?
        .parse::<usize>()
        .map_err(|_| ApiError::bad_request("Pagination offset must be a non-negative integer"))?;

    let limit = match request.query.get("limit") {
        None => MAX_PAGE_LIMIT,
        Some(raw) => match raw.parse::<usize>() {
            Ok(limit) if limit <= MAX_PAGE_LIMIT => limit,
            _ => {
                return Err(ApiError::bad_request(format!(
                    "limit must be an integer no larger than {}",
                    MAX_PAGE_LIMIT
                )))
            }
        },
    };

    Ok((offset, limit))
}

fn to_value<T: serde::Serialize>(data: T) -> Result<Value, ApiError> {
    serde_json::to_value(data).map_err(|e| {
        tracing::error!("JSON serialization error: {}", e);
        ApiError::internal_server_error("Failed to format response")
    })
}

async fn find_all(model: Arc<dyn Model>, request: RouteRequest) -> Reply {
    let records = model.find_all(request.filter()).await?;
    Ok(ApiResponse::success(Value::Array(records)))
}

async fn find_all_owned(model: Arc<dyn Model>, request: RouteRequest, owner: String) -> Reply {
    let records = model.find_all_by_user_id(&owner, request.filter()).await?;
    Ok(ApiResponse::success(Value::Array(records)))
}

async fn find_page(model: Arc<dyn Model>, request: RouteRequest) -> Reply {
    let (offset, limit) = page_window(&request)?;
    let page = model.find_all_with_pagination(offset, limit).await?;
    Ok(ApiResponse::success(to_value(page)?))
}

async fn find_page_owned(model: Arc<dyn Model>, request: RouteRequest, owner: String) -> Reply {
    let (offset, limit) = page_window(&request)?;
    let page = model.find_all_by_user_id_with_pagination(&owner, offset, limit).await?;
    Ok(ApiResponse::success(to_value(page)?))
}

async fn find_one(model: Arc<dyn Model>, request: RouteRequest) -> Reply {
    let id = record_id(&request)?;
    Ok(ApiResponse::success(model.find_one_by_id(&id).await?))
}

async fn find_one_owned(model: Arc<dyn Model>, request: RouteRequest, owner: String) -> Reply {
    let id = record_id(&request)?;
    Ok(ApiResponse::success(model.find_one_by_id_and_user_id(&id, &owner).await?))
}

async fn create(model: Arc<dyn Model>, mut request: RouteRequest) -> Reply {
    let payload = payload(&mut request)?;
    Ok(ApiResponse::created(model.create_object(payload).await?))
}

async fn update(model: Arc<dyn Model>, mut request: RouteRequest) -> Reply {
    let id = record_id(&request)?;
    let payload = payload(&mut request)?;
    Ok(ApiResponse::success(model.update_by_id(&id, payload).await?))
}

async fn update_owned(model: Arc<dyn Model>, mut request: RouteRequest, owner: String) -> Reply {
    let id = record_id(&request)?;
    let payload = payload(&mut request)?;
    Ok(ApiResponse::success(model.update_by_id_and_user_id(&id, &owner, payload).await?))
}

async fn destroy(model: Arc<dyn Model>, request: RouteRequest) -> Reply {
    let id = record_id(&request)?;
    model.destroy_by_id(&id).await?;
    Ok(ApiResponse::success(json!({ "id": id })))
}

async fn destroy_owned(model: Arc<dyn Model>, request: RouteRequest, owner: String) -> Reply {
    let id = record_id(&request)?;
    model.destroy_by_id_and_user_id(&id, &owner).await?;
    Ok(ApiResponse::success(json!({ "id": id })))
}

async fn count(model: Arc<dyn Model>, _request: RouteRequest) -> Reply {
    let total = model.count().await?;
    Ok(ApiResponse::success(json!(total)))
}

async fn count_owned(model: Arc<dyn Model>, owner: String) -> Reply {
    let total = model.count_by_user_id(&owner).await?;
    Ok(ApiResponse::success(json!(total)))
}
