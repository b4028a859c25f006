pub mod auth;
pub mod response;

pub use auth::{require_auth_middleware, AuthUser};
pub use response::{ApiResponse, ApiResult};
