pub mod access;
pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod middleware;
pub mod model;
pub mod routes;
pub mod server;
pub mod types;

pub use access::{AccessResolver, AccessScope, Scope};
pub use api::Api;
pub use auth::{Authentication, Credentials, JwtAuthentication};
pub use config::{GenerateOptions, RootOptions, RouteOptions};
pub use error::{ApiError, ConfigError};
pub use model::{MemoryModel, Model};
pub use routes::{RouteDescriptor, RouteGenerator};
pub use types::Operation;
