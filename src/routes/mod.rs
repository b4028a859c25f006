pub mod descriptor;
pub mod generator;
pub mod handler;
pub mod registry;

pub use descriptor::{AuthConfig, Handler, Reply, RouteDescriptor, RouteRequest, RESERVED_QUERY_PARAMS};
pub use generator::RouteGenerator;
pub use handler::{OperationCalls, MAX_PAGE_LIMIT};
pub use registry::generate;
