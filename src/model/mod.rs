pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

pub use memory::MemoryModel;

/// A single record as exchanged with the data layer
pub type Record = Value;

/// Equality filter built from forwarded query parameters
pub type Filter = Map<String, Value>;

/// Errors surfaced by a model's deferred results
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid data: {0}")]
    Invalid(String),

    #[error("Data store unavailable: {0}")]
    Unavailable(String),

    #[error("{0}")]
    Other(String),
}

/// Pagination block returned alongside paginated results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pagination {
    pub offset: usize,
    pub limit: usize,
    #[serde(rename = "rowCount")]
    pub row_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub results: Vec<Record>,
    pub pagination: Pagination,
}

/// Data-access collaborator behind the generated routes.
///
/// Every operation comes in an unscoped flavour and, where it makes sense, an
/// owner-scoped flavour taking the caller's identity. Route handlers never
/// look past this trait.
#[async_trait]
pub trait Model: Send + Sync {
    /// Route segment the model is served under, e.g. `users`
    fn base_route(&self) -> &str;

    /// Name of the backing table, used for logging
    fn table_name(&self) -> &str {
        self.base_route()
    }

    async fn find_all(&self, filter: Filter) -> Result<Vec<Record>, ModelError>;

    async fn find_all_by_user_id(&self, owner_id: &str, filter: Filter) -> Result<Vec<Record>, ModelError>;

    async fn find_all_with_pagination(&self, offset: usize, limit: usize) -> Result<Page, ModelError>;

    async fn find_all_by_user_id_with_pagination(
        &self,
        owner_id: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Page, ModelError>;

    async fn find_one_by_id(&self, id: &str) -> Result<Record, ModelError>;

    async fn find_one_by_id_and_user_id(&self, id: &str, owner_id: &str) -> Result<Record, ModelError>;

    async fn create_object(&self, payload: Record) -> Result<Record, ModelError>;

    async fn update_by_id(&self, id: &str, payload: Record) -> Result<Record, ModelError>;

    async fn update_by_id_and_user_id(&self, id: &str, owner_id: &str, payload: Record) -> Result<Record, ModelError>;

    async fn destroy_by_id(&self, id: &str) -> Result<(), ModelError>;

    async fn destroy_by_id_and_user_id(&self, id: &str, owner_id: &str) -> Result<(), ModelError>;

    async fn count(&self) -> Result<u64, ModelError>;

    async fn count_by_user_id(&self, owner_id: &str) -> Result<u64, ModelError>;
}
