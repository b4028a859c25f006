/// Shared types used across the codebase

use axum::http::Method;
use serde::{Deserialize, Serialize};

/// CRUD operations a route can be generated for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    FindAll,
    FindOne,
    Create,
    Update,
    Delete,
    Count,
    FindAllPaginated,
}

impl Operation {
    /// Generation order
    pub const ALL: [Operation; 7] = [
        Operation::FindAll,
        Operation::FindOne,
        Operation::Create,
        Operation::Update,
        Operation::Delete,
        Operation::Count,
        Operation::FindAllPaginated,
    ];

    pub fn method(&self) -> Method {
        match self {
            Operation::FindAll | Operation::FindOne | Operation::Count | Operation::FindAllPaginated => Method::GET,
            Operation::Create => Method::POST,
            Operation::Update => Method::PUT,
            Operation::Delete => Method::DELETE,
        }
    }

    /// Path below the model's collection route
    pub fn path_suffix(&self) -> &'static str {
        match self {
            Operation::FindAll | Operation::Create => "",
            Operation::FindOne | Operation::Update | Operation::Delete => "/:id",
            Operation::Count => "/count",
            Operation::FindAllPaginated => "/pagination/:offset",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Operation::FindAll => "findAll",
            Operation::FindOne => "findOne",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::Count => "count",
            Operation::FindAllPaginated => "findAllPaginated",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
