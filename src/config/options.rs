//! Route generation options.
//!
//! Options are parsed and defaulted once, then handed to the generator as an
//! immutable value. Unknown keys are rejected.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ConfigError;
use crate::types::Operation;

/// Generator-wide options
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct RootOptions {
    /// Prefix for every generated path. Empty, or `/segment[/segment...]`.
    pub base_path: String,
}

impl RootOptions {
    pub fn new(base_path: impl Into<String>) -> Result<Self, ConfigError> {
        let options = Self {
            base_path: base_path.into(),
        };
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let path = &self.base_path;
        if path.is_empty() {
            return Ok(());
        }
        if !path.starts_with('/') || path.ends_with('/') || path.contains("//") {
            return Err(ConfigError::InvalidBasePath(format!(
                "'{}' must start with '/' and must not end with '/'",
                path
            )));
        }
        if !path[1..].split('/').all(is_path_segment) {
            return Err(ConfigError::InvalidBasePath(format!(
                "'{}' segments may only contain letters, digits, '-', '_' and '.'",
                path
            )));
        }
        Ok(())
    }
}

/// A literal path segment: non-empty, no parameter or wildcard syntax
pub fn is_path_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
}

/// Per-operation options: whether the route exists and who may use it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct RouteOptions {
    pub is_enabled: bool,
    /// `None` leaves the route public. `$owner` enables owner-scoped access.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_roles: Option<Vec<String>>,
}

impl Default for RouteOptions {
    fn default() -> Self {
        Self {
            is_enabled: true,
            allowed_roles: None,
        }
    }
}

impl RouteOptions {
    pub fn disabled() -> Self {
        Self {
            is_enabled: false,
            allowed_roles: None,
        }
    }

    pub fn allow<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            is_enabled: true,
            allowed_roles: Some(roles.into_iter().map(Into::into).collect()),
        }
    }

    /// Allowed roles when the route is actually restricted
    pub fn restriction(&self) -> Option<&[String]> {
        self.allowed_roles.as_deref().filter(|roles| !roles.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct RoutesConfig {
    pub find_all: RouteOptions,
    pub find_one: RouteOptions,
    pub create: RouteOptions,
    pub update: RouteOptions,
    pub delete: RouteOptions,
    pub count: RouteOptions,
    #[serde(alias = "findAllWithPagination")]
    pub find_all_paginated: RouteOptions,
}

impl RoutesConfig {
    pub fn get(&self, operation: Operation) -> &RouteOptions {
        match operation {
            Operation::FindAll => &self.find_all,
            Operation::FindOne => &self.find_one,
            Operation::Create => &self.create,
            Operation::Update => &self.update,
            Operation::Delete => &self.delete,
            Operation::Count => &self.count,
            Operation::FindAllPaginated => &self.find_all_paginated,
        }
    }
}

/// Options for generating the routes of one model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerateOptions {
    pub routes: RoutesConfig,
}

impl GenerateOptions {
    /// Parse options from JSON. `null` yields the defaults.
    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(value).map_err(|e| ConfigError::InvalidOptions(e.to_string()))
    }

    pub fn from_yaml(source: &str) -> Result<Self, ConfigError> {
        if source.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(source).map_err(|e| ConfigError::InvalidOptions(e.to_string()))
    }

    pub fn route(mut self, operation: Operation, options: RouteOptions) -> Self {
        match operation {
            Operation::FindAll => self.routes.find_all = options,
            Operation::FindOne => self.routes.find_one = options,
            Operation::Create => self.routes.create = options,
            Operation::Update => self.routes.update = options,
            Operation::Delete => self.routes.delete = options,
            Operation::Count => self.routes.count = options,
            Operation::FindAllPaginated => self.routes.find_all_paginated = options,
        }
        self
    }
}
