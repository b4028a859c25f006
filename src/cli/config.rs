use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::config::{GenerateOptions, RouteOptions, RoutesConfig};
use crate::model::MemoryModel;

/// Models served by `roadwork serve`, read from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ServeConfig {
    /// Overrides the configured base path when set
    #[serde(default)]
    pub base_path: Option<String>,
    pub models: Vec<ModelConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ModelConfig {
    pub route: String,
    #[serde(default)]
    pub owner_field: Option<String>,
    #[serde(default)]
    pub records: Vec<Value>,
    #[serde(default)]
    pub routes: RoutesConfig,
}

impl ModelConfig {
    pub fn model(&self) -> Arc<MemoryModel> {
        let mut model = MemoryModel::new(&self.route);
        if let Some(field) = &self.owner_field {
            model = model.with_owner_field(field);
        }
        Arc::new(model.with_records(self.records.clone()))
    }

    pub fn options(&self) -> GenerateOptions {
        GenerateOptions {
            routes: self.routes.clone(),
        }
    }
}

impl ServeConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let source = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_yaml::from_str(&source)
            .with_context(|| format!("invalid route configuration in {}", path.display()))
    }

    pub fn load_or_demo(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::demo()),
        }
    }

    /// Single `tasks` model: public reads, owner-or-admin writes
    pub fn demo() -> Self {
        let owner_or_admin = || RouteOptions::allow(["admin", "$owner"]);
        Self {
            base_path: None,
            models: vec![ModelConfig {
                route: "tasks".to_string(),
                owner_field: None,
                records: vec![
                    json!({ "title": "Write the release notes", "user_id": "1" }),
                    json!({ "title": "Review open pull requests", "user_id": "2" }),
                ],
                routes: RoutesConfig {
                    update: owner_or_admin(),
                    delete: owner_or_admin(),
                    ..RoutesConfig::default()
                },
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_yaml_models() {
        let config: ServeConfig = serde_yaml::from_str(
            r#"
basePath: /api
models:
  - route: notes
    ownerField: author
    records:
      - { title: hello, author: "7" }
    routes:
      findAll: { allowedRoles: [admin, $owner] }
      delete: { isEnabled: false }
"#,
        )
        .unwrap();

        assert_eq!(config.base_path.as_deref(), Some("/api"));
        let notes = &config.models[0];
        assert_eq!(notes.route, "notes");
        assert_eq!(notes.records.len(), 1);
        assert!(!notes.options().routes.delete.is_enabled);
        assert!(notes.options().routes.find_all.restriction().is_some());
    }

    #[test]
    fn unknown_model_keys_are_rejected() {
        let result: Result<ServeConfig, _> = serde_yaml::from_str("models:\n  - route: notes\n    color: red\n");
        assert!(result.is_err());
    }
}
