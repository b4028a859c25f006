use std::sync::Arc;

use super::descriptor::RouteDescriptor;
use super::generator::RouteGenerator;
use crate::config::options::is_path_segment;
use crate::config::GenerateOptions;
use crate::error::ConfigError;
use crate::model::Model;
use crate::types::Operation;

/// Reject models whose route segment would not produce a usable path
pub fn validate_model(model: &dyn Model) -> Result<(), ConfigError> {
    let route = model.base_route();
    if route.is_empty() {
        return Err(ConfigError::InvalidModel("model has an empty base route".to_string()));
    }
    if !is_path_segment(route) {
        return Err(ConfigError::InvalidModel(format!(
            "base route '{}' may only contain letters, digits, '-', '_' and '.'",
            route
        )));
    }
    Ok(())
}

/// Generate the routes of one model, in fixed operation order.
///
/// Disabled operations contribute nothing. Any configuration error aborts
/// generation before a single descriptor is built.
pub fn generate(
    generator: &RouteGenerator,
    model: Arc<dyn Model>,
    options: &GenerateOptions,
) -> Result<Vec<RouteDescriptor>, ConfigError> {
    generator.options().validate()?;
    validate_model(model.as_ref())?;

    let routes = Operation::ALL
        .iter()
        .filter_map(|operation| {
            let route_options = options.routes.get(*operation);
            route_options.is_enabled.then(|| {
                generator.generate(model.clone(), *operation, route_options.allowed_roles.as_deref())
            })
        })
        .collect();

    Ok(routes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RootOptions, RouteOptions};
    use crate::model::MemoryModel;
    use serde_json::json;

    #[test]
    fn disabled_operations_are_skipped() {
        let generator = RouteGenerator::new(RootOptions::default(), None);
        let options = GenerateOptions::from_value(json!({
            "routes": {
                "findAll": { "isEnabled": true },
                "findOne": { "isEnabled": false },
                "create": { "isEnabled": false },
                "update": { "isEnabled": false },
                "delete": { "isEnabled": false },
                "count": { "isEnabled": false },
                "findAllPaginated": { "isEnabled": false }
            }
        }))
        .unwrap();

        let routes = generate(&generator, Arc::new(MemoryModel::new("users")), &options).unwrap();
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].operation, Operation::FindAll);
        assert_eq!(routes[0].path, "/users");
    }

    #[test]
    fn defaults_generate_every_operation_in_order() {
        let generator = RouteGenerator::new(RootOptions::default(), None);
        let routes = generate(&generator, Arc::new(MemoryModel::new("users")), &GenerateOptions::default()).unwrap();
        let order: Vec<Operation> = routes.iter().map(|r| r.operation).collect();
        assert_eq!(order, Operation::ALL.to_vec());
    }

    #[test]
    fn per_route_roles_are_applied() {
        let generator = RouteGenerator::new(RootOptions::default(), None);
        let options = GenerateOptions::default()
            .route(Operation::Delete, RouteOptions::allow(["admin"]))
            .route(Operation::Count, RouteOptions::disabled());
        let routes = generate(&generator, Arc::new(MemoryModel::new("users")), &options).unwrap();
        assert_eq!(routes.len(), 6);
        assert!(routes.iter().all(|r| r.operation != Operation::Count));
    }

    #[test]
    fn invalid_model_produces_nothing() {
        let generator = RouteGenerator::new(RootOptions::default(), None);
        for route in ["", "users/1", ":id", "a b"] {
            let err = generate(&generator, Arc::new(MemoryModel::new(route)), &GenerateOptions::default()).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidModel(_)), "accepted '{}'", route);
        }
    }

    #[test]
    fn invalid_base_path_produces_nothing() {
        let generator = RouteGenerator::new(RootOptions { base_path: "api/".into() }, None);
        let err = generate(&generator, Arc::new(MemoryModel::new("users")), &GenerateOptions::default()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBasePath(_)));
    }
}
