use std::sync::Arc;

use axum::Router;

use crate::access::{AccessResolver, EVERYONE};
use crate::auth::Authentication;
use crate::config::{GenerateOptions, RootOptions};
use crate::error::ConfigError;
use crate::model::Model;
use crate::routes::{self, RouteDescriptor, RouteGenerator};
use crate::server;

/// Registry of generated routes for any number of models
pub struct Api {
    generator: RouteGenerator,
    models: Vec<Arc<dyn Model>>,
    routes: Vec<RouteDescriptor>,
}

impl Api {
    pub fn new(options: RootOptions) -> Result<Self, ConfigError> {
        options.validate()?;
        Ok(Self {
            generator: RouteGenerator::new(options, None),
            models: Vec::new(),
            routes: Vec::new(),
        })
    }

    /// Register the authentication strategy for routes generated from now on
    pub fn add_authentication(&mut self, authentication: Arc<dyn Authentication>) -> &mut Self {
        tracing::info!("using authentication strategy '{}'", authentication.strategy_name());
        self.generator.add_authentication(authentication);
        self
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn AccessResolver>) -> Self {
        self.generator = self.generator.with_resolver(resolver);
        self
    }

    pub fn models(&self) -> &[Arc<dyn Model>] {
        &self.models
    }

    pub fn routes(&self) -> &[RouteDescriptor] {
        &self.routes
    }

    /// Generate and register the routes of a model.
    ///
    /// Returns the descriptors added for this model. On error nothing is
    /// registered.
    pub fn generate(&mut self, model: Arc<dyn Model>, options: GenerateOptions) -> Result<&[RouteDescriptor], ConfigError> {
        if self.models.iter().any(|m| m.base_route() == model.base_route()) {
            return Err(ConfigError::InvalidModel(format!(
                "routes for '{}' were already generated",
                model.base_route()
            )));
        }

        let generated = routes::generate(&self.generator, model.clone(), &options)?;

        tracing::info!("creating REST routes for {}:", model.table_name());
        for route in &generated {
            let allowed = options
                .routes
                .get(route.operation)
                .restriction()
                .map(|roles| roles.join(","))
                .unwrap_or_else(|| EVERYONE.to_string());
            tracing::info!("--> created {} {} for: {}", route.method, route.path, allowed);
        }

        let start = self.routes.len();
        self.models.push(model);
        self.routes.extend(generated);
        Ok(&self.routes[start..])
    }

    /// Router serving every registered route
    pub fn router(&self) -> Router {
        server::into_router(&self.routes, self.generator.authentication().cloned())
    }
}
