use std::sync::Arc;

use super::descriptor::{AuthConfig, RouteDescriptor};
use super::handler::{build_handler, HandlerContext, OperationCalls};
use crate::access::{AccessResolver, AccessScope, RoleResolver, Scope};
use crate::auth::Authentication;
use crate::config::RootOptions;
use crate::model::Model;
use crate::types::Operation;

/// Builds one route descriptor per (model, operation)
#[derive(Clone)]
pub struct RouteGenerator {
    options: RootOptions,
    authentication: Option<Arc<dyn Authentication>>,
    resolver: Arc<dyn AccessResolver>,
}

impl RouteGenerator {
    pub fn new(options: RootOptions, authentication: Option<Arc<dyn Authentication>>) -> Self {
        Self {
            options,
            authentication,
            resolver: Arc::new(RoleResolver),
        }
    }

    /// Replace the access resolver used by handlers generated from now on
    pub fn with_resolver(mut self, resolver: Arc<dyn AccessResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn add_authentication(&mut self, authentication: Arc<dyn Authentication>) {
        self.authentication = Some(authentication);
    }

    pub fn authentication(&self) -> Option<&Arc<dyn Authentication>> {
        self.authentication.as_ref()
    }

    pub fn options(&self) -> &RootOptions {
        &self.options
    }

    pub fn get_access_scope(&self, user_scope: Option<&Scope>, allowed_roles: Option<&[String]>) -> Option<AccessScope> {
        self.resolver.resolve(user_scope, allowed_roles)
    }

    /// Collection path of a model, e.g. `/api/users`
    pub fn collection_path(&self, model: &dyn Model) -> String {
        format!("{}/{}", self.options.base_path, model.base_route())
    }

    /// Auth block for a route: present only with a registered strategy and a non-empty role list
    fn auth_config(&self, allowed_roles: Option<&[String]>) -> Option<AuthConfig> {
        let authentication = self.authentication.as_ref()?;
        let roles = allowed_roles.filter(|roles| !roles.is_empty())?;
        Some(AuthConfig {
            strategy: authentication.strategy_name().to_string(),
            scope: roles.to_vec(),
        })
    }

    pub fn generate(
        &self,
        model: Arc<dyn Model>,
        operation: Operation,
        allowed_roles: Option<&[String]>,
    ) -> RouteDescriptor {
        let path = format!("{}{}", self.collection_path(model.as_ref()), operation.path_suffix());
        let auth = self.auth_config(allowed_roles);

        let handler = build_handler(HandlerContext {
            model,
            resolver: self.resolver.clone(),
            allowed_roles: allowed_roles.map(<[String]>::to_vec),
            authenticated: self.authentication.is_some(),
            calls: OperationCalls::for_operation(operation),
        });

        RouteDescriptor {
            method: operation.method(),
            path,
            operation,
            handler,
            auth,
        }
    }

    pub fn generate_find_all(&self, model: Arc<dyn Model>, allowed_roles: Option<&[String]>) -> RouteDescriptor {
        self.generate(model, Operation::FindAll, allowed_roles)
    }
}
