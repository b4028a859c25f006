//! Access scope resolution.
//!
//! Decides which code path a generated handler takes for a request, given the
//! roles granted to the caller and the roles a route allows. The decision is
//! about the *path* only: `OwnerAccess` tells the handler to use the
//! owner-scoped data call, it never checks ownership of a concrete record.

use serde::{Deserialize, Serialize};

/// Reserved role token meaning "restrict to records owned by the caller".
pub const OWNER_ROLE: &str = "$owner";

/// Label used when logging a route that has no role restriction.
pub const EVERYONE: &str = "$everyone";

/// Resolved access decision for one request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessScope {
    /// A named role matched: use the unscoped data call
    AllAccess,
    /// Only `$owner` matched: use the owner-scoped data call
    OwnerAccess,
    /// Nothing matched: reply unauthorized, data layer untouched
    NoAccess,
}

/// Roles granted to the authenticated caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scope {
    Role(String),
    Roles(Vec<String>),
}

impl Scope {
    pub fn roles(&self) -> Vec<&str> {
        match self {
            Scope::Role(role) => vec![role.as_str()],
            Scope::Roles(roles) => roles.iter().map(String::as_str).collect(),
        }
    }
}

impl From<&str> for Scope {
    fn from(role: &str) -> Self {
        Scope::Role(role.to_string())
    }
}

impl From<Vec<String>> for Scope {
    fn from(roles: Vec<String>) -> Self {
        Scope::Roles(roles)
    }
}

impl From<Vec<&str>> for Scope {
    fn from(roles: Vec<&str>) -> Self {
        Scope::Roles(roles.into_iter().map(str::to_string).collect())
    }
}

/// Resolve the access scope of a caller for a route.
///
/// Rules, in order:
/// 1. No allowed roles configured (absent or empty) => `AllAccess`,
///    whether or not the caller has a scope
/// 2. Caller holds a role other than `$owner` that the route allows => `AllAccess`
/// 3. Route allows `$owner` => `OwnerAccess`
/// 4. Otherwise => `NoAccess`
///
/// An empty allowed-roles list is public. Restricting a route requires a
/// non-empty list.
pub fn resolve(user_scope: Option<&Scope>, allowed_roles: Option<&[String]>) -> AccessScope {
    let allowed = match allowed_roles {
        Some(roles) if !roles.is_empty() => roles,
        _ => return AccessScope::AllAccess,
    };

    let allows = |role: &str| allowed.iter().any(|r| r == role);

    // `$owner` is never a named role, whether held alone or in a list
    let named_match = user_scope
        .map(|scope| scope.roles().into_iter().any(|role| role != OWNER_ROLE && allows(role)))
        .unwrap_or(false);
    if named_match {
        return AccessScope::AllAccess;
    }

    if allows(OWNER_ROLE) {
        return AccessScope::OwnerAccess;
    }

    AccessScope::NoAccess
}

/// Pluggable decision point used by the route generator.
///
/// Returning `None` means "no clear decision"; handlers treat that as
/// `AllAccess`. Only a defective resolver should ever return `None`.
pub trait AccessResolver: Send + Sync {
    fn resolve(&self, user_scope: Option<&Scope>, allowed_roles: Option<&[String]>) -> Option<AccessScope>;
}

/// Default resolver backed by [`resolve`]
#[derive(Debug, Clone, Copy, Default)]
pub struct RoleResolver;

impl AccessResolver for RoleResolver {
    fn resolve(&self, user_scope: Option<&Scope>, allowed_roles: Option<&[String]>) -> Option<AccessScope> {
        Some(resolve(user_scope, allowed_roles))
    }
}
