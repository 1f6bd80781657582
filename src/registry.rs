//! Registry of known logical roles
//!
//! Holds the current authoritative set of logical role definitions. Plugins
//! contribute actions at runtime, so the working set is replaceable on
//! demand; dependents are told about replacement through the reload plumbing
//! in [`crate::reload`], not by the registry itself.

use crate::types::{LogicalRole, LogicalRoleName};
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;

/// Process-wide table of known logical roles (authorization actions).
///
/// Binding resolution is permissive of names missing from the registry; an
/// unknown action name in a persisted binding passes through as an opaque
/// string, and its display name is the bare name.
pub struct LogicalRoleRegistry {
    roles: RwLock<Vec<LogicalRole>>,
}

impl LogicalRoleRegistry {
    /// Create a registry with an initial working set
    pub fn new(roles: Vec<LogicalRole>) -> Self {
        Self {
            roles: RwLock::new(roles),
        }
    }

    /// Create an empty registry
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Replace the working set. Idempotent; callers coordinate cache
    /// invalidation through the reload hook.
    pub fn set_logical_roles(&self, roles: Vec<LogicalRole>) {
        debug!(count = roles.len(), "replacing logical role working set");
        *self.roles.write() = roles;
    }

    /// Snapshot of the current working set
    pub fn logical_roles(&self) -> Vec<LogicalRole> {
        self.roles.read().clone()
    }

    /// Display name of an action for a locale.
    ///
    /// Unknown action names return the bare name.
    pub fn display_name(&self, name: &str, locale: &str) -> String {
        let roles = self.roles.read();
        match roles.iter().find(|role| role.name == name) {
            Some(role) => role.display_name(locale).to_string(),
            None => name.to_string(),
        }
    }

    /// Display names of every registered action for a locale
    pub fn display_names_for_locale(&self, locale: &str) -> HashMap<LogicalRoleName, String> {
        let roles = self.roles.read();
        roles
            .iter()
            .map(|role| (role.name.clone(), role.display_name(locale).to_string()))
            .collect()
    }
}
