//! Core role-binding types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Tenant-scoped identifier of a resolved runtime role
pub type RoleId = String;

/// Name of a runtime (directory/group) role
pub type RuntimeRoleName = String;

/// Name of a logical role (authorization action)
pub type LogicalRoleName = String;

/// A tenant of the platform
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tenant {
    /// Tenant identifier (e.g., "acme")
    pub id: String,
}

impl Tenant {
    /// Create a tenant from an identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl std::fmt::Display for Tenant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.id)
    }
}

/// A logical role: a named abstract permission independent of any identity
/// provider, with localizable display names.
///
/// Identity is the name. Two registry entries with the same name describe the
/// same action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicalRole {
    /// Action name (e.g., "PublishAction")
    pub name: String,

    /// Display name used when no locale-specific one exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_display_name: Option<String>,

    /// Display names keyed by locale string (e.g., "en", "de-AT")
    #[serde(default)]
    pub localized_display_names: HashMap<String, String>,
}

impl LogicalRole {
    /// Create a logical role with no display names
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default_display_name: None,
            localized_display_names: HashMap::new(),
        }
    }

    /// Set the default display name
    pub fn with_default_display_name(mut self, display: impl Into<String>) -> Self {
        self.default_display_name = Some(display.into());
        self
    }

    /// Add a display name for one locale
    pub fn with_display_name(
        mut self,
        locale: impl Into<String>,
        display: impl Into<String>,
    ) -> Self {
        self.localized_display_names
            .insert(locale.into(), display.into());
        self
    }

    /// Display name for a locale.
    ///
    /// Falls back from the exact locale to its bare language tag, then to the
    /// default display name, then to the action name itself.
    pub fn display_name(&self, locale: &str) -> &str {
        if let Some(display) = self.localized_display_names.get(locale) {
            return display;
        }
        if let Some(language) = locale.split(['-', '_']).next() {
            if language != locale {
                if let Some(display) = self.localized_display_names.get(language) {
                    return display;
                }
            }
        }
        self.default_display_name.as_deref().unwrap_or(&self.name)
    }
}
