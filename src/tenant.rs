//! Tenant derivation from runtime role names
//!
//! Runtime role names may embed the tenant they belong to. The
//! [`TenantResolver`] seam hides the encoding from the rest of the core:
//! the resolver and store only ever ask for the tenant, the bare principal
//! name, or the tenant-scoped role id.

use crate::types::{RoleId, Tenant};
use std::collections::HashSet;

/// Maps runtime role names to tenants and tenant-scoped identifiers.
pub trait TenantResolver: Send + Sync {
    /// The platform's default tenant
    fn default_tenant(&self) -> Tenant;

    /// Tenant a role name belongs to. Names without an embedded tenant
    /// resolve to the platform's default tenant.
    fn tenant_of(&self, role_name: &str) -> Tenant;

    /// Whether the tenant is administratively enabled and visible.
    fn is_accessible(&self, tenant: &Tenant) -> bool;

    /// The bare principal name with any tenant qualifier stripped.
    fn principal_name_of(&self, role_name: &str) -> String;

    /// The tenant-scoped identifier used as the cache key for a role.
    fn principal_id_of(&self, tenant: &Tenant, role_name: &str) -> RoleId;
}

/// Default resolver for `"{tenant}/{principal}"` role names.
///
/// A name without a separator belongs to the configured default tenant.
#[derive(Debug, Clone)]
pub struct DelimitedTenantResolver {
    default_tenant: String,
    disabled_tenants: HashSet<String>,
}

const TENANT_SEPARATOR: char = '/';

impl DelimitedTenantResolver {
    /// Create a resolver with the given default tenant id
    pub fn new(default_tenant: impl Into<String>) -> Self {
        Self {
            default_tenant: default_tenant.into(),
            disabled_tenants: HashSet::new(),
        }
    }

    /// Mark a tenant as administratively disabled
    pub fn with_disabled_tenant(mut self, tenant_id: impl Into<String>) -> Self {
        self.disabled_tenants.insert(tenant_id.into());
        self
    }

    fn split(role_name: &str) -> Option<(&str, &str)> {
        role_name
            .split_once(TENANT_SEPARATOR)
            .filter(|(tenant, principal)| !tenant.is_empty() && !principal.is_empty())
    }
}

impl TenantResolver for DelimitedTenantResolver {
    fn default_tenant(&self) -> Tenant {
        Tenant::new(self.default_tenant.clone())
    }

    fn tenant_of(&self, role_name: &str) -> Tenant {
        match Self::split(role_name) {
            Some((tenant, _)) => Tenant::new(tenant),
            None => Tenant::new(self.default_tenant.clone()),
        }
    }

    fn is_accessible(&self, tenant: &Tenant) -> bool {
        !self.disabled_tenants.contains(&tenant.id)
    }

    fn principal_name_of(&self, role_name: &str) -> String {
        match Self::split(role_name) {
            Some((_, principal)) => principal.to_string(),
            None => role_name.to_string(),
        }
    }

    fn principal_id_of(&self, tenant: &Tenant, role_name: &str) -> RoleId {
        format!("{}:{}", tenant.id, self.principal_name_of(role_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_tenant() {
        let resolver = DelimitedTenantResolver::new("default");

        assert_eq!(resolver.tenant_of("acme/Report Author"), Tenant::new("acme"));
        assert_eq!(resolver.principal_name_of("acme/Report Author"), "Report Author");
    }

    #[test]
    fn test_plain_name_uses_default_tenant() {
        let resolver = DelimitedTenantResolver::new("default");

        assert_eq!(resolver.tenant_of("Report Author"), Tenant::new("default"));
        assert_eq!(resolver.principal_name_of("Report Author"), "Report Author");
    }

    #[test]
    fn test_principal_id_is_tenant_scoped() {
        let resolver = DelimitedTenantResolver::new("default");
        let tenant = Tenant::new("acme");

        assert_eq!(
            resolver.principal_id_of(&tenant, "acme/Report Author"),
            "acme:Report Author"
        );
        // Already-bare names produce the same id
        assert_eq!(
            resolver.principal_id_of(&tenant, "Report Author"),
            "acme:Report Author"
        );
    }

    #[test]
    fn test_disabled_tenant() {
        let resolver =
            DelimitedTenantResolver::new("default").with_disabled_tenant("archived");

        assert!(resolver.is_accessible(&Tenant::new("acme")));
        assert!(!resolver.is_accessible(&Tenant::new("archived")));
    }
}
