//! Logical-role binding resolution
//!
//! The central query of the authorization core: given a tenant and a set of
//! runtime role names, which logical roles do they grant? The resolver owns
//! no durable state. It orchestrates the [`BindingStore`], the
//! [`BindingCache`] and the immutable configuration table, keeping the cache
//! populated with every fully resolved role, empty results included.

use crate::cache::BindingCache;
use crate::registry::LogicalRoleRegistry;
use crate::store::BindingStore;
use crate::tenant::TenantResolver;
use crate::types::{LogicalRoleName, RoleId, RuntimeRoleName, Tenant};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// Administrative view of a tenant's bindings: localized action display
/// names, the full binding map, and which runtime roles are immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleBindingSnapshot {
    /// Display name per known logical role, for one locale
    pub display_names: HashMap<LogicalRoleName, String>,

    /// Persisted-or-bootstrap bindings overlaid with immutable entries
    pub bindings: HashMap<RuntimeRoleName, Vec<LogicalRoleName>>,

    /// Runtime roles whose bindings cannot be edited
    pub immutable_role_names: HashSet<RuntimeRoleName>,
}

/// Resolves runtime roles to the logical roles they grant
pub struct RoleBindingResolver {
    store: Arc<BindingStore>,
    cache: BindingCache,
    registry: Arc<LogicalRoleRegistry>,
    tenants: Arc<dyn TenantResolver>,
}

impl RoleBindingResolver {
    /// Create a resolver over its collaborators
    pub fn new(
        store: Arc<BindingStore>,
        cache: BindingCache,
        registry: Arc<LogicalRoleRegistry>,
        tenants: Arc<dyn TenantResolver>,
    ) -> Self {
        Self {
            store,
            cache,
            registry,
            tenants,
        }
    }

    /// The registry backing display-name lookups
    pub fn registry(&self) -> &Arc<LogicalRoleRegistry> {
        &self.registry
    }

    /// Logical roles granted by the given runtime roles.
    ///
    /// With no tenant, each role name resolves against its own embedded
    /// tenant; the superadmin role name is recognized literally and
    /// contributes its immutable logical roles without tenant resolution.
    pub async fn resolve(
        &self,
        tenant: Option<&Tenant>,
        runtime_role_names: &[RuntimeRoleName],
    ) -> Result<HashSet<LogicalRoleName>> {
        match tenant {
            Some(tenant) => self.resolve_for_tenant(tenant, runtime_role_names).await,
            None => self.resolve_untenanted(runtime_role_names).await,
        }
    }

    async fn resolve_untenanted(
        &self,
        runtime_role_names: &[RuntimeRoleName],
    ) -> Result<HashSet<LogicalRoleName>> {
        let mut bound: HashSet<LogicalRoleName> = HashSet::new();
        let mut by_tenant: HashMap<Tenant, Vec<RuntimeRoleName>> = HashMap::new();
        let mut include_superadmin = false;

        for runtime_role_name in runtime_role_names {
            if runtime_role_name == self.store.superadmin_role() {
                include_superadmin = true;
            } else {
                let tenant = self.tenants.tenant_of(runtime_role_name);
                by_tenant
                    .entry(tenant)
                    .or_default()
                    .push(self.tenants.principal_name_of(runtime_role_name));
            }
        }

        for (tenant, names) in &by_tenant {
            bound.extend(self.resolve_for_tenant(tenant, names).await?);
        }
        if include_superadmin {
            if let Some(logical_roles) = self.store.immutable_binding(self.store.superadmin_role())
            {
                bound.extend(logical_roles.iter().cloned());
            }
        }
        Ok(bound)
    }

    async fn resolve_for_tenant(
        &self,
        tenant: &Tenant,
        runtime_role_names: &[RuntimeRoleName],
    ) -> Result<HashSet<LogicalRoleName>> {
        if !self.tenants.is_accessible(tenant) {
            return Ok(HashSet::new());
        }

        // Split the request into cache hits and roles still needing the store
        let mut cached: HashSet<LogicalRoleName> = HashSet::new();
        let mut uncached: Vec<(RuntimeRoleName, RoleId)> = Vec::new();
        for runtime_role_name in runtime_role_names {
            let principal_name = self.tenants.principal_name_of(runtime_role_name);
            let role_id = self.tenants.principal_id_of(tenant, runtime_role_name);
            match self.cache.get(&role_id) {
                Some(names) => cached.extend(names),
                None => uncached.push((principal_name, role_id)),
            }
        }
        if uncached.is_empty() {
            // Every requested role was cached; skip the store entirely
            debug!(tenant = %tenant, "role binding resolution served from cache");
            return Ok(cached);
        }
        debug!(
            tenant = %tenant,
            cached = runtime_role_names.len() - uncached.len(),
            uncached = uncached.len(),
            "resolving role bindings"
        );

        let uncached_names: Vec<RuntimeRoleName> =
            uncached.iter().map(|(name, _)| name.clone()).collect();
        let mut resolved = self.store.get_bindings(tenant, &uncached_names).await?;

        // Immutable entries are granted on top of whatever was persisted
        for (principal_name, role_id) in &uncached {
            if let Some(logical_roles) = self.store.immutable_binding(principal_name) {
                resolved
                    .entry(role_id.clone())
                    .or_default()
                    .extend(logical_roles.iter().cloned());
            }
        }

        // Every uncached role becomes a cache entry, an empty one when it has
        // no bindings, so the next lookup is a hit either way
        let mut fresh: HashSet<LogicalRoleName> = HashSet::new();
        for (_, role_id) in &uncached {
            let names = resolved.get(role_id).cloned().unwrap_or_default();
            fresh.extend(names.iter().cloned());
            self.cache.put(role_id, names);
        }

        cached.extend(fresh);
        Ok(cached)
    }

    /// Write one runtime role's binding and update the cache write-through.
    ///
    /// With no tenant, the tenant and bare principal name are derived from
    /// the role name itself.
    pub async fn set_binding(
        &self,
        tenant: Option<&Tenant>,
        runtime_role_name: &str,
        logical_role_names: &[LogicalRoleName],
    ) -> Result<()> {
        let (tenant, principal_name) = match tenant {
            Some(tenant) => (tenant.clone(), runtime_role_name.to_string()),
            None => (
                self.tenants.tenant_of(runtime_role_name),
                self.tenants.principal_name_of(runtime_role_name),
            ),
        };

        self.store
            .set_bindings(&tenant, &principal_name, logical_role_names)
            .await?;

        // Write-through rather than invalidate: the written set is the
        // resolved set for this role
        let role_id = self.tenants.principal_id_of(&tenant, &principal_name);
        self.cache
            .put(&role_id, logical_role_names.iter().cloned().collect());
        Ok(())
    }

    /// Full binding map for a tenant, immutable entries included
    pub async fn list_all_bindings(
        &self,
        tenant: Option<&Tenant>,
    ) -> Result<HashMap<RuntimeRoleName, Vec<LogicalRoleName>>> {
        self.store.get_all_bindings(tenant).await
    }

    /// Administrative snapshot of a tenant's bindings for one locale
    pub async fn binding_snapshot(
        &self,
        tenant: Option<&Tenant>,
        locale: &str,
    ) -> Result<RoleBindingSnapshot> {
        Ok(RoleBindingSnapshot {
            display_names: self.registry.display_names_for_locale(locale),
            bindings: self.store.get_all_bindings(tenant).await?,
            immutable_role_names: self.store.immutable_role_names(),
        })
    }
}
