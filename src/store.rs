//! Durable role-binding store
//!
//! CRUD over the `runtime role -> [logical role]` mapping, scoped by tenant,
//! on top of the [`Repository`] capability. The store owns the two
//! configuration-time tables:
//!
//! - **immutable bindings** can never be altered through the mutation API and
//!   are always merged into read results;
//! - **bootstrap bindings** serve a tenant only while its runtime-roles
//!   folder holds zero binding nodes, and are seeded durably by the first
//!   write for that tenant.

use crate::error::{AuthzError, Result};
use crate::repository::{encode_node_name, Repository};
use crate::tenant::TenantResolver;
use crate::types::{LogicalRoleName, RoleId, RuntimeRoleName, Tenant};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info};

/// Configuration-time binding tables
#[derive(Debug, Clone, Default)]
pub struct BindingConfig {
    /// Bindings fixed by configuration, never user-editable
    pub immutable_bindings: HashMap<RuntimeRoleName, Vec<LogicalRoleName>>,

    /// Defaults served until a tenant's binding space is first written
    pub bootstrap_bindings: HashMap<RuntimeRoleName, Vec<LogicalRoleName>>,

    /// Role name granted the superadmin's immutable logical roles without
    /// tenant resolution
    pub superadmin_role: RuntimeRoleName,
}

impl BindingConfig {
    /// Create a config with the given superadmin role and empty tables
    pub fn new(superadmin_role: impl Into<String>) -> Self {
        Self {
            immutable_bindings: HashMap::new(),
            bootstrap_bindings: HashMap::new(),
            superadmin_role: superadmin_role.into(),
        }
    }

    /// Add an immutable binding
    pub fn with_immutable_binding(
        mut self,
        runtime_role: impl Into<String>,
        logical_roles: Vec<LogicalRoleName>,
    ) -> Self {
        self.immutable_bindings.insert(runtime_role.into(), logical_roles);
        self
    }

    /// Add a bootstrap binding
    pub fn with_bootstrap_binding(
        mut self,
        runtime_role: impl Into<String>,
        logical_roles: Vec<LogicalRoleName>,
    ) -> Self {
        self.bootstrap_bindings.insert(runtime_role.into(), logical_roles);
        self
    }
}

/// Persistence adapter for role bindings
pub struct BindingStore {
    repository: Arc<dyn Repository>,
    tenants: Arc<dyn TenantResolver>,
    config: BindingConfig,
}

impl BindingStore {
    /// Create a store over a repository and tenant resolver
    pub fn new(
        repository: Arc<dyn Repository>,
        tenants: Arc<dyn TenantResolver>,
        config: BindingConfig,
    ) -> Self {
        Self {
            repository,
            tenants,
            config,
        }
    }

    /// Whether a runtime role name is protected by configuration
    pub fn is_immutable(&self, runtime_role_name: &str) -> bool {
        self.config.immutable_bindings.contains_key(runtime_role_name)
    }

    /// Immutable logical roles of a runtime role, if it has any
    pub fn immutable_binding(&self, runtime_role_name: &str) -> Option<&[LogicalRoleName]> {
        self.config
            .immutable_bindings
            .get(runtime_role_name)
            .map(|names| names.as_slice())
    }

    /// Names of every immutable runtime role
    pub fn immutable_role_names(&self) -> HashSet<RuntimeRoleName> {
        self.config.immutable_bindings.keys().cloned().collect()
    }

    /// The configured superadmin role name
    pub fn superadmin_role(&self) -> &str {
        &self.config.superadmin_role
    }

    /// Persisted bindings of a tenant, or the bootstrap table while the
    /// tenant's binding space has never been written.
    ///
    /// Inaccessible tenants read as empty. Immutable entries are not part of
    /// this view; see [`BindingStore::get_all_bindings`].
    pub async fn list_bindings(
        &self,
        tenant: Option<&Tenant>,
    ) -> Result<HashMap<RuntimeRoleName, Vec<LogicalRoleName>>> {
        let default_tenant;
        let tenant = match tenant {
            Some(tenant) => tenant,
            None => {
                default_tenant = self.tenants.default_tenant();
                &default_tenant
            }
        };
        if !self.tenants.is_accessible(tenant) {
            return Ok(HashMap::new());
        }

        let folder = self.repository.get_or_create_runtime_roles_folder(tenant).await?;
        let children = self.repository.list_child_binding_nodes(&folder).await?;
        if children.is_empty() {
            // No bindings written yet; serve the bootstrap table
            debug!(tenant = %tenant, "serving bootstrap bindings");
            return Ok(self.config.bootstrap_bindings.clone());
        }

        Ok(children
            .into_iter()
            .map(|(encoded_name, logical_roles)| {
                (crate::repository::decode_node_name(&encoded_name), logical_roles)
            })
            .collect())
    }

    /// Persisted-or-bootstrap bindings for the requested subset only, keyed
    /// by tenant-scoped role id.
    ///
    /// The bootstrap fallback applies per tenant, not per role: it is
    /// consulted only when the tenant has no binding nodes at all. A missing
    /// node for a requested role is not an error; the role is simply absent
    /// from the result.
    pub async fn get_bindings(
        &self,
        tenant: &Tenant,
        runtime_role_names: &[RuntimeRoleName],
    ) -> Result<HashMap<RoleId, HashSet<LogicalRoleName>>> {
        let mut bindings: HashMap<RoleId, HashSet<LogicalRoleName>> = HashMap::new();
        if !self.tenants.is_accessible(tenant) {
            return Ok(bindings);
        }

        let folder = self.repository.get_or_create_runtime_roles_folder(tenant).await?;
        let children = self.repository.list_child_binding_nodes(&folder).await?;
        if children.is_empty() {
            // No bindings written yet; resolve from the bootstrap table
            for runtime_role_name in runtime_role_names {
                if let Some(logical_roles) = self.config.bootstrap_bindings.get(runtime_role_name) {
                    let role_id = self.tenants.principal_id_of(tenant, runtime_role_name);
                    bindings
                        .entry(role_id)
                        .or_default()
                        .extend(logical_roles.iter().cloned());
                }
            }
            return Ok(bindings);
        }

        for runtime_role_name in runtime_role_names {
            let encoded_name = encode_node_name(runtime_role_name);
            if let Some(logical_roles) =
                self.repository.get_binding_node(&folder, &encoded_name).await?
            {
                let role_id = self.tenants.principal_id_of(tenant, runtime_role_name);
                bindings
                    .entry(role_id)
                    .or_default()
                    .extend(logical_roles.into_iter());
            }
        }
        Ok(bindings)
    }

    /// Create or replace one runtime role's binding.
    ///
    /// The first write for a tenant with zero existing bindings seeds every
    /// bootstrap binding durably before applying the requested write; the
    /// bootstrap table is never consulted for that tenant again.
    pub async fn set_bindings(
        &self,
        tenant: &Tenant,
        runtime_role_name: &str,
        logical_role_names: &[LogicalRoleName],
    ) -> Result<()> {
        // Reject protected roles before anything is written so a failed call
        // leaves no partial state behind
        if self.is_immutable(runtime_role_name) {
            return Err(AuthzError::ImmutableRole(runtime_role_name.to_string()));
        }
        if !self.tenants.is_accessible(tenant) {
            return Err(AuthzError::NotFound(format!("tenant '{}' not found", tenant)));
        }

        let folder = self.repository.get_or_create_runtime_roles_folder(tenant).await?;
        let children = self.repository.list_child_binding_nodes(&folder).await?;
        if children.is_empty() {
            // First write for this tenant: make the bootstrap defaults
            // durable so they survive the switch away from the bootstrap
            // table
            info!(tenant = %tenant, "seeding bootstrap bindings on first write");
            for (bootstrap_role, bootstrap_logical_roles) in &self.config.bootstrap_bindings {
                self.repository
                    .write_binding_node(
                        &folder,
                        &encode_node_name(bootstrap_role),
                        bootstrap_logical_roles,
                    )
                    .await?;
            }
        }

        self.repository
            .write_binding_node(&folder, &encode_node_name(runtime_role_name), logical_role_names)
            .await?;
        info!(
            tenant = %tenant,
            runtime_role = runtime_role_name,
            count = logical_role_names.len(),
            "role binding written"
        );
        Ok(())
    }

    /// Union view: persisted-or-bootstrap bindings overlaid with every
    /// immutable entry. Immutable entries take precedence on key collision.
    pub async fn get_all_bindings(
        &self,
        tenant: Option<&Tenant>,
    ) -> Result<HashMap<RuntimeRoleName, Vec<LogicalRoleName>>> {
        let mut bindings = self.list_bindings(tenant).await?;
        for (runtime_role, logical_roles) in &self.config.immutable_bindings {
            bindings.insert(runtime_role.clone(), logical_roles.clone());
        }
        Ok(bindings)
    }
}
