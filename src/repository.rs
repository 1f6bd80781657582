//! Content-repository capability for binding nodes
//!
//! The durable side of role bindings lives in the platform's content
//! repository, in a hierarchical namespace rooted at each tenant's
//! `.authz/roleBased/runtimeRoles` folder. This module defines the narrow
//! [`Repository`] trait the core consumes, the node-name codec that keeps
//! arbitrary runtime role names legal (and collision-free) as child node
//! names, and an in-memory implementation for tests and embedding.
//!
//! Transactional commit semantics are assumed per single top-level call;
//! retries, if any, belong to the implementation behind the trait.

use crate::error::{AuthzError, Result};
use crate::types::{LogicalRoleName, Tenant};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Authorization namespace folder under a tenant root
pub const FOLDER_NAME_AUTHZ: &str = ".authz";

/// Role-based policy folder under the authorization namespace
pub const FOLDER_NAME_ROLE_BASED: &str = "roleBased";

/// Folder holding one child node per bound runtime role
pub const FOLDER_NAME_RUNTIME_ROLES: &str = "runtimeRoles";

/// Handle to a tenant's runtime-roles folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderHandle {
    /// Tenant the folder belongs to
    pub tenant_id: String,

    /// Absolute repository path of the folder
    pub path: String,
}

/// Repository path of a tenant's runtime-roles folder
pub fn runtime_roles_folder_path(tenant: &Tenant) -> String {
    format!(
        "/{}/{}/{}/{}",
        tenant.id, FOLDER_NAME_AUTHZ, FOLDER_NAME_ROLE_BASED, FOLDER_NAME_RUNTIME_ROLES
    )
}

/// Encode a runtime role name as a repository node name.
///
/// Letters, digits, spaces, `_`, `-` and `.` pass through; every other byte
/// becomes `%XX`. Encoding the escape character itself keeps the mapping
/// injective, so two distinct role names can never collide on one node.
pub fn encode_node_name(name: &str) -> String {
    let mut encoded = String::with_capacity(name.len());
    for byte in name.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b' ' | b'_' | b'-' | b'.' => {
                encoded.push(byte as char);
            }
            _ => {
                encoded.push('%');
                encoded.push_str(&format!("{:02X}", byte));
            }
        }
    }
    encoded
}

/// Decode a repository node name back into a runtime role name.
///
/// Malformed escapes are kept literally rather than rejected; node names are
/// produced by [`encode_node_name`] and foreign names still round-trip as
/// opaque strings.
pub fn decode_node_name(encoded: &str) -> String {
    let bytes = encoded.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            if let Some(hex) = encoded.get(i + 1..i + 3) {
                if let Ok(byte) = u8::from_str_radix(hex, 16) {
                    decoded.push(byte);
                    i += 3;
                    continue;
                }
            }
        }
        decoded.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&decoded).into_owned()
}

/// Narrow content-repository capability consumed by the binding store.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Resolve (creating on demand) the tenant's runtime-roles folder.
    async fn get_or_create_runtime_roles_folder(&self, tenant: &Tenant) -> Result<FolderHandle>;

    /// All child binding nodes of the folder as `(encoded name, bound roles)`.
    async fn list_child_binding_nodes(
        &self,
        folder: &FolderHandle,
    ) -> Result<Vec<(String, Vec<LogicalRoleName>)>>;

    /// One binding node by encoded name, `None` when absent.
    async fn get_binding_node(
        &self,
        folder: &FolderHandle,
        encoded_name: &str,
    ) -> Result<Option<Vec<LogicalRoleName>>>;

    /// Create or replace a binding node. Committed when the call returns.
    async fn write_binding_node(
        &self,
        folder: &FolderHandle,
        encoded_name: &str,
        logical_role_names: &[LogicalRoleName],
    ) -> Result<()>;
}

/// In-memory repository implementation
pub struct InMemoryRepository {
    folders: Arc<RwLock<HashMap<String, BTreeMap<String, Vec<LogicalRoleName>>>>>,
}

impl InMemoryRepository {
    /// Create an empty in-memory repository
    pub fn new() -> Self {
        Self {
            folders: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn get_or_create_runtime_roles_folder(&self, tenant: &Tenant) -> Result<FolderHandle> {
        let path = runtime_roles_folder_path(tenant);
        let mut folders = self.folders.write().await;
        folders.entry(path.clone()).or_default();
        Ok(FolderHandle {
            tenant_id: tenant.id.clone(),
            path,
        })
    }

    async fn list_child_binding_nodes(
        &self,
        folder: &FolderHandle,
    ) -> Result<Vec<(String, Vec<LogicalRoleName>)>> {
        let folders = self.folders.read().await;
        let nodes = folders
            .get(&folder.path)
            .ok_or_else(|| AuthzError::RepositoryAccess(format!("no such folder: {}", folder.path)))?;
        Ok(nodes
            .iter()
            .map(|(name, roles)| (name.clone(), roles.clone()))
            .collect())
    }

    async fn get_binding_node(
        &self,
        folder: &FolderHandle,
        encoded_name: &str,
    ) -> Result<Option<Vec<LogicalRoleName>>> {
        let folders = self.folders.read().await;
        let nodes = folders
            .get(&folder.path)
            .ok_or_else(|| AuthzError::RepositoryAccess(format!("no such folder: {}", folder.path)))?;
        Ok(nodes.get(encoded_name).cloned())
    }

    async fn write_binding_node(
        &self,
        folder: &FolderHandle,
        encoded_name: &str,
        logical_role_names: &[LogicalRoleName],
    ) -> Result<()> {
        let mut folders = self.folders.write().await;
        let nodes = folders
            .get_mut(&folder.path)
            .ok_or_else(|| AuthzError::RepositoryAccess(format!("no such folder: {}", folder.path)))?;
        nodes.insert(encoded_name.to_string(), logical_role_names.to_vec());
        Ok(())
    }
}
