//! # Quarry Authorization Core
//!
//! Role-binding resolution and composite authorization decisions for the
//! Quarry content platform.
//!
//! ## Features
//!
//! - **Logical-role binding resolution** mapping directory/group roles to
//!   abstract authorization actions, scoped per tenant
//! - **Immutable and bootstrap bindings** with configuration-time precedence
//! - **Read-through binding cache** invalidated wholesale on plugin reload
//! - **Composite rule evaluation** with explicit combining policies and
//!   short-circuit on immutable decisions
//! - **Narrow collaborator seams** (`Repository`, `RegionCache`,
//!   `TenantResolver`, `ReloadNotifier`) with in-memory implementations
//!
//! ## Example
//!
//! ```rust
//! use quarry_authz::{
//!     AuthorizationEngine, BindingCache, BindingConfig, BindingStore, DelimitedTenantResolver,
//!     InMemoryRegionCache, InMemoryRepository, LogicalRoleRegistry, RoleBindingResolver, Tenant,
//! };
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let tenants = Arc::new(DelimitedTenantResolver::new("default"));
//! let config = BindingConfig::new("SysAdmin")
//!     .with_bootstrap_binding("Report Author", vec!["PublishAction".to_string()]);
//! let store = Arc::new(BindingStore::new(
//!     Arc::new(InMemoryRepository::new()),
//!     tenants.clone(),
//!     config,
//! ));
//! let cache = BindingCache::new(Arc::new(InMemoryRegionCache::new()));
//! let registry = Arc::new(LogicalRoleRegistry::empty());
//! let resolver = Arc::new(RoleBindingResolver::new(store, cache, registry, tenants));
//! let engine = AuthorizationEngine::new(resolver);
//!
//! let tenant = Tenant::new("acme");
//! let granted = engine
//!     .resolve(Some(&tenant), &["Report Author".to_string()])
//!     .await?;
//! assert!(granted.contains("PublishAction"));
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod engine;
pub mod error;
pub mod registry;
pub mod reload;
pub mod repository;
pub mod resolver;
pub mod rules;
pub mod store;
pub mod tenant;
pub mod types;

// Re-export commonly used types
pub use cache::{BindingCache, InMemoryRegionCache, RegionCache};
pub use engine::AuthorizationEngine;
pub use error::{AuthzError, Result};
pub use registry::LogicalRoleRegistry;
pub use reload::{
    LogicalRoleProvider, RegistryReloadHook, ReloadBus, ReloadNotifier, ReloadObserver,
    SubscriptionHandle,
};
pub use repository::{FolderHandle, InMemoryRepository, Repository};
pub use resolver::{RoleBindingResolver, RoleBindingSnapshot};
pub use rules::{
    AuthorizationContext, AuthorizationDecision, AuthorizationRequest, AuthorizationRule,
    CombiningPolicy, CompositeAuthorizationRule, EvaluationContext, LogicalRoleRule,
    RequestSubject,
};
pub use store::{BindingConfig, BindingStore};
pub use tenant::{DelimitedTenantResolver, TenantResolver};
pub use types::{LogicalRole, LogicalRoleName, RoleId, RuntimeRoleName, Tenant};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
