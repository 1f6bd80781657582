//! Shared fixtures for integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use quarry_authz::{
    AuthorizationEngine, BindingCache, BindingConfig, BindingStore, DelimitedTenantResolver,
    FolderHandle, InMemoryRegionCache, InMemoryRepository, LogicalRole, LogicalRoleProvider,
    LogicalRoleRegistry, RegistryReloadHook, ReloadBus, ReloadNotifier, Repository, Result,
    RoleBindingResolver, Tenant, TenantResolver,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Repository wrapper counting round-trips
pub struct CountingRepository {
    inner: InMemoryRepository,
    calls: AtomicUsize,
}

impl CountingRepository {
    pub fn new() -> Self {
        Self {
            inner: InMemoryRepository::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Repository for CountingRepository {
    async fn get_or_create_runtime_roles_folder(&self, tenant: &Tenant) -> Result<FolderHandle> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.get_or_create_runtime_roles_folder(tenant).await
    }

    async fn list_child_binding_nodes(
        &self,
        folder: &FolderHandle,
    ) -> Result<Vec<(String, Vec<String>)>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.list_child_binding_nodes(folder).await
    }

    async fn get_binding_node(
        &self,
        folder: &FolderHandle,
        encoded_name: &str,
    ) -> Result<Option<Vec<String>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.get_binding_node(folder, encoded_name).await
    }

    async fn write_binding_node(
        &self,
        folder: &FolderHandle,
        encoded_name: &str,
        logical_role_names: &[String],
    ) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner
            .write_binding_node(folder, encoded_name, logical_role_names)
            .await
    }
}

/// Provider handing out a fixed action set
pub struct FixedProvider(pub Vec<LogicalRole>);

impl LogicalRoleProvider for FixedProvider {
    fn logical_roles(&self) -> Vec<LogicalRole> {
        self.0.clone()
    }
}

/// Fully wired engine over counting storage and a reload bus
pub struct Harness {
    pub engine: AuthorizationEngine,
    pub repository: Arc<CountingRepository>,
    pub cache: BindingCache,
    pub registry: Arc<LogicalRoleRegistry>,
    pub bus: ReloadBus,
}

/// Platform actions used across the tests
pub fn platform_actions() -> Vec<LogicalRole> {
    vec![
        LogicalRole::new("PublishAction").with_default_display_name("Publish"),
        LogicalRole::new("ReadAction").with_default_display_name("Read"),
        LogicalRole::new("RepositoryCreateAction"),
        LogicalRole::new("AdministerSecurityAction"),
    ]
}

pub fn binding_config() -> BindingConfig {
    BindingConfig::new("SysAdmin")
        .with_immutable_binding("Administrator", vec!["AdministerSecurityAction".to_string()])
        .with_immutable_binding(
            "SysAdmin",
            vec![
                "AdministerSecurityAction".to_string(),
                "PublishAction".to_string(),
            ],
        )
        .with_bootstrap_binding("Report Author", vec!["PublishAction".to_string()])
        .with_bootstrap_binding("Business Analyst", vec!["ReadAction".to_string()])
}

/// Install a test log subscriber once; later calls are no-ops
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn harness() -> Harness {
    init_tracing();
    let repository = Arc::new(CountingRepository::new());
    let tenants: Arc<dyn TenantResolver> =
        Arc::new(DelimitedTenantResolver::new("default").with_disabled_tenant("archived"));
    let store = Arc::new(BindingStore::new(
        repository.clone(),
        tenants.clone(),
        binding_config(),
    ));
    let cache = BindingCache::new(Arc::new(InMemoryRegionCache::new()));
    let registry = Arc::new(LogicalRoleRegistry::new(platform_actions()));
    let resolver = Arc::new(RoleBindingResolver::new(
        store,
        cache.clone(),
        registry.clone(),
        tenants,
    ));

    let bus = ReloadBus::new();
    let hook = Arc::new(RegistryReloadHook::new(
        registry.clone(),
        cache.clone(),
        Arc::new(FixedProvider(platform_actions())),
    ));
    bus.subscribe(hook);

    Harness {
        engine: AuthorizationEngine::new(resolver),
        repository,
        cache,
        registry,
        bus,
    }
}

pub fn set_of(values: &[&str]) -> std::collections::HashSet<String> {
    values.iter().map(|value| value.to_string()).collect()
}
