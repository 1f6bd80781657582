//! Region-keyed cache of resolved logical-role sets
//!
//! The cache cuts store round-trips for repeat resolutions. It wraps a
//! generic [`RegionCache`] (the platform's shared cache service) and pins one
//! region for role bindings. Invalidation is wholesale: any change to the
//! registry's action set clears the whole region, because identifying exactly
//! which cached entries reference a changed action is not cheaply knowable.
//!
//! Concurrent access needs no external locking. An `invalidate_all` racing a
//! `put` it logically superseded may leave one stale entry behind; the next
//! reload clears it, and the trade keeps contention low.

use crate::types::{LogicalRoleName, RoleId};
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Cache region holding resolved logical-role sets per role id
pub const LOGICAL_ROLE_BINDINGS_REGION: &str = "roleBindingCache";

/// Generic region-keyed key/value cache capability.
pub trait RegionCache: Send + Sync {
    /// Value for a key within a region, `None` on miss or unknown region.
    fn get(&self, region: &str, key: &str) -> Option<HashSet<LogicalRoleName>>;

    /// Store a value within a region. A no-op for unregistered regions.
    fn put(&self, region: &str, key: &str, value: HashSet<LogicalRoleName>);

    /// Drop every entry of a region, keeping the region registered.
    fn remove_region(&self, region: &str);

    /// Whether the region is registered and serving entries.
    fn region_enabled(&self, region: &str) -> bool;

    /// Register a region. Registering an existing region keeps its entries.
    fn add_region(&self, region: &str);
}

/// In-memory region cache (thread-safe, lock-free reads)
pub struct InMemoryRegionCache {
    regions: DashMap<String, DashMap<String, HashSet<LogicalRoleName>>>,
}

impl InMemoryRegionCache {
    /// Create a cache with no regions registered
    pub fn new() -> Self {
        Self {
            regions: DashMap::new(),
        }
    }
}

impl Default for InMemoryRegionCache {
    fn default() -> Self {
        Self::new()
    }
}

impl RegionCache for InMemoryRegionCache {
    fn get(&self, region: &str, key: &str) -> Option<HashSet<LogicalRoleName>> {
        self.regions
            .get(region)
            .and_then(|entries| entries.get(key).map(|entry| entry.value().clone()))
    }

    fn put(&self, region: &str, key: &str, value: HashSet<LogicalRoleName>) {
        if let Some(entries) = self.regions.get(region) {
            entries.insert(key.to_string(), value);
        }
    }

    fn remove_region(&self, region: &str) {
        if let Some(entries) = self.regions.get(region) {
            entries.clear();
        }
    }

    fn region_enabled(&self, region: &str) -> bool {
        self.regions.contains_key(region)
    }

    fn add_region(&self, region: &str) {
        self.regions.entry(region.to_string()).or_default();
    }
}

/// Per-tenant, per-role cache of resolved logical-role sets.
///
/// Keys are tenant-scoped role ids. Empty sets are cached explicitly so that
/// roles with no bindings do not hit the store on every resolution.
#[derive(Clone)]
pub struct BindingCache {
    cache: Arc<dyn RegionCache>,
}

impl BindingCache {
    /// Wrap a region cache, registering the bindings region if absent
    pub fn new(cache: Arc<dyn RegionCache>) -> Self {
        if !cache.region_enabled(LOGICAL_ROLE_BINDINGS_REGION) {
            cache.add_region(LOGICAL_ROLE_BINDINGS_REGION);
        }
        Self { cache }
    }

    /// Cached logical-role set for a role id, `None` on miss
    pub fn get(&self, role_id: &RoleId) -> Option<HashSet<LogicalRoleName>> {
        self.cache.get(LOGICAL_ROLE_BINDINGS_REGION, role_id)
    }

    /// Store the resolved set for a role id
    pub fn put(&self, role_id: &RoleId, names: HashSet<LogicalRoleName>) {
        self.cache.put(LOGICAL_ROLE_BINDINGS_REGION, role_id, names);
    }

    /// Drop every cached entry. Called once per registry reload event.
    pub fn invalidate_all(&self) {
        debug!("invalidating role binding cache region");
        self.cache.remove_region(LOGICAL_ROLE_BINDINGS_REGION);
    }
}
