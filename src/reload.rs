//! Plugin reload plumbing
//!
//! Plugin hot-reload can expose new authorization actions, which makes both
//! the registry working set and every cached binding resolution suspect. The
//! pieces here connect the platform's reload notification to the registry and
//! the cache:
//!
//! - [`ReloadNotifier`] / [`ReloadObserver`]: subscription seam with an
//!   explicit handle the owner can unregister.
//! - [`ReloadBus`]: in-memory notifier implementation.
//! - [`LogicalRoleProvider`]: capability that supplies the current action set
//!   at reload time (the plugin host's lookup).
//! - [`RegistryReloadHook`]: observer that swaps the registry working set and
//!   invalidates the binding cache, exactly once per process lifetime.

use crate::cache::BindingCache;
use crate::registry::LogicalRoleRegistry;
use crate::types::LogicalRole;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Receives reload notifications
pub trait ReloadObserver: Send + Sync {
    /// Called after a plugin reload has completed
    fn on_reload(&self);
}

/// Handle identifying one subscription on a notifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionHandle(u64);

/// Registration seam for reload notifications
pub trait ReloadNotifier: Send + Sync {
    /// Register an observer; the handle unregisters it later
    fn subscribe(&self, observer: Arc<dyn ReloadObserver>) -> SubscriptionHandle;

    /// Remove a subscription. Unknown handles are ignored.
    fn unsubscribe(&self, handle: SubscriptionHandle);
}

/// In-memory reload notifier
pub struct ReloadBus {
    observers: Mutex<Vec<(u64, Arc<dyn ReloadObserver>)>>,
    next_id: AtomicU64,
}

impl ReloadBus {
    /// Create a bus with no subscriptions
    pub fn new() -> Self {
        Self {
            observers: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Fire `on_reload` on every current subscriber
    pub fn notify(&self) {
        let observers: Vec<Arc<dyn ReloadObserver>> = {
            let guard = self.observers.lock();
            guard.iter().map(|(_, observer)| observer.clone()).collect()
        };
        debug!(count = observers.len(), "delivering reload notification");
        for observer in observers {
            observer.on_reload();
        }
    }
}

impl Default for ReloadBus {
    fn default() -> Self {
        Self::new()
    }
}

impl ReloadNotifier for ReloadBus {
    fn subscribe(&self, observer: Arc<dyn ReloadObserver>) -> SubscriptionHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.observers.lock().push((id, observer));
        SubscriptionHandle(id)
    }

    fn unsubscribe(&self, handle: SubscriptionHandle) {
        self.observers.lock().retain(|(id, _)| *id != handle.0);
    }
}

/// Supplies the full action set known to the plugin host
pub trait LogicalRoleProvider: Send + Sync {
    /// Every logical role currently contributed to the platform
    fn logical_roles(&self) -> Vec<LogicalRole>;
}

struct ReloadState {
    loaded: bool,
}

/// Observer wiring a reload event to the registry and the binding cache.
///
/// The first notification refreshes the registry from the provider and
/// invalidates the whole cache region; the swap and the invalidation happen
/// under one lock so a concurrent resolution cannot observe the new working
/// set together with entries cached against the old one.
///
/// The hook is one-shot: once loaded, later notifications are no-ops. Plugins
/// deliver their actions with the first completed reload, and the platform
/// does not change the action set again within a process lifetime.
pub struct RegistryReloadHook {
    registry: Arc<LogicalRoleRegistry>,
    cache: BindingCache,
    provider: Arc<dyn LogicalRoleProvider>,
    state: Mutex<ReloadState>,
}

impl RegistryReloadHook {
    /// Create a hook that has not yet observed a reload
    pub fn new(
        registry: Arc<LogicalRoleRegistry>,
        cache: BindingCache,
        provider: Arc<dyn LogicalRoleProvider>,
    ) -> Self {
        Self {
            registry,
            cache,
            provider,
            state: Mutex::new(ReloadState { loaded: false }),
        }
    }

    /// Whether the initial reload has been consumed
    pub fn is_loaded(&self) -> bool {
        self.state.lock().loaded
    }
}

impl ReloadObserver for RegistryReloadHook {
    fn on_reload(&self) {
        // The lock spans the whole check-then-act sequence: latch check,
        // working-set swap and cache invalidation must not interleave with a
        // second notification.
        let mut state = self.state.lock();
        if state.loaded {
            debug!("ignoring repeated reload notification");
            return;
        }

        let roles = self.provider.logical_roles();
        info!(count = roles.len(), "applying plugin reload to logical role registry");
        self.registry.set_logical_roles(roles);
        // Stale bindings referencing removed actions must not be served
        self.cache.invalidate_all();
        state.loaded = true;
    }
}
