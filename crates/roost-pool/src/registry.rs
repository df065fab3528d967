//! The pool registry: kind → pool brokering and the public pool surface.
//!
//! A [`PoolRegistry`] is an explicitly constructed, session-scoped value --
//! there is no global instance. It owns one [`PoolHolder`] per configured
//! kind, the shared [`ExpiryTimers`] queue, and the `ready` gate that makes
//! every operation fail safe while pools are (re)initializing or torn down.
//!
//! Failure policy: pool misuse (asking for an unconfigured kind, acquiring
//! before initialization, handing back a stale handle) is a common,
//! recoverable caller mistake. Every such condition is logged via `tracing`
//! and surfaced as a sentinel (`None` / `false` / empty vec); nothing in
//! this module panics the simulation over a pool miss.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::holder::PoolHolder;
use crate::instance::{InstanceId, Transform};
use crate::poolable::ReturnReason;
use crate::timer::ExpiryTimers;
use crate::world::SceneWorld;
use crate::PoolError;

// ---------------------------------------------------------------------------
// PoolSpec / policies
// ---------------------------------------------------------------------------

/// One declarative pool: which kind, and how many instances to pre-allocate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSpec {
    pub kind: String,
    pub count: usize,
}

impl PoolSpec {
    pub fn new(kind: impl Into<String>, count: usize) -> Self {
        Self {
            kind: kind.into(),
            count,
        }
    }
}

/// What to do when the pool has nothing available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpawnPolicy {
    /// Return the sentinel; the pool never grows.
    #[default]
    Ignore,
    /// Fabricate a fresh instance *outside* the pool's bookkeeping. The
    /// caller owns it; the pool will never reclaim it.
    Create,
    /// Fabricate a fresh instance *inside* the pool's bookkeeping, growing
    /// the pool by one.
    CreateAndAdd,
}

/// How to pick an instance from the available set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchPolicy {
    /// Any free instance (most recently parked first).
    AnyFree,
    /// A specific instance by name. With `fallback` set, an unavailable name
    /// degrades to the next free instance instead of the sentinel.
    Named { name: String, fallback: bool },
}

/// Callback invoked once all configured pools are built.
pub type InitializedFn = fn();

// ---------------------------------------------------------------------------
// PoolRegistry
// ---------------------------------------------------------------------------

/// Maps kind names to pools and brokers every pool operation.
pub struct PoolRegistry {
    pools: HashMap<String, PoolHolder>,
    /// The declarative pool list consumed by [`initialize_pools`](Self::initialize_pools).
    desired: Vec<PoolSpec>,
    timers: ExpiryTimers,
    /// False during (re)initialization and after teardown.
    ready: bool,
    on_initialized: Vec<InitializedFn>,
}

impl PoolRegistry {
    /// Create a registry for the given declarative pool list. No pools exist
    /// until [`initialize_pools`](Self::initialize_pools) runs.
    pub fn new(desired: Vec<PoolSpec>) -> Self {
        Self {
            pools: HashMap::new(),
            desired,
            timers: ExpiryTimers::new(),
            ready: false,
            on_initialized: Vec::new(),
        }
    }

    // -- lifecycle -----------------------------------------------------------

    /// Destroy any existing pools, then build one pool per declared spec.
    ///
    /// Kinds that fail to initialize (typically: not registered with the
    /// world) are logged and skipped rather than aborting the rest. The
    /// registry only reports ready -- and the initialized callbacks only
    /// fire -- once every buildable pool is populated.
    pub fn initialize_pools(&mut self, world: &mut SceneWorld) {
        self.destroy_all_pools(world);

        let desired = self.desired.clone();
        for spec in &desired {
            let Self { pools, timers, .. } = self;
            match PoolHolder::initialize(world, timers, &spec.kind, spec.count) {
                Ok(holder) => {
                    pools.insert(spec.kind.clone(), holder);
                }
                Err(e) => {
                    warn!(kind = %spec.kind, error = %e, "skipping pool that failed to initialize");
                }
            }
        }

        self.ready = true;
        for callback in &self.on_initialized {
            callback();
        }
        info!(pools = self.pools.len(), "pool registry initialized");
    }

    /// Tear down every pool: destroy owned instances, cancel timers, clear
    /// the map. The registry is not ready afterwards.
    pub fn destroy_all_pools(&mut self, world: &mut SceneWorld) {
        self.ready = false;
        let Self { pools, timers, .. } = self;
        for (_, mut holder) in pools.drain() {
            holder.teardown(world, timers);
        }
    }

    /// Register a callback fired after every [`initialize_pools`](Self::initialize_pools)
    /// completes.
    pub fn on_initialized(&mut self, callback: InitializedFn) {
        self.on_initialized.push(callback);
    }

    /// Whether the registry is initialized and holds at least one pool.
    pub fn ready(&self) -> bool {
        self.ready && !self.pools.is_empty()
    }

    // -- acquisition ---------------------------------------------------------

    /// Acquire an instance of `kind` per the given search and spawn
    /// policies. The returned `Option` is the success/failure branch.
    pub fn get_from_pool(
        &mut self,
        world: &mut SceneWorld,
        kind: &str,
        search: SearchPolicy,
        spawn: SpawnPolicy,
    ) -> Option<InstanceId> {
        if let Err(e) = self.resolve(kind) {
            warn!(kind, error = %e, "get_from_pool failed");
            return None;
        }

        let Self { pools, timers, .. } = self;
        let holder = pools.get_mut(kind)?;

        let got = match &search {
            SearchPolicy::AnyFree => holder.get_unused(world, timers),
            SearchPolicy::Named { name, fallback } => {
                let hit = holder.get_specific(world, timers, name);
                if hit.is_none() && *fallback {
                    holder.get_unused(world, timers)
                } else {
                    hit
                }
            }
        };
        if got.is_some() {
            return got;
        }

        match spawn {
            SpawnPolicy::Ignore => {
                let e = PoolError::Exhausted {
                    kind: kind.to_owned(),
                };
                debug!(error = %e, "get_from_pool returning the sentinel");
                None
            }
            SpawnPolicy::Create => world.spawn(kind),
            SpawnPolicy::CreateAndAdd => holder.get_new(world, timers),
        }
    }

    /// Acquire any free instance and place it: transform plus ownership
    /// metadata. The pooled replacement for constructing an actor on demand.
    pub fn spawn_from_pool(
        &mut self,
        world: &mut SceneWorld,
        kind: &str,
        transform: &Transform,
        owner: Option<InstanceId>,
        instigator: Option<InstanceId>,
    ) -> Option<InstanceId> {
        let id = self.get_from_pool(world, kind, SearchPolicy::AnyFree, SpawnPolicy::Ignore)?;
        world.set_transform(id, transform);
        world.set_ownership(id, owner, instigator);
        Some(id)
    }

    /// Acquire a specific named instance and place it. With `fallback` set,
    /// an unavailable name degrades to the next free instance.
    #[allow(clippy::too_many_arguments)]
    pub fn spawn_specific_from_pool(
        &mut self,
        world: &mut SceneWorld,
        kind: &str,
        name: &str,
        fallback: bool,
        transform: &Transform,
        owner: Option<InstanceId>,
        instigator: Option<InstanceId>,
    ) -> Option<InstanceId> {
        let search = SearchPolicy::Named {
            name: name.to_owned(),
            fallback,
        };
        let id = self.get_from_pool(world, kind, search, SpawnPolicy::Ignore)?;
        world.set_transform(id, transform);
        world.set_ownership(id, owner, instigator);
        Some(id)
    }

    /// Acquire up to `quantity` instances.
    ///
    /// Stops at the first miss and returns what it got -- the length of the
    /// result is the only partial-exhaustion signal.
    pub fn get_x_from_pool(
        &mut self,
        world: &mut SceneWorld,
        kind: &str,
        quantity: usize,
    ) -> Vec<InstanceId> {
        let mut out = Vec::new();
        for _ in 0..quantity {
            match self.get_from_pool(world, kind, SearchPolicy::AnyFree, SpawnPolicy::Ignore) {
                Some(id) if world.is_alive(id) => out.push(id),
                _ => break,
            }
        }
        out
    }

    /// Drain and return every unused instance of `kind`.
    pub fn get_all_from_pool(&mut self, world: &mut SceneWorld, kind: &str) -> Vec<InstanceId> {
        if let Err(e) = self.resolve(kind) {
            warn!(kind, error = %e, "get_all_from_pool failed");
            return Vec::new();
        }
        let Self { pools, timers, .. } = self;
        pools
            .get_mut(kind)
            .map(|h| h.get_all_unused(world, timers))
            .unwrap_or_default()
    }

    // -- release -------------------------------------------------------------

    /// Put a used instance back into its pool.
    pub fn return_to_pool(&mut self, world: &mut SceneWorld, id: InstanceId) -> bool {
        let Some(kind) = world.get(id).map(|i| i.kind.clone()) else {
            debug!(%id, "return_to_pool on a destroyed instance ignored");
            return false;
        };
        if let Err(e) = self.resolve(&kind) {
            warn!(kind = %kind, error = %e, "return_to_pool failed");
            return false;
        }
        let Self { pools, timers, .. } = self;
        pools
            .get_mut(&kind)
            .map_or(false, |h| h.return_object(world, timers, id, ReturnReason::Returned))
    }

    /// Destroy one kind's pool entirely, releasing its instances.
    pub fn empty_object_pool(&mut self, world: &mut SceneWorld, kind: &str) -> bool {
        if self.pools.is_empty() {
            return false;
        }
        self.ready = false;
        let removed = {
            let Self { pools, timers, .. } = self;
            match pools.remove(kind) {
                Some(mut holder) => {
                    holder.teardown(world, timers);
                    true
                }
                None => {
                    warn!(kind, "empty_object_pool on unknown kind");
                    false
                }
            }
        };
        self.ready = true;
        removed
    }

    // -- timers --------------------------------------------------------------

    /// Advance simulation time and auto-return every instance whose expiry
    /// timer fired. The session driver calls this once per tick.
    pub fn advance_timers(&mut self, world: &mut SceneWorld, dt: f64) {
        let events = self.timers.advance(dt);
        for event in events {
            let Self { pools, timers, .. } = self;
            match pools.get_mut(&event.kind) {
                Some(holder) => {
                    holder.return_by_name(world, timers, &event.name, ReturnReason::Expired);
                }
                None => {
                    debug!(kind = %event.kind, name = %event.name, "expiry for a pool that no longer exists");
                }
            }
        }
    }

    /// The timer queue, for introspection.
    pub fn timers(&self) -> &ExpiryTimers {
        &self.timers
    }

    // -- introspection -------------------------------------------------------

    /// Number of instances of `kind` currently handed out; `None` when the
    /// registry is not ready or the kind is unknown.
    pub fn used_count(&self, kind: &str) -> Option<usize> {
        match self.resolve(kind) {
            Ok(()) => self.pools.get(kind).map(|h| h.used_count()),
            Err(e) => {
                warn!(kind, error = %e, "used_count failed");
                None
            }
        }
    }

    /// Number of instances of `kind` currently parked; `None` when the
    /// registry is not ready or the kind is unknown.
    pub fn available_count(&self, kind: &str) -> Option<usize> {
        match self.resolve(kind) {
            Ok(()) => self.pools.get(kind).map(|h| h.available_count()),
            Err(e) => {
                warn!(kind, error = %e, "available_count failed");
                None
            }
        }
    }

    /// Whether the instance is live and not parked in its pool's available
    /// set. Instances of unpooled kinds and stale handles report `false`.
    pub fn is_instance_active(&self, world: &SceneWorld, id: InstanceId) -> bool {
        let Some(instance) = world.get(id) else {
            return false;
        };
        if self.resolve(&instance.kind).is_err() {
            return false;
        }
        self.pools
            .get(&instance.kind)
            .map_or(false, |h| !h.is_available(&instance.name))
    }

    /// Whether a pool exists for this kind.
    pub fn contains_kind(&self, kind: &str) -> bool {
        self.pools.contains_key(kind)
    }

    /// Direct access to one kind's holder, mainly for tests and diagnostics.
    pub fn holder(&self, kind: &str) -> Option<&PoolHolder> {
        self.pools.get(kind)
    }

    // -- internal helpers ----------------------------------------------------

    /// Validate that the registry is ready and `kind` has a pool.
    fn resolve(&self, kind: &str) -> Result<(), PoolError> {
        if !self.ready || self.pools.is_empty() {
            return Err(PoolError::NotReady);
        }
        if !self.pools.contains_key(kind) {
            let mut registered: Vec<&str> = self.pools.keys().map(String::as_str).collect();
            registered.sort_unstable();
            return Err(PoolError::UnknownKind {
                kind: kind.to_owned(),
                registered: registered.join(", "),
            });
        }
        Ok(())
    }
}

impl std::fmt::Debug for PoolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoolRegistry")
            .field("pools", &self.pools.len())
            .field("ready", &self.ready)
            .field("pending_timers", &self.timers.pending_count())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
