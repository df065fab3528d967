//! Per-kind pool ownership and the available/in-use state machine.
//!
//! A [`PoolHolder`] owns every instance of one entity kind: it captures the
//! kind's [`DefaultStateSnapshot`] once at initialization, maintains the
//! available/in-use partition, applies the snapshot on every activation, and
//! manages the per-instance expiry timers for lifetime-limited kinds.
//!
//! Idle instances are not attached anywhere -- "parked" simply means the
//! entry's status tag is `Available` and the instance is hidden,
//! non-colliding and non-ticking. The invariants the holder maintains at all
//! times:
//!
//! - every tracked name is in exactly one of {available, in-use};
//! - the `available` stack contains exactly the names whose status is
//!   `Available`, with no duplicates;
//! - an expiry timer is armed for a name iff its entry is in-use and the
//!   kind has a positive lifespan.
//!
//! All operations take the collaborators they touch ([`SceneWorld`],
//! [`ExpiryTimers`]) explicitly; the holder keeps no references and no
//! globals.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::instance::InstanceId;
use crate::poolable::{Poolable, ReturnReason};
use crate::snapshot::DefaultStateSnapshot;
use crate::timer::{ExpiryEvent, ExpiryTimers, TimerHandle};
use crate::world::SceneWorld;
use crate::PoolError;

// ---------------------------------------------------------------------------
// PoolEntry
// ---------------------------------------------------------------------------

/// Which side of the partition an instance is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolStatus {
    /// Parked in the pool, ready to be handed out.
    Available,
    /// Handed out to a caller.
    InUse,
}

/// Pool-management record for one instance.
#[derive(Debug, Clone)]
struct PoolEntry {
    id: InstanceId,
    status: PoolStatus,
    /// Armed expiry timer, present only while the entry is in use and the
    /// kind is lifetime-limited.
    timer: Option<TimerHandle>,
}

// ---------------------------------------------------------------------------
// PoolHolder
// ---------------------------------------------------------------------------

/// Owns all instances of one kind and their availability bookkeeping.
pub struct PoolHolder {
    kind: String,
    /// All instances ever added to this pool, keyed by unique name.
    entries: HashMap<String, PoolEntry>,
    /// Names currently unused. Pop is LIFO, which keeps acquisition order
    /// deterministic.
    available: Vec<String>,
    /// Captured once at initialization, read-only thereafter.
    defaults: DefaultStateSnapshot,
    /// The kind's poolable hooks, resolved once at initialization.
    hooks: Option<Arc<dyn Poolable>>,
    /// Set only after the initial population is complete; hooks fire only
    /// once this is true.
    initialized: bool,
}

impl PoolHolder {
    /// Build and populate the pool for `kind`.
    ///
    /// Spawns one throwaway instance to capture the kind's default state,
    /// destroys it, then constructs `count` instances and parks each.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::UnknownKind`] if `kind` is not registered with
    /// the world.
    pub fn initialize(
        world: &mut SceneWorld,
        timers: &mut ExpiryTimers,
        kind: &str,
        count: usize,
    ) -> Result<Self, PoolError> {
        if !world.has_kind(kind) {
            return Err(PoolError::UnknownKind {
                kind: kind.to_owned(),
                registered: world.kind_names().join(", "),
            });
        }

        // Throwaway instance, spawned purely to read the kind's defaults.
        let probe = world.spawn(kind).ok_or_else(|| PoolError::UnknownKind {
            kind: kind.to_owned(),
            registered: world.kind_names().join(", "),
        })?;
        let defaults = match world.get(probe) {
            Some(instance) => DefaultStateSnapshot::capture(instance),
            None => return Err(PoolError::InvalidInstance { id: probe }),
        };
        world.destroy(probe);

        let hooks = world.kind(kind).and_then(|k| k.hooks().cloned());
        let mut holder = Self {
            kind: kind.to_owned(),
            entries: HashMap::new(),
            available: Vec::new(),
            defaults,
            hooks,
            initialized: false,
        };

        for _ in 0..count {
            if let Some(id) = world.spawn(kind) {
                holder.add(world, timers, id);
            }
        }
        holder.initialized = true;

        debug!(kind, count, "pool initialized");
        Ok(holder)
    }

    // -- registration -------------------------------------------------------

    /// Register `id` under its unique name and park it.
    ///
    /// For lifetime-limited kinds the instance's own built-in lifespan is
    /// zeroed (the pool takes over expiry); the entry's timer slot stays
    /// unarmed until the instance is activated.
    pub fn add(&mut self, world: &mut SceneWorld, timers: &mut ExpiryTimers, id: InstanceId) {
        let pool_managed_expiry = self.defaults.lifespan() > 0.0;
        let Some(instance) = world.get_mut(id) else {
            warn!(kind = %self.kind, %id, "cannot add destroyed instance to pool");
            return;
        };
        let name = instance.name.clone();
        if pool_managed_expiry {
            if let Some(actor) = instance.actor.as_mut() {
                actor.lifespan = 0.0;
            }
        }

        let newly_available = {
            let entry = self.entries.entry(name.clone()).or_insert(PoolEntry {
                id,
                status: PoolStatus::InUse,
                timer: None,
            });
            entry.id = id;
            if entry.status != PoolStatus::Available {
                entry.status = PoolStatus::Available;
                true
            } else {
                false
            }
        };
        if newly_available {
            self.available.push(name.clone());
        }

        self.set_active(world, timers, &name, false, ReturnReason::Returned);
    }

    // -- acquisition --------------------------------------------------------

    /// Pop and activate the most recently parked instance, or `None` if the
    /// pool is exhausted.
    pub fn get_unused(
        &mut self,
        world: &mut SceneWorld,
        timers: &mut ExpiryTimers,
    ) -> Option<InstanceId> {
        let name = self.available.pop()?;
        self.mark_in_use(&name);
        self.set_active(world, timers, &name, true, ReturnReason::Returned);
        self.entries.get(&name).map(|e| e.id)
    }

    /// Remove `name` from the available set, activate and return it.
    ///
    /// `None` when the name is not currently available -- which covers both
    /// "never existed" and "currently in use".
    pub fn get_specific(
        &mut self,
        world: &mut SceneWorld,
        timers: &mut ExpiryTimers,
        name: &str,
    ) -> Option<InstanceId> {
        // TODO: index available names for O(1) specific lookup.
        let pos = self.available.iter().position(|n| n == name)?;
        let name = self.available.remove(pos);
        self.mark_in_use(&name);
        self.set_active(world, timers, &name, true, ReturnReason::Returned);
        self.entries.get(&name).map(|e| e.id)
    }

    /// Fabricate one additional instance, add it to the pool's bookkeeping
    /// and immediately hand it out.
    pub fn get_new(
        &mut self,
        world: &mut SceneWorld,
        timers: &mut ExpiryTimers,
    ) -> Option<InstanceId> {
        let id = world.spawn(&self.kind)?;
        self.add(world, timers, id);
        self.get_unused(world, timers)
    }

    /// Drain the entire available set, activating and returning every
    /// currently-unused instance.
    pub fn get_all_unused(
        &mut self,
        world: &mut SceneWorld,
        timers: &mut ExpiryTimers,
    ) -> Vec<InstanceId> {
        let drained = std::mem::take(&mut self.available);
        let mut out = Vec::with_capacity(drained.len());
        for name in drained {
            self.mark_in_use(&name);
            self.set_active(world, timers, &name, true, ReturnReason::Returned);
            if let Some(entry) = self.entries.get(&name) {
                out.push(entry.id);
            }
        }
        out
    }

    // -- release ------------------------------------------------------------

    /// Park the instance behind `id` back into the pool.
    ///
    /// Instances destroyed out-of-band are a silent no-op. Returns whether
    /// the instance is (now) tracked as available.
    pub fn return_object(
        &mut self,
        world: &mut SceneWorld,
        timers: &mut ExpiryTimers,
        id: InstanceId,
        reason: ReturnReason,
    ) -> bool {
        let Some(name) = world.get(id).map(|i| i.name.clone()) else {
            debug!(kind = %self.kind, %id, "return of a destroyed instance ignored");
            return false;
        };
        self.return_by_name(world, timers, &name, reason)
    }

    /// Park the named instance. Idempotent: returning an already-available
    /// name is a no-op.
    pub fn return_by_name(
        &mut self,
        world: &mut SceneWorld,
        timers: &mut ExpiryTimers,
        name: &str,
        reason: ReturnReason,
    ) -> bool {
        let Some(entry) = self.entries.get_mut(name) else {
            debug!(kind = %self.kind, name, "return of an untracked instance ignored");
            return false;
        };
        if entry.status == PoolStatus::Available {
            return true;
        }
        entry.status = PoolStatus::Available;
        if let Some(handle) = entry.timer.take() {
            timers.cancel(handle);
        }
        self.available.push(name.to_owned());
        self.set_active(world, timers, name, false, reason);
        true
    }

    // -- the state transition ------------------------------------------------

    /// Activate or park the named instance.
    ///
    /// Activation restores the captured defaults, (re)arms the expiry timer
    /// for lifetime-limited kinds, and applies the live
    /// visibility/collision/tick flags. Parking forces the instance hidden,
    /// non-colliding and non-ticking. Either way the kind's hooks fire if
    /// the pool has finished its initial population. Operating on an
    /// instance destroyed out-of-band is a silent no-op.
    fn set_active(
        &mut self,
        world: &mut SceneWorld,
        timers: &mut ExpiryTimers,
        name: &str,
        active: bool,
        reason: ReturnReason,
    ) {
        let Some(id) = self.entries.get(name).map(|e| e.id) else {
            return;
        };
        if world.get(id).is_none() {
            return;
        }

        // Re-arm replaces any pending timer, so expiry is postponed rather
        // than double-fired.
        let lifespan = self.defaults.lifespan();
        if active && lifespan > 0.0 {
            let handle = timers.arm(
                lifespan,
                ExpiryEvent {
                    kind: self.kind.clone(),
                    name: name.to_owned(),
                },
            );
            if let Some(entry) = self.entries.get_mut(name) {
                if let Some(stale) = entry.timer.replace(handle) {
                    timers.cancel(stale);
                }
            }
        }

        if let Some(instance) = world.get_mut(id) {
            if active {
                self.defaults.restore(instance);
            }
            if let Some(actor) = instance.actor.as_mut() {
                let defaults = self.defaults.actor.as_ref();
                let default_hidden = defaults.map_or(false, |d| d.hidden_in_game);
                let default_tick = defaults.map_or(false, |d| d.tick.enabled);
                actor.hidden_in_game = !active || default_hidden;
                actor.collision_enabled = active;
                actor.tick.enabled = active && default_tick;
            }
        }

        if self.initialized {
            if let Some(hooks) = self.hooks.clone() {
                if active {
                    hooks.became_active(world, id);
                } else {
                    hooks.became_inactive(world, id, reason);
                }
            }
        }
    }

    // -- teardown ------------------------------------------------------------

    /// Destroy every owned instance, cancel every outstanding timer and
    /// clear the bookkeeping. Must run before the holder is dropped.
    pub fn teardown(&mut self, world: &mut SceneWorld, timers: &mut ExpiryTimers) {
        for (_, entry) in self.entries.drain() {
            if let Some(handle) = entry.timer {
                timers.cancel(handle);
            }
            if world.is_alive(entry.id) {
                world.destroy(entry.id);
            }
        }
        self.available.clear();
        debug!(kind = %self.kind, "pool torn down");
    }

    // -- introspection -------------------------------------------------------

    /// The kind this pool holds.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Number of instances currently handed out.
    pub fn used_count(&self) -> usize {
        self.entries.len() - self.available.len()
    }

    /// Number of instances currently parked.
    pub fn available_count(&self) -> usize {
        self.available.len()
    }

    /// Total number of instances this pool tracks.
    pub fn size(&self) -> usize {
        self.entries.len()
    }

    /// Whether the named instance is currently parked.
    pub fn is_available(&self, name: &str) -> bool {
        self.entries
            .get(name)
            .map_or(false, |e| e.status == PoolStatus::Available)
    }

    /// Whether the pool tracks an instance under this name.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Names of every tracked instance, in no particular order.
    pub fn instance_names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// The snapshot captured at initialization.
    pub fn defaults(&self) -> &DefaultStateSnapshot {
        &self.defaults
    }

    fn mark_in_use(&mut self, name: &str) {
        if let Some(entry) = self.entries.get_mut(name) {
            entry.status = PoolStatus::InUse;
        }
    }
}

impl std::fmt::Debug for PoolHolder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoolHolder")
            .field("kind", &self.kind)
            .field("size", &self.size())
            .field("available", &self.available_count())
            .field("initialized", &self.initialized)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
