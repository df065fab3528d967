//! Two-phase deferred construction.
//!
//! Some callers must set construction-time fields on an instance *before* it
//! goes live -- the visual-scripting layer generates exactly this shape of
//! code. Phase one ([`begin_deferred_spawn_from_pool`]) acquires an instance
//! (or freshly constructs one when the pool yields nothing) and marks it
//! construction-pending; the caller then writes its fields; phase two
//! ([`finish_deferred_spawn_from_pool`]) fires the kind's
//! `finish_construction` hook and clears the flag.
//!
//! Both phases are plain synchronous calls -- the protocol is two-phase, not
//! asynchronous. Phase two is a no-op on an instance that was already
//! finalized or has been destroyed in between.
//!
//! [`begin_deferred_spawn_from_pool`]: PoolRegistry::begin_deferred_spawn_from_pool
//! [`finish_deferred_spawn_from_pool`]: PoolRegistry::finish_deferred_spawn_from_pool

use tracing::debug;

use crate::instance::{InstanceId, Transform};
use crate::registry::{PoolRegistry, SearchPolicy, SpawnPolicy};
use crate::world::SceneWorld;

// ---------------------------------------------------------------------------
// DeferredSpawn
// ---------------------------------------------------------------------------

/// Token for an instance acquired but not yet finalized.
///
/// Holding one means the instance is live but its `finish_construction` hook
/// has not run. Pass it back via
/// [`PoolRegistry::finish_deferred_spawn_from_pool`] once the
/// construction-time fields are set.
#[must_use = "a deferred spawn must be finished before the instance is fully constructed"]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeferredSpawn {
    id: InstanceId,
    kind: String,
}

impl DeferredSpawn {
    /// The acquired instance, available for field customization between the
    /// two phases.
    pub fn id(&self) -> InstanceId {
        self.id
    }

    /// The kind the instance was acquired as.
    pub fn kind(&self) -> &str {
        &self.kind
    }
}

// ---------------------------------------------------------------------------
// PoolRegistry: the two phases
// ---------------------------------------------------------------------------

impl PoolRegistry {
    /// Phase one: acquire an instance of `kind` without finalizing it.
    ///
    /// Prefers the pool; falls back to constructing a fresh, untracked
    /// instance when the pool yields nothing (including when the registry is
    /// not ready -- deferred spawning is how the visual layer builds things,
    /// and it must keep working against a cold registry). The transform is
    /// applied immediately so construction-time logic can read placement.
    pub fn begin_deferred_spawn_from_pool(
        &mut self,
        world: &mut SceneWorld,
        kind: &str,
        transform: &Transform,
    ) -> Option<DeferredSpawn> {
        let id = match self.get_from_pool(world, kind, SearchPolicy::AnyFree, SpawnPolicy::Ignore)
        {
            Some(id) => id,
            None => world.spawn(kind)?,
        };
        world.set_transform(id, transform);
        if let Some(instance) = world.get_mut(id) {
            instance.construction_pending = true;
        }
        Some(DeferredSpawn {
            id,
            kind: kind.to_owned(),
        })
    }

    /// Phase two: finalize a deferred spawn.
    ///
    /// Fires the kind's `finish_construction` hook exactly once. Finishing
    /// an instance that was already finalized, or that is no longer valid,
    /// is a no-op (the latter returns `None`).
    pub fn finish_deferred_spawn_from_pool(
        &mut self,
        world: &mut SceneWorld,
        spawn: DeferredSpawn,
    ) -> Option<InstanceId> {
        let DeferredSpawn { id, kind } = spawn;
        match world.get(id).map(|i| i.construction_pending) {
            Some(true) => {
                if let Some(instance) = world.get_mut(id) {
                    instance.construction_pending = false;
                }
                if let Some(hooks) = world.kind(&kind).and_then(|k| k.hooks().cloned()) {
                    hooks.finish_construction(world, id);
                }
                Some(id)
            }
            Some(false) => Some(id),
            None => {
                debug!(%id, kind = %kind, "finish_deferred_spawn on a destroyed instance");
                None
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
