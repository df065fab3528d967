//! Roost Pool -- object recycling for real-time simulations.
//!
//! Constructing and destroying short-lived entities on demand is expensive
//! when entities carry attached sub-resources. This crate pre-allocates a
//! fixed set of instances per kind, hands out unused ones on request, and
//! reclaims them when the caller is done -- restoring each instance to a
//! pristine default state so a recycled instance behaves as if freshly
//! created.
//!
//! # Quick Start
//!
//! ```
//! use roost_pool::prelude::*;
//!
//! let mut world = SceneWorld::new();
//! world.register_kind(InstanceKind::actor("Bullet", ActorState::default()));
//!
//! let mut registry = PoolRegistry::new(vec![PoolSpec::new("Bullet", 8)]);
//! registry.initialize_pools(&mut world);
//!
//! let bullet = registry
//!     .spawn_from_pool(&mut world, "Bullet", &Transform::at(0.0, 2.0, 0.0), None, None)
//!     .expect("pool has instances");
//!
//! registry.return_to_pool(&mut world, bullet);
//! assert_eq!(registry.available_count("Bullet"), Some(8));
//! ```
//!
//! All pool operations run on the simulation's single logical update thread;
//! exclusivity comes from `&mut`, not locks. Lifetime-limited kinds are
//! auto-reclaimed by pumping [`PoolRegistry::advance_timers`] once per tick
//! (the `roost-engine` session driver does this for you).

#![deny(unsafe_code)]

pub mod deferred;
pub mod holder;
pub mod instance;
pub mod poolable;
pub mod registry;
pub mod snapshot;
pub mod timer;
pub mod world;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced by pool operations.
///
/// All of these are recoverable caller mistakes. The public surface handles
/// them locally -- log plus sentinel return -- rather than propagating them
/// as faults; the type exists so the handling sites have something precise
/// to log.
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    /// The registry has not finished initializing, or was torn down.
    #[error("pool registry is not ready (pools are initializing or torn down)")]
    NotReady,

    /// No pool exists for the requested kind.
    #[error("no pool for kind '{kind}'. Pooled kinds: [{registered}]")]
    UnknownKind { kind: String, registered: String },

    /// The instance handle refers to a destroyed or never-registered entity.
    #[error("instance {id} is stale or was destroyed outside the pool")]
    InvalidInstance { id: instance::InstanceId },

    /// The pool has no available instance and the spawn policy forbids
    /// growth.
    #[error("pool for kind '{kind}' is exhausted")]
    Exhausted { kind: String },
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::deferred::DeferredSpawn;
    pub use crate::holder::{PoolHolder, PoolStatus};
    pub use crate::instance::{
        ActorState, Instance, InstanceId, PhysicsState, SceneState, SubComponent, TickSettings,
        Transform,
    };
    pub use crate::poolable::{Poolable, ReturnReason};
    pub use crate::registry::{PoolRegistry, PoolSpec, SearchPolicy, SpawnPolicy};
    pub use crate::snapshot::DefaultStateSnapshot;
    pub use crate::timer::{ExpiryEvent, ExpiryTimers, TimerHandle};
    pub use crate::world::{InstanceKind, SceneWorld};
    pub use crate::PoolError;
}

// ---------------------------------------------------------------------------
// Integration Tests
// ---------------------------------------------------------------------------
