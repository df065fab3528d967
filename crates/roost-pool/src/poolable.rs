//! The optional capability hooks pooled payload logic can implement.
//!
//! Recycled instances never see an ordinary construction/teardown pair --
//! they are built once at pool initialization and then cycle between parked
//! and live. Payload logic that needs lifecycle notifications implements
//! [`Poolable`] on its kind instead: the pool calls [`became_active`] where a
//! freshly constructed entity would run its begin-play logic and
//! [`became_inactive`] where a destroyed one would run its end-play logic.
//!
//! The hook implementation is attached to the
//! [`InstanceKind`](crate::world::InstanceKind) at registration time and
//! resolved exactly once per pool, when the pool initializes -- never
//! re-queried on a per-transition basis.
//!
//! [`became_active`]: Poolable::became_active
//! [`became_inactive`]: Poolable::became_inactive

use serde::{Deserialize, Serialize};

use crate::instance::InstanceId;
use crate::world::SceneWorld;

// ---------------------------------------------------------------------------
// ReturnReason
// ---------------------------------------------------------------------------

/// Why an instance is being parked, passed to [`Poolable::became_inactive`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReturnReason {
    /// The caller handed the instance back explicitly.
    Returned,
    /// The instance's expiry timer fired.
    Expired,
    /// The pool (or the whole registry) is being torn down.
    Destroyed,
}

// ---------------------------------------------------------------------------
// Poolable
// ---------------------------------------------------------------------------

/// Lifecycle hooks for pooled payload logic.
///
/// Implementations receive the scene world and the affected instance so they
/// can reset or initialize whatever payload state they keep on it. Hooks only
/// fire once the owning pool has finished its initial population; instances
/// parked while the pool itself is still being built get no callbacks.
pub trait Poolable: Send + Sync {
    /// Called when the instance is pulled out of the pool, after its default
    /// state has been restored.
    fn became_active(&self, world: &mut SceneWorld, id: InstanceId);

    /// Called when the instance is parked back into the pool.
    fn became_inactive(&self, world: &mut SceneWorld, id: InstanceId, reason: ReturnReason);

    /// Called when a deferred spawn is finalized, once the caller has set the
    /// instance's construction-time fields. Defaults to a no-op.
    fn finish_construction(&self, _world: &mut SceneWorld, _id: InstanceId) {}
}
