//! Instance identifiers and the pooled-instance data model.
//!
//! An [`InstanceId`] is a 64-bit handle that packs a *generation* counter in
//! the high 32 bits and an *index* in the low 32 bits. The generation is
//! bumped every time an index is recycled, which allows immediate stale-ID
//! detection -- important for a pool engine, where handles outlive the
//! objects they once referred to all the time.
//!
//! An [`Instance`] is one unit of the simulation. Instances come in two
//! shapes: *actor-like* (spatial state, tick settings, visibility/collision
//! flags, attached [`SubComponent`]s) and plain *object-like* (no spatial
//! presence). The pool only ever reads and writes the configurable runtime
//! state modeled here; payload behavior lives behind the
//! [`Poolable`](crate::poolable::Poolable) capability.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// InstanceId
// ---------------------------------------------------------------------------

/// A generational instance identifier.
///
/// Layout: `[generation: u32 | index: u32]`
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstanceId(u64);

impl InstanceId {
    /// Construct an `InstanceId` from an index and generation.
    #[inline]
    pub fn new(index: u32, generation: u32) -> Self {
        Self((generation as u64) << 32 | index as u64)
    }

    /// The index portion (low 32 bits).
    #[inline]
    pub fn index(self) -> u32 {
        self.0 as u32
    }

    /// The generation portion (high 32 bits).
    #[inline]
    pub fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// Raw `u64` representation.
    #[inline]
    pub fn to_raw(self) -> u64 {
        self.0
    }

    /// Reconstruct from a raw `u64`.
    #[inline]
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Debug for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InstanceId({}v{})", self.index(), self.generation())
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index(), self.generation())
    }
}

// ---------------------------------------------------------------------------
// Transform
// ---------------------------------------------------------------------------

/// A world or relative placement: translation, rotation (quaternion), scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Translation in world units.
    pub translation: [f32; 3],
    /// Rotation quaternion `[x, y, z, w]`.
    pub rotation: [f32; 4],
    /// Per-axis scale.
    pub scale: [f32; 3],
}

impl Transform {
    /// Identity placement at a given translation.
    pub fn at(x: f32, y: f32, z: f32) -> Self {
        Self {
            translation: [x, y, z],
            ..Self::default()
        }
    }
}

impl Default for Transform {
    /// The identity transform.
    fn default() -> Self {
        Self {
            translation: [0.0; 3],
            rotation: [0.0, 0.0, 0.0, 1.0],
            scale: [1.0; 3],
        }
    }
}

// ---------------------------------------------------------------------------
// Tick / sub-component state
// ---------------------------------------------------------------------------

/// Per-frame update settings for an actor or sub-component.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TickSettings {
    /// Whether the owner receives update ticks.
    pub enabled: bool,
    /// Seconds between ticks; `0.0` means every frame.
    pub interval: f32,
}

/// Physics-body state of a sub-component, present only on physics bodies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicsState {
    /// Whether the body is currently driven by the physics simulation.
    pub simulating: bool,
}

/// Spatial state of a sub-component, present only on scene components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneState {
    /// Placement relative to the owning instance.
    pub relative_transform: Transform,
    /// Whether the component renders at all.
    pub visible: bool,
    /// Whether the component is hidden while the simulation runs.
    pub hidden_in_game: bool,
    /// Present iff the component is a physics body.
    pub physics: Option<PhysicsState>,
}

impl Default for SceneState {
    fn default() -> Self {
        Self {
            relative_transform: Transform::default(),
            visible: true,
            hidden_in_game: false,
            physics: None,
        }
    }
}

/// One attached sub-component of an actor-like instance.
///
/// The layering mirrors the host simulation's component model: every
/// sub-component has tick settings, tags, and an activation flag; spatial
/// ones additionally carry a [`SceneState`]; physics bodies nest a
/// [`PhysicsState`] inside that.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SubComponent {
    pub tick: TickSettings,
    pub tags: Vec<String>,
    /// Whether the component is active (processing input/output).
    pub active: bool,
    /// Present iff the component has a spatial representation.
    pub scene: Option<SceneState>,
}

// ---------------------------------------------------------------------------
// ActorState / Instance
// ---------------------------------------------------------------------------

/// The spatial/physical half of an actor-like instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorState {
    /// World placement. Owned by the caller while the instance is in use;
    /// the pool never restores it (root placement is skipped on restore).
    pub transform: Transform,
    pub tick: TickSettings,
    /// Hidden while the simulation runs.
    pub hidden_in_game: bool,
    /// Whether the instance participates in collision.
    pub collision_enabled: bool,
    /// Built-in auto-destroy delay in seconds; `0.0` means unlimited.
    /// Pooled instances have this zeroed -- the pool takes over expiry.
    pub lifespan: f32,
    pub can_be_damaged: bool,
    /// Ownership metadata applied by the spawn surface.
    pub owner: Option<InstanceId>,
    /// The instance responsible for this one's effects (e.g. the shooter of
    /// a projectile).
    pub instigator: Option<InstanceId>,
    /// Attached sub-components in declaration order. Index 0 is the root.
    pub components: Vec<SubComponent>,
}

impl Default for ActorState {
    fn default() -> Self {
        Self {
            transform: Transform::default(),
            tick: TickSettings::default(),
            hidden_in_game: false,
            collision_enabled: true,
            lifespan: 0.0,
            can_be_damaged: true,
            owner: None,
            instigator: None,
            components: Vec::new(),
        }
    }
}

/// One unit of the simulation, stored in the scene world.
///
/// `name` is the stable key the pool tracks the instance under; it is unique
/// within the instance's pool. `actor` distinguishes the actor-like variant
/// from the plain object-like one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    /// Stable name, unique within the pool (`"{kind}_{serial}"`).
    pub name: String,
    /// The registered kind this instance was constructed from.
    pub kind: String,
    /// Set between the two phases of a deferred spawn.
    pub construction_pending: bool,
    /// Spatial state; `None` for plain object-like instances.
    pub actor: Option<ActorState>,
}

impl Instance {
    /// Whether this is an actor-like instance.
    pub fn is_actor(&self) -> bool {
        self.actor.is_some()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
