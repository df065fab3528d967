//! Default-state capture and restore.
//!
//! Provides [`DefaultStateSnapshot`] -- the immutable-after-capture record of
//! an instance's pristine configuration, taken once per pool from a throwaway
//! instance at initialization time and reapplied every time an instance is
//! pulled out of the pool. Restoring is what makes a recycled instance behave
//! as if it had just been constructed: timing, damage flags and every
//! sub-component's transform/visibility/tags/activation/physics flag go back
//! to their class defaults.
//!
//! Sub-component settings are matched to the live instance's component list
//! by ordinal index, with two deliberate quirks carried over from the
//! original design:
//!
//! - index 0 (the root placement) never has its relative transform restored,
//!   so the pool does not fight the caller's own positioning of the
//!   instance;
//! - when the live list and the captured list differ in length, restoration
//!   stops at the shorter one.
//!
//! Snapshots serialize to JSON and expose a BLAKE3 content digest used by
//! the round-trip-restore tests.

use serde::{Deserialize, Serialize};

use crate::instance::{Instance, TickSettings, Transform};

// ---------------------------------------------------------------------------
// Snapshot types
// ---------------------------------------------------------------------------

/// Captured defaults of one attached sub-component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentDefaults {
    pub tick: TickSettings,
    pub tags: Vec<String>,
    /// Whether the component auto-activates.
    pub auto_activate: bool,
    /// Present iff the component is spatial.
    pub scene: Option<SceneDefaults>,
}

/// Captured defaults of a spatial sub-component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDefaults {
    pub relative_transform: Transform,
    pub visible: bool,
    pub hidden_in_game: bool,
    /// `Some` iff the component is a physics body.
    pub simulating_physics: Option<bool>,
}

/// Captured actor-level defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorDefaults {
    pub tick: TickSettings,
    pub hidden_in_game: bool,
    /// The kind's configured lifetime; positive values put expiry under pool
    /// control.
    pub lifespan: f32,
    pub can_be_damaged: bool,
    /// One record per attached sub-component, in declaration order.
    pub components: Vec<ComponentDefaults>,
}

/// The pristine configuration of one entity kind.
///
/// Captured once per pool and read-only thereafter. `actor` is `None` for
/// plain object-like kinds, which carry no restorable configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultStateSnapshot {
    pub actor: Option<ActorDefaults>,
}

// ---------------------------------------------------------------------------
// Capture / restore
// ---------------------------------------------------------------------------

impl DefaultStateSnapshot {
    /// Capture the configurable runtime state of `instance`.
    pub fn capture(instance: &Instance) -> Self {
        let actor = instance.actor.as_ref().map(|actor| ActorDefaults {
            tick: actor.tick,
            hidden_in_game: actor.hidden_in_game,
            lifespan: actor.lifespan,
            can_be_damaged: actor.can_be_damaged,
            components: actor
                .components
                .iter()
                .map(|component| ComponentDefaults {
                    tick: component.tick,
                    tags: component.tags.clone(),
                    auto_activate: component.active,
                    scene: component.scene.as_ref().map(|scene| SceneDefaults {
                        relative_transform: scene.relative_transform.clone(),
                        visible: scene.visible,
                        hidden_in_game: scene.hidden_in_game,
                        simulating_physics: scene.physics.map(|p| p.simulating),
                    }),
                })
                .collect(),
        });
        Self { actor }
    }

    /// Reapply the captured defaults to `instance`.
    ///
    /// Restores the actor's tick interval and damage flag plus every
    /// sub-component's settings by ordinal position. Actor-level visibility,
    /// collision and tick-enabled are owned by the activation transition and
    /// are not touched here.
    pub fn restore(&self, instance: &mut Instance) {
        let (Some(defaults), Some(actor)) = (self.actor.as_ref(), instance.actor.as_mut()) else {
            return;
        };

        actor.tick.interval = defaults.tick.interval;
        actor.can_be_damaged = defaults.can_be_damaged;

        for (ordinal, (component, saved)) in actor
            .components
            .iter_mut()
            .zip(defaults.components.iter())
            .enumerate()
        {
            component.tick = saved.tick;
            component.tags = saved.tags.clone();
            component.active = saved.auto_activate;

            let (Some(scene), Some(saved_scene)) = (component.scene.as_mut(), saved.scene.as_ref())
            else {
                continue;
            };
            if ordinal > 0 {
                // Skip the root placement -- the caller owns it.
                scene.relative_transform = saved_scene.relative_transform.clone();
            }
            scene.visible = saved_scene.visible;
            scene.hidden_in_game = saved_scene.hidden_in_game;
            if let (Some(physics), Some(simulating)) =
                (scene.physics.as_mut(), saved_scene.simulating_physics)
            {
                physics.simulating = simulating;
            }
        }
    }

    /// Whether the captured kind is actor-like.
    pub fn is_actor(&self) -> bool {
        self.actor.is_some()
    }

    /// The captured lifespan; `0.0` for object-like kinds.
    pub fn lifespan(&self) -> f32 {
        self.actor.as_ref().map_or(0.0, |a| a.lifespan)
    }

    /// BLAKE3 hex digest of the snapshot's JSON serialization.
    ///
    /// Two snapshots with identical captured state produce identical
    /// digests, which is what the round-trip-restore tests assert.
    pub fn content_hash(&self) -> String {
        let bytes = serde_json::to_vec(self).unwrap_or_default();
        blake3::hash(&bytes).to_hex().to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
