//! Roost Engine -- session driver for the pool engine.
//!
//! This crate builds on [`roost_pool`] to provide the simulation side of the
//! recycling story: a [`Session`](session::Session) that owns the scene
//! world and the pool registry, pumps expiry timers at a fixed timestep, and
//! tears everything down at session end; plus the data-driven
//! [`PoolTable`](config::PoolTable) loader for declaring pools in JSON.
//!
//! # Quick Start
//!
//! ```
//! use roost_engine::prelude::*;
//!
//! let mut world = SceneWorld::new();
//! world.register_kind(InstanceKind::actor("Bullet", ActorState::default()));
//!
//! let table = PoolTable::from_json_str(
//!     r#"[{ "type": "Bullet", "amountOfObjects": 8 }]"#,
//! ).unwrap();
//!
//! let mut session = Session::new(world, SessionConfig {
//!     pools: table.into_specs(),
//!     ..SessionConfig::default()
//! });
//!
//! let (registry, world) = session.split_mut();
//! let bullet = registry.spawn_from_pool(world, "Bullet", &Transform::default(), None, None);
//! assert!(bullet.is_some());
//! ```

#![deny(unsafe_code)]

pub mod config;
pub mod session;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

/// Re-export the pool crate for convenience.
pub use roost_pool;

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common engine usage.
pub mod prelude {
    // Re-export everything from the pool prelude.
    pub use roost_pool::prelude::*;

    // Engine-specific exports.
    pub use crate::config::{PoolTable, PoolTableRow};
    pub use crate::session::{Session, SessionConfig};
}
