//! Fixed-timestep session driver for the pool engine.
//!
//! A [`Session`] is the process/session-scoped context the original design's
//! singleton became: it owns the [`SceneWorld`] and the [`PoolRegistry`],
//! initializes every configured pool up front, pumps the expiry-timer queue
//! once per tick, and tears everything down -- destroying all pools and
//! cancelling all timers -- when the session ends.
//!
//! # Example
//!
//! ```
//! use roost_engine::prelude::*;
//!
//! let mut world = SceneWorld::new();
//! world.register_kind(InstanceKind::actor("Bullet", ActorState::default()));
//!
//! let config = SessionConfig {
//!     pools: vec![PoolSpec::new("Bullet", 4)],
//!     ..SessionConfig::default()
//! };
//! let mut session = Session::new(world, config);
//!
//! session.run_ticks(60);
//! assert_eq!(session.tick_count(), 60);
//!
//! session.shutdown();
//! ```

use tracing::info;

use roost_pool::registry::{PoolRegistry, PoolSpec};
use roost_pool::world::SceneWorld;

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Configuration for a simulation session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Fixed time step in seconds per tick. Must be positive and finite.
    pub fixed_dt: f64,
    /// The declarative pool list built at session start.
    pub pools: Vec<PoolSpec>,
}

impl Default for SessionConfig {
    /// Defaults to 60 Hz with no pools configured.
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            pools: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Owns the world and the pool registry for one simulation session.
pub struct Session {
    world: SceneWorld,
    registry: PoolRegistry,
    fixed_dt: f64,
    tick_counter: u64,
    shut_down: bool,
}

impl Session {
    /// Build a session and initialize every configured pool.
    ///
    /// # Panics
    ///
    /// Panics if `config.fixed_dt` is not positive and finite -- a session
    /// that cannot advance time is a programming error, not a runtime
    /// condition.
    pub fn new(world: SceneWorld, config: SessionConfig) -> Self {
        assert!(
            config.fixed_dt > 0.0 && config.fixed_dt.is_finite(),
            "fixed_dt must be positive and finite, got {}",
            config.fixed_dt
        );

        let mut world = world;
        let mut registry = PoolRegistry::new(config.pools);
        registry.initialize_pools(&mut world);

        info!(fixed_dt = config.fixed_dt, "session started");
        Self {
            world,
            registry,
            fixed_dt: config.fixed_dt,
            tick_counter: 0,
            shut_down: false,
        }
    }

    /// Advance the session by one fixed time step, auto-returning every
    /// pooled instance whose lifespan elapsed.
    pub fn tick(&mut self) {
        self.registry.advance_timers(&mut self.world, self.fixed_dt);
        self.tick_counter += 1;
    }

    /// Run `n` ticks back to back.
    pub fn run_ticks(&mut self, n: u64) {
        for _ in 0..n {
            self.tick();
        }
    }

    /// Destroy all pools and cancel all timers. Idempotent; also invoked by
    /// `Drop` so a session can never leak pooled instances.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.registry.destroy_all_pools(&mut self.world);
        self.shut_down = true;
        info!(ticks = self.tick_counter, "session shut down");
    }

    // -- accessors -----------------------------------------------------------

    /// Number of ticks run so far.
    pub fn tick_count(&self) -> u64 {
        self.tick_counter
    }

    /// Simulation time in seconds.
    pub fn sim_time(&self) -> f64 {
        self.tick_counter as f64 * self.fixed_dt
    }

    /// The fixed time step.
    pub fn fixed_dt(&self) -> f64 {
        self.fixed_dt
    }

    pub fn world(&self) -> &SceneWorld {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut SceneWorld {
        &mut self.world
    }

    pub fn registry(&self) -> &PoolRegistry {
        &self.registry
    }

    /// Mutable access to both halves at once -- pool operations take the
    /// world as an explicit parameter.
    pub fn split_mut(&mut self) -> (&mut PoolRegistry, &mut SceneWorld) {
        (&mut self.registry, &mut self.world)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.shutdown();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use roost_pool::instance::ActorState;
    use roost_pool::world::InstanceKind;

    fn bullet_world(lifespan: f32) -> SceneWorld {
        let mut world = SceneWorld::new();
        world.register_kind(InstanceKind::actor(
            "Bullet",
            ActorState {
                lifespan,
                ..ActorState::default()
            },
        ));
        world
    }

    #[test]
    fn session_initializes_pools() {
        let config = SessionConfig {
            pools: vec![PoolSpec::new("Bullet", 5)],
            ..SessionConfig::default()
        };
        let session = Session::new(bullet_world(0.0), config);
        assert!(session.registry().ready());
        assert_eq!(session.registry().available_count("Bullet"), Some(5));
        assert_eq!(session.world().alive_count(), 5);
    }

    #[test]
    fn tick_advances_time() {
        let mut session = Session::new(bullet_world(0.0), SessionConfig::default());
        session.run_ticks(120);
        assert_eq!(session.tick_count(), 120);
        assert!((session.sim_time() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn shutdown_is_idempotent_and_destroys_pools() {
        let config = SessionConfig {
            pools: vec![PoolSpec::new("Bullet", 3)],
            ..SessionConfig::default()
        };
        let mut session = Session::new(bullet_world(0.0), config);
        session.shutdown();
        assert_eq!(session.world().alive_count(), 0);
        assert!(!session.registry().ready());
        session.shutdown();
    }

    #[test]
    #[should_panic(expected = "fixed_dt must be positive")]
    fn invalid_fixed_dt_panics() {
        let config = SessionConfig {
            fixed_dt: 0.0,
            ..SessionConfig::default()
        };
        let _ = Session::new(SceneWorld::new(), config);
    }
}
