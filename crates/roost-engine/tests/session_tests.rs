//! End-to-end session tests: pool lifecycle and timer-driven reclamation
//! running through the fixed-timestep driver.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use roost_engine::prelude::*;

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

fn session_with(lifespan: f32, count: usize) -> Session {
    Session::new(
        bullet_world(lifespan),
        SessionConfig {
            pools: vec![PoolSpec::new("Bullet", count)],
            ..SessionConfig::default()
        },
    )
}

// -- timer-driven reclamation ------------------------------------------------

#[test]
fn expired_instance_returns_within_its_lifespan() {
    // 0.5s lifespan at 60 Hz: the bullet must be back within 30 ticks.
    let mut session = session_with(0.5, 1);
    let (registry, world) = session.split_mut();
    let _id = registry
        .spawn_from_pool(world, "Bullet", &Transform::default(), None, None)
        .unwrap();
    assert_eq!(session.registry().used_count("Bullet"), Some(1));

    session.run_ticks(31);
    assert_eq!(session.registry().used_count("Bullet"), Some(0));
    assert_eq!(session.registry().available_count("Bullet"), Some(1));
}

#[test]
fn instance_not_reclaimed_early() {
    let mut session = session_with(0.5, 1);
    let (registry, world) = session.split_mut();
    let _id = registry
        .spawn_from_pool(world, "Bullet", &Transform::default(), None, None)
        .unwrap();

    session.run_ticks(29);
    assert_eq!(session.registry().used_count("Bullet"), Some(1));
}

#[test]
fn reacquiring_postpones_expiry_across_ticks() {
    let mut session = session_with(0.5, 1);

    let (registry, world) = session.split_mut();
    let id = registry
        .spawn_from_pool(world, "Bullet", &Transform::default(), None, None)
        .unwrap();

    // Recycle the bullet just before its deadline.
    session.run_ticks(25);
    let (registry, world) = session.split_mut();
    registry.return_to_pool(world, id);
    let id2 = registry
        .spawn_from_pool(world, "Bullet", &Transform::default(), None, None)
        .unwrap();
    assert_eq!(id, id2);

    // The original deadline passes without a reclaim.
    session.run_ticks(10);
    assert_eq!(session.registry().used_count("Bullet"), Some(1));

    // The replacement deadline fires.
    session.run_ticks(21);
    assert_eq!(session.registry().used_count("Bullet"), Some(0));
}

#[test]
fn expiry_reason_reaches_hooks() {
    struct ExpiryProbe {
        expired: AtomicUsize,
        returned: AtomicUsize,
    }
    impl Poolable for ExpiryProbe {
        fn became_active(&self, _world: &mut SceneWorld, _id: InstanceId) {}
        fn became_inactive(&self, _world: &mut SceneWorld, _id: InstanceId, reason: ReturnReason) {
            match reason {
                ReturnReason::Expired => self.expired.fetch_add(1, Ordering::Relaxed),
                ReturnReason::Returned => self.returned.fetch_add(1, Ordering::Relaxed),
                ReturnReason::Destroyed => 0,
            };
        }
    }

    let probe = Arc::new(ExpiryProbe {
        expired: AtomicUsize::new(0),
        returned: AtomicUsize::new(0),
    });
    let mut world = SceneWorld::new();
    world.register_kind(
        InstanceKind::actor(
            "Bullet",
            ActorState {
                lifespan: 0.1,
                ..ActorState::default()
            },
        )
        .with_hooks(probe.clone()),
    );
    let mut session = Session::new(
        world,
        SessionConfig {
            pools: vec![PoolSpec::new("Bullet", 1)],
            ..SessionConfig::default()
        },
    );

    let (registry, world) = session.split_mut();
    let _id = registry
        .spawn_from_pool(world, "Bullet", &Transform::default(), None, None)
        .unwrap();
    session.run_ticks(10);

    assert_eq!(probe.expired.load(Ordering::Relaxed), 1);
    assert_eq!(probe.returned.load(Ordering::Relaxed), 0);
}

// -- lifecycle ---------------------------------------------------------------

#[test]
fn shutdown_cancels_outstanding_timers() {
    let mut session = session_with(10.0, 3);
    let (registry, world) = session.split_mut();
    for _ in 0..3 {
        registry
            .spawn_from_pool(world, "Bullet", &Transform::default(), None, None)
            .unwrap();
    }
    assert_eq!(session.registry().timers().pending_count(), 3);

    session.shutdown();
    assert_eq!(session.registry().timers().pending_count(), 0);
    assert_eq!(session.world().alive_count(), 0);
}

#[test]
fn dropping_a_session_tears_pools_down() {
    // Nothing to assert across the drop, but it must not panic or leak a
    // pending timer into a dead world.
    let mut session = session_with(5.0, 2);
    let (registry, world) = session.split_mut();
    let _ = registry.spawn_from_pool(world, "Bullet", &Transform::default(), None, None);
    drop(session);
}

// -- data-driven configuration ----------------------------------------------

#[test]
fn session_from_pool_table() {
    let mut world = bullet_world(0.0);
    world.register_kind(InstanceKind::object("Droplet"));

    let table = PoolTable::from_json_str(
        r#"[
            { "type": "Bullet", "amountOfObjects": 3 },
            { "type": "Droplet", "amountOfObjects": 2 }
        ]"#,
    )
    .unwrap();

    let session = Session::new(
        world,
        SessionConfig {
            pools: table.into_specs(),
            ..SessionConfig::default()
        },
    );
    assert_eq!(session.registry().available_count("Bullet"), Some(3));
    assert_eq!(session.registry().available_count("Droplet"), Some(2));
}
