//! Integration tests for default-state capture and restore across full
//! acquire/release cycles, including the physics and visibility layers.

use std::sync::Arc;

use roost_pool::prelude::*;

/// A kind with the full component layering: root scene component, a physics
/// mesh, and a spatial-less logic component.
fn rocket_prototype() -> ActorState {
    ActorState {
        tick: TickSettings {
            enabled: true,
            interval: 0.05,
        },
        can_be_damaged: false,
        components: vec![
            SubComponent {
                active: true,
                scene: Some(SceneState::default()),
                ..SubComponent::default()
            },
            SubComponent {
                active: true,
                tags: vec!["mesh".to_owned(), "hull".to_owned()],
                tick: TickSettings {
                    enabled: true,
                    interval: 0.1,
                },
                scene: Some(SceneState {
                    relative_transform: Transform::at(0.0, 0.5, 0.0),
                    physics: Some(PhysicsState { simulating: true }),
                    ..SceneState::default()
                }),
            },
            SubComponent {
                active: false,
                tags: vec!["guidance".to_owned()],
                ..SubComponent::default()
            },
        ],
        ..ActorState::default()
    }
}

fn setup() -> (SceneWorld, PoolRegistry) {
    let mut world = SceneWorld::new();
    world.register_kind(InstanceKind::actor("Rocket", rocket_prototype()));
    let mut registry = PoolRegistry::new(vec![PoolSpec::new("Rocket", 2)]);
    registry.initialize_pools(&mut world);
    (world, registry)
}

fn acquire(world: &mut SceneWorld, registry: &mut PoolRegistry) -> InstanceId {
    registry
        .get_from_pool(world, "Rocket", SearchPolicy::AnyFree, SpawnPolicy::Ignore)
        .expect("pool has instances")
}

#[test]
fn every_captured_layer_is_restored() {
    let (mut world, mut registry) = setup();
    let id = acquire(&mut world, &mut registry);

    // Payload logic wrecks everything it can reach.
    {
        let actor = world.get_mut(id).unwrap().actor.as_mut().unwrap();
        actor.tick.interval = 99.0;
        actor.can_be_damaged = true;
        for component in &mut actor.components {
            component.active = !component.active;
            component.tags.push("dirty".to_owned());
            component.tick.interval += 1.0;
            if let Some(scene) = component.scene.as_mut() {
                scene.visible = false;
                scene.hidden_in_game = true;
                scene.relative_transform = Transform::at(9.0, 9.0, 9.0);
                if let Some(physics) = scene.physics.as_mut() {
                    physics.simulating = false;
                }
            }
        }
    }

    registry.return_to_pool(&mut world, id);
    let id2 = acquire(&mut world, &mut registry);
    assert_eq!(id, id2);

    let proto = rocket_prototype();
    let actor = world.get(id2).unwrap().actor.as_ref().unwrap();
    assert_eq!(actor.tick.interval, proto.tick.interval);
    assert_eq!(actor.can_be_damaged, proto.can_be_damaged);
    for (restored, pristine) in actor.components.iter().zip(proto.components.iter()).skip(1) {
        assert_eq!(restored.active, pristine.active);
        assert_eq!(restored.tags, pristine.tags);
        assert_eq!(restored.tick, pristine.tick);
        match (&restored.scene, &pristine.scene) {
            (Some(restored), Some(pristine)) => {
                assert_eq!(restored.relative_transform, pristine.relative_transform);
                assert_eq!(restored.visible, pristine.visible);
                assert_eq!(restored.hidden_in_game, pristine.hidden_in_game);
                assert_eq!(restored.physics, pristine.physics);
            }
            (None, None) => {}
            mismatch => panic!("scene layer drifted: {mismatch:?}"),
        }
    }
}

#[test]
fn restore_digest_is_stable_over_many_cycles() {
    let (mut world, mut registry) = setup();

    let id = acquire(&mut world, &mut registry);
    let pristine_digest = DefaultStateSnapshot::capture(world.get(id).unwrap()).content_hash();
    registry.return_to_pool(&mut world, id);

    for cycle in 0..10 {
        let id = acquire(&mut world, &mut registry);
        {
            let actor = world.get_mut(id).unwrap().actor.as_mut().unwrap();
            actor.components[1].tags.clear();
            actor.tick.interval = cycle as f32;
        }
        registry.return_to_pool(&mut world, id);

        let id = acquire(&mut world, &mut registry);
        let digest = DefaultStateSnapshot::capture(world.get(id).unwrap()).content_hash();
        assert_eq!(digest, pristine_digest, "drift after cycle {cycle}");
        registry.return_to_pool(&mut world, id);
    }
}

#[test]
fn world_placement_survives_activation() {
    let (mut world, mut registry) = setup();

    let target = Transform::at(10.0, 20.0, 30.0);
    let id = registry
        .spawn_from_pool(&mut world, "Rocket", &target, None, None)
        .unwrap();

    // The root placement is the caller's; restore must not have reset it.
    let actor = world.get(id).unwrap().actor.as_ref().unwrap();
    assert_eq!(actor.transform, target);
}

#[test]
fn holder_snapshot_matches_prototype() {
    let (_world, registry) = setup();
    let defaults = registry.holder("Rocket").unwrap().defaults();
    let proto = rocket_prototype();

    let captured = defaults.actor.as_ref().unwrap();
    assert_eq!(captured.tick, proto.tick);
    assert_eq!(captured.can_be_damaged, proto.can_be_damaged);
    assert_eq!(captured.components.len(), proto.components.len());
    assert_eq!(
        captured.components[1].scene.as_ref().unwrap().simulating_physics,
        Some(true)
    );
    // The logic component has no scene layer in the capture either.
    assert!(captured.components[2].scene.is_none());
}

#[test]
fn object_like_pool_round_trips_without_actor_state() {
    struct Marker;
    impl Poolable for Marker {
        fn became_active(&self, _world: &mut SceneWorld, _id: InstanceId) {}
        fn became_inactive(&self, _world: &mut SceneWorld, _id: InstanceId, _r: ReturnReason) {}
    }

    let mut world = SceneWorld::new();
    world.register_kind(InstanceKind::object("SaveSlot").with_hooks(Arc::new(Marker)));
    let mut registry = PoolRegistry::new(vec![PoolSpec::new("SaveSlot", 2)]);
    registry.initialize_pools(&mut world);

    let id = registry
        .get_from_pool(&mut world, "SaveSlot", SearchPolicy::AnyFree, SpawnPolicy::Ignore)
        .unwrap();
    assert!(world.get(id).unwrap().actor.is_none());
    assert!(registry.is_instance_active(&world, id));

    assert!(registry.return_to_pool(&mut world, id));
    assert_eq!(registry.available_count("SaveSlot"), Some(2));
}
