//! Bullet storm demo: a lifetime-limited bullet pool under sustained fire.
//!
//! Fires a burst of bullets every few ticks from a pool of 32 with a 0.5s
//! lifespan and lets the expiry pump reclaim them. Run with:
//!
//! ```sh
//! cargo run --example bullet_storm
//! RUST_LOG=debug cargo run --example bullet_storm
//! ```

use std::sync::Arc;

use roost_engine::prelude::*;

struct BulletLogic;

impl Poolable for BulletLogic {
    fn became_active(&self, world: &mut SceneWorld, id: InstanceId) {
        if let Some(instance) = world.get(id) {
            tracing::debug!(name = %instance.name, "bullet fired");
        }
    }

    fn became_inactive(&self, world: &mut SceneWorld, id: InstanceId, reason: ReturnReason) {
        if let Some(instance) = world.get(id) {
            tracing::debug!(name = %instance.name, ?reason, "bullet parked");
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut world = SceneWorld::new();
    world.register_kind(
        InstanceKind::actor(
            "Bullet",
            ActorState {
                lifespan: 0.5,
                tick: TickSettings {
                    enabled: true,
                    interval: 0.0,
                },
                components: vec![
                    SubComponent {
                        active: true,
                        scene: Some(SceneState::default()),
                        ..SubComponent::default()
                    },
                    SubComponent {
                        active: true,
                        tags: vec!["tracer".to_owned()],
                        scene: Some(SceneState {
                            physics: Some(PhysicsState { simulating: true }),
                            ..SceneState::default()
                        }),
                        ..SubComponent::default()
                    },
                ],
                ..ActorState::default()
            },
        )
        .with_hooks(Arc::new(BulletLogic)),
    );

    let table = PoolTable::from_json_str(r#"[{ "type": "Bullet", "amountOfObjects": 32 }]"#)
        .expect("inline table parses");

    let mut session = Session::new(
        world,
        SessionConfig {
            pools: table.into_specs(),
            ..SessionConfig::default()
        },
    );

    // 5 seconds of simulation: a 6-bullet burst every 5 ticks.
    for tick in 0..300u32 {
        if tick % 5 == 0 {
            let (registry, world) = session.split_mut();
            let burst = registry.get_x_from_pool(world, "Bullet", 6);
            for (i, id) in burst.iter().enumerate() {
                world.set_transform(*id, &Transform::at(i as f32, 0.0, 0.0));
            }
            if burst.len() < 6 {
                tracing::info!(got = burst.len(), tick, "pool ran dry mid-burst");
            }
        }
        session.tick();

        if tick % 60 == 0 {
            let used = session.registry().used_count("Bullet").unwrap_or(0);
            let free = session.registry().available_count("Bullet").unwrap_or(0);
            tracing::info!(tick, used, free, "pool status");
        }
    }

    session.shutdown();
}
