use engine::{
    EffectQueue, IntentSnapshot, Notification, NotificationQueue, NotificationSink, PhysicsWorld,
    SimplePhysicsWorld, Simulation, TickOutcome, TransientEffectKind,
};
use glam::Vec3;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use super::bot::{BotId, BotState};
use super::loot::{LootId, LootKind, PickupOutcome};
use super::player::{LifeState, MotionState, MovementIntent, Player};
use super::world::{GameOutcome, SpawnError, World};
use super::{
    DEFAULT_BOT_COUNT, DEFAULT_HOUSE_COUNT, DEFAULT_TREE_COUNT, GAMEPLAY_TICK_ORDER_TEXT,
    PLAYER_SPAWN_POSITION, SHOT_TRAIL_LENGTH,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SessionSettings {
    pub(crate) bot_count: usize,
    pub(crate) house_count: usize,
    pub(crate) tree_count: usize,
    /// Fixed seed for reproducible sessions; entropy when `None`.
    pub(crate) seed: Option<u64>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            bot_count: DEFAULT_BOT_COUNT,
            house_count: DEFAULT_HOUSE_COUNT,
            tree_count: DEFAULT_TREE_COUNT,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct BotView {
    pub(crate) id: BotId,
    pub(crate) position: Vec3,
    pub(crate) state: BotState,
    pub(crate) kills: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct LootView {
    pub(crate) kind: LootKind,
    pub(crate) position: Vec3,
}

/// Read-only snapshot handed to intent sources between ticks.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SessionView {
    pub(crate) player_position: Vec3,
    pub(crate) eye_position: Vec3,
    pub(crate) yaw: f32,
    pub(crate) pitch: f32,
    pub(crate) health: f32,
    pub(crate) ammo: u32,
    pub(crate) motion: MotionState,
    pub(crate) life: LifeState,
    pub(crate) nearby_loot: Option<LootId>,
    pub(crate) bots: Vec<BotView>,
    pub(crate) loot: Vec<LootView>,
    pub(crate) alive_count: usize,
    pub(crate) outcome: Option<GameOutcome>,
    pub(crate) elapsed_seconds: f32,
}

/// One play-through: the physics world, the player and everything the world
/// spawned around them. Ticks are strictly sequential.
pub(crate) struct Session<P: PhysicsWorld = SimplePhysicsWorld> {
    physics: P,
    player: Player,
    world: World,
    rng: StdRng,
    notifications: NotificationQueue,
    effects: EffectQueue,
    elapsed_seconds: f32,
    ticks: u64,
}

impl Session<SimplePhysicsWorld> {
    pub(crate) fn new(settings: &SessionSettings) -> Result<Self, SpawnError> {
        Self::with_physics(SimplePhysicsWorld::default(), settings)
    }
}

impl<P: PhysicsWorld> Session<P> {
    pub(crate) fn with_physics(physics: P, settings: &SessionSettings) -> Result<Self, SpawnError> {
        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_physics_and_rng(physics, settings, rng)
    }

    pub(crate) fn with_physics_and_rng(
        mut physics: P,
        settings: &SessionSettings,
        mut rng: StdRng,
    ) -> Result<Self, SpawnError> {
        let player = Player::spawn(&mut physics, PLAYER_SPAWN_POSITION);
        let world = World::build(settings, &mut physics, player.body(), &mut rng)?;
        debug!(order = GAMEPLAY_TICK_ORDER_TEXT, "session_tick_order");
        info!(
            bots = settings.bot_count,
            houses = settings.house_count,
            trees = settings.tree_count,
            seed = ?settings.seed,
            "session_started"
        );

        let mut notifications = NotificationQueue::default();
        notifications.notify(Notification::AmmoChanged {
            ammo: player.ammo(),
        });
        notifications.notify(Notification::HealthChanged {
            health: player.health(),
        });
        notifications.notify(Notification::AliveCountChanged {
            alive: world.alive_count(),
        });

        Ok(Self {
            physics,
            player,
            world,
            rng,
            notifications,
            effects: EffectQueue::default(),
            elapsed_seconds: 0.0,
            ticks: 0,
        })
    }

    #[cfg(test)]
    pub(crate) fn player(&self) -> &Player {
        &self.player
    }

    #[cfg(test)]
    pub(crate) fn world(&self) -> &World {
        &self.world
    }

    #[cfg(test)]
    pub(crate) fn physics_mut(&mut self) -> &mut P {
        &mut self.physics
    }

    #[cfg(test)]
    pub(crate) fn effects(&self) -> &EffectQueue {
        &self.effects
    }

    #[cfg(test)]
    pub(crate) fn pending_notifications(&self) -> &[Notification] {
        self.notifications.pending()
    }

    #[cfg(test)]
    pub(crate) fn ticks(&self) -> u64 {
        self.ticks
    }

    fn apply_intent(&mut self, intent: &IntentSnapshot) {
        let (yaw_delta, pitch_delta) = intent.look_delta();
        self.player.apply_look(yaw_delta, pitch_delta);
        self.player.set_movement(MovementIntent::from(intent));

        if intent.jump_pressed() {
            self.player.jump(&mut self.physics);
        }

        if intent.fire_pressed() {
            match self.player.shoot(&self.physics) {
                Some(report) => {
                    self.notifications
                        .notify(Notification::AmmoChanged { ammo: report.ammo });
                    self.effects.push(TransientEffectKind::ShotTrail {
                        from: report.ray.origin(),
                        to: report.ray.point_at(SHOT_TRAIL_LENGTH),
                    });
                    self.world.resolve_shot(
                        &report,
                        &mut self.physics,
                        &mut self.rng,
                        &mut self.notifications,
                        &mut self.effects,
                    );
                }
                None => debug!(ammo = self.player.ammo(), "shot_not_fired"),
            }
        }

        if intent.interact_pressed() {
            if let Some(outcome) = self.player.try_interact(self.world.loot_mut()) {
                self.notifications.notify(match outcome {
                    PickupOutcome::AmmoGranted { ammo } => Notification::AmmoChanged { ammo },
                    PickupOutcome::Healed { health } => Notification::HealthChanged { health },
                });
                self.notifications
                    .notify(Notification::message(outcome.message()));
                self.effects.push(TransientEffectKind::MessageBanner {
                    text: outcome.message().to_string(),
                });
            }
        }
    }
}

impl<P: PhysicsWorld> Simulation for Session<P> {
    type View = SessionView;

    fn tick(&mut self, dt_seconds: f32, intent: &IntentSnapshot) -> TickOutcome {
        if self.world.is_game_over() {
            return TickOutcome::Finished;
        }

        self.apply_intent(intent);
        self.player
            .update(dt_seconds, &mut self.physics, self.world.loot().items());
        self.world.update(
            dt_seconds,
            &mut self.physics,
            &mut self.player,
            &mut self.rng,
            &mut self.notifications,
            &mut self.effects,
        );
        self.physics.step(dt_seconds);
        self.effects.tick(dt_seconds);

        self.elapsed_seconds += dt_seconds;
        self.ticks = self.ticks.saturating_add(1);

        if self.world.is_game_over() {
            TickOutcome::Finished
        } else {
            TickOutcome::Continue
        }
    }

    fn view(&self) -> SessionView {
        let player_position = self
            .physics
            .body(self.player.body())
            .map_or(Vec3::ZERO, |body| body.position);
        let bots = self
            .world
            .bots()
            .bots()
            .iter()
            .filter_map(|bot| {
                let body = self.physics.body(bot.body())?;
                Some(BotView {
                    id: bot.id(),
                    position: body.position,
                    state: bot.state(),
                    kills: bot.kills(),
                })
            })
            .collect();
        let loot = self
            .world
            .loot()
            .items()
            .iter()
            .filter(|item| item.is_active())
            .map(|item| LootView {
                kind: item.kind(),
                position: item.position(),
            })
            .collect();

        SessionView {
            player_position,
            eye_position: self.player.eye_position(),
            yaw: self.player.yaw(),
            pitch: self.player.pitch(),
            health: self.player.health(),
            ammo: self.player.ammo(),
            motion: self.player.motion(),
            life: self.player.life(),
            nearby_loot: self.player.nearby_loot(),
            bots,
            loot,
            alive_count: self.world.alive_count(),
            outcome: self.world.outcome(),
            elapsed_seconds: self.elapsed_seconds,
        }
    }

    fn drain_notifications(&mut self) -> Vec<Notification> {
        self.notifications.drain()
    }

    fn shutdown(&mut self) {
        info!(
            ticks = self.ticks,
            elapsed_seconds = self.elapsed_seconds,
            ammo = self.player.ammo(),
            health = self.player.health(),
            alive = self.world.alive_count(),
            outcome = ?self.world.outcome(),
            "session_shutdown"
        );
    }
}
