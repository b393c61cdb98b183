use std::f32::consts::TAU;

use engine::{BodyDesc, BodyHandle, ColliderShape, PhysicsWorld};
use glam::Vec3;
use rand::Rng;
use tracing::{debug, info};

use super::world::{BodyLookup, EntityRef, SpawnError};
use super::{
    BOT_AGGRO_RADIUS, BOT_ATTACK_CHANCE_PER_TICK, BOT_ATTACK_DAMAGE, BOT_ATTACK_RANGE,
    BOT_HALF_HEIGHT, BOT_MASS, BOT_MAX_HEALTH, BOT_MOVE_SPEED, BOT_RADIUS, BOT_RESPAWN_HEIGHT,
    BOT_SPAWN_HALF_EXTENT, BOT_SPAWN_HEIGHT, BOT_WANDER_INTERVAL_SECONDS,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct BotId(pub(crate) u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum BotState {
    #[default]
    Wander,
    /// Pure pursuit of the player; attacks roll while in melee range.
    Chase,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct BotAttack {
    pub(crate) bot: BotId,
    pub(crate) target: BodyHandle,
    pub(crate) damage: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum BotDamageOutcome {
    Damaged { health: f32 },
    /// Health hit zero; the bot has already been respawned elsewhere.
    Eliminated { kills: u32 },
}

#[derive(Debug, Clone)]
pub(crate) struct Bot {
    id: BotId,
    body: BodyHandle,
    health: f32,
    state: BotState,
    heading: Vec3,
    wander_timer: f32,
    kills: u32,
}

impl Bot {
    pub(crate) fn id(&self) -> BotId {
        self.id
    }

    pub(crate) fn body(&self) -> BodyHandle {
        self.body
    }

    #[cfg(test)]
    pub(crate) fn health(&self) -> f32 {
        self.health
    }

    pub(crate) fn state(&self) -> BotState {
        self.state
    }

    #[cfg(test)]
    pub(crate) fn heading(&self) -> Vec3 {
        self.heading
    }

    /// Times this bot has been eliminated and respawned.
    pub(crate) fn kills(&self) -> u32 {
        self.kills
    }

    /// Counts toward the win condition until eliminated once.
    pub(crate) fn is_alive(&self) -> bool {
        self.kills == 0
    }

    pub(crate) fn update<R: Rng + ?Sized>(
        &mut self,
        dt_seconds: f32,
        physics: &mut dyn PhysicsWorld,
        player_body: BodyHandle,
        rng: &mut R,
    ) -> Option<BotAttack> {
        let player_position = physics.body(player_body).map(|body| body.position);
        let body = physics.body_mut(self.body)?;

        // The wander clock runs in every state; chase overrides the heading.
        self.wander_timer += dt_seconds;
        if self.wander_timer > BOT_WANDER_INTERVAL_SECONDS {
            self.wander_timer = 0.0;
            self.heading = random_heading(rng);
        }

        let mut attack = None;
        match player_position.map(|target| (target, target.distance(body.position))) {
            Some((target, distance)) if distance < BOT_AGGRO_RADIUS => {
                self.state = BotState::Chase;
                let offset = target - body.position;
                self.heading = Vec3::new(offset.x, 0.0, offset.z).normalize_or_zero();
                if distance < BOT_ATTACK_RANGE && rng.gen_bool(BOT_ATTACK_CHANCE_PER_TICK) {
                    attack = Some(BotAttack {
                        bot: self.id,
                        target: player_body,
                        damage: BOT_ATTACK_DAMAGE,
                    });
                }
            }
            _ => self.state = BotState::Wander,
        }

        body.velocity.x = self.heading.x * BOT_MOVE_SPEED;
        body.velocity.z = self.heading.z * BOT_MOVE_SPEED;
        attack
    }

    /// Subtracts `amount`; at zero health the bot respawns in place with full
    /// health at a random location.
    pub(crate) fn take_damage<R: Rng + ?Sized>(
        &mut self,
        amount: f32,
        physics: &mut dyn PhysicsWorld,
        rng: &mut R,
    ) -> BotDamageOutcome {
        self.health -= amount;
        if self.health > 0.0 {
            return BotDamageOutcome::Damaged {
                health: self.health,
            };
        }

        let position = scatter_position(rng, BOT_RESPAWN_HEIGHT);
        if let Some(body) = physics.body_mut(self.body) {
            body.position = position;
            body.velocity = Vec3::ZERO;
        }
        self.health = BOT_MAX_HEALTH;
        self.state = BotState::Wander;
        self.wander_timer = 0.0;
        self.kills = self.kills.saturating_add(1);
        info!(
            bot_id = self.id.0,
            kills = self.kills,
            x = position.x,
            z = position.z,
            "bot_respawned"
        );
        BotDamageOutcome::Eliminated { kills: self.kills }
    }
}

fn random_heading<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    let angle: f32 = rng.gen_range(0.0..TAU);
    Vec3::new(angle.sin(), 0.0, angle.cos())
}

fn scatter_position<R: Rng + ?Sized>(rng: &mut R, height: f32) -> Vec3 {
    Vec3::new(
        rng.gen_range(-BOT_SPAWN_HALF_EXTENT..BOT_SPAWN_HALF_EXTENT),
        height,
        rng.gen_range(-BOT_SPAWN_HALF_EXTENT..BOT_SPAWN_HALF_EXTENT),
    )
}

#[derive(Debug, Default)]
pub(crate) struct BotManager {
    bots: Vec<Bot>,
    next_bot_id: u32,
}

impl BotManager {
    pub(crate) fn spawn_bots<R: Rng + ?Sized>(
        &mut self,
        count: usize,
        physics: &mut dyn PhysicsWorld,
        rng: &mut R,
        lookup: &mut BodyLookup,
    ) -> Result<Vec<BotId>, SpawnError> {
        (0..count)
            .map(|_| {
                let position = scatter_position(rng, BOT_SPAWN_HEIGHT);
                let heading = random_heading(rng);
                self.spawn_bot(position, heading, physics, lookup)
            })
            .collect()
    }

    pub(crate) fn spawn_bot(
        &mut self,
        position: Vec3,
        heading: Vec3,
        physics: &mut dyn PhysicsWorld,
        lookup: &mut BodyLookup,
    ) -> Result<BotId, SpawnError> {
        if !position.is_finite() {
            return Err(SpawnError::NonFinitePosition {
                entity: "bot",
                position,
            });
        }
        let id = BotId(self.next_bot_id);
        self.next_bot_id = self.next_bot_id.saturating_add(1);

        let body = physics.add_body(
            BodyDesc::dynamic(
                position,
                BOT_MASS,
                ColliderShape::Cylinder {
                    radius: BOT_RADIUS,
                    half_height: BOT_HALF_HEIGHT,
                },
            )
            .with_fixed_rotation(true),
        );
        lookup.insert(body, EntityRef::Bot(id));
        self.bots.push(Bot {
            id,
            body,
            health: BOT_MAX_HEALTH,
            state: BotState::Wander,
            heading: Vec3::new(heading.x, 0.0, heading.z).normalize_or_zero(),
            wander_timer: 0.0,
            kills: 0,
        });
        debug!(bot_id = id.0, body = body.0, "bot_spawned");
        Ok(id)
    }

    pub(crate) fn update<R: Rng + ?Sized>(
        &mut self,
        dt_seconds: f32,
        physics: &mut dyn PhysicsWorld,
        player_body: BodyHandle,
        rng: &mut R,
    ) -> Vec<BotAttack> {
        self.bots
            .iter_mut()
            .filter_map(|bot| bot.update(dt_seconds, physics, player_body, rng))
            .collect()
    }

    /// `None` when `id` no longer names a bot.
    pub(crate) fn damage<R: Rng + ?Sized>(
        &mut self,
        id: BotId,
        amount: f32,
        physics: &mut dyn PhysicsWorld,
        rng: &mut R,
    ) -> Option<BotDamageOutcome> {
        let bot = self.bots.iter_mut().find(|bot| bot.id == id)?;
        Some(bot.take_damage(amount, physics, rng))
    }

    pub(crate) fn alive_count(&self) -> usize {
        self.bots.iter().filter(|bot| bot.is_alive()).count()
    }

    pub(crate) fn bots(&self) -> &[Bot] {
        &self.bots
    }

    #[cfg(test)]
    pub(crate) fn get(&self, id: BotId) -> Option<&Bot> {
        self.bots.iter().find(|bot| bot.id == id)
    }
}
