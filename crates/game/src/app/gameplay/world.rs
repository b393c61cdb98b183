use std::collections::HashMap;

use engine::{
    BodyHandle, EffectQueue, Notification, NotificationSink, PhysicsWorld, TransientEffectKind,
};
use glam::Vec3;
use rand::Rng;
use thiserror::Error;
use tracing::{debug, info};

use super::bot::{BotDamageOutcome, BotId, BotManager};
use super::layout::WorldLayout;
use super::loot::LootManager;
use super::player::{Player, PlayerDamageOutcome, ShotReport};
use super::session::SessionSettings;
use super::{DEFEAT_COLOR, DEFEAT_TEXT, SHOT_DAMAGE, VICTORY_COLOR, VICTORY_TEXT};

const HIT_MESSAGE: &str = "Hit Enemy!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EntityRef {
    Player,
    Bot(BotId),
    Static,
}

/// Non-owning map from physics bodies to the entity that drives them. Only
/// used to resolve ray hits and attack targets; never decides lifetimes.
#[derive(Debug, Default)]
pub(crate) struct BodyLookup {
    entries: HashMap<BodyHandle, EntityRef>,
}

impl BodyLookup {
    pub(crate) fn insert(&mut self, body: BodyHandle, entity: EntityRef) {
        self.entries.insert(body, entity);
    }

    pub(crate) fn resolve(&self, body: BodyHandle) -> Option<EntityRef> {
        self.entries.get(&body).copied()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

#[derive(Debug, Error)]
pub(crate) enum SpawnError {
    #[error("{entity} spawn position {position} is not finite")]
    NonFinitePosition { entity: &'static str, position: Vec3 },
    #[error("{entity} count {count} exceeds the limit of {limit}")]
    TooMany {
        entity: &'static str,
        count: usize,
        limit: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum GameOutcome {
    Victory,
    Defeat,
}

#[derive(Debug)]
pub(crate) struct World {
    loot: LootManager,
    bots: BotManager,
    lookup: BodyLookup,
    outcome: Option<GameOutcome>,
    last_alive_count: usize,
}

impl World {
    /// Scatters houses, trees, loot and bots into `physics` and registers the
    /// player body so hits on it resolve.
    pub(crate) fn build<R: Rng + ?Sized>(
        settings: &SessionSettings,
        physics: &mut dyn PhysicsWorld,
        player_body: BodyHandle,
        rng: &mut R,
    ) -> Result<Self, SpawnError> {
        let mut world = Self::empty();
        world.lookup.insert(player_body, EntityRef::Player);

        let layout = WorldLayout::generate(settings.house_count, settings.tree_count, rng)?;
        let static_bodies = layout.register_colliders(physics, &mut world.lookup)?;
        for house in layout.houses() {
            world.loot.spawn_loot(WorldLayout::loot_position(*house), rng);
        }
        world
            .bots
            .spawn_bots(settings.bot_count, physics, rng, &mut world.lookup)?;
        world.last_alive_count = world.bots.alive_count();

        info!(
            houses = layout.houses().len(),
            trees = layout.trees().len(),
            static_bodies,
            registered_bodies = world.lookup.len(),
            loot = world.loot.active_count(),
            bots = world.last_alive_count,
            "world_built"
        );
        Ok(world)
    }

    pub(crate) fn empty() -> Self {
        Self {
            loot: LootManager::default(),
            bots: BotManager::default(),
            lookup: BodyLookup::default(),
            outcome: None,
            last_alive_count: 0,
        }
    }

    #[cfg(test)]
    pub(crate) fn spawn_bot(
        &mut self,
        position: Vec3,
        heading: Vec3,
        physics: &mut dyn PhysicsWorld,
    ) -> Result<BotId, SpawnError> {
        let id = self.bots.spawn_bot(position, heading, physics, &mut self.lookup)?;
        self.last_alive_count = self.bots.alive_count();
        Ok(id)
    }

    pub(crate) fn loot(&self) -> &LootManager {
        &self.loot
    }

    pub(crate) fn loot_mut(&mut self) -> &mut LootManager {
        &mut self.loot
    }

    pub(crate) fn bots(&self) -> &BotManager {
        &self.bots
    }

    #[cfg(test)]
    pub(crate) fn bots_mut(&mut self) -> &mut BotManager {
        &mut self.bots
    }

    #[cfg(test)]
    pub(crate) fn lookup_mut(&mut self) -> &mut BodyLookup {
        &mut self.lookup
    }

    pub(crate) fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    pub(crate) fn is_game_over(&self) -> bool {
        self.outcome.is_some()
    }

    pub(crate) fn alive_count(&self) -> usize {
        self.bots.alive_count()
    }

    /// One orchestration step: bots move and roll attacks, attacks land on the
    /// player, picked-up loot is pruned, then the win condition is checked.
    pub(crate) fn update<R: Rng + ?Sized>(
        &mut self,
        dt_seconds: f32,
        physics: &mut dyn PhysicsWorld,
        player: &mut Player,
        rng: &mut R,
        notifications: &mut dyn NotificationSink,
        effects: &mut EffectQueue,
    ) {
        let attacks = self.bots.update(dt_seconds, physics, player.body(), rng);
        for attack in attacks {
            if self.lookup.resolve(attack.target) != Some(EntityRef::Player) {
                debug!(bot_id = attack.bot.0, target = attack.target.0, "bot_attack_target_stale");
                continue;
            }
            match player.take_damage(attack.damage) {
                PlayerDamageOutcome::Absorbed { health } => {
                    notifications.notify(Notification::HealthChanged { health });
                    effects.push(TransientEffectKind::DamageFlash);
                }
                PlayerDamageOutcome::Defeated => {
                    notifications.notify(Notification::HealthChanged { health: 0.0 });
                    effects.push(TransientEffectKind::DamageFlash);
                    self.finish(GameOutcome::Defeat, notifications);
                }
                PlayerDamageOutcome::Ignored => {}
            }
        }

        self.loot.prune();

        let alive = self.bots.alive_count();
        if alive != self.last_alive_count {
            self.last_alive_count = alive;
            notifications.notify(Notification::AliveCountChanged { alive });
        }
        if alive == 0 {
            self.finish(GameOutcome::Victory, notifications);
        }
    }

    /// Applies a shot to every distinct bot along the ray. Returns how many
    /// bots were struck.
    pub(crate) fn resolve_shot<R: Rng + ?Sized>(
        &mut self,
        report: &ShotReport,
        physics: &mut dyn PhysicsWorld,
        rng: &mut R,
        notifications: &mut dyn NotificationSink,
        effects: &mut EffectQueue,
    ) -> usize {
        let mut struck: Vec<BotId> = Vec::new();
        for hit in &report.hits {
            let Some(EntityRef::Bot(id)) = self.lookup.resolve(hit.body) else {
                continue;
            };
            if struck.contains(&id) {
                continue;
            }
            match self.bots.damage(id, SHOT_DAMAGE, physics, rng) {
                Some(BotDamageOutcome::Damaged { health }) => debug!(id = id.0, health, "bot_hit"),
                Some(BotDamageOutcome::Eliminated { kills }) => debug!(id = id.0, kills, "bot_out"),
                None => continue,
            }
            struck.push(id);
            effects.push(TransientEffectKind::BotHitFlash { body: hit.body });
        }

        if !struck.is_empty() {
            notifications.notify(Notification::message(HIT_MESSAGE));
            effects.push(TransientEffectKind::MessageBanner {
                text: HIT_MESSAGE.to_string(),
            });
        }
        struck.len()
    }

    fn finish(&mut self, outcome: GameOutcome, notifications: &mut dyn NotificationSink) {
        if self.outcome.is_some() {
            return;
        }
        self.outcome = Some(outcome);
        let (text, color) = match outcome {
            GameOutcome::Victory => (VICTORY_TEXT, VICTORY_COLOR),
            GameOutcome::Defeat => (DEFEAT_TEXT, DEFEAT_COLOR),
        };
        info!(outcome = ?outcome, "game_over");
        notifications.notify(Notification::game_over(text, color));
    }
}
