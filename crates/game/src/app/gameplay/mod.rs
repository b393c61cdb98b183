use std::f32::consts::FRAC_PI_2;

use glam::Vec3;

mod bot;
mod layout;
mod loot;
mod player;
mod session;
mod world;

pub(crate) use bot::{BotId, BotState};
pub(crate) use loot::LootKind;
pub(crate) use player::{LifeState, MotionState};
pub(crate) use session::{BotView, Session, SessionSettings, SessionView};
pub(crate) use world::SpawnError;

#[cfg(test)]
pub(crate) use loot::LootId;
#[cfg(test)]
pub(crate) use session::LootView;

const PLAYER_SPAWN_POSITION: Vec3 = Vec3::new(0.0, 200.0, 0.0);
const PLAYER_RADIUS: f32 = 1.0;
const PLAYER_MASS: f32 = 70.0;
const PLAYER_LINEAR_DAMPING: f32 = 0.9;
const PLAYER_EYE_OFFSET: f32 = 0.6;
const PLAYER_MOVE_SPEED: f32 = 15.0;
const PLAYER_JUMP_SPEED: f32 = 8.0;
const PLAYER_MAX_HEALTH: f32 = 100.0;
const PLAYER_STARTING_AMMO: u32 = 30;
const LOOK_PITCH_LIMIT: f32 = FRAC_PI_2;
const GROUND_CONTACT_HEIGHT: f32 = 1.1;
const PARACHUTE_MIN_HEIGHT: f32 = 10.0;
const PARACHUTE_TRIGGER_SPEED: f32 = -10.0;
const PARACHUTE_LIFT_PER_SECOND: f32 = 20.0;
const LOOT_PICKUP_RADIUS: f32 = 3.0;
const SHOT_DAMAGE: f32 = 20.0;
const SHOT_MAX_DISTANCE: f32 = f32::INFINITY;
const SHOT_TRAIL_LENGTH: f32 = 100.0;

const BOT_MAX_HEALTH: f32 = 100.0;
const BOT_RADIUS: f32 = 1.0;
const BOT_HALF_HEIGHT: f32 = 1.0;
const BOT_MASS: f32 = 50.0;
const BOT_MOVE_SPEED: f32 = 5.0;
const BOT_AGGRO_RADIUS: f32 = 20.0;
const BOT_ATTACK_RANGE: f32 = 2.0;
const BOT_ATTACK_CHANCE_PER_TICK: f64 = 0.05;
const BOT_ATTACK_DAMAGE: f32 = 10.0;
const BOT_WANDER_INTERVAL_SECONDS: f32 = 2.0;
const BOT_SPAWN_HALF_EXTENT: f32 = 50.0;
const BOT_SPAWN_HEIGHT: f32 = 2.0;
const BOT_RESPAWN_HEIGHT: f32 = 10.0;

const LOOT_WEAPON_PROBABILITY: f64 = 0.5;
const WEAPON_AMMO_BONUS: u32 = 30;
const MEDKIT_HEAL_AMOUNT: f32 = 50.0;
const LOOT_SPAWN_HEIGHT: f32 = 1.0;

pub(crate) const DEFAULT_BOT_COUNT: usize = 5;
pub(crate) const DEFAULT_HOUSE_COUNT: usize = 15;
pub(crate) const DEFAULT_TREE_COUNT: usize = 50;
const HOUSE_SCATTER_HALF_EXTENT: f32 = 200.0;
const TREE_SCATTER_HALF_EXTENT: f32 = 400.0;

const VICTORY_TEXT: &str = "BOOYAH! YOU WIN!";
const VICTORY_COLOR: &str = "#ffcc00";
const DEFEAT_TEXT: &str = "GAME OVER";
const DEFEAT_COLOR: &str = "red";
const GAMEPLAY_TICK_ORDER_TEXT: &str =
    "Intents>Player>Bots>BotAttacks>LootPrune>WinCheck>Physics>Effects";
