use std::f32::consts::{PI, TAU};

use engine::{InputAction, IntentSnapshot, IntentSource};
use glam::Vec3;
use tracing::debug;

use super::gameplay::{BotId, BotState, BotView, LifeState, LootKind, MotionState, SessionView};

const MAX_TURN_PER_TICK: f32 = 0.08;
const AIM_TOLERANCE: f32 = 0.03;
const FIRE_INTERVAL_TICKS: u64 = 12;
const FIRE_RANGE: f32 = 60.0;
const STANDOFF_DISTANCE: f32 = 6.0;
const LOOT_APPROACH_DISTANCE: f32 = 1.0;
const LOW_HEALTH: f32 = 50.0;

/// Scripted player for headless runs. It hunts the bots that still count as
/// alive, preferring ones already chasing it, and detours to loot when out of
/// ammo or low on health.
#[derive(Debug, Default)]
pub(crate) struct DemoPilot {
    ticks: u64,
    last_shot_tick: Option<u64>,
    target: Option<BotId>,
}

impl DemoPilot {
    fn can_fire(&self) -> bool {
        self.last_shot_tick
            .map_or(true, |last| self.ticks.saturating_sub(last) >= FIRE_INTERVAL_TICKS)
    }

    fn select_target(&mut self, view: &SessionView) -> Option<Vec3> {
        let best = view
            .bots
            .iter()
            .filter(|bot| bot.kills == 0)
            .min_by(|a, b| {
                let a_rank = (a.state != BotState::Chase, distance_to(view, a));
                let b_rank = (b.state != BotState::Chase, distance_to(view, b));
                a_rank.0.cmp(&b_rank.0).then(a_rank.1.total_cmp(&b_rank.1))
            });
        let id = best.map(|bot| bot.id);
        if id != self.target {
            self.target = id;
            debug!(bot_id = ?id.map(|id| id.0), "pilot_target_changed");
        }
        best.map(|bot| bot.position)
    }
}

impl IntentSource<SessionView> for DemoPilot {
    fn next_intent(&mut self, view: &SessionView) -> IntentSnapshot {
        self.ticks = self.ticks.saturating_add(1);
        let mut intent = IntentSnapshot::empty();
        if view.life == LifeState::Defeated || view.outcome.is_some() {
            return intent;
        }

        if view.nearby_loot.is_some() {
            intent = intent.with_action_down(InputAction::Interact, true);
        }

        let loot_goal = wanted_loot(view).and_then(|kind| nearest_loot(view, kind));
        let (goal, approach, engage) = match loot_goal {
            Some(position) => (position, LOOT_APPROACH_DISTANCE, false),
            None => match self.select_target(view) {
                Some(position) => (position, STANDOFF_DISTANCE, true),
                None => return intent,
            },
        };

        let offset = goal - view.eye_position;
        let planar_distance = Vec3::new(offset.x, 0.0, offset.z).length();
        let desired_yaw = (-offset.x).atan2(-offset.z);
        let desired_pitch = offset.y.atan2(planar_distance.max(f32::EPSILON));
        let yaw_error = wrap_angle(desired_yaw - view.yaw);
        let pitch_error = desired_pitch - view.pitch;
        intent = intent.with_look_delta(
            yaw_error.clamp(-MAX_TURN_PER_TICK, MAX_TURN_PER_TICK),
            pitch_error.clamp(-MAX_TURN_PER_TICK, MAX_TURN_PER_TICK),
        );

        // Steering while parachuting is pointless; wait for the ground.
        if view.motion == MotionState::Grounded && planar_distance > approach {
            intent = intent.with_action_down(InputAction::MoveForward, true);
        }

        let aimed = yaw_error.abs() < AIM_TOLERANCE && pitch_error.abs() < AIM_TOLERANCE;
        if engage && aimed && view.ammo > 0 && offset.length() < FIRE_RANGE && self.can_fire() {
            self.last_shot_tick = Some(self.ticks);
            intent = intent.with_action_down(InputAction::Fire, true);
        }
        intent
    }
}

fn wanted_loot(view: &SessionView) -> Option<LootKind> {
    if view.ammo == 0 {
        Some(LootKind::Weapon)
    } else if view.health < LOW_HEALTH {
        Some(LootKind::Medkit)
    } else {
        None
    }
}

fn nearest_loot(view: &SessionView, kind: LootKind) -> Option<Vec3> {
    view.loot
        .iter()
        .filter(|item| item.kind == kind)
        .map(|item| item.position)
        .min_by(|a, b| {
            a.distance_squared(view.player_position)
                .total_cmp(&b.distance_squared(view.player_position))
        })
}

fn distance_to(view: &SessionView, bot: &BotView) -> f32 {
    bot.position.distance_squared(view.player_position)
}

fn wrap_angle(angle: f32) -> f32 {
    (angle + PI).rem_euclid(TAU) - PI
}
