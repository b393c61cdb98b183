use engine::{
    BodyDesc, BodyHandle, ColliderShape, InputAction, IntentSnapshot, PhysicsWorld, Ray, RayHit,
};
use glam::{Quat, Vec3};
use tracing::{debug, info, warn};

use super::loot::{LootId, LootItem, LootManager, PickupOutcome};
use super::{
    GROUND_CONTACT_HEIGHT, LOOK_PITCH_LIMIT, LOOT_PICKUP_RADIUS, PARACHUTE_LIFT_PER_SECOND,
    PARACHUTE_MIN_HEIGHT, PARACHUTE_TRIGGER_SPEED, PLAYER_EYE_OFFSET, PLAYER_JUMP_SPEED,
    PLAYER_LINEAR_DAMPING, PLAYER_MASS, PLAYER_MAX_HEALTH, PLAYER_MOVE_SPEED, PLAYER_RADIUS,
    PLAYER_STARTING_AMMO, SHOT_MAX_DISTANCE,
};

/// Vertical state, recomputed once per tick from the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum MotionState {
    Grounded,
    #[default]
    Airborne,
    /// Airborne, high up and dropping fast enough for the parachute lift.
    FallingFast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum LifeState {
    #[default]
    Alive,
    Defeated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct MovementIntent {
    pub(crate) forward: bool,
    pub(crate) backward: bool,
    pub(crate) left: bool,
    pub(crate) right: bool,
}

impl MovementIntent {
    /// Camera-space planar velocity, -Z forward.
    fn local_velocity(self) -> Vec3 {
        let axis = |negative: bool, positive: bool| {
            (f32::from(u8::from(positive)) - f32::from(u8::from(negative))) * PLAYER_MOVE_SPEED
        };
        Vec3::new(axis(self.left, self.right), 0.0, axis(self.forward, self.backward))
    }
}

impl From<&IntentSnapshot> for MovementIntent {
    fn from(intent: &IntentSnapshot) -> Self {
        Self {
            forward: intent.is_down(InputAction::MoveForward),
            backward: intent.is_down(InputAction::MoveBackward),
            left: intent.is_down(InputAction::MoveLeft),
            right: intent.is_down(InputAction::MoveRight),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum PlayerDamageOutcome {
    Absorbed { health: f32 },
    Defeated,
    Ignored,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ShotReport {
    pub(crate) ray: Ray,
    /// Every collider along the ray, nearest first. May include the shooter.
    pub(crate) hits: Vec<RayHit>,
    pub(crate) ammo: u32,
}

#[derive(Debug, Clone)]
pub(crate) struct Player {
    body: BodyHandle,
    yaw: f32,
    pitch: f32,
    health: f32,
    ammo: u32,
    motion: MotionState,
    life: LifeState,
    nearby_loot: Option<LootId>,
    eye_position: Vec3,
    movement: MovementIntent,
}

impl Player {
    pub(crate) fn spawn(physics: &mut dyn PhysicsWorld, position: Vec3) -> Self {
        let body = physics.add_body(
            BodyDesc::dynamic(
                position,
                PLAYER_MASS,
                ColliderShape::Sphere {
                    radius: PLAYER_RADIUS,
                },
            )
            .with_linear_damping(PLAYER_LINEAR_DAMPING),
        );
        info!(body = body.0, x = position.x, y = position.y, z = position.z, "player_spawned");
        Self::with_body(body, position)
    }

    fn with_body(body: BodyHandle, position: Vec3) -> Self {
        Self {
            body,
            yaw: 0.0,
            pitch: 0.0,
            health: PLAYER_MAX_HEALTH,
            ammo: PLAYER_STARTING_AMMO,
            motion: MotionState::default(),
            life: LifeState::default(),
            nearby_loot: None,
            eye_position: position + Vec3::Y * PLAYER_EYE_OFFSET,
            movement: MovementIntent::default(),
        }
    }

    /// Player with no physics body, for stat-only tests.
    #[cfg(test)]
    pub(crate) fn detached() -> Self {
        Self::with_body(BodyHandle(u64::MAX), Vec3::ZERO)
    }

    pub(crate) fn body(&self) -> BodyHandle {
        self.body
    }

    pub(crate) fn yaw(&self) -> f32 {
        self.yaw
    }

    pub(crate) fn pitch(&self) -> f32 {
        self.pitch
    }

    pub(crate) fn health(&self) -> f32 {
        self.health
    }

    pub(crate) fn ammo(&self) -> u32 {
        self.ammo
    }

    pub(crate) fn motion(&self) -> MotionState {
        self.motion
    }

    pub(crate) fn life(&self) -> LifeState {
        self.life
    }

    pub(crate) fn is_alive(&self) -> bool {
        self.life == LifeState::Alive
    }

    pub(crate) fn nearby_loot(&self) -> Option<LootId> {
        self.nearby_loot
    }

    pub(crate) fn eye_position(&self) -> Vec3 {
        self.eye_position
    }

    pub(crate) fn view_direction(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        Vec3::new(-sin_yaw * cos_pitch, sin_pitch, -cos_yaw * cos_pitch)
    }

    pub(crate) fn apply_look(&mut self, yaw_delta: f32, pitch_delta: f32) {
        if !self.is_alive() {
            return;
        }
        self.yaw += yaw_delta;
        self.pitch = (self.pitch + pitch_delta).clamp(-LOOK_PITCH_LIMIT, LOOK_PITCH_LIMIT);
    }

    pub(crate) fn set_movement(&mut self, movement: MovementIntent) {
        if self.is_alive() {
            self.movement = movement;
        }
    }

    /// Advances the controller by one tick. `loot` is this tick's collection
    /// before pruning; inactive entries are skipped.
    pub(crate) fn update(
        &mut self,
        dt_seconds: f32,
        physics: &mut dyn PhysicsWorld,
        loot: &[LootItem],
    ) {
        let Some(body) = physics.body_mut(self.body) else {
            warn!(body = self.body.0, "player_body_missing");
            return;
        };

        self.eye_position = body.position + Vec3::Y * PLAYER_EYE_OFFSET;

        let planar = Quat::from_rotation_y(self.yaw) * self.movement.local_velocity();
        body.velocity.x = planar.x;
        body.velocity.z = planar.z;

        self.motion = if body.position.y < GROUND_CONTACT_HEIGHT {
            MotionState::Grounded
        } else if body.position.y > PARACHUTE_MIN_HEIGHT
            && body.velocity.y < PARACHUTE_TRIGGER_SPEED
        {
            MotionState::FallingFast
        } else {
            MotionState::Airborne
        };
        if self.motion == MotionState::FallingFast {
            body.velocity.y += PARACHUTE_LIFT_PER_SECOND * dt_seconds;
        }

        let position = body.position;
        self.nearby_loot = loot
            .iter()
            .find(|item| {
                item.is_active() && item.position().distance(position) < LOOT_PICKUP_RADIUS
            })
            .map(LootItem::id);
    }

    pub(crate) fn jump(&mut self, physics: &mut dyn PhysicsWorld) -> bool {
        if !self.is_alive() || self.motion != MotionState::Grounded {
            return false;
        }
        let Some(body) = physics.body_mut(self.body) else {
            return false;
        };
        body.velocity.y = PLAYER_JUMP_SPEED;
        self.motion = MotionState::Airborne;
        true
    }

    /// Fires one hit-scan round along the view direction. Returns `None`
    /// without spending ammo when the magazine is empty.
    pub(crate) fn shoot(&mut self, physics: &dyn PhysicsWorld) -> Option<ShotReport> {
        if !self.is_alive() || self.ammo == 0 {
            return None;
        }
        let ray = match Ray::new(self.eye_position, self.view_direction(), SHOT_MAX_DISTANCE) {
            Ok(ray) => ray,
            Err(error) => {
                warn!(%error, "shot_ray_rejected");
                return None;
            }
        };
        self.ammo -= 1;
        let hits = physics.cast_ray(&ray);
        debug!(ammo = self.ammo, hits = hits.len(), "player_shot");
        Some(ShotReport {
            ray,
            hits,
            ammo: self.ammo,
        })
    }

    pub(crate) fn take_damage(&mut self, amount: f32) -> PlayerDamageOutcome {
        if !self.is_alive() || !amount.is_finite() {
            return PlayerDamageOutcome::Ignored;
        }
        self.health = (self.health - amount).clamp(0.0, PLAYER_MAX_HEALTH);
        if self.health > 0.0 {
            return PlayerDamageOutcome::Absorbed {
                health: self.health,
            };
        }
        self.life = LifeState::Defeated;
        self.movement = MovementIntent::default();
        info!(amount, "player_defeated");
        PlayerDamageOutcome::Defeated
    }

    pub(crate) fn heal(&mut self, amount: f32) -> f32 {
        self.health = (self.health + amount).clamp(0.0, PLAYER_MAX_HEALTH);
        self.health
    }

    pub(crate) fn add_ammo(&mut self, amount: u32) -> u32 {
        self.ammo = self.ammo.saturating_add(amount);
        self.ammo
    }

    /// Picks up the loot item in range, if any. A slot pointing at an item
    /// that is already gone is cleared without effect.
    pub(crate) fn try_interact(&mut self, loot: &mut LootManager) -> Option<PickupOutcome> {
        if !self.is_alive() {
            return None;
        }
        let id = self.nearby_loot.take()?;
        let Some(item) = loot.find_mut(id) else {
            debug!(loot_id = id.0, "interact_target_stale");
            return None;
        };
        item.pickup(self)
    }
}

#[cfg(test)]
mod tests {
    use engine::SimplePhysicsWorld;

    use super::*;

    fn spawn_at(position: Vec3) -> (SimplePhysicsWorld, Player) {
        let mut physics = SimplePhysicsWorld::with_gravity(Vec3::ZERO);
        let player = Player::spawn(&mut physics, position);
        (physics, player)
    }

    #[test]
    fn forward_movement_follows_yaw() {
        let (mut physics, mut player) = spawn_at(Vec3::new(0.0, 1.0, 0.0));
        player.apply_look(std::f32::consts::FRAC_PI_2, 0.0);
        player.set_movement(MovementIntent {
            forward: true,
            ..MovementIntent::default()
        });

        player.update(1.0 / 60.0, &mut physics, &[]);

        let velocity = physics.body(player.body()).expect("body").velocity;
        assert!((velocity.x + PLAYER_MOVE_SPEED).abs() < 1e-4);
        assert!(velocity.z.abs() < 1e-4);
    }

    #[test]
    fn movement_overwrites_only_horizontal_velocity() {
        let (mut physics, mut player) = spawn_at(Vec3::new(0.0, 5.0, 0.0));
        physics.body_mut(player.body()).expect("body").velocity = Vec3::new(3.0, -2.0, 3.0);

        player.update(1.0 / 60.0, &mut physics, &[]);

        let velocity = physics.body(player.body()).expect("body").velocity;
        assert_eq!(velocity, Vec3::new(0.0, -2.0, 0.0));
    }

    #[test]
    fn pitch_is_clamped_to_straight_up_and_down() {
        let mut player = Player::detached();
        player.apply_look(0.0, 10.0);
        assert_eq!(player.pitch(), LOOK_PITCH_LIMIT);
        player.apply_look(0.0, -25.0);
        assert_eq!(player.pitch(), -LOOK_PITCH_LIMIT);
    }

    #[test]
    fn ground_threshold_sets_motion_state() {
        let (mut physics, mut player) = spawn_at(Vec3::new(0.0, 1.05, 0.0));
        player.update(1.0 / 60.0, &mut physics, &[]);
        assert_eq!(player.motion(), MotionState::Grounded);

        physics.body_mut(player.body()).expect("body").position.y = 1.2;
        player.update(1.0 / 60.0, &mut physics, &[]);
        assert_eq!(player.motion(), MotionState::Airborne);
    }

    #[test]
    fn jump_requires_ground_contact() {
        let (mut physics, mut player) = spawn_at(Vec3::new(0.0, 5.0, 0.0));
        player.update(1.0 / 60.0, &mut physics, &[]);
        assert!(!player.jump(&mut physics));

        physics.body_mut(player.body()).expect("body").position.y = 1.0;
        player.update(1.0 / 60.0, &mut physics, &[]);
        assert!(player.jump(&mut physics));
        assert_eq!(player.motion(), MotionState::Airborne);
        assert_eq!(
            physics.body(player.body()).expect("body").velocity.y,
            PLAYER_JUMP_SPEED
        );
        assert!(!player.jump(&mut physics));
    }

    #[test]
    fn view_direction_matches_yaw_and_pitch() {
        let mut player = Player::detached();
        assert!((player.view_direction() - Vec3::NEG_Z).length() < 1e-6);

        player.apply_look(0.0, LOOK_PITCH_LIMIT);
        assert!((player.view_direction() - Vec3::Y).length() < 1e-6);
    }

    #[test]
    fn shot_spends_one_round_and_reports_hits() {
        let (mut physics, mut player) = spawn_at(Vec3::new(0.0, 1.0, 0.0));
        let target = physics.add_body(BodyDesc::fixed(
            Vec3::new(0.0, 1.6, -10.0),
            ColliderShape::Sphere { radius: 1.0 },
        ));

        let report = player.shoot(&physics).expect("shot");

        assert_eq!(report.ammo, PLAYER_STARTING_AMMO - 1);
        assert_eq!(player.ammo(), PLAYER_STARTING_AMMO - 1);
        assert!(report.hits.iter().any(|hit| hit.body == target));
    }

    #[test]
    fn defeated_player_ignores_input() {
        let (mut physics, mut player) = spawn_at(Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(player.take_damage(250.0), PlayerDamageOutcome::Defeated);

        player.apply_look(1.0, 1.0);
        player.set_movement(MovementIntent {
            forward: true,
            ..MovementIntent::default()
        });
        player.update(1.0 / 60.0, &mut physics, &[]);

        assert_eq!(player.yaw(), 0.0);
        assert!(player.shoot(&physics).is_none());
        assert_eq!(player.ammo(), PLAYER_STARTING_AMMO);
        assert_eq!(physics.body(player.body()).expect("body").velocity.z, 0.0);
    }

    #[test]
    fn missing_body_leaves_state_untouched() {
        let mut physics = SimplePhysicsWorld::default();
        let mut player = Player::detached();
        player.update(1.0 / 60.0, &mut physics, &[]);
        assert!(!player.jump(&mut physics));
        assert_eq!(player.motion(), MotionState::Airborne);
    }
}
