use glam::Vec3;

use crate::physics::BodyHandle;

pub const DAMAGE_FLASH_TTL_SECONDS: f32 = 0.2;
pub const BOT_HIT_FLASH_TTL_SECONDS: f32 = 0.1;
pub const SHOT_TRAIL_TTL_SECONDS: f32 = 0.1;
pub const MESSAGE_BANNER_TTL_SECONDS: f32 = 2.0;

#[derive(Debug, Clone, PartialEq)]
pub enum TransientEffectKind {
    DamageFlash,
    BotHitFlash { body: BodyHandle },
    ShotTrail { from: Vec3, to: Vec3 },
    MessageBanner { text: String },
}

impl TransientEffectKind {
    pub fn default_ttl_seconds(&self) -> f32 {
        match self {
            Self::DamageFlash => DAMAGE_FLASH_TTL_SECONDS,
            Self::BotHitFlash { .. } => BOT_HIT_FLASH_TTL_SECONDS,
            Self::ShotTrail { .. } => SHOT_TRAIL_TTL_SECONDS,
            Self::MessageBanner { .. } => MESSAGE_BANNER_TTL_SECONDS,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransientEffect {
    pub kind: TransientEffectKind,
    pub ttl_seconds: f32,
}

/// Presentation effects that revert on their own after a delay (flashes,
/// trails, banners). The presentation layer reads `active()` each frame.
#[derive(Debug, Default)]
pub struct EffectQueue {
    effects: Vec<TransientEffect>,
}

impl EffectQueue {
    pub fn push(&mut self, kind: TransientEffectKind) {
        let ttl_seconds = kind.default_ttl_seconds();
        self.effects.push(TransientEffect { kind, ttl_seconds });
    }

    pub fn active(&self) -> &[TransientEffect] {
        &self.effects
    }

    pub fn clear(&mut self) {
        self.effects.clear();
    }

    pub fn tick(&mut self, dt_seconds: f32) {
        for effect in &mut self.effects {
            effect.ttl_seconds -= dt_seconds;
        }
        self.effects.retain(|effect| effect.ttl_seconds > 0.0);
    }
}
