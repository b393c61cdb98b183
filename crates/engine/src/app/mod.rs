mod effects;
mod input;
mod loop_runner;
mod metrics;
mod notify;
mod simulation;

pub use effects::{
    EffectQueue, TransientEffect, TransientEffectKind, BOT_HIT_FLASH_TTL_SECONDS,
    DAMAGE_FLASH_TTL_SECONDS, MESSAGE_BANNER_TTL_SECONDS, SHOT_TRAIL_TTL_SECONDS,
};
pub use input::{InputAction, IntentSnapshot};
pub use loop_runner::{
    run_headless, AppError, LoopConfig, LoopReport, StopReason, REALTIME_ENV_VAR,
};
pub use metrics::LoopMetricsSnapshot;
pub use notify::{Notification, NotificationKind, NotificationQueue, NotificationSink, TracingSink};
pub use simulation::{IntentSource, ScriptedIntents, Simulation, TickOutcome};
