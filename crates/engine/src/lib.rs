pub mod app;
pub mod physics;

pub use app::{
    run_headless, AppError, EffectQueue, InputAction, IntentSnapshot, IntentSource, LoopConfig,
    LoopMetricsSnapshot, LoopReport, Notification, NotificationKind, NotificationQueue,
    NotificationSink, ScriptedIntents, Simulation, StopReason, TickOutcome, TracingSink,
    TransientEffect, TransientEffectKind,
};
pub use physics::{
    BodyDesc, BodyHandle, ColliderShape, PhysicsError, PhysicsWorld, Ray, RayHit, RigidBody,
    SimplePhysicsWorld,
};
