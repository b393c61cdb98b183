use std::env;
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{info, warn};

use super::metrics::{LoopMetrics, LoopMetricsSnapshot};
use super::notify::NotificationSink;
use super::simulation::{IntentSource, Simulation, TickOutcome};

pub const REALTIME_ENV_VAR: &str = "DROPZONE_REALTIME";

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub target_tps: u32,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    pub metrics_log_interval: Duration,
    pub session_time_limit: Option<Duration>,
    /// Pace ticks against the wall clock; otherwise every host frame advances
    /// exactly one fixed step as fast as possible.
    pub realtime: bool,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            target_tps: 60,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
            metrics_log_interval: Duration::from_secs(1),
            session_time_limit: None,
            realtime: false,
        }
    }
}

impl LoopConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.target_tps == 0 {
            return Err(AppError::InvalidLoopConfig {
                field: "target_tps",
                reason: "must be greater than zero",
            });
        }
        if self.max_ticks_per_frame == 0 {
            return Err(AppError::InvalidLoopConfig {
                field: "max_ticks_per_frame",
                reason: "must be greater than zero",
            });
        }
        if self.session_time_limit.is_some_and(|limit| limit.is_zero()) {
            return Err(AppError::InvalidLoopConfig {
                field: "session_time_limit",
                reason: "must be positive when set",
            });
        }
        Ok(())
    }

    pub fn fixed_dt(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.target_tps.max(1) as f64)
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid loop configuration: {field} {reason}")]
    InvalidLoopConfig {
        field: &'static str,
        reason: &'static str,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StopReason {
    #[default]
    SimulationFinished,
    QuitRequested,
    TimeLimitReached,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoopReport {
    pub ticks: u64,
    pub frames: u64,
    pub simulated: Duration,
    pub stop_reason: StopReason,
    /// Wall-clock rates over the whole run.
    pub metrics: LoopMetricsSnapshot,
}

pub fn run_headless<S, I>(
    config: &LoopConfig,
    simulation: &mut S,
    intents: &mut I,
    sink: &mut dyn NotificationSink,
) -> Result<LoopReport, AppError>
where
    S: Simulation,
    I: IntentSource<S::View>,
{
    config.validate()?;

    let fixed_dt = config.fixed_dt();
    let fixed_dt_seconds = fixed_dt.as_secs_f32();
    let max_frame_delta =
        normalize_non_zero_duration(config.max_frame_delta, Duration::from_millis(250));
    let metrics_log_interval =
        normalize_non_zero_duration(config.metrics_log_interval, Duration::from_secs(1));
    let realtime = resolve_realtime(config.realtime);

    info!(
        target_tps = config.target_tps,
        max_frame_delta_ms = max_frame_delta.as_millis() as u64,
        max_ticks_per_frame = config.max_ticks_per_frame,
        session_time_limit_ms = config
            .session_time_limit
            .map(|limit| limit.as_millis() as u64),
        realtime,
        "loop_config"
    );

    let mut report = LoopReport::default();
    let mut accumulator = Duration::ZERO;
    let mut last_frame_instant = Instant::now();
    let mut metrics = LoopMetrics::new(metrics_log_interval);

    'frames: loop {
        let now = Instant::now();
        let raw_frame_dt = now.saturating_duration_since(last_frame_instant);
        last_frame_instant = now;

        let ticks_to_run = if realtime {
            let frame_dt = clamp_frame_delta(raw_frame_dt, max_frame_delta);
            accumulator = accumulator.saturating_add(frame_dt);
            let step_plan = plan_sim_steps(accumulator, fixed_dt, config.max_ticks_per_frame);
            accumulator = step_plan.remaining_accumulator;
            if step_plan.dropped_backlog > Duration::ZERO {
                warn!(
                    dropped_backlog_ms = step_plan.dropped_backlog.as_millis() as u64,
                    max_ticks_per_frame = config.max_ticks_per_frame,
                    "sim_clamp_triggered"
                );
            }
            step_plan.ticks_to_run
        } else {
            1
        };

        for _ in 0..ticks_to_run {
            let intent = intents.next_intent(&simulation.view());
            if intent.quit_requested() {
                info!(reason = "intent_quit", "shutdown_requested");
                report.stop_reason = StopReason::QuitRequested;
                break 'frames;
            }

            let tick_started = Instant::now();
            let outcome = simulation.tick(fixed_dt_seconds, &intent);
            metrics.record_tick(tick_started.elapsed());
            for notification in simulation.drain_notifications() {
                sink.notify(notification);
            }

            report.ticks = report.ticks.saturating_add(1);
            report.simulated = report.simulated.saturating_add(fixed_dt);

            if outcome == TickOutcome::Finished {
                report.stop_reason = StopReason::SimulationFinished;
                break 'frames;
            }
            if config
                .session_time_limit
                .is_some_and(|limit| report.simulated >= limit)
            {
                info!(
                    simulated_ms = report.simulated.as_millis() as u64,
                    "session_time_limit_reached"
                );
                report.stop_reason = StopReason::TimeLimitReached;
                break 'frames;
            }
        }

        metrics.record_frame();
        report.frames = report.frames.saturating_add(1);
        if let Some(snapshot) = metrics.close_window(Instant::now()) {
            info!(
                fps = snapshot.fps,
                tps = snapshot.tps,
                tick_cost_ms = snapshot.tick_cost_ms,
                ticks_total = snapshot.ticks_total,
                "loop_metrics"
            );
        }

        if realtime {
            let until_next_tick = fixed_dt.saturating_sub(accumulator);
            if until_next_tick > Duration::ZERO {
                thread::sleep(until_next_tick);
            }
        }
    }

    simulation.shutdown();
    report.metrics = metrics.run_totals(Instant::now());
    info!(
        ticks = report.ticks,
        frames = report.frames,
        tps = report.metrics.tps,
        simulated_ms = report.simulated.as_millis() as u64,
        stop_reason = ?report.stop_reason,
        "shutdown"
    );
    Ok(report)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct StepPlan {
    ticks_to_run: u32,
    remaining_accumulator: Duration,
    dropped_backlog: Duration,
}

fn plan_sim_steps(
    mut accumulator: Duration,
    fixed_dt: Duration,
    max_ticks_per_frame: u32,
) -> StepPlan {
    let mut ticks_to_run = 0u32;

    while accumulator >= fixed_dt && ticks_to_run < max_ticks_per_frame {
        accumulator = accumulator.saturating_sub(fixed_dt);
        ticks_to_run = ticks_to_run.saturating_add(1);
    }

    if accumulator >= fixed_dt {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: Duration::ZERO,
            dropped_backlog: accumulator,
        }
    } else {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: accumulator,
            dropped_backlog: Duration::ZERO,
        }
    }
}

fn clamp_frame_delta(frame_dt: Duration, max_frame_delta: Duration) -> Duration {
    frame_dt.min(max_frame_delta)
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

fn resolve_realtime(config_realtime: bool) -> bool {
    match env::var(REALTIME_ENV_VAR) {
        Ok(value) => match value.trim() {
            "1" | "true" => true,
            "0" | "false" => false,
            other => {
                warn!(
                    env_var = REALTIME_ENV_VAR,
                    value = other,
                    "invalid realtime env var value; falling back to config"
                );
                config_realtime
            }
        },
        Err(env::VarError::NotPresent) => config_realtime,
        Err(err) => {
            warn!(
                env_var = REALTIME_ENV_VAR,
                error = %err,
                "unable to read realtime env var; falling back to config"
            );
            config_realtime
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::input::{InputAction, IntentSnapshot};
    use crate::app::notify::{Notification, NotificationQueue};
    use crate::app::simulation::ScriptedIntents;

    #[derive(Default)]
    struct CountingSimulation {
        ticks: u32,
        finish_after: Option<u32>,
        fired: u32,
        shut_down: bool,
        pending: Vec<Notification>,
    }

    impl Simulation for CountingSimulation {
        type View = u32;

        fn tick(&mut self, _dt_seconds: f32, intent: &IntentSnapshot) -> TickOutcome {
            self.ticks += 1;
            if intent.fire_pressed() {
                self.fired += 1;
                self.pending.push(Notification::message("fired"));
            }
            if self.finish_after.is_some_and(|limit| self.ticks >= limit) {
                TickOutcome::Finished
            } else {
                TickOutcome::Continue
            }
        }

        fn view(&self) -> u32 {
            self.ticks
        }

        fn drain_notifications(&mut self) -> Vec<Notification> {
            std::mem::take(&mut self.pending)
        }

        fn shutdown(&mut self) {
            self.shut_down = true;
        }
    }

    #[test]
    fn clamp_frame_delta_caps_large_frame() {
        let max_frame_delta = Duration::from_millis(250);
        assert_eq!(
            clamp_frame_delta(Duration::from_millis(600), max_frame_delta),
            max_frame_delta
        );
    }

    #[test]
    fn plan_sim_steps_runs_expected_ticks_without_drop() {
        let result = plan_sim_steps(Duration::from_millis(48), Duration::from_millis(16), 5);

        assert_eq!(result.ticks_to_run, 3);
        assert_eq!(result.remaining_accumulator, Duration::ZERO);
        assert_eq!(result.dropped_backlog, Duration::ZERO);
    }

    #[test]
    fn plan_sim_steps_drops_backlog_when_tick_cap_hit() {
        let result = plan_sim_steps(Duration::from_millis(120), Duration::from_millis(16), 3);

        assert_eq!(result.ticks_to_run, 3);
        assert_eq!(result.remaining_accumulator, Duration::ZERO);
        assert_eq!(result.dropped_backlog, Duration::from_millis(72));
    }

    #[test]
    fn zero_tick_rate_is_rejected() {
        let config = LoopConfig {
            target_tps: 0,
            ..LoopConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(AppError::InvalidLoopConfig {
                field: "target_tps",
                ..
            })
        ));
    }

    #[test]
    fn runner_stops_when_simulation_finishes() {
        let mut simulation = CountingSimulation {
            finish_after: Some(10),
            ..CountingSimulation::default()
        };
        let mut intents = ScriptedIntents::default();
        let mut sink = NotificationQueue::default();

        let report = run_headless(&LoopConfig::default(), &mut simulation, &mut intents, &mut sink)
            .expect("run");

        assert_eq!(report.ticks, 10);
        assert_eq!(report.stop_reason, StopReason::SimulationFinished);
        assert!(simulation.shut_down);
        assert_eq!(report.metrics.ticks_total, report.ticks);
        assert!(report.metrics.tps > 0.0);
    }

    #[test]
    fn runner_honors_time_limit() {
        let config = LoopConfig {
            target_tps: 10,
            session_time_limit: Some(Duration::from_secs(2)),
            ..LoopConfig::default()
        };
        let mut simulation = CountingSimulation::default();
        let mut intents = ScriptedIntents::default();
        let mut sink = NotificationQueue::default();

        let report = run_headless(&config, &mut simulation, &mut intents, &mut sink).expect("run");

        assert_eq!(report.ticks, 20);
        assert_eq!(report.stop_reason, StopReason::TimeLimitReached);
    }

    #[test]
    fn runner_forwards_notifications_and_honors_quit() {
        let mut simulation = CountingSimulation::default();
        let mut intents = ScriptedIntents::new(vec![
            IntentSnapshot::empty().with_action_down(InputAction::Fire, true),
            IntentSnapshot::empty(),
            IntentSnapshot::empty().with_action_down(InputAction::Quit, true),
        ]);
        let mut sink = NotificationQueue::default();

        let report = run_headless(&LoopConfig::default(), &mut simulation, &mut intents, &mut sink)
            .expect("run");

        assert_eq!(report.ticks, 2);
        assert_eq!(report.stop_reason, StopReason::QuitRequested);
        assert_eq!(simulation.fired, 1);
        assert_eq!(sink.drain(), vec![Notification::message("fired")]);
    }
}
