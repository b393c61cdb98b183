use std::process::ExitCode;

use engine::{run_headless, Simulation, TracingSink};
use tracing::{error, info};

use super::bootstrap::AppWiring;

pub(crate) fn run(mut app: AppWiring) -> ExitCode {
    let report = match run_headless(&app.config, &mut app.session, &mut app.pilot, &mut TracingSink)
    {
        Ok(report) => report,
        Err(err) => {
            error!(error = %err, "session_failed");
            return ExitCode::FAILURE;
        }
    };

    let view = app.session.view();
    info!(
        ticks = report.ticks,
        elapsed_seconds = view.elapsed_seconds,
        stop_reason = ?report.stop_reason,
        tps = report.metrics.tps,
        tick_cost_ms = report.metrics.tick_cost_ms,
        outcome = ?view.outcome,
        alive = view.alive_count,
        ammo = view.ammo,
        health = view.health,
        "session_summary"
    );
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use engine::{LoopConfig, NotificationKind, NotificationQueue, StopReason};

    use super::*;
    use crate::app::gameplay::{Session, SessionSettings};
    use crate::app::pilot::DemoPilot;

    #[test]
    fn piloted_session_stops_at_time_limit() {
        let mut session = Session::new(&SessionSettings {
            seed: Some(77),
            ..SessionSettings::default()
        })
        .expect("session");
        let mut pilot = DemoPilot::default();
        let mut sink = NotificationQueue::default();
        let config = LoopConfig {
            session_time_limit: Some(Duration::from_secs(3)),
            ..LoopConfig::default()
        };

        let report =
            run_headless(&config, &mut session, &mut pilot, &mut sink).expect("headless run");

        assert_eq!(report.stop_reason, StopReason::TimeLimitReached);
        assert!((180..=181).contains(&report.ticks));
        assert_eq!(report.metrics.ticks_total, report.ticks);
        assert_eq!(sink.count_of(NotificationKind::AliveCountChanged), 1);
        assert!(session.view().elapsed_seconds > 2.9);
    }
}
