use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoopMetricsSnapshot {
    pub fps: f32,
    pub tps: f32,
    /// Mean wall-clock cost of one simulation tick.
    pub tick_cost_ms: f32,
    pub ticks_total: u64,
}

#[derive(Debug, Clone, Copy, Default)]
struct Counters {
    frames: u64,
    ticks: u64,
    tick_cost: Duration,
}

impl Counters {
    fn rates(&self, elapsed: Duration, ticks_total: u64) -> LoopMetricsSnapshot {
        let seconds = elapsed.as_secs_f32().max(f32::EPSILON);
        let tick_cost_ms = if self.ticks == 0 {
            0.0
        } else {
            self.tick_cost.as_secs_f32() * 1000.0 / self.ticks as f32
        };
        LoopMetricsSnapshot {
            fps: self.frames as f32 / seconds,
            tps: self.ticks as f32 / seconds,
            tick_cost_ms,
            ticks_total,
        }
    }
}

/// Frame and tick counters for the current logging window and for the
/// whole run.
#[derive(Debug)]
pub(crate) struct LoopMetrics {
    run_start: Instant,
    window_start: Instant,
    window: Duration,
    current: Counters,
    run: Counters,
}

impl LoopMetrics {
    pub(crate) fn new(window: Duration) -> Self {
        Self::starting_at(Instant::now(), window)
    }

    pub(crate) fn starting_at(start: Instant, window: Duration) -> Self {
        Self {
            run_start: start,
            window_start: start,
            window,
            current: Counters::default(),
            run: Counters::default(),
        }
    }

    pub(crate) fn record_frame(&mut self) {
        self.current.frames = self.current.frames.saturating_add(1);
        self.run.frames = self.run.frames.saturating_add(1);
    }

    pub(crate) fn record_tick(&mut self, cost: Duration) {
        for counters in [&mut self.current, &mut self.run] {
            counters.ticks = counters.ticks.saturating_add(1);
            counters.tick_cost = counters.tick_cost.saturating_add(cost);
        }
    }

    /// Closes the window once it has run its full length and returns its rates.
    pub(crate) fn close_window(&mut self, now: Instant) -> Option<LoopMetricsSnapshot> {
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < self.window {
            return None;
        }
        let snapshot = self.current.rates(elapsed, self.run.ticks);
        self.window_start = now;
        self.current = Counters::default();
        Some(snapshot)
    }

    pub(crate) fn run_totals(&self, now: Instant) -> LoopMetricsSnapshot {
        self.run
            .rates(now.saturating_duration_since(self.run_start), self.run.ticks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_reports_rates_and_tick_cost() {
        let base = Instant::now();
        let mut metrics = LoopMetrics::starting_at(base, Duration::from_secs(1));

        metrics.record_frame();
        metrics.record_frame();
        for _ in 0..4 {
            metrics.record_tick(Duration::from_millis(2));
        }

        let snapshot = metrics
            .close_window(base + Duration::from_secs(1))
            .expect("window closed");
        assert!((snapshot.fps - 2.0).abs() < 0.05);
        assert!((snapshot.tps - 4.0).abs() < 0.05);
        assert!((snapshot.tick_cost_ms - 2.0).abs() < 0.001);
        assert_eq!(snapshot.ticks_total, 4);
    }

    #[test]
    fn window_stays_open_until_interval_elapses() {
        let base = Instant::now();
        let mut metrics = LoopMetrics::starting_at(base, Duration::from_secs(1));
        metrics.record_frame();

        assert!(metrics
            .close_window(base + Duration::from_millis(500))
            .is_none());
    }

    #[test]
    fn run_totals_span_closed_windows() {
        let base = Instant::now();
        let mut metrics = LoopMetrics::starting_at(base, Duration::from_secs(1));
        metrics.record_tick(Duration::from_millis(1));
        metrics.record_frame();
        let _ = metrics.close_window(base + Duration::from_secs(1));
        metrics.record_tick(Duration::from_millis(3));
        metrics.record_frame();

        let window = metrics
            .close_window(base + Duration::from_secs(2))
            .expect("second window");
        assert_eq!(window.ticks_total, 2);
        assert!((window.tps - 1.0).abs() < 0.05);

        let totals = metrics.run_totals(base + Duration::from_secs(2));
        assert_eq!(totals.ticks_total, 2);
        assert!((totals.fps - 1.0).abs() < 0.05);
        assert!((totals.tick_cost_ms - 2.0).abs() < 0.001);
    }
}
