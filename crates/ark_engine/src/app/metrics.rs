use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoopMetricsSnapshot {
    pub fps: f32,
    pub tps: f32,
    pub frame_time_ms: f32,
}

#[derive(Debug, Clone, Copy, Default)]
struct Counts {
    frames: u32,
    ticks: u32,
    frame_time: Duration,
}

/// Frame and tick counts rolled into a snapshot once per reporting interval.
#[derive(Debug)]
pub(crate) struct LoopMetrics {
    started: Instant,
    interval: Duration,
    counts: Counts,
    latest: LoopMetricsSnapshot,
}

impl LoopMetrics {
    /// A zero interval falls back to one second.
    pub(crate) fn new(interval: Duration) -> Self {
        Self::since(Instant::now(), interval)
    }

    fn since(started: Instant, interval: Duration) -> Self {
        let interval = if interval.is_zero() {
            Duration::from_secs(1)
        } else {
            interval
        };
        Self {
            started,
            interval,
            counts: Counts::default(),
            latest: LoopMetricsSnapshot::default(),
        }
    }

    pub(crate) fn frame(&mut self, frame_dt: Duration) {
        self.counts.frames = self.counts.frames.saturating_add(1);
        self.counts.frame_time = self.counts.frame_time.saturating_add(frame_dt);
    }

    pub(crate) fn tick(&mut self) {
        self.counts.ticks = self.counts.ticks.saturating_add(1);
    }

    pub(crate) fn latest(&self) -> LoopMetricsSnapshot {
        self.latest
    }

    /// Closes the interval once it has elapsed and returns the new snapshot.
    pub(crate) fn roll(&mut self, now: Instant) -> Option<LoopMetricsSnapshot> {
        let elapsed = now.saturating_duration_since(self.started);
        if elapsed < self.interval {
            return None;
        }
        let counts = std::mem::take(&mut self.counts);
        let seconds = elapsed.as_secs_f32();
        self.latest = LoopMetricsSnapshot {
            fps: counts.frames as f32 / seconds,
            tps: counts.ticks as f32 / seconds,
            frame_time_ms: match counts.frames {
                0 => 0.0,
                frames => counts.frame_time.as_secs_f32() * 1000.0 / frames as f32,
            },
        };
        self.started = now;
        Some(self.latest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roll_reports_rates_over_the_interval() {
        let start = Instant::now();
        let mut metrics = LoopMetrics::since(start, Duration::from_secs(2));
        for _ in 0..4 {
            metrics.frame(Duration::from_millis(25));
        }
        for _ in 0..10 {
            metrics.tick();
        }

        assert!(metrics.roll(start + Duration::from_secs(1)).is_none());
        let snapshot = metrics
            .roll(start + Duration::from_secs(2))
            .expect("interval elapsed");
        assert!((snapshot.fps - 2.0).abs() < 0.01);
        assert!((snapshot.tps - 5.0).abs() < 0.01);
        assert!((snapshot.frame_time_ms - 25.0).abs() < 0.01);
        assert_eq!(metrics.latest(), snapshot);
    }

    #[test]
    fn counts_restart_after_each_roll() {
        let start = Instant::now();
        let mut metrics = LoopMetrics::since(start, Duration::ZERO);
        metrics.frame(Duration::from_millis(16));
        assert!(metrics.roll(start + Duration::from_secs(1)).is_some());

        let quiet = metrics
            .roll(start + Duration::from_secs(2))
            .expect("second interval");
        assert_eq!(quiet, LoopMetricsSnapshot::default());
    }
}
