use std::time::Duration;

use super::LoopConfig;

const FALLBACK_MAX_FRAME: Duration = Duration::from_millis(250);

/// What one rendered frame owes the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FrameSteps {
    pub(crate) steps: u32,
    /// Backlog discarded because the per-frame step limit was hit.
    pub(crate) dropped: Duration,
}

/// Fixed-step simulation clock fed with wall-clock frame times.
///
/// Frame times are clamped before they enter the backlog, at most `max_steps` ticks run per
/// frame, and whatever a full step still owes after that is dropped rather than carried.
#[derive(Debug, Clone)]
pub(crate) struct FrameClock {
    step: Duration,
    max_frame: Duration,
    max_steps: u32,
    backlog: Duration,
    sim_time_ms: f64,
    present_interval: Option<Duration>,
}

impl FrameClock {
    pub(crate) fn new(config: &LoopConfig) -> Self {
        let max_frame = if config.max_frame_delta.is_zero() {
            FALLBACK_MAX_FRAME
        } else {
            config.max_frame_delta
        };
        Self {
            step: Duration::from_secs_f64(1.0 / f64::from(config.target_tps.max(1))),
            max_frame,
            max_steps: config.max_ticks_per_frame.max(1),
            backlog: Duration::ZERO,
            sim_time_ms: 0.0,
            present_interval: config
                .max_render_fps
                .filter(|fps| *fps > 0)
                .map(|fps| Duration::from_secs_f64(1.0 / f64::from(fps))),
        }
    }

    pub(crate) fn sim_time_ms(&self) -> f64 {
        self.sim_time_ms
    }

    pub(crate) fn step_ms(&self) -> f64 {
        self.step.as_secs_f64() * 1000.0
    }

    pub(crate) fn max_steps(&self) -> u32 {
        self.max_steps
    }

    pub(crate) fn max_frame(&self) -> Duration {
        self.max_frame
    }

    /// Render cap in frames per second, `None` when uncapped.
    pub(crate) fn render_cap(&self) -> Option<u32> {
        self.present_interval
            .map(|interval| (1.0 / interval.as_secs_f64()).round() as u32)
    }

    pub(crate) fn begin_frame(&mut self, frame_dt: Duration) -> FrameSteps {
        self.backlog = self.backlog.saturating_add(frame_dt.min(self.max_frame));
        let owed = self.backlog.as_nanos() / self.step.as_nanos().max(1);
        let steps = owed.min(u128::from(self.max_steps)) as u32;
        self.backlog = self.backlog.saturating_sub(self.step * steps);

        let dropped = if self.backlog >= self.step {
            std::mem::take(&mut self.backlog)
        } else {
            Duration::ZERO
        };
        FrameSteps { steps, dropped }
    }

    /// Advances simulation time by one fixed step and returns the new timestamp.
    pub(crate) fn advance(&mut self) -> f64 {
        self.sim_time_ms += self.step_ms();
        self.sim_time_ms
    }

    /// How long to wait before presenting, given the time since the previous present.
    pub(crate) fn present_wait(&self, since_present: Duration) -> Duration {
        self.present_interval
            .map_or(Duration::ZERO, |interval| interval.saturating_sub(since_present))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock(target_tps: u32, max_ticks_per_frame: u32, max_render_fps: Option<u32>) -> FrameClock {
        FrameClock::new(&LoopConfig {
            target_tps,
            max_ticks_per_frame,
            max_render_fps,
            ..LoopConfig::default()
        })
    }

    #[test]
    fn frame_runs_whole_steps_and_keeps_the_remainder() {
        let mut clock = clock(50, 5, None);
        let frame = clock.begin_frame(Duration::from_millis(50));
        assert_eq!(
            frame,
            FrameSteps {
                steps: 2,
                dropped: Duration::ZERO
            }
        );
        assert_eq!(clock.begin_frame(Duration::from_millis(10)).steps, 1);
    }

    #[test]
    fn backlog_past_the_step_limit_is_dropped() {
        let mut clock = clock(50, 3, None);
        let frame = clock.begin_frame(Duration::from_millis(200));
        assert_eq!(frame.steps, 3);
        assert_eq!(frame.dropped, Duration::from_millis(140));
        assert_eq!(clock.begin_frame(Duration::ZERO).steps, 0);
    }

    #[test]
    fn long_frames_are_clamped_before_stepping() {
        let mut clock = clock(50, 100, None);
        let frame = clock.begin_frame(Duration::from_secs(10));
        assert_eq!(frame.steps, 12);
        assert_eq!(clock.max_frame(), Duration::from_millis(250));
    }

    #[test]
    fn advance_accumulates_fixed_step_time() {
        let mut clock = clock(50, 5, None);
        assert_eq!(clock.advance(), 20.0);
        assert_eq!(clock.advance(), 40.0);
        assert_eq!(clock.sim_time_ms(), 40.0);
    }

    #[test]
    fn render_cap_waits_out_the_rest_of_the_interval() {
        let capped = clock(60, 5, Some(50));
        assert_eq!(capped.render_cap(), Some(50));
        assert_eq!(
            capped.present_wait(Duration::from_millis(5)),
            Duration::from_millis(15)
        );
        assert_eq!(capped.present_wait(Duration::from_millis(30)), Duration::ZERO);

        let uncapped = clock(60, 5, Some(0));
        assert_eq!(uncapped.render_cap(), None);
        assert_eq!(uncapped.present_wait(Duration::ZERO), Duration::ZERO);
    }
}
