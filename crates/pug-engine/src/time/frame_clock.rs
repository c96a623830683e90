use std::time::{Duration, Instant};

/// Largest delta time handed to the simulation, in seconds (one frame at 30 Hz).
pub const MAX_TIME_STEP: f32 = 1.0 / 30.0;

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameTime {
    /// Time elapsed since the previous tick, in seconds. Never exceeds `MAX_TIME_STEP`.
    pub dt: f32,

    /// Monotonic timestamp taken at the tick.
    pub now: Instant,

    /// Monotonic frame counter.
    pub frame_index: u64,
}

/// Frame clock producing `FrameTime` snapshots.
///
/// Delta time is clamped from above so that a debugger pause or a long stall
/// feeds the update step at most one maximum step. It is never raised: two
/// ticks with no elapsed time yield `dt == 0.0`.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    frame_index: u64,
}

impl FrameClock {
    /// Creates a clock baselined at now.
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Creates a clock whose first tick measures from `start`.
    pub fn starting_at(start: Instant) -> Self {
        Self {
            last: start,
            frame_index: 0,
        }
    }

    /// Advances the clock to the current instant.
    pub fn tick(&mut self) -> FrameTime {
        self.advance(Instant::now())
    }

    /// Advances the clock to `now` and returns the clamped snapshot.
    ///
    /// `now` earlier than the previous tick counts as zero elapsed time.
    pub fn advance(&mut self, now: Instant) -> FrameTime {
        let elapsed = now.saturating_duration_since(self.last);
        self.last = now;

        let ft = FrameTime {
            dt: clamp_step(elapsed, MAX_TIME_STEP),
            now,
            frame_index: self.frame_index,
        };

        self.frame_index = self.frame_index.wrapping_add(1);

        ft
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Converts an elapsed duration to seconds, capped at `max_step` seconds.
pub fn clamp_step(elapsed: Duration, max_step: f32) -> f32 {
    elapsed.as_secs_f32().min(max_step)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn short_frames_pass_through() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);
        let ft = clock.advance(start + ms(10));
        assert!((ft.dt - 0.010).abs() < 1e-6);
    }

    #[test]
    fn long_stall_is_clamped_to_max_step() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);
        let ft = clock.advance(start + Duration::from_secs(5));
        assert_eq!(ft.dt, MAX_TIME_STEP);
    }

    #[test]
    fn dt_never_exceeds_max_step() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);
        let mut t = start;
        for step in [1u64, 16, 33, 34, 100, 1_000, 60_000] {
            t += ms(step);
            assert!(clock.advance(t).dt <= MAX_TIME_STEP);
        }
    }

    #[test]
    fn zero_elapsed_is_zero_dt() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);
        assert_eq!(clock.advance(start).dt, 0.0);
    }

    #[test]
    fn going_backwards_counts_as_zero() {
        let start = Instant::now() + Duration::from_secs(1);
        let mut clock = FrameClock::starting_at(start);
        assert_eq!(clock.advance(start - ms(500)).dt, 0.0);
    }

    #[test]
    fn frame_index_increments_per_tick() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);
        assert_eq!(clock.advance(start + ms(1)).frame_index, 0);
        assert_eq!(clock.advance(start + ms(2)).frame_index, 1);
        assert_eq!(clock.advance(start + ms(3)).frame_index, 2);
    }

    #[test]
    fn clamp_step_caps_at_the_given_step() {
        assert_eq!(clamp_step(Duration::from_secs(1), 0.005), 0.005);
        assert_eq!(clamp_step(ms(2), 0.005), Duration::from_millis(2).as_secs_f32());
    }
}
