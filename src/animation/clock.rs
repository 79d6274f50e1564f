use std::time::{Duration, Instant};

/// How the clock advances each frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimeStep {
    /// Every tick advances by the same amount.
    Fixed(Duration),
    /// Every tick advances by the wall-clock time since the previous tick.
    RealTime,
}

impl Default for TimeStep {
    fn default() -> Self {
        Self::Fixed(Duration::from_micros(16_667))
    }
}

/// Monotonic animation time.
///
/// Owned and advanced by the frame driver only; every other component reads
/// `elapsed` through a shared reference.
#[derive(Debug, Clone)]
pub struct AnimationClock {
    step: TimeStep,
    last_tick: Option<Instant>,
    /// Time added by the last tick.
    pub delta: Duration,
    /// Total elapsed time.
    pub elapsed: Duration,
    /// Total number of ticks.
    pub frame_count: u64,
}

impl Default for AnimationClock {
    fn default() -> Self {
        Self::new(TimeStep::default())
    }
}

impl AnimationClock {
    #[must_use]
    pub fn new(step: TimeStep) -> Self {
        Self {
            step,
            last_tick: None,
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            frame_count: 0,
        }
    }

    #[must_use]
    pub fn fixed(step: Duration) -> Self {
        Self::new(TimeStep::Fixed(step))
    }

    /// Advances by one step and returns the new elapsed time in seconds.
    ///
    /// The first real-time tick advances by zero.
    pub fn tick(&mut self) -> f32 {
        let delta = match self.step {
            TimeStep::Fixed(step) => step,
            TimeStep::RealTime => {
                let now = Instant::now();
                let delta = self.last_tick.map_or(Duration::ZERO, |last| now - last);
                self.last_tick = Some(now);
                delta
            }
        };
        self.advance(delta)
    }

    /// Advances by an explicit amount. `Duration` cannot be negative, so
    /// elapsed time never decreases.
    pub fn advance(&mut self, delta: Duration) -> f32 {
        self.delta = delta;
        self.elapsed += delta;
        self.frame_count += 1;
        self.elapsed_secs()
    }

    #[inline]
    #[must_use]
    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }

    #[inline]
    #[must_use]
    pub fn dt_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    #[must_use]
    pub fn step(&self) -> TimeStep {
        self.step
    }
}
