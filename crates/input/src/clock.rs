use std::cell::Cell;
use std::time::{Duration, Instant};

/// A monotonic time source measured from an arbitrary epoch.
pub trait TimeSource {
    fn now(&self) -> Duration;
}

/// Wall-clock time source backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    epoch: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for MonotonicClock {
    fn now(&self) -> Duration {
        self.epoch.elapsed()
    }
}

/// Time source that only moves when told to. Used for headless simulation
/// and tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn set(&self, to: Duration) {
        self.now.set(to);
    }
}

impl TimeSource for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn now(&self) -> Duration {
        (**self).now()
    }
}

/// Per-frame delta tracker over a [`TimeSource`].
#[derive(Debug)]
pub struct FrameClock<T: TimeSource = MonotonicClock> {
    source: T,
    start: Duration,
    last: Duration,
    frames: u64,
}

impl FrameClock<MonotonicClock> {
    pub fn monotonic() -> Self {
        Self::new(MonotonicClock::new())
    }
}

impl<T: TimeSource> FrameClock<T> {
    pub fn new(source: T) -> Self {
        let now = source.now();
        Self {
            source,
            start: now,
            last: now,
            frames: 0,
        }
    }

    /// Seconds since the previous tick (or since creation for the first).
    pub fn tick(&mut self) -> f32 {
        let now = self.source.now();
        let elapsed = now.saturating_sub(self.last);
        self.last = now;
        self.frames += 1;
        elapsed.as_secs_f32()
    }

    /// Seconds from creation to the most recent tick.
    pub fn total(&self) -> f32 {
        self.last.saturating_sub(self.start).as_secs_f32()
    }

    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    pub fn source(&self) -> &T {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_reports_time_since_previous_tick() {
        let source = ManualClock::new();
        let mut clock = FrameClock::new(&source);

        source.advance(Duration::from_millis(16));
        assert!((clock.tick() - 0.016).abs() < 1e-6);

        source.advance(Duration::from_millis(40));
        assert!((clock.tick() - 0.040).abs() < 1e-6);
        assert_eq!(clock.frame_count(), 2);
        assert!((clock.total() - 0.056).abs() < 1e-6);
    }

    #[test]
    fn long_frames_are_not_clamped() {
        let source = ManualClock::new();
        let mut clock = FrameClock::new(&source);
        source.advance(Duration::from_secs(3));
        assert_eq!(clock.tick(), 3.0);
    }

    #[test]
    fn repeated_tick_without_time_passing_is_zero() {
        let source = ManualClock::new();
        let mut clock = FrameClock::new(&source);
        source.advance(Duration::from_millis(5));
        clock.tick();
        assert_eq!(clock.tick(), 0.0);
    }

    #[test]
    fn epoch_is_the_creation_time() {
        let source = ManualClock::new();
        source.set(Duration::from_secs(100));
        let mut clock = FrameClock::new(&source);
        source.advance(Duration::from_secs(1));
        assert_eq!(clock.tick(), 1.0);
        assert_eq!(clock.total(), 1.0);
    }

    #[test]
    fn monotonic_clock_does_not_go_backwards() {
        let mut clock = FrameClock::monotonic();
        for _ in 0..10 {
            assert!(clock.tick() >= 0.0);
        }
    }
}
