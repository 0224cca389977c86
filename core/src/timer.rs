use std::time::Duration;

/// Interval accumulator driven by externally supplied delta time.
///
/// The interval must be non-zero; a zero interval yields a non-finite
/// progress and is a caller bug rather than a runtime failure.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Timer {
    interval: Duration,
    elapsed: Duration,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl Timer {
    /// Creates a timer that completes after `interval` of accumulated time.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        debug_assert!(!interval.is_zero(), "timer interval must be positive");
        Self {
            interval,
            elapsed: Duration::ZERO,
        }
    }

    /// Interval the timer completes after.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Time accumulated since the last reset.
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Ratio of elapsed time to the interval. Never negative.
    #[must_use]
    pub fn progress(&self) -> f32 {
        (self.elapsed.as_secs_f64() / self.interval.as_secs_f64()) as f32
    }

    /// Reports whether the interval has fully elapsed. Stays true until reset.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.elapsed >= self.interval
    }

    /// Adds `dt` to the elapsed time.
    pub fn step(&mut self, dt: Duration) {
        self.elapsed = self.elapsed.saturating_add(dt);
    }

    /// Adds `dt` scaled by `scale` to the elapsed time.
    ///
    /// Negative or non-finite products contribute nothing.
    pub fn step_scaled(&mut self, dt: Duration, scale: f32) {
        let scaled = Duration::try_from_secs_f64(dt.as_secs_f64() * f64::from(scale))
            .unwrap_or(Duration::ZERO);
        self.step(scaled);
    }

    /// Zeroes the elapsed time while keeping the interval.
    pub fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
    }

    /// Zeroes the elapsed time and rebinds the interval.
    pub fn reset_with(&mut self, interval: Duration) {
        self.set_interval(interval);
        self.reset();
    }

    /// Rebinds the interval without touching the elapsed time.
    pub fn set_interval(&mut self, interval: Duration) {
        debug_assert!(!interval.is_zero(), "timer interval must be positive");
        self.interval = interval;
    }

    /// Overrides the elapsed time.
    pub fn set_elapsed(&mut self, elapsed: Duration) {
        self.elapsed = elapsed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completes_once_interval_elapses() {
        let mut timer = Timer::new(Duration::from_millis(500));
        timer.step(Duration::from_millis(250));
        assert!(!timer.is_complete());
        assert!((timer.progress() - 0.5).abs() < f32::EPSILON);

        timer.step(Duration::from_millis(250));
        assert!(timer.is_complete());

        timer.step(Duration::from_millis(250));
        assert!(timer.is_complete(), "completion holds until reset");
    }

    #[test]
    fn one_nanosecond_short_is_not_complete() {
        let mut timer = Timer::new(Duration::from_secs(1));
        timer.step(Duration::from_secs(1) - Duration::from_nanos(1));
        assert!(!timer.is_complete());

        timer.step(Duration::from_nanos(1));
        assert!(timer.is_complete());
    }

    #[test]
    fn reset_keeps_interval_and_reset_with_rebinds_it() {
        let mut timer = Timer::new(Duration::from_secs(2));
        timer.step(Duration::from_secs(3));
        timer.reset();
        assert_eq!(timer.elapsed(), Duration::ZERO);
        assert_eq!(timer.interval(), Duration::from_secs(2));

        timer.step(Duration::from_secs(1));
        timer.reset_with(Duration::from_secs(5));
        assert_eq!(timer.elapsed(), Duration::ZERO);
        assert_eq!(timer.interval(), Duration::from_secs(5));
        assert_eq!(timer.progress(), 0.0);
    }

    #[test]
    fn scaled_step_multiplies_delta() {
        let mut timer = Timer::new(Duration::from_secs(1));
        timer.step_scaled(Duration::from_millis(250), 2.0);
        assert_eq!(timer.elapsed(), Duration::from_millis(500));
    }

    #[test]
    fn negative_scale_contributes_nothing() {
        let mut timer = Timer::new(Duration::from_secs(1));
        timer.step_scaled(Duration::from_millis(200), -1.0);
        assert_eq!(timer.elapsed(), Duration::ZERO);
        assert!(timer.progress() >= 0.0);
    }

    #[test]
    fn setters_are_reflected_in_progress() {
        let mut timer = Timer::new(Duration::from_secs(4));
        timer.set_elapsed(Duration::from_secs(1));
        assert!((timer.progress() - 0.25).abs() < f32::EPSILON);

        timer.set_interval(Duration::from_secs(1));
        assert!(timer.is_complete());
    }
}
