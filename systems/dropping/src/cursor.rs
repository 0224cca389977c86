/// Next score at which a score-triggered drop attempt fires.
///
/// The threshold only ever moves forward, one step per firing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ScoreThresholdCursor {
    step: i64,
    next: i64,
}

impl ScoreThresholdCursor {
    /// Creates a cursor whose first threshold sits one `step` above zero.
    #[must_use]
    pub const fn new(step: i64) -> Self {
        Self { step, next: step }
    }

    /// Score that fires the next attempt.
    #[must_use]
    pub const fn next_threshold(&self) -> i64 {
        self.next
    }

    /// Distance between consecutive thresholds.
    #[must_use]
    pub const fn step(&self) -> i64 {
        self.step
    }

    /// Reports whether `score` reaches the current threshold.
    #[must_use]
    pub const fn is_reached(&self, score: i64) -> bool {
        score >= self.next
    }

    /// Moves the threshold forward by exactly one step.
    pub fn advance(&mut self) {
        self.next = self.next.saturating_add(self.step);
    }

    /// Rewinds the threshold to its initial position.
    pub fn reset(&mut self) {
        self.next = self.step;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advances_single_step_regardless_of_overshoot() {
        let mut cursor = ScoreThresholdCursor::new(500);
        assert!(!cursor.is_reached(499));
        assert!(cursor.is_reached(2_000));

        cursor.advance();
        assert_eq!(cursor.next_threshold(), 1_000);
        assert!(cursor.is_reached(2_000), "remaining thresholds wait for later events");
    }

    #[test]
    fn reset_rewinds_to_first_threshold() {
        let mut cursor = ScoreThresholdCursor::new(250);
        cursor.advance();
        cursor.advance();
        cursor.reset();
        assert_eq!(cursor.next_threshold(), 250);
        assert_eq!(cursor.step(), 250);
    }

    #[test]
    fn saturates_instead_of_wrapping() {
        let mut cursor = ScoreThresholdCursor::new(i64::MAX - 1);
        cursor.advance();
        cursor.advance();
        assert_eq!(cursor.next_threshold(), i64::MAX);
    }
}
