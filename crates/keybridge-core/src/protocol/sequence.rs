//! Sequence ids for tracked keystrokes.
//!
//! Every keystroke the client sends is tagged with a locally assigned,
//! monotonically increasing id.  The id is what the UI uses to find the
//! history card for a keystroke once its acknowledgment arrives.
//!
//! # Ownership
//!
//! The counter is owned by a single session and advanced through `&mut self`,
//! so it needs no atomics: one session processes its events one at a time.
//! Two sessions each own their own counter and never share ids.

/// Identifier assigned to one tracked keystroke.
pub type SequenceId = u64;

/// A monotonically increasing counter for keystroke sequence ids.
///
/// Ids start at 0 and increment by 1 with each call to [`next`](Self::next).
/// The counter saturates at `u64::MAX` instead of wrapping, so ids handed
/// out never decrease and pending ids keep their registration order.
///
/// # Examples
///
/// ```rust
/// use keybridge_core::protocol::SequenceCounter;
///
/// let mut counter = SequenceCounter::new();
/// assert_eq!(counter.next(), 0);
/// assert_eq!(counter.next(), 1);
/// ```
#[derive(Debug, Default, Clone)]
pub struct SequenceCounter {
    next: SequenceId,
}

impl SequenceCounter {
    /// Creates a new counter starting at 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next id and advances the counter.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> SequenceId {
        let id = self.next;
        self.next = self.next.saturating_add(1);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_counter_starts_at_zero() {
        // Arrange
        let mut counter = SequenceCounter::new();

        // Act
        let first = counter.next();

        // Assert
        assert_eq!(first, 0);
    }

    #[test]
    fn test_sequence_counter_increments_monotonically() {
        // Arrange
        let mut counter = SequenceCounter::new();

        // Act
        let values: Vec<SequenceId> = (0..100).map(|_| counter.next()).collect();

        // Assert – values must be strictly monotonically increasing
        for window in values.windows(2) {
            assert!(
                window[1] > window[0],
                "values must be monotonically increasing"
            );
        }
    }

    #[test]
    fn test_sequence_counter_saturates_at_u64_max() {
        // Arrange – start the counter one step before overflow
        let mut counter = SequenceCounter { next: u64::MAX - 1 };

        // Act
        let ids: Vec<SequenceId> = (0..3).map(|_| counter.next()).collect();

        // Assert – never back to 0
        assert_eq!(ids, vec![u64::MAX - 1, u64::MAX, u64::MAX]);
    }

    #[test]
    fn test_independent_counters_do_not_share_ids() {
        let mut a = SequenceCounter::new();
        let mut b = SequenceCounter::new();
        a.next();
        a.next();
        assert_eq!(b.next(), 0);
    }
}
