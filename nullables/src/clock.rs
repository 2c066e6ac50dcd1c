//! Nullable clock: deterministic time for testing.

use agora_types::Timestamp;
use std::cell::Cell;

/// Time only moves when the test moves it.
pub struct NullClock {
    current: Cell<u64>,
}

impl NullClock {
    pub fn new(initial_secs: u64) -> Self {
        Self {
            current: Cell::new(initial_secs),
        }
    }

    pub fn now(&self) -> Timestamp {
        Timestamp::new(self.current.get())
    }

    pub fn advance(&self, secs: u64) {
        self.current.set(self.current.get().saturating_add(secs));
    }

    /// Jump to an absolute instant, e.g. a session boundary.
    pub fn set(&self, at: Timestamp) {
        self.current.set(at.as_secs());
    }
}

impl Default for NullClock {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advances_and_jumps() {
        let clock = NullClock::new(10);
        clock.advance(5);
        assert_eq!(clock.now(), Timestamp::new(15));
        clock.set(Timestamp::new(3));
        assert_eq!(clock.now(), Timestamp::new(3));
        clock.advance(u64::MAX);
        assert_eq!(clock.now(), Timestamp::new(u64::MAX));
    }
}
