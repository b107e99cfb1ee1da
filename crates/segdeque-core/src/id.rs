//! Generation stamps for cursor validation.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counter for unique [`Generation`] allocation.
static GENERATION_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Process-unique stamp identifying one structural state of one deque.
///
/// Every mutation installs a fresh stamp drawn from a monotonic atomic
/// counter. A cursor records the stamp current when it was produced, so
/// comparing stamps detects both use-after-mutation and use against a
/// different deque, without holding a borrow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Generation(u64);

impl Generation {
    /// Allocate a fresh, never-before-returned stamp. Thread-safe.
    pub fn next() -> Self {
        Self(GENERATION_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw stamp value, for error reporting.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stamps_are_unique_and_increasing() {
        let a = Generation::next();
        let b = Generation::next();
        assert_ne!(a, b);
        assert!(b > a);
    }
}
