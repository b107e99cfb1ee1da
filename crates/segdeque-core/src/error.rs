//! Error types for deque operations.
//!
//! One enum covers every fallible path: checked access, growth of the
//! buffer layer or the index, cursor validation, and configuration.

use std::error::Error;
use std::fmt;

/// Errors that can occur during deque operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DequeError {
    /// Checked access past the end of the sequence.
    OutOfRange {
        /// The requested element position.
        index: usize,
        /// Number of live elements at the time of the call.
        len: usize,
    },
    /// The allocator could not supply a buffer or index array.
    AllocationFailure {
        /// Size of the rejected request in bytes.
        requested_bytes: usize,
    },
    /// An internal slot or offset computation went inconsistent.
    ///
    /// Never produced for correct inputs; seeing it indicates a bug.
    InvariantViolation {
        /// Which computation failed.
        context: &'static str,
    },
    /// A cursor was used after the deque it came from was mutated,
    /// or against a different deque.
    StaleCursor {
        /// The generation stamped into the cursor.
        cursor_generation: u64,
        /// The deque's current generation.
        current_generation: u64,
    },
    /// A cursor from the current generation that lies before the first
    /// element or past the end position.
    CursorOutOfBounds {
        /// Signed distance from the first element.
        distance: isize,
        /// Number of live elements at the time of the call.
        len: usize,
    },
    /// A range whose start comes after its end.
    InvalidRange {
        /// Start position.
        start: usize,
        /// End position.
        end: usize,
    },
    /// A [`DequeConfig`](crate::DequeConfig) failed validation.
    InvalidConfig {
        /// Which rule was broken.
        reason: &'static str,
    },
}

impl fmt::Display for DequeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange { index, len } => {
                write!(f, "index {index} out of range for deque of length {len}")
            }
            Self::AllocationFailure { requested_bytes } => {
                write!(f, "allocation of {requested_bytes} bytes failed")
            }
            Self::InvariantViolation { context } => {
                write!(f, "internal invariant violated: {context}")
            }
            Self::StaleCursor {
                cursor_generation,
                current_generation,
            } => {
                write!(
                    f,
                    "stale cursor: generation {cursor_generation}, deque is at {current_generation}"
                )
            }
            Self::CursorOutOfBounds { distance, len } => {
                write!(f, "cursor at distance {distance} outside deque of length {len}")
            }
            Self::InvalidRange { start, end } => {
                write!(f, "invalid range: start {start} is after end {end}")
            }
            Self::InvalidConfig { reason } => write!(f, "invalid deque config: {reason}"),
        }
    }
}

impl Error for DequeError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_message_names_index_and_len() {
        let err = DequeError::OutOfRange { index: 7, len: 3 };
        assert_eq!(
            err.to_string(),
            "index 7 out of range for deque of length 3"
        );
    }

    #[test]
    fn stale_cursor_message_names_both_generations() {
        let err = DequeError::StaleCursor {
            cursor_generation: 4,
            current_generation: 9,
        };
        let msg = err.to_string();
        assert!(msg.contains('4'));
        assert!(msg.contains('9'));
    }

    #[test]
    fn range_message_names_both_ends() {
        let err = DequeError::InvalidRange { start: 5, end: 2 };
        assert_eq!(err.to_string(), "invalid range: start 5 is after end 2");
    }

    #[test]
    fn errors_are_std_errors() {
        fn takes_error(_: &dyn Error) {}
        takes_error(&DequeError::AllocationFailure {
            requested_bytes: 64,
        });
    }
}
