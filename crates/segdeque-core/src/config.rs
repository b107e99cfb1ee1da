//! Deque sizing policy.

use crate::error::DequeError;

/// Sizing policy for a deque's buffers and index.
///
/// Controls how many elements each buffer holds and how much spare room
/// the index keeps around the live window. Validated at deque
/// construction; immutable afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DequeConfig {
    /// Number of element slots per buffer (`K`).
    ///
    /// Default: derived from the element size by [`DequeConfig::for_type`].
    /// Must be at least 1.
    pub buffer_len: usize,

    /// Smallest index capacity ever allocated, in buffer handles.
    ///
    /// Default: 8. Must be at least `2 * index_slack + 1`.
    pub min_index_capacity: usize,

    /// Unused index slots kept on each side of the live window when
    /// the index is first built or shrunk.
    ///
    /// Default: 2. Must be at least 1.
    pub index_slack: usize,
}

impl DequeConfig {
    /// Default minimum index capacity.
    pub const DEFAULT_MIN_INDEX_CAPACITY: usize = 8;

    /// Default slack on each side of the index window.
    pub const DEFAULT_INDEX_SLACK: usize = 2;

    /// Preferred number of elements per buffer.
    pub const TARGET_BUFFER_ELEMENTS: usize = 8;

    /// Upper bound on a single buffer's size in bytes. Large element
    /// types get fewer slots per buffer, never fewer than one.
    pub const MAX_BUFFER_BYTES: usize = 4096;

    /// Create a config whose buffer length suits elements of type `T`.
    pub fn for_type<T>() -> Self {
        Self::with_buffer_len(Self::buffer_len_for::<T>())
    }

    /// Create a config with an explicit buffer length and default index policy.
    ///
    /// Small values (1 or 2) are useful in tests to exercise buffer
    /// boundaries with a handful of elements.
    pub fn with_buffer_len(buffer_len: usize) -> Self {
        Self {
            buffer_len,
            min_index_capacity: Self::DEFAULT_MIN_INDEX_CAPACITY,
            index_slack: Self::DEFAULT_INDEX_SLACK,
        }
    }

    /// Buffer length policy: about eight elements, capped by
    /// [`MAX_BUFFER_BYTES`](Self::MAX_BUFFER_BYTES), minimum one.
    pub fn buffer_len_for<T>() -> usize {
        match std::mem::size_of::<T>() {
            0 => Self::TARGET_BUFFER_ELEMENTS,
            size => (Self::MAX_BUFFER_BYTES / size).clamp(1, Self::TARGET_BUFFER_ELEMENTS),
        }
    }

    /// Check the policy rules.
    ///
    /// # Errors
    ///
    /// Returns [`DequeError::InvalidConfig`] naming the first broken rule.
    pub fn validate(&self) -> Result<(), DequeError> {
        if self.buffer_len == 0 {
            return Err(DequeError::InvalidConfig {
                reason: "buffer_len must be at least 1",
            });
        }
        if self.index_slack == 0 {
            return Err(DequeError::InvalidConfig {
                reason: "index_slack must be at least 1",
            });
        }
        let floor = self.index_slack.saturating_mul(2).saturating_add(1);
        if self.min_index_capacity < floor {
            return Err(DequeError::InvalidConfig {
                reason: "min_index_capacity must be at least 2 * index_slack + 1",
            });
        }
        Ok(())
    }

    /// Index capacity to build for `buffers` live buffers: the buffers
    /// plus slack on both sides, never below the configured minimum.
    pub fn index_capacity_for(&self, buffers: usize) -> usize {
        buffers
            .saturating_add(self.index_slack.saturating_mul(2))
            .max(self.min_index_capacity)
    }
}

impl Default for DequeConfig {
    fn default() -> Self {
        Self::with_buffer_len(Self::TARGET_BUFFER_ELEMENTS)
    }
}
