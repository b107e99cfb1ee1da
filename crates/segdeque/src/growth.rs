//! Index growth policy.
//!
//! Deciding how to make room in the index is a pure function of the
//! index shape, kept apart from the code that moves handles so each
//! branch can be tested on plain numbers.

/// Which end of the index is growing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    /// Toward slot 0.
    Front,
    /// Toward the last slot.
    Back,
}

/// How to provide the requested slack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlackPlan {
    /// Slide the live window inside the current array so that it starts
    /// at `first`.
    Recenter {
        /// New first slot of the live window.
        first: usize,
    },
    /// Allocate a `capacity`-slot array and move the live window to start
    /// at `first` in it.
    Regrow {
        /// Capacity of the replacement array.
        capacity: usize,
        /// First slot of the live window in the replacement array.
        first: usize,
    },
}

/// Whether `extra` unused slots already exist on `side` of the window
/// `[first, first + used)` in an index of `capacity` slots.
pub fn has_slack(capacity: usize, first: usize, used: usize, extra: usize, side: Side) -> bool {
    match side {
        Side::Front => first >= extra,
        Side::Back => capacity
            .checked_sub(first.saturating_add(used))
            .is_some_and(|after| after >= extra),
    }
}

/// Plan how to obtain `extra` free slots on `side` once [`has_slack`]
/// said there are not enough.
///
/// With `needed = used + extra`: if the array is more than twice
/// `needed`, recentering is enough; otherwise the array grows to
/// `capacity + max(capacity, extra) + 2`. In both cases the window lands
/// centered, shifted by `extra` when growing at the front.
pub fn plan_slack(capacity: usize, used: usize, extra: usize, side: Side) -> SlackPlan {
    let needed = used.saturating_add(extra);
    let lead = match side {
        Side::Front => extra,
        Side::Back => 0,
    };
    let centered = |cap: usize| (cap - needed) / 2 + lead;

    if needed.checked_mul(2).is_some_and(|twice| capacity > twice) {
        SlackPlan::Recenter {
            first: centered(capacity),
        }
    } else {
        let capacity = capacity
            .saturating_add(capacity.max(extra))
            .saturating_add(2);
        SlackPlan::Regrow {
            capacity,
            first: centered(capacity),
        }
    }
}
