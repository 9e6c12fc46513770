//! Adaptive round sizing.
//!
//! A request's pending items live in a [`BatchPlan`] owned by that request.
//! The [`BatchScheduler`] hands out rounds of at most `round_size` items and,
//! once a round has finished, grows the size by one after a healthy round or
//! shrinks it after any sign of trouble. The size only changes between rounds
//! and always stays within `[1, max_round_size]`.

use std::collections::VecDeque;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How the round size shrinks after an unhealthy round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShrinkPolicy {
    /// Drop straight back to one item per round.
    #[default]
    Reset,
    /// Halve the round size, rounding down, never below one.
    Halve,
}

/// Fixed delays that keep a request under the upstream's global rate limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// Delay between successive items.
    pub inter_call_delay: Duration,
    /// Delay between rounds, in place of the inter-call delay.
    pub inter_round_delay: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            inter_call_delay: Duration::from_secs(1),
            inter_round_delay: Duration::from_secs(2),
        }
    }
}

impl Pacing {
    /// No delays at all.
    pub const fn none() -> Self {
        Self {
            inter_call_delay: Duration::ZERO,
            inter_round_delay: Duration::ZERO,
        }
    }
}

/// Pending items of one request and the size of the next round.
#[derive(Debug, Clone)]
pub struct BatchPlan<T> {
    remaining: VecDeque<T>,
    round_size: usize,
}

impl<T> BatchPlan<T> {
    /// Items not yet handed out.
    pub fn remaining(&self) -> usize {
        self.remaining.len()
    }

    /// Whether every item has been handed out.
    pub fn is_empty(&self) -> bool {
        self.remaining.is_empty()
    }

    /// Size of the next round.
    pub const fn round_size(&self) -> usize {
        self.round_size
    }
}

/// Health of a finished round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoundStats {
    /// Items that ended Success or Skip.
    pub healthy: usize,
    /// Items in the round.
    pub total: usize,
}

impl RoundStats {
    /// Share of healthy items; an empty round counts as fully healthy.
    #[allow(clippy::cast_precision_loss)]
    pub fn success_ratio(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.healthy as f64 / self.total as f64
        }
    }
}

/// Sizes rounds from the success ratio of the previous one.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchScheduler {
    max_round_size: usize,
    initial_round_size: usize,
    success_threshold: f64,
    shrink: ShrinkPolicy,
}

impl Default for BatchScheduler {
    fn default() -> Self {
        Self::new(3, 1, 1.0, ShrinkPolicy::Reset)
    }
}

impl BatchScheduler {
    /// Create a scheduler. Sizes are clamped so that `1 <= initial <= max`.
    pub fn new(
        max_round_size: usize,
        initial_round_size: usize,
        success_threshold: f64,
        shrink: ShrinkPolicy,
    ) -> Self {
        let max_round_size = max_round_size.max(1);
        Self {
            max_round_size,
            initial_round_size: initial_round_size.clamp(1, max_round_size),
            success_threshold: success_threshold.clamp(0.0, 1.0),
            shrink,
        }
    }

    /// Upper bound on round size.
    pub const fn max_round_size(&self) -> usize {
        self.max_round_size
    }

    /// Start a plan for `items`, preserving their order.
    pub fn plan<T>(&self, items: impl IntoIterator<Item = T>) -> BatchPlan<T> {
        BatchPlan {
            remaining: items.into_iter().collect(),
            round_size: self.initial_round_size,
        }
    }

    /// Take the next round: `min(round_size, remaining)` items from the front.
    pub fn next_round<T>(&self, plan: &mut BatchPlan<T>) -> Vec<T> {
        let take = plan.round_size.min(plan.remaining.len());
        plan.remaining.drain(..take).collect()
    }

    /// Resize the plan after a round has finished. Returns the new size.
    pub fn complete_round<T>(&self, plan: &mut BatchPlan<T>, stats: RoundStats) -> usize {
        if stats.total > 0 {
            plan.round_size = self.adapt(plan.round_size, stats);
        }
        plan.round_size
    }

    fn adapt(&self, current: usize, stats: RoundStats) -> usize {
        let next = if stats.success_ratio() >= self.success_threshold {
            current.saturating_add(1)
        } else {
            match self.shrink {
                ShrinkPolicy::Reset => 1,
                ShrinkPolicy::Halve => current / 2,
            }
        };
        next.clamp(1, self.max_round_size)
    }
}
