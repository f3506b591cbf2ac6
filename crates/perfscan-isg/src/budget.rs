//! Per-request time budget

use std::time::{Duration, Instant};

/// Nodes visited between deadline checks
pub const POLL_INTERVAL: u32 = 64;

/// Deadline shared by every traversal of one analysis request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Budget {
    deadline: Option<Instant>,
}

impl Budget {
    pub fn unlimited() -> Self {
        Self { deadline: None }
    }

    pub fn until(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
        }
    }

    /// Budget expiring `millis` from now
    pub fn from_millis(millis: u64) -> Self {
        Self::until(Instant::now() + Duration::from_millis(millis))
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn expired(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Counter that consults the clock once every [`POLL_INTERVAL`] ticks
    pub fn ticker(&self) -> Ticker {
        Ticker {
            budget: *self,
            count: 0,
        }
    }
}

#[derive(Debug)]
pub struct Ticker {
    budget: Budget,
    count: u32,
}

impl Ticker {
    /// Count one visited node; true once the budget has run out
    pub fn tick(&mut self) -> bool {
        if self.budget.deadline.is_none() {
            return false;
        }
        self.count += 1;
        if self.count >= POLL_INTERVAL {
            self.count = 0;
            return self.budget.expired();
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unlimited_never_expires() {
        let budget = Budget::unlimited();
        assert!(!budget.expired());
        let mut ticker = budget.ticker();
        assert!((0..1000).all(|_| !ticker.tick()));
    }

    #[test]
    fn test_past_deadline_trips_on_poll() {
        let budget = Budget::until(Instant::now() - Duration::from_millis(1));
        assert!(budget.expired());
        let mut ticker = budget.ticker();
        let tripped = (0..POLL_INTERVAL).position(|_| ticker.tick());
        assert_eq!(tripped, Some(POLL_INTERVAL as usize - 1));
    }
}
