//! Attempt lifecycle tracking.
//!
//! An attempt moves through `Created → Loaded → Resolved → Invoked →
//! Unloaded → Probed`. Failing steps are skipped, but `Unloaded` and `Probed`
//! are always reached.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::resolver::StrategyKind;

/// The state of an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttemptState {
    /// A fresh context exists.
    Created,

    /// The module type has been loaded into the context.
    Loaded,

    /// The module instance has been produced.
    Resolved,

    /// The module has reported.
    Invoked,

    /// The context has been unloaded.
    Unloaded,

    /// The liveness probe has run.
    Probed,
}

/// The lifecycle of one attempt.
#[derive(Debug, Clone)]
pub struct AttemptLifecycle {
    /// The attempt number, starting at 1.
    number: usize,

    /// The strategy under test.
    strategy: StrategyKind,

    /// The current state.
    state: AttemptState,

    /// The furthest state reached before unloading.
    furthest: AttemptState,

    /// When the attempt started.
    created_at: Instant,

    /// When the attempt last changed state.
    last_state_change: Instant,
}

impl AttemptLifecycle {
    /// Create a new attempt lifecycle.
    ///
    /// # Arguments
    ///
    /// * `number` - The attempt number.
    /// * `strategy` - The strategy under test.
    pub fn new(number: usize, strategy: StrategyKind) -> Self {
        let now = Instant::now();

        Self {
            number,
            strategy,
            state: AttemptState::Created,
            furthest: AttemptState::Created,
            created_at: now,
            last_state_change: now,
        }
    }

    /// Get the attempt number.
    pub fn number(&self) -> usize {
        self.number
    }

    /// Get the strategy under test.
    pub fn strategy(&self) -> StrategyKind {
        self.strategy
    }

    /// Get the current state.
    pub fn state(&self) -> AttemptState {
        self.state
    }

    /// The last state reached before the context was unloaded.
    pub fn furthest_before_unload(&self) -> AttemptState {
        self.furthest
    }

    /// Get when the attempt started.
    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    /// Get when the attempt last changed state.
    pub fn last_state_change(&self) -> Instant {
        self.last_state_change
    }

    /// Time spent so far.
    pub fn elapsed(&self) -> Duration {
        self.created_at.elapsed()
    }

    /// Transition to a new state.
    ///
    /// # Arguments
    ///
    /// * `state` - The new state.
    pub fn transition_to(&mut self, state: AttemptState) {
        if state < AttemptState::Unloaded {
            self.furthest = self.furthest.max(state);
        }
        self.state = state;
        self.last_state_change = Instant::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn test_attempt_lifecycle() {
        let mut lifecycle = AttemptLifecycle::new(1, StrategyKind::BoundaryAware);
        assert_eq!(lifecycle.number(), 1);
        assert_eq!(lifecycle.strategy(), StrategyKind::BoundaryAware);
        assert_eq!(lifecycle.state(), AttemptState::Created);

        sleep(Duration::from_millis(10));

        lifecycle.transition_to(AttemptState::Loaded);
        lifecycle.transition_to(AttemptState::Unloaded);
        lifecycle.transition_to(AttemptState::Probed);

        assert_eq!(lifecycle.state(), AttemptState::Probed);
        assert_eq!(lifecycle.furthest_before_unload(), AttemptState::Loaded);
        assert!(lifecycle.last_state_change() > lifecycle.created_at());
        assert!(lifecycle.elapsed() >= Duration::from_millis(10));
    }
}
