//! Work budget for a single search: deadline, expansion ceiling and an
//! optional cooperative cancellation flag.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use hopscope_core::config::SearchConfig;

/// Per-search work budget.
///
/// The expansion ceiling is a counter compare and is checked on every
/// expansion. The clock and the cancellation flag are only consulted every
/// `check_interval` expansions.
#[derive(Debug, Clone)]
pub struct SearchBudget {
    deadline: Option<Instant>,
    max_expansions: Option<usize>,
    check_interval: usize,
    cancelled: Option<Arc<AtomicBool>>,
    expansions: usize,
    exhausted: bool,
}

impl SearchBudget {
    /// No deadline, no ceiling.
    pub fn unlimited() -> Self {
        Self {
            deadline: None,
            max_expansions: None,
            check_interval: 256,
            cancelled: None,
            expansions: 0,
            exhausted: false,
        }
    }

    /// Budget of `time_budget` starting now.
    pub fn with_time_limit(time_budget: Duration) -> Self {
        Self {
            deadline: Some(Instant::now() + time_budget),
            ..Self::unlimited()
        }
    }

    /// Budget from the `[search]` config section, starting now.
    pub fn from_config(config: &SearchConfig) -> Self {
        let mut budget =
            Self::with_time_limit(Duration::from_millis(config.effective_time_budget_ms()))
                .with_check_interval(config.effective_budget_check_interval());
        budget.max_expansions = config.max_expansions;
        budget
    }

    pub fn with_max_expansions(mut self, max: usize) -> Self {
        self.max_expansions = Some(max);
        self
    }

    pub fn with_check_interval(mut self, interval: usize) -> Self {
        self.check_interval = interval.max(1);
        self
    }

    /// Share a flag the host can set to stop the search early.
    pub fn with_cancellation(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancelled = Some(flag);
        self
    }

    /// Claim one node expansion. Returns false once the budget is spent;
    /// after that it keeps returning false.
    pub fn try_expand(&mut self) -> bool {
        let check = self.expansions > 0 && self.expansions % self.check_interval == 0;
        self.claim(check)
    }

    /// Claim one unit of expensive work (a full candidate scan). Always
    /// consults the clock and the cancellation flag.
    pub fn try_expand_checked(&mut self) -> bool {
        self.claim(true)
    }

    fn claim(&mut self, check_clock: bool) -> bool {
        if self.exhausted {
            return false;
        }
        if self.max_expansions.is_some_and(|max| self.expansions >= max) {
            self.exhausted = true;
            return false;
        }
        if check_clock {
            let cancelled = self
                .cancelled
                .as_ref()
                .is_some_and(|flag| flag.load(Ordering::Relaxed));
            let late = self.deadline.is_some_and(|d| Instant::now() >= d);
            if cancelled || late {
                self.exhausted = true;
                return false;
            }
        }
        self.expansions += 1;
        true
    }

    pub fn expansions(&self) -> usize {
        self.expansions
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}

impl Default for SearchBudget {
    fn default() -> Self {
        Self::unlimited()
    }
}
