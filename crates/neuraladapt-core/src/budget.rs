//! Daily spend ceiling for model calls.
//!
//! Charges are estimates made before each call. A charge that would push
//! the day's total past the limit is refused and leaves the total as it
//! was. The counter starts over whenever the UTC date changes.

use std::sync::{Mutex, PoisonError};

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

/// Ceiling used when nothing is configured.
pub const DEFAULT_DAILY_LIMIT_CENTS: u32 = 800;

/// Rough cost of one plan-generation call.
pub const ESTIMATED_CALL_COST_CENTS: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "daily model budget exceeded: spent {spent_cents} cents, a further {requested_cents} would pass the {limit_cents} cent limit"
)]
pub struct BudgetExceeded {
    pub spent_cents: u32,
    pub requested_cents: u32,
    pub limit_cents: u32,
}

/// Point-in-time view of the counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageSnapshot {
    pub date: NaiveDate,
    pub spent_cents: u32,
    pub limit_cents: u32,
}

#[derive(Debug)]
struct UsageState {
    date: NaiveDate,
    cents: u32,
}

/// In-process daily usage counter. Share it behind an `Arc`.
#[derive(Debug)]
pub struct UsageBudget {
    limit_cents: u32,
    state: Mutex<UsageState>,
}

impl UsageBudget {
    pub fn new(limit_cents: u32) -> Self {
        Self {
            limit_cents,
            state: Mutex::new(UsageState {
                date: Utc::now().date_naive(),
                cents: 0,
            }),
        }
    }

    pub fn limit_cents(&self) -> u32 {
        self.limit_cents
    }

    /// Charge `cents` against today's total.
    pub fn charge(&self, cents: u32) -> Result<(), BudgetExceeded> {
        self.charge_on(Utc::now().date_naive(), cents)
    }

    /// Charge against the total for `today`, resetting it first if the
    /// stored date differs.
    pub fn charge_on(&self, today: NaiveDate, cents: u32) -> Result<(), BudgetExceeded> {
        // The state is two plain integers, so a poisoned lock is still usable.
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.date != today {
            debug!(previous = %state.date, %today, "resetting daily usage");
            state.date = today;
            state.cents = 0;
        }

        let total = state.cents.saturating_add(cents);
        if total > self.limit_cents {
            warn!(
                spent_cents = state.cents,
                requested_cents = cents,
                limit_cents = self.limit_cents,
                "daily model budget exceeded"
            );
            return Err(BudgetExceeded {
                spent_cents: state.cents,
                requested_cents: cents,
                limit_cents: self.limit_cents,
            });
        }

        state.cents = total;
        Ok(())
    }

    pub fn snapshot(&self) -> UsageSnapshot {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        UsageSnapshot {
            date: state.date,
            spent_cents: state.cents,
            limit_cents: self.limit_cents,
        }
    }
}

impl Default for UsageBudget {
    fn default() -> Self {
        Self::new(DEFAULT_DAILY_LIMIT_CENTS)
    }
}
