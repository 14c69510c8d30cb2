//! Billing cycles and the calendar arithmetic used to step between due dates.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::core::errors::SubscriptionError;

/// How often a subscription charges.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum BillingCycle {
    Monthly,
    Yearly,
}

impl BillingCycle {
    pub const ALL: [BillingCycle; 2] = [BillingCycle::Monthly, BillingCycle::Yearly];

    pub fn as_str(self) -> &'static str {
        match self {
            BillingCycle::Monthly => "monthly",
            BillingCycle::Yearly => "yearly",
        }
    }

    /// Moves `from` forward by one billing period.
    ///
    /// Days missing from the target month roll into the following month, so
    /// Jan 31 plus one month lands on Mar 3 (Mar 2 in leap years) and Feb 29
    /// plus one year lands on Mar 1.
    pub fn next_date(self, from: NaiveDate) -> NaiveDate {
        self.checked_next_date(from).unwrap_or(NaiveDate::MAX)
    }

    pub fn checked_next_date(self, from: NaiveDate) -> Option<NaiveDate> {
        match self {
            BillingCycle::Monthly => add_months_rolling(from, 1),
            BillingCycle::Yearly => add_months_rolling(from, 12),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BillingCycle::Monthly => "Monthly",
            BillingCycle::Yearly => "Yearly",
        }
    }
}

/// Advances `date` by one period of `cycle`.
pub fn advance(date: NaiveDate, cycle: BillingCycle) -> NaiveDate {
    cycle.next_date(date)
}

fn add_months_rolling(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    let index = date.year() * 12 + date.month0() as i32 + months as i32;
    let year = index.div_euclid(12);
    let month = index.rem_euclid(12) as u32 + 1;
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    first.checked_add_signed(Duration::days(i64::from(date.day()) - 1))
}

impl fmt::Display for BillingCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BillingCycle {
    type Err = SubscriptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monthly" | "month" | "m" => Ok(BillingCycle::Monthly),
            "yearly" | "year" | "annual" | "y" => Ok(BillingCycle::Yearly),
            other => {
                let expected: Vec<&str> = BillingCycle::ALL.iter().map(|c| c.as_str()).collect();
                Err(SubscriptionError::InvalidInput(format!(
                    "unknown billing cycle `{other}` (expected one of: {})",
                    expected.join(", ")
                )))
            }
        }
    }
}
