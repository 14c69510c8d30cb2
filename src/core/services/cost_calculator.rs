//! Pure cost conversions and aggregation over subscriptions and payments.

use chrono::{DateTime, Datelike, NaiveDate, Utc};

use crate::core::time::{start_of_day, truncate_to_day};
use crate::domain::{BillingCycle, CostSummary, Payment, Subscription};

/// Stateless cost arithmetic. No I/O.
pub struct CostCalculator;

impl CostCalculator {
    pub fn monthly_equivalent(cost: f64, cycle: BillingCycle) -> f64 {
        match cycle {
            BillingCycle::Monthly => cost,
            BillingCycle::Yearly => cost / 12.0,
        }
    }

    pub fn yearly_equivalent(cost: f64, cycle: BillingCycle) -> f64 {
        match cycle {
            BillingCycle::Monthly => cost * 12.0,
            BillingCycle::Yearly => cost,
        }
    }

    /// Aggregates active costs and the year-to-date payment total.
    ///
    /// Soft-deleted subscriptions are ignored entirely, paused ones only bump
    /// `paused_count`. Year-to-date covers every payment, including those of
    /// deleted subscriptions.
    pub fn summarize(
        subscriptions: &[Subscription],
        payments: &[Payment],
        now: DateTime<Utc>,
    ) -> CostSummary {
        let mut summary = CostSummary::default();

        for sub in subscriptions {
            if sub.deleted {
                continue;
            }
            if sub.paused {
                summary.paused_count += 1;
                continue;
            }
            summary.count += 1;
            let monthly = Self::monthly_equivalent(sub.cost, sub.billing_cycle);
            summary.total_monthly += monthly;
            *summary.by_category.entry(sub.category).or_insert(0.0) += monthly;
        }
        summary.total_yearly = summary.total_monthly * 12.0;

        summary.year_to_date = payments
            .iter()
            .filter(|payment| Self::in_year_to_date(payment.payment_date, now))
            .map(|payment| payment.amount)
            .sum();

        summary
    }

    /// `[Jan 1 of now's year, now]`, with the upper bound also admitting a date
    /// equal to `now` truncated to the day.
    pub fn in_year_to_date(date: NaiveDate, now: DateTime<Utc>) -> bool {
        let Some(year_start) = NaiveDate::from_ymd_opt(now.year(), 1, 1) else {
            return false;
        };
        if date < year_start {
            return false;
        }
        let stamp = start_of_day(date);
        stamp < now || stamp == truncate_to_day(now)
    }

    /// First date reached from `last` by whole periods that is not before `now`.
    pub fn next_payment_after(last: NaiveDate, cycle: BillingCycle, now: DateTime<Utc>) -> NaiveDate {
        let mut next = last;
        while start_of_day(next) < now {
            match cycle.checked_next_date(next) {
                Some(date) => next = date,
                None => break,
            }
        }
        next
    }
}
