//! Reconstructs the payments a subscription should have produced by a given
//! instant. Pure: callers own loading and persisting the snapshot.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};

use crate::core::time::{start_of_day, truncate_to_day};
use crate::domain::{Payment, Subscription};

/// Payments to append and the due date to record for one subscription.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentPlan {
    pub subscription_id: String,
    pub payments: Vec<Payment>,
    pub next_payment: NaiveDate,
}

impl PaymentPlan {
    pub fn is_empty(&self) -> bool {
        self.payments.is_empty()
    }
}

/// Where generation resumes: the later of the start date and the newest
/// recorded payment for the subscription.
pub fn cursor_for(subscription: &Subscription, payments: &[Payment]) -> NaiveDate {
    payments
        .iter()
        .filter(|payment| payment.belongs_to(&subscription.id))
        .map(|payment| payment.payment_date)
        .max()
        .filter(|last| *last > subscription.start_date)
        .unwrap_or(subscription.start_date)
}

/// Steps the cursor one period at a time while it is before `now`, emitting an
/// auto-generated payment for every reached date that is before `now` or equal
/// to `now` truncated to the day, unless one is already recorded for that day.
///
/// The caller decides whether the subscription is eligible; this function does
/// not look at the paused or deleted flags.
pub fn plan_payments(
    subscription: &Subscription,
    payments: &[Payment],
    now: DateTime<Utc>,
) -> PaymentPlan {
    let mut recorded: HashSet<NaiveDate> = payments
        .iter()
        .filter(|payment| payment.belongs_to(&subscription.id))
        .map(|payment| payment.payment_date)
        .collect();
    let cycle = subscription.billing_cycle;
    let today = truncate_to_day(now);
    let mut cursor = cursor_for(subscription, payments);
    let mut created = Vec::new();

    while start_of_day(cursor) < now {
        let Some(next) = cycle.checked_next_date(cursor) else {
            break;
        };
        cursor = next;
        let due = start_of_day(cursor);
        if (due < now || due == today) && recorded.insert(cursor) {
            tracing::debug!(
                subscription = %subscription.id,
                date = %cursor,
                amount = subscription.cost,
                "synthesized payment"
            );
            created.push(Payment::auto_generated(
                subscription.id.clone(),
                subscription.cost,
                cursor,
                now,
            ));
        }
    }

    let next_payment = if start_of_day(cursor) > now {
        cursor
    } else {
        cycle.next_date(cursor)
    };

    PaymentPlan {
        subscription_id: subscription.id.clone(),
        payments: created,
        next_payment,
    }
}
