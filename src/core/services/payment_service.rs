use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::core::errors::SubscriptionError;
use crate::domain::{Payment, Subscription};
use crate::ledger::{plan_payments, PaymentPlan};
use crate::storage::SnapshotStore;

use super::{CostCalculator, ServiceResult};

/// Outcome of a batch generation run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationSummary {
    /// Subscriptions that were planned (active ones).
    pub processed: usize,
    pub payments_created: usize,
}

/// Loads the snapshot, plans missing payments, and persists the result.
pub struct PaymentService {
    store: Arc<dyn SnapshotStore>,
}

impl PaymentService {
    pub fn new(store: Arc<dyn SnapshotStore>) -> Self {
        Self { store }
    }

    /// Fills in the payment history of one subscription up to `now`.
    ///
    /// Returns `Ok(None)` without touching the store when the subscription is
    /// paused or deleted.
    pub fn generate_for_subscription(
        &self,
        subscription: &Subscription,
        now: DateTime<Utc>,
    ) -> ServiceResult<Option<PaymentPlan>> {
        if !subscription.is_active() {
            tracing::debug!(subscription = %subscription.id, "skipping inactive subscription");
            return Ok(None);
        }

        let mut snapshot = self.store.load()?;
        if snapshot.subscription(&subscription.id).is_none() {
            return Err(SubscriptionError::NotFound(subscription.id.clone()));
        }

        let plan = plan_payments(subscription, &snapshot.payments, now);
        if let Some(stored) = snapshot.subscription_mut(&subscription.id) {
            stored.next_payment = plan.next_payment;
            stored.updated_at = now;
        }
        snapshot.payments.extend(plan.payments.iter().cloned());
        self.store.save(&mut snapshot)?;

        tracing::info!(
            subscription = %subscription.id,
            created = plan.payments.len(),
            next_payment = %plan.next_payment,
            "payments generated"
        );
        Ok(Some(plan))
    }

    /// Runs generation for every active subscription in one load and one save.
    pub fn generate_all(&self, now: DateTime<Utc>) -> ServiceResult<GenerationSummary> {
        let mut snapshot = self.store.load()?;
        let mut summary = GenerationSummary::default();

        for index in 0..snapshot.subscriptions.len() {
            if !snapshot.subscriptions[index].is_active() {
                continue;
            }
            let plan = plan_payments(&snapshot.subscriptions[index], &snapshot.payments, now);
            let subscription = &mut snapshot.subscriptions[index];
            subscription.next_payment = plan.next_payment;
            subscription.updated_at = now;
            summary.processed += 1;
            summary.payments_created += plan.payments.len();
            snapshot.payments.extend(plan.payments);
        }

        self.store.save(&mut snapshot)?;
        tracing::info!(
            processed = summary.processed,
            created = summary.payments_created,
            "payment generation complete"
        );
        Ok(summary)
    }

    /// Payments recorded for `subscription_id`, in append order.
    pub fn payments_for_subscription(&self, subscription_id: &str) -> ServiceResult<Vec<Payment>> {
        let snapshot = self.store.load()?;
        Ok(snapshot.payments_for(subscription_id).cloned().collect())
    }

    /// Payments dated from January 1st of `now`'s year through `now`.
    pub fn year_to_date_payments(&self, now: DateTime<Utc>) -> ServiceResult<Vec<Payment>> {
        let snapshot = self.store.load()?;
        Ok(snapshot
            .payments
            .into_iter()
            .filter(|payment| CostCalculator::in_year_to_date(payment.payment_date, now))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BillingCycle, Snapshot};
    use crate::storage::MemoryStore;
    use chrono::{NaiveDate, TimeZone};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn service_with(subs: Vec<Subscription>) -> (PaymentService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::with_snapshot(Snapshot {
            subscriptions: subs,
            ..Snapshot::default()
        }));
        (PaymentService::new(store.clone()), store)
    }

    /// Store whose writes always fail; reads fail too when `fail_on_load` is set.
    struct FailingStore {
        snapshot: Snapshot,
        fail_on_load: bool,
        save_attempts: AtomicUsize,
    }

    impl FailingStore {
        fn new(subs: Vec<Subscription>, fail_on_load: bool) -> Self {
            Self {
                snapshot: Snapshot {
                    subscriptions: subs,
                    ..Snapshot::default()
                },
                fail_on_load,
                save_attempts: AtomicUsize::new(0),
            }
        }
    }

    impl SnapshotStore for FailingStore {
        fn load(&self) -> crate::storage::Result<Snapshot> {
            if self.fail_on_load {
                return Err(SubscriptionError::StorageFailure("disk unavailable".into()));
            }
            Ok(self.snapshot.clone())
        }

        fn save(&self, _snapshot: &mut Snapshot) -> crate::storage::Result<()> {
            self.save_attempts.fetch_add(1, Ordering::SeqCst);
            Err(SubscriptionError::StorageFailure("disk full".into()))
        }
    }

    fn failing_service(
        subs: Vec<Subscription>,
        fail_on_load: bool,
    ) -> (PaymentService, Arc<FailingStore>) {
        let store = Arc::new(FailingStore::new(subs, fail_on_load));
        (PaymentService::new(store.clone()), store)
    }

    fn assert_storage_failure<T: std::fmt::Debug>(result: ServiceResult<T>, expected: &str) {
        match result {
            Err(SubscriptionError::StorageFailure(msg)) => assert_eq!(msg, expected),
            other => panic!("expected StorageFailure({expected}), got {other:?}"),
        }
    }

    #[test]
    fn generates_and_persists_in_one_save() {
        let sub = Subscription::new("Music", 9.99, BillingCycle::Monthly, date(2023, 1, 15));
        let (service, store) = service_with(vec![sub.clone()]);
        let now = Utc.with_ymd_and_hms(2023, 4, 20, 9, 0, 0).unwrap();

        let plan = service
            .generate_for_subscription(&sub, now)
            .unwrap()
            .expect("active subscription is planned");
        assert_eq!(plan.payments.len(), 3);
        assert_eq!(store.save_count(), 1);

        let snapshot = store.load().unwrap();
        assert_eq!(snapshot.payments.len(), 3);
        assert_eq!(snapshot.subscriptions[0].next_payment, date(2023, 5, 15));
        assert_eq!(snapshot.subscriptions[0].updated_at, now);
    }

    #[test]
    fn paused_subscription_does_not_touch_store() {
        let mut sub = Subscription::new("Paused", 1.0, BillingCycle::Monthly, date(2020, 1, 1));
        sub.paused = true;
        let (service, store) = service_with(vec![sub.clone()]);
        let outcome = service.generate_for_subscription(&sub, Utc::now()).unwrap();
        assert!(outcome.is_none());
        assert_eq!(store.save_count(), 0);
    }

    #[test]
    fn unknown_subscription_is_not_found() {
        let sub = Subscription::new("Ghost", 1.0, BillingCycle::Monthly, date(2020, 1, 1));
        let (service, store) = service_with(Vec::new());
        let err = service.generate_for_subscription(&sub, Utc::now()).unwrap_err();
        assert!(matches!(err, SubscriptionError::NotFound(id) if id == sub.id));
        assert_eq!(store.save_count(), 0);
    }

    #[test]
    fn generate_all_skips_inactive_and_is_idempotent() {
        let active = Subscription::new("Active", 5.0, BillingCycle::Monthly, date(2024, 1, 10));
        let mut deleted = Subscription::new("Gone", 5.0, BillingCycle::Monthly, date(2024, 1, 10));
        deleted.mark_deleted(Utc.with_ymd_and_hms(2024, 1, 11, 0, 0, 0).unwrap());
        let (service, store) = service_with(vec![active.clone(), deleted.clone()]);
        let now = Utc.with_ymd_and_hms(2024, 3, 12, 8, 0, 0).unwrap();

        let first = service.generate_all(now).unwrap();
        assert_eq!(first.processed, 1);
        assert_eq!(first.payments_created, 2);

        let second = service.generate_all(now).unwrap();
        assert_eq!(second.payments_created, 0);
        assert_eq!(store.save_count(), 2);

        let snapshot = store.load().unwrap();
        assert_eq!(snapshot.payments.len(), 2);
        assert_eq!(snapshot.subscription(&deleted.id).unwrap().next_payment, date(2024, 1, 10));
        assert!(service.payments_for_subscription(&deleted.id).unwrap().is_empty());
        assert_eq!(service.payments_for_subscription(&active.id).unwrap().len(), 2);
    }

    #[test]
    fn year_to_date_payments_filters_by_year() {
        let sub = Subscription::new("Old", 3.0, BillingCycle::Monthly, date(2023, 11, 1));
        let (service, _store) = service_with(vec![sub]);
        let now = Utc.with_ymd_and_hms(2024, 2, 15, 0, 0, 0).unwrap();
        service.generate_all(now).unwrap();
        let ytd = service.year_to_date_payments(now).unwrap();
        let dates: Vec<_> = ytd.iter().map(|p| p.payment_date).collect();
        assert_eq!(dates, vec![date(2024, 1, 1), date(2024, 2, 1)]);
    }

    #[test]
    fn load_failure_is_returned_unchanged() {
        let sub = Subscription::new("Music", 9.99, BillingCycle::Monthly, date(2023, 1, 15));
        let (service, store) = failing_service(vec![sub.clone()], true);
        let now = Utc.with_ymd_and_hms(2023, 4, 20, 9, 0, 0).unwrap();

        assert_storage_failure(service.generate_for_subscription(&sub, now), "disk unavailable");
        assert_storage_failure(service.generate_all(now), "disk unavailable");
        assert_storage_failure(service.payments_for_subscription(&sub.id), "disk unavailable");
        assert_eq!(store.save_attempts.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn save_failure_is_returned_and_nothing_persists() {
        let sub = Subscription::new("Music", 9.99, BillingCycle::Monthly, date(2023, 1, 15));
        let (service, store) = failing_service(vec![sub.clone()], false);
        let now = Utc.with_ymd_and_hms(2023, 4, 20, 9, 0, 0).unwrap();

        assert_storage_failure(service.generate_for_subscription(&sub, now), "disk full");
        assert_storage_failure(service.generate_all(now), "disk full");

        // one attempt per call, none retried
        assert_eq!(store.save_attempts.load(Ordering::SeqCst), 2);
        let stored = store.load().unwrap();
        assert!(stored.payments.is_empty());
        assert_eq!(stored.subscriptions[0].next_payment, sub.next_payment);
    }
}
