use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::core::errors::SubscriptionError;
use crate::core::time::start_of_day;
use crate::domain::{
    sort_subscriptions, CostSummary, FilterCriteria, SortField, SortOrder, Subscription,
};
use crate::storage::SnapshotStore;

use super::{CostCalculator, ServiceResult};

/// CRUD and queries over the subscriptions in the store.
pub struct SubscriptionService {
    store: Arc<dyn SnapshotStore>,
}

impl SubscriptionService {
    pub fn new(store: Arc<dyn SnapshotStore>) -> Self {
        Self { store }
    }

    /// Validates and appends `subscription` under a fresh id and timestamps.
    pub fn create(&self, mut subscription: Subscription) -> ServiceResult<Subscription> {
        subscription.validate()?;
        let now = Utc::now();
        subscription.id = Uuid::new_v4().to_string();
        subscription.created_at = now;
        subscription.updated_at = now;
        subscription.deleted = false;
        subscription.deleted_at = None;

        let mut snapshot = self.store.load()?;
        snapshot.subscriptions.push(subscription.clone());
        self.store.save(&mut snapshot)?;
        tracing::info!(id = %subscription.id, name = %subscription.name, "subscription created");
        Ok(subscription)
    }

    /// Replaces the stored record with the same id, keeping `created_at`.
    pub fn update(&self, mut subscription: Subscription) -> ServiceResult<Subscription> {
        if subscription.id.trim().is_empty() {
            return Err(SubscriptionError::InvalidInput(
                "subscription id must not be empty".into(),
            ));
        }
        subscription.validate()?;

        let mut snapshot = self.store.load()?;
        let stored = snapshot
            .subscription_mut(&subscription.id)
            .ok_or_else(|| SubscriptionError::NotFound(subscription.id.clone()))?;
        subscription.created_at = stored.created_at;
        subscription.updated_at = Utc::now();
        *stored = subscription.clone();
        self.store.save(&mut snapshot)?;
        tracing::info!(id = %subscription.id, "subscription updated");
        Ok(subscription)
    }

    /// Soft delete: the record and its payments stay in the snapshot.
    pub fn delete(&self, id: &str) -> ServiceResult<()> {
        let mut snapshot = self.store.load()?;
        let stored = snapshot
            .subscription_mut(id)
            .ok_or_else(|| SubscriptionError::NotFound(id.to_string()))?;
        stored.mark_deleted(Utc::now());
        self.store.save(&mut snapshot)?;
        tracing::info!(id, "subscription deleted");
        Ok(())
    }

    /// Looks up by id, soft-deleted records included.
    pub fn get(&self, id: &str) -> ServiceResult<Subscription> {
        self.store
            .load()?
            .subscription(id)
            .cloned()
            .ok_or_else(|| SubscriptionError::NotFound(id.to_string()))
    }

    pub fn set_paused(&self, id: &str, paused: bool) -> ServiceResult<Subscription> {
        let mut snapshot = self.store.load()?;
        let stored = snapshot
            .subscription_mut(id)
            .ok_or_else(|| SubscriptionError::NotFound(id.to_string()))?;
        stored.paused = paused;
        stored.touch();
        let updated = stored.clone();
        self.store.save(&mut snapshot)?;
        tracing::info!(id, paused, "subscription pause state changed");
        Ok(updated)
    }

    pub fn list(
        &self,
        filter: &FilterCriteria,
        field: SortField,
        order: SortOrder,
    ) -> ServiceResult<Vec<Subscription>> {
        let snapshot = self.store.load()?;
        let mut matches = filter.apply(&snapshot.subscriptions);
        sort_subscriptions(&mut matches, field, order);
        Ok(matches)
    }

    pub fn summary(&self, now: DateTime<Utc>) -> ServiceResult<CostSummary> {
        let snapshot = self.store.load()?;
        Ok(CostCalculator::summarize(
            &snapshot.subscriptions,
            &snapshot.payments,
            now,
        ))
    }

    /// Active subscriptions due between the start of `now`'s day and `days`
    /// days later, soonest first.
    pub fn upcoming(&self, now: DateTime<Utc>, days: u32) -> ServiceResult<Vec<Subscription>> {
        let today = now.date_naive();
        let horizon = start_of_day(today) + Duration::days(i64::from(days));
        let snapshot = self.store.load()?;
        let mut due: Vec<Subscription> = snapshot
            .subscriptions
            .into_iter()
            .filter(|sub| sub.is_active())
            .filter(|sub| sub.next_payment >= today && start_of_day(sub.next_payment) <= horizon)
            .collect();
        sort_subscriptions(&mut due, SortField::NextPayment, SortOrder::Asc);
        Ok(due)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BillingCycle, Category};
    use crate::storage::MemoryStore;
    use chrono::{NaiveDate, TimeZone};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn service() -> (SubscriptionService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (SubscriptionService::new(store.clone()), store)
    }

    fn draft(name: &str, cost: f64) -> Subscription {
        Subscription::new(name, cost, BillingCycle::Monthly, date(2024, 1, 1))
    }

    #[test]
    fn create_assigns_fresh_identity() {
        let (service, _store) = service();
        let input = draft("Video", 10.0);
        let created = service.create(input.clone()).unwrap();
        assert_ne!(created.id, input.id);
        assert_eq!(service.get(&created.id).unwrap().name, "Video");
    }

    #[test]
    fn create_rejects_negative_cost() {
        let (service, store) = service();
        let err = service.create(draft("Bad", -1.0)).unwrap_err();
        assert!(matches!(err, SubscriptionError::InvalidInput(_)));
        assert_eq!(store.save_count(), 0);
    }

    #[test]
    fn update_requires_id_and_existing_record() {
        let (service, _store) = service();
        let mut blank = draft("Blank", 1.0);
        blank.id.clear();
        assert!(matches!(
            service.update(blank),
            Err(SubscriptionError::InvalidInput(_))
        ));
        assert!(matches!(
            service.update(draft("Missing", 1.0)),
            Err(SubscriptionError::NotFound(_))
        ));
    }

    #[test]
    fn update_preserves_created_at() {
        let (service, _store) = service();
        let created = service.create(draft("Cloud", 2.0)).unwrap();
        let mut edited = created.clone();
        edited.cost = 3.0;
        edited.created_at = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap();
        let updated = service.update(edited).unwrap();
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(service.get(&created.id).unwrap().cost, 3.0);
    }

    #[test]
    fn delete_is_soft_and_hides_from_list() {
        let (service, _store) = service();
        let created = service.create(draft("Paper", 4.0)).unwrap();
        service.delete(&created.id).unwrap();

        let fetched = service.get(&created.id).unwrap();
        assert!(fetched.deleted);
        assert!(fetched.deleted_at.is_some());

        let listed = service
            .list(&FilterCriteria::default(), SortField::Name, SortOrder::Asc)
            .unwrap();
        assert!(listed.is_empty());
        assert!(matches!(
            service.delete("nope"),
            Err(SubscriptionError::NotFound(_))
        ));
    }

    #[test]
    fn pause_toggle_moves_cost_to_paused_count() {
        let (service, _store) = service();
        let created = service
            .create(draft("Game", 15.0).with_category(Category::Gaming))
            .unwrap();
        service.set_paused(&created.id, true).unwrap();
        let summary = service.summary(Utc::now()).unwrap();
        assert_eq!(summary.paused_count, 1);
        assert_eq!(summary.total_monthly, 0.0);

        service.set_paused(&created.id, false).unwrap();
        let summary = service.summary(Utc::now()).unwrap();
        assert_eq!(summary.count, 1);
        assert_eq!(summary.category_total(Category::Gaming), 15.0);
    }

    #[test]
    fn upcoming_lists_due_window_soonest_first() {
        let (service, _store) = service();
        let now = Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap();
        let mut later = draft("Later", 1.0);
        later.next_payment = date(2024, 5, 17);
        let mut sooner = draft("Sooner", 1.0);
        sooner.next_payment = date(2024, 5, 10);
        let mut outside = draft("Outside", 1.0);
        outside.next_payment = date(2024, 5, 18);
        for sub in [later, sooner, outside] {
            service.create(sub).unwrap();
        }
        let names: Vec<_> = service
            .upcoming(now, 7)
            .unwrap()
            .into_iter()
            .map(|sub| sub.name)
            .collect();
        assert_eq!(names, vec!["Sooner", "Later"]);
    }
}
