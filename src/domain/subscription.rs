//! Domain type for a recurring charge.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::billing::BillingCycle;
use super::category::Category;
use super::dates::{iso_date, optional_timestamp};
use crate::core::errors::{Result, SubscriptionError};

/// A recurring charge tracked by the user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Subscription {
    pub id: String,
    pub name: String,
    pub cost: f64,
    pub billing_cycle: BillingCycle,
    #[serde(with = "iso_date")]
    pub next_payment: NaiveDate,
    #[serde(with = "iso_date")]
    pub start_date: NaiveDate,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub notes: String,
    /// Filename inside the image library; empty when unset.
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub paused: bool,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default, with = "optional_timestamp")]
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    /// Builds a fresh subscription whose first due date is its start date.
    pub fn new(
        name: impl Into<String>,
        cost: f64,
        billing_cycle: BillingCycle,
        start_date: NaiveDate,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            cost,
            billing_cycle,
            next_payment: start_date,
            start_date,
            category: Category::Other,
            notes: String::new(),
            image: String::new(),
            paused: false,
            deleted: false,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Neither paused nor soft-deleted.
    pub fn is_active(&self) -> bool {
        !self.paused && !self.deleted
    }

    pub fn has_image(&self) -> bool {
        !self.image.trim().is_empty()
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn mark_deleted(&mut self, at: DateTime<Utc>) {
        self.deleted = true;
        self.deleted_at = Some(at);
        self.updated_at = at;
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(SubscriptionError::InvalidInput(
                "subscription name must not be empty".into(),
            ));
        }
        if !self.cost.is_finite() || self.cost < 0.0 {
            return Err(SubscriptionError::InvalidInput(format!(
                "cost must be a non-negative amount, got {}",
                self.cost
            )));
        }
        Ok(())
    }
}
