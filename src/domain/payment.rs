//! Realised charge events.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::dates::iso_date;

/// Notes marker carried by rows synthesised by the payment generator.
pub const AUTO_GENERATED_NOTE: &str = "Auto-generated";

/// A single charge tied to one subscription. Never mutated once recorded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Payment {
    pub id: String,
    pub subscription_id: String,
    pub amount: f64,
    #[serde(with = "iso_date")]
    pub payment_date: NaiveDate,
    #[serde(default)]
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

impl Payment {
    pub fn new(
        subscription_id: impl Into<String>,
        amount: f64,
        payment_date: NaiveDate,
        notes: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            subscription_id: subscription_id.into(),
            amount,
            payment_date,
            notes: notes.into(),
            created_at,
        }
    }

    pub fn auto_generated(
        subscription_id: impl Into<String>,
        amount: f64,
        payment_date: NaiveDate,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self::new(
            subscription_id,
            amount,
            payment_date,
            AUTO_GENERATED_NOTE,
            created_at,
        )
    }

    pub fn is_auto_generated(&self) -> bool {
        self.notes == AUTO_GENERATED_NOTE
    }

    pub fn belongs_to(&self, subscription_id: &str) -> bool {
        self.subscription_id == subscription_id
    }
}
