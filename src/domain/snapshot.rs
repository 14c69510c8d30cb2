use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::{Payment, Subscription};

/// Format tag written on every save.
pub const FORMAT_VERSION: &str = "1.0";

/// The unit of persistence: every subscription and every payment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    #[serde(default)]
    pub subscriptions: Vec<Subscription>,
    #[serde(default)]
    pub payments: Vec<Payment>,
    #[serde(default = "default_version")]
    pub version: String,
}

fn default_version() -> String {
    FORMAT_VERSION.to_string()
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            subscriptions: Vec::new(),
            payments: Vec::new(),
            version: default_version(),
        }
    }
}

impl Snapshot {
    pub fn subscription(&self, id: &str) -> Option<&Subscription> {
        self.subscriptions.iter().find(|sub| sub.id == id)
    }

    pub fn subscription_mut(&mut self, id: &str) -> Option<&mut Subscription> {
        self.subscriptions.iter_mut().find(|sub| sub.id == id)
    }

    /// Payments recorded for `subscription_id`, in append order.
    pub fn payments_for<'a>(
        &'a self,
        subscription_id: &'a str,
    ) -> impl Iterator<Item = &'a Payment> + 'a {
        self.payments
            .iter()
            .filter(move |payment| payment.belongs_to(subscription_id))
    }

    pub fn stamp_version(&mut self) {
        self.version = FORMAT_VERSION.to_string();
    }

    /// Detects dangling payment references and reused subscription ids.
    pub fn warnings(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut warnings = Vec::new();
        for sub in &self.subscriptions {
            if !seen.insert(sub.id.as_str()) {
                warnings.push(format!("subscription id {} appears more than once", sub.id));
            }
        }
        for payment in &self.payments {
            if !seen.contains(payment.subscription_id.as_str()) {
                warnings.push(format!(
                    "payment {} references unknown subscription {}",
                    payment.id, payment.subscription_id
                ));
            }
        }
        warnings
    }
}
