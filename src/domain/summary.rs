use std::collections::BTreeMap;

use serde::Serialize;

use super::Category;

/// Aggregated cost statistics; derived on demand, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CostSummary {
    pub total_monthly: f64,
    /// Always `total_monthly * 12`.
    pub total_yearly: f64,
    /// Actual payments dated from Jan 1 through today.
    pub year_to_date: f64,
    pub by_category: BTreeMap<Category, f64>,
    /// Active (not paused, not deleted) subscriptions.
    pub count: usize,
    pub paused_count: usize,
}

impl CostSummary {
    pub fn category_total(&self, category: Category) -> f64 {
        self.by_category.get(&category).copied().unwrap_or(0.0)
    }
}
