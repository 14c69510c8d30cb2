//! Stateless filtering and ordering of subscription lists.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{BillingCycle, Category, Subscription};
use crate::core::errors::SubscriptionError;

/// Search and filter parameters for list views.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    /// Case-insensitive substring matched against name and notes.
    pub search: Option<String>,
    pub category: Option<Category>,
    pub billing_cycle: Option<BillingCycle>,
    pub min_cost: Option<f64>,
    pub max_cost: Option<f64>,
    pub show_paused: bool,
}

impl FilterCriteria {
    /// Soft-deleted entries never match.
    pub fn matches(&self, sub: &Subscription) -> bool {
        if sub.deleted {
            return false;
        }
        if sub.paused && !self.show_paused {
            return false;
        }
        if let Some(term) = self.search.as_deref().filter(|term| !term.is_empty()) {
            let term = term.to_lowercase();
            if !sub.name.to_lowercase().contains(&term) && !sub.notes.to_lowercase().contains(&term)
            {
                return false;
            }
        }
        if self.category.is_some_and(|category| sub.category != category) {
            return false;
        }
        if self.billing_cycle.is_some_and(|cycle| sub.billing_cycle != cycle) {
            return false;
        }
        if self.min_cost.is_some_and(|min| sub.cost < min) {
            return false;
        }
        if self.max_cost.is_some_and(|max| sub.cost > max) {
            return false;
        }
        true
    }

    pub fn apply<'a, I>(&self, subscriptions: I) -> Vec<Subscription>
    where
        I: IntoIterator<Item = &'a Subscription>,
    {
        subscriptions
            .into_iter()
            .filter(|sub| self.matches(sub))
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    Name,
    Cost,
    NextPayment,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortField {
    pub fn compare(self, a: &Subscription, b: &Subscription) -> Ordering {
        match self {
            SortField::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            SortField::Cost => a.cost.total_cmp(&b.cost),
            SortField::NextPayment => a.next_payment.cmp(&b.next_payment),
        }
    }
}

pub fn sort_subscriptions(subscriptions: &mut [Subscription], field: SortField, order: SortOrder) {
    subscriptions.sort_by(|a, b| {
        let ordering = field.compare(a, b);
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}

impl FromStr for SortField {
    type Err = SubscriptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "name" => Ok(SortField::Name),
            "cost" => Ok(SortField::Cost),
            "next_payment" | "next" | "due" => Ok(SortField::NextPayment),
            other => Err(SubscriptionError::InvalidInput(format!(
                "unknown sort field `{other}` (expected name, cost or next_payment)"
            ))),
        }
    }
}

impl FromStr for SortOrder {
    type Err = SubscriptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Asc),
            "desc" | "descending" => Ok(SortOrder::Desc),
            other => Err(SubscriptionError::InvalidInput(format!(
                "unknown sort order `{other}`"
            ))),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SortField::Name => "name",
            SortField::Cost => "cost",
            SortField::NextPayment => "next_payment",
        };
        f.write_str(label)
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Asc => f.write_str("asc"),
            SortOrder::Desc => f.write_str("desc"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sub(name: &str, cost: f64, cycle: BillingCycle, category: Category) -> Subscription {
        Subscription::new(
            name,
            cost,
            cycle,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        )
        .with_category(category)
    }

    fn fixtures() -> Vec<Subscription> {
        let mut paused = sub("Hulu", 7.99, BillingCycle::Monthly, Category::Streaming);
        paused.paused = true;
        let mut deleted = sub("Old Gym", 30.0, BillingCycle::Monthly, Category::Other);
        deleted.deleted = true;
        vec![
            sub("netflix", 15.49, BillingCycle::Monthly, Category::Streaming),
            sub("Adobe", 599.88, BillingCycle::Yearly, Category::Software)
                .with_notes("Creative cloud, team plan"),
            sub("Game Pass", 16.99, BillingCycle::Monthly, Category::Gaming),
            paused,
            deleted,
        ]
    }

    fn names(list: &[Subscription]) -> Vec<&str> {
        list.iter().map(|sub| sub.name.as_str()).collect()
    }

    #[test]
    fn default_filter_hides_paused_and_deleted() {
        let subs = fixtures();
        let visible = FilterCriteria::default().apply(&subs);
        assert_eq!(names(&visible), vec!["netflix", "Adobe", "Game Pass"]);
    }

    #[test]
    fn show_paused_never_reveals_deleted() {
        let subs = fixtures();
        let filter = FilterCriteria {
            show_paused: true,
            ..FilterCriteria::default()
        };
        let visible = filter.apply(&subs);
        assert!(names(&visible).contains(&"Hulu"));
        assert!(!names(&visible).contains(&"Old Gym"));
    }

    #[test]
    fn search_matches_notes_case_insensitively() {
        let subs = fixtures();
        let filter = FilterCriteria {
            search: Some("CLOUD".into()),
            ..FilterCriteria::default()
        };
        assert_eq!(names(&filter.apply(&subs)), vec!["Adobe"]);
    }

    #[test]
    fn cost_range_is_inclusive() {
        let subs = fixtures();
        let filter = FilterCriteria {
            min_cost: Some(15.49),
            max_cost: Some(16.99),
            ..FilterCriteria::default()
        };
        assert_eq!(names(&filter.apply(&subs)), vec!["netflix", "Game Pass"]);
    }

    #[test]
    fn category_and_cycle_are_exact() {
        let subs = fixtures();
        let filter = FilterCriteria {
            category: Some(Category::Streaming),
            billing_cycle: Some(BillingCycle::Monthly),
            show_paused: true,
            ..FilterCriteria::default()
        };
        assert_eq!(names(&filter.apply(&subs)), vec!["netflix", "Hulu"]);
    }

    #[test]
    fn sorts_by_name_case_insensitively_and_by_cost() {
        let mut subs = FilterCriteria::default().apply(&fixtures());
        sort_subscriptions(&mut subs, SortField::Name, SortOrder::Asc);
        assert_eq!(names(&subs), vec!["Adobe", "Game Pass", "netflix"]);
        sort_subscriptions(&mut subs, SortField::Cost, SortOrder::Desc);
        assert_eq!(names(&subs), vec!["Adobe", "Game Pass", "netflix"]);
        sort_subscriptions(&mut subs, SortField::Cost, SortOrder::Asc);
        assert_eq!(names(&subs), vec!["netflix", "Game Pass", "Adobe"]);
    }
}
