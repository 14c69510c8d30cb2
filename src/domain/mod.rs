//! Persistence-friendly domain types for subscriptions and their payments.

pub mod billing;
pub mod category;
pub mod dates;
pub mod filter;
pub mod payment;
pub mod snapshot;
pub mod subscription;
pub mod summary;

pub use billing::{advance, BillingCycle};
pub use category::Category;
pub use filter::{sort_subscriptions, FilterCriteria, SortField, SortOrder};
pub use payment::{Payment, AUTO_GENERATED_NOTE};
pub use snapshot::{Snapshot, FORMAT_VERSION};
pub use subscription::Subscription;
pub use summary::CostSummary;
