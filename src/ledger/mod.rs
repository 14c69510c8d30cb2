//! Payment schedule reconstruction.

pub mod schedule;

pub use schedule::{cursor_for, plan_payments, PaymentPlan};
