pub mod cost_calculator;
pub mod payment_service;
pub mod subscription_service;

pub use cost_calculator::CostCalculator;
pub use payment_service::{GenerationSummary, PaymentService};
pub use subscription_service::SubscriptionService;

use crate::core::errors::SubscriptionError;

pub type ServiceResult<T> = Result<T, SubscriptionError>;
