#![doc(test(attr(deny(warnings))))]

//! Subscription Core tracks recurring subscriptions, reconstructs their payment
//! history from billing cycles, and aggregates what they cost.

pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod images;
pub mod ledger;
pub mod storage;
pub mod transfer;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Subscription Core tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
    }
}
