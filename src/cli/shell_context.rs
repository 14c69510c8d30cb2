use std::sync::Arc;

use dialoguer::theme::ColorfulTheme;

use crate::{
    config::{Config, ConfigManager},
    core::{
        services::{PaymentService, SubscriptionService},
        time::Clock,
    },
    images::ImageLibrary,
    storage::SnapshotStore,
};

use super::registry::CommandRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub store: Arc<dyn SnapshotStore>,
    pub subscriptions: SubscriptionService,
    pub payments: PaymentService,
    pub images: ImageLibrary,
    pub config_manager: ConfigManager,
    pub config: Config,
    pub clock: Box<dyn Clock>,
    pub theme: ColorfulTheme,
    pub running: bool,
}
