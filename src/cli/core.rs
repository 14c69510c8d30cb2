//! Core CLI dispatch and shell context helpers.

use std::{env, io, path::PathBuf, sync::Arc};

use chrono::{DateTime, NaiveDate, Utc};
use dialoguer::theme::ColorfulTheme;
use strsim::levenshtein;

use crate::{
    config::ConfigManager,
    core::{
        errors::SubscriptionError,
        services::{PaymentService, SubscriptionService},
        time::{start_of_day, Clock, FixedClock, SystemClock},
        utils::PathResolver,
    },
    domain::dates::parse_date as parse_stored_date,
    images::ImageLibrary,
    storage::{JsonStore, SnapshotStore},
};

pub use crate::core::errors::CliError;

use super::commands;
use super::io as cli_io;
use super::output::{self, format_money, OutputPreferences};
use super::registry::{CommandEntry, CommandRegistry};
pub use super::shell_context::{CliMode, ShellContext};

/// Pins the shell's notion of "now" (RFC 3339 or `YYYY-MM-DD`).
pub const NOW_ENV: &str = "SUBSCRIPTION_CORE_NOW";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        Self::with_base_dir(mode, PathResolver::base_dir())
    }

    pub fn with_base_dir(mode: CliMode, base: PathBuf) -> Result<Self, CliError> {
        let mut registry = CommandRegistry::new();
        commands::register_all(&mut registry);

        output::set_preferences(OutputPreferences {
            plain_mode: mode == CliMode::Script,
        });

        let config_manager = ConfigManager::with_base_dir(base)?;
        let config = config_manager.load()?;
        let store: Arc<dyn SnapshotStore> =
            Arc::new(JsonStore::new(config_manager.data_file(&config)));
        let images = ImageLibrary::new(config_manager.images_dir(&config));

        let mut context = ShellContext {
            mode,
            registry,
            subscriptions: SubscriptionService::new(store.clone()),
            payments: PaymentService::new(store.clone()),
            store,
            images,
            config_manager,
            config,
            clock: clock_from_env(),
            theme: ColorfulTheme::default(),
            running: true,
        };
        context.generate_on_startup();
        Ok(context)
    }

    /// Catches the payment history up on launch. Failures are reported, not fatal.
    fn generate_on_startup(&mut self) {
        match self.payments.generate_all(self.now()) {
            Ok(summary) if summary.payments_created > 0 => output::info(format!(
                "Recorded {} new payment(s) across {} subscription(s).",
                summary.payments_created, summary.processed
            )),
            Ok(_) => {}
            Err(err) => output::warning(format!("Payment generation failed: {err}")),
        }
    }

    pub(crate) fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub(crate) fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub(crate) fn command(&self, name: &str) -> Option<&CommandEntry> {
        self.registry.get(name)
    }

    pub(crate) fn prompt(&self) -> String {
        "subscriptions> ".to_string()
    }

    pub(crate) fn money(&self, amount: f64) -> String {
        format_money(&self.config.currency_symbol, amount)
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(handler) = self.registry.handler(command) {
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    #[cfg(test)]
    pub(crate) fn process_line(&mut self, line: &str) -> Result<LoopControl, CommandError> {
        let tokens = match crate::cli::shell::parse_command_line(line) {
            Ok(tokens) => tokens,
            Err(err) => {
                output::warning(&err);
                return Ok(LoopControl::Continue);
            }
        };
        if tokens.is_empty() {
            return Ok(LoopControl::Continue);
        }
        let command = tokens[0].to_lowercase();
        let args: Vec<&str> = tokens.iter().skip(1).map(String::as_str).collect();
        self.dispatch(&command, &tokens[0], &args)
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        output::warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));
        if let Some(best) = closest_command(self.registry.names(), &input.to_lowercase()) {
            output::info(format!("Suggestion: `{}`?", best));
        }
    }

    pub(crate) fn can_prompt(&self) -> bool {
        self.mode == CliMode::Interactive
    }

    /// Asks before destructive work in interactive sessions; scripts proceed.
    pub(crate) fn confirm(&self, prompt: &str) -> Result<bool, CommandError> {
        if !self.can_prompt() {
            return Ok(true);
        }
        cli_io::confirm_action(&self.theme, prompt, false)
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        Ok(cli_io::confirm_action(&self.theme, "Exit shell?", true)?)
    }

    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => Ok(()),
            CommandError::InvalidArguments(message) => {
                output::error(&message);
                output::hint("Use `help <command>` for usage details.");
                Ok(())
            }
            CommandError::Io(err) if self.mode == CliMode::Script => Err(CliError::Io(err)),
            other => {
                output::error(&other);
                Ok(())
            }
        }
    }

    pub(crate) fn persist_config(&self) -> CommandResult {
        self.config_manager.save(&self.config)?;
        Ok(())
    }

    /// Resolves a full id or a unique id prefix against the stored subscriptions.
    pub(crate) fn resolve_id(&self, reference: &str) -> Result<String, CommandError> {
        let snapshot = self.store.load()?;
        if snapshot.subscription(reference).is_some() {
            return Ok(reference.to_string());
        }
        let mut matches = snapshot
            .subscriptions
            .iter()
            .filter(|sub| sub.id.starts_with(reference))
            .map(|sub| sub.id.clone());
        match (matches.next(), matches.next()) {
            (Some(id), None) if !reference.is_empty() => Ok(id),
            (Some(_), Some(_)) => Err(CommandError::InvalidArguments(format!(
                "id prefix `{reference}` is ambiguous"
            ))),
            _ => Err(SubscriptionError::NotFound(reference.to_string()).into()),
        }
    }
}

pub(crate) fn closest_command<'a>(
    names: impl Iterator<Item = &'a str>,
    input: &str,
) -> Option<&'a str> {
    names
        .map(|name| (levenshtein(name, input), name))
        .min_by_key(|(distance, name)| (*distance, *name))
        .filter(|(distance, _)| *distance <= 3)
        .map(|(_, name)| name)
}

fn clock_from_env() -> Box<dyn Clock> {
    let Some(raw) = env::var(NOW_ENV).ok().filter(|raw| !raw.trim().is_empty()) else {
        return Box::new(SystemClock);
    };
    match DateTime::parse_from_rfc3339(raw.trim()) {
        Ok(instant) => Box::new(FixedClock(instant.with_timezone(&Utc))),
        Err(_) => match parse_stored_date(&raw) {
            Some(date) => Box::new(FixedClock(start_of_day(date))),
            None => {
                output::warning(format!("Ignoring unparsable {NOW_ENV} value `{raw}`."));
                Box::new(SystemClock)
            }
        },
    }
}

pub(crate) fn parse_date(input: &str) -> Result<NaiveDate, CommandError> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|_| {
        CommandError::InvalidArguments(format!("invalid date `{}` (use YYYY-MM-DD)", input))
    })
}

pub(crate) fn parse_amount(input: &str) -> Result<f64, CommandError> {
    input
        .trim()
        .trim_start_matches('$')
        .parse::<f64>()
        .map_err(|_| CommandError::InvalidArguments(format!("invalid amount `{}`", input)))
}

pub(crate) fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error(transparent)]
    Core(#[from] SubscriptionError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

impl From<CommandError> for CliError {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::Core(inner) => CliError::Core(inner),
            CommandError::Io(inner) => CliError::Io(inner),
            CommandError::Dialoguer(inner) => CliError::Prompt(inner),
            other => CliError::Command(other.to_string()),
        }
    }
}

#[cfg(test)]
pub(crate) fn process_script(base: PathBuf, lines: &[&str]) -> Result<ShellContext, CliError> {
    let mut context = ShellContext::with_base_dir(CliMode::Script, base)?;
    for line in lines {
        match context.process_line(line)? {
            LoopControl::Continue => {}
            LoopControl::Exit => break,
        }
    }
    Ok(context)
}
