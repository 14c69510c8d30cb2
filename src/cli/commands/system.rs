use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::help;
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::domain::FORMAT_VERSION;
use crate::utils::build_info;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "help",
            "Show available commands",
            "help [command]",
            cmd_help,
        ),
        CommandEntry::new("version", "Show build metadata", "version", cmd_version),
        CommandEntry::new(
            "config",
            "Show or change preferences",
            "config [show|set <key> <value>]",
            cmd_config,
        ),
        CommandEntry::new("exit", "Exit the shell", "exit", cmd_exit),
    ]
}

fn cmd_help(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if let Some(name) = args.first() {
        match context.command(&name.to_lowercase()) {
            Some(entry) => help::print_command(entry),
            None => context.suggest_command(name),
        }
        return Ok(());
    }
    help::print_overview(&context.registry);
    Ok(())
}

fn cmd_version(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let meta = build_info::current();
    output::section(format!("Subscription Core {}", meta.version));
    output::info(format!("  Data format  : v{}", FORMAT_VERSION));
    output::info(format!(
        "  Build hash   : {} ({})",
        meta.git_hash, meta.git_status
    ));
    output::info(format!("  Built at     : {}", meta.timestamp));
    output::info(format!("  Target       : {}", meta.target));
    output::info(format!("  Profile      : {}", meta.profile));
    output::info(format!("  Rustc        : {}", meta.rustc));
    if let Some(path) = context.store.location() {
        output::info(format!("  Data file    : {}", path.display()));
    }
    Ok(())
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args.first().map(|arg| arg.to_lowercase()).as_deref() {
        None | Some("show") => {
            let config = &context.config;
            output::section("Configuration");
            output::info(format!("  default_sort    : {}", config.default_sort));
            output::info(format!("  default_order   : {}", config.default_order));
            output::info(format!("  show_paused     : {}", config.show_paused));
            output::info(format!("  currency_symbol : {}", config.currency_symbol));
            output::info(format!("  upcoming_days   : {}", config.upcoming_days));
            output::info(format!(
                "  data_file       : {}",
                context.config_manager.data_file(config).display()
            ));
            output::info(format!(
                "  images_dir      : {}",
                context.images.dir().display()
            ));
            Ok(())
        }
        Some("set") => {
            if args.len() < 3 {
                return Err(CommandError::InvalidArguments(
                    "usage: config set <key> <value>".into(),
                ));
            }
            let key = args[1].to_lowercase();
            let value = args[2..].join(" ");
            context.config.set(&key, value.trim())?;
            context.persist_config()?;
            output::success(format!("Set {key}."));
            if matches!(key.as_str(), "data_file" | "images_dir") {
                output::hint("Restart the shell to use the new location.");
            }
            Ok(())
        }
        Some(other) => Err(CommandError::InvalidArguments(format!(
            "unknown config action `{other}` (use show or set)"
        ))),
    }
}

fn cmd_exit(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    Err(CommandError::ExitRequested)
}
