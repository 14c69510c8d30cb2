pub mod payments;
pub mod subscription;
pub mod system;
pub mod transfer;

use crate::cli::core::CommandError;
use crate::cli::registry::CommandRegistry;

pub(crate) fn register_all(registry: &mut CommandRegistry) {
    let definitions = system::definitions()
        .into_iter()
        .chain(subscription::definitions())
        .chain(payments::definitions())
        .chain(transfer::definitions());
    for entry in definitions {
        registry.register(entry);
    }
    registry.alias("quit", "exit");
}

/// Returns `args[index]` or an error quoting `usage`.
pub(crate) fn required<'a>(args: &[&'a str], index: usize, usage: &str) -> Result<&'a str, CommandError> {
    args.get(index)
        .copied()
        .ok_or_else(|| CommandError::InvalidArguments(format!("usage: {usage}")))
}
