use crate::cli::core::{short_id, CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::cli::table::{Table, TableColumn};

use super::required;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "payments",
            "List the payment history of a subscription",
            "payments <id>",
            cmd_payments,
        ),
        CommandEntry::new(
            "summary",
            "Show monthly, yearly, and year-to-date costs",
            "summary",
            cmd_summary,
        ),
        CommandEntry::new(
            "upcoming",
            "List payments due soon",
            "upcoming [days]",
            cmd_upcoming,
        ),
        CommandEntry::new(
            "generate",
            "Record payments that came due since the last run",
            "generate",
            cmd_generate,
        ),
    ]
}

fn cmd_payments(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let id = context.resolve_id(required(args, 0, "payments <id>")?)?;
    let sub = context.subscriptions.get(&id)?;
    let payments = context.payments.payments_for_subscription(&id)?;
    output::section(format!("Payments for {}", sub.name));
    if payments.is_empty() {
        output::info("No payments recorded yet.");
        return Ok(());
    }

    let mut table = Table::new(vec![
        TableColumn::left("Date"),
        TableColumn::right("Amount"),
        TableColumn::left("Source"),
        TableColumn::left("Notes").max_width(32),
    ]);
    for payment in &payments {
        let (source, notes) = if payment.is_auto_generated() {
            ("auto", String::new())
        } else {
            ("manual", payment.notes.clone())
        };
        table.push_row(vec![
            payment.payment_date.to_string(),
            context.money(payment.amount),
            source.to_string(),
            notes,
        ]);
    }
    output::info(table.render());
    let total: f64 = payments.iter().map(|payment| payment.amount).sum();
    output::info(format!(
        "{} payment(s), {} in total.",
        payments.len(),
        context.money(total)
    ));
    Ok(())
}

fn cmd_summary(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let summary = context.subscriptions.summary(context.now())?;
    output::section("Summary");
    output::info(format!("  Monthly total : {}", context.money(summary.total_monthly)));
    output::info(format!("  Yearly total  : {}", context.money(summary.total_yearly)));
    output::info(format!("  Year to date  : {}", context.money(summary.year_to_date)));
    output::info(format!(
        "  Active        : {} ({} paused)",
        summary.count, summary.paused_count
    ));

    if summary.by_category.is_empty() {
        return Ok(());
    }
    let mut table = Table::new(vec![
        TableColumn::left("Category"),
        TableColumn::right("Monthly"),
        TableColumn::right("Share"),
    ]);
    for (category, monthly) in &summary.by_category {
        let share = if summary.total_monthly > 0.0 {
            monthly / summary.total_monthly * 100.0
        } else {
            0.0
        };
        table.push_row(vec![
            category.to_string(),
            context.money(*monthly),
            format!("{share:.0}%"),
        ]);
    }
    output::info(table.render());
    Ok(())
}

fn cmd_upcoming(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let days = match args.first() {
        Some(raw) => raw.parse::<u32>().map_err(|_| {
            CommandError::InvalidArguments(format!("invalid day count `{raw}`"))
        })?,
        None => context.config.upcoming_days,
    };
    let due = context.subscriptions.upcoming(context.now(), days)?;
    output::section(format!("Due in the next {days} day(s)"));
    if due.is_empty() {
        output::info("Nothing due.");
        return Ok(());
    }

    let mut table = Table::new(vec![
        TableColumn::left("Id"),
        TableColumn::left("Date"),
        TableColumn::left("Name").max_width(28),
        TableColumn::right("Amount"),
    ]);
    for sub in &due {
        table.push_row(vec![
            short_id(&sub.id).to_string(),
            sub.next_payment.to_string(),
            sub.name.clone(),
            context.money(sub.cost),
        ]);
    }
    output::info(table.render());
    let total: f64 = due.iter().map(|sub| sub.cost).sum();
    output::info(format!("{} due, {} in total.", due.len(), context.money(total)));
    Ok(())
}

fn cmd_generate(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let summary = context.payments.generate_all(context.now())?;
    output::success(format!(
        "Recorded {} payment(s) across {} active subscription(s).",
        summary.payments_created, summary.processed
    ));
    Ok(())
}
