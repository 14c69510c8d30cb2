use std::path::Path;

use crate::cli::core::{parse_amount, parse_date, short_id, CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::cli::table::{Table, TableColumn};
use crate::domain::{BillingCycle, Category, FilterCriteria, SortField, SortOrder, Subscription};
use crate::images::{default_image_for, is_default_image};

use super::required;

const ADD_USAGE: &str = "add <name> <cost> <monthly|yearly> <start YYYY-MM-DD> [category] [notes]";
const EDIT_USAGE: &str = "edit <id> <name|cost|cycle|start|next|category|notes|image> <value>";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new("add", "Track a new subscription", ADD_USAGE, cmd_add),
        CommandEntry::new("edit", "Change one field of a subscription", EDIT_USAGE, cmd_edit),
        CommandEntry::new("pause", "Pause billing for a subscription", "pause <id>", cmd_pause),
        CommandEntry::new("resume", "Resume a paused subscription", "resume <id>", cmd_resume),
        CommandEntry::new("delete", "Delete a subscription (history is kept)", "delete <id>", cmd_delete),
        CommandEntry::new("show", "Show one subscription in detail", "show <id>", cmd_show),
        CommandEntry::new(
            "list",
            "List subscriptions with optional filters",
            "list [--all] [--search <text>] [--category <c>] [--cycle <c>] [--min <n>] [--max <n>] [--sort name|cost|next_payment] [--desc]",
            cmd_list,
        ),
    ]
}

fn cmd_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let name = required(args, 0, ADD_USAGE)?;
    let cost = parse_amount(required(args, 1, ADD_USAGE)?)?;
    let cycle: BillingCycle = required(args, 2, ADD_USAGE)?.parse()?;
    let start = parse_date(required(args, 3, ADD_USAGE)?)?;
    let category = match args.get(4) {
        Some(raw) => parse_category(raw)?,
        None => Category::Other,
    };
    let notes = args.get(5..).map(|rest| rest.join(" ")).unwrap_or_default();

    let mut draft = Subscription::new(name, cost, cycle, start)
        .with_category(category)
        .with_notes(notes);
    draft.image = default_image_for(category);

    let created = context.subscriptions.create(draft)?;
    let plan = context
        .payments
        .generate_for_subscription(&created, context.now())?;
    output::success(format!(
        "Added `{}` ({}).",
        created.name,
        short_id(&created.id)
    ));
    if let Some(plan) = plan.filter(|plan| !plan.is_empty()) {
        output::info(format!(
            "Recorded {} past payment(s); next due {}.",
            plan.payments.len(),
            plan.next_payment
        ));
    }
    Ok(())
}

fn cmd_edit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let id = context.resolve_id(required(args, 0, EDIT_USAGE)?)?;
    let field = required(args, 1, EDIT_USAGE)?.to_lowercase();
    let value = args.get(2..).map(|rest| rest.join(" ")).unwrap_or_default();
    if value.is_empty() && field != "notes" {
        return Err(CommandError::InvalidArguments(format!("usage: {EDIT_USAGE}")));
    }

    let mut sub = context.subscriptions.get(&id)?;
    match field.as_str() {
        "name" => sub.name = value,
        "cost" => sub.cost = parse_amount(&value)?,
        "cycle" => sub.billing_cycle = value.parse()?,
        "start" => sub.start_date = parse_date(&value)?,
        "next" | "next_payment" => sub.next_payment = parse_date(&value)?,
        "category" => {
            let category = parse_category(&value)?;
            if sub.image.is_empty() || sub.image == default_image_for(sub.category) {
                sub.image = default_image_for(category);
            }
            sub.category = category;
        }
        "notes" => sub.notes = value,
        "image" => sub.image = import_image(context, &sub, &value)?,
        other => {
            return Err(CommandError::InvalidArguments(format!(
                "unknown field `{other}`; usage: {EDIT_USAGE}"
            )))
        }
    }

    let updated = context.subscriptions.update(sub)?;
    output::success(format!("Updated {} of `{}`.", field, updated.name));
    Ok(())
}

/// Copies the file at `value` into the image library as `<id>.<ext>`; `-`
/// falls back to the category icon.
fn import_image(context: &ShellContext, sub: &Subscription, value: &str) -> Result<String, CommandError> {
    if value == "-" {
        return Ok(default_image_for(sub.category));
    }
    let source = Path::new(value);
    if !source.is_file() {
        return Err(CommandError::InvalidArguments(format!(
            "image file `{value}` does not exist"
        )));
    }
    let filename = match source.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => format!("{}.{}", sub.id, ext.to_lowercase()),
        None => sub.id.clone(),
    };
    context.images.save_from(source, &filename)?;
    Ok(filename)
}

fn cmd_pause(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    set_paused(context, args, true)
}

fn cmd_resume(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    set_paused(context, args, false)
}

fn set_paused(context: &mut ShellContext, args: &[&str], paused: bool) -> CommandResult {
    let usage = if paused { "pause <id>" } else { "resume <id>" };
    let id = context.resolve_id(required(args, 0, usage)?)?;
    let sub = context.subscriptions.set_paused(&id, paused)?;
    if paused {
        output::success(format!("Paused `{}`.", sub.name));
    } else {
        let next_payment = context
            .payments
            .generate_for_subscription(&sub, context.now())?
            .map(|plan| plan.next_payment)
            .unwrap_or(sub.next_payment);
        output::success(format!("Resumed `{}`; next due {}.", sub.name, next_payment));
    }
    Ok(())
}

fn cmd_delete(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let id = context.resolve_id(required(args, 0, "delete <id>")?)?;
    let sub = context.subscriptions.get(&id)?;
    if !context.confirm(&format!("Delete `{}`?", sub.name))? {
        output::info("Operation cancelled.");
        return Ok(());
    }
    context.subscriptions.delete(&id)?;
    output::success(format!("Deleted `{}`.", sub.name));
    Ok(())
}

fn cmd_show(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let id = context.resolve_id(required(args, 0, "show <id>")?)?;
    let sub = context.subscriptions.get(&id)?;
    let payments = context.payments.payments_for_subscription(&id)?;
    let total: f64 = payments.iter().map(|payment| payment.amount).sum();

    output::section(&sub.name);
    output::info(format!("  Id           : {}", sub.id));
    output::info(format!(
        "  Cost         : {} {}",
        context.money(sub.cost),
        sub.billing_cycle.label()
    ));
    output::info(format!("  Category     : {}", sub.category));
    output::info(format!("  Started      : {}", sub.start_date));
    output::info(format!("  Next payment : {}", sub.next_payment));
    output::info(format!("  Status       : {}", status_label(&sub)));
    if !sub.notes.is_empty() {
        output::info(format!("  Notes        : {}", sub.notes));
    }
    if sub.has_image() {
        let note = if is_default_image(&sub.image) {
            " (category icon)"
        } else if context.images.contains(&sub.image) {
            ""
        } else {
            " (missing)"
        };
        output::info(format!("  Image        : {}{}", sub.image, note));
    }
    output::info(format!(
        "  Payments     : {} totalling {}",
        payments.len(),
        context.money(total)
    ));
    Ok(())
}

fn cmd_list(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (filter, field, order) = parse_list_options(context, args)?;
    let subs = context.subscriptions.list(&filter, field, order)?;
    if subs.is_empty() {
        output::info("No subscriptions match.");
        return Ok(());
    }

    let mut table = Table::new(vec![
        TableColumn::left("Id"),
        TableColumn::left("Name").max_width(28),
        TableColumn::right("Cost"),
        TableColumn::left("Cycle"),
        TableColumn::left("Next payment"),
        TableColumn::left("Category"),
        TableColumn::left("Status"),
    ]);
    for sub in &subs {
        table.push_row(vec![
            short_id(&sub.id).to_string(),
            sub.name.clone(),
            context.money(sub.cost),
            sub.billing_cycle.to_string(),
            sub.next_payment.to_string(),
            sub.category.to_string(),
            status_label(sub).to_string(),
        ]);
    }
    output::info(table.render());
    output::info(format!("{} subscription(s).", subs.len()));
    Ok(())
}

fn parse_list_options(
    context: &ShellContext,
    args: &[&str],
) -> Result<(FilterCriteria, SortField, SortOrder), CommandError> {
    let mut filter = FilterCriteria {
        show_paused: context.config.show_paused,
        ..FilterCriteria::default()
    };
    let mut field = context.config.default_sort;
    let mut order = context.config.default_order;

    let mut iter = args.iter();
    while let Some(flag) = iter.next() {
        let mut value = |name: &str| {
            iter.next()
                .copied()
                .ok_or_else(|| CommandError::InvalidArguments(format!("`{name}` needs a value")))
        };
        match *flag {
            "--all" => filter.show_paused = true,
            "--desc" => order = SortOrder::Desc,
            "--asc" => order = SortOrder::Asc,
            "--search" => filter.search = Some(value("--search")?.to_string()),
            "--category" => filter.category = Some(parse_category(value("--category")?)?),
            "--cycle" => filter.billing_cycle = Some(value("--cycle")?.parse()?),
            "--min" => filter.min_cost = Some(parse_amount(value("--min")?)?),
            "--max" => filter.max_cost = Some(parse_amount(value("--max")?)?),
            "--sort" => field = value("--sort")?.parse()?,
            other => {
                return Err(CommandError::InvalidArguments(format!(
                    "unknown list option `{other}`"
                )))
            }
        }
    }
    Ok((filter, field, order))
}

fn parse_category(raw: &str) -> Result<Category, CommandError> {
    Category::parse_strict(raw).ok_or_else(|| {
        let known: Vec<&str> = Category::ALL.iter().map(|category| category.as_str()).collect();
        CommandError::InvalidArguments(format!(
            "unknown category `{raw}` (expected one of {})",
            known.join(", ")
        ))
    })
}

fn status_label(sub: &Subscription) -> &'static str {
    if sub.deleted {
        "deleted"
    } else if sub.paused {
        "paused"
    } else {
        "active"
    }
}
