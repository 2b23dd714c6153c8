//! Terminal output: status lines, plan rendering, confirmation

use anyhow::{Result, bail};
use colored::{ColoredString, Colorize};
use declarative::{ConfirmCallback, DiffSummary, ResourceDiff, ResourceState, group_by_type};

fn status(symbol: ColoredString, msg: &str) {
    println!("{symbol} {msg}");
}

pub fn info(msg: &str) {
    status("ℹ".blue(), msg);
}

pub fn success(msg: &str) {
    status("✓".green(), msg);
}

pub fn warn(msg: &str) {
    status("⚠".yellow(), msg);
}

/// Errors go to stderr
pub fn error(msg: &str) {
    eprintln!("{} {msg}", "✗".red());
}

/// Bold title with an underline
pub fn header(title: &str) {
    println!("\n{}\n{}", title.bold(), "─".repeat(title.chars().count()).dimmed());
}

/// Cyan sub-heading, one per resource type in plan output
pub fn section(title: &str) {
    println!("\n{}", title.cyan().bold());
}

/// Indented `key: value` line
pub fn kv(key: &str, value: &str) {
    println!("  {}: {value}", key.dimmed());
}

/// Print planned changes grouped by type
pub fn show_plan(diffs: &[ResourceDiff]) {
    if diffs.is_empty() {
        println!();
        success("No changes. The appliance matches the configuration.");
        return;
    }

    for (resource_type, type_diffs) in group_by_type(diffs) {
        section(&resource_type);
        for diff in type_diffs {
            let (symbol, detail) = match (&diff.current, &diff.desired) {
                (ResourceState::Absent, _) => ("+".green(), "(create)".to_string()),
                (_, ResourceState::Absent) => ("-".red(), "(delete)".to_string()),
                (ResourceState::Modified { from, to }, _) => {
                    ("~".yellow(), format!("{from} → {to}"))
                }
                _ => ("?".dimmed(), String::new()),
            };
            println!("  {} {:<40} {}", symbol, diff.resource_id, detail.dimmed());
        }
    }

    let summary = DiffSummary::from_diffs(diffs);
    println!();
    println!(
        "Plan: {} to create, {} to change, {} to delete.",
        summary.additions.to_string().green(),
        summary.modifications.to_string().yellow(),
        summary.removals.to_string().red()
    );
}

/// Print a colored line diff between two texts
pub fn show_text_diff(before: &str, after: &str) {
    let diff = similar::TextDiff::from_lines(before, after);
    for change in diff.iter_all_changes() {
        match change.tag() {
            similar::ChangeTag::Delete => print!("    {}", format!("- {change}").red()),
            similar::ChangeTag::Insert => print!("    {}", format!("+ {change}").green()),
            similar::ChangeTag::Equal => {}
        }
    }
}

/// Confirmation through an interactive prompt
pub struct PromptConfirm {
    /// Answer yes without asking
    pub yes: bool,
}

impl ConfirmCallback for PromptConfirm {
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        if self.yes {
            return Ok(true);
        }
        if !console::user_attended() {
            bail!("Refusing to prompt without a terminal; pass --yes to apply");
        }

        let confirmed = dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()?;
        Ok(confirmed)
    }
}
