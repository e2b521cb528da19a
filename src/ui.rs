use colored::*;
use terminal_size::{Width, Height, terminal_size};

use crate::sync::{Account, Balance};
use crate::widget::WidgetContent;

pub fn print_header(title: &str) {
    let (width, _) = terminal_size().unwrap_or((Width(80), Height(24)));
    let width = width.0 as usize;

    let line = "─".repeat(width);
    println!("{}", line.black().bold());

    let name = "monzo-widget".bright_red().bold();
    let version = format!("v{}", env!("CARGO_PKG_VERSION")).black().bold();
    println!("  {} {}", name, version);
    println!("  {}", title.cyan());

    println!("{}", line.black().bold());
}

pub fn print_step(msg: &str) {
    println!("  {} {}", "•".green(), msg);
}

pub fn print_success(msg: &str) {
    println!("  {} {}", "✓".green().bold(), msg.green());
}

pub fn print_warning(msg: &str) {
    println!("  {} {}", "⚠️ ".yellow().bold(), msg.yellow());
}

pub fn print_error(msg: &str) {
    println!("  {} {}", "❌".red().bold(), msg.red());
}

pub fn print_thinking(msg: &str) {
    println!("  {} {}...", "∴".magenta(), msg);
}

/// Render accounts and their pots as an indented list
pub fn print_accounts(accounts: &[Account]) {
    if accounts.is_empty() {
        print_step("No accounts cached yet. Run 'monzo-widget sync'.");
        return;
    }

    for account in accounts {
        let balance = account
            .balance
            .as_ref()
            .map(Balance::formatted)
            .unwrap_or_else(|| "—".to_string());
        println!(
            "  {} {}  {}",
            account.emoji,
            account.title().bold(),
            balance.green().bold()
        );
        for pot in &account.pots {
            println!(
                "      {} {}  {}",
                "↳".black().bold(),
                pot.name,
                pot.balance.formatted().green()
            );
        }
    }
}

/// Render a balance widget as a small box
pub fn print_widget(widget: &WidgetContent) {
    let figure = format!("{}{}", widget.currency_symbol, widget.amount);
    let caption = widget.caption();
    let inner = figure.chars().count().max(caption.chars().count()) + 4;

    println!("  ╭{}╮", "─".repeat(inner));
    let figure = format!("{:^width$}", figure, width = inner);
    println!("  │{}│", figure.bold());
    println!("  │{:^width$}│", caption, width = inner);
    println!("  ╰{}╯", "─".repeat(inner));
}
