//! Terminal rendering of registry state

use std::fmt::Display;

use cardvault_core::CardError;
use cardvault_types::{Address, Amount, CardHash};
use colored::*;

const LABEL_WIDTH: usize = 24;

/// Heading for a group of lines
pub fn section(title: &str) {
    println!();
    println!("{} {}", "▍".bright_blue(), title.to_uppercase().bold());
}

/// An identity: registry, card, owner, vendor
pub fn address(label: &str, address: &Address) {
    line(label, address.to_string().bright_cyan());
}

pub fn card_hash(label: &str, hash: &CardHash) {
    line(label, hash.to_string().yellow());
}

/// A token balance held in the ledger
pub fn balance(label: &str, amount: Amount) {
    line(label, amount.to_string().bright_green().bold());
}

/// Anything else worth a labelled line (serials, counts)
pub fn field(label: &str, value: impl Display) {
    line(label, value.to_string().normal());
}

/// An operation the registry accepted
pub fn accepted(message: &str) {
    println!("  {} {}", "ok".bright_green().bold(), message);
}

/// An operation the registry refused, and why
pub fn refused(actor: &str, err: &CardError) {
    println!(
        "  {} {}: {}",
        "refused".bright_red().bold(),
        actor,
        err.to_string().red()
    );
}

pub fn note(message: &str) {
    println!("  {}", message.dimmed().italic());
}

fn line(label: &str, value: ColoredString) {
    let label = format!("{:<width$}", format!("{}:", label), width = LABEL_WIDTH);
    println!("  {} {}", label.dimmed(), value);
}
