//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use chrono::{DateTime, Local, Utc};
use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::collection::Secret;

/// Timestamp layout for listings, e.g. `Jun 23 2019 20:00:01`.
const LIST_TIME_FORMAT: &str = "%b %e %Y %H:%M:%S";

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print a success message unless stdout carries a piped collection.
pub fn result(stdio: bool, msg: &str) {
    if !stdio {
        success(msg);
    }
}

/// Format a timestamp in local time for listings.
pub fn list_time(t: DateTime<Utc>) -> String {
    t.with_timezone(&Local).format(LIST_TIME_FORMAT).to_string()
}

/// Print a table of secrets (Name, Date Added, Date Modified), with the
/// secret values too when `show_values` is set.
///
/// `secrets` is printed in the order given.
pub fn print_secrets_table(secrets: &[Secret], show_values: bool) {
    if secrets.is_empty() {
        info("No secrets in the collection yet.");
        tip("Run `totp config add <NAME> <SECRET>` to add your first secret.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    let mut header = vec!["Name"];
    if show_values {
        header.push("Secret");
    }
    header.extend(["Date Added", "Date Modified"]);
    table.set_header(header);

    for s in secrets {
        let mut row = vec![s.name.clone()];
        if show_values {
            row.push(s.value.clone());
        }
        row.push(list_time(s.date_added));
        row.push(list_time(s.date_modified));
        table.add_row(row);
    }

    println!("{table}");
}
