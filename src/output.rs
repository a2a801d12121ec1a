//! User-facing output for the binary.
//!
//! Status lines get a colored prefix when stdout is a TTY. Listing lines are plain so they
//! can be piped.

use owo_colors::OwoColorize;

use crate::facade::CopyOutcome;

fn is_tty() -> bool {
    atty::is(atty::Stream::Stdout)
}

pub fn print_info(msg: &str) {
    if is_tty() {
        println!("{} {}", "info:".cyan().bold(), msg);
    } else {
        println!("info: {msg}");
    }
}

pub fn print_warn(msg: &str) {
    if is_tty() {
        eprintln!("{} {}", "warn:".yellow().bold(), msg);
    } else {
        eprintln!("warn: {msg}");
    }
}

pub fn print_error(msg: &str) {
    if is_tty() {
        eprintln!("{} {}", "error:".red().bold(), msg);
    } else {
        eprintln!("error: {msg}");
    }
}

pub fn print_success(msg: &str) {
    if is_tty() {
        println!("{} {}", "ok:".green().bold(), msg);
    } else {
        println!("ok: {msg}");
    }
}

/// Print a plain line (no prefix). Used for listings and other scriptable output.
pub fn print_user(msg: &str) {
    println!("{msg}");
}

/// One listing line: `d` or `f`, the size for files, then the address.
pub fn entry_line(is_dir: bool, length: u64, address: &str) -> String {
    if is_dir {
        format!("d {:>12} {address}", "-")
    } else {
        format!("f {length:>12} {address}")
    }
}

/// Human summary of a directory copy.
pub fn describe_copy(outcome: &CopyOutcome) -> String {
    match outcome {
        CopyOutcome::Copied { entries } => format!("copied {entries} entries"),
        CopyOutcome::NothingToCopy => "source is empty; nothing to copy".to_string(),
        CopyOutcome::Cancelled { entries } => format!("cancelled after {entries} entries"),
        CopyOutcome::Failed(reason) => format!("copy failed: {reason}"),
    }
}
