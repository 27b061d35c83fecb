//! Shared CLI output helpers.
//!
//! Status lines go to stderr so stdout carries only secret data and
//! listings. Color scheme (respects NO_COLOR):
//! - Green: success
//! - Red: errors
//! - Yellow: warnings
//! - Cyan: paths, keys, hints
//! - Bold: headers
//! - Dimmed: secondary info

use console::{style, StyledObject};
use std::fmt::Display;
use std::io::{self, Write};

const RULE_WIDTH: usize = 56;

fn colors_enabled() -> bool {
    std::env::var_os("NO_COLOR").is_none()
}

fn paint<D>(styled: StyledObject<D>) -> StyledObject<D> {
    styled.force_styling(colors_enabled())
}

/// Print a success message with checkmark.
///
/// Example: `✓ inserted web/github`
pub fn success(msg: &str) {
    eprintln!("{} {}", paint(style("✓").green()), msg);
}

/// Print an error message.
pub fn error(msg: &str) {
    eprintln!("{} {}", paint(style("✗").red()), msg);
}

/// Print a warning message.
pub fn warn(msg: &str) {
    eprintln!("{} {}", paint(style("⚠").yellow()), msg);
}

/// Print a hint message.
///
/// Example: `→ run: bunker init`
pub fn hint(msg: &str) {
    eprintln!("{} {}", paint(style("→").cyan()), paint(style(msg).cyan()));
}

/// Print a bold section header.
pub fn header(title: &str) {
    println!("{}", paint(style(title).bold()));
}

/// Print a key-value pair (label dimmed, value bold).
pub fn kv(label: &str, value: impl Display) {
    println!(
        "  {}  {}",
        paint(style(label).dim()),
        paint(style(value.to_string()).bold())
    );
}

/// Print a list item with bullet.
pub fn list_item(item: &str) {
    println!("  • {}", item);
}

/// Print a dimmed/secondary message.
pub fn dimmed(msg: &str) {
    println!("{}", paint(style(msg).dim()));
}

/// Print a horizontal rule separator.
pub fn rule() {
    println!("{}", paint(style("─".repeat(RULE_WIDTH)).dim()));
}

/// Print a section header with a separator line.
pub fn section(title: &str) {
    header(title);
    rule();
}

/// Format a path in cyan for inline use.
pub fn path(p: &str) -> String {
    paint(style(p).cyan()).to_string()
}

/// Format a key name in cyan for inline use.
pub fn key(k: &str) -> String {
    paint(style(k).cyan()).to_string()
}

/// Write secret bytes to stdout exactly as given.
///
/// A newline is appended only when stdout is a terminal and the data does
/// not already end with one, so pipes see the stored bytes unchanged.
pub fn data(bytes: &[u8]) -> io::Result<()> {
    use std::io::IsTerminal;

    let mut out = io::stdout().lock();
    out.write_all(bytes)?;
    if io::stdout().is_terminal() && !bytes.ends_with(b"\n") {
        out.write_all(b"\n")?;
    }
    out.flush()
}
