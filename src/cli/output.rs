//! Rendering of command results

use crate::cli::style::{Stylize, arrow, cross};
use anstream::{eprintln, println};
use pr_command::error::{Error, Result};
use serde::Serialize;
use serde_json::json;

/// Print `value` as pretty JSON, or hand it to `render` for styled output
pub fn emit<T: Serialize>(json: bool, value: &T, render: impl FnOnce(&T)) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        render(value);
    }
    Ok(())
}

/// Numbered next steps
pub fn print_next_actions(actions: &[String]) {
    if actions.is_empty() {
        return;
    }
    println!();
    println!("{}", "Next steps".emphasis());
    for action in actions {
        println!("  {} {action}", arrow());
    }
}

/// Print a failed command's error to stderr, or as JSON on stdout
pub fn report_error(json: bool, err: &Error) {
    if json {
        let value = json!({
            "error": {
                "kind": err.kind(),
                "message": err.to_string(),
            }
        });
        println!("{value}");
        return;
    }

    eprintln!("{} {}", cross(), err.to_string().error());
    if err.is_precondition() {
        eprintln!("  {}", "Nothing was changed.".muted().for_stderr());
    }
}
