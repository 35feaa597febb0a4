//! Interactive prompts on stdin. Generic over reader and writer so the
//! review loop can be driven from tests.

use std::io::{BufRead, Write};

use anyhow::Result;
use stockscan_inventory::ConfirmationWorkflow;

use crate::terminal_output::render_draft;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Review {
    Save,
    Cancel,
}

/// Ask a yes/no question. Anything but `y`/`yes` (including end of input)
/// is a no.
pub fn confirm<R: BufRead, W: Write>(question: &str, input: &mut R, out: &mut W) -> Result<bool> {
    write!(out, "{question} [y/N] ")?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        writeln!(out)?;
        return Ok(false);
    }
    Ok(matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

/// Show the pending draft and let the user edit fields until they save or
/// cancel. End of input cancels.
pub fn review_pending<R: BufRead, W: Write>(
    workflow: &mut ConfirmationWorkflow,
    input: &mut R,
    out: &mut W,
    color: bool,
) -> Result<Review> {
    loop {
        if let Some(draft) = workflow.draft() {
            writeln!(out)?;
            write!(out, "{}", render_draft(draft, color))?;
        }
        write!(out, "field=value to edit, [s]ave, [c]ancel > ")?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(out)?;
            return Ok(Review::Cancel);
        }
        let line = line.trim();
        match line.to_ascii_lowercase().as_str() {
            "s" | "save" => return Ok(Review::Save),
            "c" | "cancel" | "q" => return Ok(Review::Cancel),
            "" => continue,
            _ => {}
        }
        match line.split_once('=') {
            Some((field, value)) => {
                if let Err(e) = workflow.set_named(field, value) {
                    writeln!(out, "{e}")?;
                }
            }
            None => writeln!(out, "Expected field=value, 's' or 'c'")?,
        }
    }
}

/// Split `field=value` command line overrides.
pub fn parse_assignment(raw: &str) -> Result<(String, String)> {
    match raw.split_once('=') {
        Some((field, value)) if !field.trim().is_empty() => {
            Ok((field.trim().to_string(), value.to_string()))
        }
        _ => anyhow::bail!("expected field=value, got {raw:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use stockscan_core::ItemDraft;

    #[test]
    fn review_applies_edits_then_saves() {
        let mut workflow = ConfirmationWorkflow::new();
        workflow.begin_new(ItemDraft::default()).unwrap();
        let mut input = Cursor::new("brand=ACME\nweight=3\nnonsense\nqty=4\ns\n");
        let mut out = Vec::new();

        let choice = review_pending(&mut workflow, &mut input, &mut out, false).unwrap();
        assert_eq!(choice, Review::Save);
        let draft = workflow.draft().unwrap();
        assert_eq!(draft.brand.as_deref(), Some("ACME"));
        assert_eq!(draft.quantity, Some(4));

        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("unknown field: weight"));
        assert!(printed.contains("Expected field=value"));
    }

    #[test]
    fn end_of_input_cancels() {
        let mut workflow = ConfirmationWorkflow::new();
        workflow.begin_new(ItemDraft::default()).unwrap();
        let choice =
            review_pending(&mut workflow, &mut Cursor::new(""), &mut Vec::new(), false).unwrap();
        assert_eq!(choice, Review::Cancel);
    }

    #[test]
    fn confirm_defaults_to_no() {
        let mut out = Vec::new();
        assert!(confirm("Delete?", &mut Cursor::new("yes\n"), &mut out).unwrap());
        assert!(!confirm("Delete?", &mut Cursor::new("\n"), &mut out).unwrap());
        assert!(!confirm("Delete?", &mut Cursor::new(""), &mut out).unwrap());
    }

    #[test]
    fn assignments() {
        assert_eq!(
            parse_assignment("price=12,50 EUR").unwrap(),
            ("price".to_string(), "12,50 EUR".to_string())
        );
        assert!(parse_assignment("=x").is_err());
        assert!(parse_assignment("brand").is_err());
    }
}
