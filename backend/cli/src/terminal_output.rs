//! Terminal output: notes, tables and item forms.
//!
//! Data (tables, CSV, JSON) goes to stdout; notes go to stderr so they never
//! end up in a redirected export.

use stockscan_core::{Item, ItemDraft, ItemField};
use stockscan_inventory::export::format_date;

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";
pub const DIM: &str = "\x1b[2m";

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";

/// Check if the terminal supports color output.
pub fn supports_color() -> bool {
    std::env::var("NO_COLOR").is_err()
        && (std::env::var("COLORTERM").is_ok()
            || std::env::var("TERM")
                .map(|t| t != "dumb")
                .unwrap_or(false))
}

/// Strip ANSI escape codes from a string.
pub fn strip_ansi(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            for next in chars.by_ref() {
                if next == 'm' {
                    break;
                }
            }
        } else {
            result.push(c);
        }
    }
    result
}

fn note(symbol: &str, color: &str, plain: &str, msg: &str) {
    if supports_color() {
        eprintln!("{color}{BOLD}{symbol}{RESET} {msg}");
    } else {
        eprintln!("{plain}: {msg}");
    }
}

pub fn note_info(msg: &str) {
    note("ℹ", CYAN, "INFO", msg);
}

pub fn note_warn(msg: &str) {
    note("⚠", YELLOW, "WARN", msg);
}

pub fn note_error(msg: &str) {
    note("✗", RED, "ERROR", msg);
}

pub fn note_success(msg: &str) {
    note("✓", GREEN, "OK", msg);
}

// ---------------------------------------------------------------------------
// Table rendering
// ---------------------------------------------------------------------------

pub enum Align {
    Left,
    Right,
}

pub struct Column {
    pub header: String,
    pub align: Align,
    pub max_width: Option<usize>,
}

impl Column {
    pub fn left(header: impl Into<String>) -> Self {
        Self { header: header.into(), align: Align::Left, max_width: None }
    }

    pub fn right(header: impl Into<String>) -> Self {
        Self { header: header.into(), align: Align::Right, max_width: None }
    }

    pub fn max(mut self, width: usize) -> Self {
        self.max_width = Some(width);
        self
    }
}

/// Render a table. Cells longer than a column's `max_width` are truncated
/// with `…`.
pub fn render_table(columns: &[Column], rows: &[Vec<String>], color: bool) -> String {
    let num_cols = columns.len();
    let mut widths: Vec<usize> = columns.iter().map(|c| visible_len(&c.header)).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(num_cols) {
            let w = visible_len(cell);
            let w = columns[i].max_width.map_or(w, |max| w.min(max));
            widths[i] = widths[i].max(w);
        }
    }

    let mut out = String::new();

    let header_cells: Vec<String> = columns
        .iter()
        .enumerate()
        .map(|(i, col)| pad_cell(&col.header, widths[i], &col.align))
        .collect();
    if color {
        out.push_str(&format!("{BOLD}  {}  {RESET}\n", header_cells.join("  ")));
    } else {
        out.push_str(&format!("  {}  \n", header_cells.join("  ")));
    }

    let sep: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&format!("  {}  \n", sep.join("  ")));

    for row in rows {
        let cells: Vec<String> = (0..num_cols)
            .map(|i| {
                let cell = row.get(i).map(String::as_str).unwrap_or("");
                pad_cell(&truncate(cell, widths[i]), widths[i], &columns[i].align)
            })
            .collect();
        out.push_str(&format!("  {}  \n", cells.join("  ")));
    }

    out
}

fn visible_len(s: &str) -> usize {
    strip_ansi(s).chars().count()
}

fn truncate(s: &str, width: usize) -> String {
    if visible_len(s) <= width {
        return s.to_string();
    }
    let plain = strip_ansi(s);
    let mut cut: String = plain.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

fn pad_cell(s: &str, width: usize, align: &Align) -> String {
    let pad = width.saturating_sub(visible_len(s));
    match align {
        Align::Left => format!("{s}{}", " ".repeat(pad)),
        Align::Right => format!("{}{s}", " ".repeat(pad)),
    }
}

// ---------------------------------------------------------------------------
// Inventory views
// ---------------------------------------------------------------------------

/// Length of the id prefix shown in listings.
pub const SHORT_ID_LEN: usize = 8;

pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(SHORT_ID_LEN) {
        Some((idx, _)) => &id[..idx],
        None => id,
    }
}

/// The inventory listing, in the order given.
pub fn render_inventory(items: &[Item], color: bool) -> String {
    let columns = vec![
        Column::left("ID"),
        Column::left("Brand"),
        Column::left("Name").max(28),
        Column::left("Barcode"),
        Column::right("Qty"),
        Column::left("Season"),
        Column::left("Model").max(16),
        Column::left("Type").max(16),
        Column::left("Color").max(12),
        Column::left("Size"),
        Column::right("Price"),
        Column::left("Added"),
    ];
    let rows: Vec<Vec<String>> = items
        .iter()
        .map(|item| {
            vec![
                short_id(&item.id).to_string(),
                item.brand.clone(),
                item.name.clone(),
                item.barcode.clone(),
                item.quantity.to_string(),
                item.season.clone(),
                item.model.clone(),
                item.product_type.clone(),
                item.color.clone(),
                item.size.clone(),
                item.price.clone(),
                format_date(item.timestamp),
            ]
        })
        .collect();
    render_table(&columns, &rows, color)
}

fn label(field: ItemField) -> &'static str {
    match field {
        ItemField::Barcode => "Barcode",
        ItemField::Name => "Name",
        ItemField::Brand => "Brand",
        ItemField::Season => "Season",
        ItemField::Model => "Model",
        ItemField::ProductType => "Type",
        ItemField::Color => "Color",
        ItemField::Size => "Size",
        ItemField::Price => "Price",
        ItemField::Quantity => "Quantity",
    }
}

/// One stored item, one field per line.
pub fn render_item(item: &Item) -> String {
    let mut out = format!("{:<10} {}\n", "Id", item.id);
    for field in ItemField::ALL {
        out.push_str(&format!("{:<10} {}\n", label(field), item.field(field)));
    }
    out.push_str(&format!("{:<10} {}\n", "Added", format_date(item.timestamp)));
    out
}

/// A pending draft as an editable form. Missing fields show the value they
/// will fall back to.
pub fn render_draft(draft: &ItemDraft, color: bool) -> String {
    let mut out = String::new();
    for field in ItemField::ALL {
        let line = match draft.get(field) {
            Some(value) => format!("  {:<14} {:<9} {}\n", field.as_str(), label(field), value),
            None if color => format!(
                "  {:<14} {:<9} {DIM}{}{RESET}\n",
                field.as_str(),
                label(field),
                field.fallback()
            ),
            None => format!(
                "  {:<14} {:<9} ({})\n",
                field.as_str(),
                label(field),
                field.fallback()
            ),
        };
        out.push_str(&line);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_ansi() {
        let colored = format!("{GREEN}hello{RESET}");
        assert_eq!(strip_ansi(&colored), "hello");
    }

    #[test]
    fn renders_and_truncates_table() {
        let cols = vec![Column::left("Name").max(5), Column::right("Count")];
        let rows = vec![
            vec!["Alice in Wonderland".to_string(), "42".to_string()],
            vec!["Bob".to_string(), "7".to_string()],
        ];
        let table = render_table(&cols, &rows, false);
        assert!(table.contains("Alic…"));
        assert!(table.contains("   42"));
        assert!(!table.contains(BOLD));
    }

    #[test]
    fn draft_form_shows_fallbacks() {
        let draft = ItemDraft {
            brand: Some("ACME".into()),
            ..Default::default()
        };
        let form = render_draft(&draft, false);
        assert!(form.contains("ACME"));
        assert!(form.contains("(N/A)"));
        assert!(form.contains("(UNNAMED PRODUCT)"));
    }

    #[test]
    fn short_ids() {
        assert_eq!(short_id("0f8fad5b-d9cb-469f-a165-70867728950e"), "0f8fad5b");
        assert_eq!(short_id("lq3k9"), "lq3k9");
    }
}
