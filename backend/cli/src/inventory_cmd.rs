//! Inventory subcommands: manual entry, listing, editing, removal, export.

use std::fs::File;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use stockscan_core::{Item, ItemDraft, ItemField};
use stockscan_inventory::{write_csv, AlwaysConfirm, SortDirection, SortKey, SortSpec};

use crate::app::App;
use crate::prompt::{confirm, parse_assignment};
use crate::terminal_output::{note_info, note_success, render_inventory, render_item, short_id};

#[derive(Args, Debug, Default)]
pub struct AddArgs {
    #[arg(long)]
    pub barcode: Option<String>,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub brand: Option<String>,
    #[arg(long)]
    pub season: Option<String>,
    #[arg(long)]
    pub model: Option<String>,
    #[arg(long = "type", value_name = "TYPE")]
    pub product_type: Option<String>,
    #[arg(long)]
    pub color: Option<String>,
    #[arg(long)]
    pub size: Option<String>,
    #[arg(long)]
    pub price: Option<String>,
    /// Positive integer; anything else counts as 1
    #[arg(long)]
    pub quantity: Option<String>,
    /// Save without the review prompt
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Args, Debug, Default)]
pub struct SortArgs {
    /// Column to sort by (timestamp, brand, name, quantity, ...)
    #[arg(long, value_name = "FIELD")]
    pub sort: Option<String>,
    /// Sort descending
    #[arg(long)]
    pub desc: bool,
}

impl SortArgs {
    /// No flags means newest first.
    pub fn spec(&self) -> Result<SortSpec> {
        let direction = if self.desc { SortDirection::Desc } else { SortDirection::Asc };
        Ok(match &self.sort {
            None if !self.desc => SortSpec::default(),
            None => SortSpec::new(SortKey::Timestamp, direction),
            Some(key) => SortSpec::new(key.parse()?, direction),
        })
    }
}

pub async fn add(app: &mut App, args: AddArgs) -> Result<()> {
    let draft = ItemDraft {
        barcode: args.barcode,
        name: args.name,
        brand: args.brand,
        season: args.season,
        model: args.model,
        product_type: args.product_type,
        color: args.color,
        size: args.size,
        price: args.price,
        ..Default::default()
    };
    app.workflow.begin_new(draft)?;
    if let Some(quantity) = &args.quantity {
        app.workflow.set_field(ItemField::Quantity, quantity)?;
    }
    app.confirm_pending(&[], args.yes).await
}

pub fn list(app: &App, sort: &SortArgs, json: bool) -> Result<()> {
    let items = app.inventory.sorted(sort.spec()?);
    if json {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }
    if items.is_empty() {
        note_info("The inventory is empty; start by scanning an item");
        return Ok(());
    }
    print!("{}", render_inventory(&items, app.color));
    println!(
        "\n  {} models / {} units",
        app.inventory.len(),
        app.inventory.total_units()
    );
    Ok(())
}

pub fn show(app: &App, id: &str, json: bool) -> Result<()> {
    let Some(id) = app.resolve_id(id)? else {
        bail!("no item with id {id:?}");
    };
    let item = app
        .inventory
        .get(&id)
        .with_context(|| format!("no item with id {id:?}"))?;
    if json {
        println!("{}", serde_json::to_string_pretty(item)?);
    } else {
        print!("{}", render_item(item));
    }
    Ok(())
}

/// Open an item for editing. With `--set` values the edit is saved directly,
/// otherwise the review prompt opens.
pub async fn edit(app: &mut App, id: &str, sets: &[String]) -> Result<()> {
    let overrides = sets
        .iter()
        .map(|raw| parse_assignment(raw))
        .collect::<Result<Vec<_>>>()?;
    let Some(id) = app.resolve_id(id)? else {
        bail!("no item with id {id:?}");
    };
    let item = app
        .inventory
        .get(&id)
        .cloned()
        .with_context(|| format!("no item with id {id:?}"))?;
    app.workflow.begin_edit(&item)?;
    app.confirm_pending(&overrides, !overrides.is_empty()).await
}

pub async fn remove(app: &mut App, id: &str, yes: bool) -> Result<bool> {
    remove_with(app, id, yes, &mut io::stdin().lock(), &mut io::stderr()).await
}

/// [`remove`] with the confirmation read from `input`. Returns whether an
/// item was removed.
pub async fn remove_with<R: BufRead, W: Write>(
    app: &mut App,
    id: &str,
    yes: bool,
    input: &mut R,
    out: &mut W,
) -> Result<bool> {
    let Some(id) = app.resolve_id(id)? else {
        note_info(&format!("No item with id {id:?}; nothing removed"));
        return Ok(false);
    };

    let removed = if yes {
        app.inventory.remove(&id, &mut AlwaysConfirm).await?
    } else {
        let mut ask = |item: &Item| {
            let question = format!(
                "Remove {} {} x{} ({})?",
                item.brand,
                item.name,
                item.quantity,
                short_id(&item.id)
            );
            confirm(&question, input, out).unwrap_or(false)
        };
        app.inventory.remove(&id, &mut ask).await?
    };

    if removed {
        note_success(&format!("Removed {}", short_id(&id)));
    } else {
        note_info("Nothing removed");
    }
    Ok(removed)
}

pub fn export(app: &App, out: Option<&PathBuf>, sort: &SortArgs) -> Result<()> {
    let items = app.inventory.sorted(sort.spec()?);
    match out {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            write_csv(&items, BufWriter::new(file))?;
            note_success(&format!("Exported {} items to {}", items.len(), path.display()));
        }
        None => write_csv(&items, io::stdout().lock())?,
    }
    Ok(())
}
