//! API key subcommands. The key is kept in the data store, next to the
//! inventory, under `gemini_api_key`.

use anyhow::{anyhow, Result};
use clap::Subcommand;
use stockscan_config::redact;
use stockscan_extraction::{resolve_key_source_with, validate_api_key};
use stockscan_store::API_KEY_KEY;

use crate::app::App;
use crate::terminal_output::{note_success, note_warn};

#[derive(Subcommand, Debug)]
pub enum KeyCommands {
    /// Save an API key for the extraction service
    Set { key: String },
    /// Forget the saved API key
    Clear,
    /// Show which key is in use and where it comes from
    Show,
}

pub async fn run(app: &App, cmd: KeyCommands) -> Result<()> {
    match cmd {
        KeyCommands::Set { key } => {
            let key = validate_api_key(&key)
                .ok_or_else(|| anyhow!("Invalid key: it must be longer than 20 characters"))?;
            app.kv.set(API_KEY_KEY, &key).await?;
            note_success("API key saved");
        }
        KeyCommands::Clear => {
            app.kv.remove(API_KEY_KEY).await?;
            note_success("Saved API key removed");
        }
        KeyCommands::Show => {
            let stored = app.stored_api_key().await;
            let resolved = resolve_key_source_with(
                stored.as_deref(),
                app.settings.configured_api_key.as_deref(),
                |name| std::env::var(name).ok(),
            );
            match resolved {
                Some((key, source)) => println!("{} (from {source})", mask(&key)),
                None => note_warn(
                    "No usable API key. Save one with `stockscan key set <KEY>` or set GEMINI_API_KEY",
                ),
            }
        }
    }
    Ok(())
}

fn mask(key: &str) -> String {
    let masked = redact(&serde_json::json!({ "apiKey": key }));
    masked["apiKey"].as_str().unwrap_or("***").to_string()
}
