//! Config subcommands. These work on the raw file, so they stay usable when
//! the config does not load.

use std::path::Path;

use anyhow::{bail, Result};
use clap::Subcommand;
use stockscan_config::{
    apply_all_defaults, apply_merge_patch, load_and_prepare, load_config, patch_for_path, redact,
    validate, write_config,
};

use crate::terminal_output::{note_success, note_warn};

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective config, secrets masked
    Show,
    /// Print the config file location
    Path,
    /// Set one value, e.g. `config set scanner.jpegQuality 70`
    Set { path: String, value: String },
}

pub async fn run(cmd: ConfigCommands, config_path: &Path) -> Result<()> {
    match cmd {
        ConfigCommands::Path => println!("{}", config_path.display()),
        ConfigCommands::Show => {
            let config = load_and_prepare(config_path).await?;
            let value = redact(&serde_json::to_value(&config)?);
            print!("{}", serde_yaml::to_string(&value)?);
        }
        ConfigCommands::Set { path, value } => {
            let current = load_config(config_path).await?;
            let patch = patch_for_path(&path, &value)?;
            let updated = apply_merge_patch(&current, &patch)?;

            let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
            let report = validate(&apply_all_defaults(updated.clone(), base_dir));
            if let Some(error) = report.errors.first() {
                bail!("{error}");
            }
            for warning in &report.warnings {
                note_warn(&warning.to_string());
            }

            write_config(&updated, config_path).await?;
            note_success(&format!("Set {path} in {}", config_path.display()));
        }
    }
    Ok(())
}
