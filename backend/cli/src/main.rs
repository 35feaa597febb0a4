mod app;
mod config;
mod config_cmd;
mod inventory_cmd;
mod key_cmd;
mod prompt;
mod scan_cmd;
mod terminal_output;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use stockscan_config::{check_report, config_dir, config_file_path, load_with_report};
use stockscan_logging::{init_logger, LogOptions};

use app::App;
use config::Settings;
use config_cmd::ConfigCommands;
use inventory_cmd::{AddArgs, SortArgs};
use key_cmd::KeyCommands;
use scan_cmd::ScanArgs;
use terminal_output::note_error;

#[derive(Parser)]
#[command(name = "stockscan")]
#[command(about = "Scan product labels into a local inventory")]
#[command(version)]
struct Cli {
    /// Config directory (default: $STOCKSCAN_CONFIG_DIR or ~/.stockscan)
    #[arg(long, global = true, value_name = "DIR")]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read product labels from photos and add them to the inventory
    Scan(ScanArgs),
    /// Enter an item by hand
    Add(AddArgs),
    /// List the inventory
    List {
        #[command(flatten)]
        sort: SortArgs,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show one item
    Show {
        /// Item id or unique id prefix
        id: String,
        #[arg(long)]
        json: bool,
    },
    /// Edit an item
    Edit {
        /// Item id or unique id prefix
        id: String,
        /// New field value, e.g. `--set price="12 EUR"`; omit to edit interactively
        #[arg(long = "set", value_name = "FIELD=VALUE")]
        sets: Vec<String>,
    },
    /// Remove an item
    Remove {
        /// Item id or unique id prefix
        id: String,
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Export the inventory as CSV
    Export {
        /// Output file (default: stdout)
        #[arg(short, long, value_name = "FILE")]
        out: Option<PathBuf>,
        #[command(flatten)]
        sort: SortArgs,
    },
    /// Manage the extraction API key
    #[command(subcommand)]
    Key(KeyCommands),
    /// Inspect or change the config file
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            note_error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let dir = cli.config_dir.unwrap_or_else(config_dir);
    let config_path = config_file_path(&dir);

    // Config commands work on the raw file and must not depend on it loading.
    let command = match cli.command {
        Commands::Config(cmd) => {
            init_logger(&LogOptions::default());
            return config_cmd::run(cmd, &config_path).await;
        }
        other => other,
    };

    // Report validation only once a subscriber is installed. A config with
    // errors cannot supply logging settings, so fall back to the defaults.
    let (config, report) = load_with_report(&config_path).await?;
    if !report.is_valid() {
        init_logger(&LogOptions::default());
        return check_report(&report);
    }
    let settings = Settings::from_config(&config, config_path.clone())?;
    init_logger(&settings.log);
    check_report(&report)?;

    let mut app = App::open(settings).await;
    match command {
        Commands::Scan(args) => scan_cmd::run(&mut app, args).await,
        Commands::Add(args) => inventory_cmd::add(&mut app, args).await,
        Commands::List { sort, json } => inventory_cmd::list(&app, &sort, json),
        Commands::Show { id, json } => inventory_cmd::show(&app, &id, json),
        Commands::Edit { id, sets } => inventory_cmd::edit(&mut app, &id, &sets).await,
        Commands::Remove { id, yes } => inventory_cmd::remove(&mut app, &id, yes).await.map(|_| ()),
        Commands::Export { out, sort } => inventory_cmd::export(&app, out.as_ref(), &sort),
        Commands::Key(cmd) => key_cmd::run(&app, cmd).await,
        Commands::Config(cmd) => config_cmd::run(cmd, &config_path).await,
    }
}
