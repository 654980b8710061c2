pub mod backup;
pub mod insights;
pub mod log;
pub mod settings;
pub mod triggers;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::level_filters::LevelFilter;

use crate::stats::Period;
use crate::storage::cleanup::auto_cleanup;
use crate::storage::data_access::LocalDataAccess;
use crate::storage::entities::ThemeMode;
use crate::storage::kv::FileKeyValueStore;
use crate::utils::clock::{Clock, SystemClock};
use crate::utils::dir::create_application_default_path;
use crate::utils::logging::enable_logging;

use self::backup::{process_clear_command, process_export_command, process_import_command};
use self::insights::process_insights_command;
use self::log::{process_log_command, process_status_command, LogCommand};
use self::settings::{process_goal_command, process_theme_command};
use self::triggers::{process_triggers_command, TriggersCommand};

#[derive(Parser, Debug)]
#[command(name = "Pufflog", version, long_about = None)]
#[command(about = "Track and analyze smoking habits from your terminal", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(
        long,
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
    #[arg(long, help = "Enable logging")]
    log: bool,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Record a smoking event")]
    Log {
        #[command(flatten)]
        command: LogCommand,
    },
    #[command(about = "Show today's tally and monthly goal progress")]
    Status,
    #[command(about = "Show aggregated statistics for a time period")]
    Insights {
        #[arg(short, long, default_value_t = Period::Week, help = "Time window for filtering and charting")]
        period: Period,
    },
    #[command(subcommand, about = "Manage trigger categories")]
    Triggers(TriggersCommand),
    #[command(about = "Show or set the monthly goal")]
    Goal {
        #[arg(help = "New goal. Omit to display the current one")]
        value: Option<u32>,
    },
    #[command(about = "Show or set the color theme")]
    Theme {
        #[arg(value_enum, help = "New mode. Omit to display the current one")]
        mode: Option<ThemeMode>,
    },
    #[command(about = "Export history as a JSON backup or CSV")]
    Export {
        #[arg(long, help = "Write a logs-only CSV instead of the full JSON bundle")]
        csv: bool,
        #[arg(
            short,
            long,
            help = "Output file. Defaults to a dated name in the current directory"
        )]
        out: Option<PathBuf>,
    },
    #[command(about = "Import a JSON backup")]
    Import { file: PathBuf },
    #[command(about = "Delete every log entry, custom trigger and setting")]
    Clear {
        #[arg(long, help = "Skip the confirmation step")]
        yes: bool,
    },
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    let dir = match args.dir.clone() {
        Some(dir) => dir,
        None => create_application_default_path()?,
    };
    enable_logging(&dir, logging_level, args.log)?;

    let store = FileKeyValueStore::new(dir.join("store"))?;
    let data = LocalDataAccess::new(store);
    let clock = SystemClock;

    // The sweep runs before any command touches the log, so nothing below
    // ever observes entries past the retention horizon.
    auto_cleanup(&data, clock.now()).await;

    match args.commands {
        Commands::Log { command } => process_log_command(&data, &clock, command).await,
        Commands::Status => process_status_command(&data, &clock).await,
        Commands::Insights { period } => process_insights_command(&data, &clock, period).await,
        Commands::Triggers(command) => process_triggers_command(&data, command).await,
        Commands::Goal { value } => process_goal_command(&data, value).await,
        Commands::Theme { mode } => process_theme_command(&data, mode).await,
        Commands::Export { csv, out } => process_export_command(&data, &clock, csv, out).await,
        Commands::Import { file } => process_import_command(&data, file).await,
        Commands::Clear { yes } => process_clear_command(&data, yes).await,
    }
}
