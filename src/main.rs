//! Dashboard CLI - main entry point

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

use bot_dashboard::commands::{self, tables::ListOptions, Collection};
use bot_dashboard::config::Config;
use bot_dashboard::error::{Error, Result};
use bot_dashboard::models::{SettingsUpdate, TimeFilter};

#[derive(Parser)]
#[command(name = "bot_dashboard")]
#[command(about = "Analytics dashboard for a Baserow-backed chatbot CRM", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(long, env = "BOT_DASHBOARD_CONFIG", default_value = "config.yml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show metric cards with previous-period comparison
    Overview {
        /// Time granularity: day, month or year
        #[arg(short, long, default_value = "month")]
        granularity: TimeFilter,

        /// Count only clients with a completed registration
        #[arg(long)]
        completed_only: bool,

        /// Output format: table | json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Show the bucketed chart series
    Chart {
        /// Time granularity: day, month or year
        #[arg(short, long, default_value = "month")]
        granularity: TimeFilter,

        /// Count only clients with a completed registration
        #[arg(long)]
        completed_only: bool,

        /// Output format: table | json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// List records of one collection for the current period
    Tables {
        /// Collection: clients, interactions or conversions
        collection: Collection,

        /// Time granularity: day, month or year
        #[arg(short, long, default_value = "month")]
        granularity: TimeFilter,

        /// Show only clients with a completed registration
        #[arg(long)]
        completed_only: bool,

        /// Case-insensitive search over the collection's text fields
        #[arg(short, long)]
        search: Option<String>,

        /// Page number (1-based)
        #[arg(long, default_value = "1")]
        page: usize,

        /// Records per page
        #[arg(long, default_value = "10")]
        page_size: usize,

        /// Export the filtered records to a CSV file instead of printing
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Read or update the bot configuration row
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Show the current settings row
    Show,

    /// Apply a partial update to the settings row
    Set {
        /// Bot display name
        #[arg(long)]
        bot_name: Option<String>,

        /// Welcome message / plans link
        #[arg(long)]
        welcome_message: Option<String>,

        /// Enable automatic replies
        #[arg(long)]
        auto_reply: Option<bool>,

        /// Working hours start (accepted but not persisted remotely)
        #[arg(long)]
        working_hours_start: Option<String>,

        /// Working hours end (accepted but not persisted remotely)
        #[arg(long)]
        working_hours_end: Option<String>,
    },
}

fn parse_format(raw: &str) -> Result<bool> {
    match raw {
        "table" => Ok(false),
        "json" => Ok(true),
        other => Err(Error::InvalidArgument(format!(
            "unknown format: {} (expected table or json)",
            other
        ))),
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(&cli.config)?;

    match cli.command {
        Commands::Overview {
            granularity,
            completed_only,
            format,
        } => {
            commands::overview::run(&config, granularity, completed_only, parse_format(&format)?)
                .await
        }

        Commands::Chart {
            granularity,
            completed_only,
            format,
        } => {
            commands::chart::run(&config, granularity, completed_only, parse_format(&format)?)
                .await
        }

        Commands::Tables {
            collection,
            granularity,
            completed_only,
            search,
            page,
            page_size,
            output,
        } => {
            let options = ListOptions {
                filter: granularity,
                completed_only,
                search,
                page,
                page_size,
            };
            commands::tables::run(&config, collection, &options, output.as_deref()).await
        }

        Commands::Settings { action } => match action {
            SettingsAction::Show => commands::settings::show(&config).await,
            SettingsAction::Set {
                bot_name,
                welcome_message,
                auto_reply,
                working_hours_start,
                working_hours_end,
            } => {
                let update = SettingsUpdate {
                    bot_name,
                    welcome_message,
                    auto_reply,
                    working_hours_start,
                    working_hours_end,
                };
                commands::settings::set(&config, update).await
            }
        },
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        eprintln!("Erro: {}", err);
        process::exit(1);
    }
}
