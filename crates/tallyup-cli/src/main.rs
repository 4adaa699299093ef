use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use tallyup_application::AppServices;
use tallyup_infrastructure::{ConfigService, FileStore};

mod commands;

#[derive(Parser)]
#[command(name = "tallyup")]
#[command(about = "tallyup - split group expenses and settle up", long_about = None)]
struct Cli {
    /// Directory holding ledger.toml (overrides config)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create, join and list groups
    Group {
        #[command(subcommand)]
        action: GroupAction,
    },
    /// Record and list expenses
    Expense {
        #[command(subcommand)]
        action: ExpenseAction,
    },
    /// Compute, list and confirm settlements
    Settle {
        #[command(subcommand)]
        action: SettleAction,
    },
    /// Show each member's net balance in a group
    Balances { group_id: String },
}

#[derive(Subcommand)]
enum GroupAction {
    /// Create a group and print its join code
    Create {
        name: String,
        /// Member creating the group
        #[arg(long = "as")]
        creator: String,
        /// Additional member (repeatable)
        #[arg(long = "member")]
        members: Vec<String>,
    },
    /// Join a group by its code
    Join {
        code: String,
        #[arg(long = "as")]
        member: String,
    },
    /// List the groups a member belongs to
    List {
        #[arg(long = "as")]
        member: String,
    },
}

#[derive(Subcommand)]
enum ExpenseAction {
    /// Record an expense split equally across the group
    Add {
        group_id: String,
        amount: f64,
        description: String,
        /// Payment as member=amount (repeatable)
        #[arg(long = "paid", value_parser = commands::utils::parse_payment)]
        paid: Vec<(String, f64)>,
        #[arg(long)]
        category: Option<String>,
    },
    /// List a group's expenses
    List { group_id: String },
    /// Recent expenses across a member's groups
    Feed {
        #[arg(long = "as")]
        member: String,
    },
}

#[derive(Subcommand)]
enum SettleAction {
    /// Compute and store pending settlements for a group
    Compute { group_id: String },
    /// List pending settlements for a group
    Pending { group_id: String },
    /// Mark a settlement as paid
    Confirm { settlement_id: String },
}

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = ConfigService::load_platform().context("Failed to load configuration")?;
    init_tracing(&config.log_level);

    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => ConfigService::resolve_data_dir(&config)?,
    };
    let store = Arc::new(FileStore::new(&data_dir));
    tracing::debug!("Ledger: {:?}", store.path());
    let services = AppServices::from_store(store);
    let json = cli.json;

    match cli.command {
        Commands::Group { action } => match action {
            GroupAction::Create {
                name,
                creator,
                members,
            } => commands::group::create(&services, &name, &creator, members, json).await?,
            GroupAction::Join { code, member } => {
                commands::group::join(&services, &code, &member, json).await?
            }
            GroupAction::List { member } => commands::group::list(&services, &member, json).await?,
        },
        Commands::Expense { action } => match action {
            ExpenseAction::Add {
                group_id,
                amount,
                description,
                paid,
                category,
            } => {
                commands::expense::add(
                    &services,
                    group_id,
                    amount,
                    description,
                    paid,
                    category,
                    json,
                )
                .await?
            }
            ExpenseAction::List { group_id } => {
                commands::expense::list(&services, &group_id, json).await?
            }
            ExpenseAction::Feed { member } => {
                commands::expense::feed(&services, &member, json).await?
            }
        },
        Commands::Settle { action } => match action {
            SettleAction::Compute { group_id } => {
                commands::settle::compute(&services, &group_id, json).await?
            }
            SettleAction::Pending { group_id } => {
                commands::settle::pending(&services, &group_id, json).await?
            }
            SettleAction::Confirm { settlement_id } => {
                commands::settle::confirm(&services, &settlement_id, json).await?
            }
        },
        Commands::Balances { group_id } => {
            commands::settle::balances(&services, &group_id, json).await?
        }
    }

    Ok(())
}
