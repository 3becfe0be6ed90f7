//! Store ratings CLI - database migrations and administrator bootstrap.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! sr-cli migrate
//!
//! # Create an administrator
//! sr-cli admin create -n "Operations Administrator Account" \
//!     -a "1 Main Street" -e admin@example.com -p 'Adm1n!pass'
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `admin create` - Create an `ADMIN` account

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "sr-cli")]
#[command(author, version, about = "Store ratings CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage administrator accounts
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new administrator
    Create {
        /// Display name (20 to 60 characters)
        #[arg(short, long)]
        name: String,

        /// Postal address (at most 400 characters)
        #[arg(short, long)]
        address: String,

        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password (8 to 16 characters, one uppercase, one special)
        #[arg(short, long)]
        password: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Admin { action } => match action {
            AdminAction::Create {
                name,
                address,
                email,
                password,
            } => {
                commands::admin::create_admin(&name, &address, &email, &password).await?;
            }
        },
    }
    Ok(())
}
