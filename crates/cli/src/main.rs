//! AYLIA CLI - Operator tools for the site.
//!
//! # Usage
//!
//! ```bash
//! # Create an admin account
//! aylia-cli admin create -e admin@aylia.dev -p 'a long password'
//!
//! # Grant the admin role to an existing account
//! aylia-cli admin grant <user_id>
//!
//! # Insert the default featured projects into an empty table
//! aylia-cli projects seed
//! ```
//!
//! # Commands
//!
//! - `admin create` - Sign up an account and grant it the admin role
//! - `admin grant` - Repair an account left without the role
//! - `projects seed` - Seed the showcase portfolio

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "aylia-cli")]
#[command(author, version, about = "AYLIA site operator tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage admin accounts
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Manage featured projects
    Projects {
        #[command(subcommand)]
        action: ProjectsAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin account
    Create {
        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Initial password (at least 6 characters)
        #[arg(short, long)]
        password: String,
    },
    /// Grant the admin role to an existing account
    Grant {
        /// Account id (UUID) from the auth service
        user_id: String,
    },
}

#[derive(Subcommand)]
enum ProjectsAction {
    /// Insert the showcase projects if the table is empty
    Seed,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Admin { action } => match action {
            AdminAction::Create { email, password } => {
                commands::admin::create(&email, &password).await?;
            }
            AdminAction::Grant { user_id } => commands::admin::grant(&user_id).await?,
        },
        Commands::Projects { action } => match action {
            ProjectsAction::Seed => {
                commands::seed::projects().await?;
            }
        },
    }
    Ok(())
}
