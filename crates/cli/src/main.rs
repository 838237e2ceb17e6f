//! Tienda CLI - database migrations, seeding and admin accounts.
//!
//! # Usage
//!
//! ```bash
//! # Apply storefront and session-store migrations
//! tienda migrate
//!
//! # Insert the admin account, categories and sample products (idempotent)
//! tienda seed
//!
//! # Replace the sample products
//! tienda seed --reset-products
//!
//! # Create an admin account
//! tienda admin create -e ops@example.com -n "Ops" --password '...'
//!
//! # Give an existing account the admin role
//! tienda admin promote -e customer@example.com
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string
//! - `STOREFRONT_SEED_ADMIN_EMAIL` / `STOREFRONT_SEED_ADMIN_PASSWORD` - seed admin account

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use secrecy::SecretString;

use tienda_storefront::services::seed::{DEFAULT_ADMIN_EMAIL, DEFAULT_ADMIN_PASSWORD};

mod commands;

#[derive(Parser)]
#[command(name = "tienda")]
#[command(author, version, about = "Tienda operator tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply database migrations (storefront schema and session store)
    Migrate,
    /// Seed the admin account, categories and sample products
    Seed {
        /// Delete every product and reinsert the samples
        #[arg(long, env = "STOREFRONT_SEED_RESET_PRODUCTS")]
        reset_products: bool,

        /// Seed admin email
        #[arg(long, env = "STOREFRONT_SEED_ADMIN_EMAIL", default_value = DEFAULT_ADMIN_EMAIL)]
        admin_email: String,

        /// Seed admin password
        #[arg(
            long,
            env = "STOREFRONT_SEED_ADMIN_PASSWORD",
            default_value = DEFAULT_ADMIN_PASSWORD,
            hide_default_value = true,
            hide_env_values = true
        )]
        admin_password: String,
    },
    /// Manage admin accounts
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin account
    Create {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Login password
        #[arg(long, env = "TIENDA_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Grant the admin role to an existing account
    Promote {
        /// Email address of the account
        #[arg(short, long)]
        email: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Command failed: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    let pool = commands::connect().await?;

    match cli.command {
        Commands::Migrate => commands::migrate::run(&pool).await?,
        Commands::Seed {
            reset_products,
            admin_email,
            admin_password,
        } => {
            commands::seed::run(
                &pool,
                &admin_email,
                SecretString::from(admin_password),
                reset_products,
            )
            .await?;
        }
        Commands::Admin { action } => match action {
            AdminAction::Create {
                email,
                name,
                password,
            } => {
                commands::admin::create_user(&pool, &email, &name, &SecretString::from(password))
                    .await?;
            }
            AdminAction::Promote { email } => {
                commands::admin::promote(&pool, &email).await?;
            }
        },
    }
    Ok(())
}
