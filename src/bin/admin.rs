//! CLI administration tool for curly.
//!
//! Provides commands for provisioning staff accounts, viewing statistics,
//! and performing database operations without requiring HTTP API access.
//!
//! # Usage
//!
//! ```bash
//! # Create a staff account
//! cargo run --bin admin -- identity create-staff
//!
//! # View statistics
//! cargo run --bin admin -- stats
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (required): PostgreSQL connection string

use curly::application::services::auth_service::hash_password;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input, Password};
use sqlx::PgPool;

/// CLI tool for managing curly.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage identities
    Identity {
        #[command(subcommand)]
        action: IdentityAction,
    },

    /// Show statistics
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Identity management subcommands.
#[derive(Subcommand)]
enum IdentityAction {
    /// Create a staff account
    CreateStaff {
        /// Username for the new account
        #[arg(short, long)]
        username: Option<String>,

        /// Email for the new account
        #[arg(short, long)]
        email: Option<String>,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::Identity { action } => handle_identity_action(action, &pool).await?,
        Commands::Stats => handle_stats(&pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

/// Dispatches identity management commands.
async fn handle_identity_action(action: IdentityAction, pool: &PgPool) -> Result<()> {
    match action {
        IdentityAction::CreateStaff {
            username,
            email,
            yes,
        } => create_staff(pool, username, email, yes).await?,
    }

    Ok(())
}

/// Creates a staff account with interactive prompts.
///
/// # Flow
///
/// 1. Prompt for username and email (or use provided)
/// 2. Prompt for password with confirmation
/// 3. Confirm creation (unless `--yes` flag)
/// 4. Hash the password with Argon2id
/// 5. Store the identity and its profile in one transaction
async fn create_staff(
    pool: &PgPool,
    username: Option<String>,
    email: Option<String>,
    skip_confirm: bool,
) -> Result<()> {
    println!("{}", "Create staff account".bright_blue().bold());
    println!();

    let username = match username {
        Some(u) => u,
        None => Input::new().with_prompt("Username").interact_text()?,
    };

    let email: String = match email {
        Some(e) => e,
        None => Input::new().with_prompt("Email").interact_text()?,
    };

    let password = Password::new()
        .with_prompt("Password")
        .with_confirmation("Confirm password", "Passwords do not match")
        .interact()?;

    println!();
    println!("  Username: {}", username.cyan());
    println!("  Email:    {}", email.cyan());
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Create this account?")
            .default(true)
            .interact()?;

        if !confirmed {
            println!("{}", "Cancelled".red());
            return Ok(());
        }
    }

    let password_hash =
        hash_password(&password).map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;

    let mut tx = pool.begin().await?;

    let identity_id: i64 = sqlx::query_scalar(
        "INSERT INTO identities (username, email, kind, password_hash)
         VALUES ($1, $2, 'staff', $3) RETURNING id",
    )
    .bind(&username)
    .bind(&email)
    .bind(&password_hash)
    .fetch_one(&mut *tx)
    .await
    .context("Failed to create identity (username or email may be taken)")?;

    sqlx::query("INSERT INTO profiles (identity_id) VALUES ($1)")
        .bind(identity_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    println!();
    println!("{}", "Staff account created!".green().bold());
    println!("  ID: {}", identity_id.to_string().bright_white());
    println!();

    Ok(())
}

/// Displays system statistics.
///
/// Shows:
/// - Identity counts by kind
/// - Total number of links
/// - Total number of clicks (and how many redirected)
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "Statistics".bright_blue().bold());
    println!();

    let guests: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM identities WHERE kind = 'guest'")
        .fetch_one(pool)
        .await?;

    let registered: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM identities WHERE kind <> 'guest'")
            .fetch_one(pool)
            .await?;

    let links_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM links")
        .fetch_one(pool)
        .await?;

    let clicks_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM clicks")
        .fetch_one(pool)
        .await?;

    let redirected_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM clicks WHERE redirected")
        .fetch_one(pool)
        .await?;

    println!(
        "  Guests:     {}",
        guests.to_string().bright_green().bold()
    );
    println!(
        "  Registered: {}",
        registered.to_string().bright_green().bold()
    );
    println!(
        "  Links:      {}",
        links_count.to_string().bright_green().bold()
    );
    println!(
        "  Clicks:     {} ({} redirected)",
        clicks_count.to_string().bright_green().bold(),
        redirected_count.to_string().bright_white()
    );
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            println!("  PostgreSQL: {}", version.bright_white());
            println!();
        }
    }

    Ok(())
}
