//! VitalTrack CLI
//!
//! Command-line front end for the VitalTrack health-tracking API: sign in,
//! inspect the stored session, browse meals, goals and reports, and search
//! the food database.

use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use std::path::PathBuf;
use std::process::ExitCode;
use vitaltrack_api_client::ApiError;
use vitaltrack_cli::OutputFormat;

mod commands;
mod context;

use commands::{auth, food, goals, meals, report};
use context::Context;

/// Command-line client for the VitalTrack health-tracking API
#[derive(Parser)]
#[command(name = "vitaltrack")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Configuration file (defaults to .vitaltrack.toml, vitaltrack.toml, or the user config dir)
    #[arg(short, long, global = true, env = "VITALTRACK_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and store the session token
    Login {
        /// Account email
        email: String,

        /// Account password
        #[arg(long, env = "VITALTRACK_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Forget the stored session
    Logout,

    /// Show the stored token's state and expiry
    Token,

    /// Logged meals
    Meals {
        #[command(subcommand)]
        action: meals::MealsAction,
    },

    /// Daily nutritional goals
    Goals,

    /// Comprehensive report for a date range
    Report {
        /// First day (YYYY-MM-DD); defaults to six days before --end
        #[arg(long)]
        start: Option<chrono::NaiveDate>,

        /// Last day (YYYY-MM-DD); defaults to today
        #[arg(long)]
        end: Option<chrono::NaiveDate>,
    },

    /// Food database lookup
    Food {
        #[command(subcommand)]
        action: food::FoodAction,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let ctx = match Context::load(cli.config.as_deref(), cli.format) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            return ExitCode::FAILURE;
        }
    };

    // Logging failures are not fatal for the command itself
    let _telemetry = match vitaltrack_telemetry::init_with_config(ctx.telemetry(cli.verbose)) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("{} {e:#}", "Warning:".yellow().bold());
            None
        }
    };

    tracing::debug!(
        base_url = %ctx.client_config.base_url,
        environment = ?ctx.client_config.environment,
        "Configuration loaded"
    );

    let result = match cli.command {
        Commands::Login { email, password } => auth::login(&ctx, &email, &password).await,
        Commands::Logout => auth::logout(&ctx),
        Commands::Token => auth::token(&ctx),
        Commands::Meals { action } => meals::run(&ctx, action).await,
        Commands::Goals => goals::run(&ctx).await,
        Commands::Report { start, end } => report::run(&ctx, start, end).await,
        Commands::Food { action } => food::run(&ctx, action).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<ApiError>() {
                Some(api) if api.is_auth_error() => {
                    eprintln!("{} {}", "Error:".red().bold(), api);
                    eprintln!("Run `vitaltrack login <email>` to sign in again.");
                }
                Some(api) => {
                    eprintln!("{} {}", "Error:".red().bold(), api);
                    for field in api.field_errors() {
                        eprintln!("  {} {}", field.field.dimmed(), field.message);
                    }
                }
                None => eprintln!("{} {:#}", "Error:".red().bold(), e),
            }
            ExitCode::FAILURE
        }
    }
}
