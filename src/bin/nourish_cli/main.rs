// ABOUTME: Nourish CLI - replays meal datasets through the personalization engine
// ABOUTME: Prints replay reports, recommendations and the effective configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
//!
//! Usage:
//! ```bash
//! # Replay a dataset and print the per-user report
//! nourish-cli replay --dataset data/week.json
//!
//! # Replay, then rank candidates for one user at lunch
//! nourish-cli recommend --dataset data/week.json --user 6f1c...e2 --meal lunch --top-k 5
//!
//! # Show the effective configuration (defaults + NOURISH_* overrides)
//! nourish-cli config
//! ```

mod commands;
mod helpers;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use nourish_engine::logging::LoggingConfig;
use std::path::PathBuf;
use tracing::info;
use uuid::Uuid;

#[derive(Parser)]
#[command(
    name = "nourish-cli",
    about = "Nourish personalization engine CLI",
    long_about = "Replays meal-event datasets through the personalization engine and reports profiles, challenges and recommendations."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[non_exhaustive]
#[derive(Subcommand)]
enum Command {
    /// Replay a dataset and print the per-user report
    Replay {
        /// Dataset file (JSON with `events` and `candidates`)
        #[arg(long)]
        dataset: PathBuf,

        /// Recommendations per user in the report
        #[arg(long)]
        top_k: Option<usize>,

        /// Evaluation time of the report (RFC 3339); defaults to the last event
        #[arg(long)]
        until: Option<DateTime<Utc>>,
    },

    /// Replay a dataset, then rank candidates for one user
    Recommend {
        /// Dataset file (JSON with `events` and `candidates`)
        #[arg(long)]
        dataset: PathBuf,

        /// User to rank for
        #[arg(long)]
        user: Uuid,

        /// Meal type (breakfast, lunch, dinner, snack); inferred from the time when omitted
        #[arg(long)]
        meal: Option<String>,

        /// Number of recommendations
        #[arg(long, default_value = "10")]
        top_k: usize,

        /// Request time (RFC 3339); defaults to the last event
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },

    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    LoggingConfig::for_cli(cli.verbose).init()?;
    info!("Nourish CLI");

    match cli.command {
        Command::Replay {
            dataset,
            top_k,
            until,
        } => commands::replay::run(&dataset, top_k, until, cli.pretty).await?,
        Command::Recommend {
            dataset,
            user,
            meal,
            top_k,
            at,
        } => {
            commands::replay::recommend(&dataset, user, meal.as_deref(), top_k, at, cli.pretty)
                .await?;
        }
        Command::Config => commands::config::show(cli.pretty)?,
    }

    Ok(())
}
