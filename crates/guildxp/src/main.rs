// SPDX-FileCopyrightText: 2026 guildxp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! guildxp - community XP bot.
//!
//! This is the binary entry point: the Discord gateway (`serve`) and the
//! operator subcommands that run ledger operations directly.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod backend;
mod ops;
mod schedule;
mod serve;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use guildxp_config::GuildXpConfig;
use guildxp_core::GuildXpError;
use guildxp_ledger::{LeaderboardMode, LedgerService};

/// guildxp - community XP bot.
#[derive(Parser, Debug)]
#[command(name = "guildxp", version, about, long_about = None)]
struct Cli {
    /// Read this config file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Connect to Discord and run the quest schedules.
    Serve,
    /// Credit every attendee of an event sheet once.
    ProcessEvent {
        /// Sheet URL or bare spreadsheet id.
        source: String,
        /// XP per attendee.
        xp: u64,
    },
    /// Recompute board-member flags from the board roster.
    SyncBoard,
    /// Print the leaderboard.
    Leaderboard {
        #[arg(long, default_value = "regular")]
        mode: LeaderboardMode,
        #[arg(long)]
        top: Option<usize>,
        /// Print JSON instead of the chat rendering.
        #[arg(long)]
        json: bool,
    },
    /// Print a member's balance by Discord user id.
    Balance { discord_id: String },
    /// Replace a worksheet of the SQLite mirror with rows from a JSON file.
    ImportGrid {
        workbook: String,
        title: String,
        file: PathBuf,
    },
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("guildxp={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Option<GuildXpConfig> {
    let loaded = match path {
        Some(path) => guildxp_config::load_and_validate_path(path),
        None => guildxp_config::load_and_validate(),
    };
    match loaded {
        Ok(config) => Some(config),
        Err(errors) => {
            guildxp_config::render_errors(&errors);
            None
        }
    }
}

async fn run(command: Commands, config: GuildXpConfig) -> Result<Option<String>, GuildXpError> {
    match command {
        Commands::Serve => serve::run_serve(config).await.map(|()| None),
        Commands::ImportGrid {
            workbook,
            title,
            file,
        } => ops::import_grid(&config, &workbook, &title, &file)
            .await
            .map(Some),
        Commands::ProcessEvent { source, xp } => {
            let ledger = open_ledger(&config).await?;
            ops::process_event(&ledger, &source, xp).await.map(Some)
        }
        Commands::SyncBoard => {
            let ledger = open_ledger(&config).await?;
            ops::sync_board(&ledger).await.map(Some)
        }
        Commands::Leaderboard { mode, top, json } => {
            let ledger = open_ledger(&config).await?;
            ops::leaderboard(&ledger, &config.bot.name, mode, top, json)
                .await
                .map(Some)
        }
        Commands::Balance { discord_id } => {
            let ledger = open_ledger(&config).await?;
            ops::balance(&ledger, &discord_id).await.map(Some)
        }
    }
}

async fn open_ledger(config: &GuildXpConfig) -> Result<Arc<LedgerService>, GuildXpError> {
    backend::open_ledger(config).await.map(|(_store, ledger)| ledger)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let Some(config) = load_config(cli.config.as_ref()) else {
        return ExitCode::FAILURE;
    };
    init_tracing(&config.bot.log_level);

    let Some(command) = cli.command else {
        println!("guildxp: use --help for available commands");
        return ExitCode::SUCCESS;
    };

    match run(command, config).await {
        Ok(Some(output)) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Ok(None) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
