use anyhow::Result;
use chrono::Local;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use toolrank::config::Config;
use toolrank::dictionary::genres::load_genres;
use toolrank::dictionary::Dictionary;
use toolrank::error::PipelineError;
use toolrank::matcher::pending::PendingMiner;
use toolrank::matcher::Matcher;
use toolrank::output::terminal;
use toolrank::pipeline::preprocess::{self, Preprocessor};
use toolrank::pipeline::weekly::{self, WeeklyParams};
use toolrank::store::{self, SnapshotStore, SqliteStore};
use toolrank::week::WeekId;

/// Toolrank: weekly AI tool leaderboard.
///
/// Matches tool mentions in collected news, video and newsletter feeds
/// against a curated dictionary and ranks the most talked-about tools per
/// genre, week over week.
#[derive(Parser)]
#[command(name = "toolrank", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database
    Init,

    /// Match the latest collector files against the dictionary
    Preprocess {
        /// Log detected sources, n-gram samples and matches per record
        #[arg(long)]
        debug: bool,
    },

    /// Score and rank a week from its latest processed snapshot
    Rank {
        /// ISO week to rank, e.g. 2025-W24 (default: current week)
        #[arg(long)]
        week: Option<String>,
    },

    /// Preprocess, then rank the current week
    Run {
        #[arg(long)]
        debug: bool,
    },

    /// Show a stored leaderboard
    Show {
        /// ISO week to show (default: newest ranked week)
        #[arg(long)]
        week: Option<String>,
    },

    /// List the most frequent unknown terms of the latest run
    Pending {
        #[arg(long, default_value = "30")]
        limit: u32,
    },

    /// Check the dictionary for ambiguous aliases and unranked genres
    CheckDict,

    /// Show system status (DB stats, latest snapshots, ranked weeks)
    Status,
}

fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("toolrank=info")),
        )
        .init();

    let cli = Cli::parse();

    match execute(cli.command) {
        Err(e) if is_no_input(&e) => {
            // Nothing to do is not a failure.
            println!("{} {}", "Nothing to do:".yellow(), e);
            Ok(())
        }
        other => other,
    }
}

fn execute(command: Commands) -> Result<()> {
    match command {
        Commands::Init => {
            info!("Initializing toolrank database...");
            let config = Config::load()?;
            let store = SqliteStore::new(store::initialize(&config.db_path)?);
            let table_count = store.table_count()?;
            println!("Database initialized at: {}", config.db_path);
            println!("Tables created: {table_count}");
            if !config.dict_path.exists() {
                println!(
                    "\n{} no dictionary at {}. Every run will match nothing.",
                    "Warning:".yellow(),
                    config.dict_path.display()
                );
            }
            println!("\nThen run: cargo run -- run");
        }

        Commands::Preprocess { debug } => {
            let config = Config::load()?;
            let store = open_store(&config)?;
            run_preprocess(&config, &store, debug)?;
        }

        Commands::Rank { week } => {
            let config = Config::load()?;
            let store = open_store(&config)?;
            let week = parse_week_arg(week.as_deref())?;
            run_rank(&config, &store, week)?;
        }

        Commands::Run { debug } => {
            let config = Config::load()?;
            let store = open_store(&config)?;
            run_preprocess(&config, &store, debug)?;
            run_rank(&config, &store, WeekId::current())?;
        }

        Commands::Show { week } => {
            let config = Config::load()?;
            let store = open_store(&config)?;
            let week = match week {
                Some(raw) => raw.parse::<WeekId>()?,
                None => match store.newest_week()? {
                    Some(week) => week,
                    None => {
                        println!("No weeks ranked yet. Run `toolrank rank` first.");
                        return Ok(());
                    }
                },
            };
            terminal::display_rankings(&week, &store.rankings(&week)?);
        }

        Commands::Pending { limit } => {
            let config = Config::load()?;
            let store = open_store(&config)?;
            let run_date = store.latest_run_date(None)?;
            let terms = match run_date {
                Some(date) => store.pending_terms(date, limit)?,
                None => Vec::new(),
            };
            terminal::display_pending(run_date, &terms);
        }

        Commands::CheckDict => {
            let config = Config::load()?;
            let dict = Dictionary::load(&config.dict_path)?;
            let genres = load_genres(&config.genres_path)?;
            terminal::display_dictionary_check(&dict, &genres);
        }

        Commands::Status => {
            let config = Config::load()?;
            if !toolrank::status::is_initialized(&config.db_path) {
                println!("Database: not initialized");
                println!("\nRun `toolrank init` to set up the database.");
                return Ok(());
            }
            let store = open_store(&config)?;
            toolrank::status::show(&store, &config.db_path)?;
        }
    }

    Ok(())
}

/// Open the existing database behind the snapshot store interface.
fn open_store(config: &Config) -> Result<SqliteStore> {
    Ok(SqliteStore::new(store::open(&config.db_path)?))
}

/// Process the latest collector files and save today's snapshot.
fn run_preprocess(config: &Config, store: &dyn SnapshotStore, debug: bool) -> Result<()> {
    let dict = Dictionary::load(&config.dict_path)?;
    let matcher = Matcher::new(&dict, config.thresholds);
    let miner = if config.pending_stop_words {
        PendingMiner::new().with_english_stop_words()
    } else {
        PendingMiner::new()
    };
    let preprocessor = Preprocessor::new(matcher, config.weights, miner).with_debug(debug);

    println!("Processing collector files in {}...", config.data_dir.display());
    let report = preprocess::run(preprocessor, &config.data_dir, config.pending_limit)?;
    preprocess::save(store, Local::now().date_naive(), &report)?;

    terminal::display_preprocess_report(&report);
    Ok(())
}

/// Rank one week and display the result.
fn run_rank(config: &Config, store: &dyn SnapshotStore, week: WeekId) -> Result<()> {
    let dict = Dictionary::load(&config.dict_path)?;
    let genres = load_genres(&config.genres_path)?;
    let params = WeeklyParams {
        decay_factor: config.decay_factor,
        top_n: config.top_n,
    };

    let outcome = weekly::run_week(store, &dict, &genres, week, params)?;
    terminal::display_weekly_outcome(&outcome);
    Ok(())
}

fn parse_week_arg(raw: Option<&str>) -> Result<WeekId> {
    match raw {
        Some(raw) => Ok(raw.parse::<WeekId>()?),
        None => Ok(WeekId::current()),
    }
}

fn is_no_input(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<PipelineError>(),
        Some(PipelineError::NoProcessableInput)
    )
}
