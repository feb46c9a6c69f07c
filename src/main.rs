mod config;
mod corpus;
mod db;
mod enrich;
mod error;
mod metrics;
mod model;
mod names;
mod parser;
mod pipeline;
mod roster;
mod store;
mod summary;
mod utils;

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};
use tracing::info;

use crate::db::SqliteStore;
use crate::names::{Issue, NameTables};

#[derive(Parser)]
#[command(name = "ecd_extract", about = "Structured facts from the ECD dodgeball archive")]
struct Cli {
    /// Config file (default: ./ecd.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load fetched post dumps (<id>.json) and an optional sidebar dump into the database
    Import {
        /// Directory of post JSON files
        #[arg(short, long)]
        posts: PathBuf,
        /// Homepage sidebar text dump
        #[arg(short, long)]
        sidebar: Option<PathBuf>,
    },
    /// Run all five passes and write every collection
    Run {
        /// Name disambiguation dataset (overrides names_path)
        #[arg(short, long)]
        names: Option<PathBuf>,
    },
    /// Show the stored summary
    Stats,
    /// Resolve a player name the way the pipeline would
    Resolve {
        name: String,
        /// Surrounding text used to route ambiguous first names
        #[arg(short = 'x', long, default_value = "")]
        context: String,
        #[arg(short, long)]
        names: Option<PathBuf>,
    },
    /// List stored events
    Events {
        /// Max rows to display
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let (settings, thresholds) = config::load(cli.config.as_deref())?;

    let result = match cli.command {
        Commands::Import { posts, sidebar } => {
            let mut store = SqliteStore::open(&settings.db_path)?;
            let stats = corpus::import_dir(&mut store, &posts)?;
            if let Some(path) = sidebar {
                corpus::import_sidebar(&mut store, &path)?;
            }
            println!(
                "Imported {} post dumps ({} unreadable), {} posts in store.",
                stats.imported,
                stats.skipped,
                store.post_count()?
            );
            Ok(())
        }
        Commands::Run { names } => {
            let mut store = SqliteStore::open(&settings.db_path)?;
            let corpus = corpus::load(&store)?;
            if corpus.posts.is_empty() {
                println!("No posts in store. Run 'import' first.");
                return Ok(());
            }
            let names_path = names.or(settings.names_path);
            let tables = NameTables::load(names_path.as_deref())?;

            let collections = pipeline::run(&corpus, &tables, &thresholds)?;
            let written = collections.persist(&mut store)?;
            info!(collections = written.len(), db = ?settings.db_path, "Saved output");
            println!("{}", collections.summary.render_markdown());
            Ok(())
        }
        Commands::Stats => {
            let store = SqliteStore::open(&settings.db_path)?;
            println!("Posts in store: {}", store.post_count()?);
            for (name, count) in store.collection_counts()? {
                println!("  {:<14} {}", name, count);
            }
            match pipeline::load_summary(&store) {
                Ok(summary) => println!("\n{}", summary.render_markdown()),
                Err(error::EcdError::MissingCollection(_)) => {
                    println!("\nNo summary yet. Run 'run' first.")
                }
                Err(e) => return Err(e.into()),
            }
            Ok(())
        }
        Commands::Resolve { name, context, names } => {
            let names_path = names.or(settings.names_path);
            let tables = NameTables::load(names_path.as_deref())?;
            let res = tables.resolver().resolve(&name, &context);
            println!("{} -> {} ({})", name, res.canonical, res.basis.as_str());
            for issue in tables.issues_for(&res.canonical) {
                match issue {
                    Issue::SelfReference => println!("  note: catalogued as a self-reference"),
                    Issue::DuplicateOf(other) => println!("  note: duplicate spelling of {}", other),
                    Issue::SeparatedFrom(other) => println!("  note: kept distinct from {}", other),
                }
            }
            Ok(())
        }
        Commands::Events { limit } => {
            let store = SqliteStore::open(&settings.db_path)?;
            let events = match pipeline::load_events(&store) {
                Ok(events) => events,
                Err(error::EcdError::MissingCollection(_)) => Vec::new(),
                Err(e) => return Err(e.into()),
            };
            if events.is_empty() {
                println!("No events stored. Run 'run' first.");
                return Ok(());
            }

            println!(
                "{:>4} | {:<36} | {:<20} | {:>5} | {:>7} | {:>6} | {}",
                "#", "Event", "Date", "Posts", "Matches", "Attend", "Types"
            );
            println!("{}", "-".repeat(105));
            for e in events.iter().take(limit) {
                let attendance = e
                    .best_attendance
                    .map(|a| a.to_string())
                    .unwrap_or_else(|| "-".into());
                let types: Vec<String> = e.types.iter().map(|t| format!("{:?}", t).to_lowercase()).collect();
                println!(
                    "{:>4} | {:<36} | {:<20} | {:>5} | {:>7} | {:>6} | {}",
                    e.event_number,
                    truncate(&e.name, 36),
                    truncate(e.date.as_deref().unwrap_or("-"), 20),
                    e.post_ids.len(),
                    e.matches.len(),
                    attendance,
                    types.join(",")
                );
            }
            println!("\n{} events", events.len());
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
