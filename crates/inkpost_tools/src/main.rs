//! Maintenance CLI for the Inkpost blog database.
//!
//! Each subcommand is a one-shot batch job: it opens the database once, runs a
//! single utility against it, prints a summary and exits.
//!
//! # Usage
//!
//! ```bash
//! # Show posts as the site would render them
//! cargo run -p inkpost_tools -- posts
//!
//! # Preview, then apply, the author email backfill
//! cargo run -p inkpost_tools -- backfill-emails --dry-run
//! cargo run -p inkpost_tools -- backfill-emails --backup
//!
//! # Check for the notifications feed index, then create it
//! cargo run -p inkpost_tools -- warm-index
//! cargo run -p inkpost_tools -- create-index --collection notifications \
//!     --fields recipientEmail:asc,createdAt:desc
//!
//! # Use a scratch database with demo data
//! DB_PATH=/tmp/inkpost-demo cargo run -p inkpost_tools -- seed-demo --clear
//! ```

mod seed;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use inkpost_core::constants::DEFAULT_PROBE_RECIPIENT;
use inkpost_core::db::backup::BackupManager;
use inkpost_core::db::IndexDefinition;
use inkpost_core::index_warmup::warm_up_notification_index;
use inkpost_core::models::Post;
use inkpost_core::reader::list_posts;
use inkpost_core::repair::{
    backfill_author_emails, refresh_author_emails, repair_all, repair_author_structure,
    CombinedSummary, RepairOptions, RepairSummary,
};
use inkpost_core::{Config, Database};
use serde_json::json;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "inkpost-maint", about = "Inkpost blog data maintenance", version)]
struct Cli {
    /// Database directory (overrides DB_PATH)
    #[arg(long, global = true)]
    db_path: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every post with defaults applied
    Posts {
        /// Print posts as JSON
        #[arg(long)]
        json: bool,
    },
    /// Fill in missing author emails (user record, else placeholder)
    BackfillEmails(RepairArgs),
    /// Rebuild missing author objects from legacy fields
    RepairAuthors(RepairArgs),
    /// Copy missing author emails from user records
    RefreshEmails(RepairArgs),
    /// Repair author objects, then backfill emails
    RepairAll(RepairArgs),
    /// Probe the notifications feed index
    WarmIndex {
        /// Recipient email used in the probe query
        #[arg(long, default_value = DEFAULT_PROBE_RECIPIENT)]
        recipient: String,
    },
    /// Register a composite index
    CreateIndex {
        #[arg(long)]
        collection: String,
        /// Field list, e.g. `recipientEmail:asc,createdAt:desc`
        #[arg(long)]
        fields: String,
    },
    /// List registered composite indexes
    ListIndexes,
    /// Write demo posts, users and notifications
    SeedDemo {
        /// Number of posts to generate
        #[arg(long, default_value_t = 24, value_parser = parse_positive_usize)]
        posts: usize,
        /// Empty the demo collections first
        #[arg(long)]
        clear: bool,
    },
}

#[derive(Args, Debug, Clone, Copy)]
struct RepairArgs {
    /// Classify and report without writing
    #[arg(long)]
    dry_run: bool,
    /// Copy the database file aside before writing
    #[arg(long)]
    backup: bool,
    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

impl RepairArgs {
    fn options(self) -> RepairOptions {
        RepairOptions {
            dry_run: self.dry_run,
        }
    }
}

fn parse_positive_usize(raw: &str) -> Result<usize, String> {
    let parsed = raw
        .parse::<usize>()
        .map_err(|_| format!("invalid integer value '{}'", raw))?;
    if parsed == 0 {
        Err("value must be greater than zero".to_string())
    } else {
        Ok(parsed)
    }
}

fn format_summary(label: &str, summary: &RepairSummary, dry_run: bool, json: bool) -> String {
    if json {
        return json!({
            "utility": label,
            "dryRun": dry_run,
            "updated": summary.updated,
            "skipped": summary.skipped,
        })
        .to_string();
    }
    let mode = if dry_run { " (dry run)" } else { "" };
    format!(
        "{}{}: {} updated, {} skipped ({} examined)",
        label,
        mode,
        summary.updated,
        summary.skipped,
        summary.total()
    )
}

fn format_combined(summary: &CombinedSummary, dry_run: bool, json: bool) -> String {
    if json {
        return json!({
            "utility": "repair-all",
            "dryRun": dry_run,
            "structure": summary.structure,
            "emails": summary.emails,
        })
        .to_string();
    }
    [
        format_summary("author structure", &summary.structure, dry_run, false),
        format_summary("author emails", &summary.emails, dry_run, false),
    ]
    .join("\n")
}

fn format_posts(posts: &[Post], json: bool) -> anyhow::Result<String> {
    if json {
        return serde_json::to_string_pretty(posts).context("encoding posts");
    }
    if posts.is_empty() {
        return Ok("No posts found.".to_string());
    }
    let rows = posts
        .iter()
        .map(|post| {
            format!(
                "{}  {}  by {} <{}>  {}",
                post.id,
                if post.title.is_empty() { "(untitled)" } else { post.title.as_str() },
                post.author.name,
                post.author.email.as_deref().unwrap_or("no email"),
                post.published_at
            )
        })
        .collect::<Vec<_>>();
    Ok(rows.join("\n"))
}

fn mutating_args(command: &Commands) -> Option<RepairArgs> {
    match command {
        Commands::BackfillEmails(args)
        | Commands::RepairAuthors(args)
        | Commands::RefreshEmails(args)
        | Commands::RepairAll(args) => Some(*args),
        _ => None,
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::from_env();
    if let Some(db_path) = cli.db_path {
        config.db_path = db_path;
    }
    tracing::info!("Using database at {}", config.db_path);

    if let Some(args) = mutating_args(&cli.command) {
        if !args.dry_run && (args.backup || config.auto_backup) {
            match BackupManager::new(&config.db_path).create_backup()? {
                Some(path) => println!("Backup written to {}", path.display()),
                None => println!("No existing database to back up"),
            }
        }
    }

    let db = Database::open(&config)
        .with_context(|| format!("opening database at {}", config.db_path))?;

    match cli.command {
        Commands::Posts { json } => {
            let posts = list_posts(&db)?;
            println!("{}", format_posts(&posts, json)?);
        }
        Commands::BackfillEmails(args) => {
            let summary = backfill_author_emails(&db, args.options())?;
            println!(
                "{}",
                format_summary("author email backfill", &summary, args.dry_run, args.json)
            );
        }
        Commands::RepairAuthors(args) => {
            let summary = repair_author_structure(&db, args.options())?;
            println!(
                "{}",
                format_summary("author structure repair", &summary, args.dry_run, args.json)
            );
        }
        Commands::RefreshEmails(args) => {
            let summary = refresh_author_emails(&db, args.options())?;
            println!(
                "{}",
                format_summary("author email refresh", &summary, args.dry_run, args.json)
            );
        }
        Commands::RepairAll(args) => {
            let summary = repair_all(&db, args.options())?;
            println!("{}", format_combined(&summary, args.dry_run, args.json));
        }
        Commands::WarmIndex { recipient } => {
            let ready = warm_up_notification_index(&db, &recipient);
            println!("notifications index ready: {}", ready);
        }
        Commands::CreateIndex { collection, fields } => {
            let index = IndexDefinition::parse(&collection, &fields)?;
            if db.create_index(&index)? {
                println!("Created index {}", index.id());
            } else {
                println!("Index {} already exists", index.id());
            }
        }
        Commands::ListIndexes => {
            let indexes = db.list_indexes()?;
            if indexes.is_empty() {
                println!("No composite indexes registered.");
            }
            for index in indexes {
                println!("{}", index.id());
            }
        }
        Commands::SeedDemo { posts, clear } => {
            let report = seed::seed_demo_data(&db, posts, clear)?;
            println!(
                "Seeded {} posts, {} users, {} notifications",
                report.posts, report.users, report.notifications
            );
        }
    }
    Ok(())
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "inkpost=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    if let Err(err) = run(Cli::parse()) {
        eprintln!("error: {:#}", err);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests;
