//! Unit tests for the `inkpost-maint` entrypoint module.

use super::{
    format_combined, format_posts, format_summary, mutating_args, parse_positive_usize, Cli,
    Commands,
};
use clap::Parser;
use inkpost_core::models::{Author, Post};
use inkpost_core::repair::{CombinedSummary, RepairSummary};
use serde_json::Value;

fn sample_post(title: &str, email: Option<&str>) -> Post {
    Post {
        id: "p1".to_string(),
        title: title.to_string(),
        slug: String::new(),
        excerpt: String::new(),
        content: String::new(),
        author: Author {
            name: "Ada".to_string(),
            avatar: "/default-avatar.png".to_string(),
            email: email.map(str::to_string),
        },
        user_id: None,
        categories: Vec::new(),
        published_at: "2024-01-01T00:00:00Z".to_string(),
        cover_image: String::new(),
        reading_time: "1 min read".to_string(),
    }
}

#[test]
fn repair_subcommands_parse_shared_flags() {
    let cli = Cli::try_parse_from(["inkpost-maint", "backfill-emails", "--dry-run", "--json"])
        .expect("parse");
    let args = mutating_args(&cli.command).expect("mutating command");
    assert!(args.dry_run);
    assert!(args.json);
    assert!(!args.backup);

    let cli = Cli::try_parse_from(["inkpost-maint", "--db-path", "/tmp/x", "repair-all", "--backup"])
        .expect("parse");
    assert_eq!(cli.db_path.as_deref(), Some("/tmp/x"));
    assert!(mutating_args(&cli.command).expect("mutating").backup);
}

#[test]
fn read_only_subcommands_are_not_mutating() {
    for argv in [
        vec!["inkpost-maint", "posts"],
        vec!["inkpost-maint", "warm-index"],
        vec!["inkpost-maint", "list-indexes"],
    ] {
        let cli = Cli::try_parse_from(argv.clone()).expect("parse");
        assert!(mutating_args(&cli.command).is_none(), "argv: {:?}", argv);
    }
}

#[test]
fn warm_index_defaults_recipient() {
    let cli = Cli::try_parse_from(["inkpost-maint", "warm-index"]).expect("parse");
    match cli.command {
        Commands::WarmIndex { recipient } => assert_eq!(recipient, "probe@example.com"),
        _ => panic!("expected warm-index"),
    }
}

#[test]
fn seed_demo_rejects_zero_posts() {
    assert!(Cli::try_parse_from(["inkpost-maint", "seed-demo", "--posts", "0"]).is_err());
    assert_eq!(parse_positive_usize("7"), Ok(7));
    assert!(parse_positive_usize("seven").is_err());
}

#[test]
fn summary_formats_text_and_json() {
    let summary = RepairSummary {
        updated: 1,
        skipped: 2,
    };
    assert_eq!(
        format_summary("author email backfill", &summary, false, false),
        "author email backfill: 1 updated, 2 skipped (3 examined)"
    );
    assert_eq!(
        format_summary("author email backfill", &summary, true, false),
        "author email backfill (dry run): 1 updated, 2 skipped (3 examined)"
    );

    let parsed: Value =
        serde_json::from_str(&format_summary("x", &summary, false, true)).expect("json");
    assert_eq!(parsed["updated"], 1);
    assert_eq!(parsed["skipped"], 2);
    assert_eq!(parsed["dryRun"], false);
}

#[test]
fn combined_summary_json_nests_both_steps() {
    let combined = CombinedSummary {
        structure: RepairSummary {
            updated: 3,
            skipped: 0,
        },
        emails: RepairSummary {
            updated: 1,
            skipped: 2,
        },
    };
    let parsed: Value = serde_json::from_str(&format_combined(&combined, false, true)).expect("json");
    assert_eq!(parsed["structure"]["updated"], 3);
    assert_eq!(parsed["emails"]["skipped"], 2);
    assert_eq!(format_combined(&combined, false, false).lines().count(), 2);
}

#[test]
fn posts_format_marks_untitled_and_missing_email() {
    assert_eq!(format_posts(&[], false).expect("format"), "No posts found.");

    let text = format_posts(&[sample_post("", None)], false).expect("format");
    assert!(text.contains("(untitled)"));
    assert!(text.contains("<no email>"));

    let json = format_posts(&[sample_post("Hi", Some("ada@x.org"))], true).expect("format");
    let parsed: Value = serde_json::from_str(&json).expect("json");
    assert_eq!(parsed[0]["author"]["email"], "ada@x.org");
    assert_eq!(parsed[0]["readingTime"], "1 min read");
}
