//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr, eyre};
use notecraft_core::workflow::{self, SaveOptions, SaveOutcome};
use notecraft_core::{merge, review, synthesize};
use notecraft_markdown::{parse, stats};
use notecraft_shared::{AppConfig, Message, SaveMode, init_config, load_config};
use tracing::{info, warn};

use crate::store::{FsNoteStore, resolve_notes_dir};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Notecraft: turn Q&A sessions into structured study notes.
#[derive(Parser)]
#[command(
    name = "notecraft",
    version,
    about = "Turn interview-prep conversations into structured, mergeable study notes.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Build a fresh note from a transcript.
    Synthesize {
        /// Topic title of the note.
        #[arg(short, long)]
        topic: String,

        /// Transcript JSON: an array of {role, content, timestamp}.
        #[arg(long)]
        transcript: PathBuf,

        /// Write the note here instead of stdout.
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Merge a new note into an existing one.
    Merge {
        /// The freshly synthesized note.
        #[arg(long)]
        new: PathBuf,

        /// The stored note (omit for a first save).
        #[arg(long)]
        existing: Option<PathBuf>,

        /// Topic title of the merged note.
        #[arg(short, long)]
        topic: String,

        /// Write the merged note here instead of stdout.
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Self-review a note.
    Review {
        /// Note markdown file.
        file: PathBuf,

        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print the parsed structure of a note as JSON.
    Parse {
        /// Note markdown file.
        file: PathBuf,
    },

    /// Synthesize, merge, review and store a topic's note.
    Save {
        /// Topic title of the note.
        #[arg(short, long)]
        topic: String,

        /// Transcript JSON: an array of {role, content, timestamp}.
        #[arg(long)]
        transcript: PathBuf,

        /// Notes checkout (defaults to `defaults.notes_dir`).
        #[arg(long)]
        notes_dir: Option<PathBuf>,

        /// Save mode: direct-commit or summary-then-save.
        #[arg(short, long)]
        mode: Option<SaveMode>,

        /// Save even when the self-review reports critical issues.
        #[arg(long)]
        allow_critical: bool,
    },

    /// List stored notes grouped by category.
    List {
        /// Notes checkout (defaults to `defaults.notes_dir`).
        #[arg(long)]
        notes_dir: Option<PathBuf>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr so stdout stays
/// clean for note output.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "notecraft=info",
        1 => "notecraft=debug",
        _ => "notecraft=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Synthesize {
            topic,
            transcript,
            out,
        } => cmd_synthesize(&topic, &transcript, out.as_deref()).await,
        Command::Merge {
            new,
            existing,
            topic,
            out,
        } => cmd_merge(&new, existing.as_deref(), &topic, out.as_deref()).await,
        Command::Review { file, json } => cmd_review(&file, json).await,
        Command::Parse { file } => cmd_parse(&file).await,
        Command::Save {
            topic,
            transcript,
            notes_dir,
            mode,
            allow_critical,
        } => cmd_save(&topic, &transcript, notes_dir, mode, allow_critical).await,
        Command::List { notes_dir } => cmd_list(notes_dir).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_synthesize(topic: &str, transcript: &Path, out: Option<&Path>) -> Result<()> {
    let config = load_config()?;
    let messages = read_transcript(transcript).await?;
    info!(topic, messages = messages.len(), "synthesizing note");

    let note = synthesize(topic, &messages, &config.extraction);
    emit(&note, out).await
}

async fn cmd_merge(new: &Path, existing: Option<&Path>, topic: &str, out: Option<&Path>) -> Result<()> {
    let new_note = read_text(new).await?;
    let existing_note = match existing {
        Some(path) => Some(read_text(path).await?),
        None => None,
    };

    let merged = merge(existing_note.as_deref(), &new_note, topic);
    emit(&merged, out).await
}

async fn cmd_review(file: &Path, json: bool) -> Result<()> {
    let config = load_config()?;
    let note = read_text(file).await?;
    let report = review(&note, &config.review);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", report.summary);
    for issue in &report.issues {
        println!("  [{}] {}", issue.severity, issue.issue);
    }
    Ok(())
}

async fn cmd_parse(file: &Path) -> Result<()> {
    let note = read_text(file).await?;
    let doc = parse(&note);

    let sections: serde_json::Map<String, serde_json::Value> = doc
        .sections
        .iter()
        .map(|(kind, body)| (kind.heading().to_string(), body.clone().into()))
        .collect();
    let extra: Vec<serde_json::Value> = doc
        .extra
        .iter()
        .map(|(heading, body)| serde_json::json!({ "heading": heading, "body": body }))
        .collect();

    let value = serde_json::json!({
        "title": doc.title,
        "sections": sections,
        "extra": extra,
        "updated_on": doc.updated_on,
        "stats": stats(&doc),
    });
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

async fn cmd_save(
    topic: &str,
    transcript: &Path,
    notes_dir: Option<PathBuf>,
    mode: Option<SaveMode>,
    allow_critical: bool,
) -> Result<()> {
    let config = load_config()?;
    let messages = read_transcript(transcript).await?;
    let store = FsNoteStore::new(notes_root(notes_dir, &config)?);

    let options = SaveOptions {
        mode: mode.unwrap_or(config.defaults.save_mode),
        allow_critical,
    };
    info!(topic, root = %store.root().display(), mode = ?options.mode, "saving note");

    let outcome = workflow::save_topic(&store, topic, &messages, &config, options).await?;
    print_outcome(&outcome);
    Ok(())
}

fn print_outcome(outcome: &SaveOutcome) {
    if outcome.review.has_critical() {
        warn!(summary = %outcome.review.summary, "note saved with critical review issues");
    }

    println!();
    match &outcome.change_request {
        None => {
            let verb = if outcome.created { "created" } else { "updated" };
            println!("  Note {verb}!");
        }
        Some(_) => println!("  Draft ready (not written)."),
    }
    println!("  Topic:        {}", outcome.topic);
    println!("  Path:         {}", outcome.path);
    println!("  Concepts:     {}", outcome.stats.concepts);
    println!("  Key points:   {}", outcome.stats.key_points);
    println!("  Code samples: {}", outcome.stats.code_samples);
    println!("  Pitfalls:     {}", outcome.stats.pitfalls);
    println!("  Review:       {}", outcome.review.summary);
    for issue in &outcome.review.issues {
        println!("    [{}] {}", issue.severity, issue.issue);
    }

    if let Some(request) = &outcome.change_request {
        println!();
        println!("  Branch:  {}", request.branch);
        println!("  Commit:  {}", request.commit_message);
        println!("  Title:   {}", request.title);
        println!();
        println!("{}", request.body);
        println!();
        println!("{}", outcome.content);
    }
    println!();
}

async fn cmd_list(notes_dir: Option<PathBuf>) -> Result<()> {
    let config = load_config()?;
    let store = FsNoteStore::new(notes_root(notes_dir, &config)?);

    let groups = workflow::list_topics(&store).await?;
    if groups.is_empty() {
        println!("No notes in {}", store.root().display());
        return Ok(());
    }

    for (category, names) in &groups {
        println!("{category} ({})", names.len());
        for name in names {
            println!("  {name}");
        }
    }
    Ok(())
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn notes_root(flag: Option<PathBuf>, config: &AppConfig) -> Result<PathBuf> {
    match flag {
        Some(dir) => Ok(dir),
        None => Ok(resolve_notes_dir(&config.defaults.notes_dir)?),
    }
}

async fn read_text(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .wrap_err_with(|| format!("failed to read {}", path.display()))
}

async fn read_transcript(path: &Path) -> Result<Vec<Message>> {
    let content = read_text(path).await?;
    let messages = Message::parse_transcript(&content)
        .wrap_err_with(|| format!("failed to load transcript {}", path.display()))?;
    if messages.is_empty() {
        return Err(eyre!("transcript {} contains no messages", path.display()));
    }
    Ok(messages)
}

async fn emit(content: &str, out: Option<&Path>) -> Result<()> {
    match out {
        Some(path) => {
            tokio::fs::write(path, content)
                .await
                .wrap_err_with(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), "note written");
        }
        None => print!("{content}"),
    }
    Ok(())
}
