use anyhow::{Context, Result};
use blockedit::ast::Node;
use blockedit::buffer::atomic_write;
use blockedit::config::{
    apply_script, load_config_from_path, load_script_from_path, ApplicationError, EditorConfig,
};
use blockedit::{EditError, Session, SexprParser, StringBuffer};
use clap::{Parser, Subcommand};
use colored::Colorize;
use similar::{ChangeTag, TextDiff};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "blockedit")]
#[command(about = "Structural editing for s-expression documents", long_about = None)]
#[command(version)]
struct Cli {
    /// Editor settings (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pretty-print a document
    Fmt {
        file: PathBuf,

        /// Target line width (overrides the config file)
        #[arg(short, long)]
        width: Option<usize>,

        /// Rewrite the file in place instead of printing
        #[arg(short = 'W', long)]
        write: bool,
    },

    /// Show the identified tree
    Tree {
        file: PathBuf,

        /// Emit JSON instead of an indented outline
        #[arg(long)]
        json: bool,
    },

    /// Check that a document parses
    Check { file: PathBuf },

    /// Apply an edit script as one transaction
    Apply {
        file: PathBuf,

        /// Edit script (TOML)
        #[arg(short, long)]
        script: PathBuf,

        /// Dry run - show what would change without writing the file
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => load_config_from_path(path)?,
        None => EditorConfig::default(),
    };

    match cli.command {
        Commands::Fmt { file, width, write } => cmd_fmt(&file, config, width, write),
        Commands::Tree { file, json } => cmd_tree(&file, config, json),
        Commands::Check { file } => cmd_check(&file, config),
        Commands::Apply {
            file,
            script,
            dry_run,
            diff,
        } => cmd_apply(&file, &script, config, dry_run, diff),
    }
}

fn open(file: &Path, config: EditorConfig) -> Result<Session<SexprParser>> {
    let text = fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    Session::new(StringBuffer::new(text), SexprParser, config)
        .with_context(|| format!("{} does not parse", file.display()))
}

/// Helper: Show unified diff between original and modified content
fn display_diff(file: &Path, original: &str, modified: &str) {
    println!(
        "\n{}",
        format!("--- {} (original)", file.display()).dimmed()
    );
    println!("{}", format!("+++ {} (edited)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => format!(" {}", change).normal(),
        };
        print!("{}", sign);
    }
    if !modified.ends_with('\n') {
        println!();
    }
}

fn cmd_fmt(file: &Path, config: EditorConfig, width: Option<usize>, write: bool) -> Result<()> {
    let session = open(file, config)?;
    let width = width.unwrap_or(config.pretty_width);
    let mut formatted = session.ast().pretty_print(width);
    if !formatted.is_empty() {
        formatted.push('\n');
    }

    if !write {
        print!("{formatted}");
        return Ok(());
    }

    if formatted == session.text() {
        println!("{} {}: already formatted", "⊙".yellow(), file.display());
        return Ok(());
    }
    atomic_write(file, &formatted)
        .with_context(|| format!("failed to write {}", file.display()))?;
    println!("{} {}: formatted", "✓".green(), file.display());
    Ok(())
}

fn cmd_tree(file: &Path, config: EditorConfig, json: bool) -> Result<()> {
    let session = open(file, config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(session.ast())?);
        return Ok(());
    }

    fn outline(node: &Node, depth: usize) {
        let label = match node.symbol() {
            Some(symbol) => format!("{} {}", node.kind_name(), symbol.bold()),
            None => node.kind_name().to_string(),
        };
        println!(
            "{}{} {} {}",
            "  ".repeat(depth),
            node.id.to_string().dimmed(),
            label,
            node.span.to_string().dimmed()
        );
        for child in node.children() {
            outline(child, depth + 1);
        }
    }

    for root in session.ast().roots() {
        outline(root, 0);
    }
    Ok(())
}

fn cmd_check(file: &Path, config: EditorConfig) -> Result<()> {
    let session = open(file, config)?;
    println!(
        "{} {}: {} roots, {} nodes",
        "✓".green(),
        file.display(),
        session.ast().roots().len(),
        session.ast().len()
    );
    Ok(())
}

fn cmd_apply(
    file: &Path,
    script: &Path,
    config: EditorConfig,
    dry_run: bool,
    show_diff: bool,
) -> Result<()> {
    let mut session = open(file, config)?;
    let script = load_script_from_path(script)?;
    let original = session.text();

    if dry_run {
        println!("{}", "[DRY RUN - showing what would be applied]".cyan());
    }

    let committed = match apply_script(&mut session, &script) {
        Ok(committed) => committed,
        Err(e) => {
            eprintln!("{} {}: {}", "✗".red(), file.display(), e);
            if let ApplicationError::Edit {
                source: EditError::Parse(_),
                ..
            } = &e
            {
                eprintln!("  {}", "Edited document would not parse".red());
            }
            eprintln!("  The document was not modified.");
            std::process::exit(1);
        }
    };

    let edited = session.text();
    if show_diff && edited != original {
        display_diff(file, &original, &edited);
    }

    let verb = if dry_run { "Would apply" } else { "Applied" };
    println!(
        "{} {} {} edit(s), {} text change(s) to {}",
        "✓".green(),
        verb,
        script.edits.len(),
        committed.changes.len(),
        file.display()
    );

    if !dry_run && edited != original {
        atomic_write(file, &edited)
            .with_context(|| format!("failed to write {}", file.display()))?;
    }
    Ok(())
}
