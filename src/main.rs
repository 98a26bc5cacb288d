use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use similar::{ChangeTag, TextDiff};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use structedit::diff::line_changes;
use structedit::{load_from_path, Editor, EditorConfig, Language, SaveOutcome};
use tracing_subscriber::EnvFilter;

const CONFIG_FILE: &str = ".structedit.toml";

#[derive(Parser)]
#[command(name = "structedit")]
#[command(about = "Structural editing of source files by element name", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to ./.structedit.toml, then ~/.structedit.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override language detection (python, javascript, text)
    #[arg(short, long, global = true)]
    language: Option<Language>,

    /// Source file to operate on
    file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List indexed element names
    List,

    /// Print the current source of an element
    Show { name: String },

    /// Describe an element and its body statements
    Structure {
        name: String,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Print the body statements overlapping a line range
    Snippet {
        name: String,
        line_start: usize,
        line_end: usize,
    },

    /// Replace an element with new code
    Replace {
        name: String,

        #[command(flatten)]
        edit: EditArgs,
    },

    /// Insert new code next to an anchor element
    Add {
        /// Element to insert next to (defaults to before the entry guard or end of file)
        #[arg(long)]
        anchor: Option<String>,

        /// Insert before the anchor instead of after it
        #[arg(long)]
        before: bool,

        #[command(flatten)]
        edit: EditArgs,
    },

    /// Delete an element
    Delete {
        name: String,

        /// Persist the result to the file
        #[arg(short, long)]
        write: bool,
    },

    /// Replace part of an element's body
    Partial {
        name: String,

        /// First line of the range (1-based)
        #[arg(long)]
        line_start: Option<usize>,

        /// Last line of the range (defaults to the first)
        #[arg(long)]
        line_end: Option<usize>,

        /// Body statement index (0-based); wins over the line range
        #[arg(long)]
        statement: Option<usize>,

        #[command(flatten)]
        edit: EditArgs,
    },

    /// Replace the whole file, validating that it still parses
    Rewrite {
        #[command(flatten)]
        edit: EditArgs,
    },

    /// Print a unified diff between the file and another version of it
    Diff { against: PathBuf },
}

#[derive(Args)]
struct EditArgs {
    /// New code (read from stdin when omitted)
    #[arg(long)]
    code: Option<String>,

    /// Persist the result to the file
    #[arg(short, long)]
    write: bool,
}

impl EditArgs {
    fn code(&self) -> Result<String> {
        match &self.code {
            Some(code) => Ok(code.clone()),
            None => {
                let mut buf = String::new();
                io::stdin()
                    .read_to_string(&mut buf)
                    .context("failed to read code from stdin")?;
                Ok(buf)
            }
        }
    }
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = resolve_config(cli.config.as_deref())?;
    let mut editor = match cli.language {
        Some(language) => Editor::open_as(&cli.file, language, config)?,
        None => Editor::open_with_config(&cli.file, config)?,
    };

    match cli.command {
        Commands::List => {
            for name in editor.list_elements() {
                println!("{name}");
            }
            Ok(ExitCode::SUCCESS)
        }

        Commands::Show { name } => match editor.get_source(&name) {
            Some(source) => {
                print!("{source}");
                if !source.ends_with('\n') {
                    println!();
                }
                Ok(ExitCode::SUCCESS)
            }
            None => Ok(unknown_element(&editor, &name)),
        },

        Commands::Structure { name, json } => cmd_structure(&editor, &name, json),

        Commands::Snippet {
            name,
            line_start,
            line_end,
        } => match editor.get_body_snippet(&name, line_start, line_end) {
            Some(snippet) => {
                println!("{snippet}");
                Ok(ExitCode::SUCCESS)
            }
            None if editor.get_source(&name).is_none() => Ok(unknown_element(&editor, &name)),
            None => {
                eprintln!(
                    "{} no body statement of '{}' overlaps lines {}-{}",
                    "✗".red(),
                    name,
                    line_start,
                    line_end
                );
                Ok(ExitCode::FAILURE)
            }
        },

        Commands::Replace { name, edit } => {
            let code = edit.code()?;
            let applied = editor.replace_element(&name, &code);
            finish_edit(&editor, "replace", Some(&name), applied, edit.write)
        }

        Commands::Add {
            anchor,
            before,
            edit,
        } => {
            let code = edit.code()?;
            let applied = editor.add_element(&code, anchor.as_deref(), before);
            finish_edit(&editor, "add", anchor.as_deref(), applied, edit.write)
        }

        Commands::Delete { name, write } => {
            let applied = editor.delete_element(&name);
            finish_edit(&editor, "delete", Some(&name), applied, write)
        }

        Commands::Partial {
            name,
            line_start,
            line_end,
            statement,
            edit,
        } => {
            if line_start.is_none() && statement.is_none() {
                anyhow::bail!("partial needs --statement or --line-start");
            }
            let code = edit.code()?;
            let applied = editor.replace_partial(&name, &code, line_start, line_end, statement);
            finish_edit(&editor, "partial", Some(&name), applied, edit.write)
        }

        Commands::Rewrite { edit } => {
            let code = edit.code()?;
            let applied = editor.replace_source(&code);
            finish_edit(&editor, "rewrite", None, applied, edit.write)
        }

        Commands::Diff { against } => {
            let other = std::fs::read_to_string(&against)
                .with_context(|| format!("failed to read {}", against.display()))?;
            if !editor.replace_source(&other) {
                eprintln!(
                    "{} {} does not parse as {}",
                    "✗".red(),
                    against.display(),
                    editor.language()
                );
                return Ok(ExitCode::FAILURE);
            }
            print!("{}", editor.diff());
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Resolve configuration.
///
/// Priority order:
/// 1. Explicit --config flag
/// 2. `.structedit.toml` in the current directory
/// 3. `.structedit.toml` in the home directory
/// 4. Built-in defaults
fn resolve_config(explicit: Option<&Path>) -> Result<EditorConfig> {
    if let Some(path) = explicit {
        return Ok(load_from_path(path)?);
    }

    let candidates = std::iter::once(PathBuf::from(CONFIG_FILE))
        .chain(home::home_dir().map(|home| home.join(CONFIG_FILE)));
    for candidate in candidates {
        if candidate.is_file() {
            tracing::debug!(path = %candidate.display(), "using config");
            return Ok(load_from_path(&candidate)?);
        }
    }
    Ok(EditorConfig::default())
}

fn cmd_structure(editor: &Editor, name: &str, json: bool) -> Result<ExitCode> {
    let Some(structure) = editor.get_structure(name) else {
        return Ok(unknown_element(editor, name));
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&structure)?);
        return Ok(ExitCode::SUCCESS);
    }

    println!(
        "{} {} lines {}-{}",
        structure.kind.bold(),
        structure.name,
        structure.line_start,
        structure.line_end
    );
    for item in &structure.body_items {
        let tag = item.tag.as_deref().unwrap_or("");
        println!(
            "  [{}] {:<16} {}-{} {}",
            item.index,
            item.kind,
            item.line_start,
            item.line_end,
            tag.dimmed()
        );
    }
    Ok(ExitCode::SUCCESS)
}

/// Report an edit: diff on success, optional save, exit status 1 on refusal.
fn finish_edit(
    editor: &Editor,
    operation: &str,
    name: Option<&str>,
    applied: bool,
    write: bool,
) -> Result<ExitCode> {
    if !applied {
        match name {
            Some(name) if editor.get_source(name).is_none() => {
                return Ok(unknown_element(editor, name));
            }
            _ => {
                eprintln!(
                    "{} {} rejected; source left unchanged (RUST_LOG=structedit=debug shows why)",
                    "✗".red(),
                    operation
                );
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    let modified = editor.modified_source();
    display_diff(editor.original_source(), &modified);
    let (added, removed) = line_changes(editor.original_source(), &modified);
    println!(
        "{} {}, {} {}",
        added.to_string().green(),
        "added".dimmed(),
        removed.to_string().red(),
        "removed".dimmed()
    );

    if write {
        match editor.save()? {
            SaveOutcome::Unchanged { path } => {
                println!("{} {} unchanged", "✓".green(), path.display());
            }
            SaveOutcome::Written { path, bytes, backup } => {
                println!("{} wrote {} ({} bytes)", "✓".green(), path.display(), bytes);
                if let Some(backup) = backup {
                    println!("  {}", format!("backup: {}", backup.display()).dimmed());
                }
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn display_diff(original: &str, modified: &str) {
    let diff = TextDiff::from_lines(original, modified);
    for change in diff.iter_all_changes() {
        let line = match change.tag() {
            ChangeTag::Delete => format!("-{change}").red(),
            ChangeTag::Insert => format!("+{change}").green(),
            ChangeTag::Equal => continue,
        };
        print!("{line}");
        if change.missing_newline() {
            println!();
        }
    }
}

fn unknown_element(editor: &Editor, name: &str) -> ExitCode {
    eprintln!("{} element not found: {}", "✗".red(), name);
    if let Some(suggestion) = closest_name(&editor.list_elements(), name) {
        eprintln!("  did you mean '{}'?", suggestion.yellow());
    }
    ExitCode::FAILURE
}

fn closest_name<'a>(names: &'a [String], name: &str) -> Option<&'a str> {
    names
        .iter()
        .map(|candidate| (candidate, strsim::jaro_winkler(candidate, name)))
        .filter(|(_, score)| *score >= 0.8)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(candidate, _)| candidate.as_str())
}
