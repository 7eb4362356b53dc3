//! Vocab CLI
//!
//! Command-line interface for Vocab - a personal vocabulary trainer.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use vocab_core::{Category, Config, Entry, EntryEdit, Store, StoreError};

mod commands;
mod editor;
mod output;
mod speech;

use commands::entry::SortKey;
use output::{Output, OutputFormat};
use speech::{CommandSpeaker, Speaker};

#[derive(Parser)]
#[command(name = "vocab")]
#[command(about = "Vocab - Personal vocabulary trainer")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Debug logging (overrides VOCAB_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use this config file instead of the default
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new word
    Add {
        /// English word
        word: String,
        /// Translation in the learning language
        translation: String,
        /// Learning language
        #[arg(short, long)]
        language: String,
        /// Category
        #[arg(short, long)]
        category: Option<Category>,
        /// Notes (basic HTML allowed)
        #[arg(short, long)]
        notes: Option<String>,
    },
    /// List words
    #[command(alias = "ls")]
    List {
        /// Only this language
        #[arg(short, long)]
        language: Option<String>,
        /// Only this category
        #[arg(short, long)]
        category: Option<Category>,
        /// Sort column
        #[arg(short, long, value_enum, default_value_t = SortKey::Word)]
        sort: SortKey,
        /// Sort descending
        #[arg(long)]
        desc: bool,
    },
    /// Show a word with its notes
    Show {
        word: String,
        #[arg(short, long)]
        language: String,
    },
    /// Edit a word (opens editor for notes if no flags given)
    Edit {
        word: String,
        #[arg(short, long)]
        language: String,
        /// New category
        #[arg(short, long)]
        category: Option<Category>,
        /// New translation
        #[arg(short, long)]
        translation: Option<String>,
        /// New notes
        #[arg(short, long)]
        notes: Option<String>,
    },
    /// Delete a word
    #[command(alias = "rm")]
    Delete {
        word: String,
        #[arg(short, long)]
        language: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Reset a word's points to zero
    Reset {
        word: String,
        #[arg(short, long)]
        language: String,
    },
    /// List words due for review
    Due {
        #[arg(short, long)]
        language: String,
        #[arg(short, long)]
        category: Option<Category>,
    },
    /// Start a learning session
    Review {
        #[arg(short, long)]
        language: String,
        #[arg(short, long)]
        category: Option<Category>,
        /// Read each answer aloud
        #[arg(long)]
        speak: bool,
    },
    /// Export words to a JSON file
    Export {
        /// Only this language
        #[arg(short, long)]
        language: Option<String>,
        /// Only this category
        #[arg(short, long)]
        category: Option<Category>,
        /// Output file (default: <language>_words.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Include notes
        #[arg(long)]
        with_notes: bool,
    },
    /// Import words from a JSON file
    Import {
        /// File written by `vocab export`
        file: PathBuf,
    },
    /// List categories
    Categories,
    /// List languages in the word list
    Languages,
    /// Show storage and review status
    Status,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, backend, scoring, export_notes, speech_command, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    match run(cli, &output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            if let Some(hint) = recovery_suggestion(&e) {
                eprintln!("{}", hint);
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, output: &Output) -> Result<()> {
    let config_path = cli.config.as_ref();

    // Config commands work even when the store can't be opened
    if let Commands::Config { command } = &cli.command {
        return match command {
            Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
            Some(ConfigCommands::Set { key, value }) => {
                commands::config::set(key.clone(), value.clone(), config_path, output)
            }
        };
    }

    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;
    init_logging(&config, cli.verbose);

    let mut store = Store::open_with_config(&config).context("Failed to open word list")?;
    debug!("Using {} store at {}", store.backend_name(), store.location());

    match cli.command {
        Commands::Add {
            word,
            translation,
            language,
            category,
            notes,
        } => {
            let entry = Entry::new(word, language, translation)
                .with_category(category.unwrap_or_default())
                .with_notes(notes.unwrap_or_default());
            commands::entry::add(&mut store, entry, output)
        }
        Commands::List {
            language,
            category,
            sort,
            desc,
        } => commands::entry::list(&store, language, category, sort, desc, output),
        Commands::Show { word, language } => commands::entry::show(&store, word, language, output),
        Commands::Edit {
            word,
            language,
            category,
            translation,
            notes,
        } => {
            let changes = EntryEdit {
                category,
                single_translation: translation,
                long_translation: notes,
            };
            commands::entry::edit(&mut store, word, language, changes, output)
        }
        Commands::Delete {
            word,
            language,
            yes,
        } => commands::entry::delete(&mut store, word, language, yes, output),
        Commands::Reset { word, language } => {
            commands::entry::reset(&mut store, word, language, output)
        }
        Commands::Due { language, category } => {
            commands::review::due(&store, language, category, output)
        }
        Commands::Review {
            language,
            category,
            speak,
        } => {
            let speaker = if speak {
                CommandSpeaker::detect(config.speech_command.as_deref())
            } else {
                CommandSpeaker::disabled()
            };
            if speak && !speaker.is_ready() {
                output.message("No speech engine found; continuing without speech.");
            }
            commands::review::review(&mut store, language, category, &speaker, output)
        }
        Commands::Export {
            language,
            category,
            output: path,
            with_notes,
        } => commands::transfer::export(
            &store,
            language,
            category,
            path,
            with_notes || config.export_notes,
            output,
        ),
        Commands::Import { file } => commands::transfer::import(&mut store, file, output),
        Commands::Categories => commands::status::categories(output),
        Commands::Languages => commands::status::languages(&store, output),
        Commands::Status => commands::status::show(&store, output),
        Commands::Config { .. } => unreachable!(), // Handled above
    }?;

    store.close().context("Failed to close word list")?;
    Ok(())
}

/// Suggestion for the first store or storage error in the chain
fn recovery_suggestion(error: &anyhow::Error) -> Option<&'static str> {
    error
        .chain()
        .find_map(|cause| cause.downcast_ref::<StoreError>())
        .and_then(StoreError::recovery_suggestion)
}

/// Initialize logging
///
/// Level comes from VOCAB_LOG (default warn), or debug with --verbose.
/// Logs go to config.log_file when set, stderr otherwise.
fn init_logging(config: &Config, verbose: bool) {
    let log_level = if verbose {
        "debug".to_string()
    } else {
        std::env::var("VOCAB_LOG").unwrap_or_else(|_| "warn".to_string())
    };
    let env_filter = EnvFilter::new(format!("vocab_core={},vocab_cli={}", log_level, log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false);

    let Some(log_path) = &config.log_file else {
        let _ = builder.with_writer(std::io::stderr).try_init();
        return;
    };

    match OpenOptions::new().create(true).append(true).open(log_path) {
        Ok(file) => {
            let _ = builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init();
            info!("Logging to {:?}", log_path);
        }
        Err(e) => {
            eprintln!("Warning: Could not open log file {:?}: {}", log_path, e);
            let _ = builder.with_writer(std::io::stderr).try_init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_add_with_category() {
        let cli = Cli::try_parse_from([
            "vocab", "add", "dog", "perro", "-l", "Spanish", "-c", "animals",
        ])
        .unwrap();
        match cli.command {
            Commands::Add {
                word,
                category,
                language,
                ..
            } => {
                assert_eq!(word, "dog");
                assert_eq!(language, "Spanish");
                assert_eq!(category, Some(Category::Animals));
            }
            _ => panic!("expected add"),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_category() {
        assert!(Cli::try_parse_from(["vocab", "due", "-l", "Spanish", "-c", "planets"]).is_err());
    }

    #[test]
    fn test_parse_list_sort() {
        let cli = Cli::try_parse_from(["vocab", "ls", "--sort", "last-tested", "--desc"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::List {
                sort: SortKey::LastTested,
                desc: true,
                ..
            }
        ));
    }

    #[test]
    fn test_recovery_suggestion_through_context() {
        let err = anyhow::Error::from(StoreError::AlreadyExists {
            english_word: "dog".into(),
            learning_language: "Spanish".into(),
        })
        .context("Failed to add word");
        assert!(recovery_suggestion(&err).is_some());
    }
}
