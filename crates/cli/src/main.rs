// reconmap CLI - headless form for two-source reconciliation mapping configs
// Each invocation is one interaction: load session, apply one change, save.

mod exit_codes;
mod form;
mod generate;
mod inspect;
mod logging;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use reconmap_config::{load_dotenv, SessionError, SessionStore, Settings, SettingsError, DOTENV_FILE};
use reconmap_core::FormError;
use reconmap_io::{ReadOptions, SinkError, TabularError};

use exit_codes::{
    EXIT_ERROR, EXIT_NOT_READY, EXIT_PARSE, EXIT_SESSION, EXIT_STARTUP, EXIT_SUCCESS, EXIT_USAGE,
    EXIT_WRITE,
};
use form::{CategoryCommands, FilterCommands, MappingCommands, SourceCommands};

#[derive(Parser)]
#[command(name = "reconmap")]
#[command(about = "Define a column mapping between two tables and emit it as a JSON reconciliation config")]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    /// Form session file
    #[arg(long, global = true, env = "RECONMAP_SESSION", value_name = "PATH")]
    session: Option<PathBuf>,

    /// Settings TOML file (default: ./reconmap.toml when present)
    #[arg(long, global = true, value_name = "PATH")]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the columns and row count of a CSV or Excel file
    #[command(after_help = "\
Examples:
  reconmap inspect transactions.csv
  reconmap inspect records.xlsx --json")]
    Inspect {
        /// File to read
        file: PathBuf,

        /// Output the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Load or clear one of the two source files
    #[command(subcommand)]
    Source(SourceCommands),

    /// Set the journey name
    Journey {
        /// Journey name (empty string clears it)
        name: String,
    },

    /// Edit the category/subcategory tree
    #[command(subcommand)]
    Category(CategoryCommands),

    /// Edit column mappings
    #[command(subcommand)]
    Mapping(MappingCommands),

    /// Edit filter conditions
    #[command(subcommand)]
    Filter(FilterCommands),

    /// Show the current form
    Show {
        /// Output the raw session JSON
        #[arg(long)]
        json: bool,
    },

    /// Assemble the configuration and write it to the output directory
    #[command(after_help = "\
Examples:
  reconmap generate
  reconmap generate --stdout > config.json
  reconmap generate --download ~/Downloads")]
    Generate {
        /// Also print the exact file bytes to stdout
        #[arg(long)]
        stdout: bool,

        /// Also copy the file to this path (a directory keeps the generated name)
        #[arg(long, value_name = "PATH")]
        download: Option<PathBuf>,
    },

    /// Show effective settings
    Settings {
        #[arg(long)]
        json: bool,
    },

    /// Discard the session
    Reset,
}

/// Resolved settings plus the session store every command works against.
pub struct App {
    pub settings: Settings,
    pub store: SessionStore,
}

impl App {
    pub fn read_options(&self) -> ReadOptions {
        ReadOptions {
            max_file_size_mb: self.settings.max_file_size,
            allowed_extensions: self.settings.allowed_extensions(),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        None => {
            // No subcommand = show help
            eprintln!("Usage: reconmap <command> [options]");
            eprintln!("       reconmap --help for more information");
            Ok(())
        }
        Some(command) => startup(cli.settings, cli.session).and_then(|app| dispatch(&app, command)),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                log::debug!("exit {code}: {message}");
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

/// Settings, directories, logging. Any failure here is fatal.
fn startup(settings_file: Option<PathBuf>, session: Option<PathBuf>) -> Result<App, CliError> {
    let dotenv = load_dotenv(Path::new(DOTENV_FILE));
    let settings = Settings::load(settings_file.as_deref())?;
    settings.setup_directories()?;
    logging::init(&settings).map_err(CliError::startup)?;
    dotenv.log();
    log::debug!("settings: {settings:?}");

    let store = SessionStore::new(session.unwrap_or_else(SessionStore::default_path));
    Ok(App { settings, store })
}

fn dispatch(app: &App, command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Inspect { file, json } => inspect::cmd_inspect(app, &file, json),
        Commands::Source(cmd) => form::cmd_source(app, cmd),
        Commands::Journey { name } => form::cmd_journey(app, name),
        Commands::Category(cmd) => form::cmd_category(app, cmd),
        Commands::Mapping(cmd) => form::cmd_mapping(app, cmd),
        Commands::Filter(cmd) => form::cmd_filter(app, cmd),
        Commands::Show { json } => form::cmd_show(app, json),
        Commands::Generate { stdout, download } => generate::cmd_generate(app, stdout, download),
        Commands::Settings { json } => inspect::cmd_settings(app, json),
        Commands::Reset => form::cmd_reset(app),
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn general(msg: impl Into<String>) -> Self {
        Self::new(EXIT_ERROR, msg)
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    pub fn startup(msg: impl Into<String>) -> Self {
        Self::new(EXIT_STARTUP, msg)
    }

    pub fn not_ready(msg: impl Into<String>) -> Self {
        Self::new(EXIT_NOT_READY, msg)
    }

    pub fn write(msg: impl Into<String>) -> Self {
        Self::new(EXIT_WRITE, msg)
    }

    /// A table that could not be read. Also logged so the log file keeps
    /// a record; the message is always printed whatever the log filter.
    pub fn file(err: TabularError) -> Self {
        let message = format!("Error processing files: {err}");
        log::error!("{message}");
        Self::new(EXIT_PARSE, message)
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<SettingsError> for CliError {
    fn from(err: SettingsError) -> Self {
        let hint = match &err {
            SettingsError::InvalidValue { .. } => Some("check the environment and .env file"),
            SettingsError::CreateDir { .. } => Some("set OUTPUT_DIR / LOG_FILE_PATH to writable locations"),
            _ => None,
        };
        let mut cli = Self::startup(err.to_string());
        cli.hint = hint.map(str::to_string);
        cli
    }
}

impl From<FormError> for CliError {
    fn from(err: FormError) -> Self {
        let hint = match &err {
            FormError::SourceNotLoaded(source) => Some(format!("reconmap source set {source} <file>")),
            FormError::UnknownColumn { source, .. } => {
                Some(format!("the columns of {source} are listed by: reconmap show"))
            }
            FormError::ColumnWithoutSource(_) => Some("add --source source1|source2".to_string()),
            FormError::UnknownRow(_) => Some("list row ids with: reconmap show".to_string()),
        };
        let mut cli = Self::usage(err.to_string());
        cli.hint = hint;
        cli
    }
}


impl From<SessionError> for CliError {
    fn from(err: SessionError) -> Self {
        let cli = Self::new(EXIT_SESSION, err.to_string());
        match err {
            SessionError::Corrupt { .. } | SessionError::UnsupportedVersion { .. } => {
                cli.with_hint("start over with: reconmap reset")
            }
            _ => cli,
        }
    }
}

impl From<SinkError> for CliError {
    fn from(err: SinkError) -> Self {
        Self::write(err.to_string())
    }
}
