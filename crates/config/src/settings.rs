// Application settings
// Defaults < reconmap.toml < .env < process environment

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Settings file looked up in the working directory when none is given.
pub const SETTINGS_FILE: &str = "reconmap.toml";

/// Environment file read from the working directory only.
pub const DOTENV_FILE: &str = ".env";

pub const ENV_PORT: &str = "PORT";
pub const ENV_DEBUG: &str = "DEBUG";
pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";
pub const ENV_LOG_FILE_PATH: &str = "LOG_FILE_PATH";
pub const ENV_MAX_FILE_SIZE: &str = "MAX_FILE_SIZE";
pub const ENV_ALLOWED_FILE_TYPES: &str = "ALLOWED_FILE_TYPES";
pub const ENV_OUTPUT_DIR: &str = "OUTPUT_DIR";
pub const ENV_JSON_PREFIX: &str = "JSON_PREFIX";

#[derive(Debug)]
pub enum SettingsError {
    /// Settings file exists but cannot be read.
    Read { path: PathBuf, message: String },
    /// Settings file is not valid TOML for `Settings`.
    Parse { path: PathBuf, message: String },
    /// An environment variable holds a value of the wrong type.
    InvalidValue { key: String, value: String },
    /// Output or log directory could not be created.
    CreateDir { path: PathBuf, message: String },
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, message } => write!(f, "cannot read {}: {message}", path.display()),
            Self::Parse { path, message } => {
                write!(f, "invalid settings file {}: {message}", path.display())
            }
            Self::InvalidValue { key, value } => write!(f, "invalid value for {key}: '{value}'"),
            Self::CreateDir { path, message } => {
                write!(f, "cannot create directory {}: {message}", path.display())
            }
        }
    }
}

impl std::error::Error for SettingsError {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Port for an interactive front end. The CLI only reports it.
    pub port: u16,

    /// Forces debug-level logging.
    pub debug: bool,

    pub log_level: String,
    pub log_file_path: PathBuf,

    /// Per-file upload ceiling in MB.
    pub max_file_size: u64,

    /// Extensions without the dot, lower-case ("csv").
    pub allowed_file_types: Vec<String>,

    pub output_dir: PathBuf,
    pub json_prefix: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            port: 8501,
            debug: false,
            log_level: "INFO".to_string(),
            log_file_path: PathBuf::from("logs/app.log"),
            max_file_size: 50,
            allowed_file_types: vec!["csv".into(), "xlsx".into(), "xls".into()],
            output_dir: PathBuf::from("outputs"),
            json_prefix: "reconciliation_".to_string(),
        }
    }
}

impl Settings {
    /// Resolve settings from an optional TOML file and the process
    /// environment. Call [`load_dotenv`] first so `.env` values are part of
    /// that environment.
    ///
    /// `file` overrides the default `reconmap.toml` lookup; an explicit file
    /// must exist, the default one is optional.
    pub fn load(file: Option<&Path>) -> Result<Self, SettingsError> {
        let mut settings = match file {
            Some(path) => Self::from_toml_file(path)?,
            None => {
                let path = Path::new(SETTINGS_FILE);
                if path.exists() {
                    Self::from_toml_file(path)?
                } else {
                    Self::default()
                }
            }
        };

        settings.apply_lookup(|key| std::env::var(key).ok())?;
        Ok(settings)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, SettingsError> {
        let text = fs::read_to_string(path).map_err(|e| SettingsError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&text).map_err(|message| SettingsError::Parse {
            path: path.to_path_buf(),
            message,
        })
    }

    pub fn from_toml_str(text: &str) -> Result<Self, String> {
        let mut settings: Settings = toml::from_str(text).map_err(|e| e.to_string())?;
        settings.allowed_file_types = normalize_file_types(settings.allowed_file_types.iter().map(String::as_str));
        Ok(settings)
    }

    /// Defaults overlaid with whatever `lookup` returns for each variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();
        settings.apply_lookup(lookup)?;
        Ok(settings)
    }

    /// Overlay variables named as in the environment (`PORT`, `DEBUG`, ...).
    pub fn apply_lookup<F>(&mut self, lookup: F) -> Result<(), SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(ENV_PORT) {
            self.port = parse_number(ENV_PORT, &v)?;
        }
        if let Some(v) = lookup(ENV_DEBUG) {
            self.debug = v.trim().eq_ignore_ascii_case("true");
        }
        if let Some(v) = lookup(ENV_LOG_LEVEL) {
            self.log_level = v;
        }
        if let Some(v) = lookup(ENV_LOG_FILE_PATH) {
            self.log_file_path = PathBuf::from(v);
        }
        if let Some(v) = lookup(ENV_MAX_FILE_SIZE) {
            self.max_file_size = parse_number(ENV_MAX_FILE_SIZE, &v)?;
        }
        if let Some(v) = lookup(ENV_ALLOWED_FILE_TYPES) {
            self.allowed_file_types = normalize_file_types(v.split(','));
        }
        if let Some(v) = lookup(ENV_OUTPUT_DIR) {
            self.output_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup(ENV_JSON_PREFIX) {
            self.json_prefix = v;
        }
        Ok(())
    }

    /// Dot-prefixed extensions (".csv") for the tabular reader.
    pub fn allowed_extensions(&self) -> Vec<String> {
        self.allowed_file_types.iter().map(|t| format!(".{t}")).collect()
    }

    /// Filter directive for the logger: "debug" when `debug` is on, else
    /// `log_level` lower-cased, with the names WARNING and
    /// CRITICAL mapped to "warn" and "error".
    pub fn effective_log_level(&self) -> String {
        if self.debug {
            return "debug".to_string();
        }
        match self.log_level.trim().to_lowercase().as_str() {
            "warning" => "warn".to_string(),
            "critical" | "fatal" => "error".to_string(),
            other => other.to_string(),
        }
    }

    /// Create the output directory and the log file's parent directory.
    pub fn setup_directories(&self) -> Result<(), SettingsError> {
        let mut dirs: Vec<&Path> = vec![self.output_dir.as_path()];
        if let Some(parent) = self.log_file_path.parent() {
            if !parent.as_os_str().is_empty() {
                dirs.push(parent);
            }
        }
        for dir in dirs {
            fs::create_dir_all(dir).map_err(|e| SettingsError::CreateDir {
                path: dir.to_path_buf(),
                message: e.to_string(),
            })?;
        }
        Ok(())
    }
}

/// Outcome of reading the `.env` file. Kept so it can be logged once the
/// logger exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DotenvStatus {
    Loaded(PathBuf),
    Missing,
    Invalid { path: PathBuf, message: String },
}

impl DotenvStatus {
    pub fn log(&self) {
        match self {
            Self::Loaded(path) => log::debug!("loaded {}", path.display()),
            Self::Missing => {}
            Self::Invalid { path, message } => log::warn!("ignoring {}: {message}", path.display()),
        }
    }
}

/// Export the variables of `path` into the process environment. Variables
/// already set are never overridden. Parent directories are not searched.
pub fn load_dotenv(path: &Path) -> DotenvStatus {
    match dotenvy::from_path(path) {
        Ok(()) => DotenvStatus::Loaded(path.to_path_buf()),
        Err(e) if e.not_found() => DotenvStatus::Missing,
        Err(e) => DotenvStatus::Invalid {
            path: path.to_path_buf(),
            message: e.to_string(),
        },
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, SettingsError> {
    value.trim().parse().map_err(|_| SettingsError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn normalize_file_types<'a>(raw: impl Iterator<Item = &'a str>) -> Vec<String> {
    raw.map(|t| t.trim().trim_start_matches('.').to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let s = Settings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(s.port, 8501);
        assert!(!s.debug);
        assert_eq!(s.log_level, "INFO");
        assert_eq!(s.log_file_path, PathBuf::from("logs/app.log"));
        assert_eq!(s.max_file_size, 50);
        assert_eq!(s.allowed_extensions(), vec![".csv", ".xlsx", ".xls"]);
        assert_eq!(s.output_dir, PathBuf::from("outputs"));
        assert_eq!(s.json_prefix, "reconciliation_");
    }

    #[test]
    fn env_overrides() {
        let s = Settings::from_lookup(lookup(&[
            ("PORT", "9000"),
            ("DEBUG", "True"),
            ("MAX_FILE_SIZE", "5"),
            ("ALLOWED_FILE_TYPES", " CSV, .xlsx ,,"),
            ("OUTPUT_DIR", "out/configs"),
            ("JSON_PREFIX", "cfg_"),
        ]))
        .unwrap();
        assert_eq!(s.port, 9000);
        assert!(s.debug);
        assert_eq!(s.max_file_size, 5);
        assert_eq!(s.allowed_file_types, vec!["csv", "xlsx"]);
        assert_eq!(s.output_dir, PathBuf::from("out/configs"));
        assert_eq!(s.json_prefix, "cfg_");
    }

    #[test]
    fn debug_only_true_enables() {
        for value in ["1", "yes", "false", ""] {
            let s = Settings::from_lookup(lookup(&[("DEBUG", value)])).unwrap();
            assert!(!s.debug, "DEBUG={value:?} should not enable debug");
        }
    }

    #[test]
    fn bad_number_is_error() {
        let err = Settings::from_lookup(lookup(&[("MAX_FILE_SIZE", "fifty")])).unwrap_err();
        assert_eq!(err.to_string(), "invalid value for MAX_FILE_SIZE: 'fifty'");
    }

    #[test]
    fn effective_log_level() {
        let s = Settings::from_lookup(lookup(&[("LOG_LEVEL", "WARNING")])).unwrap();
        assert_eq!(s.effective_log_level(), "warn");
        let s = Settings::from_lookup(lookup(&[("LOG_LEVEL", "CRITICAL")])).unwrap();
        assert_eq!(s.effective_log_level(), "error");
        let s = Settings::from_lookup(lookup(&[("LOG_LEVEL", "WARN"), ("DEBUG", "true")])).unwrap();
        assert_eq!(s.effective_log_level(), "debug");
    }

    #[test]
    fn toml_file_then_env() {
        let mut s = Settings::from_toml_str(
            r#"
port = 8600
allowed_file_types = [".CSV"]
json_prefix = "from_toml_"
"#,
        )
        .unwrap();
        assert_eq!(s.port, 8600);
        assert_eq!(s.allowed_file_types, vec!["csv"]);
        assert_eq!(s.max_file_size, 50);

        s.apply_lookup(lookup(&[("JSON_PREFIX", "from_env_")])).unwrap();
        assert_eq!(s.json_prefix, "from_env_");
        assert_eq!(s.port, 8600);
    }

    #[test]
    fn toml_unknown_type_is_error() {
        assert!(Settings::from_toml_str("port = \"high\"").is_err());
    }

    #[test]
    fn setup_directories_creates_both() {
        let dir = tempdir().unwrap();
        let s = Settings {
            output_dir: dir.path().join("outputs"),
            log_file_path: dir.path().join("logs/nested/app.log"),
            ..Settings::default()
        };
        s.setup_directories().unwrap();
        assert!(dir.path().join("outputs").is_dir());
        assert!(dir.path().join("logs/nested").is_dir());
    }

    #[test]
    fn setup_directories_reports_failure() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "x").unwrap();
        let s = Settings {
            output_dir: blocker.join("outputs"),
            ..Settings::default()
        };
        let err = s.setup_directories().unwrap_err();
        assert!(matches!(err, SettingsError::CreateDir { .. }));
    }

    #[test]
    fn dotenv_exports_without_overriding() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".env");
        fs::write(&path, "RECONMAP_TEST_DOTENV_NEW=from_file\nRECONMAP_TEST_DOTENV_SET=from_file\n").unwrap();
        std::env::set_var("RECONMAP_TEST_DOTENV_SET", "from_env");

        assert_eq!(load_dotenv(&path), DotenvStatus::Loaded(path.clone()));
        assert_eq!(std::env::var("RECONMAP_TEST_DOTENV_NEW").unwrap(), "from_file");
        assert_eq!(std::env::var("RECONMAP_TEST_DOTENV_SET").unwrap(), "from_env");
    }

    #[test]
    fn dotenv_not_searched_in_parents() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".env"), "RECONMAP_TEST_DOTENV_PARENT=1\n").unwrap();
        let child = dir.path().join("child");
        fs::create_dir(&child).unwrap();

        assert_eq!(load_dotenv(&child.join(DOTENV_FILE)), DotenvStatus::Missing);
        assert!(std::env::var("RECONMAP_TEST_DOTENV_PARENT").is_err());
    }
}
