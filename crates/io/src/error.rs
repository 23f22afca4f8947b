use std::fmt;
use std::path::PathBuf;

/// Failure reading an uploaded table. `Display` is the message shown to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum TabularError {
    /// Extension not in the allowed list, or not a tabular format at all.
    UnsupportedType { file: String, extension: String, allowed: Vec<String> },
    /// File exceeds the configured size ceiling.
    TooLarge { file: String, size_bytes: u64, limit_mb: u64 },
    /// File could not be opened or read.
    Io { file: String, message: String },
    /// File was read but its contents are malformed.
    Parse { file: String, message: String },
    /// No header row.
    Empty { file: String },
}

impl fmt::Display for TabularError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedType { file, extension, allowed } => {
                let ext = if extension.is_empty() { "(none)" } else { extension.as_str() };
                write!(f, "{file}: unsupported file type {ext} (allowed: {})", allowed.join(", "))
            }
            Self::TooLarge { file, size_bytes, limit_mb } => {
                let size_mb = *size_bytes as f64 / (1024.0 * 1024.0);
                write!(f, "{file}: file is {size_mb:.1} MB, limit is {limit_mb} MB")
            }
            Self::Io { file, message } => write!(f, "{file}: cannot read file: {message}"),
            Self::Parse { file, message } => write!(f, "{file}: {message}"),
            Self::Empty { file } => write!(f, "{file}: no columns to parse from file"),
        }
    }
}

impl std::error::Error for TabularError {}

/// Failure writing the generated configuration.
#[derive(Debug)]
pub enum SinkError {
    Serialize(String),
    CreateDir { dir: PathBuf, message: String },
    Write { path: PathBuf, message: String },
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Serialize(msg) => write!(f, "JSON serialization error: {msg}"),
            Self::CreateDir { dir, message } => {
                write!(f, "cannot create {}: {message}", dir.display())
            }
            Self::Write { path, message } => write!(f, "cannot write {}: {message}", path.display()),
        }
    }
}

impl std::error::Error for SinkError {}
