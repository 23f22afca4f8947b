//! Form session store.
//!
//! The whole `FormState` is one pretty-printed JSON file. Each front-end
//! interaction loads it, applies one change, and saves it back.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use reconmap_core::form::{FormState, FORM_VERSION};

#[derive(Debug)]
pub enum SessionError {
    Read { path: PathBuf, message: String },
    /// The file exists but is not a valid form session.
    Corrupt { path: PathBuf, message: String },
    /// Written by a newer version of the tool.
    UnsupportedVersion { path: PathBuf, version: u32 },
    Write { path: PathBuf, message: String },
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, message } => {
                write!(f, "cannot read session {}: {message}", path.display())
            }
            Self::Corrupt { path, message } => {
                write!(f, "session file {} is corrupt: {message}", path.display())
            }
            Self::UnsupportedVersion { path, version } => write!(
                f,
                "session file {} has version {version}, this build supports up to {FORM_VERSION}",
                path.display()
            ),
            Self::Write { path, message } => {
                write!(f, "cannot write session {}: {message}", path.display())
            }
        }
    }
}

impl std::error::Error for SessionError {}

#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/reconmap/session.json`
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("reconmap")
            .join("session.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The saved form, or an empty one when no session exists yet.
    pub fn load(&self) -> Result<FormState, SessionError> {
        if !self.path.exists() {
            return Ok(FormState::new());
        }
        let text = fs::read_to_string(&self.path).map_err(|e| SessionError::Read {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        let form: FormState = serde_json::from_str(&text).map_err(|e| SessionError::Corrupt {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        if form.version > FORM_VERSION {
            return Err(SessionError::UnsupportedVersion {
                path: self.path.clone(),
                version: form.version,
            });
        }
        Ok(form)
    }

    pub fn save(&self, form: &FormState) -> Result<(), SessionError> {
        let write_err = |message: String| SessionError::Write {
            path: self.path.clone(),
            message,
        };
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| write_err(e.to_string()))?;
            }
        }
        let json = serde_json::to_string_pretty(form).map_err(|e| write_err(e.to_string()))?;
        fs::write(&self.path, json).map_err(|e| write_err(e.to_string()))?;
        log::debug!("saved session {}", self.path.display());
        Ok(())
    }

    /// Discard the session. Returns `false` if there was none.
    pub fn reset(&self) -> Result<bool, SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(SessionError::Write {
                path: self.path.clone(),
                message: e.to_string(),
            }),
        }
    }
}
