//! Uploaded table → `FileSummary`.
//!
//! Dispatches on file extension to the delimited-text or spreadsheet reader.
//! Every failure comes back as one `TabularError`; nothing partial is
//! returned.

use std::collections::HashSet;
use std::path::Path;

use reconmap_core::FileSummary;

use crate::error::TabularError;

const EXCEL_EXTENSIONS: &[&str] = &[".xlsx", ".xls", ".xlsm", ".xlsb", ".ods"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Excel,
}

impl TableFormat {
    /// Format for a lower-cased, dot-prefixed extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            ".csv" => Some(Self::Csv),
            e if EXCEL_EXTENSIONS.contains(&e) => Some(Self::Excel),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReadOptions {
    /// Size ceiling in megabytes.
    pub max_file_size_mb: u64,
    /// Dot-prefixed, lower-case extensions (".csv").
    pub allowed_extensions: Vec<String>,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            max_file_size_mb: 50,
            allowed_extensions: vec![".csv".into(), ".xlsx".into(), ".xls".into()],
        }
    }
}

impl ReadOptions {
    pub fn allows(&self, ext: &str) -> bool {
        self.allowed_extensions.iter().any(|a| a == ext)
    }

    fn limit_bytes(&self) -> u64 {
        self.max_file_size_mb.saturating_mul(1024 * 1024)
    }
}

/// Lower-cased extension with its leading dot, or "" when there is none.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}

pub fn read_summary(path: &Path, options: &ReadOptions) -> Result<FileSummary, TabularError> {
    let file = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let extension = extension_of(path);

    let format = TableFormat::from_extension(&extension)
        .filter(|_| options.allows(&extension))
        .ok_or_else(|| TabularError::UnsupportedType {
            file: file.clone(),
            extension: extension.clone(),
            allowed: options.allowed_extensions.clone(),
        })?;

    let size_bytes = std::fs::metadata(path)
        .map_err(|e| TabularError::Io {
            file: file.clone(),
            message: e.to_string(),
        })?
        .len();
    if size_bytes > options.limit_bytes() {
        return Err(TabularError::TooLarge {
            file,
            size_bytes,
            limit_mb: options.max_file_size_mb,
        });
    }

    let parsed = match format {
        TableFormat::Csv => crate::csv::summarize(path),
        TableFormat::Excel => crate::xlsx::summarize(path),
    };
    let (raw_header, total_rows) = parsed.map_err(|message| TabularError::Parse {
        file: file.clone(),
        message,
    })?;

    if raw_header.is_empty() {
        return Err(TabularError::Empty { file });
    }

    let columns = normalize_header(raw_header);
    log::debug!("{file}: {} columns, {total_rows} rows ({format:?})", columns.len());

    Ok(FileSummary {
        name: file,
        columns,
        total_rows,
    })
}

/// Name blank header cells `Unnamed: <index>` and suffix repeats as
/// `name.1`, `name.2`, ... so every column name is distinct.
pub fn normalize_header(raw: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut columns = Vec::with_capacity(raw.len());

    for (idx, name) in raw.into_iter().enumerate() {
        let base = if name.is_empty() {
            format!("Unnamed: {idx}")
        } else {
            name
        };

        let mut candidate = base.clone();
        let mut n = 0;
        while seen.contains(&candidate) {
            n += 1;
            candidate = format!("{base}.{n}");
        }
        seen.insert(candidate.clone());
        columns.push(candidate);
    }

    columns
}
