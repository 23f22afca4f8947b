// JSON configuration output

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use reconmap_core::model::FILENAME_TIMESTAMP_FORMAT;
use reconmap_core::ReconciliationConfig;

use crate::error::SinkError;

pub const MIME_TYPE: &str = "application/json";

/// A written configuration file. `bytes` is exactly what is on disk and is
/// what gets offered for download.
#[derive(Debug, Clone)]
pub struct ConfigArtifact {
    pub path: PathBuf,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ConfigArtifact {
    pub fn mime(&self) -> &'static str {
        MIME_TYPE
    }

    /// Copy the artifact bytes to `target`. A directory target receives a
    /// file with the artifact's own name. Returns the path written.
    pub fn deliver(&self, target: &Path) -> Result<PathBuf, SinkError> {
        let path = if target.is_dir() {
            target.join(&self.file_name)
        } else {
            target.to_path_buf()
        };
        fs::write(&path, &self.bytes).map_err(|e| SinkError::Write {
            path: path.clone(),
            message: e.to_string(),
        })?;
        Ok(path)
    }
}

/// Pretty JSON with 2-space indentation.
pub fn render(config: &ReconciliationConfig) -> Result<String, SinkError> {
    serde_json::to_string_pretty(config).map_err(|e| SinkError::Serialize(e.to_string()))
}

/// `<prefix><YYYYMMDD_HHMMSS>.json`
pub fn artifact_file_name(prefix: &str, now: NaiveDateTime) -> String {
    format!("{prefix}{}.json", now.format(FILENAME_TIMESTAMP_FORMAT))
}

/// Render `config` and write it into `dir`, creating the directory if needed.
pub fn write_config(
    config: &ReconciliationConfig,
    dir: &Path,
    prefix: &str,
    now: NaiveDateTime,
) -> Result<ConfigArtifact, SinkError> {
    let bytes = render(config)?.into_bytes();

    fs::create_dir_all(dir).map_err(|e| SinkError::CreateDir {
        dir: dir.to_path_buf(),
        message: e.to_string(),
    })?;

    let file_name = artifact_file_name(prefix, now);
    let path = dir.join(&file_name);
    fs::write(&path, &bytes).map_err(|e| SinkError::Write {
        path: path.clone(),
        message: e.to_string(),
    })?;

    log::info!("wrote {} ({} bytes)", path.display(), bytes.len());

    Ok(ConfigArtifact { path, file_name, bytes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use reconmap_core::{assemble, ColumnMapping, JourneyConfig};
    use tempfile::tempdir;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 11, 2)
            .unwrap()
            .and_hms_opt(16, 4, 9)
            .unwrap()
    }

    fn sample() -> ReconciliationConfig {
        let mut journey = JourneyConfig::new("Payouts");
        journey.categories.add_category("Card");
        assemble(&journey, &[ColumnMapping::new("id", "ref").join_key(true)], &[], at())
    }

    #[test]
    fn test_file_name_pattern() {
        assert_eq!(artifact_file_name("reconciliation_", at()), "reconciliation_20241102_160409.json");
    }

    #[test]
    fn test_written_bytes_match_download_bytes() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("outputs");
        let config = sample();

        let artifact = write_config(&config, &out, "reconciliation_", at()).unwrap();

        assert_eq!(artifact.path, out.join("reconciliation_20241102_160409.json"));
        assert_eq!(fs::read(&artifact.path).unwrap(), artifact.bytes);
        assert_eq!(artifact.bytes, render(&config).unwrap().into_bytes());
        assert_eq!(artifact.mime(), "application/json");

        let parsed: ReconciliationConfig = serde_json::from_slice(&artifact.bytes).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_two_space_indent() {
        let text = render(&sample()).unwrap();
        assert!(text.starts_with("{\n  \"timestamp\": \"2024-11-02 16:04:09\",\n  \"journey_name\""));
        assert!(text.contains("\n    \"Card\": {\n      \"name\": \"Card\""));
    }

    #[test]
    fn test_deliver_to_dir_and_file() {
        let dir = tempdir().unwrap();
        let artifact = write_config(&sample(), dir.path(), "cfg_", at()).unwrap();

        let downloads = dir.path().join("downloads");
        fs::create_dir(&downloads).unwrap();
        let into_dir = artifact.deliver(&downloads).unwrap();
        assert_eq!(into_dir, downloads.join("cfg_20241102_160409.json"));
        assert_eq!(fs::read(&into_dir).unwrap(), artifact.bytes);

        let named = dir.path().join("mine.json");
        artifact.deliver(&named).unwrap();
        assert_eq!(fs::read(&named).unwrap(), artifact.bytes);
    }
}
