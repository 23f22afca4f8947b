// generate: assemble the form and write the configuration artifact.

use std::io::Write;
use std::path::PathBuf;

use reconmap_core::{Clock, Source, SystemClock};
use reconmap_io::{write_config, ConfigArtifact};

use crate::{App, CliError};

pub fn cmd_generate(app: &App, stdout: bool, download: Option<PathBuf>) -> Result<(), CliError> {
    let artifact = generate(app, &SystemClock)?;
    eprintln!("wrote {}", artifact.path.display());

    if let Some(target) = download {
        let delivered = artifact.deliver(&target)?;
        log::info!("delivered {} as {}", artifact.file_name, artifact.mime());
        eprintln!("downloaded {}", delivered.display());
    }

    if stdout {
        let mut out = std::io::stdout().lock();
        out.write_all(&artifact.bytes)
            .and_then(|()| out.flush())
            .map_err(|e| CliError::write(format!("cannot write to stdout: {e}")))?;
    }

    Ok(())
}

fn generate(app: &App, clock: &dyn Clock) -> Result<ConfigArtifact, CliError> {
    let form = app.store.load()?;

    if !form.both_sources_loaded() {
        let missing: Vec<&str> = Source::BOTH
            .into_iter()
            .filter(|&s| form.source(s).is_none())
            .map(|s| s.as_str())
            .collect();
        return Err(CliError::not_ready(format!(
            "both source files must be loaded (missing: {})",
            missing.join(", ")
        ))
        .with_hint(format!("reconmap source set {} <file>", missing[0])));
    }

    for stale in form.stale_columns() {
        log::warn!(
            "{} #{} uses column '{}' which {} does not have",
            stale.kind,
            stale.row,
            stale.column,
            stale.source
        );
    }

    // One reading feeds both the document timestamp and the file name.
    let now = clock.now();
    let config = form.assemble(now);
    log::info!(
        "assembled '{}': {} of {} mappings, {} of {} filters",
        config.journey_name,
        config.mappings.len(),
        form.mappings.len(),
        config.filters.len(),
        form.filters.len()
    );

    Ok(write_config(&config, &app.settings.output_dir, &app.settings.json_prefix, now)?)
}
