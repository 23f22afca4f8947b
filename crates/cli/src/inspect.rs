// inspect / settings: read-only reporting commands.

use std::path::Path;

use reconmap_io::read_summary;

use crate::{App, CliError};

pub fn cmd_inspect(app: &App, file: &Path, json: bool) -> Result<(), CliError> {
    let summary = read_summary(file, &app.read_options()).map_err(CliError::file)?;

    if json {
        let text = serde_json::to_string_pretty(&summary).map_err(|e| CliError::general(e.to_string()))?;
        println!("{text}");
        return Ok(());
    }

    println!("File:    {}", summary.name);
    println!("Rows:    {}", summary.total_rows);
    println!("Columns: {}", summary.columns.len());
    for (i, column) in summary.columns.iter().enumerate() {
        println!("  {:>3}  {column}", i + 1);
    }
    Ok(())
}

pub fn cmd_settings(app: &App, json: bool) -> Result<(), CliError> {
    let s = &app.settings;
    if json {
        let mut value = serde_json::to_value(s).map_err(|e| CliError::general(e.to_string()))?;
        if let Some(map) = value.as_object_mut() {
            map.insert(
                "session".to_string(),
                serde_json::Value::String(app.store.path().display().to_string()),
            );
        }
        let text = serde_json::to_string_pretty(&value).map_err(|e| CliError::general(e.to_string()))?;
        println!("{text}");
        return Ok(());
    }

    println!("port:               {}", s.port);
    println!("debug:              {}", s.debug);
    println!("log_level:          {} (effective: {})", s.log_level, s.effective_log_level());
    println!("log_file_path:      {}", s.log_file_path.display());
    println!("max_file_size:      {} MB", s.max_file_size);
    println!("allowed_file_types: {}", s.allowed_file_types.join(", "));
    println!("output_dir:         {}", s.output_dir.display());
    println!("json_prefix:        {}", s.json_prefix);
    println!("session:            {}", app.store.path().display());
    Ok(())
}
