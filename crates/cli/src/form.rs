// Form editing commands: sources, journey, categories, mapping and filter rows.

use std::path::PathBuf;

use clap::Subcommand;

use reconmap_core::{
    ColumnMapping, FilterDraft, FilterEdit, FilterOperator, FormState, LoadedSource, MappingEdit,
    RowId, Source,
};
use reconmap_io::read_summary;

use crate::{App, CliError};

#[derive(Subcommand)]
pub enum SourceCommands {
    /// Load a CSV or Excel file into a slot, replacing what was there
    #[command(after_help = "\
Examples:
  reconmap source set source1 bank.csv
  reconmap source set source2 ledger.xlsx --name \"General ledger\"")]
    Set {
        /// source1 or source2
        slot: Source,

        file: PathBuf,

        /// Display name (default: the file name)
        #[arg(long)]
        name: Option<String>,
    },

    /// Unload a slot
    Clear { slot: Source },
}

#[derive(Subcommand)]
pub enum CategoryCommands {
    /// Add a category (no-op if it exists)
    Add { name: String },

    /// Add a subcategory under an existing category
    Sub { category: String, name: String },

    /// List categories and their subcategories
    List {
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum MappingCommands {
    /// Append a mapping row
    #[command(after_help = "\
Examples:
  reconmap mapping add --source1 txn_id --source2 reference --join-key
  reconmap mapping add --source1 amount --source2 total --recon-key")]
    Add {
        #[arg(long, value_name = "COLUMN")]
        source1: Option<String>,

        #[arg(long, value_name = "COLUMN")]
        source2: Option<String>,

        #[arg(long)]
        join_key: bool,

        #[arg(long)]
        recon_key: bool,
    },

    /// Change fields of an existing mapping row (empty string clears a column)
    Set {
        id: RowId,

        #[arg(long, value_name = "COLUMN")]
        source1: Option<String>,

        #[arg(long, value_name = "COLUMN")]
        source2: Option<String>,

        #[arg(long, value_name = "BOOL")]
        join_key: Option<bool>,

        #[arg(long, value_name = "BOOL")]
        recon_key: Option<bool>,
    },

    /// Remove mapping rows by id
    Remove {
        #[arg(required = true)]
        ids: Vec<RowId>,
    },

    /// List mapping rows
    List,
}

#[derive(Subcommand)]
pub enum FilterCommands {
    /// Append a filter row
    #[command(after_help = "\
Examples:
  reconmap filter add --source source1 --column status --operator equals --value settled
  reconmap filter add --source source2 --column amount --operator \"greater than\" --value 0")]
    Add {
        #[arg(long)]
        source: Option<Source>,

        #[arg(long)]
        column: Option<String>,

        /// equals, not_equals, greater_than, less_than, contains
        #[arg(long)]
        operator: Option<FilterOperator>,

        #[arg(long)]
        value: Option<String>,
    },

    /// Change fields of an existing filter row
    Set {
        id: RowId,

        #[arg(long)]
        source: Option<Source>,

        #[arg(long)]
        column: Option<String>,

        #[arg(long)]
        operator: Option<FilterOperator>,

        #[arg(long)]
        value: Option<String>,
    },

    /// Remove filter rows by id
    Remove {
        #[arg(required = true)]
        ids: Vec<RowId>,
    },

    /// List filter rows
    List,
}

/// Load, apply one change, save. Nothing is written if `apply` fails.
fn edit<T>(app: &App, apply: impl FnOnce(&mut FormState) -> Result<T, CliError>) -> Result<T, CliError> {
    let mut form = app.store.load()?;
    let out = apply(&mut form)?;
    app.store.save(&form)?;
    Ok(out)
}

fn warn_stale(form: &FormState) {
    for stale in form.stale_columns() {
        log::warn!(
            "{} #{} uses column '{}' which {} no longer has",
            stale.kind,
            stale.row,
            stale.column,
            stale.source
        );
    }
}

// ============================================================================
// source
// ============================================================================

pub fn cmd_source(app: &App, cmd: SourceCommands) -> Result<(), CliError> {
    match cmd {
        SourceCommands::Set { slot, file, name } => {
            let summary = read_summary(&file, &app.read_options()).map_err(CliError::file)?;
            log::info!(
                "loaded {} into {slot}: {} columns, {} rows",
                summary.name,
                summary.columns.len(),
                summary.total_rows
            );
            edit(app, |form| {
                form.set_source(slot, LoadedSource::new(name, file, summary));
                warn_stale(form);
                if let Some(loaded) = form.source(slot) {
                    print_source(slot, loaded);
                }
                Ok(())
            })
        }
        SourceCommands::Clear { slot } => edit(app, |form| {
            match form.clear_source(slot) {
                Some(old) => println!("{slot}: cleared {}", old.display_name),
                None => println!("{slot}: nothing loaded"),
            }
            Ok(())
        }),
    }
}

fn print_source(slot: Source, loaded: &LoadedSource) {
    println!(
        "{slot}: {} ({} rows, {} columns)",
        loaded.display_name,
        loaded.summary.total_rows,
        loaded.summary.columns.len()
    );
    for column in &loaded.summary.columns {
        println!("  {column}");
    }
}

// ============================================================================
// journey / category
// ============================================================================

pub fn cmd_journey(app: &App, name: String) -> Result<(), CliError> {
    edit(app, |form| {
        form.journey.journey_name = name;
        Ok(())
    })
}

pub fn cmd_category(app: &App, cmd: CategoryCommands) -> Result<(), CliError> {
    match cmd {
        CategoryCommands::Add { name } => edit(app, |form| {
            if !form.journey.categories.add_category(&name) {
                eprintln!("category '{name}' not added (empty or already present)");
            }
            Ok(())
        }),
        CategoryCommands::Sub { category, name } => edit(app, |form| {
            if !form.journey.categories.contains(&category) {
                eprintln!("no category named '{category}'; nothing added");
            } else if !form.journey.categories.add_subcategory(&category, &name) {
                eprintln!("subcategory '{name}' not added (empty or already present)");
            }
            Ok(())
        }),
        CategoryCommands::List { json } => {
            let form = app.store.load()?;
            if json {
                let text = serde_json::to_string_pretty(&form.journey.categories)
                    .map_err(|e| CliError::general(e.to_string()))?;
                println!("{text}");
            } else {
                print_categories(&form);
            }
            Ok(())
        }
    }
}

fn print_categories(form: &FormState) {
    for category in &form.journey.categories {
        println!("{}", category.name);
        for sub in &category.subcategories {
            println!("  - {sub}");
        }
    }
}

// ============================================================================
// mapping
// ============================================================================

pub fn cmd_mapping(app: &App, cmd: MappingCommands) -> Result<(), CliError> {
    match cmd {
        MappingCommands::Add { source1, source2, join_key, recon_key } => edit(app, |form| {
            let mapping = ColumnMapping::new(source1.unwrap_or_default(), source2.unwrap_or_default())
                .join_key(join_key)
                .recon_key(recon_key);
            let id = form.add_mapping(mapping)?;
            log::info!("added mapping #{id}");
            println!("mapping #{id}");
            Ok(())
        }),
        MappingCommands::Set { id, source1, source2, join_key, recon_key } => edit(app, |form| {
            let change = MappingEdit {
                source1_column: source1,
                source2_column: source2,
                is_join_key: join_key,
                is_recon_key: recon_key,
            };
            form.update_mapping(id, change)?;
            Ok(())
        }),
        MappingCommands::Remove { ids } => edit(app, |form| {
            let removed = form.remove_mappings(&ids)?;
            log::info!("removed {removed} mapping row(s)");
            println!("removed {removed} mapping(s)");
            Ok(())
        }),
        MappingCommands::List => {
            print_mappings(&app.store.load()?);
            Ok(())
        }
    }
}

fn print_mappings(form: &FormState) {
    if form.mappings.is_empty() {
        println!("(no mappings)");
        return;
    }
    for row in form.mappings.iter() {
        let m = &row.value;
        let mut flags = Vec::new();
        if m.is_join_key {
            flags.push("join");
        }
        if m.is_recon_key {
            flags.push("recon");
        }
        let marker = if m.is_complete() { "" } else { "  (incomplete)" };
        println!(
            "#{:<3} {} <-> {}  [{}]{marker}",
            row.id,
            blank_as_dash(&m.source1_column),
            blank_as_dash(&m.source2_column),
            flags.join(",")
        );
    }
}

// ============================================================================
// filter
// ============================================================================

pub fn cmd_filter(app: &App, cmd: FilterCommands) -> Result<(), CliError> {
    match cmd {
        FilterCommands::Add { source, column, operator, value } => edit(app, |form| {
            let draft = FilterDraft {
                source,
                column: column.unwrap_or_default(),
                operator,
                value: value.unwrap_or_default(),
            };
            let id = form.add_filter(draft)?;
            log::info!("added filter #{id}");
            println!("filter #{id}");
            Ok(())
        }),
        FilterCommands::Set { id, source, column, operator, value } => edit(app, |form| {
            form.update_filter(id, FilterEdit { source, column, operator, value })?;
            Ok(())
        }),
        FilterCommands::Remove { ids } => edit(app, |form| {
            let removed = form.remove_filters(&ids)?;
            log::info!("removed {removed} filter row(s)");
            println!("removed {removed} filter(s)");
            Ok(())
        }),
        FilterCommands::List => {
            print_filters(&app.store.load()?);
            Ok(())
        }
    }
}

fn print_filters(form: &FormState) {
    if form.filters.is_empty() {
        println!("(no filters)");
        return;
    }
    for row in form.filters.iter() {
        let f = &row.value;
        let marker = if f.complete().is_some() { "" } else { "  (incomplete)" };
        println!(
            "#{:<3} {}.{} {} {:?}{marker}",
            row.id,
            f.source.map(|s| s.as_str()).unwrap_or("-"),
            blank_as_dash(&f.column),
            f.operator.map(|o| o.as_str()).unwrap_or("-"),
            f.value
        );
    }
}

fn blank_as_dash(s: &str) -> &str {
    if s.is_empty() {
        "-"
    } else {
        s
    }
}

// ============================================================================
// show / reset
// ============================================================================

pub fn cmd_show(app: &App, json: bool) -> Result<(), CliError> {
    let form = app.store.load()?;
    if json {
        let text = serde_json::to_string_pretty(&form).map_err(|e| CliError::general(e.to_string()))?;
        println!("{text}");
        return Ok(());
    }

    let journey = if form.journey.journey_name.is_empty() {
        "(unnamed)"
    } else {
        form.journey.journey_name.as_str()
    };
    println!("Journey: {journey}");
    println!();

    for slot in Source::BOTH {
        match form.source(slot) {
            Some(loaded) => print_source(slot, loaded),
            None => println!("{slot}: (not loaded)"),
        }
    }
    println!();

    println!("Categories:");
    if form.journey.categories.is_empty() {
        println!("(none)");
    } else {
        print_categories(&form);
    }
    println!();

    println!("Mappings:");
    print_mappings(&form);
    println!();

    println!("Filters:");
    print_filters(&form);

    warn_stale(&form);
    Ok(())
}

pub fn cmd_reset(app: &App) -> Result<(), CliError> {
    if app.store.reset()? {
        println!("session discarded");
    } else {
        println!("no session");
    }
    Ok(())
}
