//! The whole editable form, owned by the front end and passed by reference
//! into the registry, row editors and assembler.

use std::path::PathBuf;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::assemble::assemble;
use crate::error::FormError;
use crate::model::{ColumnMapping, FileSummary, FilterDraft, FilterOperator, JourneyConfig, ReconciliationConfig, Source};
use crate::rows::{RowId, RowList};

/// Bump when the persisted form layout changes incompatibly.
pub const FORM_VERSION: u32 = 1;

/// A table the user has loaded into one of the two source slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadedSource {
    /// User-facing name; falls back to the file name.
    pub display_name: String,
    pub path: PathBuf,
    pub summary: FileSummary,
}

impl LoadedSource {
    pub fn new(display_name: Option<String>, path: PathBuf, summary: FileSummary) -> Self {
        let display_name = display_name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| summary.name.clone());
        Self { display_name, path, summary }
    }
}

/// Partial update of a mapping row; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct MappingEdit {
    pub source1_column: Option<String>,
    pub source2_column: Option<String>,
    pub is_join_key: Option<bool>,
    pub is_recon_key: Option<bool>,
}

/// Partial update of a filter row; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct FilterEdit {
    pub source: Option<Source>,
    pub column: Option<String>,
    pub operator: Option<FilterOperator>,
    pub value: Option<String>,
}

/// A complete mapping or filter naming a column the loaded file lacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaleColumn {
    pub kind: RowKind,
    pub row: RowId,
    pub source: Source,
    pub column: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Mapping,
    Filter,
}

impl std::fmt::Display for RowKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mapping => write!(f, "mapping"),
            Self::Filter => write!(f, "filter"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormState {
    pub version: u32,
    pub journey: JourneyConfig,
    pub source1: Option<LoadedSource>,
    pub source2: Option<LoadedSource>,
    pub mappings: RowList<ColumnMapping>,
    pub filters: RowList<FilterDraft>,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            version: FORM_VERSION,
            journey: JourneyConfig::default(),
            source1: None,
            source2: None,
            mappings: RowList::new(),
            filters: RowList::new(),
        }
    }
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Sources
    // -----------------------------------------------------------------------

    pub fn source(&self, source: Source) -> Option<&LoadedSource> {
        match source {
            Source::Source1 => self.source1.as_ref(),
            Source::Source2 => self.source2.as_ref(),
        }
    }

    fn source_slot(&mut self, source: Source) -> &mut Option<LoadedSource> {
        match source {
            Source::Source1 => &mut self.source1,
            Source::Source2 => &mut self.source2,
        }
    }

    /// Replace whatever was loaded in `source`.
    pub fn set_source(&mut self, source: Source, loaded: LoadedSource) {
        *self.source_slot(source) = Some(loaded);
    }

    pub fn clear_source(&mut self, source: Source) -> Option<LoadedSource> {
        self.source_slot(source).take()
    }

    pub fn both_sources_loaded(&self) -> bool {
        self.source1.is_some() && self.source2.is_some()
    }

    /// An empty column is always accepted (it clears the field); anything
    /// else must be a column of the loaded source.
    pub fn check_column(&self, source: Source, column: &str) -> Result<(), FormError> {
        if column.is_empty() {
            return Ok(());
        }
        let loaded = self.source(source).ok_or(FormError::SourceNotLoaded(source))?;
        if loaded.summary.has_column(column) {
            Ok(())
        } else {
            Err(FormError::UnknownColumn {
                source,
                column: column.to_string(),
            })
        }
    }

    // -----------------------------------------------------------------------
    // Mapping rows
    // -----------------------------------------------------------------------

    pub fn add_mapping(&mut self, mapping: ColumnMapping) -> Result<RowId, FormError> {
        self.check_mapping(&mapping)?;
        Ok(self.mappings.push(mapping))
    }

    pub fn update_mapping(&mut self, id: RowId, edit: MappingEdit) -> Result<(), FormError> {
        let mut updated = self.mappings.get(id).cloned().ok_or(FormError::UnknownRow(id))?;
        if let Some(column) = edit.source1_column {
            updated.source1_column = column;
        }
        if let Some(column) = edit.source2_column {
            updated.source2_column = column;
        }
        if let Some(on) = edit.is_join_key {
            updated.is_join_key = on;
        }
        if let Some(on) = edit.is_recon_key {
            updated.is_recon_key = on;
        }
        self.check_mapping(&updated)?;

        if let Some(row) = self.mappings.get_mut(id) {
            *row = updated;
        }
        Ok(())
    }

    /// Remove a batch of mapping rows. Fails without removing anything if
    /// any id is unknown.
    pub fn remove_mappings(&mut self, ids: &[RowId]) -> Result<usize, FormError> {
        if let Some(&missing) = ids.iter().find(|&&id| !self.mappings.contains(id)) {
            return Err(FormError::UnknownRow(missing));
        }
        Ok(self.mappings.remove(ids).len())
    }

    fn check_mapping(&self, mapping: &ColumnMapping) -> Result<(), FormError> {
        for source in Source::BOTH {
            self.check_column(source, mapping.column(source))?;
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Filter rows
    // -----------------------------------------------------------------------

    pub fn add_filter(&mut self, draft: FilterDraft) -> Result<RowId, FormError> {
        self.check_filter(&draft)?;
        Ok(self.filters.push(draft))
    }

    pub fn update_filter(&mut self, id: RowId, edit: FilterEdit) -> Result<(), FormError> {
        let mut updated = self.filters.get(id).cloned().ok_or(FormError::UnknownRow(id))?;
        if let Some(source) = edit.source {
            updated.source = Some(source);
        }
        if let Some(column) = edit.column {
            updated.column = column;
        }
        if let Some(operator) = edit.operator {
            updated.operator = Some(operator);
        }
        if let Some(value) = edit.value {
            updated.value = value;
        }
        self.check_filter(&updated)?;

        if let Some(row) = self.filters.get_mut(id) {
            *row = updated;
        }
        Ok(())
    }

    pub fn remove_filters(&mut self, ids: &[RowId]) -> Result<usize, FormError> {
        if let Some(&missing) = ids.iter().find(|&&id| !self.filters.contains(id)) {
            return Err(FormError::UnknownRow(missing));
        }
        Ok(self.filters.remove(ids).len())
    }

    fn check_filter(&self, draft: &FilterDraft) -> Result<(), FormError> {
        match draft.source {
            Some(source) => self.check_column(source, &draft.column),
            None if draft.column.is_empty() => Ok(()),
            None => Err(FormError::ColumnWithoutSource(draft.column.clone())),
        }
    }

    // -----------------------------------------------------------------------
    // Assembly
    // -----------------------------------------------------------------------

    /// Complete mappings and filters that name columns missing from the
    /// currently loaded files. Sources that are not loaded are not checked.
    pub fn stale_columns(&self) -> Vec<StaleColumn> {
        let mut stale = Vec::new();
        let mut check = |kind: RowKind, row: RowId, source: Source, column: &str| {
            if let Some(loaded) = self.source(source) {
                if !loaded.summary.has_column(column) {
                    stale.push(StaleColumn {
                        kind,
                        row,
                        source,
                        column: column.to_string(),
                    });
                }
            }
        };

        for row in self.mappings.iter().filter(|r| r.value.is_complete()) {
            for source in Source::BOTH {
                check(RowKind::Mapping, row.id, source, row.value.column(source));
            }
        }
        for row in self.filters.iter() {
            if let Some(condition) = row.value.complete() {
                check(RowKind::Filter, row.id, condition.source, &condition.column);
            }
        }
        stale
    }

    pub fn assemble(&self, now: NaiveDateTime) -> ReconciliationConfig {
        assemble(&self.journey, self.mappings.values(), self.filters.values(), now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(name: &str, columns: &[&str]) -> FileSummary {
        FileSummary {
            name: name.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            total_rows: 3,
        }
    }

    fn loaded_form() -> FormState {
        let mut form = FormState::new();
        form.set_source(
            Source::Source1,
            LoadedSource::new(None, "bank.csv".into(), summary("bank.csv", &["id", "amount", "date"])),
        );
        form.set_source(
            Source::Source2,
            LoadedSource::new(Some("Ledger".into()), "ledger.xlsx".into(), summary("ledger.xlsx", &["ref", "total"])),
        );
        form
    }

    #[test]
    fn display_name_falls_back_to_file_name() {
        let form = loaded_form();
        assert_eq!(form.source(Source::Source1).unwrap().display_name, "bank.csv");
        assert_eq!(form.source(Source::Source2).unwrap().display_name, "Ledger");

        let blank = LoadedSource::new(Some(String::new()), "x.csv".into(), summary("x.csv", &[]));
        assert_eq!(blank.display_name, "x.csv");
    }

    #[test]
    fn add_mapping_validates_columns() {
        let mut form = loaded_form();
        let id = form.add_mapping(ColumnMapping::new("id", "ref").join_key(true)).unwrap();
        assert_eq!(form.mappings.get(id).unwrap().source2_column, "ref");

        let err = form.add_mapping(ColumnMapping::new("id", "nope")).unwrap_err();
        assert_eq!(
            err,
            FormError::UnknownColumn { source: Source::Source2, column: "nope".into() }
        );
        assert_eq!(form.mappings.len(), 1);
    }

    #[test]
    fn empty_mapping_needs_no_sources() {
        let mut form = FormState::new();
        form.add_mapping(ColumnMapping::default()).unwrap();
        let err = form.add_mapping(ColumnMapping::new("id", "")).unwrap_err();
        assert_eq!(err, FormError::SourceNotLoaded(Source::Source1));
    }

    #[test]
    fn failed_update_leaves_row_untouched() {
        let mut form = loaded_form();
        let id = form.add_mapping(ColumnMapping::new("id", "ref")).unwrap();

        let edit = MappingEdit {
            source1_column: Some("amount".into()),
            source2_column: Some("missing".into()),
            ..MappingEdit::default()
        };
        assert!(form.update_mapping(id, edit).is_err());
        assert_eq!(form.mappings.get(id).unwrap(), &ColumnMapping::new("id", "ref"));

        let edit = MappingEdit {
            is_recon_key: Some(true),
            ..MappingEdit::default()
        };
        form.update_mapping(id, edit).unwrap();
        assert!(form.mappings.get(id).unwrap().is_recon_key);
    }

    #[test]
    fn remove_unknown_row_removes_nothing() {
        let mut form = loaded_form();
        let a = form.add_mapping(ColumnMapping::new("id", "ref")).unwrap();
        let err = form.remove_mappings(&[a, RowId(42)]).unwrap_err();
        assert_eq!(err, FormError::UnknownRow(RowId(42)));
        assert_eq!(form.mappings.len(), 1);

        assert_eq!(form.remove_mappings(&[a]).unwrap(), 1);
        assert!(form.mappings.is_empty());
    }

    #[test]
    fn remove_filters_batch_by_id() {
        let mut form = loaded_form();
        let condition = |column: &str| FilterDraft {
            source: Some(Source::Source1),
            column: column.into(),
            operator: Some(FilterOperator::Equals),
            value: "x".into(),
        };
        let first = form.add_filter(condition("id")).unwrap();
        let middle = form.add_filter(condition("amount")).unwrap();
        let last = form.add_filter(condition("date")).unwrap();

        // Unknown id anywhere in the batch: nothing is removed.
        let err = form.remove_filters(&[last, RowId(99), first]).unwrap_err();
        assert_eq!(err, FormError::UnknownRow(RowId(99)));
        assert_eq!(form.filters.len(), 3);

        assert_eq!(form.remove_filters(&[last, first]).unwrap(), 2);
        assert_eq!(form.filters.ids().collect::<Vec<_>>(), vec![middle]);
        assert_eq!(form.filters.get(middle).unwrap().column, "amount");

        // Removed ids stay gone.
        assert_eq!(form.remove_filters(&[first]).unwrap_err(), FormError::UnknownRow(first));
    }

    #[test]
    fn filter_column_checked_against_its_source() {
        let mut form = loaded_form();
        let id = form
            .add_filter(FilterDraft {
                source: Some(Source::Source1),
                column: "amount".into(),
                operator: Some(FilterOperator::GreaterThan),
                value: "0".into(),
            })
            .unwrap();

        // Switching source keeps the column, which source2 lacks.
        let err = form
            .update_filter(id, FilterEdit { source: Some(Source::Source2), ..FilterEdit::default() })
            .unwrap_err();
        assert!(matches!(err, FormError::UnknownColumn { source: Source::Source2, .. }));

        form.update_filter(
            id,
            FilterEdit {
                source: Some(Source::Source2),
                column: Some("total".into()),
                ..FilterEdit::default()
            },
        )
        .unwrap();
        assert_eq!(form.filters.get(id).unwrap().column, "total");
    }

    #[test]
    fn filter_column_without_source_rejected() {
        let mut form = loaded_form();
        let err = form
            .add_filter(FilterDraft { column: "amount".into(), ..FilterDraft::default() })
            .unwrap_err();
        assert_eq!(err, FormError::ColumnWithoutSource("amount".into()));
        form.add_filter(FilterDraft::default()).unwrap();
    }

    #[test]
    fn stale_columns_after_source_swap() {
        let mut form = loaded_form();
        let m = form.add_mapping(ColumnMapping::new("amount", "total")).unwrap();
        form.add_mapping(ColumnMapping::new("id", "")).unwrap();
        let f = form
            .add_filter(FilterDraft {
                source: Some(Source::Source1),
                column: "date".into(),
                operator: Some(FilterOperator::Equals),
                value: "2024-01-01".into(),
            })
            .unwrap();

        assert!(form.stale_columns().is_empty());

        form.set_source(
            Source::Source1,
            LoadedSource::new(None, "bank2.csv".into(), summary("bank2.csv", &["id"])),
        );
        let stale = form.stale_columns();
        assert_eq!(stale.len(), 2);
        assert_eq!((stale[0].kind, stale[0].row, stale[0].column.as_str()), (RowKind::Mapping, m, "amount"));
        assert_eq!((stale[1].kind, stale[1].row, stale[1].column.as_str()), (RowKind::Filter, f, "date"));
    }

    #[test]
    fn form_state_survives_json() {
        let mut form = loaded_form();
        form.journey.journey_name = "Card settlement".into();
        form.journey.categories.add_category("Payments");
        form.journey.categories.add_subcategory("Payments", "Visa");
        form.add_mapping(ColumnMapping::new("id", "ref")).unwrap();
        form.add_filter(FilterDraft { source: Some(Source::Source2), ..FilterDraft::default() }).unwrap();

        let json = serde_json::to_string_pretty(&form).unwrap();
        let back: FormState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, form);
    }

    #[test]
    fn missing_fields_default_on_load() {
        let back: FormState = serde_json::from_str("{}").unwrap();
        assert_eq!(back, FormState::new());
    }
}
