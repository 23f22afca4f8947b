use chrono::NaiveDateTime;

use crate::model::{ColumnMapping, FilterDraft, JourneyConfig, ReconciliationConfig, TIMESTAMP_FORMAT};

/// Build the emitted document from the current form state.
///
/// Pure: no I/O, no failure. Mappings missing either column and filters
/// missing any field are dropped; order of what remains is preserved.
/// Categories pass through untouched, including ones with no subcategories.
pub fn assemble<'a>(
    journey: &JourneyConfig,
    mappings: impl IntoIterator<Item = &'a ColumnMapping>,
    filters: impl IntoIterator<Item = &'a FilterDraft>,
    now: NaiveDateTime,
) -> ReconciliationConfig {
    let mappings: Vec<ColumnMapping> = mappings
        .into_iter()
        .filter(|m| m.is_complete())
        .cloned()
        .collect();
    let filters = filters.into_iter().filter_map(FilterDraft::complete).collect();

    ReconciliationConfig {
        timestamp: now.format(TIMESTAMP_FORMAT).to_string(),
        journey_name: journey.journey_name.clone(),
        categories: journey.categories.clone(),
        mappings,
        filters,
    }
}
