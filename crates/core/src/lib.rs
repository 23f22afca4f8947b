//! `reconmap-core`: mapping model for two-source reconciliation configs.
//!
//! Holds the editable form (journey, categories, column mappings, filters),
//! and turns it into the `ReconciliationConfig` document. No file or
//! network I/O happens here.

pub mod assemble;
pub mod clock;
pub mod error;
pub mod form;
pub mod model;
pub mod registry;
pub mod rows;

pub use assemble::assemble;
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::FormError;
pub use form::{FilterEdit, FormState, LoadedSource, MappingEdit, RowKind, StaleColumn};
pub use model::{
    Category, CategorySet, ColumnMapping, FileSummary, FilterCondition, FilterDraft, FilterOperator,
    JourneyConfig, ReconciliationConfig, Source,
};
pub use rows::{Row, RowId, RowList};
