use std::fmt;

use crate::model::Source;
use crate::rows::RowId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    /// A column was chosen for a source that has no file loaded.
    SourceNotLoaded(Source),
    /// The column is not one of the loaded source's columns.
    UnknownColumn { source: Source, column: String },
    /// A filter names a column before choosing which source it belongs to.
    ColumnWithoutSource(String),
    /// No mapping/filter row with this id.
    UnknownRow(RowId),
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SourceNotLoaded(source) => write!(f, "{source} has no file loaded"),
            Self::UnknownColumn { source, column } => {
                write!(f, "{source}: no column named '{column}'")
            }
            Self::ColumnWithoutSource(column) => {
                write!(f, "filter column '{column}' needs a source (source1 or source2)")
            }
            Self::UnknownRow(id) => write!(f, "no row with id {id}"),
        }
    }
}

impl std::error::Error for FormError {}
