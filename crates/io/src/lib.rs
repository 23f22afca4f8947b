// File I/O: tabular summaries in, JSON configuration out

pub mod csv;
pub mod error;
pub mod json;
pub mod tabular;
pub mod xlsx;

pub use error::{SinkError, TabularError};
pub use json::{write_config, ConfigArtifact};
pub use tabular::{read_summary, ReadOptions, TableFormat};
