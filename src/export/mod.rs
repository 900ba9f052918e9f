//! Result materialisation: pretty JSON and flattened CSV.

pub mod flatten;
pub mod writer;

pub use flatten::{flatten_entries, flatten_result, FlatTable};
pub use writer::{ExportOutcome, OutputFormat};
