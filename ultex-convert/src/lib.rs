pub mod flatten;
pub mod schema;

pub use flatten::{SchemaError, flatten, write_csv, write_plain};
pub use schema::{COLUMNS, Column, Source, header_names};
