pub mod error;
pub mod extract;
pub mod schema;
pub mod types;

pub use error::{ExtractError, ExtractStage};
pub use schema::{ColumnMapping, Field, SchemaSet, SourceSchema, ValueFormat};
pub use types::{FieldValue, RawTable, SourceRow, SourceTable};
