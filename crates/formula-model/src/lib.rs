//! `formula-model` defines the shared spreadsheet vocabulary used by the
//! formula front end.
//!
//! The crate is intentionally self-contained so it can be reused by:
//! - the lexer/parser (error literals, column-label decoding)
//! - a future evaluator and reference-rewriting layers
//! - IPC/WASM boundaries via `serde` (JSON-safe schema)

mod address;
mod error;

pub use address::{column_index_to_label, column_label_to_index, ColumnLabelError};
pub use error::{ErrorValue, ParseErrorValueError};
