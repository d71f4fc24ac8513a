//! Input readers.
pub mod table;

pub use table::{read_table, RawTable, TableReaderConfig};
