pub mod models;
pub mod sheet;

pub use models::{InputRecord, ResultRow, RowStatus};
pub use sheet::{limit_records, load_records, write_results};
