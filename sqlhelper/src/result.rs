// Query results: metadata, rows, the forward-only result set, and its table form.

mod metadata;
mod result_set;
mod result_table;
mod row;

pub use {
    metadata::{ColumnMetadata, ResultSetMetadata},
    result_set::ResultSet,
    result_table::ResultTable,
    row::Row,
};

pub(crate) use result_set::CursorGuard;
