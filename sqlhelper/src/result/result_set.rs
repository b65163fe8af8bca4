use crate::{DbValue, HelperError, HelperResult, ResultSetMetadata, ResultTable, Row};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

// Marks the connection as having an open cursor, as long as it exists.
#[derive(Debug)]
pub(crate) struct CursorGuard(Arc<AtomicBool>);

impl CursorGuard {
    pub(crate) fn acquire(cursor_open: &Arc<AtomicBool>) -> HelperResult<Self> {
        if cursor_open.swap(true, Ordering::AcqRel) {
            Err(HelperError::CursorOpen)
        } else {
            Ok(Self(Arc::clone(cursor_open)))
        }
    }
}

impl Drop for CursorGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// The result of a database query, a forward-only cursor over its rows.
///
/// `ResultSet` implements `std::iter::Iterator`, so you can
/// directly iterate over the rows of a result set.
///
/// The connection that produced the result set cannot execute further commands
/// before the result set is closed, either explicitly with [`ResultSet::close`],
/// or by dropping it, or implicitly when it is converted with [`ResultSet::into_table`].
///
/// ```rust
/// # use sqlhelper::{Connection, HelperResult, Parameter};
/// # fn main() -> HelperResult<()> {
/// let mut connection = Connection::new("Data Source=:memory:")?;
/// let mut result_set = connection.read(
///     "SELECT @a + 1 AS a1, @b AS b",
///     &[Parameter::new("a", 41_i64), Parameter::new("@b", "x")],
/// )?;
/// assert_eq!(result_set.metadata()[0].name(), "a1");
/// while let Some(row) = result_set.next_row()? {
///     assert_eq!(row[0], 42_i64);
/// }
/// result_set.close()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ResultSet {
    metadata: Arc<ResultSetMetadata>,
    rows: std::vec::IntoIter<Vec<DbValue>>,
    cursor: Option<CursorGuard>,
}

impl ResultSet {
    pub(crate) fn new(
        metadata: Arc<ResultSetMetadata>,
        rows: Vec<Vec<DbValue>>,
        cursor: CursorGuard,
    ) -> Self {
        Self {
            metadata,
            rows: rows.into_iter(),
            cursor: Some(cursor),
        }
    }

    /// Access to metadata.
    pub fn metadata(&self) -> Arc<ResultSetMetadata> {
        Arc::clone(&self.metadata)
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.metadata.len()
    }

    /// True if the result set was closed.
    pub fn is_closed(&self) -> bool {
        self.cursor.is_none()
    }

    /// Removes the next row and returns it, or None if the `ResultSet` is exhausted.
    ///
    /// # Errors
    ///
    /// `HelperError::Usage` if the result set was already closed.
    pub fn next_row(&mut self) -> HelperResult<Option<Row>> {
        if self.is_closed() {
            return Err(HelperError::Usage("result set is already closed"));
        }
        Ok(self
            .rows
            .next()
            .map(|values| Row::new(Arc::clone(&self.metadata), values)))
    }

    /// Closes the result set; the remaining rows are discarded.
    ///
    /// Closing an already closed result set has no effect.
    ///
    /// # Errors
    ///
    /// Currently none; the signature allows backends that close cursors on the server.
    pub fn close(&mut self) -> HelperResult<()> {
        if let Some(cursor) = self.cursor.take() {
            trace!("ResultSet::close(), {} rows unread", self.rows.len());
            self.rows = Vec::new().into_iter();
            drop(cursor);
        }
        Ok(())
    }

    /// Converts the result set into a table of strings, and closes it.
    ///
    /// With `include_header`, the first row of the table contains the column names.
    ///
    /// # Errors
    ///
    /// `HelperError::Utf8` if a value cannot be converted into a string.
    /// The result set is closed also in the error case.
    pub fn into_table(self, include_header: bool) -> HelperResult<ResultTable> {
        ResultTable::materialize(self, include_header)
    }
}

impl std::fmt::Display for ResultSet {
    // Writes a header and then the data
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(fmt, "{}", &self.metadata)?;
        for values in self.rows.as_slice() {
            for value in values {
                write!(fmt, "{value}, ")?;
            }
            writeln!(fmt)?;
        }
        Ok(())
    }
}

impl Iterator for ResultSet {
    type Item = HelperResult<Row>;
    fn next(&mut self) -> Option<HelperResult<Row>> {
        match self.next_row() {
            Ok(Some(row)) => Some(Ok(row)),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::{CursorGuard, ResultSet};
    use crate::{ColumnMetadata, DbValue, HelperError, ResultSetMetadata};
    use std::sync::{atomic::AtomicBool, atomic::Ordering, Arc};

    pub(crate) fn result_set(
        flag: &Arc<AtomicBool>,
        names: &[&str],
        rows: Vec<Vec<DbValue>>,
    ) -> ResultSet {
        let metadata = ResultSetMetadata::new(
            names
                .iter()
                .map(|name| ColumnMetadata::new(*name, None))
                .collect(),
        );
        ResultSet::new(
            Arc::new(metadata),
            rows,
            CursorGuard::acquire(flag).unwrap(),
        )
    }

    #[test]
    fn test_cursor_guard() {
        let flag = Arc::new(AtomicBool::new(false));
        let mut rs = result_set(&flag, &["A"], vec![vec![DbValue::INT(1)], vec![DbValue::INT(2)]]);
        assert!(flag.load(Ordering::Acquire));
        assert!(matches!(
            CursorGuard::acquire(&flag),
            Err(HelperError::CursorOpen)
        ));

        assert_eq!(rs.next_row().unwrap().unwrap()[0], 1_i64);
        rs.close().unwrap();
        assert!(!flag.load(Ordering::Acquire));
        assert!(rs.next_row().is_err());
        rs.close().unwrap();

        let rs = result_set(&flag, &["A"], vec![]);
        assert!(flag.load(Ordering::Acquire));
        drop(rs);
        assert!(!flag.load(Ordering::Acquire));
    }

    #[test]
    fn test_iterator() {
        let flag = Arc::new(AtomicBool::new(false));
        let rs = result_set(
            &flag,
            &["A", "B"],
            vec![
                vec![DbValue::INT(1), DbValue::from("x")],
                vec![DbValue::INT(2), DbValue::NULL],
            ],
        );
        let rows: Vec<_> = rs.map(Result::unwrap).collect();
        assert_eq!(rows.len(), 2);
        assert!(rows[1][1].is_null());
        assert_eq!(rows[0].metadata()[1].name(), "B");
    }
}
