use crate::{HelperError, HelperResult, ResultSet};
use serde::Serialize;
use std::ops::Deref;

/// A query result as a table of strings.
///
/// If the table was created with header, its first row contains the column names.
/// All rows have the same width, which is the number of columns of the query.
///
/// The values are converted to text with the `Display` rules of [`DbValue`](crate::DbValue),
/// so the content does not depend on the locale of the process.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct ResultTable {
    has_header: bool,
    rows: Vec<Vec<String>>,
}

impl ResultTable {
    // Drains the result set into a table, and closes it in any case.
    pub(crate) fn materialize(
        mut result_set: ResultSet,
        include_header: bool,
    ) -> HelperResult<Self> {
        let filled = Self::fill(&mut result_set, include_header);
        let closed = result_set.close();
        let table = filled?;
        closed?;
        Ok(table)
    }

    fn fill(result_set: &mut ResultSet, include_header: bool) -> HelperResult<Self> {
        let metadata = result_set.metadata();
        let width = metadata.len();
        let mut rows = Vec::new();
        if include_header {
            rows.push(metadata.names());
        }
        while let Some(row) = result_set.next_row()? {
            if row.len() != width {
                return Err(HelperError::Impl("row width differs from column count"));
            }
            rows.push(row.into_strings()?);
        }
        debug!(
            "materialized {} rows with {width} columns",
            rows.len() - usize::from(include_header)
        );
        Ok(Self {
            has_header: include_header,
            rows,
        })
    }

    /// True if the first row contains the column names.
    pub fn has_header(&self) -> bool {
        self.has_header
    }

    /// The header row, if the table was created with header.
    pub fn header(&self) -> Option<&[String]> {
        if self.has_header {
            self.rows.first().map(Vec::as_slice)
        } else {
            None
        }
    }

    /// The rows without the header.
    pub fn data_rows(&self) -> &[Vec<String>] {
        if self.has_header {
            &self.rows[1..]
        } else {
            &self.rows
        }
    }

    /// The number of columns, or `None` if the table has no rows at all.
    pub fn width(&self) -> Option<usize> {
        self.rows.first().map(Vec::len)
    }

    /// Returns all rows, including the header row.
    pub fn into_rows(self) -> Vec<Vec<String>> {
        self.rows
    }
}

impl Deref for ResultTable {
    type Target = [Vec<String>];
    fn deref(&self) -> &Self::Target {
        &self.rows
    }
}

// Tab separated lines.
impl std::fmt::Display for ResultTable {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        for row in &self.rows {
            writeln!(fmt, "{}", row.join("\t"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::ResultTable;
    use crate::result::result_set::test::result_set;
    use crate::{DbValue, HelperError};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_empty_result() {
        let flag = Arc::new(AtomicBool::new(false));

        let table =
            ResultTable::materialize(result_set(&flag, &["ID", "NAME"], vec![]), true).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.header().unwrap(), &["ID", "NAME"]);
        assert!(table.data_rows().is_empty());
        assert_eq!(table.width(), Some(2));

        let table =
            ResultTable::materialize(result_set(&flag, &["ID", "NAME"], vec![]), false).unwrap();
        assert!(table.is_empty());
        assert!(table.header().is_none());
        assert_eq!(table.width(), None);
        assert!(!flag.load(Ordering::Acquire));
    }

    #[test]
    fn test_values() {
        let flag = Arc::new(AtomicBool::new(false));
        let rs = result_set(
            &flag,
            &["ID", "NAME", "DATA"],
            vec![
                vec![DbValue::INT(3), DbValue::from("x'y"), DbValue::BINARY(vec![1, 171])],
                vec![DbValue::BIGINT(-4), DbValue::NULL, DbValue::NULL],
            ],
        );
        let table = rs.into_table(false).unwrap();
        assert_eq!(
            table.into_rows(),
            vec![
                vec!["3".to_string(), "x'y".to_string(), "01ab".to_string()],
                vec!["-4".to_string(), String::new(), String::new()],
            ]
        );
    }

    #[test]
    fn test_closes_cursor_on_error() {
        let flag = Arc::new(AtomicBool::new(false));
        let rs = result_set(
            &flag,
            &["T"],
            vec![
                vec![DbValue::from("fine")],
                vec![DbValue::DBSTRING(vec![0xc3, 0x28])],
                vec![DbValue::from("never read")],
            ],
        );
        assert!(flag.load(Ordering::Acquire));
        assert!(matches!(
            ResultTable::materialize(rs, true),
            Err(HelperError::Utf8 { .. })
        ));
        assert!(!flag.load(Ordering::Acquire));

        let rs = result_set(&flag, &["A", "B"], vec![vec![DbValue::INT(1)]]);
        assert!(matches!(
            ResultTable::materialize(rs, false),
            Err(HelperError::Impl(_))
        ));
        assert!(!flag.load(Ordering::Acquire));
    }

    #[test]
    fn test_display_and_serialize() {
        let flag = Arc::new(AtomicBool::new(false));
        let rs = result_set(&flag, &["A", "B"], vec![vec![DbValue::INT(1), DbValue::from("b")]]);
        let table = rs.into_table(true).unwrap();
        assert_eq!(table.to_string(), "A\tB\n1\tb\n");
        assert_eq!(
            serde_json::to_string(&table).unwrap(),
            r#"{"has_header":true,"rows":[["A","B"],["1","b"]]}"#
        );
    }
}
