use crate::{DbValue, HelperError, HelperResult, ResultSetMetadata};
use std::sync::Arc;

/// A single line of a `ResultSet`, consisting of the contained `DbValue`s and
/// a reference to the metadata.
///
/// You can access individual values with `row[idx]`, or iterate over the values (with
/// `for value in row {...}`).
#[derive(Debug)]
pub struct Row {
    metadata: Arc<ResultSetMetadata>,
    value_iter: <Vec<DbValue> as IntoIterator>::IntoIter,
}

impl Row {
    pub(crate) fn new(metadata: Arc<ResultSetMetadata>, values: Vec<DbValue>) -> Self {
        Self {
            metadata,
            value_iter: values.into_iter(),
        }
    }

    /// Removes and returns the next value.
    pub fn next_value(&mut self) -> Option<DbValue> {
        self.value_iter.next()
    }

    /// Returns the length of the row.
    pub fn len(&self) -> usize {
        self.value_iter.len()
    }

    /// Returns true if the row contains no value.
    pub fn is_empty(&self) -> bool {
        self.value_iter.as_slice().is_empty()
    }

    /// Converts itself in the single contained value.
    ///
    /// # Errors
    ///
    /// `HelperError::Usage` if the row is empty or has more than one value.
    pub fn into_single_value(mut self) -> HelperResult<DbValue> {
        if self.len() > 1 {
            Err(HelperError::Usage("Row has more than one field"))
        } else {
            self.next_value()
                .ok_or_else(|| HelperError::Usage("Row is empty"))
        }
    }

    /// Converts the remaining values into their text form.
    ///
    /// # Errors
    ///
    /// `HelperError::Utf8` if a value is text that is not valid UTF-8.
    pub fn into_strings(self) -> HelperResult<Vec<String>> {
        self.value_iter.map(DbValue::try_into_string).collect()
    }

    /// Returns the metadata.
    pub fn metadata(&self) -> &ResultSetMetadata {
        &self.metadata
    }
}

/// Support indexing.
impl std::ops::Index<usize> for Row {
    type Output = DbValue;
    fn index(&self, idx: usize) -> &DbValue {
        &self.value_iter.as_slice()[idx]
    }
}

/// Row is an iterator with item `DbValue`.
impl Iterator for Row {
    type Item = DbValue;
    fn next(&mut self) -> Option<DbValue> {
        self.next_value()
    }
}

impl std::fmt::Display for Row {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        for v in self.value_iter.as_slice() {
            write!(fmt, "{v}, ")?;
        }
        Ok(())
    }
}
