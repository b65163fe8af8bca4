use std::ops::Deref;

/// Metadata of a column of a result set.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ColumnMetadata {
    name: String,
    declared_type: Option<String>,
}

impl ColumnMetadata {
    pub(crate) fn new<S: Into<String>>(name: S, declared_type: Option<String>) -> Self {
        Self {
            name: name.into(),
            declared_type,
        }
    }

    /// The column name, as delivered by the database.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The column type as reported by the database, if known.
    ///
    /// SQLite reports the type from the table declaration, which is unknown for expressions.
    pub fn declared_type(&self) -> Option<&str> {
        self.declared_type.as_deref()
    }
}

/// List of metadata of the columns of a result set, in the order of the projection list.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ResultSetMetadata(Vec<ColumnMetadata>);

impl ResultSetMetadata {
    pub(crate) fn new(columns: Vec<ColumnMetadata>) -> Self {
        Self(columns)
    }

    /// The column names.
    pub fn names(&self) -> Vec<String> {
        self.0.iter().map(|c| c.name.clone()).collect()
    }
}

impl Deref for ResultSetMetadata {
    type Target = Vec<ColumnMetadata>;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::fmt::Display for ResultSetMetadata {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        for column in &self.0 {
            write!(fmt, "{}, ", column.name)?;
        }
        Ok(())
    }
}
