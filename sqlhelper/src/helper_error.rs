use crate::SqlType;
use thiserror::Error;

/// A list specifying categories of [`HelperError`](crate::HelperError).
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum HelperError {
    /// Erroneous connection parameters, e.g. from a malformed connection string.
    #[error("Erroneous connection parameters")]
    ConnParams {
        /// The causing Error.
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    /// The SQLite client library reported an error.
    #[cfg(feature = "sqlite")]
    #[error("SQLite reported an error")]
    Sqlite {
        /// The causing Error.
        #[from]
        source: rusqlite::Error,
    },

    /// The SQL Server client library reported an error.
    #[cfg(feature = "mssql")]
    #[error("SQL Server client reported an error")]
    Mssql {
        /// The causing Error.
        #[from]
        source: tiberius::error::Error,
    },

    /// Error occured in communication with the database.
    #[error(transparent)]
    Io {
        /// The causing Error.
        #[from]
        source: std::io::Error,
    },

    /// The connection was never opened, or was already closed.
    #[error("No open connection")]
    NotConnected,

    /// A result set of this connection is still open.
    #[error("A result set of this connection is still open and must be closed first")]
    CursorOpen,

    /// A parameter was given without a name.
    #[error("Parameter at position {index} has no name")]
    MissingParameterName {
        /// Position of the parameter in the parameter list.
        index: usize,
    },

    /// The same parameter name occurs more than once in the parameter list.
    #[error("Parameter '{0}' is given more than once")]
    DuplicateParameter(String),

    /// A parameter names a placeholder that does not occur in the command text.
    #[error("Parameter '{0}' does not match any placeholder in the command text")]
    UnknownParameter(String),

    /// A placeholder in the command text is not bound by any parameter.
    #[error("Placeholder '{0}' is not bound by any parameter")]
    UnboundPlaceholder(String),

    /// A strongly-typed binding was requested, but the parameter has no type.
    #[error("Parameter '{0}' needs an explicit type")]
    MissingType(String),

    /// The value of a parameter does not fit to the parameter's type.
    #[error("Parameter '{name}' has type {expected}, but its value is of kind {found}")]
    TypeMismatch {
        /// The parameter name.
        name: String,
        /// The declared type.
        expected: SqlType,
        /// The kind of the given value.
        found: &'static str,
    },

    /// A text value could not be converted to a string.
    #[error("Text value is not valid UTF-8")]
    Utf8 {
        /// The causing Error.
        #[from]
        source: std::string::FromUtf8Error,
    },

    /// Implementation error.
    #[error("Implementation error: {}", _0)]
    Impl(&'static str),

    /// Error caused by wrong usage.
    #[error("Wrong usage: {}", _0)]
    Usage(&'static str),

    /// Error caused by wrong usage.
    #[error("Wrong usage: {}", _0)]
    UsageDetailed(String),
}

/// Abbreviation of `Result<T, HelperError>`.
pub type HelperResult<T> = std::result::Result<T, HelperError>;

impl HelperError {
    /// Reveal the inner error
    #[must_use]
    pub fn inner(&self) -> Option<&dyn std::error::Error> {
        match self {
            Self::ConnParams { source } => Some(&**source),
            #[cfg(feature = "sqlite")]
            Self::Sqlite { source } => Some(source),
            #[cfg(feature = "mssql")]
            Self::Mssql { source } => Some(source),
            Self::Io { source } => Some(source),
            Self::Utf8 { source } => Some(source),
            _ => None,
        }
    }

    pub(crate) fn conn_params(error: Box<dyn std::error::Error + Send + Sync + 'static>) -> Self {
        Self::ConnParams { source: error }
    }

    /// Returns a decently formed and hopefully helpful error description.
    #[must_use]
    pub fn display_with_inner(&self) -> String {
        if let Some(e) = self.inner() {
            format!("{self}, caused by {e}")
        } else {
            format!("{self}")
        }
    }

    /// True if the error was reported by the database client library.
    #[must_use]
    pub fn is_database_error(&self) -> bool {
        match self {
            #[cfg(feature = "sqlite")]
            Self::Sqlite { .. } => true,
            #[cfg(feature = "mssql")]
            Self::Mssql { .. } => true,
            _ => false,
        }
    }
}

/// Creates a [`HelperError::UsageDetailed`] with `format!`-like arguments.
#[macro_export]
macro_rules! usage_err {
    ($($arg:tt)*) => {
        $crate::HelperError::UsageDetailed(format!($($arg)*))
    };
}

#[cfg(test)]
mod test {
    use super::HelperError;

    #[test]
    fn test_display_with_inner() {
        let e = HelperError::conn_params(Box::new(std::io::Error::new(
            std::io::ErrorKind::Other,
            "disk on fire",
        )));
        assert_eq!(
            e.display_with_inner(),
            "Erroneous connection parameters, caused by disk on fire"
        );

        let e = usage_err!("{} is not {}", "x", 42);
        assert_eq!(e.to_string(), "Wrong usage: x is not 42");
        assert!(e.inner().is_none());
        assert!(!e.is_database_error());

        let e = HelperError::MissingParameterName { index: 2 };
        assert_eq!(e.display_with_inner(), "Parameter at position 2 has no name");
    }
}
