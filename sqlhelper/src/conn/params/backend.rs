use crate::{usage_err, HelperError};

/// The client library that is used to talk to the database.
///
/// A backend is only usable if the crate was compiled with the cargo feature of the same name.
/// In a connection string, the backend is selected with the key `Provider`.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Backend {
    /// SQLite, using `rusqlite`.
    #[default]
    Sqlite,
    /// Microsoft SQL Server, using `tiberius`.
    Mssql,
}

impl Backend {
    /// Returns true if support for this backend was compiled in.
    pub fn is_available(self) -> bool {
        match self {
            Self::Sqlite => cfg!(feature = "sqlite"),
            Self::Mssql => cfg!(feature = "mssql"),
        }
    }

    // T-SQL block comments nest, SQLite ones end at the first `*/`.
    pub(crate) fn nests_block_comments(self) -> bool {
        matches!(self, Self::Mssql)
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            Self::Sqlite => write!(f, "sqlite"),
            Self::Mssql => write!(f, "mssql"),
        }
    }
}

impl std::str::FromStr for Backend {
    type Err = HelperError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" | "sqlite3" => Ok(Self::Sqlite),
            "mssql" | "sqlserver" | "sql server" => Ok(Self::Mssql),
            _ => Err(usage_err!(
                "unknown provider '{s}', supported are 'sqlite' and 'mssql'"
            )),
        }
    }
}

/// How an SQLite database file is opened, set with the connection string key `Mode`.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum SqliteMode {
    /// Opens the file for reading and writing, and creates it if it does not exist.
    #[default]
    ReadWriteCreate,
    /// Opens an existing file for reading and writing.
    ReadWrite,
    /// Opens an existing file for reading only.
    ReadOnly,
    /// Opens a (possibly shared) in-memory database; the path is used as its name.
    Memory,
}

impl std::str::FromStr for SqliteMode {
    type Err = HelperError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "readwritecreate" => Ok(Self::ReadWriteCreate),
            "readwrite" => Ok(Self::ReadWrite),
            "readonly" => Ok(Self::ReadOnly),
            "memory" => Ok(Self::Memory),
            _ => Err(usage_err!("unknown SQLite mode '{s}'")),
        }
    }
}
