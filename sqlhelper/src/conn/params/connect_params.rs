//! Connection parameters
use super::connect_string::{DATABASE, PASSWORD, SERVER, TRUSTED_CONNECTION, USER_ID};
use crate::{Backend, ConnectParamsBuilder, ConnectString, HelperError, HelperResult, IntoConnectParams};
use secstr::SecUtf8;
use std::path::Path;

/// An immutable struct with all information necessary to open a new connection.
///
/// # Instantiating a `ConnectParams` using the `ConnectParamsBuilder`
///
/// See [`ConnectParamsBuilder`](crate::ConnectParamsBuilder) for details.
///
/// ```rust
/// use sqlhelper::ConnectParams;
///
/// let connect_params = ConnectParams::builder()
///     .server("db01")
///     .database("Sales")
///     .trusted(true)
///     .build()
///     .unwrap();
/// assert_eq!(
///     connect_params.to_string(),
///     "Server=db01; Database=Sales; Trusted_Connection=True;"
/// );
/// ```
///
/// # Instantiating a `ConnectParams` from a connection string
///
/// ```rust
/// use sqlhelper::{Backend, IntoConnectParams};
/// let connect_params = "Provider=mssql; Server=db01; Database=Sales; User Id=meier; Password=pw"
///     .into_connect_params()
///     .unwrap();
/// assert_eq!(connect_params.backend(), Backend::Mssql);
/// assert_eq!(connect_params.user(), Some("meier"));
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConnectParams {
    backend: Backend,
    source: ConnectSource,
}

/// Describes how the connection is formed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ConnectSource {
    /// Authentication with the OS identity of the process.
    Trusted {
        /// Server host, maybe with instance name or port.
        server: String,
        /// Database name, or file path for SQLite.
        database: String,
    },
    /// Authentication with user and password.
    Password {
        /// Server host, maybe with instance name or port.
        server: String,
        /// Database name, or file path for SQLite.
        database: String,
        /// Database user.
        user: String,
        /// Password of the database user.
        password: SecUtf8,
    },
    /// A complete connection string, which is passed on as it is.
    ConnectString(ConnectString),
}

impl ConnectParams {
    pub(crate) fn new(backend: Backend, source: ConnectSource) -> Self {
        Self { backend, source }
    }

    /// Returns a new builder for `ConnectParams`.
    pub fn builder() -> ConnectParamsBuilder {
        ConnectParamsBuilder::new()
    }

    /// Reads a connection string from the given file and converts it into `ConnectParams`.
    ///
    /// # Errors
    /// `HelperError::ConnParams`
    pub fn from_file<P: AsRef<Path>>(path: P) -> HelperResult<Self> {
        std::fs::read_to_string(path)
            .map_err(|e| HelperError::ConnParams {
                source: Box::new(e),
            })?
            .trim()
            .into_connect_params()
    }

    /// The backend to be used.
    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// The way the connection is formed.
    pub fn source(&self) -> &ConnectSource {
        &self.source
    }

    /// The server.
    pub fn server(&self) -> Option<&str> {
        match self.source {
            ConnectSource::Trusted { ref server, .. }
            | ConnectSource::Password { ref server, .. } => Some(server),
            ConnectSource::ConnectString(ref cs) => cs.server(),
        }
    }

    /// The database name.
    pub fn database(&self) -> Option<&str> {
        match self.source {
            ConnectSource::Trusted { ref database, .. }
            | ConnectSource::Password { ref database, .. } => Some(database),
            ConnectSource::ConnectString(ref cs) => cs.database(),
        }
    }

    /// The database user, if any.
    pub fn user(&self) -> Option<&str> {
        match self.source {
            ConnectSource::Trusted { .. } => None,
            ConnectSource::Password { ref user, .. } => Some(user),
            ConnectSource::ConnectString(ref cs) => cs.user(),
        }
    }

    /// True if the OS identity of the process is used for authentication.
    pub fn is_trusted(&self) -> bool {
        match self.source {
            ConnectSource::Trusted { .. } => true,
            ConnectSource::Password { .. } => false,
            ConnectSource::ConnectString(ref cs) => cs.is_trusted(),
        }
    }

    /// The connection string that results from these parameters.
    ///
    /// With trusted authentication, this is
    /// `Server=<server>; Database=<database>; Trusted_Connection=True;`,
    /// with user and password it is
    /// `Server=<server>; Database=<database>; User Id=<user>; Password=<password>;`.
    /// A given connection string is returned as it is.
    ///
    /// Note that `Display` of the returned value hides the password.
    pub fn connect_string(&self) -> ConnectString {
        let mut cs = ConnectString::new();
        match self.source {
            ConnectSource::Trusted {
                ref server,
                ref database,
            } => {
                cs.set(SERVER, server)
                    .set(DATABASE, database)
                    .set(TRUSTED_CONNECTION, "True");
            }
            ConnectSource::Password {
                ref server,
                ref database,
                ref user,
                ref password,
            } => {
                cs.set(SERVER, server)
                    .set(DATABASE, database)
                    .set(USER_ID, user)
                    .set(PASSWORD, password.unsecure());
            }
            ConnectSource::ConnectString(ref given) => return given.clone(),
        }
        cs
    }
}

impl std::fmt::Display for ConnectParams {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.connect_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{ConnectParams, ConnectSource};
    use crate::{Backend, IntoConnectParams};

    #[test]
    fn test_connect_string_formats() {
        let params = ConnectParams::builder()
            .server("h1")
            .database("d1")
            .trusted(true)
            .build()
            .unwrap();
        assert_eq!(
            params.connect_string().to_unredacted_string(),
            "Server=h1; Database=d1; Trusted_Connection=True;"
        );
        assert!(params.is_trusted());
        assert_eq!(params.user(), None);

        let params = ConnectParams::builder()
            .server("h1")
            .database("d1")
            .user("u1")
            .password("p1")
            .build()
            .unwrap();
        assert_eq!(
            params.connect_string().to_unredacted_string(),
            "Server=h1; Database=d1; User Id=u1; Password=p1;"
        );
        assert_eq!(
            params.to_string(),
            "Server=h1; Database=d1; User Id=u1; Password=***;"
        );
        assert!(!format!("{params:?}").contains("p1"));

        let params = "Server = h1;Database=d1 ; Encrypt=false"
            .into_connect_params()
            .unwrap();
        assert_eq!(params.backend(), Backend::Sqlite);
        assert!(matches!(params.source(), ConnectSource::ConnectString(_)));
        assert_eq!(params.server(), Some("h1"));
        assert_eq!(
            params.connect_string().to_unredacted_string(),
            "Server=h1; Database=d1; Encrypt=false;"
        );
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cs.txt");
        std::fs::write(&path, "Provider=sqlite; Data Source=/tmp/x.db\n").unwrap();
        let params = ConnectParams::from_file(&path).unwrap();
        assert_eq!(params.server(), Some("/tmp/x.db"));

        assert!(ConnectParams::from_file(dir.path().join("missing.txt")).is_err());
    }
}
