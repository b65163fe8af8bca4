#[cfg(feature = "mssql")]
mod mssql_client;
#[cfg(feature = "sqlite")]
mod sqlite_client;

#[cfg(feature = "mssql")]
use mssql_client::MssqlClient;
#[cfg(feature = "sqlite")]
use sqlite_client::SqliteClient;

use crate::types_impl::Binding;
use crate::{usage_err, Backend, ConnectParams, HelperError, HelperResult, ResultSetMetadata};
use std::marker::PhantomData;
use std::time::Instant;

// Rows as they were fetched from the client library.
pub(crate) type Fetched = (ResultSetMetadata, Vec<Vec<crate::DbValue>>);

// An open session of one of the supported client libraries.
#[allow(clippy::large_enum_variant)]
#[derive(Debug)]
pub(crate) enum DbClient<'a> {
    #[cfg(feature = "sqlite")]
    Sqlite(SqliteClient<'a>),

    #[cfg(feature = "mssql")]
    Mssql(MssqlClient),

    // After disconnect.
    Closed {
        params: Option<ConnectParams>,
        _handle: PhantomData<&'a mut ()>,
    },
}

impl DbClient<'static> {
    // Opens a session with the backend that is selected by the params.
    pub fn try_new(params: ConnectParams) -> HelperResult<Self> {
        let start = Instant::now();
        trace!("DbClient: connecting to {params}");
        let client = match params.backend() {
            #[cfg(feature = "sqlite")]
            Backend::Sqlite => Self::Sqlite(SqliteClient::try_new(params)?),
            #[cfg(feature = "mssql")]
            Backend::Mssql => Self::Mssql(MssqlClient::try_new(params)?),
            #[allow(unreachable_patterns)]
            backend => {
                return Err(usage_err!(
                    "backend {backend} is not available, it requires the cargo feature `{backend}`"
                ))
            }
        };
        debug!(
            "Connection of type {} is opened ({} µs)",
            client.s_type(),
            start.elapsed().as_micros(),
        );
        Ok(client)
    }
}

impl<'a> DbClient<'a> {
    #[cfg(feature = "sqlite")]
    pub fn from_sqlite(conn: &'a mut rusqlite::Connection) -> Self {
        Self::Sqlite(SqliteClient::from_borrowed(conn))
    }

    // Returns a descriptor of the chosen type
    pub fn s_type(&self) -> &'static str {
        match self {
            #[cfg(feature = "sqlite")]
            Self::Sqlite(_) => "SQLite",
            #[cfg(feature = "mssql")]
            Self::Mssql(_) => "SQL Server",
            Self::Closed { .. } => "Closed connection",
        }
    }

    pub fn backend(&self) -> Option<Backend> {
        match self {
            #[cfg(feature = "sqlite")]
            Self::Sqlite(_) => Some(Backend::Sqlite),
            #[cfg(feature = "mssql")]
            Self::Mssql(_) => Some(Backend::Mssql),
            Self::Closed { params, .. } => params.as_ref().map(ConnectParams::backend),
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed { .. })
    }

    pub fn connect_params(&self) -> Option<&ConnectParams> {
        match self {
            #[cfg(feature = "sqlite")]
            Self::Sqlite(client) => client.connect_params(),
            #[cfg(feature = "mssql")]
            Self::Mssql(client) => Some(client.connect_params()),
            Self::Closed { params, .. } => params.as_ref(),
        }
    }

    pub fn query(&mut self, cmd: &str, bindings: &[Binding]) -> HelperResult<Fetched> {
        match self {
            #[cfg(feature = "sqlite")]
            Self::Sqlite(client) => client.query(cmd, bindings),
            #[cfg(feature = "mssql")]
            Self::Mssql(client) => client.query(cmd, bindings),
            Self::Closed { .. } => Err(HelperError::NotConnected),
        }
    }

    pub fn execute(&mut self, cmd: &str, bindings: &[Binding]) -> HelperResult<usize> {
        match self {
            #[cfg(feature = "sqlite")]
            Self::Sqlite(client) => client.execute(cmd, bindings),
            #[cfg(feature = "mssql")]
            Self::Mssql(client) => client.execute(cmd, bindings),
            Self::Closed { .. } => Err(HelperError::NotConnected),
        }
    }

    pub fn server_version(&mut self) -> HelperResult<String> {
        match self {
            #[cfg(feature = "sqlite")]
            Self::Sqlite(_) => Ok(SqliteClient::server_version()),
            #[cfg(feature = "mssql")]
            Self::Mssql(client) => client.server_version(),
            Self::Closed { .. } => Err(HelperError::NotConnected),
        }
    }

    // Closes the session (a borrowed one is only detached); the client is Closed afterwards.
    pub fn close(&mut self) -> HelperResult<()> {
        let params = self.connect_params().cloned();
        let closed = Self::Closed {
            params,
            _handle: PhantomData,
        };
        trace!("DbClient::close() ({})", self.s_type());
        match std::mem::replace(self, closed) {
            #[cfg(feature = "sqlite")]
            Self::Sqlite(client) => client.close(),
            #[cfg(feature = "mssql")]
            Self::Mssql(client) => client.close(),
            Self::Closed { .. } => Err(HelperError::NotConnected),
        }
    }
}
