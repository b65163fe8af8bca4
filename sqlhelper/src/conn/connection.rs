use super::placeholders;
use super::DbClient;
use crate::result::CursorGuard;
use crate::types_impl::{Binding, BindingMode};
use crate::{
    Backend, ConnectParams, ConnectionStatistics, HelperError, HelperResult, IntoConnectParams,
    Parameter, ResultSet, ResultTable,
};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Instant;

/// A synchronous connection to the database.
///
/// All commands are executed with named parameters, which are bound to the
/// placeholders (`@name`) of the command text.
/// Binding is the protection against SQL injection: values are never spliced into
/// the command text.
///
/// A connection can have at most one open [`ResultSet`]; it must be closed
/// (or dropped, or converted into a table) before the next command can be executed.
///
/// # Example
///
/// ```rust
/// use sqlhelper::{Connection, HelperResult, Parameter, SqlType};
/// # fn main() -> HelperResult<()> {
/// let mut connection = Connection::new("Data Source=:memory:")?;
/// connection.write("CREATE TABLE T (ID INTEGER, NAME TEXT)", &[])?;
/// let count = connection.write(
///     "INSERT INTO T (ID, NAME) VALUES (@id, @name)",
///     &[
///         Parameter::typed("id", SqlType::Int, 3),
///         Parameter::typed("name", SqlType::NVarChar, "O'Hara"),
///     ],
/// )?;
/// assert_eq!(count, 1);
///
/// let table = connection.read_to_table("SELECT ID, NAME FROM T", &[], true)?;
/// assert_eq!(table.into_rows(), vec![vec!["ID", "NAME"], vec!["3", "O'Hara"]]);
/// connection.disconnect()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Connection<'a> {
    client: DbClient<'a>,
    cursor_open: Arc<AtomicBool>,
    statistics: ConnectionStatistics,
}

impl Connection<'static> {
    /// Factory method for connections.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use sqlhelper::Connection;
    /// let conn = Connection::new(
    ///     "Provider=mssql; Server=db01; Database=Sales; User Id=meier; Password=pw"
    /// ).unwrap();
    /// ```
    ///
    /// # Errors
    ///
    /// Several variants of `HelperError` can occur.
    pub fn new<P: IntoConnectParams>(params: P) -> HelperResult<Self> {
        Ok(Self::with_client(DbClient::try_new(
            params.into_connect_params()?,
        )?))
    }
}

impl<'a> Connection<'a> {
    fn with_client(client: DbClient<'a>) -> Self {
        Self {
            client,
            cursor_open: Arc::new(AtomicBool::new(false)),
            statistics: ConnectionStatistics::new(),
        }
    }

    /// Uses a SQLite connection that was opened by the caller.
    ///
    /// The caller keeps the ownership: [`Connection::disconnect`] only detaches
    /// from the borrowed connection, it does not close it.
    ///
    /// ```rust
    /// # use sqlhelper::{Connection, HelperResult, rusqlite};
    /// # fn main() -> HelperResult<()> {
    /// let mut sqlite_conn = rusqlite::Connection::open_in_memory()?;
    /// {
    ///     let mut connection = Connection::from_sqlite(&mut sqlite_conn);
    ///     connection.write("CREATE TABLE T (ID INTEGER)", &[])?;
    ///     connection.disconnect()?;
    /// }
    /// sqlite_conn.execute("INSERT INTO T VALUES (1)", [])?;
    /// # Ok(())
    /// # }
    /// ```
    #[cfg(feature = "sqlite")]
    pub fn from_sqlite(conn: &'a mut rusqlite::Connection) -> Self {
        debug!("Connection::from_sqlite()");
        Self::with_client(DbClient::from_sqlite(conn))
    }

    /// Returns true until the connection is disconnected.
    pub fn is_connected(&self) -> bool {
        !self.client.is_closed()
    }

    /// The parameters with which the connection was opened.
    ///
    /// `None` for a connection that was created from a caller's client library handle.
    pub fn connect_params(&self) -> Option<&ConnectParams> {
        self.client.connect_params()
    }

    /// The backend of the connection.
    ///
    /// `None` for a disconnected connection that was created from a caller's handle.
    pub fn backend(&self) -> Option<Backend> {
        self.client.backend()
    }

    /// Executes a query and returns its result as a forward-only cursor.
    ///
    /// Type hints of the parameters are advisory: values that do not fit to their hint
    /// are rejected, parameters without hint are bound with the type of their value.
    ///
    /// # Errors
    ///
    /// - `HelperError::NotConnected` if the connection is closed,
    /// - `HelperError::CursorOpen` if a result set of this connection is still open,
    /// - `HelperError::MissingParameterName`, `HelperError::DuplicateParameter`,
    ///   `HelperError::UnknownParameter`, `HelperError::TypeMismatch`
    ///   for unusable parameters,
    /// - errors from the database.
    pub fn read(&mut self, cmd: &str, params: &[Parameter]) -> HelperResult<ResultSet> {
        let cursor = self.prepare_cursor()?;
        let bindings = self.bindings(cmd, params, BindingMode::Advisory)?;
        self.query(cmd, &bindings, cursor)
    }

    /// Executes a query and materializes its result into a table of strings.
    ///
    /// With `include_header`, the first row of the table contains the column names.
    /// The cursor is closed in any case.
    ///
    /// # Errors
    ///
    /// The errors of [`Connection::read`], and `HelperError::Utf8` if a value cannot
    /// be converted into a string.
    pub fn read_to_table(
        &mut self,
        cmd: &str,
        params: &[Parameter],
        include_header: bool,
    ) -> HelperResult<ResultTable> {
        self.read(cmd, params)?.into_table(include_header)
    }

    /// Executes a command text without parameters.
    ///
    /// # Errors
    ///
    /// `HelperError::NotConnected`, `HelperError::CursorOpen`, errors from the database.
    #[deprecated(
        note = "no protection against SQL injection; use `read` with parameters instead"
    )]
    pub fn read_raw(&mut self, cmd: &str) -> HelperResult<ResultSet> {
        warn!("read_raw() is used, the command text is executed as it is");
        let cursor = self.prepare_cursor()?;
        self.query(cmd, &[], cursor)
    }

    /// Executes a command text without parameters and materializes the result.
    ///
    /// # Errors
    ///
    /// The errors of [`Connection::read_to_table`].
    #[deprecated(
        note = "no protection against SQL injection; use `read_to_table` with parameters instead"
    )]
    #[allow(deprecated)]
    pub fn read_raw_to_table(
        &mut self,
        cmd: &str,
        include_header: bool,
    ) -> HelperResult<ResultTable> {
        self.read_raw(cmd)?.into_table(include_header)
    }

    /// Executes a non-query (insert, update, delete, DDL) and returns the number of
    /// affected rows.
    ///
    /// Every parameter must have a type hint.
    ///
    /// # Errors
    ///
    /// The errors of [`Connection::read`], and `HelperError::MissingType` for a
    /// parameter without type hint.
    pub fn write(&mut self, cmd: &str, params: &[Parameter]) -> HelperResult<usize> {
        self.check_ready()?;
        let bindings = self.bindings(cmd, params, BindingMode::Strict)?;

        let start = Instant::now();
        let result = self.client.execute(cmd, &bindings);
        self.statistics.add_call(start.elapsed());
        let affected_rows = result?;
        self.statistics.add_write(affected_rows);
        debug!("write() affected {affected_rows} rows");
        Ok(affected_rows)
    }

    /// Utility method to fire a couple of commands, ignoring errors and
    /// return values.
    pub fn multiple_statements_ignore_err<S: AsRef<str>>(&mut self, cmds: Vec<S>) {
        for s in cmds {
            trace!("multiple_statements_ignore_err: firing \"{}\"", s.as_ref());
            if let Err(e) = self.write(s.as_ref(), &[]) {
                debug!("Error intentionally ignored: {}", e.display_with_inner());
            }
        }
    }

    /// Utility method to fire a couple of commands without parameters, ignoring their
    /// return values; the method returns with the first error, or with `()`.
    ///
    /// # Errors
    ///
    /// The errors of [`Connection::write`].
    pub fn multiple_statements<S: AsRef<str>>(&mut self, cmds: Vec<S>) -> HelperResult<()> {
        for s in cmds {
            self.write(s.as_ref(), &[])?;
        }
        Ok(())
    }

    /// Returns a descriptive version string of the database.
    ///
    /// # Errors
    ///
    /// `HelperError::NotConnected`, `HelperError::CursorOpen`, errors from the database.
    pub fn server_version(&mut self) -> HelperResult<String> {
        self.check_ready()?;
        self.client.server_version()
    }

    /// Returns a snapshot of the statistics of this connection.
    pub fn statistics(&self) -> ConnectionStatistics {
        self.statistics.clone()
    }

    /// Resets the statistics of this connection.
    pub fn reset_statistics(&mut self) {
        self.statistics.reset();
    }

    /// Closes the connection.
    ///
    /// A connection that was created with `from_sqlite` is only detached,
    /// the caller's handle stays open.
    ///
    /// # Errors
    ///
    /// `HelperError::NotConnected` if the connection is already closed,
    /// `HelperError::CursorOpen` if a result set of this connection is still open,
    /// errors from the database.
    pub fn disconnect(&mut self) -> HelperResult<()> {
        self.check_ready()?;
        debug!("disconnecting ({} calls done)", self.statistics.call_count());
        self.client.close()
    }

    fn check_ready(&self) -> HelperResult<()> {
        if self.client.is_closed() {
            Err(HelperError::NotConnected)
        } else if self.cursor_open.load(Ordering::Acquire) {
            Err(HelperError::CursorOpen)
        } else {
            Ok(())
        }
    }

    fn bindings(
        &self,
        cmd: &str,
        params: &[Parameter],
        mode: BindingMode,
    ) -> HelperResult<Vec<Binding>> {
        let mut bindings = Binding::try_from_params(params, mode)?;
        let nested_comments = self
            .client
            .backend()
            .is_some_and(Backend::nests_block_comments);
        placeholders::resolve(cmd, nested_comments, &mut bindings)?;
        Ok(bindings)
    }

    fn prepare_cursor(&self) -> HelperResult<CursorGuard> {
        if self.client.is_closed() {
            return Err(HelperError::NotConnected);
        }
        CursorGuard::acquire(&self.cursor_open)
    }

    fn query(
        &mut self,
        cmd: &str,
        bindings: &[Binding],
        cursor: CursorGuard,
    ) -> HelperResult<ResultSet> {
        let start = Instant::now();
        let result = self.client.query(cmd, bindings);
        self.statistics.add_call(start.elapsed());
        let (metadata, rows) = result?;
        self.statistics.add_read(rows.len());
        debug!(
            "read() fetched {} rows with {} columns",
            rows.len(),
            metadata.len()
        );
        Ok(ResultSet::new(Arc::new(metadata), rows, cursor))
    }
}
