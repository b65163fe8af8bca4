use crate::{Backend, ConnectParams, ConnectParamsBuilder, Connection, HelperResult};
use secstr::SecUtf8;

/// Keeps the settings for opening connections, and the outcome of the last attempt.
///
/// The settings are server, database, and either a trusted connection,
/// or user and password, or a complete connection string
/// (see [`ConnectParamsBuilder`] for how they are combined).
/// A command text can be stored along with them, for callers that prepare the command
/// before they connect.
///
/// `SqlHelper` does not hold a connection itself; [`SqlHelper::connect`] returns a
/// [`Connection`], on which all commands are executed.
///
/// # Example
///
/// ```rust
/// use sqlhelper::{Parameter, SqlHelper};
///
/// let mut helper = SqlHelper::new();
/// helper.database(":memory:").set_trusted(true);
/// helper.command("SELECT @greeting AS G");
///
/// let mut connection = helper.connect().unwrap();
/// let table = connection
///     .read_to_table(helper.get_command(), &[Parameter::new("greeting", "hello")], true)
///     .unwrap();
/// assert_eq!(table.into_rows(), vec![vec!["G"], vec!["hello"]]);
///
/// let mut helper = SqlHelper::trusted("", "/no/such/directory/sales.db");
/// assert!(helper.try_connect().is_none());
/// assert!(helper.last_error().is_some());
/// ```
#[derive(Clone, Debug, Default)]
pub struct SqlHelper {
    cp_builder: ConnectParamsBuilder,
    command: String,
    last_error: Option<String>,
}

impl SqlHelper {
    /// Creates a helper without any settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a helper that uses the given connection string.
    ///
    /// A `Provider` key selects the backend.
    ///
    /// # Errors
    ///
    /// `HelperError::ConnParams` if the connection string cannot be parsed.
    pub fn with_connect_string<S: AsRef<str>>(connect_string: S) -> HelperResult<Self> {
        let mut helper = Self::new();
        helper.cp_builder.connect_string(connect_string)?;
        Ok(helper)
    }

    /// Creates a helper that authenticates with the OS identity of the process.
    ///
    /// SQL Server accepts trusted connections only from Windows clients;
    /// on other platforms, connecting fails with `HelperError::UsageDetailed`.
    /// SQLite ignores the authentication settings.
    pub fn trusted<S: AsRef<str>, D: AsRef<str>>(server: S, database: D) -> Self {
        let mut helper = Self::new();
        helper.server(server).database(database).set_trusted(true);
        helper
    }

    /// Creates a helper that authenticates with user and password.
    pub fn with_credentials<S, D, U, P>(server: S, database: D, user: U, password: P) -> Self
    where
        S: AsRef<str>,
        D: AsRef<str>,
        U: AsRef<str>,
        P: AsRef<str>,
    {
        let mut helper = Self::new();
        helper
            .server(server)
            .database(database)
            .user(user)
            .password(password);
        helper
    }

    /// Creates a helper from a prepared builder.
    pub fn with_params(cp_builder: ConnectParamsBuilder) -> Self {
        Self {
            cp_builder,
            ..Self::default()
        }
    }

    /// Sets the backend.
    pub fn backend(&mut self, backend: Backend) -> &mut Self {
        self.cp_builder.backend(backend);
        self
    }

    /// Sets the server.
    pub fn server<S: AsRef<str>>(&mut self, server: S) -> &mut Self {
        self.cp_builder.server(server);
        self
    }

    /// Sets the database name; for SQLite this is the path of the database file.
    pub fn database<D: AsRef<str>>(&mut self, database: D) -> &mut Self {
        self.cp_builder.database(database);
        self
    }

    /// Sets the database user.
    pub fn user<U: AsRef<str>>(&mut self, user: U) -> &mut Self {
        self.cp_builder.user(user);
        self
    }

    /// Sets the password.
    pub fn password<P: AsRef<str>>(&mut self, password: P) -> &mut Self {
        self.cp_builder.password(password);
        self
    }

    /// Switches the use of the OS identity for authentication on or off.
    ///
    /// See [`SqlHelper::trusted`] for a constructor with this setting.
    pub fn set_trusted(&mut self, trusted: bool) -> &mut Self {
        self.cp_builder.trusted(trusted);
        self
    }

    /// Stores a command text.
    pub fn command<C: Into<String>>(&mut self, command: C) -> &mut Self {
        self.command = command.into();
        self
    }

    /// Getter
    pub fn get_backend(&self) -> Option<Backend> {
        self.cp_builder.get_backend()
    }

    /// Getter
    pub fn get_server(&self) -> Option<&str> {
        self.cp_builder.get_server()
    }

    /// Getter
    pub fn get_database(&self) -> Option<&str> {
        self.cp_builder.get_database()
    }

    /// Getter
    pub fn get_user(&self) -> Option<&str> {
        self.cp_builder.get_user()
    }

    /// Getter
    pub fn get_password(&self) -> Option<&SecUtf8> {
        self.cp_builder.get_password()
    }

    /// Getter
    pub fn get_command(&self) -> &str {
        &self.command
    }

    /// Access to the underlying builder.
    pub fn params_builder(&self) -> &ConnectParamsBuilder {
        &self.cp_builder
    }

    /// The message of the error of the last failed connection attempt,
    /// including its cause.
    ///
    /// Is reset by every connection attempt.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// The parameters that result from the settings.
    ///
    /// # Errors
    ///
    /// `HelperError::Usage` if the settings are incomplete.
    pub fn connect_params(&self) -> HelperResult<ConnectParams> {
        self.cp_builder.build()
    }

    /// Opens a connection with the current settings.
    ///
    /// A failure is also recorded, and can be retrieved later with [`SqlHelper::last_error`].
    ///
    /// # Errors
    ///
    /// Several variants of `HelperError` can occur.
    pub fn connect(&mut self) -> HelperResult<Connection<'static>> {
        self.last_error = None;
        match self
            .cp_builder
            .build()
            .and_then(Connection::new)
        {
            Ok(connection) => {
                debug!("SqlHelper: connected with {}", self.cp_builder);
                Ok(connection)
            }
            Err(e) => {
                let message = e.display_with_inner();
                debug!("SqlHelper: connect failed with {message}");
                self.last_error = Some(message);
                Err(e)
            }
        }
    }

    /// Opens a connection with the current settings, or returns `None` and records
    /// the error.
    pub fn try_connect(&mut self) -> Option<Connection<'static>> {
        self.connect().ok()
    }
}
