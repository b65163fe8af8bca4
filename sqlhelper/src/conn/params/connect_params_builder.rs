use super::connect_params::ConnectSource;
use super::connect_string::{DATABASE, PASSWORD, PROVIDER, SERVER, TRUSTED_CONNECTION, USER_ID};
use crate::{
    Backend, ConnectParams, ConnectString, HelperError, HelperResult, IntoConnectParamsBuilder,
};
use secstr::SecUtf8;
use serde::Serialize;

/// A builder for `ConnectParams`.
///
/// The way the connection is formed is decided by what was configured, in this order:
///
/// 1. with `trusted(true)`, the OS identity is used, together with server and database;
/// 2. a given connection string is used as it is, a separately set password is added
///    if the string has none;
/// 3. otherwise user and password are used, together with server and database.
///
/// # Instantiating a `ConnectParamsBuilder` programmatically
///
/// ```rust
/// use sqlhelper::{Backend, ConnectParams};
///
/// let connect_params = ConnectParams::builder()
///     .backend(Backend::Mssql)
///     .server("db01\\SQLEXPRESS")
///     .database("Sales")
///     .user("meier")
///     .password("schlau")
///     .build()
///     .unwrap();
/// ```
///
/// # Instantiating a `ConnectParamsBuilder` from a connection string
///
/// ```rust
/// use sqlhelper::IntoConnectParamsBuilder;
///
/// let cp_builder = "Server=db01; Database=Sales; Trusted_Connection=yes"
///     .into_connect_params_builder()
///     .unwrap();
/// assert_eq!(cp_builder.get_database(), Some("Sales"));
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(into = "String")]
pub struct ConnectParamsBuilder {
    backend: Option<Backend>,
    server: Option<String>,
    database: Option<String>,
    user: Option<String>,
    #[serde(skip)]
    password: Option<SecUtf8>,
    trusted: bool,
    connect_string: Option<ConnectString>,
}

impl ConnectParamsBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the backend.
    pub fn backend(&mut self, backend: Backend) -> &mut Self {
        self.backend = Some(backend);
        self
    }

    /// Sets the server.
    pub fn server<S: AsRef<str>>(&mut self, server: S) -> &mut Self {
        self.server = Some(server.as_ref().to_owned());
        self
    }

    /// Sets the database name; for SQLite this is the path of the database file.
    pub fn database<D: AsRef<str>>(&mut self, database: D) -> &mut Self {
        self.database = Some(database.as_ref().to_owned());
        self
    }

    /// Sets the database user.
    pub fn user<U: AsRef<str>>(&mut self, user: U) -> &mut Self {
        self.user = Some(user.as_ref().to_owned());
        self
    }

    /// Sets the password.
    pub fn password<P: AsRef<str>>(&mut self, pw: P) -> &mut Self {
        self.password = Some(SecUtf8::from(pw.as_ref()));
        self
    }

    /// Unsets the password, also in a given connection string.
    pub fn unset_password(&mut self) -> &mut Self {
        self.password = None;
        if let Some(ref mut cs) = self.connect_string {
            cs.remove(PASSWORD);
        }
        self
    }

    /// Switches the use of the OS identity for authentication on or off.
    pub fn trusted(&mut self, trusted: bool) -> &mut Self {
        self.trusted = trusted;
        self
    }

    /// Sets a complete connection string.
    ///
    /// A `Provider` key in the string selects the backend, unless a backend is set explicitly;
    /// the key is not passed on to the client library.
    ///
    /// # Errors
    ///
    /// `HelperError::ConnParams` if the string cannot be parsed.
    pub fn connect_string<S: AsRef<str>>(&mut self, connect_string: S) -> HelperResult<&mut Self> {
        let mut cs: ConnectString = connect_string
            .as_ref()
            .parse()
            .map_err(|e| HelperError::conn_params(Box::new(e)))?;
        if let Some(backend) = cs.backend()? {
            self.backend.get_or_insert(backend);
        }
        cs.remove(PROVIDER);
        self.connect_string = Some(cs);
        Ok(self)
    }

    /// Constructs a `ConnectParams` from the builder.
    ///
    /// # Errors
    /// `HelperError::Usage` if the builder was not yet configured to
    /// create a meaningful `ConnectParams`
    pub fn build(&self) -> HelperResult<ConnectParams> {
        let backend = self.backend.unwrap_or_default();

        let source = if self.trusted {
            ConnectSource::Trusted {
                server: self.required_server(backend)?,
                database: self.required_database()?,
            }
        } else if let Some(ref cs) = self.connect_string {
            if cs.is_empty() {
                return Err(HelperError::Usage("connection string is empty"));
            }
            let mut cs = cs.clone();
            if let (false, Some(pw)) = (cs.contains_key(PASSWORD), &self.password) {
                cs.set(PASSWORD, pw.unsecure());
            }
            ConnectSource::ConnectString(cs)
        } else {
            let user = self
                .user
                .as_ref()
                .cloned()
                .ok_or(HelperError::Usage(
                    "no authentication configured: use a trusted connection, \
                     a user with password, or a connection string",
                ))?;
            let password = self
                .password
                .as_ref()
                .cloned()
                .ok_or_else(|| HelperError::Usage("password is missing"))?;
            ConnectSource::Password {
                server: self.required_server(backend)?,
                database: self.required_database()?,
                user,
                password,
            }
        };
        Ok(ConnectParams::new(backend, source))
    }

    fn required_server(&self, backend: Backend) -> HelperResult<String> {
        match (self.get_server(), backend) {
            (Some(server), _) => Ok(server.to_string()),
            (None, Backend::Sqlite) => Ok(String::new()),
            (None, Backend::Mssql) => Err(HelperError::Usage("server is missing")),
        }
    }

    fn required_database(&self) -> HelperResult<String> {
        self.get_database()
            .filter(|db| !db.is_empty())
            .map(str::to_string)
            .ok_or_else(|| HelperError::Usage("database is missing"))
    }

    /// Getter
    pub fn get_backend(&self) -> Option<Backend> {
        self.backend
    }

    /// Getter; falls back to the value in the connection string.
    pub fn get_server(&self) -> Option<&str> {
        self.server
            .as_deref()
            .or_else(|| self.connect_string.as_ref().and_then(ConnectString::server))
    }

    /// Getter; falls back to the value in the connection string.
    pub fn get_database(&self) -> Option<&str> {
        self.database
            .as_deref()
            .or_else(|| self.connect_string.as_ref().and_then(ConnectString::database))
    }

    /// Getter; falls back to the value in the connection string.
    pub fn get_user(&self) -> Option<&str> {
        self.user
            .as_deref()
            .or_else(|| self.connect_string.as_ref().and_then(ConnectString::user))
    }

    /// Getter
    pub fn get_password(&self) -> Option<&SecUtf8> {
        self.password.as_ref()
    }

    /// Getter
    pub fn is_trusted(&self) -> bool {
        self.trusted
    }

    /// Getter
    pub fn get_connect_string(&self) -> Option<&ConnectString> {
        self.connect_string.as_ref()
    }
}

impl<'de> serde::de::Deserialize<'de> for ConnectParamsBuilder {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::de::Deserializer<'de>,
    {
        let visitor = Visitor();
        deserializer.deserialize_str(visitor)
    }
}

struct Visitor();
impl<'de> serde::de::Visitor<'de> for Visitor {
    type Value = ConnectParamsBuilder;
    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("a String in the form of a connection string")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        IntoConnectParamsBuilder::into_connect_params_builder(v).map_err(E::custom)
    }
}

impl From<ConnectParamsBuilder> for String {
    fn from(mut cpb: ConnectParamsBuilder) -> String {
        cpb.unset_password();
        cpb.to_string()
    }
}

// Renders the builder as connection string, without password.
impl std::fmt::Display for ConnectParamsBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let mut cs = ConnectString::new();
        if let Some(backend) = self.backend {
            cs.set(PROVIDER, backend.to_string());
        }
        match (self.trusted, &self.connect_string) {
            (false, Some(given)) => {
                for (key, value) in given.iter() {
                    cs.set(key, value);
                }
            }
            (trusted, _) => {
                if let Some(server) = self.get_server() {
                    cs.set(SERVER, server);
                }
                if let Some(database) = self.get_database() {
                    cs.set(DATABASE, database);
                }
                if trusted {
                    cs.set(TRUSTED_CONNECTION, "True");
                } else if let Some(user) = self.get_user() {
                    cs.set(USER_ID, user);
                }
            }
        }
        cs.remove(PASSWORD);
        write!(f, "{cs}")
    }
}

#[cfg(test)]
mod test {
    use super::ConnectParamsBuilder;
    use crate::{Backend, ConnectSource, HelperError, IntoConnectParamsBuilder};
    use serde::{Deserialize, Serialize};

    #[test]
    fn test_connect_params_builder() {
        {
            let params = ConnectParamsBuilder::new()
                .server("abcd123")
                .database("db")
                .user("MEIER")
                .password("schLau")
                .build()
                .unwrap();
            assert_eq!(Some("MEIER"), params.user());
            assert_eq!(Backend::Sqlite, params.backend());
            match params.source() {
                ConnectSource::Password { password, .. } => {
                    assert_eq!("schLau", password.unsecure());
                }
                _ => panic!("unexpected source"),
            }
        }
        {
            // trusted wins over user and password
            let mut builder = ConnectParamsBuilder::new();
            builder
                .backend(Backend::Mssql)
                .server("abcd123")
                .database("db")
                .user("MEIER")
                .password("schLau")
                .trusted(true);
            let params = builder.build().unwrap();
            assert!(params.is_trusted());
            assert_eq!(None, params.user());
        }
        {
            let builder = "Provider=mssql; Server=abcd123; Database=db; UID=MEIER; PWD=schLau"
                .into_connect_params_builder()
                .unwrap();
            assert_eq!(Some(Backend::Mssql), builder.get_backend());
            assert_eq!(Some("MEIER"), builder.get_user());
            assert_eq!(Some("abcd123"), builder.get_server());
            assert!(!builder
                .get_connect_string()
                .unwrap()
                .contains_key("Provider"));
        }
    }

    #[test]
    fn test_incomplete() {
        assert!(matches!(
            ConnectParamsBuilder::new().server("x").database("y").build(),
            Err(HelperError::Usage(_))
        ));
        assert!(matches!(
            ConnectParamsBuilder::new()
                .backend(Backend::Mssql)
                .database("y")
                .trusted(true)
                .build(),
            Err(HelperError::Usage("server is missing"))
        ));
        assert!(matches!(
            ConnectParamsBuilder::new().server("x").trusted(true).build(),
            Err(HelperError::Usage("database is missing"))
        ));
        assert!(matches!(
            ConnectParamsBuilder::new()
                .server("x")
                .database("y")
                .user("u")
                .build(),
            Err(HelperError::Usage("password is missing"))
        ));
        // SQLite needs no server
        assert!(ConnectParamsBuilder::new()
            .database(":memory:")
            .trusted(true)
            .build()
            .is_ok());
        assert!(ConnectParamsBuilder::new()
            .connect_string("Server")
            .is_err());
    }

    #[test]
    fn serde_test() {
        #[derive(Serialize, Deserialize, Debug)]
        struct Data {
            x: ConnectParamsBuilder,
        }

        let mut data = Data {
            x: ConnectParamsBuilder::new(),
        };
        data.x
            .backend(Backend::Mssql)
            .server("abcd123")
            .database("db")
            .user("MEIER")
            .password("schLau");

        let serialized = serde_json::to_string(&data).unwrap();
        assert_eq!(
            r#"{"x":"Provider=mssql; Server=abcd123; Database=db; User Id=MEIER;"}"#,
            serialized
        );

        let deserialized: Data = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized.x.get_backend(), Some(Backend::Mssql));
        assert_eq!(deserialized.x.get_user(), Some("MEIER"));
        assert!(deserialized.x.get_password().is_none());
        assert!(deserialized.x.build().is_ok());

        let mut builder = deserialized.x;
        builder.password("schLau");
        assert_eq!(
            builder.build().unwrap().connect_string().password(),
            Some("schLau")
        );

        // trusted, with server and database only in the connection string
        let mut data = Data {
            x: ConnectParamsBuilder::new(),
        };
        data.x
            .connect_string("Server=db01; Database=Sales; UID=meier")
            .unwrap()
            .trusted(true);
        let serialized = serde_json::to_string(&data).unwrap();
        assert_eq!(
            r#"{"x":"Server=db01; Database=Sales; Trusted_Connection=True;"}"#,
            serialized
        );
        let deserialized: Data = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized.x.get_server(), Some("db01"));
        assert_eq!(deserialized.x.get_database(), Some("Sales"));
        assert!(deserialized.x.build().unwrap().is_trusted());
    }
}
