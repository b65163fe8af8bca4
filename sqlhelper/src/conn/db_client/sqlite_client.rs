use super::Fetched;
use crate::types_impl::Binding;
use crate::{
    ColumnMetadata, ConnectParams, ConnectSource, DbValue, HelperError, HelperResult,
    ResultSetMetadata, SqliteMode,
};
use rusqlite::types::{ToSqlOutput, Value, ValueRef};
use rusqlite::{OpenFlags, Statement, ToSql};

// A rusqlite connection that is either owned or borrowed from the caller.
// A borrowed one is not closed by us.
#[derive(Debug)]
enum Handle<'a> {
    Owned(rusqlite::Connection),
    Borrowed(&'a mut rusqlite::Connection),
}

#[derive(Debug)]
pub(crate) struct SqliteClient<'a> {
    params: Option<ConnectParams>,
    handle: Handle<'a>,
}

impl SqliteClient<'static> {
    pub fn try_new(params: ConnectParams) -> HelperResult<Self> {
        let (path, mode) = match params.source() {
            ConnectSource::Trusted { server, database } => {
                log_ignored(server, None);
                (database.clone(), SqliteMode::default())
            }
            ConnectSource::Password {
                server,
                database,
                user,
                ..
            } => {
                log_ignored(server, Some(user));
                (database.clone(), SqliteMode::default())
            }
            ConnectSource::ConnectString(cs) => {
                let path = cs
                    .database()
                    .or_else(|| cs.server())
                    .unwrap_or_default()
                    .to_string();
                (path, cs.sqlite_mode()?)
            }
        };
        if path.is_empty() {
            return Err(HelperError::Usage(
                "the path of the SQLite database file is missing",
            ));
        }

        let flags = match mode {
            SqliteMode::ReadWriteCreate => {
                OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE
            }
            SqliteMode::ReadWrite => OpenFlags::SQLITE_OPEN_READ_WRITE,
            SqliteMode::ReadOnly => OpenFlags::SQLITE_OPEN_READ_ONLY,
            SqliteMode::Memory => {
                OpenFlags::SQLITE_OPEN_READ_WRITE
                    | OpenFlags::SQLITE_OPEN_CREATE
                    | OpenFlags::SQLITE_OPEN_MEMORY
            }
        } | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;

        trace!("opening SQLite database {path} with mode {mode:?}");
        let conn = rusqlite::Connection::open_with_flags(&path, flags)?;
        Ok(Self {
            params: Some(params),
            handle: Handle::Owned(conn),
        })
    }
}

fn log_ignored(server: &str, user: Option<&str>) {
    if !server.is_empty() {
        debug!("SQLite does not use a server, ignoring '{server}'");
    }
    if let Some(user) = user {
        debug!("SQLite does not use credentials, ignoring user '{user}' and password");
    }
}

impl<'a> SqliteClient<'a> {
    pub fn from_borrowed(conn: &'a mut rusqlite::Connection) -> Self {
        Self {
            params: None,
            handle: Handle::Borrowed(conn),
        }
    }

    pub fn connect_params(&self) -> Option<&ConnectParams> {
        self.params.as_ref()
    }

    fn conn(&mut self) -> &mut rusqlite::Connection {
        match self.handle {
            Handle::Owned(ref mut conn) => conn,
            Handle::Borrowed(ref mut conn) => conn,
        }
    }

    pub fn query(&mut self, cmd: &str, bindings: &[Binding]) -> HelperResult<Fetched> {
        let mut stmt = self.conn().prepare(cmd)?;
        bind(&mut stmt, bindings)?;

        let metadata = ResultSetMetadata::new(
            stmt.columns()
                .iter()
                .map(|col| ColumnMetadata::new(col.name(), col.decl_type().map(str::to_string)))
                .collect(),
        );
        let width = metadata.len();

        let mut rows = Vec::new();
        let mut raw_rows = stmt.raw_query();
        while let Some(raw_row) = raw_rows.next()? {
            let mut values = Vec::with_capacity(width);
            for idx in 0..width {
                values.push(from_sqlite(raw_row.get_ref(idx)?));
            }
            rows.push(values);
        }
        Ok((metadata, rows))
    }

    pub fn execute(&mut self, cmd: &str, bindings: &[Binding]) -> HelperResult<usize> {
        let mut stmt = self.conn().prepare(cmd)?;
        bind(&mut stmt, bindings)?;
        Ok(stmt.raw_execute()?)
    }

    pub fn server_version() -> String {
        format!("SQLite {}", rusqlite::version())
    }

    pub fn close(self) -> HelperResult<()> {
        match self.handle {
            Handle::Owned(conn) => conn.close().map_err(|(_conn, e)| HelperError::from(e)),
            Handle::Borrowed(_) => {
                debug!("detaching from the caller's SQLite connection, which stays open");
                Ok(())
            }
        }
    }
}

// Binds by name, and ensures that no placeholder of the statement stays unbound.
fn bind(stmt: &mut Statement, bindings: &[Binding]) -> HelperResult<()> {
    let mut bound = vec![false; stmt.parameter_count()];
    for binding in bindings {
        let idx = stmt
            .parameter_index(&format!("@{}", binding.name()))?
            .ok_or_else(|| HelperError::UnknownParameter(binding.name().to_string()))?;
        stmt.raw_bind_parameter(idx, SqliteValue(binding.value()))?;
        bound[idx - 1] = true;
    }
    if let Some(idx) = bound.iter().position(|b| !b) {
        let name = stmt.parameter_name(idx + 1).unwrap_or("?");
        return Err(HelperError::UnboundPlaceholder(name.to_string()));
    }
    Ok(())
}

struct SqliteValue<'v>(&'v DbValue);

impl ToSql for SqliteValue<'_> {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match *self.0 {
            DbValue::NULL => ToSqlOutput::Owned(Value::Null),
            DbValue::BOOLEAN(b) => ToSqlOutput::Owned(Value::Integer(i64::from(b))),
            DbValue::TINYINT(i) => ToSqlOutput::Owned(Value::Integer(i64::from(i))),
            DbValue::SMALLINT(i) => ToSqlOutput::Owned(Value::Integer(i64::from(i))),
            DbValue::INT(i) => ToSqlOutput::Owned(Value::Integer(i64::from(i))),
            DbValue::BIGINT(i) => ToSqlOutput::Owned(Value::Integer(i)),
            DbValue::REAL(f) => ToSqlOutput::Owned(Value::Real(f64::from(f))),
            DbValue::DOUBLE(f) => ToSqlOutput::Owned(Value::Real(f)),
            DbValue::STRING(ref s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            DbValue::DBSTRING(ref bytes) => ToSqlOutput::Borrowed(ValueRef::Text(bytes)),
            DbValue::BINARY(ref bytes) => ToSqlOutput::Borrowed(ValueRef::Blob(bytes)),
            // SQLite has no native types for these, they are stored as text
            DbValue::DECIMAL(_)
            | DbValue::DATE(_)
            | DbValue::TIME(_)
            | DbValue::TIMESTAMP(_)
            | DbValue::TIMESTAMPTZ(_) => ToSqlOutput::Owned(Value::Text(self.0.to_string())),
        })
    }
}

fn from_sqlite(value: ValueRef) -> DbValue {
    match value {
        ValueRef::Null => DbValue::NULL,
        ValueRef::Integer(i) => DbValue::BIGINT(i),
        ValueRef::Real(f) => DbValue::DOUBLE(f),
        ValueRef::Text(bytes) => String::from_utf8(bytes.to_vec())
            .map_or_else(|e| DbValue::DBSTRING(e.into_bytes()), DbValue::STRING),
        ValueRef::Blob(bytes) => DbValue::BINARY(bytes.to_vec()),
    }
}
