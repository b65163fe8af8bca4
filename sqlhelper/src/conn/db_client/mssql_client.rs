use super::Fetched;
use crate::conn::params::connect_string::{
    DATABASE, PASSWORD, SERVER, TRUSTED_CONNECTION, USER_ID,
};
use crate::conn::placeholders;
use crate::types_impl::Binding;
use crate::{
    ColumnMetadata, ConnectParams, ConnectSource, ConnectString, DbValue, HelperError,
    HelperResult, ResultSetMetadata, SqlType,
};
use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use tiberius::{numeric::Numeric, Client, ColumnData, Config, FromSql, ToSql};
use tokio::net::TcpStream;
use tokio::runtime::Runtime;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};

// SQL Server allows at most 38 digits, of which 37 can be fractional.
const MAX_SCALE: i64 = 37;

// A tiberius client with its own single-threaded runtime, so that the
// async client can be driven from blocking code.
pub(crate) struct MssqlClient {
    params: ConnectParams,
    runtime: Runtime,
    client: Client<Compat<TcpStream>>,
}

impl std::fmt::Debug for MssqlClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MssqlClient")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl MssqlClient {
    pub fn try_new(params: ConnectParams) -> HelperResult<Self> {
        check_integrated_auth(&params)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let config = Config::from_ado_string(&ado_string(&params))?;
        trace!("connecting to SQL Server at {}", config.get_addr());
        let client = runtime.block_on(async {
            let tcp = TcpStream::connect(config.get_addr()).await?;
            tcp.set_nodelay(true)?;
            Client::connect(config, tcp.compat_write())
                .await
                .map_err(HelperError::from)
        })?;

        Ok(Self {
            params,
            runtime,
            client,
        })
    }

    pub fn connect_params(&self) -> &ConnectParams {
        &self.params
    }

    pub fn query(&mut self, cmd: &str, bindings: &[Binding]) -> HelperResult<Fetched> {
        let sql = placeholders::rewrite_positional(cmd, bindings);
        let values = to_sql_values(bindings)?;
        let params = as_params(&values);
        let client = &mut self.client;
        self.runtime.block_on(async {
            let mut stream = client.query(sql, &params).await?;
            let metadata = ResultSetMetadata::new(
                stream
                    .columns()
                    .await?
                    .unwrap_or_default()
                    .iter()
                    .map(|col| {
                        ColumnMetadata::new(col.name(), Some(format!("{:?}", col.column_type())))
                    })
                    .collect(),
            );
            let mut rows = Vec::new();
            for row in stream.into_first_result().await? {
                rows.push(
                    row.into_iter()
                        .map(from_column_data)
                        .collect::<HelperResult<Vec<DbValue>>>()?,
                );
            }
            Ok((metadata, rows))
        })
    }

    pub fn execute(&mut self, cmd: &str, bindings: &[Binding]) -> HelperResult<usize> {
        let sql = placeholders::rewrite_positional(cmd, bindings);
        let values = to_sql_values(bindings)?;
        let params = as_params(&values);
        let client = &mut self.client;
        let total = self
            .runtime
            .block_on(async { client.execute(sql, &params).await })?
            .total();
        usize::try_from(total).map_err(|_| HelperError::Impl("affected row count overflows usize"))
    }

    pub fn server_version(&mut self) -> HelperResult<String> {
        let client = &mut self.client;
        self.runtime.block_on(async {
            let row = client
                .simple_query("SELECT @@VERSION")
                .await?
                .into_row()
                .await?
                .ok_or(HelperError::Impl("SELECT @@VERSION returned no row"))?;
            Ok(row.try_get::<&str, _>(0)?.unwrap_or_default().to_string())
        })
    }

    pub fn close(self) -> HelperResult<()> {
        let Self {
            runtime, client, ..
        } = self;
        runtime.block_on(client.close())?;
        Ok(())
    }
}

// tiberius authenticates with the OS identity only on Windows; elsewhere it would
// silently log on as a SQL user with an empty name.
fn check_integrated_auth(params: &ConnectParams) -> HelperResult<()> {
    if params.is_trusted() && !cfg!(windows) {
        Err(crate::usage_err!(
            "trusted connections to SQL Server are only supported on Windows, \
             use user and password instead"
        ))
    } else {
        Ok(())
    }
}

// The tiberius connection string, including the password.
fn ado_string(params: &ConnectParams) -> String {
    match params.source() {
        ConnectSource::Trusted { server, database } => {
            let mut cs = ConnectString::new();
            cs.set(SERVER, server)
                .set(DATABASE, database)
                .set("Integrated Security", "true");
            cs.to_unredacted_string()
        }
        ConnectSource::Password {
            server,
            database,
            user,
            password,
        } => {
            let mut cs = ConnectString::new();
            cs.set(SERVER, server)
                .set(DATABASE, database)
                .set(USER_ID, user)
                .set(PASSWORD, password.unsecure());
            cs.to_unredacted_string()
        }
        ConnectSource::ConnectString(cs) => {
            // tiberius only understands the `Integrated Security` spelling
            let mut cs = cs.clone();
            let trusted = cs.is_trusted();
            if cs.remove(TRUSTED_CONNECTION).is_some() {
                cs.set("Integrated Security", if trusted { "true" } else { "false" });
            }
            cs.to_unredacted_string()
        }
    }
}

// tiberius binds positionally, to @P1, @P2, ... in the order of the bindings.
// The values are owned here and only borrowed by the client while a command runs.
fn to_sql_values(bindings: &[Binding]) -> HelperResult<Vec<Box<dyn ToSql>>> {
    bindings.iter().map(to_sql).collect()
}

fn as_params(values: &[Box<dyn ToSql>]) -> Vec<&dyn ToSql> {
    let mut params: Vec<&dyn ToSql> = Vec::with_capacity(values.len());
    for value in values {
        params.push(&**value);
    }
    params
}

fn to_sql(binding: &Binding) -> HelperResult<Box<dyn ToSql>> {
    let value: Box<dyn ToSql> = match binding.value().clone() {
        DbValue::NULL => typed_null(binding.sql_type()),
        DbValue::BOOLEAN(b) => Box::new(b),
        DbValue::TINYINT(i) => Box::new(i),
        DbValue::SMALLINT(i) => Box::new(i),
        DbValue::INT(i) => Box::new(i),
        DbValue::BIGINT(i) => Box::new(i),
        DbValue::REAL(f) => Box::new(f),
        DbValue::DOUBLE(f) => Box::new(f),
        DbValue::DECIMAL(d) => Box::new(to_numeric(binding.name(), &d)?),
        DbValue::STRING(s) => Box::new(s),
        DbValue::DBSTRING(bytes) => Box::new(String::from_utf8(bytes)?),
        DbValue::BINARY(bytes) => Box::new(bytes),
        DbValue::DATE(d) => Box::new(d),
        DbValue::TIME(t) => Box::new(t),
        DbValue::TIMESTAMP(ts) => Box::new(ts),
        DbValue::TIMESTAMPTZ(ts) => Box::new(ts),
    };
    Ok(value)
}

// A NULL needs a type on the wire; without a hint it is sent as NVARCHAR,
// which the server converts implicitly.
fn typed_null(sql_type: Option<SqlType>) -> Box<dyn ToSql> {
    match sql_type {
        Some(SqlType::Bit) => Box::new(Option::<bool>::None),
        Some(SqlType::TinyInt) => Box::new(Option::<u8>::None),
        Some(SqlType::SmallInt) => Box::new(Option::<i16>::None),
        Some(SqlType::Int) => Box::new(Option::<i32>::None),
        Some(SqlType::BigInt) => Box::new(Option::<i64>::None),
        Some(SqlType::Real) => Box::new(Option::<f32>::None),
        Some(SqlType::Float) => Box::new(Option::<f64>::None),
        Some(SqlType::Decimal) => Box::new(Option::<Numeric>::None),
        Some(SqlType::VarBinary) => Box::new(Option::<Vec<u8>>::None),
        Some(SqlType::Date) => Box::new(Option::<time::Date>::None),
        Some(SqlType::Time) => Box::new(Option::<time::Time>::None),
        Some(SqlType::DateTime2) => Box::new(Option::<time::PrimitiveDateTime>::None),
        Some(SqlType::DateTimeOffset) => Box::new(Option::<time::OffsetDateTime>::None),
        Some(SqlType::NVarChar | SqlType::VarChar) | None => Box::new(Option::<String>::None),
    }
}

fn to_numeric(name: &str, value: &BigDecimal) -> HelperResult<Numeric> {
    let (_, exponent) = value.as_bigint_and_exponent();
    let value = if exponent < 0 {
        value.with_scale(0)
    } else {
        value.clone()
    };
    let (mantissa, scale) = value.as_bigint_and_exponent();
    let scale = u8::try_from(scale)
        .ok()
        .filter(|scale| i64::from(*scale) <= MAX_SCALE)
        .ok_or_else(|| usage_err_decimal(name, "has too many fractional digits"))?;
    let mantissa =
        i128::try_from(&mantissa).map_err(|_| usage_err_decimal(name, "is too large"))?;
    Ok(Numeric::new_with_scale(mantissa, scale))
}

fn usage_err_decimal(name: &str, problem: &str) -> HelperError {
    crate::usage_err!("the decimal value of parameter '{name}' {problem} for SQL Server")
}

fn from_column_data(data: ColumnData<'static>) -> HelperResult<DbValue> {
    Ok(match data {
        ColumnData::U8(v) => v.map_or(DbValue::NULL, DbValue::TINYINT),
        ColumnData::I16(v) => v.map_or(DbValue::NULL, DbValue::SMALLINT),
        ColumnData::I32(v) => v.map_or(DbValue::NULL, DbValue::INT),
        ColumnData::I64(v) => v.map_or(DbValue::NULL, DbValue::BIGINT),
        ColumnData::F32(v) => v.map_or(DbValue::NULL, DbValue::REAL),
        ColumnData::F64(v) => v.map_or(DbValue::NULL, DbValue::DOUBLE),
        ColumnData::Bit(v) => v.map_or(DbValue::NULL, DbValue::BOOLEAN),
        ColumnData::String(v) => v.map_or(DbValue::NULL, |s| DbValue::STRING(s.into_owned())),
        ColumnData::Guid(v) => v.map_or(DbValue::NULL, |g| DbValue::STRING(g.to_string())),
        ColumnData::Binary(v) => v.map_or(DbValue::NULL, |b| DbValue::BINARY(b.into_owned())),
        ColumnData::Numeric(v) => v.map_or(DbValue::NULL, |n| {
            DbValue::DECIMAL(BigDecimal::new(
                BigInt::from(n.value()),
                i64::from(n.scale()),
            ))
        }),
        ColumnData::Xml(v) => {
            v.map_or(DbValue::NULL, |x| DbValue::STRING(x.into_owned().into_string()))
        }
        ColumnData::Date(_) => {
            time::Date::from_sql(&data)?.map_or(DbValue::NULL, DbValue::DATE)
        }
        ColumnData::Time(_) => {
            time::Time::from_sql(&data)?.map_or(DbValue::NULL, DbValue::TIME)
        }
        ColumnData::DateTime(_) | ColumnData::SmallDateTime(_) | ColumnData::DateTime2(_) => {
            time::PrimitiveDateTime::from_sql(&data)?.map_or(DbValue::NULL, DbValue::TIMESTAMP)
        }
        ColumnData::DateTimeOffset(_) => {
            time::OffsetDateTime::from_sql(&data)?.map_or(DbValue::NULL, DbValue::TIMESTAMPTZ)
        }
    })
}

#[cfg(test)]
mod test {
    use super::{
        ado_string, as_params, check_integrated_auth, from_column_data, to_numeric, to_sql_values,
    };
    use crate::types_impl::{Binding, BindingMode};
    use crate::{DbValue, IntoConnectParams, Parameter, SqlType};
    use bigdecimal::BigDecimal;
    use std::str::FromStr;
    use tiberius::{numeric::Numeric, ColumnData, ToSql};

    #[test]
    fn test_ado_string() {
        let params = "Provider=mssql; Server=db01,1433; Database=Sales; UID=meier; PWD='se;cret'"
            .into_connect_params()
            .unwrap();
        assert_eq!(
            ado_string(&params),
            "Server=db01,1433; Database=Sales; UID=meier; PWD=\"se;cret\";"
        );
    }

    #[test]
    fn test_check_integrated_auth() {
        let trusted = "Provider=mssql; Server=db01; Database=Sales; Integrated Security=true"
            .into_connect_params()
            .unwrap();
        let with_password = "Provider=mssql; Server=db01; Database=Sales; UID=meier; PWD=pw"
            .into_connect_params()
            .unwrap();
        assert!(check_integrated_auth(&with_password).is_ok());
        assert_eq!(check_integrated_auth(&trusted).is_ok(), cfg!(windows));
    }

    #[test]
    fn test_from_column_data() {
        assert_eq!(from_column_data(ColumnData::I32(Some(5))).unwrap(), DbValue::INT(5));
        assert!(from_column_data(ColumnData::I32(None)).unwrap().is_null());
        assert_eq!(
            from_column_data(ColumnData::String(Some("abc".into()))).unwrap(),
            "abc"
        );
        assert_eq!(
            from_column_data(ColumnData::Numeric(Some(Numeric::new_with_scale(12345, 2))))
                .unwrap()
                .to_string(),
            "123.45"
        );
    }

    #[test]
    fn test_to_sql() {
        let bindings = Binding::try_from_params(
            &[
                Parameter::typed("d", SqlType::Date, time::macros::date!(2024 - 02 - 29)),
                Parameter::typed("t", SqlType::Time, time::macros::time!(13:05:10)),
                Parameter::typed(
                    "ts",
                    SqlType::DateTime2,
                    time::macros::datetime!(2024-02-29 13:05),
                ),
                Parameter::typed(
                    "tz",
                    SqlType::DateTimeOffset,
                    time::macros::datetime!(2024-02-29 13:05 +01:00),
                ),
                Parameter::typed("null_tz", SqlType::DateTimeOffset, DbValue::NULL),
                Parameter::typed("amount", SqlType::Decimal, 12),
                Parameter::new("s", "x"),
                Parameter::new("untyped_null", DbValue::NULL),
            ],
            BindingMode::Advisory,
        )
        .unwrap();
        let values = to_sql_values(&bindings).unwrap();
        let params = as_params(&values);
        assert_eq!(params.len(), 8);
        assert!(matches!(params[0].to_sql(), ColumnData::Date(Some(_))));
        assert!(matches!(params[1].to_sql(), ColumnData::Time(Some(_))));
        assert!(matches!(params[2].to_sql(), ColumnData::DateTime2(Some(_))));
        assert!(matches!(params[3].to_sql(), ColumnData::DateTimeOffset(Some(_))));
        assert!(matches!(params[4].to_sql(), ColumnData::DateTimeOffset(None)));
        assert!(matches!(
            params[5].to_sql(),
            ColumnData::Numeric(Some(n)) if n.value() == 12 && n.scale() == 0
        ));
        assert!(matches!(params[6].to_sql(), ColumnData::String(Some(s)) if s == "x"));
        assert!(matches!(params[7].to_sql(), ColumnData::String(None)));
    }

    #[test]
    fn test_to_numeric() {
        let n = to_numeric("p", &BigDecimal::from_str("-12.345").unwrap()).unwrap();
        assert_eq!(n.value(), -12345);
        assert_eq!(n.scale(), 3);

        let n = to_numeric("p", &BigDecimal::from_str("1E+3").unwrap()).unwrap();
        assert_eq!(n.value(), 1000);
        assert_eq!(n.scale(), 0);

        assert!(to_numeric("p", &BigDecimal::from_str("1E-40").unwrap()).is_err());
    }
}
