use crate::{DbValue, HelperError, HelperResult};
use bigdecimal::BigDecimal;

/// Type hints for parameters, named after the SQL Server data types.
///
/// [`Connection::read`](crate::Connection::read) treats a type hint as advisory,
/// [`Connection::write`](crate::Connection::write) requires one on every parameter.
/// In both cases a value that does not fit to its hint is rejected, and a value of a
/// narrower kind is widened to the hinted type (e.g. a `TINYINT` with hint [`SqlType::Int`]
/// is bound as `INT`). `NULL` fits to every type.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SqlType {
    /// Boolean, expects `BOOLEAN`.
    Bit,
    /// Expects `TINYINT`.
    TinyInt,
    /// Expects `SMALLINT` or narrower integers.
    SmallInt,
    /// Expects `INT` or narrower integers.
    Int,
    /// Expects any integer.
    BigInt,
    /// Expects `REAL`.
    Real,
    /// Expects `DOUBLE` or `REAL`.
    Float,
    /// Expects `DECIMAL` or any integer.
    Decimal,
    /// Unicode text, expects `STRING`.
    NVarChar,
    /// Text, expects `STRING`.
    VarChar,
    /// Expects `BINARY`.
    VarBinary,
    /// Expects `DATE`.
    Date,
    /// Expects `TIME`.
    Time,
    /// Expects `TIMESTAMP`.
    DateTime2,
    /// Expects `TIMESTAMPTZ`.
    DateTimeOffset,
}

impl SqlType {
    // Returns the value in the representation that belongs to this type,
    // or a TypeMismatch error if the value does not fit.
    pub(crate) fn coerce(self, name: &str, value: DbValue) -> HelperResult<DbValue> {
        let mismatch = |value: &DbValue| HelperError::TypeMismatch {
            name: name.to_string(),
            expected: self,
            found: value.kind(),
        };

        Ok(match (self, value) {
            (_, DbValue::NULL) => DbValue::NULL,

            (Self::Bit, v @ DbValue::BOOLEAN(_))
            | (Self::TinyInt, v @ DbValue::TINYINT(_))
            | (Self::Real, v @ DbValue::REAL(_))
            | (Self::NVarChar | Self::VarChar, v @ DbValue::STRING(_))
            | (Self::VarBinary, v @ DbValue::BINARY(_))
            | (Self::Date, v @ DbValue::DATE(_))
            | (Self::Time, v @ DbValue::TIME(_))
            | (Self::DateTime2, v @ DbValue::TIMESTAMP(_))
            | (Self::DateTimeOffset, v @ DbValue::TIMESTAMPTZ(_))
            | (Self::Decimal, v @ DbValue::DECIMAL(_)) => v,

            (Self::SmallInt, DbValue::TINYINT(i)) => DbValue::SMALLINT(i16::from(i)),
            (Self::SmallInt, v @ DbValue::SMALLINT(_)) => v,

            (Self::Int, DbValue::TINYINT(i)) => DbValue::INT(i32::from(i)),
            (Self::Int, DbValue::SMALLINT(i)) => DbValue::INT(i32::from(i)),
            (Self::Int, v @ DbValue::INT(_)) => v,

            (Self::BigInt, DbValue::TINYINT(i)) => DbValue::BIGINT(i64::from(i)),
            (Self::BigInt, DbValue::SMALLINT(i)) => DbValue::BIGINT(i64::from(i)),
            (Self::BigInt, DbValue::INT(i)) => DbValue::BIGINT(i64::from(i)),
            (Self::BigInt, v @ DbValue::BIGINT(_)) => v,

            (Self::Float, DbValue::REAL(f)) => DbValue::DOUBLE(f64::from(f)),
            (Self::Float, v @ DbValue::DOUBLE(_)) => v,

            (Self::Decimal, DbValue::TINYINT(i)) => DbValue::DECIMAL(BigDecimal::from(i)),
            (Self::Decimal, DbValue::SMALLINT(i)) => DbValue::DECIMAL(BigDecimal::from(i)),
            (Self::Decimal, DbValue::INT(i)) => DbValue::DECIMAL(BigDecimal::from(i)),
            (Self::Decimal, DbValue::BIGINT(i)) => DbValue::DECIMAL(BigDecimal::from(i)),

            (_, value) => return Err(mismatch(&value)),
        })
    }
}

impl std::fmt::Display for SqlType {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        let name = match *self {
            Self::Bit => "BIT",
            Self::TinyInt => "TINYINT",
            Self::SmallInt => "SMALLINT",
            Self::Int => "INT",
            Self::BigInt => "BIGINT",
            Self::Real => "REAL",
            Self::Float => "FLOAT",
            Self::Decimal => "DECIMAL",
            Self::NVarChar => "NVARCHAR",
            Self::VarChar => "VARCHAR",
            Self::VarBinary => "VARBINARY",
            Self::Date => "DATE",
            Self::Time => "TIME",
            Self::DateTime2 => "DATETIME2",
            Self::DateTimeOffset => "DATETIMEOFFSET",
        };
        write!(fmt, "{name}")
    }
}
