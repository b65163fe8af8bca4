use crate::HelperResult;
use bigdecimal::BigDecimal;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};

/// Enum for all supported database value types.
///
/// `DbValue` is used for the values of [`Parameter`](crate::Parameter)s and for the values
/// in the [`Row`](crate::Row)s of a [`ResultSet`](crate::ResultSet).
///
/// The `Display` implementation produces the same text that is used in a
/// [`ResultTable`](crate::ResultTable):
///
/// - `NULL` becomes the empty string,
/// - numbers are written without grouping or locale-specific separators,
/// - `BINARY` is written as lowercase hex,
/// - dates and times follow ISO 8601 (`2024-02-29 13:05:00.25 +01:00`),
///   fractional seconds without trailing zeros.
#[allow(non_camel_case_types)]
#[derive(Clone, Debug, PartialEq)]
pub enum DbValue {
    /// Representation of a database NULL value.
    NULL,
    /// Boolean.
    BOOLEAN(bool),
    /// Stores an 8-bit unsigned integer.
    TINYINT(u8),
    /// Stores a 16-bit signed integer.
    SMALLINT(i16),
    /// Stores a 32-bit signed integer.
    INT(i32),
    /// Stores a 64-bit signed integer.
    BIGINT(i64),
    /// Stores a single-precision 32-bit floating-point number.
    REAL(f32),
    /// Stores a double-precision 64-bit floating-point number.
    DOUBLE(f64),
    /// Decimal number with arbitrary precision and scale.
    DECIMAL(BigDecimal),
    /// Text.
    STRING(String),
    /// Text that the database delivered, but that is not valid UTF-8.
    DBSTRING(Vec<u8>),
    /// Binary data.
    BINARY(Vec<u8>),
    /// Calendar date.
    DATE(Date),
    /// Time of day.
    TIME(Time),
    /// Date and time, without time zone.
    TIMESTAMP(PrimitiveDateTime),
    /// Date and time with an offset from UTC.
    TIMESTAMPTZ(OffsetDateTime),
}

impl DbValue {
    /// Returns true if the value is a NULL value.
    pub fn is_null(&self) -> bool {
        matches!(*self, Self::NULL)
    }

    /// Returns the name of the variant, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match *self {
            Self::NULL => "NULL",
            Self::BOOLEAN(_) => "BOOLEAN",
            Self::TINYINT(_) => "TINYINT",
            Self::SMALLINT(_) => "SMALLINT",
            Self::INT(_) => "INT",
            Self::BIGINT(_) => "BIGINT",
            Self::REAL(_) => "REAL",
            Self::DOUBLE(_) => "DOUBLE",
            Self::DECIMAL(_) => "DECIMAL",
            Self::STRING(_) => "STRING",
            Self::DBSTRING(_) => "DBSTRING",
            Self::BINARY(_) => "BINARY",
            Self::DATE(_) => "DATE",
            Self::TIME(_) => "TIME",
            Self::TIMESTAMP(_) => "TIMESTAMP",
            Self::TIMESTAMPTZ(_) => "TIMESTAMPTZ",
        }
    }

    /// Converts the value into the text that is used in a [`ResultTable`](crate::ResultTable).
    ///
    /// # Errors
    ///
    /// `HelperError::Utf8` if the value is a `DBSTRING`.
    pub fn try_into_string(self) -> HelperResult<String> {
        match self {
            Self::STRING(s) => Ok(s),
            Self::DBSTRING(bytes) => Ok(String::from_utf8(bytes)?),
            value => Ok(value.to_string()),
        }
    }
}

fn write_fraction(nanos: u32, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
    if nanos == 0 {
        Ok(())
    } else {
        let digits = format!("{nanos:09}");
        write!(fmt, ".{}", digits.trim_end_matches('0'))
    }
}

fn write_date(date: Date, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
    write!(
        fmt,
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

fn write_time(time: Time, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
    write!(
        fmt,
        "{:02}:{:02}:{:02}",
        time.hour(),
        time.minute(),
        time.second()
    )?;
    write_fraction(time.nanosecond(), fmt)
}

impl std::fmt::Display for DbValue {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            Self::NULL => Ok(()),
            Self::BOOLEAN(value) => write!(fmt, "{value}"),
            Self::TINYINT(value) => write!(fmt, "{value}"),
            Self::SMALLINT(value) => write!(fmt, "{value}"),
            Self::INT(value) => write!(fmt, "{value}"),
            Self::BIGINT(value) => write!(fmt, "{value}"),
            Self::REAL(value) => write!(fmt, "{value}"),
            Self::DOUBLE(value) => write!(fmt, "{value}"),
            Self::DECIMAL(ref value) => write!(fmt, "{value}"),
            Self::STRING(ref value) => write!(fmt, "{value}"),
            Self::DBSTRING(ref bytes) => write!(fmt, "{}", String::from_utf8_lossy(bytes)),
            Self::BINARY(ref bytes) => write!(fmt, "{}", hex::encode(bytes)),
            Self::DATE(date) => write_date(date, fmt),
            Self::TIME(time) => write_time(time, fmt),
            Self::TIMESTAMP(ts) => {
                write_date(ts.date(), fmt)?;
                write!(fmt, " ")?;
                write_time(ts.time(), fmt)
            }
            Self::TIMESTAMPTZ(ts) => {
                write_date(ts.date(), fmt)?;
                write!(fmt, " ")?;
                write_time(ts.time(), fmt)?;
                let (hours, minutes, _) = ts.offset().as_hms();
                let sign = if ts.offset().is_negative() { '-' } else { '+' };
                write!(
                    fmt,
                    " {sign}{:02}:{:02}",
                    hours.unsigned_abs(),
                    minutes.unsigned_abs()
                )
            }
        }
    }
}

macro_rules! impl_from {
    ($t:ty, $variant:ident) => {
        impl From<$t> for DbValue {
            fn from(value: $t) -> Self {
                Self::$variant(value)
            }
        }
    };
}

impl_from!(bool, BOOLEAN);
impl_from!(u8, TINYINT);
impl_from!(i16, SMALLINT);
impl_from!(i32, INT);
impl_from!(i64, BIGINT);
impl_from!(f32, REAL);
impl_from!(f64, DOUBLE);
impl_from!(BigDecimal, DECIMAL);
impl_from!(String, STRING);
impl_from!(Vec<u8>, BINARY);
impl_from!(Date, DATE);
impl_from!(Time, TIME);
impl_from!(PrimitiveDateTime, TIMESTAMP);
impl_from!(OffsetDateTime, TIMESTAMPTZ);

impl From<&str> for DbValue {
    fn from(value: &str) -> Self {
        Self::STRING(value.to_string())
    }
}

impl From<&[u8]> for DbValue {
    fn from(value: &[u8]) -> Self {
        Self::BINARY(value.to_vec())
    }
}

impl<T: Into<DbValue>> From<Option<T>> for DbValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::NULL, Into::into)
    }
}

impl PartialEq<i64> for DbValue {
    fn eq(&self, rhs: &i64) -> bool {
        match *self {
            Self::TINYINT(i) => i64::from(i) == *rhs,
            Self::SMALLINT(i) => i64::from(i) == *rhs,
            Self::INT(i) => i64::from(i) == *rhs,
            Self::BIGINT(i) => i == *rhs,
            _ => false,
        }
    }
}

impl PartialEq<&str> for DbValue {
    fn eq(&self, rhs: &&str) -> bool {
        match *self {
            Self::STRING(ref s) => s == rhs,
            _ => false,
        }
    }
}

#[cfg(test)]
mod test {
    use super::DbValue;
    use bigdecimal::BigDecimal;
    use std::str::FromStr;
    use time::macros::{date, datetime, time};

    #[test]
    fn test_stringification() {
        assert_eq!(DbValue::NULL.to_string(), "");
        assert_eq!(DbValue::BOOLEAN(true).to_string(), "true");
        assert_eq!(DbValue::INT(3).to_string(), "3");
        assert_eq!(DbValue::BIGINT(-1_234_567).to_string(), "-1234567");
        assert_eq!(DbValue::DOUBLE(1.5).to_string(), "1.5");
        assert_eq!(DbValue::DOUBLE(3.0).to_string(), "3");
        assert_eq!(
            DbValue::DECIMAL(BigDecimal::from_str("12.50").unwrap()).to_string(),
            "12.50"
        );
        assert_eq!(DbValue::BINARY(vec![0x0a, 0xff]).to_string(), "0aff");
        assert_eq!(DbValue::DATE(date!(2024 - 02 - 29)).to_string(), "2024-02-29");
        assert_eq!(DbValue::TIME(time!(7:05)).to_string(), "07:05:00");
        assert_eq!(
            DbValue::TIME(time!(7:05:01.250)).to_string(),
            "07:05:01.25"
        );
        assert_eq!(
            DbValue::TIMESTAMP(datetime!(2024-02-29 13:05:00.000001)).to_string(),
            "2024-02-29 13:05:00.000001"
        );
        assert_eq!(
            DbValue::TIMESTAMPTZ(datetime!(2024-02-29 13:05 -2:30)).to_string(),
            "2024-02-29 13:05:00 -02:30"
        );
    }

    #[test]
    fn test_try_into_string() {
        assert_eq!(
            DbValue::STRING("a'b".to_string()).try_into_string().unwrap(),
            "a'b"
        );
        assert_eq!(DbValue::NULL.try_into_string().unwrap(), "");
        assert!(DbValue::DBSTRING(vec![0xff, 0xfe]).try_into_string().is_err());
        assert_eq!(
            DbValue::DBSTRING(b"ok".to_vec()).try_into_string().unwrap(),
            "ok"
        );
    }

    #[test]
    fn test_from() {
        assert_eq!(DbValue::from(Some(3_i32)), DbValue::INT(3));
        assert!(DbValue::from(None::<String>).is_null());
        assert_eq!(DbValue::from("x"), "x");
        assert_eq!(DbValue::from(7_u8), 7_i64);
    }
}
