//! Synchronous helper for running parameterized SQL commands and reading results as
//! tables of strings.
//!
//! `sqlhelper` wraps a database client library behind a small, blocking API:
//!
//! - [`SqlHelper`] keeps the connection settings (server, database, credentials or a
//!   complete connection string) and opens [`Connection`]s from them,
//! - [`Connection::read`] and [`Connection::write`] bind a list of named [`Parameter`]s
//!   to the placeholders (`@name`) of a command text and execute it,
//! - [`Connection::read_to_table`] materializes a query result into a [`ResultTable`],
//!   a plain table of strings with an optional header row.
//!
//! Two backends are available, selected with cargo features:
//! `sqlite` (default, based on `rusqlite`) and `mssql` (SQL Server, based on `tiberius`).
//!
//! Parameter binding is the only protection against SQL injection that this crate offers.
//! The raw variants [`Connection::read_raw`] and [`Connection::read_raw_to_table`] exist
//! for old code only and must never be used with untrusted input.
//!
//! See [code examples](crate::code_examples) for an overview.
//!

#![deny(missing_debug_implementations)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

#[cfg(not(any(feature = "sqlite", feature = "mssql")))]
compile_error!("at least one of the features `sqlite` and `mssql` must be enabled");

#[macro_use]
extern crate log;

mod conn;
mod helper_error;
mod result;
mod sql_helper;
mod types_impl;

pub mod code_examples;

pub use crate::conn::{
    Backend, ConnectParams, ConnectParamsBuilder, ConnectSource, ConnectString,
    ConnectStringError, Connection, ConnectionStatistics, IntoConnectParams,
    IntoConnectParamsBuilder, SqliteMode,
};
pub use crate::helper_error::{HelperError, HelperResult};
pub use crate::result::{ColumnMetadata, ResultSet, ResultSetMetadata, ResultTable, Row};
pub use crate::sql_helper::SqlHelper;
pub use crate::types_impl::{DbValue, Parameter, SqlType};

/// Re-export of the crate that is used for date and time values.
pub use time;

/// Re-export of the crate that is used for decimal values.
pub use bigdecimal;

/// Re-export of the SQLite client library, see [`Connection::from_sqlite`].
#[cfg(feature = "sqlite")]
pub use rusqlite;
