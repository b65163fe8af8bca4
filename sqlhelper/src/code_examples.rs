//! Code examples.
//!
//! # 1. Database connections
//!
//! Open a connection directly with a connection string
//! (see also [`ConnectParams`] and [`ConnectString`]):
//!
//! ```rust,no_run
//! use sqlhelper::Connection;
//! # use sqlhelper::HelperResult;
//! # fn foo() -> HelperResult<()> {
//! // an SQLite database file, which is created if it does not exist:
//! let mut connection1 = Connection::new("Data Source=/var/data/sales.db")?;
//!
//! // SQL Server (requires the cargo feature `mssql`):
//! let mut connection2 = Connection::new(
//!     "Provider=mssql; Server=db01,1433; Database=Sales; User Id=meier; Password=schlau",
//! )?;
//! # Ok(())
//! # }
//! ```
//!
//! Or keep the settings in a [`SqlHelper`], which also remembers why the last
//! connection attempt failed:
//!
//! ```rust
//! use sqlhelper::SqlHelper;
//!
//! let mut helper = SqlHelper::trusted("", ":memory:");
//! match helper.try_connect() {
//!     Some(_connection) => { /* work with the connection */ }
//!     None => eprintln!("cannot connect: {}", helper.last_error().unwrap_or_default()),
//! }
//! ```
//!
//! A connection that the application opened itself with `rusqlite` can be used as well,
//! see [`Connection::from_sqlite`].
//!
//! # 2. Reading
//!
//! Commands refer to their parameters with named placeholders, `@name`.
//! The values are bound by the client library, they never become part of the command text.
//!
//! [`Connection::read`] returns a [`ResultSet`], which can be iterated:
//!
//! ```rust
//! # use sqlhelper::{Connection, HelperResult, Parameter};
//! # fn main() -> HelperResult<()> {
//! # let mut connection = Connection::new("Data Source=:memory:")?;
//! # connection.multiple_statements(vec![
//! #     "CREATE TABLE PHRASES (ID INTEGER, TEXT TEXT)",
//! #     "INSERT INTO PHRASES VALUES (1, 'Hello'), (2, 'World')",
//! # ])?;
//! let result_set = connection.read(
//!     "SELECT ID, TEXT FROM PHRASES WHERE ID >= @min_id ORDER BY ID",
//!     &[Parameter::new("min_id", 1)],
//! )?;
//! for row in result_set {
//!     let row = row?;
//!     println!("{} -> {}", row[0], row[1]);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! [`Connection::read_to_table`] converts the complete result into a [`ResultTable`],
//! optionally with a header row:
//!
//! ```rust
//! # use sqlhelper::{Connection, HelperResult, Parameter};
//! # fn main() -> HelperResult<()> {
//! # let mut connection = Connection::new("Data Source=:memory:")?;
//! # connection.multiple_statements(vec![
//! #     "CREATE TABLE PHRASES (ID INTEGER, TEXT TEXT)",
//! #     "INSERT INTO PHRASES VALUES (1, 'Hello'), (2, NULL)",
//! # ])?;
//! let table = connection.read_to_table(
//!     "SELECT ID, TEXT FROM PHRASES ORDER BY ID",
//!     &[],
//!     true,
//! )?;
//! assert_eq!(
//!     table.into_rows(),
//!     vec![vec!["ID", "TEXT"], vec!["1", "Hello"], vec!["2", ""]]
//! );
//! # Ok(())
//! # }
//! ```
//!
//! The text of each value is produced by the `Display` implementation of [`DbValue`];
//! `NULL` becomes the empty string.
//!
//! # 3. Writing
//!
//! [`Connection::write`] returns the number of affected rows.
//! Here every parameter needs a type hint ([`SqlType`]):
//!
//! ```rust
//! # use sqlhelper::{Connection, HelperResult, Parameter, SqlType};
//! # fn main() -> HelperResult<()> {
//! # let mut connection = Connection::new("Data Source=:memory:")?;
//! # connection.write("CREATE TABLE PHRASES (ID INTEGER, TEXT TEXT)", &[])?;
//! let count = connection.write(
//!     "INSERT INTO PHRASES (ID, TEXT) VALUES (@id, @text)",
//!     &[
//!         Parameter::typed("id", SqlType::Int, 3),
//!         Parameter::typed("text", SqlType::NVarChar, "it's; --"),
//!     ],
//! )?;
//! assert_eq!(count, 1);
//! # Ok(())
//! # }
//! ```
//!
//! # 4. Errors
//!
//! All methods return a [`HelperResult`]. [`HelperError::display_with_inner`] renders an
//! error together with the error of the client library that caused it.
//!
//! [`ConnectParams`]: crate::ConnectParams
//! [`ConnectString`]: crate::ConnectString
//! [`SqlHelper`]: crate::SqlHelper
//! [`Connection::from_sqlite`]: crate::Connection::from_sqlite
//! [`Connection::read`]: crate::Connection::read
//! [`Connection::read_to_table`]: crate::Connection::read_to_table
//! [`Connection::write`]: crate::Connection::write
//! [`ResultSet`]: crate::ResultSet
//! [`ResultTable`]: crate::ResultTable
//! [`DbValue`]: crate::DbValue
//! [`SqlType`]: crate::SqlType
//! [`HelperResult`]: crate::HelperResult
//! [`HelperError::display_with_inner`]: crate::HelperError::display_with_inner
