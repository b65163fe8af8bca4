
use log::{debug, info};
use sqlhelper::{Connection, HelperResult, Parameter, SqlType};

// cargo test test_015_read_to_table -- --nocapture
#[test]
fn test_015_read_to_table() -> HelperResult<()> {
    let _log_handle = test_utils::init_logger();
    let start = std::time::Instant::now();
    let mut connection = test_utils::get_memory_connection()?;

    prepare(&mut connection)?;
    empty_result(&mut connection)?;
    header_and_widths(&mut connection)?;
    stringification(&mut connection)?;
    iterate_result_set(&mut connection)?;

    test_utils::closing_info(connection, start)
}

fn prepare(connection: &mut Connection) -> HelperResult<()> {
    debug!("setup...");
    connection.multiple_statements_ignore_err(vec!["DROP TABLE TEST_TABLE"]);
    connection.multiple_statements(vec![
        "CREATE TABLE TEST_TABLE (ID INTEGER, NAME TEXT, PRICE REAL, DATA BLOB)",
        "INSERT INTO TEST_TABLE VALUES (1, 'one', 1.5, X'00FF')",
        "INSERT INTO TEST_TABLE VALUES (2, NULL, 2, NULL)",
        "INSERT INTO TEST_TABLE VALUES (3, 'three', -0.25, X'')",
    ])
}

fn empty_result(connection: &mut Connection) -> HelperResult<()> {
    info!("an empty result has only the header, or nothing");
    let query = "SELECT ID, NAME FROM TEST_TABLE WHERE ID > @max";
    let params = [Parameter::new("max", 100)];

    let table = connection.read_to_table(query, &params, true)?;
    assert_eq!(table.len(), 1);
    assert_eq!(table.header().unwrap(), &["ID", "NAME"]);
    assert!(table.data_rows().is_empty());

    let table = connection.read_to_table(query, &params, false)?;
    assert!(table.is_empty());
    assert_eq!(table.width(), None);
    Ok(())
}

fn header_and_widths(connection: &mut Connection) -> HelperResult<()> {
    info!("all rows have the width of the query, the header has the column names");
    let table = connection.read_to_table(
        "SELECT ID AS Ident, NAME, DATA FROM TEST_TABLE WHERE ID <= @max ORDER BY ID",
        &[Parameter::typed("@max", SqlType::Int, 2_u8)],
        true,
    )?;
    debug!("table:\n{table}");
    assert_eq!(table.header().unwrap(), &["Ident", "NAME", "DATA"]);
    assert_eq!(table.data_rows().len(), 2);
    assert!(table.iter().all(|row| row.len() == 3));
    Ok(())
}

fn stringification(connection: &mut Connection) -> HelperResult<()> {
    info!("values are converted with a fixed rule");
    let table = connection.read_to_table(
        "SELECT ID, NAME, PRICE, DATA FROM TEST_TABLE ORDER BY ID",
        &[],
        false,
    )?;
    assert_eq!(
        table.into_rows(),
        vec![
            vec!["1", "one", "1.5", "00ff"],
            vec!["2", "", "2", ""],
            vec!["3", "three", "-0.25", ""],
        ]
    );

    let table = connection.read_to_table(
        "SELECT @b AS B, @d AS D, @ts AS TS",
        &[
            Parameter::new("b", true),
            Parameter::new("d", sqlhelper::time::macros::date!(2024 - 02 - 29)),
            Parameter::new(
                "ts",
                sqlhelper::time::macros::datetime!(2024-02-29 13:05:00.25),
            ),
        ],
        false,
    )?;
    // SQLite has no boolean type, and keeps dates as text
    assert_eq!(
        table.into_rows(),
        vec![vec!["1", "2024-02-29", "2024-02-29 13:05:00.25"]]
    );
    Ok(())
}

fn iterate_result_set(connection: &mut Connection) -> HelperResult<()> {
    info!("a result set can be iterated row by row");
    let result_set = connection.read("SELECT ID, NAME FROM TEST_TABLE ORDER BY ID", &[])?;
    assert_eq!(result_set.column_count(), 2);
    assert_eq!(result_set.metadata()[1].declared_type(), Some("TEXT"));
    let mut ids = Vec::new();
    for row in result_set {
        let mut row = row?;
        ids.push(row.next_value().unwrap());
    }
    assert_eq!(ids, vec![1_i64, 2, 3]);
    Ok(())
}
