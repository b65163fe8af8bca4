
use log::info;
use sqlhelper::{HelperError, HelperResult, Parameter, SqlType};

// cargo test test_040_disconnect -- --nocapture
#[test]
fn test_040_disconnect() -> HelperResult<()> {
    let _log_handle = test_utils::init_logger();
    let start = std::time::Instant::now();
    let dir = tempfile::tempdir()?;

    info!("no command can be executed on a closed connection");
    let mut connection = test_utils::get_file_connection(dir.path(), "disconnect.db")?;
    connection.write("CREATE TABLE T (I INTEGER)", &[])?;
    connection.disconnect()?;
    assert!(!connection.is_connected());

    assert!(matches!(
        connection.read("SELECT I FROM T", &[]),
        Err(HelperError::NotConnected)
    ));
    assert!(matches!(
        connection.read_to_table("SELECT I FROM T", &[], true),
        Err(HelperError::NotConnected)
    ));
    assert!(matches!(
        connection.write(
            "INSERT INTO T VALUES (@i)",
            &[Parameter::typed("i", SqlType::Int, 1)]
        ),
        Err(HelperError::NotConnected)
    ));
    assert!(matches!(
        connection.server_version(),
        Err(HelperError::NotConnected)
    ));
    assert!(matches!(
        connection.disconnect(),
        Err(HelperError::NotConnected)
    ));

    info!("the parameters survive the disconnect");
    let params = connection.connect_params().cloned().unwrap();
    let mut connection = sqlhelper::Connection::new(params)?;
    let table = connection.read_to_table("SELECT COUNT(*) FROM T", &[], false)?;
    assert_eq!(table.into_rows(), vec![vec!["0"]]);

    info!("a connection with an open result set cannot be closed");
    let result_set = connection.read("SELECT I FROM T", &[])?;
    assert!(matches!(
        connection.disconnect(),
        Err(HelperError::CursorOpen)
    ));
    drop(result_set);

    test_utils::closing_info(connection, start)
}
