// The database connection, the parameters for creating one, and the backend clients.

mod connection;
mod connection_statistics;
mod db_client;
mod params;
mod placeholders;

pub use {
    connection::Connection,
    connection_statistics::ConnectionStatistics,
    params::{
        backend::{Backend, SqliteMode},
        connect_params::{ConnectParams, ConnectSource},
        connect_params_builder::ConnectParamsBuilder,
        connect_string::{ConnectString, ConnectStringError},
        into_connect_params::IntoConnectParams,
        into_connect_params_builder::IntoConnectParamsBuilder,
    },
};

use db_client::DbClient;
