pub mod backend;
pub mod connect_params;
pub mod connect_params_builder;
pub mod connect_string;
pub mod into_connect_params;
pub mod into_connect_params_builder;
