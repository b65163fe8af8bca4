// Values, type hints and named parameters.

mod db_value;
mod parameter;
mod sql_type;

pub use {db_value::DbValue, parameter::Parameter, sql_type::SqlType};

pub(crate) use parameter::{Binding, BindingMode};
