use crate::{ConnectParamsBuilder, ConnectString, HelperResult};

/// A trait implemented by types that can be converted into a `ConnectParamsBuilder`.
///
/// # Example
/// ```rust
///     use sqlhelper::IntoConnectParamsBuilder;
///
///     let cp_builder = "Server=abcd123; Database=Sales; UID=MEIER; PWD=schLau"
///         .into_connect_params_builder()
///         .unwrap();
///
///     assert_eq!("abcd123", cp_builder.get_server().unwrap());
/// ```
pub trait IntoConnectParamsBuilder {
    /// Converts the value of `self` into a `ConnectParamsBuilder`.
    ///
    /// # Errors
    /// `HelperError::ConnParams` or `HelperError::UsageDetailed` if wrong information was provided
    fn into_connect_params_builder(self) -> HelperResult<ConnectParamsBuilder>;
}

impl IntoConnectParamsBuilder for ConnectParamsBuilder {
    fn into_connect_params_builder(self) -> HelperResult<ConnectParamsBuilder> {
        Ok(self)
    }
}

impl IntoConnectParamsBuilder for &str {
    fn into_connect_params_builder(self) -> HelperResult<ConnectParamsBuilder> {
        let mut builder = ConnectParamsBuilder::new();
        builder.connect_string(self)?;
        Ok(builder)
    }
}

impl IntoConnectParamsBuilder for String {
    fn into_connect_params_builder(self) -> HelperResult<ConnectParamsBuilder> {
        self.as_str().into_connect_params_builder()
    }
}

impl IntoConnectParamsBuilder for ConnectString {
    fn into_connect_params_builder(self) -> HelperResult<ConnectParamsBuilder> {
        self.to_unredacted_string().into_connect_params_builder()
    }
}
