use crate::{ConnectParams, ConnectParamsBuilder, HelperResult, IntoConnectParamsBuilder};

/// A trait implemented by types that can be converted into a `ConnectParams`.
pub trait IntoConnectParams {
    /// Converts the value of `self` into a `ConnectParams`.
    ///
    /// # Errors
    /// `HelperError::ConnParams` or `HelperError::Usage` if the conversion is not possible.
    fn into_connect_params(self) -> HelperResult<ConnectParams>;
}

impl IntoConnectParams for ConnectParams {
    fn into_connect_params(self) -> HelperResult<ConnectParams> {
        Ok(self)
    }
}

impl IntoConnectParams for &ConnectParams {
    fn into_connect_params(self) -> HelperResult<ConnectParams> {
        Ok(self.clone())
    }
}

impl IntoConnectParams for ConnectParamsBuilder {
    fn into_connect_params(self) -> HelperResult<ConnectParams> {
        self.build()
    }
}

impl IntoConnectParams for &ConnectParamsBuilder {
    fn into_connect_params(self) -> HelperResult<ConnectParams> {
        self.build()
    }
}

impl IntoConnectParams for &str {
    fn into_connect_params(self) -> HelperResult<ConnectParams> {
        self.into_connect_params_builder()?.build()
    }
}

impl IntoConnectParams for String {
    fn into_connect_params(self) -> HelperResult<ConnectParams> {
        self.as_str().into_connect_params()
    }
}
