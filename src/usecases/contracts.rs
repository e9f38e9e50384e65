use serde_json::Value;

use crate::usecases::error::TransportError;

/// Named parameters of a Web API call.
pub type ApiParams<'a> = [(&'a str, &'a str)];

/// One-shot request/response access to the remote API.
///
/// The raw response always carries `ok` and `headers`, plus method-specific
/// fields when `ok` is true.
pub trait ApiCaller {
    fn call(&self, method: &str, params: &ApiParams<'_>) -> Result<Value, TransportError>;
}

/// The realtime event socket.
pub trait RtmConnection {
    /// Performs the handshake. Returns `false` when it did not succeed.
    fn connect(&mut self) -> bool;

    /// Returns the envelopes that arrived since the previous read, possibly none.
    fn read(&mut self) -> Result<Vec<Value>, TransportError>;
}

pub trait Transport: ApiCaller + RtmConnection {}

impl<T> Transport for T where T: ApiCaller + RtmConnection {}
