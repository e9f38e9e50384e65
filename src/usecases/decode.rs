//! Loads untyped payloads into typed shapes.

use std::collections::HashMap;

use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;

use crate::usecases::error::GatewayError;

const UPSTREAM_NOT_OK: &str = "UPSTREAM_NOT_OK";

/// The envelope common to every Web API response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiResponse {
    pub ok: bool,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ApiResponse {
    pub fn reason(&self) -> &str {
        self.error.as_deref().unwrap_or("unknown")
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Logs the failed response and turns it into an upstream error.
    pub fn into_upstream_error(self, method: &str) -> GatewayError {
        tracing::warn!(
            code = UPSTREAM_NOT_OK,
            method,
            reason = self.reason(),
            retry_after = self.header("retry-after"),
            "remote call answered ok=false"
        );

        GatewayError::Upstream {
            method: method.to_owned(),
            reason: self.reason().to_owned(),
        }
    }
}

/// Decodes `raw` as `T`; a structural mismatch is a schema error naming `shape`.
pub fn decode<T: DeserializeOwned>(raw: &Value, shape: &'static str) -> Result<T, GatewayError> {
    T::deserialize(raw).map_err(|error| GatewayError::schema(shape, error.to_string()))
}

pub fn decode_response(raw: &Value) -> Result<ApiResponse, GatewayError> {
    decode(raw, "ApiResponse")
}

/// Fails with an upstream error unless the response says `ok=true`.
pub fn ensure_ok(method: &str, raw: &Value) -> Result<(), GatewayError> {
    let response = decode_response(raw)?;
    if response.ok {
        Ok(())
    } else {
        Err(response.into_upstream_error(method))
    }
}

/// Borrows a required top-level field of `raw`.
pub fn field<'a>(
    raw: &'a Value,
    name: &str,
    shape: &'static str,
) -> Result<&'a Value, GatewayError> {
    raw.get(name)
        .ok_or_else(|| GatewayError::schema(shape, format!("missing field `{name}`")))
}
