//! Slack transport: Web API over HTTPS and the RTM websocket.

mod frames;

use std::time::Duration;

use futures::{FutureExt, StreamExt};
use serde_json::Value;
use tokio::{net::TcpStream, runtime::Builder};
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

use crate::{
    infra::{config::SlackConfig, error::AppError, secrets::SlackToken},
    usecases::{
        contracts::{ApiCaller, ApiParams, RtmConnection},
        error::TransportError,
    },
};

use self::frames::{decode_frame, map_socket_error, with_headers, Frame};

const RTM_CONNECT: &str = "rtm.connect";
const RTM_HANDSHAKE_FAILED: &str = "RTM_HANDSHAKE_FAILED";
const RTM_FRAME_INVALID: &str = "RTM_FRAME_INVALID";

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Blocking Slack client. Each operation drives its own future to completion on
/// a private current-thread runtime.
pub struct SlackTransport {
    runtime: tokio::runtime::Runtime,
    http: reqwest::Client,
    api_base_url: String,
    token: SlackToken,
    read_timeout: Duration,
    socket: Option<Socket>,
    /// A socket failure seen after some envelopes were read, reported by the next read.
    pending_failure: Option<TransportError>,
}

impl SlackTransport {
    pub fn new(config: &SlackConfig, token: SlackToken) -> Result<Self, AppError> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|error| AppError::TransportInit {
                details: format!("failed to initialize async runtime: {error}"),
            })?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|error| AppError::TransportInit {
                details: format!("failed to build HTTP client: {error}"),
            })?;

        Ok(Self {
            runtime,
            http,
            api_base_url: config.api_base_url.clone(),
            token,
            read_timeout: Duration::from_millis(config.read_timeout_ms),
            socket: None,
            pending_failure: None,
        })
    }

    fn websocket_url(&self) -> Result<String, String> {
        let raw = self
            .call(RTM_CONNECT, &[])
            .map_err(|error| error.to_string())?;

        if raw.get("ok").and_then(Value::as_bool) != Some(true) {
            let reason = raw
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("unknown");
            return Err(format!("{RTM_CONNECT} answered ok=false: {reason}"));
        }

        raw.get("url")
            .and_then(Value::as_str)
            .map(ToOwned::to_owned)
            .ok_or_else(|| format!("{RTM_CONNECT} response has no url"))
    }
}

impl ApiCaller for SlackTransport {
    fn call(&self, method: &str, params: &ApiParams<'_>) -> Result<Value, TransportError> {
        let url = format!("{}/{}", self.api_base_url, method);

        self.runtime.block_on(async {
            let response = self
                .http
                .post(&url)
                .bearer_auth(self.token.expose())
                .form(params)
                .send()
                .await
                .map_err(|error| map_request_error(method, error))?;

            let headers: Vec<(String, String)> = response
                .headers()
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|value| (name.as_str().to_owned(), value.to_owned()))
                })
                .collect();

            let body: Value = response
                .json()
                .await
                .map_err(|error| map_request_error(method, error))?;

            Ok::<_, TransportError>(with_headers(body, headers))
        })
    }
}

impl RtmConnection for SlackTransport {
    fn connect(&mut self) -> bool {
        self.socket = None;
        self.pending_failure = None;

        let url = match self.websocket_url() {
            Ok(url) => url,
            Err(reason) => {
                tracing::warn!(
                    code = RTM_HANDSHAKE_FAILED,
                    reason = %reason,
                    "rtm handshake failed"
                );
                return false;
            }
        };

        match self.runtime.block_on(connect_async(url.as_str())) {
            Ok((socket, _response)) => {
                tracing::debug!("rtm websocket opened");
                self.socket = Some(socket);
                true
            }
            Err(error) => {
                tracing::warn!(
                    code = RTM_HANDSHAKE_FAILED,
                    reason = %error,
                    "rtm websocket could not be opened"
                );
                false
            }
        }
    }

    fn read(&mut self) -> Result<Vec<Value>, TransportError> {
        if let Some(failure) = self.pending_failure.take() {
            return Err(failure);
        }

        let Some(socket) = self.socket.as_mut() else {
            return Err(TransportError::NotConnected);
        };

        let (messages, mut failure) = self.runtime.block_on(read_ready(socket, self.read_timeout));

        let mut envelopes = Vec::with_capacity(messages.len());
        for message in messages {
            match decode_frame(message) {
                Frame::Envelope(envelope) => envelopes.push(envelope),
                Frame::Invalid(reason) => {
                    tracing::warn!(
                        code = RTM_FRAME_INVALID,
                        reason = %reason,
                        "skipping non-JSON rtm frame"
                    );
                }
                Frame::Control => {}
                Frame::Close => failure = Some(TransportError::Closed),
            }
        }

        let Some(failure) = failure else {
            return Ok(envelopes);
        };

        self.socket = None;
        if envelopes.is_empty() {
            return Err(failure);
        }

        // Envelopes read before the failure are delivered first.
        self.pending_failure = Some(failure);
        Ok(envelopes)
    }
}

/// Waits up to `wait` for one frame, then takes every frame already buffered.
/// Stops after a close frame or a socket error.
async fn read_ready(
    socket: &mut Socket,
    wait: Duration,
) -> (Vec<Message>, Option<TransportError>) {
    let mut messages = Vec::new();

    let mut next = match tokio::time::timeout(wait, socket.next()).await {
        Ok(next) => next,
        Err(_elapsed) => return (messages, None),
    };

    loop {
        match next {
            None => return (messages, Some(TransportError::Closed)),
            Some(Err(error)) => return (messages, Some(map_socket_error(error))),
            Some(Ok(message)) => {
                let is_close = message.is_close();
                messages.push(message);
                if is_close {
                    return (messages, None);
                }
            }
        }

        match socket.next().now_or_never() {
            Some(ready) => next = ready,
            None => return (messages, None),
        }
    }
}

fn map_request_error(method: &str, error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout(format!("{method}: {error}"))
    } else {
        TransportError::Request(format!("{method}: {error}"))
    }
}

/// Returns the slack module name for smoke checks.
pub fn module_name() -> &'static str {
    "slack"
}
