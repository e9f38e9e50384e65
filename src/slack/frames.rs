use std::io::ErrorKind;

use serde_json::{Map, Value};
use tokio_tungstenite::tungstenite::{self, Message};

use crate::usecases::error::TransportError;

#[derive(Debug, PartialEq)]
pub(super) enum Frame {
    Envelope(Value),
    Invalid(String),
    /// Ping, pong and binary frames carry no envelope.
    Control,
    Close,
}

pub(super) fn decode_frame(message: Message) -> Frame {
    match message {
        Message::Text(text) => match serde_json::from_str(&text) {
            Ok(envelope) => Frame::Envelope(envelope),
            Err(error) => Frame::Invalid(error.to_string()),
        },
        Message::Close(_) => Frame::Close,
        _ => Frame::Control,
    }
}

/// Attaches the HTTP response headers to a Web API body under `headers`.
pub(super) fn with_headers(body: Value, headers: Vec<(String, String)>) -> Value {
    let headers: Map<String, Value> = headers
        .into_iter()
        .map(|(name, value)| (name, Value::String(value)))
        .collect();

    match body {
        Value::Object(mut object) => {
            object.insert("headers".to_owned(), Value::Object(headers));
            Value::Object(object)
        }
        // Not a Web API envelope; `ok` stays absent and decoding reports it.
        other => other,
    }
}

pub(super) fn map_socket_error(error: tungstenite::Error) -> TransportError {
    match error {
        tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed => {
            TransportError::Closed
        }
        tungstenite::Error::Io(io) if io.kind() == ErrorKind::TimedOut => {
            TransportError::Timeout(io.to_string())
        }
        other => TransportError::BrokenPipe(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use serde_json::json;

    use super::*;

    #[test]
    fn text_frames_decode_as_envelopes() {
        let frame = decode_frame(Message::Text(r#"{"type":"hello"}"#.into()));

        assert_eq!(frame, Frame::Envelope(json!({"type": "hello"})));
    }

    #[test]
    fn non_json_text_is_invalid_and_control_frames_are_empty() {
        assert!(matches!(
            decode_frame(Message::Text("not json".into())),
            Frame::Invalid(_)
        ));
        assert_eq!(decode_frame(Message::Ping(vec![1])), Frame::Control);
        assert_eq!(decode_frame(Message::Close(None)), Frame::Close);
    }

    #[test]
    fn headers_are_merged_into_object_bodies() {
        let body = with_headers(
            json!({"ok": false, "error": "ratelimited"}),
            vec![("retry-after".to_owned(), "30".to_owned())],
        );

        assert_eq!(
            body,
            json!({"ok": false, "error": "ratelimited", "headers": {"retry-after": "30"}})
        );
    }

    #[test]
    fn socket_errors_map_to_transport_errors() {
        assert_eq!(
            map_socket_error(tungstenite::Error::ConnectionClosed),
            TransportError::Closed
        );
        assert!(matches!(
            map_socket_error(tungstenite::Error::Io(io::Error::new(
                ErrorKind::TimedOut,
                "slow"
            ))),
            TransportError::Timeout(_)
        ));
        assert!(matches!(
            map_socket_error(tungstenite::Error::Io(io::Error::new(
                ErrorKind::BrokenPipe,
                "pipe"
            ))),
            TransportError::BrokenPipe(_)
        ));
    }
}
