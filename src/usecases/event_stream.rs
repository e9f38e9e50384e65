//! The realtime read loop and its reconnect-once recovery.
//!
//! One read cycle is fully normalized before the next read is issued, and
//! every cycle ends with an absent-value marker so a consumer can tell
//! "drained, about to wait" from "event available now". A failed read is
//! answered with a single new handshake; events in flight at the time of the
//! failure are lost. If that handshake fails too, the read failure is handed
//! to the consumer and the stream ends.

use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use serde_json::Value;

use crate::{
    domain::events::SlackEvent,
    usecases::{
        contracts::RtmConnection,
        envelope::{normalize_envelope, EnvelopeKind},
        error::{GatewayError, TransportError},
        reference_cache::ReferenceCache,
    },
};

const EVENT_STREAM_CONNECTED: &str = "EVENT_STREAM_CONNECTED";
const EVENT_STREAM_HANDSHAKE_FAILED: &str = "EVENT_STREAM_HANDSHAKE_FAILED";
const EVENT_STREAM_RECOVERING: &str = "EVENT_STREAM_RECOVERING";
const EVENT_STREAM_RECOVERED: &str = "EVENT_STREAM_RECOVERED";
const EVENT_STREAM_TERMINATED: &str = "EVENT_STREAM_TERMINATED";
const EVENT_STREAM_CANCELLED: &str = "EVENT_STREAM_CANCELLED";
const EVENT_SCHEMA_MISMATCH: &str = "EVENT_SCHEMA_MISMATCH";
const EVENT_UNRECOGNIZED: &str = "EVENT_UNRECOGNIZED";

/// An event, or `None` once the current read cycle is drained.
pub type StreamItem = Result<Option<SlackEvent>, GatewayError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamState {
    Disconnected,
    Connecting,
    Streaming,
    /// A read failed; holds the failure to report if the new handshake fails.
    Recovering(TransportError),
    Terminated,
}

/// Stops an event stream before its next read.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    cancelled: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
pub struct EventNormalizer {
    state: StreamState,
    pending: VecDeque<StreamItem>,
    cancel: CancelHandle,
    echo_unrecognized: bool,
}

impl EventNormalizer {
    pub fn new(echo_unrecognized: bool) -> Self {
        Self {
            state: StreamState::Disconnected,
            pending: VecDeque::new(),
            cancel: CancelHandle::default(),
            echo_unrecognized,
        }
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn state(&self) -> &StreamState {
        &self.state
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Produces the next stream item, blocking on the connection as needed.
    /// Returns `None` once the stream has terminated.
    pub fn next_item(
        &mut self,
        connection: &mut dyn RtmConnection,
        cache: &mut ReferenceCache,
    ) -> Option<StreamItem> {
        loop {
            if let Some(item) = self.pending.pop_front() {
                return Some(item);
            }

            match std::mem::replace(&mut self.state, StreamState::Terminated) {
                StreamState::Terminated => return None,
                StreamState::Disconnected => self.state = StreamState::Connecting,
                StreamState::Connecting => {
                    if !connection.connect() {
                        tracing::warn!(
                            code = EVENT_STREAM_HANDSHAKE_FAILED,
                            "realtime handshake failed"
                        );
                        return Some(Err(TransportError::HandshakeRejected.into()));
                    }

                    tracing::info!(code = EVENT_STREAM_CONNECTED, "realtime stream connected");
                    self.state = StreamState::Streaming;
                }
                StreamState::Streaming => {
                    if self.cancel.is_cancelled() {
                        tracing::info!(code = EVENT_STREAM_CANCELLED, "event stream cancelled");
                        return None;
                    }

                    match connection.read() {
                        Ok(batch) => {
                            self.state = StreamState::Streaming;
                            self.process_batch(batch, cache);
                        }
                        Err(error) => {
                            tracing::warn!(
                                code = EVENT_STREAM_RECOVERING,
                                error = %error,
                                "realtime read failed; reconnecting"
                            );
                            self.state = StreamState::Recovering(error);
                        }
                    }
                }
                StreamState::Recovering(cause) => {
                    if !connection.connect() {
                        tracing::error!(
                            code = EVENT_STREAM_TERMINATED,
                            error = %cause,
                            "realtime reconnect failed; ending event stream"
                        );
                        return Some(Err(cause.into()));
                    }

                    tracing::warn!(
                        code = EVENT_STREAM_RECOVERED,
                        "realtime stream reconnected; events during the outage were lost"
                    );
                    self.state = StreamState::Streaming;
                    self.pending.push_back(Ok(None));
                }
            }
        }
    }

    fn process_batch(&mut self, batch: Vec<Value>, cache: &mut ReferenceCache) {
        for envelope in batch {
            let kind = EnvelopeKind::classify(&envelope);
            if kind == EnvelopeKind::Unrecognized {
                self.report_unrecognized(&envelope);
                continue;
            }

            match normalize_envelope(kind, envelope, cache) {
                Ok(Some(event)) => self.pending.push_back(Ok(Some(event))),
                Ok(None) => {}
                Err(error) => {
                    tracing::error!(
                        code = EVENT_SCHEMA_MISMATCH,
                        kind = ?kind,
                        error = %error,
                        "envelope does not match its expected shape; ending event stream"
                    );
                    self.pending.push_back(Err(error));
                    self.state = StreamState::Terminated;
                    return;
                }
            }
        }

        self.pending.push_back(Ok(None));
    }

    fn report_unrecognized(&self, envelope: &Value) {
        let kind = envelope.get("type").and_then(Value::as_str).unwrap_or("");
        let subkind = envelope.get("subtype").and_then(Value::as_str).unwrap_or("");

        if self.echo_unrecognized {
            tracing::info!(
                code = EVENT_UNRECOGNIZED,
                kind,
                subkind,
                envelope = %envelope,
                "unrecognized envelope skipped"
            );
        } else {
            tracing::debug!(
                code = EVENT_UNRECOGNIZED,
                kind,
                subkind,
                "unrecognized envelope skipped"
            );
        }
    }
}
