//! Composition root binding a transport, the reference cache and the event
//! normalizer behind one small surface.

use crate::{
    domain::{channel::Channel, user::User},
    usecases::{
        contracts::Transport,
        decode::ensure_ok,
        event_stream::{CancelHandle, EventNormalizer, StreamItem},
        error::GatewayError,
        reference_cache::ReferenceCache,
    },
};

const POST_MESSAGE: &str = "chat.postMessage";

pub struct Gateway<T> {
    transport: T,
    cache: ReferenceCache,
    echo_unrecognized: bool,
}

impl<T: Transport> Gateway<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            cache: ReferenceCache::new(),
            echo_unrecognized: false,
        }
    }

    /// Echo whole unrecognized envelopes to the log instead of just their kind.
    pub fn with_unrecognized_echo(mut self, echo: bool) -> Self {
        self.echo_unrecognized = echo;
        self
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn channels(&mut self) -> Result<&[Channel], GatewayError> {
        self.cache.channels(&self.transport)
    }

    pub fn get_channel(&mut self, id: &str) -> Result<Channel, GatewayError> {
        self.cache.get_channel(&self.transport, id)
    }

    pub fn get_channel_by_name(&mut self, name: &str) -> Result<Channel, GatewayError> {
        self.cache.get_channel_by_name(&self.transport, name)
    }

    pub fn get_user(&mut self, id: &str) -> Result<User, GatewayError> {
        self.cache.get_user(&self.transport, id)
    }

    /// Forces the next channel lookup to list channels again.
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn invalidate_channels(&mut self) {
        self.cache.invalidate_channels();
    }

    /// Posts `text` to a channel as the authenticated user.
    pub fn send_message(&self, channel_id: &str, text: &str) -> Result<(), GatewayError> {
        let params = [("channel", channel_id), ("text", text), ("as_user", "true")];
        let raw = self.transport.call(POST_MESSAGE, &params)?;
        ensure_ok(POST_MESSAGE, &raw)
    }

    /// Opens a new realtime stream. Each call starts over with a fresh handshake.
    pub fn events(&mut self) -> EventStream<'_, T> {
        let normalizer = EventNormalizer::new(self.echo_unrecognized);
        EventStream {
            gateway: self,
            normalizer,
        }
    }
}

/// Lazy sequence of events; `Ok(None)` marks the end of one read cycle.
///
/// The stream holds the gateway for as long as it lives. Lookups between
/// items go through [`EventStream::gateway`].
pub struct EventStream<'a, T> {
    gateway: &'a mut Gateway<T>,
    normalizer: EventNormalizer,
}

impl<T: Transport> EventStream<'_, T> {
    pub fn gateway(&mut self) -> &mut Gateway<T> {
        self.gateway
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.normalizer.cancel_handle()
    }
}

impl<T: Transport> Iterator for EventStream<'_, T> {
    type Item = StreamItem;

    fn next(&mut self) -> Option<Self::Item> {
        let gateway = &mut *self.gateway;
        self.normalizer
            .next_item(&mut gateway.transport, &mut gateway.cache)
    }
}
