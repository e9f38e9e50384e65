//! Memoized channel and user lookups.
//!
//! Channels are fetched once and kept until [`ReferenceCache::invalidate_channels`]
//! is called; nothing refreshes them automatically, so channels created or
//! renamed during the session are not seen until then. Users are fetched on
//! first lookup and evicted one by one when the realtime stream reports a
//! profile change.

use std::collections::HashMap;

use crate::{
    domain::{channel::Channel, user::User},
    usecases::{
        contracts::ApiCaller,
        decode::{decode, decode_response, ensure_ok, field},
        error::GatewayError,
    },
};

/// Web API methods listing channel-like collections and the response field holding each list.
const CHANNEL_SOURCES: [(&str, &str); 2] = [("channels.list", "channels"), ("groups.list", "groups")];
const EXCLUDE_ARCHIVED: (&str, &str) = ("exclude_archived", "1");
const USERS_INFO: &str = "users.info";

#[derive(Debug, Default)]
pub struct ReferenceCache {
    channels: Option<Vec<Channel>>,
    channels_by_id: HashMap<String, Channel>,
    channels_by_name: HashMap<String, Channel>,
    users: HashMap<String, User>,
}

impl ReferenceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Public channels followed by private groups, archived ones excluded.
    ///
    /// # Errors
    /// Fails with [`GatewayError::Upstream`] on the first listing that answers
    /// `ok=false`; nothing is cached in that case.
    pub fn channels(&mut self, api: &dyn ApiCaller) -> Result<&[Channel], GatewayError> {
        if self.channels.is_none() {
            let fetched = fetch_channels(api)?;
            tracing::debug!(count = fetched.len(), "channel list cached");
            self.channels = Some(fetched);
        }

        Ok(self.channels.as_deref().unwrap_or(&[]))
    }

    pub fn get_channel(&mut self, api: &dyn ApiCaller, id: &str) -> Result<Channel, GatewayError> {
        if let Some(channel) = self.channels_by_id.get(id) {
            return Ok(channel.clone());
        }

        let channel = self
            .channels(api)?
            .iter()
            .find(|channel| channel.id == id)
            .cloned()
            .ok_or_else(|| GatewayError::not_found("channel", id))?;

        self.channels_by_id.insert(id.to_owned(), channel.clone());
        Ok(channel)
    }

    pub fn get_channel_by_name(
        &mut self,
        api: &dyn ApiCaller,
        name: &str,
    ) -> Result<Channel, GatewayError> {
        if let Some(channel) = self.channels_by_name.get(name) {
            return Ok(channel.clone());
        }

        let channel = self
            .channels(api)?
            .iter()
            .find(|channel| channel.name() == name)
            .cloned()
            .ok_or_else(|| GatewayError::not_found("channel", name))?;

        self.channels_by_name.insert(name.to_owned(), channel.clone());
        Ok(channel)
    }

    /// Drops the channel list and every channel lookup made from it.
    pub fn invalidate_channels(&mut self) {
        self.channels = None;
        self.channels_by_id.clear();
        self.channels_by_name.clear();
    }

    /// # Errors
    /// A `users.info` answer with `ok=false` is reported as [`GatewayError::NotFound`].
    pub fn get_user(&mut self, api: &dyn ApiCaller, id: &str) -> Result<User, GatewayError> {
        if let Some(user) = self.users.get(id) {
            return Ok(user.clone());
        }

        let raw = api.call(USERS_INFO, &[("user", id)])?;
        let response = decode_response(&raw)?;
        if !response.ok {
            tracing::debug!(
                user_id = id,
                reason = response.reason(),
                "user lookup answered ok=false"
            );
            return Err(GatewayError::not_found("user", id));
        }

        let user: User = decode(field(&raw, "user", "User")?, "User")?;
        self.users.insert(id.to_owned(), user.clone());
        Ok(user)
    }

    /// Forgets a cached user so the next lookup fetches it again.
    /// Returns whether the user was cached.
    pub fn evict_user(&mut self, id: &str) -> bool {
        self.users.remove(id).is_some()
    }
}

fn fetch_channels(api: &dyn ApiCaller) -> Result<Vec<Channel>, GatewayError> {
    let mut channels = Vec::new();

    for (method, list_field) in CHANNEL_SOURCES {
        let raw = api.call(method, &[EXCLUDE_ARCHIVED])?;
        ensure_ok(method, &raw)?;
        let batch: Vec<Channel> = decode(field(&raw, list_field, "Channel list")?, "Channel list")?;
        channels.extend(batch);
    }

    Ok(channels)
}
