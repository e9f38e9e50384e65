//! Classification of raw realtime envelopes into typed events.

use serde_json::Value;

use crate::{
    domain::{
        events::SlackEvent,
        message::{FileDeleted, Message, MessageDelete, MessageEdit, UserTyping},
        user::User,
    },
    usecases::{
        decode::{decode, field},
        error::GatewayError,
        reference_cache::ReferenceCache,
    },
};

/// Kinds that carry nothing a consumer needs.
const SILENT_KINDS: [&str; 3] = ["channel_marked", "group_marked", "hello"];

/// Closed set of envelope classes, keyed on the `(type, subtype)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeKind {
    Message,
    MessageChanged,
    MessageDeleted,
    UserTyping,
    UserChange,
    FileDeleted,
    Silent,
    Unrecognized,
}

impl EnvelopeKind {
    pub fn classify(envelope: &Value) -> Self {
        let kind = envelope.get("type").and_then(Value::as_str);
        let subkind = envelope
            .get("subtype")
            .and_then(Value::as_str)
            .filter(|subkind| !subkind.is_empty());

        Self::from_tags(kind, subkind)
    }

    /// First match wins.
    pub fn from_tags(kind: Option<&str>, subkind: Option<&str>) -> Self {
        match (kind, subkind) {
            (Some("message"), None) => Self::Message,
            (Some("message"), Some("message_changed")) => Self::MessageChanged,
            (Some("message"), Some("message_deleted")) => Self::MessageDeleted,
            (Some("user_typing"), _) => Self::UserTyping,
            (Some("user_change"), _) => Self::UserChange,
            (Some("file_deleted"), _) => Self::FileDeleted,
            (Some(kind), _) if SILENT_KINDS.contains(&kind) => Self::Silent,
            _ => Self::Unrecognized,
        }
    }
}

/// Turns one envelope of the given kind into at most one event.
///
/// `user_change` envelopes evict the changed user from `cache` and emit nothing.
pub fn normalize_envelope(
    kind: EnvelopeKind,
    mut envelope: Value,
    cache: &mut ReferenceCache,
) -> Result<Option<SlackEvent>, GatewayError> {
    let event = match kind {
        EnvelopeKind::Message => {
            let message: Message = decode(&envelope, "Message")?;
            require_channel(&message.channel, "Message")?;
            SlackEvent::Message(message)
        }
        EnvelopeKind::MessageChanged => {
            let channel = envelope_channel(&envelope, "MessageEdit")?;
            let current = take_nested(&mut envelope, "message", &channel, "MessageEdit")?;
            let previous = take_nested(&mut envelope, "previous_message", &channel, "MessageEdit")?;

            SlackEvent::MessageEdit(MessageEdit {
                previous: decode(&previous, "Message")?,
                current: decode(&current, "Message")?,
            })
        }
        EnvelopeKind::MessageDeleted => {
            let channel = envelope_channel(&envelope, "MessageDelete")?;
            let previous =
                take_nested(&mut envelope, "previous_message", &channel, "MessageDelete")?;

            SlackEvent::MessageDelete(decode::<MessageDelete>(&previous, "MessageDelete")?)
        }
        EnvelopeKind::UserTyping => {
            SlackEvent::UserTyping(decode::<UserTyping>(&envelope, "UserTyping")?)
        }
        EnvelopeKind::UserChange => {
            let user: User = decode(field(&envelope, "user", "User")?, "User")?;
            if cache.evict_user(&user.id) {
                tracing::debug!(user_id = %user.id, "changed user evicted from cache");
            }
            return Ok(None);
        }
        EnvelopeKind::FileDeleted => {
            SlackEvent::FileDeleted(decode::<FileDeleted>(&envelope, "FileDeleted")?)
        }
        EnvelopeKind::Silent | EnvelopeKind::Unrecognized => return Ok(None),
    };

    Ok(Some(event))
}

fn envelope_channel(envelope: &Value, shape: &'static str) -> Result<String, GatewayError> {
    let channel = field(envelope, "channel", shape)?
        .as_str()
        .ok_or_else(|| GatewayError::schema(shape, "`channel` is not a string"))?;
    require_channel(channel, shape)?;

    Ok(channel.to_owned())
}

fn require_channel(channel: &str, shape: &'static str) -> Result<(), GatewayError> {
    if channel.is_empty() {
        return Err(GatewayError::schema(shape, "empty channel id"));
    }

    Ok(())
}

/// Detaches the nested message `name` and stamps it with the envelope's channel,
/// which Slack does not repeat inside it.
fn take_nested(
    envelope: &mut Value,
    name: &str,
    channel: &str,
    shape: &'static str,
) -> Result<Value, GatewayError> {
    let mut nested = envelope
        .get_mut(name)
        .map(Value::take)
        .ok_or_else(|| GatewayError::schema(shape, format!("missing field `{name}`")))?;

    let object = nested
        .as_object_mut()
        .ok_or_else(|| GatewayError::schema(shape, format!("`{name}` is not an object")))?;
    object.insert("channel".to_owned(), Value::String(channel.to_owned()));

    Ok(nested)
}
