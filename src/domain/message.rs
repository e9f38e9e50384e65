use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Message {
    /// Channel id.
    pub channel: String,
    /// User id of the author.
    pub user: String,
    pub text: String,
}

impl Message {
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn new(
        channel: impl Into<String>,
        user: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            channel: channel.into(),
            user: user.into(),
            text: text.into(),
        }
    }
}

/// The message as it was before an edit and as it is after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageEdit {
    pub previous: Message,
    pub current: Message,
}

/// Last known content of a deleted message.
///
/// Same shape as [`Message`], kept as its own type so consumers can tell a
/// deletion from a live message by matching on the type alone.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MessageDelete(pub Message);

impl MessageDelete {
    pub fn message(&self) -> &Message {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserTyping {
    pub channel: String,
    pub user: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FileDeleted {
    pub file_id: String,
    #[serde(default)]
    pub channel_ids: Vec<String>,
}
