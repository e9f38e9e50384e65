use crate::domain::message::{FileDeleted, Message, MessageDelete, MessageEdit, UserTyping};

/// Every event the gateway hands to its consumer.
///
/// The variant is picked by the normalizer from the envelope kind, never from
/// the payload shape: a deletion and a live message look the same on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlackEvent {
    UserTyping(UserTyping),
    MessageDelete(MessageDelete),
    MessageEdit(MessageEdit),
    Message(Message),
    FileDeleted(FileDeleted),
}

impl SlackEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UserTyping(_) => "user_typing",
            Self::MessageDelete(_) => "message_delete",
            Self::MessageEdit(_) => "message_edit",
            Self::Message(_) => "message",
            Self::FileDeleted(_) => "file_deleted",
        }
    }

    /// Channel the event happened in, if it belongs to exactly one.
    pub fn channel(&self) -> Option<&str> {
        match self {
            Self::UserTyping(typing) => Some(&typing.channel),
            Self::MessageDelete(deleted) => Some(&deleted.message().channel),
            Self::MessageEdit(edit) => Some(&edit.current.channel),
            Self::Message(message) => Some(&message.channel),
            Self::FileDeleted(_) => None,
        }
    }
}
