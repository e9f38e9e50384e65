use std::collections::BTreeSet;

use serde::Deserialize;

/// A topic or purpose line. Slack sends more fields than the text, only the
/// text is kept.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct Topic {
    pub value: String,
}

impl Topic {
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

/// A public channel or a private group, both decode to the same shape.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Channel {
    pub id: String,
    pub name_normalized: String,
    pub purpose: Topic,
    pub topic: Topic,
    /// User ids of the channel members.
    pub members: BTreeSet<String>,
}

impl Channel {
    pub fn name(&self) -> &str {
        &self.name_normalized
    }

    /// The topic if one is set, otherwise the purpose.
    pub fn real_topic(&self) -> &str {
        if self.topic.value.is_empty() {
            &self.purpose.value
        } else {
            &self.topic.value
        }
    }
}
