//! Required-field policy: which message fields must be populated before a message may be sent.
//!
//! Intercom accepts different shapes for in-app messages, emails, and conversation replies,
//! so the required set is kept per [`MessageKind`] and can be overridden from config.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A message field that can be required by the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Body,
    Subject,
    From,
    To,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Body => "body",
            Field::Subject => "subject",
            Field::From => "from",
            Field::To => "to",
        };
        f.write_str(name)
    }
}

/// Shape of a message as far as validation is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// Admin-initiated in-app message.
    InApp,
    /// Admin-initiated email.
    Email,
    /// Reply to an existing conversation.
    Reply,
}

/// Required fields per message kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationPolicy {
    required: HashMap<MessageKind, Vec<Field>>,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationPolicy {
    /// Intercom's own requirements: in-app needs body, sender and recipient; email also needs a
    /// subject; a conversation reply needs only a body.
    pub fn new() -> Self {
        let mut required = HashMap::new();
        required.insert(MessageKind::InApp, vec![Field::Body, Field::From, Field::To]);
        required.insert(
            MessageKind::Email,
            vec![Field::Body, Field::From, Field::To, Field::Subject],
        );
        required.insert(MessageKind::Reply, vec![Field::Body]);
        Self { required }
    }

    /// Replace the required fields for one kind.
    pub fn require(mut self, kind: MessageKind, fields: Vec<Field>) -> Self {
        self.required.insert(kind, fields);
        self
    }

    pub fn required(&self, kind: MessageKind) -> &[Field] {
        self.required.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }
}
