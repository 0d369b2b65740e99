//! Intercom message value: built fresh by a notification for each send.
//!
//! A message is either a direct (admin-initiated) message to a recipient or a reply to an
//! existing conversation. Which one is decided once, by [`IntercomMessage::validate`], and
//! carried forward as a [`Delivery`].

use crate::validation::{Field, MessageKind, ValidationPolicy};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Intercom `message_type` for admin-initiated messages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    #[default]
    InApp,
    Email,
}

/// Email template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Template {
    Plain,
    Personal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecipientType {
    User,
    Contact,
    Lead,
}

/// Intercom `to` object. Identified by Intercom id, email, or the workspace's own `user_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    #[serde(rename = "type")]
    pub kind: RecipientType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl Recipient {
    fn of(kind: RecipientType) -> Self {
        Self {
            kind,
            id: None,
            email: None,
            user_id: None,
        }
    }

    /// User by Intercom id.
    pub fn user(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::of(RecipientType::User)
        }
    }

    pub fn user_email(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            ..Self::of(RecipientType::User)
        }
    }

    /// User by the id your application assigned (Intercom `user_id`).
    pub fn external_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            ..Self::of(RecipientType::User)
        }
    }

    pub fn contact(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::of(RecipientType::Contact)
        }
    }

    pub fn lead(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::of(RecipientType::Lead)
        }
    }

    /// True if at least one identifier is non-empty.
    pub fn is_valid(&self) -> bool {
        [&self.id, &self.email, &self.user_id]
            .into_iter()
            .any(|v| filled(v.as_deref()))
    }
}

/// Intercom `from` object; always an admin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "admin")]
pub struct Admin {
    pub id: String,
}

/// Message resolved for dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    /// Fields for `POST /messages`.
    Direct(Value),
    /// Body for `POST /conversations/{id}/reply`.
    Reply { conversation_id: String, body: Value },
}

/// Channel-specific message produced by a notification.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntercomMessage {
    pub message_type: MessageType,
    pub body: Option<String>,
    pub subject: Option<String>,
    pub template: Option<Template>,
    pub from: Option<Admin>,
    pub to: Option<Recipient>,
    pub conversation_id: Option<String>,
}

impl IntercomMessage {
    /// Empty in-app message.
    pub fn new() -> Self {
        Self::default()
    }

    /// In-app message with the given body.
    pub fn create(body: impl Into<String>) -> Self {
        Self::new().body(body)
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn email(mut self) -> Self {
        self.message_type = MessageType::Email;
        self
    }

    pub fn inapp(mut self) -> Self {
        self.message_type = MessageType::InApp;
        self
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn plain(mut self) -> Self {
        self.template = Some(Template::Plain);
        self
    }

    pub fn personal(mut self) -> Self {
        self.template = Some(Template::Personal);
        self
    }

    /// Sender admin id.
    pub fn from(mut self, admin_id: impl Into<String>) -> Self {
        self.from = Some(Admin { id: admin_id.into() });
        self
    }

    pub fn to(mut self, recipient: Recipient) -> Self {
        self.to = Some(recipient);
        self
    }

    pub fn to_user_id(self, id: impl Into<String>) -> Self {
        self.to(Recipient::user(id))
    }

    pub fn to_user_email(self, email: impl Into<String>) -> Self {
        self.to(Recipient::user_email(email))
    }

    pub fn to_contact_id(self, id: impl Into<String>) -> Self {
        self.to(Recipient::contact(id))
    }

    /// Send as a reply to an existing conversation instead of a new message.
    pub fn reply_to(mut self, conversation_id: impl Into<String>) -> Self {
        self.conversation_id = Some(conversation_id.into());
        self
    }

    pub fn has_recipient(&self) -> bool {
        self.to.is_some()
    }

    /// Conversation id, if set and non-empty.
    pub fn conversation(&self) -> Option<&str> {
        self.conversation_id.as_deref().filter(|id| !id.is_empty())
    }

    pub fn kind(&self) -> MessageKind {
        if self.conversation().is_some() {
            return MessageKind::Reply;
        }
        match self.message_type {
            MessageType::InApp => MessageKind::InApp,
            MessageType::Email => MessageKind::Email,
        }
    }

    fn has_field(&self, field: Field) -> bool {
        match field {
            Field::Body => filled(self.body.as_deref()),
            Field::Subject => filled(self.subject.as_deref()),
            Field::From => self.from.as_ref().is_some_and(|a| filled(Some(a.id.as_str()))),
            Field::To => self.to.as_ref().is_some_and(Recipient::is_valid),
        }
    }

    /// Fields required by `policy` for this message's kind that are not populated.
    /// A direct message always needs a valid recipient, whatever the policy says.
    pub fn missing_fields(&self, policy: &ValidationPolicy) -> Vec<Field> {
        let kind = self.kind();
        let mut missing: Vec<Field> = policy
            .required(kind)
            .iter()
            .copied()
            .filter(|f| !self.has_field(*f))
            .collect();
        if kind != MessageKind::Reply && !self.has_field(Field::To) && !missing.contains(&Field::To) {
            missing.push(Field::To);
        }
        missing
    }

    pub fn is_valid(&self, policy: &ValidationPolicy) -> bool {
        self.missing_fields(policy).is_empty()
    }

    /// Check the message against `policy` and resolve it for dispatch.
    /// On failure returns the missing fields.
    pub fn validate(&self, policy: &ValidationPolicy) -> Result<Delivery, Vec<Field>> {
        let missing = self.missing_fields(policy);
        if !missing.is_empty() {
            return Err(missing);
        }
        Ok(match self.conversation() {
            Some(id) => Delivery::Reply {
                conversation_id: id.to_string(),
                body: self.conversation_body(),
            },
            None => Delivery::Direct(self.to_fields()),
        })
    }

    /// Full field set for `POST /messages`.
    pub fn to_fields(&self) -> Value {
        let mut fields = Map::new();
        fields.insert("message_type".into(), json!(self.message_type));
        if let Some(body) = &self.body {
            fields.insert("body".into(), json!(body));
        }
        if let Some(subject) = &self.subject {
            fields.insert("subject".into(), json!(subject));
        }
        if let Some(template) = self.template {
            fields.insert("template".into(), json!(template));
        }
        if let Some(from) = &self.from {
            fields.insert("from".into(), json!(from));
        }
        if let Some(to) = &self.to {
            fields.insert("to".into(), json!(to));
        }
        Value::Object(fields)
    }

    /// Body for `POST /conversations/{id}/reply`. Admin fields only when a sender is set.
    pub fn conversation_body(&self) -> Value {
        let mut body = Map::new();
        body.insert("message_type".into(), json!("comment"));
        body.insert("body".into(), json!(self.body.as_deref().unwrap_or_default()));
        if let Some(from) = &self.from {
            body.insert("type".into(), json!("admin"));
            body.insert("admin_id".into(), json!(from.id));
        }
        Value::Object(body)
    }
}

fn filled(value: Option<&str>) -> bool {
    value.is_some_and(|s| !s.trim().is_empty())
}
