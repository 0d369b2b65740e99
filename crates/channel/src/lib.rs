//! Intercom notification channel: turns a notification into an Intercom
//! admin-initiated message or a conversation reply.
//!
//! The host application supplies a [`Notifiable`] (who is notified) and an
//! [`IntercomNotification`] (what is sent). [`IntercomChannel`] resolves the
//! recipient, validates the message, and makes at most one API call.

pub mod channel;
pub mod client;
pub mod config;
pub mod error;
pub mod message;
pub mod notification;
pub mod validation;

pub use channel::IntercomChannel;
pub use client::{ApiError, HttpIntercomClient, IntercomApi};
pub use error::{ChannelError, IncompleteReason};
pub use message::{Admin, Delivery, IntercomMessage, MessageType, Recipient, RecipientType, Template};
pub use notification::{IntercomNotification, Notifiable, CHANNEL};
pub use validation::{Field, MessageKind, ValidationPolicy};
