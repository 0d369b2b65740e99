//! Inbound contract: who is notified and what they are sent.

use crate::message::{IntercomMessage, Recipient};

/// Channel name used when asking a notifiable for its route.
pub const CHANNEL: &str = "intercom";

/// An entity that can be notified. Resolves its address for a channel, if it has one.
pub trait Notifiable: Send + Sync {
    fn route_notification_for(&self, channel: &str) -> Option<Recipient>;
}

/// A notification that can be delivered over Intercom.
pub trait IntercomNotification: Send + Sync {
    /// Build a fresh message for this send.
    fn to_intercom(&self, notifiable: &dyn Notifiable) -> IntercomMessage;
}

/// A bare recipient is an on-demand notifiable: it routes to itself on the Intercom channel.
impl Notifiable for Recipient {
    fn route_notification_for(&self, channel: &str) -> Option<Recipient> {
        (channel == CHANNEL).then(|| self.clone())
    }
}

impl<F> IntercomNotification for F
where
    F: Fn(&dyn Notifiable) -> IntercomMessage + Send + Sync,
{
    fn to_intercom(&self, notifiable: &dyn Notifiable) -> IntercomMessage {
        self(notifiable)
    }
}
