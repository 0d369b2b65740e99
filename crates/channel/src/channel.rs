//! Intercom channel: sends a notification as an Intercom message or conversation reply.

use crate::client::{ApiError, HttpIntercomClient, IntercomApi};
use crate::config::Config;
use crate::error::{ChannelError, IncompleteReason};
use crate::message::Delivery;
use crate::notification::{IntercomNotification, Notifiable, CHANNEL};
use crate::validation::ValidationPolicy;
use anyhow::Context;
use std::sync::Arc;

/// Dispatches notifications through an injected [`IntercomApi`].
///
/// Holds no per-call state; one instance can serve concurrent sends.
#[derive(Clone)]
pub struct IntercomChannel {
    client: Arc<dyn IntercomApi>,
    policy: ValidationPolicy,
}

impl IntercomChannel {
    pub fn new(client: Arc<dyn IntercomApi>) -> Self {
        Self {
            client,
            policy: ValidationPolicy::default(),
        }
    }

    /// HTTP client and validation policy from config.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let client =
            HttpIntercomClient::from_config(config).context("building intercom http client")?;
        Ok(Self::new(Arc::new(client)).with_policy(config.intercom.validation_policy()))
    }

    pub fn with_policy(mut self, policy: ValidationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn client(&self) -> &Arc<dyn IntercomApi> {
        &self.client
    }

    pub fn policy(&self) -> &ValidationPolicy {
        &self.policy
    }

    /// Send the notification via the Intercom API. At most one API call; no retries.
    ///
    /// Fails with `MessageIncomplete` when no recipient can be resolved or the message is
    /// missing required fields, `RequestFailed` when Intercom answers with a bad status, and
    /// `Client` for any other client error.
    pub async fn send(
        &self,
        notifiable: &dyn Notifiable,
        notification: &dyn IntercomNotification,
    ) -> Result<(), ChannelError> {
        let mut message = notification.to_intercom(notifiable);

        if !message.has_recipient() && message.conversation().is_none() {
            match notifiable.route_notification_for(CHANNEL) {
                Some(to) => {
                    log::debug!("intercom: recipient resolved from notifiable");
                    message = message.to(to);
                }
                None => {
                    return Err(ChannelError::incomplete(
                        message,
                        IncompleteReason::RecipientMissing,
                    ))
                }
            }
        }

        let delivery = match message.validate(&self.policy) {
            Ok(d) => d,
            Err(missing) => {
                return Err(ChannelError::incomplete(
                    message,
                    IncompleteReason::Invalid { missing },
                ))
            }
        };

        self.deliver(delivery).await
    }

    async fn deliver(&self, delivery: Delivery) -> Result<(), ChannelError> {
        let result = match delivery {
            Delivery::Reply {
                conversation_id,
                body,
            } => {
                log::debug!("intercom: replying to conversation {}", conversation_id);
                self.client
                    .reply_to_conversation(&conversation_id, &body)
                    .await
            }
            Delivery::Direct(fields) => {
                log::debug!("intercom: creating message");
                self.client.create_message(&fields).await
            }
        };
        result.map_err(|e| {
            if let ApiError::BadResponse { status, .. } = &e {
                log::warn!("intercom: api responded with status {}", status);
            }
            ChannelError::from(e)
        })
    }
}
