//! Errors surfaced by [`IntercomChannel::send`](crate::IntercomChannel::send).

use crate::client::ApiError;
use crate::message::IntercomMessage;
use crate::validation::Field;
use std::fmt;

/// Why a message could not be sent as built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncompleteReason {
    /// No recipient on the message, no conversation id, and the notifiable has no route.
    RecipientMissing,
    /// Required fields for the message kind are not populated.
    Invalid { missing: Vec<Field> },
}

impl fmt::Display for IncompleteReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IncompleteReason::RecipientMissing => f.write_str("Recipient is not provided"),
            IncompleteReason::Invalid { missing } => {
                f.write_str(
                    "The message is not valid. Please check that you have filled required params",
                )?;
                if !missing.is_empty() {
                    let names: Vec<String> = missing.iter().map(Field::to_string).collect();
                    write!(f, " (missing: {})", names.join(", "))?;
                }
                Ok(())
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// Raised before any API call; carries the offending message.
    #[error("{reason}")]
    MessageIncomplete {
        message: Box<IntercomMessage>,
        reason: IncompleteReason,
    },
    /// Intercom answered with a bad HTTP status.
    #[error("intercom request failed: {message}")]
    RequestFailed { code: u16, message: String },
    /// Any other client failure, passed through as is.
    #[error(transparent)]
    Client(ApiError),
}

impl ChannelError {
    pub(crate) fn incomplete(message: IntercomMessage, reason: IncompleteReason) -> Self {
        ChannelError::MessageIncomplete {
            message: Box::new(message),
            reason,
        }
    }
}

impl From<ApiError> for ChannelError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::BadResponse { status, message } => ChannelError::RequestFailed {
                code: status,
                message,
            },
            other => ChannelError::Client(other),
        }
    }
}
