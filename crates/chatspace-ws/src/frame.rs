//! Wire frame model and tagged-variant codec.
//!
//! Inbound frames are JSON objects dispatched on the `type` discriminant
//! (`"00"` chat text, `"02"` friend login/logout, `"04"` online roster).
//! Any frame may instead carry an error envelope `{code, msg}` with
//! `code != 200`, which is checked before the discriminant. Decoding
//! validates the discriminant first and rejects unknown variants with a
//! distinguishable [`FrameError`] instead of silently ignoring them.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Server success sentinel for the `{code, msg}` envelope.
pub const SUCCESS_CODE: i64 = 200;

/// Message type discriminant.
///
/// The wire strings are fixed by the server protocol. `Error` has no wire
/// tag of its own (it travels as an error envelope); the `"error"` mapping
/// exists only so messages survive the durable-cache JSON round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageKind {
    /// Chat text message (`"00"`).
    #[serde(rename = "00")]
    ChatText,
    /// Friend login/logout status (`"02"`).
    #[serde(rename = "02")]
    FriendStatus,
    /// Online roster snapshot (`"04"`).
    #[serde(rename = "04")]
    OnlineRoster,
    /// Server error envelope.
    #[serde(rename = "error")]
    Error,
}

impl MessageKind {
    /// Wire discriminant for this kind, if it has one.
    #[must_use]
    pub const fn wire_code(self) -> Option<&'static str> {
        match self {
            Self::ChatText => Some("00"),
            Self::FriendStatus => Some("02"),
            Self::OnlineRoster => Some("04"),
            Self::Error => None,
        }
    }
}

/// Outbound chat frame: `{to_account, content, type}`.
#[derive(Debug, Clone, Serialize)]
pub struct OutboundFrame {
    /// Recipient account.
    pub to_account: String,
    /// Message body.
    pub content: String,
    /// Wire discriminant.
    #[serde(rename = "type")]
    pub kind: MessageKind,
}

impl OutboundFrame {
    /// Serializes the frame to its wire JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn to_wire(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// A decoded, validated inbound frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundFrame {
    /// Server-side error envelope (`code != 200`).
    ServerError {
        /// Server status code.
        code: i64,
        /// Human-readable server message.
        message: String,
    },
    /// Chat text message (`type == "00"`).
    ChatText {
        /// Sender account.
        from_account: String,
        /// Message body.
        content: String,
        /// Server timestamp in epoch seconds, when provided.
        time: Option<i64>,
        /// Server-assigned message id, when provided.
        message_id: Option<String>,
    },
    /// Friend login/logout notice (`type == "02"`).
    FriendStatus {
        /// The friend's account (wire field `addi`).
        account: String,
        /// True for `"Login"`, false for `"Logout"`.
        online: bool,
        /// Server timestamp in epoch seconds, when provided.
        time: Option<i64>,
    },
    /// Full online roster snapshot (`type == "04"`).
    OnlineRoster {
        /// Online accounts, blank segments dropped.
        accounts: Vec<String>,
        /// Server timestamp in epoch seconds, when provided.
        time: Option<i64>,
    },
}

/// Malformed or unrecognized frame.
#[derive(Debug, Error)]
pub enum FrameError {
    /// The payload was not valid JSON.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The frame carried no `type` discriminant.
    #[error("frame has no type discriminant")]
    MissingType,

    /// The `type` discriminant did not match a known variant.
    #[error("unknown frame type {0:?}")]
    UnknownType(String),

    /// A required field was absent or of the wrong shape.
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    /// A field carried a value outside its allowed set.
    #[error("invalid value {value:?} for field `{field}`")]
    InvalidField {
        /// Field name.
        field: &'static str,
        /// Offending value.
        value: String,
    },
}

impl InboundFrame {
    /// Decodes one raw inbound frame.
    ///
    /// The error envelope is checked first; otherwise the `type`
    /// discriminant selects the variant and its required fields are
    /// validated.
    ///
    /// # Errors
    ///
    /// Returns a [`FrameError`] for invalid JSON, a missing or unknown
    /// discriminant, or missing/invalid required fields.
    pub fn decode(raw: &str) -> Result<Self, FrameError> {
        let value: Value = serde_json::from_str(raw)?;

        if let Some(code) = value.get("code").and_then(Value::as_i64)
            && code != SUCCESS_CODE
        {
            let message = value
                .get("msg")
                .and_then(Value::as_str)
                .unwrap_or("server error")
                .to_string();
            return Ok(Self::ServerError { code, message });
        }

        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or(FrameError::MissingType)?;
        let time = value.get("time").and_then(Value::as_i64);

        match kind {
            "00" => {
                let from_account = required_str(&value, "from_account")?;
                let content = required_str(&value, "content")?;
                let message_id = value
                    .get("message_id")
                    .and_then(Value::as_str)
                    .map(ToString::to_string);
                Ok(Self::ChatText {
                    from_account,
                    content,
                    time,
                    message_id,
                })
            }
            "02" => {
                let account = required_str(&value, "addi")?;
                let content = required_str(&value, "content")?;
                let online = match content.as_str() {
                    "Login" => true,
                    "Logout" => false,
                    other => {
                        return Err(FrameError::InvalidField {
                            field: "content",
                            value: other.to_string(),
                        });
                    }
                };
                Ok(Self::FriendStatus {
                    account,
                    online,
                    time,
                })
            }
            "04" => {
                let accounts = value
                    .get("content")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .split(',')
                    .map(str::trim)
                    .filter(|account| !account.is_empty())
                    .map(ToString::to_string)
                    .collect();
                Ok(Self::OnlineRoster { accounts, time })
            }
            other => Err(FrameError::UnknownType(other.to_string())),
        }
    }
}

fn required_str(value: &Value, field: &'static str) -> Result<String, FrameError> {
    value
        .get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .ok_or(FrameError::MissingField(field))
}
