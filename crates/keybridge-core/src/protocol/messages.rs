//! JSON messages exchanged with the remote keyboard-injection service.
//!
//! # Envelope
//!
//! Every frame is a JSON object with an `"event"` field naming the message
//! and, when the message has a payload, a `"data"` field holding it:
//!
//! ```json
//! {"event":"keystroke","data":{"metaKey":false,"altKey":false,"shiftKey":false,
//!   "ctrlKey":false,"key":"a","keyCode":65,"location":null,"id":7}}
//! {"event":"keyRelease"}
//! {"event":"keystroke-received","data":{"success":true,"id":7}}
//! ```
//!
//! Serde's `#[serde(tag = "event", content = "data")]` handles this shape.
//!
//! # Sequence ids on the wire
//!
//! Outbound keystrokes carry the sequence id the client assigned, and the
//! service may echo it in its acknowledgment.  Services that do not echo it
//! still work: acknowledgments without an id are matched in FIFO order (see
//! [`crate::protocol::correlator`]).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::keystroke::KeystrokeMessage;
use crate::protocol::sequence::SequenceId;

/// Errors raised while encoding or decoding a wire frame.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The frame was not valid JSON or did not match any known message.
    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// A keystroke plus the sequence id it is tracked under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeystrokeFrame {
    #[serde(flatten)]
    pub keystroke: KeystrokeMessage,
    /// Omitted from the JSON when the keystroke is untracked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<SequenceId>,
}

/// Messages the client sends to the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum OutboundMessage {
    /// Inject one keystroke.
    #[serde(rename = "keystroke")]
    Keystroke(KeystrokeFrame),

    /// Release every modifier the service currently holds down.
    ///
    /// Sent on key-up of a modifier key; the service models modifier state
    /// itself and needs an explicit release independent of any character.
    #[serde(rename = "keyRelease")]
    KeyRelease,
}

impl OutboundMessage {
    /// Serializes the message to a JSON text frame.
    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Short name used in log lines.
    pub fn event_name(&self) -> &'static str {
        match self {
            OutboundMessage::Keystroke(_) => "keystroke",
            OutboundMessage::KeyRelease => "keyRelease",
        }
    }
}

/// The service's verdict on one keystroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeystrokeAck {
    pub success: bool,
    /// Echo of [`KeystrokeFrame::id`], when the service provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<SequenceId>,
}

/// Messages the service sends to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum InboundMessage {
    /// Exactly one per keystroke sent, in send order.
    #[serde(rename = "keystroke-received")]
    KeystrokeReceived(KeystrokeAck),
}

impl InboundMessage {
    /// Parses a JSON text frame.
    pub fn from_json(text: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
