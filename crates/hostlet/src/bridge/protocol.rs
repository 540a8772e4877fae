//! Wire protocol types for extension-host communication.
//!
//! One channel (stdin/stdout): the extension sends [`Request`] frames, the
//! host replies with at most one [`Response`] per recognized request.

use serde::{Deserialize, Serialize};

/// The only action this host currently recognizes: launch the bundled server.
pub const ACTION_START: &str = "start";

/// A decoded request from the extension.
///
/// The extension may attach arbitrary extra fields; the host dispatches on
/// `action` alone and carries the rest along untouched. A request with a
/// missing or unrecognized action is dropped without a reply, so a newer
/// extension can probe with commands an older host does not know about.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Request {
    pub fn start() -> Self {
        Self {
            action: Some(ACTION_START.to_string()),
            extra: serde_json::Map::new(),
        }
    }

    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }
}

/// Reply to a recognized request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub success: bool,
    pub message: String,
}

impl Response {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}
