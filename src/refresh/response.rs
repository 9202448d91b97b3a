//! Refresh command responses.

use serde::{Deserialize, Serialize};

/// Outcome of a refresh command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshResponse {
    /// 0 on success, -1 on failure.
    pub status: i32,
    pub message: String,
    /// Set when no handler was registered under the identifier.
    #[serde(skip)]
    unknown_identifier: bool,
}

impl RefreshResponse {
    pub const SUCCESS: i32 = 0;
    pub const FAILURE: i32 = -1;

    pub fn success() -> Self {
        Self {
            status: Self::SUCCESS,
            message: "Success".to_string(),
            unknown_identifier: false,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            status: Self::FAILURE,
            message: message.into(),
            unknown_identifier: false,
        }
    }

    pub fn unknown_identifier(identifier: &str) -> Self {
        Self {
            unknown_identifier: true,
            ..Self::failure(format!("Invalid identifier: {}", identifier))
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Self::SUCCESS
    }

    /// Whether the command named no registered handler.
    pub fn is_unknown_identifier(&self) -> bool {
        self.unknown_identifier
    }
}
