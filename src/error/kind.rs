//! Machine-readable error kinds.
//!
//! These are stable and used both for programmatic matching in tests and for
//! the `--json` error payload of the binary.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::HarnessError;

/// Coarse error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Archive or binary missing (exit code 2)
    NotFound,
    /// Archive cannot be opened or streamed (exit code 3)
    Corrupt,
    /// Context or destination directory unexpectedly exists (exit code 4)
    Collision,
    /// Null or closed handle passed to the expectation layer (exit code 5)
    InvalidExpectation,
    /// Malformed pattern (exit code 5)
    Regex,
    /// Non-zero exit, launch failure, or closed handle (exit code 6)
    ProcessFailure,
    /// Create/remove/permission failures (exit code 7)
    Filesystem,
    /// Configuration or version selector problems (exit code 8)
    Config,
    /// Anything else (exit code 1)
    Internal,
}

impl ErrorKind {
    /// Get the string representation for JSON output.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::Corrupt => "CORRUPT",
            Self::Collision => "COLLISION",
            Self::InvalidExpectation => "INVALID_EXPECTATION",
            Self::Regex => "REGEX",
            Self::ProcessFailure => "PROCESS_FAILURE",
            Self::Filesystem => "FILESYSTEM",
            Self::Config => "CONFIG",
            Self::Internal => "INTERNAL",
        }
    }

    /// Process exit code used by `anwork-harness` for this kind.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Internal => 1,
            Self::NotFound => 2,
            Self::Corrupt => 3,
            Self::Collision => 4,
            Self::InvalidExpectation | Self::Regex => 5,
            Self::ProcessFailure => 6,
            Self::Filesystem => 7,
            Self::Config => 8,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl HarnessError {
    /// Structured JSON payload for `--json` error output.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut payload = json!({
            "error": {
                "kind": self.kind().as_str(),
                "message": self.to_string(),
            }
        });
        if let Some(hint) = self.suggestion() {
            payload["error"]["hint"] = json!(hint);
        }
        if let Self::ProcessFailure { stdout, stderr, .. } = self {
            payload["error"]["stdout"] = json!(stdout);
            payload["error"]["stderr"] = json!(stderr);
        }
        payload
    }

    /// Multi-line rendering for terminal error output.
    #[must_use]
    pub fn to_human(&self) -> String {
        let mut text = format!("Error [{}]: {self}", self.kind());
        if let Self::ProcessFailure { stderr, .. } = self {
            if !stderr.trim().is_empty() {
                text.push_str("\nstderr:\n");
                text.push_str(stderr.trim_end());
            }
        }
        if let Some(hint) = self.suggestion() {
            text.push_str("\nHint: ");
            text.push_str(hint);
        }
        text
    }
}
