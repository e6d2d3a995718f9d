// ── Outcome text ──
//
// Every command answers with human-readable text carrying a marker:
// `✓ ...` on success, `✗ Error: ...` on failure with the cause verbatim.

use std::fmt;

pub const SUCCESS_MARKER: &str = "✓";
pub const FAILURE_MARKER: &str = "✗";

/// The text result of one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub text: String,
    pub is_error: bool,
}

impl Outcome {
    pub fn success(body: impl fmt::Display) -> Self {
        Self {
            text: format!("{SUCCESS_MARKER} {body}"),
            is_error: false,
        }
    }

    pub fn failure(cause: impl fmt::Display) -> Self {
        Self {
            text: format!("{FAILURE_MARKER} Error: {cause}"),
            is_error: true,
        }
    }

    pub fn from_result<E: fmt::Display>(result: Result<String, E>) -> Self {
        match result {
            Ok(body) => Self::success(body),
            Err(e) => Self::failure(e),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
