//! Voice tools exposed to the calling agent

mod dispatcher;
pub mod executor;

pub use dispatcher::TalkTools;
pub use executor::{ToolExecutor, ToolSpec};

/// Result of a tool call that did not fail operationally
///
/// Operational failures (API errors, player crashes) are `Err(Error)`;
/// missing user-named things are `NotFound` so the agent can react.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolOutcome {
    /// The operation ran; carries its text result
    Completed(String),
    /// A sample, template, directory or file the caller named does not exist
    NotFound(String),
}

impl ToolOutcome {
    pub fn completed(text: impl Into<String>) -> Self {
        Self::Completed(text.into())
    }

    pub fn not_found(text: impl Into<String>) -> Self {
        Self::NotFound(text.into())
    }

    /// Text returned to the caller
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Completed(text) | Self::NotFound(text) => text,
        }
    }

    #[must_use]
    pub fn into_text(self) -> String {
        match self {
            Self::Completed(text) | Self::NotFound(text) => text,
        }
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
