/// Load state definitions for tracking page load progress
///
/// This module defines every stage a single page load can be in.
use std::fmt;

/// Represents the current stage of a page load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadState {
    // ===== Active States =====
    /// Fetching the root document
    FetchingRoot,

    /// Discovering references and rewriting the document
    ParsingAndRewriting,

    /// Creating the sibling resource directory
    CreatingResourceDir,

    /// Downloading the discovered resources
    FetchingResources,

    /// Writing the rewritten document
    WritingHtml,

    // ===== Terminal States =====
    /// The page and its resources are on disk
    Done,

    /// The load stopped with an error
    Failed,
}

impl LoadState {
    /// Returns true if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// The stage that follows this one on the success path
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::FetchingRoot => Some(Self::ParsingAndRewriting),
            Self::ParsingAndRewriting => Some(Self::CreatingResourceDir),
            Self::CreatingResourceDir => Some(Self::FetchingResources),
            Self::FetchingResources => Some(Self::WritingHtml),
            Self::WritingHtml => Some(Self::Done),
            Self::Done | Self::Failed => None,
        }
    }

    /// Returns true if moving from this state to `to` is allowed
    ///
    /// Every active state may advance to its successor or fail. Terminal
    /// states never change.
    pub fn can_transition_to(&self, to: Self) -> bool {
        if self.is_terminal() {
            return false;
        }
        to == Self::Failed || self.next() == Some(to)
    }

    /// Stable lowercase name used in log output
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FetchingRoot => "fetching_root",
            Self::ParsingAndRewriting => "parsing_and_rewriting",
            Self::CreatingResourceDir => "creating_resource_dir",
            Self::FetchingResources => "fetching_resources",
            Self::WritingHtml => "writing_html",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for LoadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
