//! Typed engine errors.
//!
//! `SearchError` covers pre-flight validation and caller contract violations
//! only. In-flight degradations (zero candidates at a node, total pruning at
//! an expansion, an empty result after the primary pass) are handled locally
//! by the liveness ladder and surface in the search report, never as errors.

/// Typed failure for pre-flight validation and caller bugs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// A configuration parameter is out of range.
    InvalidConfig { detail: String },
    /// The selector was called with an empty path set. Caller bug: the
    /// engine guarantees a non-empty set when a legal first move exists.
    EmptyPathSet,
    /// The search produced nothing and no first-level child exists at all.
    /// Only possible when the "at least one legal first move" precondition
    /// was violated by the caller.
    NoFirstMoves,
    /// `finish()` was called before the chunked run reported `Done`.
    SearchStillRunning,
}

impl std::fmt::Display for SearchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidConfig { detail } => write!(f, "invalid search config: {detail}"),
            Self::EmptyPathSet => write!(f, "selector called with an empty path set"),
            Self::NoFirstMoves => {
                write!(f, "no legal first move exists (caller precondition violated)")
            }
            Self::SearchStillRunning => {
                write!(f, "finish() called while chunked search is still running")
            }
        }
    }
}

impl std::error::Error for SearchError {}
