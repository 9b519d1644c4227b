#![forbid(unsafe_code)]
//! Dual-mode issue storage: a seeded in-memory store for demo mode and a
//! row-store backed implementation for persistent mode, behind one trait.

use async_trait::async_trait;
use civiclens_model::{Comment, Issue, ResolveChoice, ResolveOutcome, Stats, UpvoteOutcome};
use std::fmt::{Display, Formatter};

mod classify;
mod facade;
mod fake_table;
mod memory;
mod table;

pub use classify::{Classification, DisabledClassifier, GeminiClassifier, IssueClassifier};
pub use facade::{DemoMode, StoreFacade};
pub use fake_table::FakeTableClient;
pub use memory::MemoryStore;
pub use table::{RestTableClient, TableClient, TableError, TableErrorKind, TableStore};

pub const CRATE_NAME: &str = "civiclens-store";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum StoreErrorCode {
    NotFound,
    InvalidArgument,
    Conflict,
    Unavailable,
    Internal,
}

impl StoreErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::InvalidArgument => "invalid_argument",
            Self::Conflict => "conflict",
            Self::Unavailable => "unavailable",
            Self::Internal => "internal_error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreError {
    pub code: StoreErrorCode,
    pub message: String,
}

impl StoreError {
    #[must_use]
    pub fn new(code: StoreErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn issue_not_found(issue_id: &str) -> Self {
        Self::new(StoreErrorCode::NotFound, format!("issue {issue_id} not found"))
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for StoreError {}

/// One issue store. Both the demo and the persistent backend satisfy it,
/// so the HTTP layer never branches on the active mode.
///
/// `status` and `category` are raw equality filters. Sorting and limits
/// stay out of the trait; callers apply them on the returned snapshot.
#[async_trait]
pub trait IssueStore: Send + Sync {
    async fn list_issues(
        &self,
        status: Option<&str>,
        category: Option<&str>,
    ) -> Result<Vec<Issue>, StoreError>;

    async fn get_issue(&self, issue_id: &str) -> Result<Issue, StoreError>;

    async fn insert_issue(&self, issue: Issue) -> Result<Issue, StoreError>;

    /// Records an upvote for `(issue_id, session_hash)`. A repeat vote is
    /// not an error; it reports the current count with `duplicate` set.
    async fn cast_upvote(
        &self,
        issue_id: &str,
        session_hash: &str,
    ) -> Result<UpvoteOutcome, StoreError>;

    /// Records a resolution opinion. A session gets exactly one opinion
    /// per issue; later calls report the standing tallies as a duplicate
    /// regardless of the choice they carry.
    async fn cast_resolve_vote(
        &self,
        issue_id: &str,
        session_hash: &str,
        choice: ResolveChoice,
    ) -> Result<ResolveOutcome, StoreError>;

    /// Comments for one issue, newest first.
    async fn list_comments(&self, issue_id: &str) -> Result<Vec<Comment>, StoreError>;

    async fn insert_comment(
        &self,
        comment: Comment,
        session_hash: &str,
    ) -> Result<Comment, StoreError>;

    async fn compute_stats(&self) -> Result<Stats, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_render_stable_wire_strings() {
        assert_eq!(StoreErrorCode::NotFound.as_str(), "not_found");
        assert_eq!(StoreErrorCode::InvalidArgument.as_str(), "invalid_argument");
        assert_eq!(StoreErrorCode::Unavailable.as_str(), "unavailable");
        let err = StoreError::issue_not_found("CL-2026-0001");
        assert_eq!(err.code, StoreErrorCode::NotFound);
        assert_eq!(err.to_string(), "not_found: issue CL-2026-0001 not found");
    }
}
