// SPDX-License-Identifier: Apache-2.0

use crate::classify::{Classification, IssueClassifier};
use crate::{IssueStore, StoreError, StoreErrorCode};
use civiclens_core::{now_iso, unix_millis};
use civiclens_model::{
    Category, Comment, CommentDraft, Coordinates, Issue, IssueDraft, Photo, ResolveChoice,
    ResolveOutcome, Severity, Stats, Status, UpvoteOutcome, new_issue_id, round_coordinate,
};
use civiclens_query::{IssueFilters, apply_filters};
use rand::Rng as _;
use std::sync::{Arc, Mutex};
use time::OffsetDateTime;

/// Which backend serves traffic right now.
///
/// The environment supplies a default at startup; the admin surface can
/// override it at runtime without a restart. The override wins until the
/// process exits.
#[derive(Debug)]
pub struct DemoMode {
    env_default: bool,
    runtime_override: Mutex<Option<bool>>,
}

impl DemoMode {
    #[must_use]
    pub fn new(env_default: bool) -> Self {
        Self {
            env_default,
            runtime_override: Mutex::new(None),
        }
    }

    #[must_use]
    pub const fn env_default(&self) -> bool {
        self.env_default
    }

    #[must_use]
    pub fn runtime_override(&self) -> Option<bool> {
        match self.runtime_override.lock() {
            Ok(guard) => *guard,
            Err(_) => None,
        }
    }

    pub fn set_override(&self, enabled: bool) {
        if let Ok(mut guard) = self.runtime_override.lock() {
            *guard = Some(enabled);
        }
    }

    /// True when the demo store should serve traffic.
    #[must_use]
    pub fn resolve(&self) -> bool {
        self.runtime_override().unwrap_or(self.env_default)
    }
}

/// Entry point the HTTP layer talks to. Owns mode selection, intake
/// normalization and classification; everything below it is one of the
/// two [`IssueStore`] implementations.
pub struct StoreFacade {
    mode: DemoMode,
    memory: Arc<dyn IssueStore>,
    table: Option<Arc<dyn IssueStore>>,
    classifier: Arc<dyn IssueClassifier>,
}

impl StoreFacade {
    #[must_use]
    pub fn new(
        mode: DemoMode,
        memory: Arc<dyn IssueStore>,
        table: Option<Arc<dyn IssueStore>>,
        classifier: Arc<dyn IssueClassifier>,
    ) -> Self {
        Self {
            mode,
            memory,
            table,
            classifier,
        }
    }

    #[must_use]
    pub fn demo_mode(&self) -> &DemoMode {
        &self.mode
    }

    #[must_use]
    pub fn persistent_enabled(&self) -> bool {
        self.table.is_some()
    }

    #[must_use]
    pub fn classifier_enabled(&self) -> bool {
        self.classifier.enabled()
    }

    /// Demo mode, or a missing persistent backend, selects the memory
    /// store.
    fn active(&self) -> &Arc<dyn IssueStore> {
        match &self.table {
            Some(table) if !self.mode.resolve() => table,
            _ => &self.memory,
        }
    }

    pub async fn list_issues(&self, filters: &IssueFilters) -> Result<Vec<Issue>, StoreError> {
        let issues = self
            .active()
            .list_issues(filters.status.as_deref(), filters.category.as_deref())
            .await?;
        Ok(apply_filters(issues, filters))
    }

    pub async fn get_issue(&self, issue_id: &str) -> Result<Issue, StoreError> {
        self.active().get_issue(issue_id).await
    }

    /// Normalizes a submission, classifies its first photo when a
    /// classifier is configured, and stores the result.
    pub async fn create_issue(
        &self,
        draft: IssueDraft,
        photos: Vec<Photo>,
    ) -> Result<Issue, StoreError> {
        let title = draft.title.trim().to_string();
        let description = draft.description.trim().to_string();
        if title.is_empty() || description.is_empty() {
            return Err(StoreError::new(
                StoreErrorCode::InvalidArgument,
                "title and description are required",
            ));
        }

        let mut category = Category::normalize(&draft.category);
        let severity = Severity::normalize(&draft.severity);
        let location = match draft.location.trim() {
            "" => "Unknown location".to_string(),
            trimmed => trimmed.to_string(),
        };
        let coordinates = match (draft.lat, draft.lng) {
            (Some(lat), Some(lng)) => Some(Coordinates {
                lat: round_coordinate(lat),
                lng: round_coordinate(lng),
            }),
            _ => None,
        };

        let verdict = match photos.first() {
            Some(photo) if self.classifier.enabled() => {
                let verdict = self.classifier.classify(photo).await;
                category = Category::normalize(&verdict.category);
                verdict
            }
            _ => Classification::fallback(category.as_str()),
        };

        let now = OffsetDateTime::now_utc();
        let suffix = rand::rng().random_range(1..=9999);
        let issue = Issue {
            id: new_issue_id(now.year(), suffix),
            title,
            description,
            category,
            severity,
            status: Status::Open,
            location,
            coordinates,
            photos: Vec::new(),
            upvotes: 0,
            comment_count: 0,
            reporter: reporter_name(draft.is_anonymous),
            is_anonymous: draft.is_anonymous,
            created_at: now_iso(),
            ai_confidence: Some((verdict.confidence * 100.0) as i64),
            ai_category: Some(verdict.category),
            severity_score: Some(verdict.severity_score),
            severity_text: Some(verdict.severity_text),
            resolution_confirmations: 0,
            resolved_at: None,
            resolved_by: None,
        };
        self.active().insert_issue(issue).await
    }

    pub async fn upvote(
        &self,
        issue_id: &str,
        session_hash: &str,
    ) -> Result<UpvoteOutcome, StoreError> {
        self.active().cast_upvote(issue_id, session_hash).await
    }

    pub async fn resolve_vote(
        &self,
        issue_id: &str,
        session_hash: &str,
        choice: ResolveChoice,
    ) -> Result<ResolveOutcome, StoreError> {
        self.active()
            .cast_resolve_vote(issue_id, session_hash, choice)
            .await
    }

    pub async fn list_comments(&self, issue_id: &str) -> Result<Vec<Comment>, StoreError> {
        self.active().list_comments(issue_id).await
    }

    pub async fn create_comment(
        &self,
        issue_id: &str,
        draft: CommentDraft,
        session_hash: &str,
    ) -> Result<Comment, StoreError> {
        let text = draft.text.trim().to_string();
        if text.is_empty() {
            return Err(StoreError::new(
                StoreErrorCode::InvalidArgument,
                "text is required",
            ));
        }
        let now = OffsetDateTime::now_utc();
        let comment = Comment {
            id: format!("c-{}", unix_millis(now)),
            issue_id: issue_id.to_string(),
            text,
            author: reporter_name(draft.anonymous),
            is_anonymous: draft.anonymous,
            created_at: now_iso(),
        };
        self.active().insert_comment(comment, session_hash).await
    }

    pub async fn stats(&self) -> Result<Stats, StoreError> {
        self.active().compute_stats().await
    }
}

fn reporter_name(anonymous: bool) -> String {
    if anonymous { "Anonymous" } else { "Citizen" }.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_wins_over_env_default() {
        let mode = DemoMode::new(false);
        assert!(!mode.resolve());
        assert_eq!(mode.runtime_override(), None);

        mode.set_override(true);
        assert!(mode.resolve());
        assert_eq!(mode.runtime_override(), Some(true));
        assert!(!mode.env_default());

        mode.set_override(false);
        assert!(!mode.resolve());
    }
}
