// SPDX-License-Identifier: Apache-2.0

use crate::{IssueStore, StoreError};
use async_trait::async_trait;
use civiclens_model::{
    Comment, Issue, ResolveChoice, ResolveOutcome, Stats, UpvoteOutcome, mock_comments,
    mock_issues, mock_resolved_issues,
};
use civiclens_query::aggregate_stats;
use std::collections::{HashMap, HashSet};
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct MemoryState {
    issues: Vec<Issue>,
    resolved: Vec<Issue>,
    comments: Vec<Comment>,
    upvote_ledger: HashSet<String>,
    resolve_ledger: HashSet<String>,
    resolve_tallies: HashMap<String, (u64, u64)>,
}

impl MemoryState {
    fn find_issue_mut(&mut self, issue_id: &str) -> Option<&mut Issue> {
        self.issues
            .iter_mut()
            .chain(self.resolved.iter_mut())
            .find(|issue| issue.id == issue_id)
    }

    fn find_issue(&self, issue_id: &str) -> Option<&Issue> {
        self.issues
            .iter()
            .chain(self.resolved.iter())
            .find(|issue| issue.id == issue_id)
    }
}

fn ledger_key(issue_id: &str, session_hash: &str) -> String {
    format!("{issue_id}:{session_hash}")
}

/// Seeded demo store. Everything lives behind one async mutex; votes and
/// comments mutate the seeded snapshot and vanish on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    /// Store preloaded with the demo dataset.
    #[must_use]
    pub fn seeded() -> Self {
        Self {
            state: Mutex::new(MemoryState {
                issues: mock_issues(),
                resolved: mock_resolved_issues(),
                comments: mock_comments(),
                ..MemoryState::default()
            }),
        }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IssueStore for MemoryStore {
    async fn list_issues(
        &self,
        status: Option<&str>,
        category: Option<&str>,
    ) -> Result<Vec<Issue>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .issues
            .iter()
            .chain(state.resolved.iter())
            .filter(|issue| {
                status.is_none_or(|s| issue.status.as_str() == s)
                    && category.is_none_or(|c| issue.category.as_str() == c)
            })
            .cloned()
            .collect())
    }

    async fn get_issue(&self, issue_id: &str) -> Result<Issue, StoreError> {
        let state = self.state.lock().await;
        state
            .find_issue(issue_id)
            .cloned()
            .ok_or_else(|| StoreError::issue_not_found(issue_id))
    }

    async fn insert_issue(&self, issue: Issue) -> Result<Issue, StoreError> {
        let mut state = self.state.lock().await;
        // Newest first, so unsorted listings surface fresh reports.
        state.issues.insert(0, issue.clone());
        Ok(issue)
    }

    async fn cast_upvote(
        &self,
        issue_id: &str,
        session_hash: &str,
    ) -> Result<UpvoteOutcome, StoreError> {
        let mut state = self.state.lock().await;
        let key = ledger_key(issue_id, session_hash);
        let duplicate = state.upvote_ledger.contains(&key);
        let issue = state
            .find_issue_mut(issue_id)
            .ok_or_else(|| StoreError::issue_not_found(issue_id))?;
        if !duplicate {
            issue.upvotes += 1;
        }
        let upvotes = issue.upvotes;
        if !duplicate {
            state.upvote_ledger.insert(key);
        }
        Ok(UpvoteOutcome {
            issue_id: issue_id.to_string(),
            upvotes,
            duplicate,
        })
    }

    async fn cast_resolve_vote(
        &self,
        issue_id: &str,
        session_hash: &str,
        choice: ResolveChoice,
    ) -> Result<ResolveOutcome, StoreError> {
        let mut state = self.state.lock().await;
        let seeded_yes = state
            .find_issue(issue_id)
            .ok_or_else(|| StoreError::issue_not_found(issue_id))?
            .resolution_confirmations;

        // Seed votes carry no session, so the tally starts from the
        // seeded confirmation count the first time an issue is voted on.
        let key = ledger_key(issue_id, session_hash);
        let duplicate = state.resolve_ledger.contains(&key);
        let (mut yes, mut no) = *state
            .resolve_tallies
            .entry(issue_id.to_string())
            .or_insert((seeded_yes, 0));

        if !duplicate {
            match choice {
                ResolveChoice::Yes => yes += 1,
                ResolveChoice::No => no += 1,
            }
            state.resolve_tallies.insert(issue_id.to_string(), (yes, no));
            state.resolve_ledger.insert(key);
            if let Some(issue) = state.find_issue_mut(issue_id) {
                issue.resolution_confirmations = yes;
            }
        }

        Ok(ResolveOutcome {
            issue_id: issue_id.to_string(),
            yes,
            no,
            total: yes + no,
            duplicate,
        })
    }

    async fn list_comments(&self, issue_id: &str) -> Result<Vec<Comment>, StoreError> {
        let state = self.state.lock().await;
        let mut comments: Vec<Comment> = state
            .comments
            .iter()
            .filter(|c| c.issue_id == issue_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(comments)
    }

    async fn insert_comment(
        &self,
        comment: Comment,
        _session_hash: &str,
    ) -> Result<Comment, StoreError> {
        let mut state = self.state.lock().await;
        let issue = state
            .find_issue_mut(&comment.issue_id)
            .ok_or_else(|| StoreError::issue_not_found(&comment.issue_id))?;
        issue.comment_count += 1;
        state.comments.insert(0, comment.clone());
        Ok(comment)
    }

    async fn compute_stats(&self) -> Result<Stats, StoreError> {
        let state = self.state.lock().await;
        let all: Vec<Issue> = state
            .issues
            .iter()
            .chain(state.resolved.iter())
            .cloned()
            .collect();
        // The demo dataset has no timestamps inside the current week, so
        // the weekly figure is the whole resolved set.
        Ok(aggregate_stats(&all, state.resolved.len() as u64))
    }
}
