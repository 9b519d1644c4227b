// SPDX-License-Identifier: Apache-2.0

use crate::{IssueStore, StoreError, StoreErrorCode};
use async_trait::async_trait;
use civiclens_core::parse_iso;
use civiclens_model::{
    Comment, Issue, ResolveChoice, ResolveOutcome, Stats, UpvoteOutcome, comment_row, issue_row,
    to_comment_view, to_issue_view,
};
use civiclens_query::aggregate_stats;
use serde_json::Value;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use time::{Duration, OffsetDateTime};

pub const ISSUES_TABLE: &str = "issues";
pub const COMMENTS_TABLE: &str = "comments";
pub const UPVOTES_TABLE: &str = "issue_votes";
pub const RESOLVE_VOTES_TABLE: &str = "resolve_votes";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableErrorKind {
    /// A uniqueness constraint rejected the row.
    Conflict,
    /// The backend could not be reached or answered with a failure status.
    Transport,
    /// The backend answered with a body we could not interpret.
    Decode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableError {
    pub kind: TableErrorKind,
    pub message: String,
}

impl TableError {
    #[must_use]
    pub fn new(kind: TableErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl Display for TableError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl std::error::Error for TableError {}

/// Minimal row-store surface the persistent backend needs: equality
/// filtered selects, exact counts, inserts and patches. Small enough that
/// tests swap in an in-process fake.
#[async_trait]
pub trait TableClient: Send + Sync {
    async fn select(
        &self,
        table: &str,
        filters: &[(&str, String)],
        order_desc: Option<&str>,
    ) -> Result<Vec<Value>, TableError>;

    async fn count(&self, table: &str, filters: &[(&str, String)]) -> Result<u64, TableError>;

    /// Returns the created rows as the backend represents them.
    async fn insert(&self, table: &str, row: Value) -> Result<Vec<Value>, TableError>;

    async fn update(
        &self,
        table: &str,
        filters: &[(&str, String)],
        patch: Value,
    ) -> Result<(), TableError>;
}

/// PostgREST client. Every call carries the service key as both the
/// `apikey` header and a bearer token.
pub struct RestTableClient {
    base_url: String,
    api_key: String,
    http: reqwest::Client,
}

impl RestTableClient {
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            http: reqwest::Client::new(),
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    fn authed(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    fn eq_params(filters: &[(&str, String)]) -> Vec<(String, String)> {
        filters
            .iter()
            .map(|(col, val)| ((*col).to_string(), format!("eq.{val}")))
            .collect()
    }
}

/// `Content-Range: 0-0/57` carries the exact row count after the slash.
fn content_range_total(header: &str) -> Option<u64> {
    header.split('/').nth(1)?.parse().ok()
}

#[async_trait]
impl TableClient for RestTableClient {
    async fn select(
        &self,
        table: &str,
        filters: &[(&str, String)],
        order_desc: Option<&str>,
    ) -> Result<Vec<Value>, TableError> {
        let mut params = vec![("select".to_string(), "*".to_string())];
        params.extend(Self::eq_params(filters));
        if let Some(column) = order_desc {
            params.push(("order".to_string(), format!("{column}.desc")));
        }
        let response = self
            .authed(self.http.get(self.table_url(table)).query(&params))
            .send()
            .await
            .map_err(|e| TableError::new(TableErrorKind::Transport, e.to_string()))?;
        if !response.status().is_success() {
            let status = response.status();
            tracing::warn!(table, %status, "row store select failed");
            return Err(TableError::new(
                TableErrorKind::Transport,
                format!("select from {table} failed: {status}"),
            ));
        }
        response
            .json::<Vec<Value>>()
            .await
            .map_err(|e| TableError::new(TableErrorKind::Decode, e.to_string()))
    }

    async fn count(&self, table: &str, filters: &[(&str, String)]) -> Result<u64, TableError> {
        let mut params = vec![("select".to_string(), "id".to_string())];
        params.extend(Self::eq_params(filters));
        let response = self
            .authed(self.http.get(self.table_url(table)).query(&params))
            .header("Prefer", "count=exact")
            .header("Range", "0-0")
            .send()
            .await
            .map_err(|e| TableError::new(TableErrorKind::Transport, e.to_string()))?;
        if !response.status().is_success() {
            return Err(TableError::new(
                TableErrorKind::Transport,
                format!("count on {table} failed: {}", response.status()),
            ));
        }
        response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .and_then(content_range_total)
            .ok_or_else(|| {
                TableError::new(
                    TableErrorKind::Decode,
                    format!("count on {table} returned no content-range total"),
                )
            })
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Vec<Value>, TableError> {
        let response = self
            .authed(self.http.post(self.table_url(table)).json(&row))
            .header("Prefer", "return=representation")
            .send()
            .await
            .map_err(|e| TableError::new(TableErrorKind::Transport, e.to_string()))?;
        if response.status() == reqwest::StatusCode::CONFLICT {
            return Err(TableError::new(
                TableErrorKind::Conflict,
                format!("insert into {table} hit a uniqueness constraint"),
            ));
        }
        if !response.status().is_success() {
            let status = response.status();
            tracing::warn!(table, %status, "row store insert failed");
            return Err(TableError::new(
                TableErrorKind::Transport,
                format!("insert into {table} failed: {status}"),
            ));
        }
        response
            .json::<Vec<Value>>()
            .await
            .map_err(|e| TableError::new(TableErrorKind::Decode, e.to_string()))
    }

    async fn update(
        &self,
        table: &str,
        filters: &[(&str, String)],
        patch: Value,
    ) -> Result<(), TableError> {
        let params = Self::eq_params(filters);
        let response = self
            .authed(self.http.patch(self.table_url(table)).query(&params).json(&patch))
            .header("Prefer", "return=minimal")
            .send()
            .await
            .map_err(|e| TableError::new(TableErrorKind::Transport, e.to_string()))?;
        if !response.status().is_success() {
            return Err(TableError::new(
                TableErrorKind::Transport,
                format!("update on {table} failed: {}", response.status()),
            ));
        }
        Ok(())
    }
}

/// Any failed row-store call means the backend is unusable right now;
/// only uniqueness violations carry extra meaning.
fn store_err(err: TableError) -> StoreError {
    let code = match err.kind {
        TableErrorKind::Conflict => StoreErrorCode::Conflict,
        TableErrorKind::Transport | TableErrorKind::Decode => StoreErrorCode::Unavailable,
    };
    StoreError::new(code, err.message)
}

/// Persistent store over a [`TableClient`].
///
/// Counters on the issue row are a denormalized convenience; on every
/// vote and comment they are recomputed from the ledger tables rather
/// than incremented, so a crashed request can never leave them drifted.
pub struct TableStore {
    client: Arc<dyn TableClient>,
}

impl TableStore {
    #[must_use]
    pub fn new(client: Arc<dyn TableClient>) -> Self {
        Self { client }
    }

    async fn require_issue(&self, issue_id: &str) -> Result<Issue, StoreError> {
        let rows = self
            .client
            .select(ISSUES_TABLE, &[("id", issue_id.to_string())], None)
            .await
            .map_err(store_err)?;
        rows.first()
            .map(to_issue_view)
            .ok_or_else(|| StoreError::issue_not_found(issue_id))
    }

    async fn upvote_count(&self, issue_id: &str) -> Result<u64, StoreError> {
        self.client
            .count(
                UPVOTES_TABLE,
                &[
                    ("issue_id", issue_id.to_string()),
                    ("vote_type", "upvote".to_string()),
                ],
            )
            .await
            .map_err(store_err)
    }

    async fn resolve_tallies(&self, issue_id: &str) -> Result<(u64, u64), StoreError> {
        let yes = self
            .client
            .count(
                RESOLVE_VOTES_TABLE,
                &[("issue_id", issue_id.to_string()), ("vote", "yes".to_string())],
            )
            .await
            .map_err(store_err)?;
        let no = self
            .client
            .count(
                RESOLVE_VOTES_TABLE,
                &[("issue_id", issue_id.to_string()), ("vote", "no".to_string())],
            )
            .await
            .map_err(store_err)?;
        Ok((yes, no))
    }
}

#[async_trait]
impl IssueStore for TableStore {
    async fn list_issues(
        &self,
        status: Option<&str>,
        category: Option<&str>,
    ) -> Result<Vec<Issue>, StoreError> {
        let mut filters: Vec<(&str, String)> = Vec::new();
        if let Some(status) = status {
            filters.push(("status", status.to_string()));
        }
        if let Some(category) = category {
            filters.push(("category", category.to_string()));
        }
        let rows = self
            .client
            .select(ISSUES_TABLE, &filters, Some("created_at"))
            .await
            .map_err(store_err)?;
        Ok(rows.iter().map(to_issue_view).collect())
    }

    async fn get_issue(&self, issue_id: &str) -> Result<Issue, StoreError> {
        self.require_issue(issue_id).await
    }

    async fn insert_issue(&self, issue: Issue) -> Result<Issue, StoreError> {
        let created = self
            .client
            .insert(ISSUES_TABLE, issue_row(&issue))
            .await
            .map_err(store_err)?;
        Ok(created.first().map(to_issue_view).unwrap_or(issue))
    }

    async fn cast_upvote(
        &self,
        issue_id: &str,
        session_hash: &str,
    ) -> Result<UpvoteOutcome, StoreError> {
        self.require_issue(issue_id).await?;

        let already = self
            .client
            .count(
                UPVOTES_TABLE,
                &[
                    ("issue_id", issue_id.to_string()),
                    ("session_hash", session_hash.to_string()),
                    ("vote_type", "upvote".to_string()),
                ],
            )
            .await
            .map_err(store_err)?
            > 0;
        if already {
            return Ok(UpvoteOutcome {
                issue_id: issue_id.to_string(),
                upvotes: self.upvote_count(issue_id).await?,
                duplicate: true,
            });
        }

        let inserted = self
            .client
            .insert(
                UPVOTES_TABLE,
                serde_json::json!({
                    "issue_id": issue_id,
                    "session_hash": session_hash,
                    "vote_type": "upvote",
                }),
            )
            .await;
        // A race on the uniqueness constraint is the same vote arriving
        // twice; report it as a duplicate, not a failure.
        let duplicate = match inserted {
            Ok(_) => false,
            Err(err) if err.kind == TableErrorKind::Conflict => true,
            Err(err) => return Err(store_err(err)),
        };

        let upvotes = self.upvote_count(issue_id).await?;
        self.client
            .update(
                ISSUES_TABLE,
                &[("id", issue_id.to_string())],
                serde_json::json!({ "upvotes": upvotes }),
            )
            .await
            .map_err(store_err)?;

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
        self.require_issue(issue_id).await?;

        let already = self
            .client
            .count(
                RESOLVE_VOTES_TABLE,
                &[
                    ("issue_id", issue_id.to_string()),
                    ("session_hash", session_hash.to_string()),
                ],
            )
            .await
            .map_err(store_err)?
            > 0;
        if already {
            let (yes, no) = self.resolve_tallies(issue_id).await?;
            return Ok(ResolveOutcome {
                issue_id: issue_id.to_string(),
                yes,
                no,
                total: yes + no,
                duplicate: true,
            });
        }

        let inserted = self
            .client
            .insert(
                RESOLVE_VOTES_TABLE,
                serde_json::json!({
                    "issue_id": issue_id,
                    "session_hash": session_hash,
                    "vote": choice.as_str(),
                }),
            )
            .await;
        let duplicate = match inserted {
            Ok(_) => false,
            Err(err) if err.kind == TableErrorKind::Conflict => true,
            Err(err) => return Err(store_err(err)),
        };

        let (yes, no) = self.resolve_tallies(issue_id).await?;
        self.client
            .update(
                ISSUES_TABLE,
                &[("id", issue_id.to_string())],
                serde_json::json!({ "resolution_confirmations": yes }),
            )
            .await
            .map_err(store_err)?;

        Ok(ResolveOutcome {
            issue_id: issue_id.to_string(),
            yes,
            no,
            total: yes + no,
            duplicate,
        })
    }

    async fn list_comments(&self, issue_id: &str) -> Result<Vec<Comment>, StoreError> {
        let rows = self
            .client
            .select(
                COMMENTS_TABLE,
                &[("issue_id", issue_id.to_string())],
                Some("created_at"),
            )
            .await
            .map_err(store_err)?;
        Ok(rows.iter().map(to_comment_view).collect())
    }

    async fn insert_comment(
        &self,
        comment: Comment,
        session_hash: &str,
    ) -> Result<Comment, StoreError> {
        self.require_issue(&comment.issue_id).await?;

        let created = self
            .client
            .insert(COMMENTS_TABLE, comment_row(&comment, session_hash))
            .await
            .map_err(store_err)?;

        let count = self
            .client
            .count(COMMENTS_TABLE, &[("issue_id", comment.issue_id.clone())])
            .await
            .map_err(store_err)?;
        self.client
            .update(
                ISSUES_TABLE,
                &[("id", comment.issue_id.clone())],
                serde_json::json!({ "comment_count": count }),
            )
            .await
            .map_err(store_err)?;

        Ok(created.first().map(to_comment_view).unwrap_or(comment))
    }

    async fn compute_stats(&self) -> Result<Stats, StoreError> {
        let rows = self
            .client
            .select(ISSUES_TABLE, &[], None)
            .await
            .map_err(store_err)?;
        let issues: Vec<Issue> = rows.iter().map(to_issue_view).collect();
        let week_ago = OffsetDateTime::now_utc() - Duration::days(7);
        let resolved_this_week = issues
            .iter()
            .filter_map(|issue| issue.resolved_at.as_deref())
            .filter_map(parse_iso)
            .filter(|resolved| *resolved >= week_ago)
            .count() as u64;
        Ok(aggregate_stats(&issues, resolved_this_week))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_range_totals_parse() {
        assert_eq!(content_range_total("0-0/57"), Some(57));
        assert_eq!(content_range_total("*/0"), Some(0));
        assert_eq!(content_range_total("0-9"), None);
        assert_eq!(content_range_total("0-0/many"), None);
    }

    #[test]
    fn every_backend_failure_maps_to_unavailable_except_conflicts() {
        let conflict = store_err(TableError::new(TableErrorKind::Conflict, "dup"));
        assert_eq!(conflict.code, StoreErrorCode::Conflict);

        let transport = store_err(TableError::new(TableErrorKind::Transport, "refused"));
        assert_eq!(transport.code, StoreErrorCode::Unavailable);

        let decode = store_err(TableError::new(TableErrorKind::Decode, "bad body"));
        assert_eq!(decode.code, StoreErrorCode::Unavailable);
        assert_eq!(decode.message, "bad body");
    }
}
