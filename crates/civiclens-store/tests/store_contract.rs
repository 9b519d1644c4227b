//! Behavioral contract shared by both store implementations. Every case
//! runs against the seeded memory store and against the persistent store
//! over the in-process table client.

use async_trait::async_trait;
use civiclens_model::{
    Category, Comment, Issue, ResolveChoice, Severity, Status, comment_row, issue_row,
    mock_comments, mock_issues, mock_resolved_issues,
};
use civiclens_store::{
    FakeTableClient, IssueStore, MemoryStore, StoreErrorCode, TableClient, TableError, TableStore,
};
use serde_json::{Value, json};
use std::sync::Arc;

fn full_row(issue: &Issue) -> serde_json::Value {
    let mut row = issue_row(issue);
    if let Some(at) = &issue.resolved_at {
        row["resolved_at"] = json!(at);
    }
    if let Some(by) = issue.resolved_by {
        row["resolved_by"] = json!(by.as_str());
    }
    row
}

async fn seeded_table_store() -> TableStore {
    let client = FakeTableClient::new();
    let issue_rows: Vec<serde_json::Value> = mock_issues()
        .iter()
        .chain(mock_resolved_issues().iter())
        .map(full_row)
        .collect();
    client.seed("issues", issue_rows).await;
    let comment_rows: Vec<serde_json::Value> = mock_comments()
        .iter()
        .map(|c| comment_row(c, "seed-session"))
        .collect();
    client.seed("comments", comment_rows).await;
    TableStore::new(Arc::new(client))
}

fn fresh_issue(id: &str, created_at: &str) -> Issue {
    Issue {
        id: id.to_string(),
        title: "Broken bollard".to_string(),
        description: "Bollard knocked over at the junction.".to_string(),
        category: Category::Other,
        severity: Severity::Medium,
        status: Status::Open,
        location: "Test junction".to_string(),
        coordinates: None,
        photos: Vec::new(),
        upvotes: 0,
        comment_count: 0,
        reporter: "Anonymous".to_string(),
        is_anonymous: true,
        created_at: created_at.to_string(),
        ai_confidence: Some(50),
        ai_category: Some("other".to_string()),
        severity_score: Some(5),
        severity_text: Some("Severity appears moderate based on visible evidence.".to_string()),
        resolution_confirmations: 0,
        resolved_at: None,
        resolved_by: None,
    }
}

fn comment(id: &str, issue_id: &str, created_at: &str) -> Comment {
    Comment {
        id: id.to_string(),
        issue_id: issue_id.to_string(),
        text: "Saw it too.".to_string(),
        author: "Anonymous".to_string(),
        is_anonymous: true,
        created_at: created_at.to_string(),
    }
}

async fn check_upvote_idempotence(store: &dyn IssueStore) {
    let issue = fresh_issue("CL-2026-7001", "2026-08-20T09:00:00Z");
    store.insert_issue(issue).await.expect("insert");

    let first = store
        .cast_upvote("CL-2026-7001", "hash-a")
        .await
        .expect("first vote");
    assert_eq!(first.upvotes, 1);
    assert!(!first.duplicate);

    let repeat = store
        .cast_upvote("CL-2026-7001", "hash-a")
        .await
        .expect("repeat vote");
    assert_eq!(repeat.upvotes, 1);
    assert!(repeat.duplicate);

    let second = store
        .cast_upvote("CL-2026-7001", "hash-b")
        .await
        .expect("second session");
    assert_eq!(second.upvotes, 2);
    assert!(!second.duplicate);

    let stored = store.get_issue("CL-2026-7001").await.expect("get");
    assert_eq!(stored.upvotes, 2);
}

async fn check_resolve_vote_is_single_opinion(store: &dyn IssueStore) {
    let issue = fresh_issue("CL-2026-7002", "2026-08-20T09:00:00Z");
    store.insert_issue(issue).await.expect("insert");

    let first = store
        .cast_resolve_vote("CL-2026-7002", "hash-a", ResolveChoice::Yes)
        .await
        .expect("first opinion");
    assert_eq!((first.yes, first.no, first.total), (1, 0, 1));
    assert!(!first.duplicate);

    // A changed mind does not count; the first opinion stands.
    let flip = store
        .cast_resolve_vote("CL-2026-7002", "hash-a", ResolveChoice::No)
        .await
        .expect("flip attempt");
    assert_eq!((flip.yes, flip.no, flip.total), (1, 0, 1));
    assert!(flip.duplicate);

    let second = store
        .cast_resolve_vote("CL-2026-7002", "hash-b", ResolveChoice::No)
        .await
        .expect("second session");
    assert_eq!((second.yes, second.no, second.total), (1, 1, 2));
    assert!(!second.duplicate);

    let stored = store.get_issue("CL-2026-7002").await.expect("get");
    assert_eq!(stored.resolution_confirmations, 1);
}

async fn check_comment_flow(store: &dyn IssueStore) {
    let issue = fresh_issue("CL-2026-7003", "2026-08-20T09:00:00Z");
    store.insert_issue(issue).await.expect("insert");

    store
        .insert_comment(
            comment("c-100", "CL-2026-7003", "2026-08-20T10:00:00Z"),
            "hash-a",
        )
        .await
        .expect("older comment");
    store
        .insert_comment(
            comment("c-200", "CL-2026-7003", "2026-08-20T11:00:00Z"),
            "hash-b",
        )
        .await
        .expect("newer comment");

    let comments = store.list_comments("CL-2026-7003").await.expect("list");
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0].id, "c-200");
    assert_eq!(comments[1].id, "c-100");

    let stored = store.get_issue("CL-2026-7003").await.expect("get");
    assert_eq!(stored.comment_count, 2);

    let none = store.list_comments("CL-0000-0000").await.expect("unknown");
    assert!(none.is_empty());
}

async fn check_missing_issue_is_not_found(store: &dyn IssueStore) {
    let get = store.get_issue("CL-0000-0000").await;
    assert_eq!(get.expect_err("get").code, StoreErrorCode::NotFound);

    let upvote = store.cast_upvote("CL-0000-0000", "hash-a").await;
    assert_eq!(upvote.expect_err("upvote").code, StoreErrorCode::NotFound);

    let resolve = store
        .cast_resolve_vote("CL-0000-0000", "hash-a", ResolveChoice::Yes)
        .await;
    assert_eq!(resolve.expect_err("resolve").code, StoreErrorCode::NotFound);

    let orphan = store
        .insert_comment(comment("c-300", "CL-0000-0000", "2026-08-20T10:00:00Z"), "hash-a")
        .await;
    assert_eq!(orphan.expect_err("comment").code, StoreErrorCode::NotFound);
}

async fn check_equality_filters(store: &dyn IssueStore) {
    let all = store.list_issues(None, None).await.expect("all");
    assert_eq!(all.len(), 13);

    let open_garbage = store
        .list_issues(Some("open"), Some("garbage"))
        .await
        .expect("filtered");
    assert_eq!(open_garbage.len(), 2);
    assert!(open_garbage
        .iter()
        .all(|i| i.status == Status::Open && i.category == Category::Garbage));

    let unknown = store
        .list_issues(Some("abandoned"), None)
        .await
        .expect("unknown status");
    assert!(unknown.is_empty());
}

/// Client that never sees a prior vote in the already-voted pre-check.
/// With the vote row seeded underneath, the insert hits the uniqueness
/// constraint the way a second racing request would.
struct StaleCountClient {
    inner: FakeTableClient,
}

#[async_trait]
impl TableClient for StaleCountClient {
    async fn select(
        &self,
        table: &str,
        filters: &[(&str, String)],
        order_desc: Option<&str>,
    ) -> Result<Vec<Value>, TableError> {
        self.inner.select(table, filters, order_desc).await
    }

    async fn count(&self, table: &str, filters: &[(&str, String)]) -> Result<u64, TableError> {
        if filters.iter().any(|(col, _)| *col == "session_hash") {
            return Ok(0);
        }
        self.inner.count(table, filters).await
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Vec<Value>, TableError> {
        self.inner.insert(table, row).await
    }

    async fn update(
        &self,
        table: &str,
        filters: &[(&str, String)],
        patch: Value,
    ) -> Result<(), TableError> {
        self.inner.update(table, filters, patch).await
    }
}

async fn racing_store(issue_id: &str) -> StaleCountClient {
    let inner = FakeTableClient::new();
    inner
        .seed(
            "issues",
            vec![issue_row(&fresh_issue(issue_id, "2026-08-20T09:00:00Z"))],
        )
        .await;
    StaleCountClient { inner }
}

#[tokio::test]
async fn table_upvote_losing_the_insert_race_reports_a_duplicate() {
    let client = racing_store("CL-2026-7010").await;
    client
        .inner
        .seed(
            "issue_votes",
            vec![json!({
                "issue_id": "CL-2026-7010",
                "session_hash": "hash-a",
                "vote_type": "upvote",
            })],
        )
        .await;
    let store = TableStore::new(Arc::new(client));

    let outcome = store
        .cast_upvote("CL-2026-7010", "hash-a")
        .await
        .expect("race is not an error");
    assert!(outcome.duplicate);
    assert_eq!(outcome.upvotes, 1);
}

#[tokio::test]
async fn table_resolve_vote_losing_the_insert_race_reports_a_duplicate() {
    let client = racing_store("CL-2026-7011").await;
    client
        .inner
        .seed(
            "resolve_votes",
            vec![json!({
                "issue_id": "CL-2026-7011",
                "session_hash": "hash-a",
                "vote": "yes",
            })],
        )
        .await;
    let store = TableStore::new(Arc::new(client));

    // The racing request carried the opposite choice; the standing vote
    // wins and the tallies come back recomputed from the ledger.
    let outcome = store
        .cast_resolve_vote("CL-2026-7011", "hash-a", ResolveChoice::No)
        .await
        .expect("race is not an error");
    assert!(outcome.duplicate);
    assert_eq!((outcome.yes, outcome.no, outcome.total), (1, 0, 1));
}

#[tokio::test]
async fn memory_upvotes_are_idempotent_per_session() {
    check_upvote_idempotence(&MemoryStore::seeded()).await;
}

#[tokio::test]
async fn table_upvotes_are_idempotent_per_session() {
    check_upvote_idempotence(&seeded_table_store().await).await;
}

#[tokio::test]
async fn memory_resolve_vote_is_single_opinion() {
    check_resolve_vote_is_single_opinion(&MemoryStore::seeded()).await;
}

#[tokio::test]
async fn table_resolve_vote_is_single_opinion() {
    check_resolve_vote_is_single_opinion(&seeded_table_store().await).await;
}

#[tokio::test]
async fn memory_comments_count_and_order() {
    check_comment_flow(&MemoryStore::seeded()).await;
}

#[tokio::test]
async fn table_comments_count_and_order() {
    check_comment_flow(&seeded_table_store().await).await;
}

#[tokio::test]
async fn memory_missing_issue_is_not_found() {
    check_missing_issue_is_not_found(&MemoryStore::seeded()).await;
}

#[tokio::test]
async fn table_missing_issue_is_not_found() {
    check_missing_issue_is_not_found(&seeded_table_store().await).await;
}

#[tokio::test]
async fn memory_listing_applies_equality_filters() {
    check_equality_filters(&MemoryStore::seeded()).await;
}

#[tokio::test]
async fn table_listing_applies_equality_filters() {
    check_equality_filters(&seeded_table_store().await).await;
}

#[tokio::test]
async fn memory_stats_count_the_whole_resolved_seed_set() {
    let store = MemoryStore::seeded();
    let stats = store.compute_stats().await.expect("stats");
    assert_eq!(stats.total_reports, 13);
    assert_eq!(stats.active_issues, 10);
    assert_eq!(stats.resolved_this_week, 3);
}

#[tokio::test]
async fn table_stats_use_a_rolling_week_window() {
    let store = seeded_table_store().await;
    let stats = store.compute_stats().await.expect("stats");
    assert_eq!(stats.total_reports, 13);
    assert_eq!(stats.active_issues, 10);
    // Seeded resolution dates are months old, so none fall in the window.
    assert_eq!(stats.resolved_this_week, 0);
}

#[tokio::test]
async fn memory_resolve_tally_starts_from_the_seeded_confirmations() {
    let store = MemoryStore::seeded();
    let seeded = store.get_issue("CL-2024-R01").await.expect("seeded issue");
    let baseline = seeded.resolution_confirmations;

    let outcome = store
        .cast_resolve_vote("CL-2024-R01", "hash-a", ResolveChoice::Yes)
        .await
        .expect("vote");
    assert_eq!(outcome.yes, baseline + 1);
    assert!(!outcome.duplicate);
}
