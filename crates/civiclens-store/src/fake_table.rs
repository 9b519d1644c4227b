// SPDX-License-Identifier: Apache-2.0

//! In-process [`TableClient`] used by tests and kept in `src/` so
//! downstream crates can run the persistent code path without a network.

use crate::table::{
    COMMENTS_TABLE, ISSUES_TABLE, RESOLVE_VOTES_TABLE, TableClient, TableError, TableErrorKind,
    UPVOTES_TABLE,
};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Unique column sets the real schema enforces. Insert collisions must
/// surface as conflicts here too, or the duplicate-vote path goes dark
/// in tests.
fn unique_columns(table: &str) -> &'static [&'static str] {
    match table {
        ISSUES_TABLE | COMMENTS_TABLE => &["id"],
        UPVOTES_TABLE => &["issue_id", "session_hash", "vote_type"],
        RESOLVE_VOTES_TABLE => &["issue_id", "session_hash"],
        _ => &[],
    }
}

fn field_matches(row: &Value, column: &str, expected: &str) -> bool {
    match row.get(column) {
        Some(Value::String(actual)) => actual == expected,
        Some(other) => other.to_string() == expected,
        None => false,
    }
}

#[derive(Default)]
pub struct FakeTableClient {
    tables: Mutex<HashMap<String, Vec<Value>>>,
}

impl FakeTableClient {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed(&self, table: &str, rows: Vec<Value>) {
        let mut tables = self.tables.lock().await;
        tables.entry(table.to_string()).or_default().extend(rows);
    }
}

#[async_trait]
impl TableClient for FakeTableClient {
    async fn select(
        &self,
        table: &str,
        filters: &[(&str, String)],
        order_desc: Option<&str>,
    ) -> Result<Vec<Value>, TableError> {
        let tables = self.tables.lock().await;
        let mut rows: Vec<Value> = tables
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| filters.iter().all(|(col, val)| field_matches(row, col, val)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        if let Some(column) = order_desc {
            rows.sort_by(|a, b| {
                let left = a.get(column).and_then(Value::as_str).unwrap_or("");
                let right = b.get(column).and_then(Value::as_str).unwrap_or("");
                right.cmp(left)
            });
        }
        Ok(rows)
    }

    async fn count(&self, table: &str, filters: &[(&str, String)]) -> Result<u64, TableError> {
        let tables = self.tables.lock().await;
        let count = tables
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| filters.iter().all(|(col, val)| field_matches(row, col, val)))
                    .count()
            })
            .unwrap_or(0);
        Ok(count as u64)
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Vec<Value>, TableError> {
        let mut tables = self.tables.lock().await;
        let rows = tables.entry(table.to_string()).or_default();
        let unique = unique_columns(table);
        if !unique.is_empty() {
            let collides = rows.iter().any(|existing| {
                unique.iter().all(|col| match row.get(*col) {
                    Some(Value::String(val)) => field_matches(existing, col, val),
                    Some(other) => field_matches(existing, col, &other.to_string()),
                    None => false,
                })
            });
            if collides {
                return Err(TableError::new(
                    TableErrorKind::Conflict,
                    format!("duplicate key on {table}"),
                ));
            }
        }
        rows.push(row.clone());
        Ok(vec![row])
    }

    async fn update(
        &self,
        table: &str,
        filters: &[(&str, String)],
        patch: Value,
    ) -> Result<(), TableError> {
        let mut tables = self.tables.lock().await;
        let Some(rows) = tables.get_mut(table) else {
            return Ok(());
        };
        let Some(patch_map) = patch.as_object() else {
            return Err(TableError::new(
                TableErrorKind::Decode,
                "patch must be a json object",
            ));
        };
        for row in rows
            .iter_mut()
            .filter(|row| filters.iter().all(|(col, val)| field_matches(row, col, val)))
        {
            if let Some(map) = row.as_object_mut() {
                for (key, value) in patch_map {
                    map.insert(key.clone(), value.clone());
                }
            }
        }
        Ok(())
    }
}
