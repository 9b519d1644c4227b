// SPDX-License-Identifier: Apache-2.0
//! The single translation boundary between storage rows (snake_case
//! columns) and canonical API entities. Both mapping functions are total:
//! any missing or malformed field takes its documented default instead of
//! failing.

use crate::issue::{
    Category, Comment, Coordinates, Issue, ResolvedBy, Severity, Status,
};
use civiclens_core::now_iso;
use serde_json::{Map, Value, json};

fn str_or<'a>(row: &'a Value, key: &str, default: &'a str) -> &'a str {
    row.get(key).and_then(Value::as_str).unwrap_or(default)
}

fn opt_str(row: &Value, key: &str) -> Option<String> {
    row.get(key)
        .and_then(Value::as_str)
        .map(std::string::ToString::to_string)
}

fn count_or_zero(row: &Value, key: &str) -> u64 {
    match row.get(key) {
        Some(Value::Number(n)) => n.as_u64().or_else(|| {
            // Some backends hand counters back as floats.
            n.as_f64().map(|f| if f > 0.0 { f as u64 } else { 0 })
        }),
        Some(Value::String(s)) => s.parse::<u64>().ok(),
        _ => None,
    }
    .unwrap_or(0)
}

fn opt_int(row: &Value, key: &str) -> Option<i64> {
    match row.get(key) {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Some(Value::String(s)) => s.parse::<i64>().ok(),
        _ => None,
    }
}

fn opt_f64(row: &Value, key: &str) -> Option<f64> {
    row.get(key).and_then(Value::as_f64)
}

fn bool_or(row: &Value, key: &str, default: bool) -> bool {
    row.get(key).and_then(Value::as_bool).unwrap_or(default)
}

/// Maps one `issues` row to its API shape.
///
/// Coordinates collapse to absent unless both `lat` and `lng` are present.
#[must_use]
pub fn to_issue_view(row: &Value) -> Issue {
    let coordinates = match (opt_f64(row, "lat"), opt_f64(row, "lng")) {
        (Some(lat), Some(lng)) => Some(Coordinates { lat, lng }),
        _ => None,
    };

    let photos = row
        .get("photos")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(std::string::ToString::to_string)
                .collect()
        })
        .unwrap_or_default();

    Issue {
        id: str_or(row, "id", "").to_string(),
        title: str_or(row, "title", "").to_string(),
        description: str_or(row, "description", "").to_string(),
        category: Category::parse(str_or(row, "category", "other")).unwrap_or(Category::Other),
        severity: Severity::normalize(str_or(row, "severity", "medium")),
        status: Status::parse(str_or(row, "status", "open")).unwrap_or(Status::Open),
        location: str_or(row, "location", "").to_string(),
        coordinates,
        photos,
        upvotes: count_or_zero(row, "upvotes"),
        comment_count: count_or_zero(row, "comment_count"),
        reporter: str_or(row, "reporter", "Anonymous").to_string(),
        is_anonymous: bool_or(row, "is_anonymous", true),
        created_at: opt_str(row, "created_at").unwrap_or_else(now_iso),
        ai_confidence: opt_int(row, "ai_confidence"),
        ai_category: opt_str(row, "ai_category"),
        severity_score: opt_int(row, "severity_score"),
        severity_text: opt_str(row, "severity_text"),
        resolution_confirmations: count_or_zero(row, "resolution_confirmations"),
        resolved_at: opt_str(row, "resolved_at"),
        resolved_by: opt_str(row, "resolved_by").and_then(|v| ResolvedBy::parse(&v)),
    }
}

/// Maps one `comments` row to its API shape. The stored session hash is a
/// ledger detail and never crosses this boundary.
#[must_use]
pub fn to_comment_view(row: &Value) -> Comment {
    Comment {
        id: str_or(row, "id", "").to_string(),
        issue_id: str_or(row, "issue_id", "").to_string(),
        text: str_or(row, "text", "").to_string(),
        author: str_or(row, "author", "Anonymous").to_string(),
        is_anonymous: bool_or(row, "is_anonymous", true),
        created_at: opt_str(row, "created_at").unwrap_or_else(now_iso),
    }
}

/// Inverse mapping used by the persistent store on insert.
#[must_use]
pub fn issue_row(issue: &Issue) -> Value {
    let mut row = Map::new();
    row.insert("id".into(), json!(issue.id));
    row.insert("title".into(), json!(issue.title));
    row.insert("description".into(), json!(issue.description));
    row.insert("category".into(), json!(issue.category.as_str()));
    row.insert("severity".into(), json!(issue.severity.as_str()));
    row.insert("status".into(), json!(issue.status.as_str()));
    row.insert("location".into(), json!(issue.location));
    row.insert(
        "lat".into(),
        issue.coordinates.as_ref().map_or(Value::Null, |c| json!(c.lat)),
    );
    row.insert(
        "lng".into(),
        issue.coordinates.as_ref().map_or(Value::Null, |c| json!(c.lng)),
    );
    row.insert("photos".into(), json!(issue.photos));
    row.insert("upvotes".into(), json!(issue.upvotes));
    row.insert("comment_count".into(), json!(issue.comment_count));
    row.insert("reporter".into(), json!(issue.reporter));
    row.insert("is_anonymous".into(), json!(issue.is_anonymous));
    row.insert("created_at".into(), json!(issue.created_at));
    row.insert("ai_confidence".into(), json!(issue.ai_confidence));
    row.insert("ai_category".into(), json!(issue.ai_category));
    row.insert("severity_score".into(), json!(issue.severity_score));
    row.insert("severity_text".into(), json!(issue.severity_text));
    row.insert(
        "resolution_confirmations".into(),
        json!(issue.resolution_confirmations),
    );
    Value::Object(row)
}

/// Comment insert row; this is the one place the session fingerprint is
/// persisted, for moderation forensics only.
#[must_use]
pub fn comment_row(comment: &Comment, session_hash: &str) -> Value {
    json!({
        "id": comment.id,
        "issue_id": comment.issue_id,
        "text": comment.text,
        "author": comment.author,
        "is_anonymous": comment.is_anonymous,
        "created_at": comment.created_at,
        "session_hash": session_hash,
    })
}
