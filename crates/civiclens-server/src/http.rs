// SPDX-License-Identifier: Apache-2.0

use crate::AppState;
use axum::Json;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use civiclens_core::{ANONYMOUS_SESSION_TOKEN, now_iso, session_fingerprint};
use civiclens_model::{
    CommentDraft, IssueDraft, Photo, ResolveChoice, emergency_contacts, mock_comments,
    mock_issues, mock_resolved_issues, national_hotlines,
};
use civiclens_query::{IssueFilters, SortKey, parse_limit};
use civiclens_store::{StoreError, StoreErrorCode};
use serde_json::{Value, json};
use std::collections::HashMap;

fn api_error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

fn store_error_response(err: &StoreError) -> Response {
    let status = match err.code {
        StoreErrorCode::NotFound => StatusCode::NOT_FOUND,
        StoreErrorCode::InvalidArgument => StatusCode::BAD_REQUEST,
        // Store connectivity details carry nothing sensitive, so the
        // cause stays in the body for every server-side failure.
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!(code = err.code.as_str(), message = %err.message, "request failed");
    }
    api_error_response(status, err.message.clone())
}

/// Ledger identity for the calling browser session. Requests without the
/// header all collapse to one shared anonymous fingerprint.
fn request_session_hash(headers: &HeaderMap, state: &AppState) -> String {
    let token = headers
        .get("x-session-id")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(ANONYMOUS_SESSION_TOKEN);
    session_fingerprint(token, &state.config.session_salt)
}

pub async fn health_handler(State(state): State<AppState>) -> Response {
    Json(json!({
        "ok": true,
        "status": "healthy",
        "timestamp": now_iso(),
        "demoMode": state.store.demo_mode().resolve(),
        "persistentBackendEnabled": state.store.persistent_enabled(),
        "classifierEnabled": state.store.classifier_enabled(),
    }))
    .into_response()
}

/// The full seed bundle, for frontends that render without a backend
/// round trip per panel.
pub async fn mock_data_handler() -> Response {
    Json(json!({
        "mockIssues": mock_issues(),
        "mockResolvedIssues": mock_resolved_issues(),
        "mockComments": mock_comments(),
        "emergencyContacts": emergency_contacts(),
        "nationalHotlines": national_hotlines(),
    }))
    .into_response()
}

fn demo_mode_body(state: &AppState) -> Value {
    let mode = state.store.demo_mode();
    json!({
        "demoMode": mode.resolve(),
        "envDefault": mode.env_default(),
        "runtimeOverride": mode.runtime_override(),
    })
}

pub async fn demo_mode_state_handler(State(state): State<AppState>) -> Response {
    Json(demo_mode_body(&state)).into_response()
}

pub async fn demo_mode_override_handler(
    State(state): State<AppState>,
    payload: Option<Json<Value>>,
) -> Response {
    let enabled = payload
        .as_ref()
        .and_then(|Json(body)| body.get("enabled"))
        .and_then(Value::as_bool);
    let Some(enabled) = enabled else {
        return api_error_response(StatusCode::BAD_REQUEST, "Missing 'enabled' boolean");
    };
    state.store.demo_mode().set_override(enabled);
    tracing::info!(enabled, "demo mode override set");
    Json(demo_mode_body(&state)).into_response()
}

fn filters_from(params: &HashMap<String, String>) -> IssueFilters {
    IssueFilters {
        status: params.get("status").cloned(),
        category: params.get("category").cloned(),
        sort: SortKey::parse(params.get("sort").map(String::as_str)),
        limit: parse_limit(params.get("limit").map(String::as_str)),
    }
}

pub async fn list_issues_handler(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    match state.store.list_issues(&filters_from(&params)).await {
        Ok(issues) => Json(issues).into_response(),
        Err(err) => store_error_response(&err),
    }
}

pub async fn get_issue_handler(
    State(state): State<AppState>,
    Path(issue_id): Path<String>,
) -> Response {
    match state.store.get_issue(&issue_id).await {
        Ok(issue) => Json(issue).into_response(),
        Err(err) => store_error_response(&err),
    }
}

pub async fn create_issue_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Response {
    let mut draft = IssueDraft {
        category: "other".to_string(),
        severity: "medium".to_string(),
        is_anonymous: true,
        ..IssueDraft::default()
    };
    let mut photos: Vec<Photo> = Vec::new();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(_) => {
                return api_error_response(StatusCode::BAD_REQUEST, "invalid multipart payload");
            }
        };
        let name = field.name().unwrap_or("").to_string();
        if name == "photos" {
            let mime = field.content_type().unwrap_or("image/jpeg").to_string();
            match field.bytes().await {
                Ok(bytes) => photos.push(Photo {
                    bytes: bytes.to_vec(),
                    mime,
                }),
                Err(_) => {
                    return api_error_response(StatusCode::BAD_REQUEST, "unreadable photo upload");
                }
            }
            continue;
        }
        let Ok(text) = field.text().await else {
            return api_error_response(StatusCode::BAD_REQUEST, "invalid multipart payload");
        };
        match name.as_str() {
            "title" => draft.title = text,
            "description" => draft.description = text,
            "category" => draft.category = text,
            "severity" => draft.severity = text,
            "location" => draft.location = text,
            "isAnonymous" => draft.is_anonymous = text.trim().to_lowercase() == "true",
            "lat" => draft.lat = text.trim().parse().ok(),
            "lng" => draft.lng = text.trim().parse().ok(),
            _ => {}
        }
    }

    match state.store.create_issue(draft, photos).await {
        Ok(issue) => (StatusCode::CREATED, Json(issue)).into_response(),
        Err(err) => store_error_response(&err),
    }
}

pub async fn upvote_handler(
    State(state): State<AppState>,
    Path(issue_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let session = request_session_hash(&headers, &state);
    match state.store.upvote(&issue_id, &session).await {
        Ok(outcome) => Json(outcome).into_response(),
        Err(err) => store_error_response(&err),
    }
}

pub async fn resolve_vote_handler(
    State(state): State<AppState>,
    Path(issue_id): Path<String>,
    headers: HeaderMap,
    payload: Option<Json<Value>>,
) -> Response {
    let choice = payload
        .as_ref()
        .and_then(|Json(body)| body.get("vote"))
        .and_then(Value::as_str)
        .and_then(ResolveChoice::parse);
    let Some(choice) = choice else {
        return api_error_response(StatusCode::BAD_REQUEST, "vote must be 'yes' or 'no'");
    };
    let session = request_session_hash(&headers, &state);
    match state.store.resolve_vote(&issue_id, &session, choice).await {
        Ok(outcome) => Json(outcome).into_response(),
        Err(err) => store_error_response(&err),
    }
}

pub async fn list_comments_handler(
    State(state): State<AppState>,
    Path(issue_id): Path<String>,
) -> Response {
    match state.store.list_comments(&issue_id).await {
        Ok(comments) => Json(comments).into_response(),
        Err(err) => store_error_response(&err),
    }
}

pub async fn create_comment_handler(
    State(state): State<AppState>,
    Path(issue_id): Path<String>,
    headers: HeaderMap,
    payload: Option<Json<Value>>,
) -> Response {
    let draft = match payload.as_ref().map(|Json(body)| body) {
        Some(body) => CommentDraft {
            text: body
                .get("text")
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string(),
            anonymous: body.get("anonymous").and_then(Value::as_bool).unwrap_or(true),
        },
        None => CommentDraft::default(),
    };
    let session = request_session_hash(&headers, &state);
    match state.store.create_comment(&issue_id, draft, &session).await {
        Ok(comment) => (StatusCode::CREATED, Json(comment)).into_response(),
        Err(err) => store_error_response(&err),
    }
}

pub async fn stats_handler(State(state): State<AppState>) -> Response {
    match state.store.stats().await {
        Ok(stats) => Json(stats).into_response(),
        Err(err) => store_error_response(&err),
    }
}

pub async fn contacts_handler() -> Response {
    Json(emergency_contacts()).into_response()
}

pub async fn hotlines_handler() -> Response {
    Json(national_hotlines()).into_response()
}
