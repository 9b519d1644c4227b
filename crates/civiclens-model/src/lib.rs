#![forbid(unsafe_code)]
//! Canonical CivicLens entities and the storage-row translation boundary.

mod issue;
mod seed;
mod view;

pub use issue::{
    Category, Comment, CommentDraft, Coordinates, EmergencyContact, Hotline, Issue, IssueDraft,
    Photo, ResolveChoice, ResolveOutcome, ResolvedBy, Severity, Stats, Status, UpvoteOutcome,
    new_issue_id, round_coordinate,
};
pub use seed::{
    emergency_contacts, mock_comments, mock_issues, mock_resolved_issues, national_hotlines,
};
pub use view::{comment_row, issue_row, to_comment_view, to_issue_view};

pub const CRATE_NAME: &str = "civiclens-model";
