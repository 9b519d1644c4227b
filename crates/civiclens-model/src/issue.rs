// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

/// Report categories accepted by the backend. Unrecognized input
/// normalizes to `Other` rather than failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    Potholes,
    StreetLights,
    Garbage,
    WaterSupply,
    RoadDamage,
    Drainage,
    PublicSafety,
    Other,
}

impl Category {
    pub const ALL: [Self; 8] = [
        Self::Potholes,
        Self::StreetLights,
        Self::Garbage,
        Self::WaterSupply,
        Self::RoadDamage,
        Self::Drainage,
        Self::PublicSafety,
        Self::Other,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Potholes => "potholes",
            Self::StreetLights => "streetLights",
            Self::Garbage => "garbage",
            Self::WaterSupply => "waterSupply",
            Self::RoadDamage => "roadDamage",
            Self::Drainage => "drainage",
            Self::PublicSafety => "publicSafety",
            Self::Other => "other",
        }
    }

    /// Exact match on the canonical wire value.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.as_str() == value)
    }

    /// Loose mapping for caller- and classifier-supplied labels.
    ///
    /// The key set is deliberately odd (mixed-case `roadDamage` and
    /// `publicSafety`, classifier's `tree` mapping to public safety); it
    /// mirrors what the frontend and the vision model actually send.
    #[must_use]
    pub fn normalize(value: &str) -> Self {
        let key: String = value.trim().replace(' ', "");
        match key.as_str() {
            "pothole" | "potholes" => Self::Potholes,
            "streetlight" | "streetlights" => Self::StreetLights,
            "garbage" => Self::Garbage,
            "water" | "watersupply" => Self::WaterSupply,
            "tree" | "publicSafety" => Self::PublicSafety,
            "road" | "roadDamage" => Self::RoadDamage,
            "drainage" => Self::Drainage,
            "other" => Self::Other,
            _ => Self::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    /// Unrecognized input falls back to `Medium`, the report form default.
    #[must_use]
    pub fn normalize(value: &str) -> Self {
        match value.trim() {
            "low" => Self::Low,
            "high" => Self::High,
            "critical" => Self::Critical,
            _ => Self::Medium,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    Open,
    InProgress,
    Resolved,
}

impl Status {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in-progress",
            Self::Resolved => "resolved",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "open" => Some(Self::Open),
            "in-progress" => Some(Self::InProgress),
            "resolved" => Some(Self::Resolved),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolvedBy {
    Community,
    Reporter,
    Official,
}

impl ResolvedBy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Community => "community",
            Self::Reporter => "reporter",
            Self::Official => "official",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "community" => Some(Self::Community),
            "reporter" => Some(Self::Reporter),
            "official" => Some(Self::Official),
            _ => None,
        }
    }
}

/// A resolution opinion. Exactly one per (issue, session), ever.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolveChoice {
    Yes,
    No,
}

impl ResolveChoice {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Yes => "yes",
            Self::No => "no",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "yes" => Some(Self::Yes),
            "no" => Some(Self::No),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Rounds to two decimal places; reports carry deliberately coarse
/// locations so a submission cannot be traced to a doorstep.
#[must_use]
pub fn round_coordinate(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Formats a report identifier. The four-digit suffix is caller-supplied
/// randomness; collisions are possible and not checked here.
#[must_use]
pub fn new_issue_id(year: i32, suffix: u32) -> String {
    format!("CL-{year}-{suffix:04}")
}

/// A citizen-submitted report in its canonical API shape.
///
/// `upvotes`, `comment_count` and `resolution_confirmations` are derived
/// from the vote ledger and comment list; stores must never let them
/// drift from ledger truth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub severity: Severity,
    pub status: Status,
    pub location: String,
    pub coordinates: Option<Coordinates>,
    pub photos: Vec<String>,
    pub upvotes: u64,
    pub comment_count: u64,
    pub reporter: String,
    pub is_anonymous: bool,
    pub created_at: String,
    pub ai_confidence: Option<i64>,
    pub ai_category: Option<String>,
    pub severity_score: Option<i64>,
    pub severity_text: Option<String>,
    pub resolution_confirmations: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_by: Option<ResolvedBy>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub issue_id: String,
    pub text: String,
    pub author: String,
    pub is_anonymous: bool,
    pub created_at: String,
}

/// Caller-supplied fields of a new report, before normalization.
#[derive(Debug, Clone, Default)]
pub struct IssueDraft {
    pub title: String,
    pub description: String,
    pub category: String,
    pub severity: String,
    pub location: String,
    pub is_anonymous: bool,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct CommentDraft {
    pub text: String,
    pub anonymous: bool,
}

#[derive(Debug, Clone)]
pub struct Photo {
    pub bytes: Vec<u8>,
    pub mime: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpvoteOutcome {
    pub issue_id: String,
    pub upvotes: u64,
    pub duplicate: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveOutcome {
    pub issue_id: String,
    pub yes: u64,
    pub no: u64,
    pub total: u64,
    pub duplicate: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_reports: u64,
    pub active_issues: u64,
    pub resolved_this_week: u64,
    pub top_category: Category,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyContact {
    pub id: String,
    pub organization: String,
    pub district: String,
    pub phone: String,
    pub service_type: String,
    pub is_247: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hotline {
    pub name: String,
    pub number: String,
    pub icon: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_normalization_matches_intake_table() {
        assert_eq!(Category::normalize("pothole"), Category::Potholes);
        assert_eq!(Category::normalize(" potholes "), Category::Potholes);
        assert_eq!(Category::normalize("streetlight"), Category::StreetLights);
        assert_eq!(Category::normalize("water"), Category::WaterSupply);
        assert_eq!(Category::normalize("tree"), Category::PublicSafety);
        assert_eq!(Category::normalize("road"), Category::RoadDamage);
        assert_eq!(Category::normalize("roadDamage"), Category::RoadDamage);
        assert_eq!(Category::normalize("publicSafety"), Category::PublicSafety);
        assert_eq!(Category::normalize("graffiti"), Category::Other);
        assert_eq!(Category::normalize(""), Category::Other);
    }

    #[test]
    fn severity_normalization_defaults_to_medium() {
        assert_eq!(Severity::normalize("critical"), Severity::Critical);
        assert_eq!(Severity::normalize("URGENT"), Severity::Medium);
        assert_eq!(Severity::normalize(""), Severity::Medium);
    }

    #[test]
    fn issue_id_suffix_is_zero_padded() {
        assert_eq!(new_issue_id(2026, 7), "CL-2026-0007");
        assert_eq!(new_issue_id(2026, 9999), "CL-2026-9999");
    }

    #[test]
    fn coordinate_rounding_is_two_decimals() {
        assert_eq!(round_coordinate(6.914_712), 6.91);
        assert_eq!(round_coordinate(79.8563), 79.86);
    }
}
