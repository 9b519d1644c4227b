#![forbid(unsafe_code)]
//! Pure filtering, sorting and aggregation over issue collections.
//! Works on owned snapshots; never touches a store.

use civiclens_model::{Category, Issue, Stats, Status};
use serde::{Deserialize, Serialize};

pub const CRATE_NAME: &str = "civiclens-query";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Recent,
    #[default]
    Upvotes,
}

impl SortKey {
    /// Anything other than the literal `recent` selects the default
    /// upvote ordering.
    #[must_use]
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("recent") => Self::Recent,
            _ => Self::Upvotes,
        }
    }
}

/// Listing parameters. Status and category stay raw strings: an unknown
/// value filters everything out (exact-match equality), it is not an
/// error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueFilters {
    pub status: Option<String>,
    pub category: Option<String>,
    pub sort: SortKey,
    pub limit: Option<usize>,
}

/// Accepts only positive integers; anything else is silently ignored.
#[must_use]
pub fn parse_limit(raw: Option<&str>) -> Option<usize> {
    raw.and_then(|v| v.parse::<usize>().ok()).filter(|n| *n > 0)
}

/// Filter, then totally order, then truncate.
///
/// `recent` compares the fixed-width creation timestamps
/// lexicographically; `upvotes` compares counts. Both descending. Ties
/// keep their relative input order (`sort_by` is stable).
#[must_use]
pub fn apply_filters(issues: Vec<Issue>, filters: &IssueFilters) -> Vec<Issue> {
    let mut filtered: Vec<Issue> = issues
        .into_iter()
        .filter(|issue| {
            filters
                .status
                .as_deref()
                .is_none_or(|s| issue.status.as_str() == s)
                && filters
                    .category
                    .as_deref()
                    .is_none_or(|c| issue.category.as_str() == c)
        })
        .collect();

    match filters.sort {
        SortKey::Recent => filtered.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortKey::Upvotes => filtered.sort_by(|a, b| b.upvotes.cmp(&a.upvotes)),
    }

    if let Some(limit) = filters.limit {
        filtered.truncate(limit);
    }
    filtered
}

/// Most frequent category across the collection. Ties resolve to the
/// category encountered first, a display heuristic only.
#[must_use]
pub fn top_category(issues: &[Issue]) -> Category {
    let mut counts: Vec<(Category, u64)> = Vec::new();
    for issue in issues {
        match counts.iter_mut().find(|(c, _)| *c == issue.category) {
            Some((_, n)) => *n += 1,
            None => counts.push((issue.category, 1)),
        }
    }
    let mut best = (Category::Other, 0_u64);
    for (category, count) in counts {
        if count > best.1 {
            best = (category, count);
        }
    }
    best.0
}

/// Shared part of the stats endpoint. `resolved_this_week` differs per
/// store (rolling window vs. whole resolved seed set), so the store
/// supplies it.
#[must_use]
pub fn aggregate_stats(issues: &[Issue], resolved_this_week: u64) -> Stats {
    let active_issues = issues
        .iter()
        .filter(|i| i.status != Status::Resolved)
        .count() as u64;
    Stats {
        total_reports: issues.len() as u64,
        active_issues,
        resolved_this_week,
        top_category: top_category(issues),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use civiclens_model::{mock_issues, mock_resolved_issues};

    fn all_issues() -> Vec<Issue> {
        let mut issues = mock_issues();
        issues.extend(mock_resolved_issues());
        issues
    }

    #[test]
    fn default_sort_is_upvotes_descending() {
        let sorted = apply_filters(all_issues(), &IssueFilters::default());
        assert!(sorted.windows(2).all(|w| w[0].upvotes >= w[1].upvotes));
        assert_eq!(sorted[0].id, "CL-2024-007");
    }

    #[test]
    fn recent_sort_is_created_at_descending() {
        let filters = IssueFilters {
            sort: SortKey::Recent,
            ..IssueFilters::default()
        };
        let sorted = apply_filters(all_issues(), &filters);
        assert!(sorted.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    }

    #[test]
    fn status_and_category_are_exact_match() {
        let filters = IssueFilters {
            status: Some("open".into()),
            category: Some("garbage".into()),
            ..IssueFilters::default()
        };
        let result = apply_filters(all_issues(), &filters);
        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|i| i.category == Category::Garbage));

        let unknown = IssueFilters {
            status: Some("abandoned".into()),
            ..IssueFilters::default()
        };
        assert!(apply_filters(all_issues(), &unknown).is_empty());
    }

    #[test]
    fn limit_truncates_after_sorting() {
        let filters = IssueFilters {
            limit: Some(3),
            ..IssueFilters::default()
        };
        let result = apply_filters(all_issues(), &filters);
        assert_eq!(result.len(), 3);
        assert_eq!(result[0].id, "CL-2024-007");
    }

    #[test]
    fn limit_parsing_ignores_junk_and_non_positive_values() {
        assert_eq!(parse_limit(Some("5")), Some(5));
        assert_eq!(parse_limit(Some("0")), None);
        assert_eq!(parse_limit(Some("-3")), None);
        assert_eq!(parse_limit(Some("many")), None);
        assert_eq!(parse_limit(None), None);
    }

    #[test]
    fn top_category_prefers_first_encountered_on_ties() {
        let issues = all_issues();
        // Seeds hold 3 streetLights and 3 garbage reports; streetLights
        // is encountered first in the collection.
        assert_eq!(top_category(&issues), Category::StreetLights);
        assert_eq!(top_category(&[]), Category::Other);
    }

    #[test]
    fn aggregate_stats_counts_active_and_total() {
        let issues = all_issues();
        let stats = aggregate_stats(&issues, 3);
        assert_eq!(stats.total_reports, 13);
        assert_eq!(stats.active_issues, 10);
        assert_eq!(stats.resolved_this_week, 3);
    }
}
