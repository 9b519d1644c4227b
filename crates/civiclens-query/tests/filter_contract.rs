use civiclens_model::{Category, Issue, Severity, Status};
use civiclens_query::{IssueFilters, SortKey, apply_filters};
use proptest::prelude::*;

fn issue(id: u32, upvotes: u64, day: u8, status: Status) -> Issue {
    Issue {
        id: format!("CL-2026-{id:04}"),
        title: "t".into(),
        description: "d".into(),
        category: Category::Other,
        severity: Severity::Medium,
        status,
        location: String::new(),
        coordinates: None,
        photos: Vec::new(),
        upvotes,
        comment_count: 0,
        reporter: "Anonymous".into(),
        is_anonymous: true,
        created_at: format!("2026-02-{day:02}T00:00:00Z"),
        ai_confidence: None,
        ai_category: None,
        severity_score: None,
        severity_text: None,
        resolution_confirmations: 0,
        resolved_at: None,
        resolved_by: None,
    }
}

fn arb_issues() -> impl Strategy<Value = Vec<Issue>> {
    prop::collection::vec(
        (0_u32..10_000, 0_u64..1_000, 1_u8..29, prop_oneof![
            Just(Status::Open),
            Just(Status::InProgress),
            Just(Status::Resolved),
        ]),
        0..40,
    )
    .prop_map(|specs| {
        specs
            .into_iter()
            .map(|(id, upvotes, day, status)| issue(id, upvotes, day, status))
            .collect()
    })
}

proptest! {
    #[test]
    fn upvote_sort_is_non_increasing(issues in arb_issues()) {
        let sorted = apply_filters(issues, &IssueFilters::default());
        prop_assert!(sorted.windows(2).all(|w| w[0].upvotes >= w[1].upvotes));
    }

    #[test]
    fn recent_sort_is_non_increasing_in_created_at(issues in arb_issues()) {
        let filters = IssueFilters { sort: SortKey::Recent, ..IssueFilters::default() };
        let sorted = apply_filters(issues, &filters);
        prop_assert!(sorted.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    }

    #[test]
    fn limit_bounds_the_result(issues in arb_issues(), limit in 1_usize..10) {
        let filters = IssueFilters { limit: Some(limit), ..IssueFilters::default() };
        let total = issues.len();
        let result = apply_filters(issues, &filters);
        prop_assert!(result.len() <= limit);
        prop_assert_eq!(result.len(), total.min(limit));
    }

    #[test]
    fn status_filter_only_keeps_exact_matches(issues in arb_issues()) {
        let filters = IssueFilters { status: Some("open".into()), ..IssueFilters::default() };
        let result = apply_filters(issues, &filters);
        prop_assert!(result.iter().all(|i| i.status == Status::Open));
    }

    #[test]
    fn filtering_never_invents_issues(issues in arb_issues()) {
        let filters = IssueFilters { category: Some("other".into()), ..IssueFilters::default() };
        let before = issues.len();
        let result = apply_filters(issues, &filters);
        prop_assert!(result.len() <= before);
    }
}
