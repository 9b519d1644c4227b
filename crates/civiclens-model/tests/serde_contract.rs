//! Wire-shape contract: the frontend consumes these exact camelCase keys.

use civiclens_model::{
    Category, ResolveOutcome, Stats, Status, UpvoteOutcome, mock_issues, national_hotlines,
};
use serde_json::json;

#[test]
fn issue_serializes_with_camel_case_keys() {
    let issue = &mock_issues()[0];
    let value = serde_json::to_value(issue).expect("serialize issue");
    for key in [
        "id",
        "title",
        "description",
        "category",
        "severity",
        "status",
        "location",
        "coordinates",
        "photos",
        "upvotes",
        "commentCount",
        "reporter",
        "isAnonymous",
        "createdAt",
        "aiConfidence",
        "aiCategory",
        "severityScore",
        "severityText",
        "resolutionConfirmations",
    ] {
        assert!(value.get(key).is_some(), "missing key {key}");
    }
    assert_eq!(value["category"], "potholes");
    assert_eq!(value["coordinates"]["lat"], 6.9147);
}

#[test]
fn enum_wire_values_match_the_storage_check_constraints() {
    assert_eq!(json!(Category::StreetLights), json!("streetLights"));
    assert_eq!(json!(Category::WaterSupply), json!("waterSupply"));
    assert_eq!(json!(Status::InProgress), json!("in-progress"));
    assert_eq!(
        serde_json::from_value::<Status>(json!("in-progress")).expect("status"),
        Status::InProgress
    );
}

#[test]
fn vote_outcomes_expose_issue_id_in_camel_case() {
    let upvote = UpvoteOutcome {
        issue_id: "CL-2026-0001".into(),
        upvotes: 5,
        duplicate: true,
    };
    let value = serde_json::to_value(&upvote).expect("serialize");
    assert_eq!(value["issueId"], "CL-2026-0001");
    assert_eq!(value["duplicate"], true);

    let resolve = ResolveOutcome {
        issue_id: "CL-2026-0001".into(),
        yes: 2,
        no: 1,
        total: 3,
        duplicate: false,
    };
    let value = serde_json::to_value(&resolve).expect("serialize");
    assert_eq!(value["yes"], 2);
    assert_eq!(value["total"], 3);
}

#[test]
fn stats_and_reference_data_shapes() {
    let stats = Stats {
        total_reports: 13,
        active_issues: 10,
        resolved_this_week: 3,
        top_category: Category::Garbage,
    };
    let value = serde_json::to_value(&stats).expect("serialize");
    assert_eq!(value["totalReports"], 13);
    assert_eq!(value["resolvedThisWeek"], 3);
    assert_eq!(value["topCategory"], "garbage");

    let hotlines = serde_json::to_value(national_hotlines()).expect("serialize");
    assert_eq!(hotlines[0]["name"], "Police");
    assert_eq!(hotlines[0]["number"], "119");
}
