// The JSON summary of a dashboard, used to check the aggregations against a reference.

use serde::Serialize;
use serde_json::{json, Value as JSValue};
use voter_fraud::{DashboardData, Metrics};

use crate::dashboard::io_common::simplify_file_name;
use crate::dashboard::*;

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
struct SummaryConfig {
    source: String,
    title: String,
}

fn metrics_to_json(m: &Metrics) -> JSValue {
    json!({
        "fraudRate": m.fraud_rate_label(),
        "legitimateVotes": m.legitimate_votes,
        "suspiciousVotes": m.suspicious_votes,
        "totalVotes": m.total_votes,
        "uniqueVoters": m.unique_voters,
    })
}

fn categories_to_json(data: &DashboardData) -> Vec<JSValue> {
    data.categories
        .all()
        .iter()
        .map(|c| {
            let voters: Vec<&str> = c.voters.iter().map(|v| v.as_str()).collect();
            json!({
                "category": c.category.label(),
                "voters": voters,
            })
        })
        .collect()
}

fn pivot_to_json(data: &DashboardData) -> JSValue {
    let fraud_types: Vec<&str> = data.pivot.fraud_types.iter().map(|ft| ft.label()).collect();
    let rows: Vec<JSValue> = data
        .pivot
        .rows
        .iter()
        .map(|(constituency, counts)| {
            json!({
                "constituency": constituency,
                "counts": counts,
            })
        })
        .collect();
    json!({
        "fraudTypes": fraud_types,
        "rows": rows,
    })
}

/// Summarizes everything the dashboard computes from a table.
///
/// The selections are not part of the summary: it only depends on the table.
pub fn build_summary_js(title: &str, table: &LoadedTable) -> JSValue {
    let data = &table.data;
    let c = SummaryConfig {
        source: simplify_file_name(&table.source),
        title: title.to_string(),
    };

    let distribution: Vec<JSValue> = data
        .distribution
        .iter()
        .map(|d| json!({ "count": d.count, "fraudType": d.fraud_type.label() }))
        .collect();
    let constituencies: Vec<JSValue> = data
        .constituency_voters
        .iter()
        .map(|c| {
            json!({
                "constituency": c.constituency,
                "suspiciousVoters": c.suspicious_voters,
            })
        })
        .collect();
    let identity_theft: Vec<JSValue> = data
        .identity_theft
        .iter()
        .map(|c| {
            json!({
                "claimedVoterId": c.claimed_voter_id,
                "constituency": c.constituency,
                "voterId": c.voter_id.as_str(),
            })
        })
        .collect();
    let cross_constituency: Vec<JSValue> = data
        .cross_constituency
        .iter()
        .map(|c| {
            json!({
                "registeredConstituency": c.registered_constituency,
                "voterId": c.voter_id.as_str(),
                "votingConstituency": c.voting_constituency,
            })
        })
        .collect();
    let double_voting: Vec<JSValue> = data
        .double_voting
        .iter()
        .map(|d| {
            json!({
                "constituencies": d.constituencies,
                "numberOfVotes": d.number_of_votes,
                "voterId": d.voter_id.as_str(),
            })
        })
        .collect();

    json!({
        "categories": categories_to_json(data),
        "config": c,
        "constituencies": constituencies,
        "crossConstituency": cross_constituency,
        "distribution": distribution,
        "doubleVoting": double_voting,
        "identityTheft": identity_theft,
        "metrics": metrics_to_json(&data.metrics),
        "pivot": pivot_to_json(data),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use voter_fraud::builder::Builder;

    #[test]
    fn summary_of_small_table() {
        let mut b = Builder::new();
        b.add_vote("1", "A", "A", "legitimate")
            .add_identity_theft("2", "7", "A")
            .add_vote("3", "A", "B", "double_voting")
            .add_vote("3", "A", "A", "double_voting");
        let table = LoadedTable::new("/data/in/votes.csv", b.build());
        let js = build_summary_js("Title", &table);

        assert_eq!(js["config"], json!({"source": "votes.csv", "title": "Title"}));
        assert_eq!(js["metrics"]["fraudRate"], json!("75.0%"));
        assert_eq!(js["metrics"]["uniqueVoters"], json!(3));
        assert_eq!(
            js["categories"][3],
            json!({"category": "All Suspicious Voters", "voters": ["2", "3"]})
        );
        assert_eq!(
            js["doubleVoting"],
            json!([{"constituencies": ["B", "A"], "numberOfVotes": 2, "voterId": "3"}])
        );
        assert_eq!(js["identityTheft"][0]["claimedVoterId"], json!("7"));
        assert_eq!(
            js["pivot"]["fraudTypes"],
            json!(["double_voting", "same_constituency_identity_theft"])
        );
        assert_eq!(
            js["pivot"]["rows"],
            json!([
                {"constituency": "A", "counts": [1, 1]},
                {"constituency": "B", "counts": [1, 0]}
            ])
        );
    }

    #[test]
    fn empty_table_has_null_fraud_rate() {
        let table = LoadedTable::new("votes.csv", vec![]);
        let js = build_summary_js("Title", &table);
        assert_eq!(js["metrics"]["fraudRate"], JSValue::Null);
        assert_eq!(js["metrics"]["totalVotes"], json!(0));
        assert_eq!(js["distribution"], json!([]));
        assert_eq!(js["pivot"], json!({"fraudTypes": [], "rows": []}));
    }
}
