pub mod builder;
mod config;
pub mod manual;

use log::{debug, info};

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

pub use crate::config::*;

/// The text used in place of a claimed identity that was not recorded.
pub const UNKNOWN_CLAIM: &str = "unknown";

// **** Categorization ****

/// Partitions the voters into the named categories.
///
/// The three fraud categories are defined by an exact match on the fraud type,
/// the last one by the suspicious flag. The two fields are trusted independently:
/// a suspicious record with an unknown fraud type only appears in the last category.
pub fn categorize(records: &[VoteRecord]) -> FraudCategories {
    let entries: Vec<CategoryVoters> = FraudCategory::ALL
        .iter()
        .map(|category| {
            let voters = match category.fraud_type() {
                Some(ft) => unique_voters(records.iter().filter(|r| r.fraud_type == ft)),
                None => unique_voters(records.iter().filter(|r| r.is_suspicious)),
            };
            debug!("categorize: {}: {} voters", category, voters.len());
            CategoryVoters {
                category: *category,
                voters,
            }
        })
        .collect();
    FraudCategories { entries }
}

// Unique identifiers, in the order in which they first appear.
fn unique_voters<'a>(records: impl Iterator<Item = &'a VoteRecord>) -> Vec<VoterId> {
    let mut seen: HashSet<&VoterId> = HashSet::new();
    let mut res: Vec<VoterId> = Vec::new();
    for r in records {
        if seen.insert(&r.voter_id) {
            res.push(r.voter_id.clone());
        }
    }
    res
}

/// All the records cast under this identity, in table order.
pub fn records_for_voter<'a>(records: &'a [VoteRecord], voter: &VoterId) -> Vec<&'a VoteRecord> {
    records.iter().filter(|r| r.voter_id == *voter).collect()
}

// **** Reasons ****

/// A human-readable explanation of the label of a record.
pub fn fraud_reason(record: &VoteRecord) -> String {
    let mut reasons: Vec<String> = Vec::new();
    if record.fraud_type == FraudType::SameConstituencyIdentityTheft {
        reasons.push(format!(
            "Identity theft: Claims to be {}",
            record.claimed_voter_id.as_deref().unwrap_or(UNKNOWN_CLAIM)
        ));
    }
    if record.fraud_type == FraudType::CrossConstituencyVoting {
        reasons.push(format!(
            "Voting in wrong constituency: Registered in {}, voting in {}",
            record.registered_constituency, record.voting_constituency
        ));
    }
    if record.fraud_type == FraudType::DoubleVoting {
        reasons.push("Multiple voting attempts detected".to_string());
    }
    if reasons.is_empty() {
        "Legitimate".to_string()
    } else {
        reasons.join("; ")
    }
}

/// The drill-down table for one voter.
pub fn voter_details(records: &[VoteRecord], voter: &VoterId) -> Vec<DetailRow> {
    records_for_voter(records, voter)
        .into_iter()
        .map(|r| DetailRow {
            image_path: r.image_path.clone(),
            registered_constituency: r.registered_constituency.clone(),
            voting_constituency: r.voting_constituency.clone(),
            claimed_voter_id: r.claimed_voter_id.clone(),
            fraud_type: r.fraud_type.clone(),
            fraud_reason: fraud_reason(r),
        })
        .collect()
}

// **** Aggregations ****

pub fn compute_metrics(records: &[VoteRecord]) -> Metrics {
    let unique: HashSet<&VoterId> = records.iter().map(|r| &r.voter_id).collect();
    Metrics {
        total_votes: records.len() as u64,
        legitimate_votes: records
            .iter()
            .filter(|r| r.fraud_type == FraudType::Legitimate)
            .count() as u64,
        suspicious_votes: records.iter().filter(|r| r.is_suspicious).count() as u64,
        unique_voters: unique.len() as u64,
    }
}

/// Number of records per fraud type, the most frequent first.
pub fn fraud_type_distribution(records: &[VoteRecord]) -> Vec<FraudTypeCount> {
    let mut counts: HashMap<&FraudType, u64> = HashMap::new();
    for r in records {
        *counts.entry(&r.fraud_type).or_insert(0) += 1;
    }
    let mut res: Vec<FraudTypeCount> = counts
        .into_iter()
        .map(|(ft, count)| FraudTypeCount {
            fraud_type: ft.clone(),
            count,
        })
        .collect();
    res.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.fraud_type.label().cmp(b.fraud_type.label()))
    });
    res
}

/// Number of distinct suspicious voters per voting constituency.
pub fn suspicious_voters_by_constituency(records: &[VoteRecord]) -> Vec<ConstituencyVoters> {
    let mut groups: BTreeMap<&str, HashSet<&VoterId>> = BTreeMap::new();
    for r in records.iter().filter(|r| r.is_suspicious) {
        groups
            .entry(r.voting_constituency.as_str())
            .or_default()
            .insert(&r.voter_id);
    }
    groups
        .into_iter()
        .map(|(c, voters)| ConstituencyVoters {
            constituency: c.to_string(),
            suspicious_voters: voters.len() as u64,
        })
        .collect()
}

/// Counts the suspicious records by constituency and fraud type.
///
/// Constituencies and fraud types are both sorted by name. Combinations that
/// do not occur are filled with zero.
pub fn constituency_fraud_pivot(records: &[VoteRecord]) -> ConstituencyPivot {
    let mut counts: HashMap<(&str, &str), u64> = HashMap::new();
    let mut constituencies: BTreeSet<&str> = BTreeSet::new();
    let mut fraud_types: BTreeMap<&str, &FraudType> = BTreeMap::new();
    for r in records.iter().filter(|r| r.is_suspicious) {
        let c = r.voting_constituency.as_str();
        constituencies.insert(c);
        fraud_types.insert(r.fraud_type.label(), &r.fraud_type);
        *counts.entry((c, r.fraud_type.label())).or_insert(0) += 1;
    }

    let rows: Vec<(String, Vec<u64>)> = constituencies
        .iter()
        .map(|c| {
            let cells: Vec<u64> = fraud_types
                .keys()
                .map(|ft| counts.get(&(*c, *ft)).copied().unwrap_or(0))
                .collect();
            (c.to_string(), cells)
        })
        .collect();
    ConstituencyPivot {
        fraud_types: fraud_types.values().map(|ft| (*ft).clone()).collect(),
        rows,
    }
}

pub fn identity_theft_cases(records: &[VoteRecord]) -> Vec<IdentityTheftCase> {
    records
        .iter()
        .filter(|r| r.fraud_type == FraudType::SameConstituencyIdentityTheft)
        .map(|r| IdentityTheftCase {
            voter_id: r.voter_id.clone(),
            claimed_voter_id: r.claimed_voter_id.clone(),
            constituency: r.voting_constituency.clone(),
        })
        .collect()
}

pub fn cross_constituency_cases(records: &[VoteRecord]) -> Vec<CrossConstituencyCase> {
    records
        .iter()
        .filter(|r| r.fraud_type == FraudType::CrossConstituencyVoting)
        .map(|r| CrossConstituencyCase {
            voter_id: r.voter_id.clone(),
            registered_constituency: r.registered_constituency.clone(),
            voting_constituency: r.voting_constituency.clone(),
        })
        .collect()
}

/// For every voter flagged for double voting, the votes cast across the
/// whole table and where they were cast.
pub fn double_voting_summary(records: &[VoteRecord]) -> Vec<DoubleVotingSummary> {
    let voters = unique_voters(
        records
            .iter()
            .filter(|r| r.fraud_type == FraudType::DoubleVoting),
    );
    voters
        .into_iter()
        .map(|voter_id| {
            let votes = records_for_voter(records, &voter_id);
            let mut constituencies: Vec<String> = Vec::new();
            for v in votes.iter() {
                if !constituencies.contains(&v.voting_constituency) {
                    constituencies.push(v.voting_constituency.clone());
                }
            }
            DoubleVotingSummary {
                number_of_votes: votes.len() as u64,
                voter_id,
                constituencies,
            }
        })
        .collect()
}

/// The positions of the records whose suspicious flag disagrees with their fraud type.
pub fn inconsistent_records(records: &[VoteRecord]) -> Vec<usize> {
    records
        .iter()
        .enumerate()
        .filter(|(_, r)| r.is_suspicious != (r.fraud_type != FraudType::Legitimate))
        .map(|(idx, _)| idx)
        .collect()
}

/// Runs all the aggregations that the dashboard displays.
pub fn analyze(records: &[VoteRecord]) -> DashboardData {
    info!("Analyzing {:?} vote records", records.len());
    let metrics = compute_metrics(records);
    info!(
        "total: {} legitimate: {} suspicious: {} unique voters: {}",
        metrics.total_votes, metrics.legitimate_votes, metrics.suspicious_votes, metrics.unique_voters
    );
    DashboardData {
        metrics,
        categories: categorize(records),
        distribution: fraud_type_distribution(records),
        constituency_voters: suspicious_voters_by_constituency(records),
        pivot: constituency_fraud_pivot(records),
        identity_theft: identity_theft_cases(records),
        cross_constituency: cross_constituency_cases(records),
        double_voting: double_voting_summary(records),
    }
}
