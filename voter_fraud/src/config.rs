// ********* Input data structures ***********

use std::cmp::Ordering;
use std::error::Error;
use std::fmt::Display;

/// The identifier of a voter.
///
/// Identifiers are compared in natural order: integer identifiers come first and
/// are compared numerically (so that `9` comes before `10`), the other ones
/// follow and are compared as text.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct VoterId(pub String);

impl VoterId {
    pub fn new(s: &str) -> VoterId {
        VoterId(s.to_string())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Ord for VoterId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.0.trim().parse::<i64>(), other.0.trim().parse::<i64>()) {
            // Ties on the numeric value ("7" and "07") fall back to the text.
            (Ok(a), Ok(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Ok(_), Err(_)) => Ordering::Less,
            (Err(_), Ok(_)) => Ordering::Greater,
            (Err(_), Err(_)) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for VoterId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Display for VoterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The label attached upstream to each vote record.
///
/// Unknown labels are preserved as they were read.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub enum FraudType {
    Legitimate,
    SameConstituencyIdentityTheft,
    CrossConstituencyVoting,
    DoubleVoting,
    Other(String),
}

impl FraudType {
    pub fn from_label(s: &str) -> FraudType {
        match s {
            "legitimate" => FraudType::Legitimate,
            "same_constituency_identity_theft" => FraudType::SameConstituencyIdentityTheft,
            "cross_constituency_voting" => FraudType::CrossConstituencyVoting,
            "double_voting" => FraudType::DoubleVoting,
            x => FraudType::Other(x.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            FraudType::Legitimate => "legitimate",
            FraudType::SameConstituencyIdentityTheft => "same_constituency_identity_theft",
            FraudType::CrossConstituencyVoting => "cross_constituency_voting",
            FraudType::DoubleVoting => "double_voting",
            FraudType::Other(s) => s.as_str(),
        }
    }
}

impl Display for FraudType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One row of the uploaded table.
#[derive(PartialEq, Debug, Clone)]
pub struct VoteRecord {
    /// The identity inferred from the biometric match.
    pub voter_id: VoterId,
    /// The identity presented at the polling station. Only meaningful
    /// for identity theft.
    pub claimed_voter_id: Option<String>,
    pub registered_constituency: String,
    pub voting_constituency: String,
    pub image_path: String,
    pub fraud_type: FraudType,
    pub is_suspicious: bool,
    /// Parsed when present, not used by any computation.
    pub facenet_embedding: Option<Embedding>,
}

/// A face embedding as found in the input.
#[derive(PartialEq, Debug, Clone)]
pub enum Embedding {
    Vector(Vec<f64>),
    /// A cell that does not hold a list, kept as it was read.
    Raw(String),
}

// ******** Categories *********

/// The buckets of voters that can be selected for inspection.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum FraudCategory {
    SameConstituencyIdentityTheft,
    CrossConstituencyVoting,
    DoubleVoting,
    AllSuspicious,
}

impl FraudCategory {
    /// All the categories, in display order.
    pub const ALL: [FraudCategory; 4] = [
        FraudCategory::SameConstituencyIdentityTheft,
        FraudCategory::CrossConstituencyVoting,
        FraudCategory::DoubleVoting,
        FraudCategory::AllSuspicious,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FraudCategory::SameConstituencyIdentityTheft => "Same Constituency Identity Theft",
            FraudCategory::CrossConstituencyVoting => "Cross-Constituency Voting",
            FraudCategory::DoubleVoting => "Double Voting",
            FraudCategory::AllSuspicious => "All Suspicious Voters",
        }
    }

    /// The short name used on the command line.
    pub fn key(&self) -> &'static str {
        match self {
            FraudCategory::SameConstituencyIdentityTheft => "identity-theft",
            FraudCategory::CrossConstituencyVoting => "cross-constituency",
            FraudCategory::DoubleVoting => "double-voting",
            FraudCategory::AllSuspicious => "all-suspicious",
        }
    }

    /// Accepts either the short key or the display label.
    pub fn parse(s: &str) -> Option<FraudCategory> {
        FraudCategory::ALL
            .iter()
            .find(|c| c.key() == s || c.label().eq_ignore_ascii_case(s))
            .copied()
    }

    /// The fraud type that defines this category, if any.
    /// The catch-all category is defined by the suspicious flag instead.
    pub fn fraud_type(&self) -> Option<FraudType> {
        match self {
            FraudCategory::SameConstituencyIdentityTheft => {
                Some(FraudType::SameConstituencyIdentityTheft)
            }
            FraudCategory::CrossConstituencyVoting => Some(FraudType::CrossConstituencyVoting),
            FraudCategory::DoubleVoting => Some(FraudType::DoubleVoting),
            FraudCategory::AllSuspicious => None,
        }
    }
}

impl Display for FraudCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CategoryVoters {
    pub category: FraudCategory,
    /// Unique, in order of first appearance in the table.
    pub voters: Vec<VoterId>,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct FraudCategories {
    // Always holds the four categories, in the order of FraudCategory::ALL
    pub(crate) entries: Vec<CategoryVoters>,
}

impl FraudCategories {
    pub fn all(&self) -> &[CategoryVoters] {
        &self.entries
    }

    /// The categories that have at least one voter.
    pub fn active(&self) -> Vec<&CategoryVoters> {
        self.entries.iter().filter(|e| !e.voters.is_empty()).collect()
    }

    pub fn is_active(&self, category: FraudCategory) -> bool {
        !self.voters(category).is_empty()
    }

    pub fn voters(&self, category: FraudCategory) -> &[VoterId] {
        self.entries
            .iter()
            .find(|e| e.category == category)
            .map(|e| e.voters.as_slice())
            .unwrap_or(&[])
    }

    /// The voters of a category, sorted in ascending order for selection.
    pub fn voter_options(&self, category: FraudCategory) -> Vec<VoterId> {
        let mut res = self.voters(category).to_vec();
        res.sort();
        res
    }
}

// ******** Output data structures *********

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct Metrics {
    pub total_votes: u64,
    pub legitimate_votes: u64,
    pub suspicious_votes: u64,
    pub unique_voters: u64,
}

impl Metrics {
    /// The share of suspicious votes, in percent.
    pub fn fraud_rate(&self) -> Result<f64, AnalyticsError> {
        if self.total_votes == 0 {
            return Err(AnalyticsError::EmptyTable);
        }
        Ok(self.suspicious_votes as f64 / self.total_votes as f64 * 100.0)
    }

    /// The fraud rate with one decimal, or None for an empty table.
    pub fn fraud_rate_label(&self) -> Option<String> {
        self.fraud_rate().ok().map(|r| format!("{:.1}%", r))
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct FraudTypeCount {
    pub fraud_type: FraudType,
    pub count: u64,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ConstituencyVoters {
    pub constituency: String,
    /// Number of distinct suspicious voters.
    pub suspicious_voters: u64,
}

/// Suspicious votes, with one row per constituency and one column per fraud type.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ConstituencyPivot {
    pub fraud_types: Vec<FraudType>,
    pub rows: Vec<(String, Vec<u64>)>,
}

impl ConstituencyPivot {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.rows.iter().map(|(_, cells)| cells.iter().sum::<u64>()).sum()
    }

    pub fn get(&self, constituency: &str, fraud_type: &FraudType) -> Option<u64> {
        let col = self.fraud_types.iter().position(|ft| ft == fraud_type)?;
        self.rows
            .iter()
            .find(|(c, _)| c == constituency)
            .map(|(_, cells)| cells[col])
    }
}

/// One line of the drill-down table for a voter.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct DetailRow {
    pub image_path: String,
    pub registered_constituency: String,
    pub voting_constituency: String,
    pub claimed_voter_id: Option<String>,
    pub fraud_type: FraudType,
    pub fraud_reason: String,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct IdentityTheftCase {
    /// The actual voter, as recognized from the face.
    pub voter_id: VoterId,
    pub claimed_voter_id: Option<String>,
    pub constituency: String,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CrossConstituencyCase {
    pub voter_id: VoterId,
    pub registered_constituency: String,
    pub voting_constituency: String,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct DoubleVotingSummary {
    pub voter_id: VoterId,
    /// Votes cast by this voter across the whole table.
    pub number_of_votes: u64,
    /// Distinct voting constituencies, in order of first appearance.
    pub constituencies: Vec<String>,
}

impl DoubleVotingSummary {
    pub fn constituencies_label(&self) -> String {
        self.constituencies.join(", ")
    }
}

/// Everything the dashboard displays that does not depend on the selections.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct DashboardData {
    pub metrics: Metrics,
    pub categories: FraudCategories,
    pub distribution: Vec<FraudTypeCount>,
    pub constituency_voters: Vec<ConstituencyVoters>,
    pub pivot: ConstituencyPivot,
    pub identity_theft: Vec<IdentityTheftCase>,
    pub cross_constituency: Vec<CrossConstituencyCase>,
    pub double_voting: Vec<DoubleVotingSummary>,
}

/// Errors that prevent a statistic from being computed.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum AnalyticsError {
    /// The statistic is a ratio over the number of rows and the table has none.
    EmptyTable,
}

impl Error for AnalyticsError {}

impl Display for AnalyticsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalyticsError::EmptyTable => write!(f, "the table does not contain any vote"),
        }
    }
}
