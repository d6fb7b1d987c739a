// Conversion of raw rows into typed vote records, shared by all the providers.

use std::collections::HashMap;
use std::path::Path;

use log::{debug, warn};
use serde::Deserialize;
use snafu::prelude::*;
use voter_fraud::{inconsistent_records, Embedding, FraudType, VoteRecord, VoterId};

use crate::dashboard::*;

pub const REQUIRED_COLUMNS: [&str; 7] = [
    "voter_id",
    "claimed_voter_id",
    "registered_constituency",
    "voting_constituency",
    "image_path",
    "fraud_type",
    "is_suspicious",
];

pub const EMBEDDING_COLUMN: &str = "facenet_embedding";

#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub enum InputType {
    #[default]
    Csv,
    Xlsx,
}

impl InputType {
    pub fn parse(s: &str) -> DashboardResult<InputType> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(InputType::Csv),
            "xlsx" | "excel" => Ok(InputType::Xlsx),
            _ => UnknownInputTypeSnafu { input_type: s }.fail(),
        }
    }
}

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

/// Fails on the first required column that is not part of the header.
pub fn check_headers<'a>(headers: impl IntoIterator<Item = &'a str>) -> DashboardResult<()> {
    let present: Vec<&str> = headers.into_iter().map(|h| h.trim()).collect();
    debug!("check_headers: {:?}", present);
    for column in REQUIRED_COLUMNS {
        ensure!(present.contains(&column), MissingColumnSnafu { column });
    }
    Ok(())
}

/// The records of one input, with the line (or worksheet row) each one starts on.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct ReadVotes {
    pub records: Vec<VoteRecord>,
    pub linenos: Vec<u64>,
}

impl ReadVotes {
    pub fn push(&mut self, lineno: u64, record: VoteRecord) {
        self.linenos.push(lineno);
        self.records.push(record);
    }
}

/// A row as it is found in the input, before any interpretation.
#[derive(Eq, PartialEq, Debug, Clone, Deserialize)]
pub struct RawVoteRow {
    pub voter_id: String,
    pub claimed_voter_id: Option<String>,
    pub registered_constituency: String,
    pub voting_constituency: String,
    pub image_path: String,
    pub fraud_type: String,
    pub is_suspicious: String,
    #[serde(default)]
    pub facenet_embedding: Option<String>,
}

impl RawVoteRow {
    /// Builds a row from cells indexed by column name. Missing cells are empty.
    pub fn from_named_cells(cells: &HashMap<&str, String>) -> RawVoteRow {
        let get = |k: &str| cells.get(k).cloned().unwrap_or_default();
        let get_opt = |k: &str| cells.get(k).filter(|s| !s.is_empty()).cloned();
        RawVoteRow {
            voter_id: get("voter_id"),
            claimed_voter_id: get_opt("claimed_voter_id"),
            registered_constituency: get("registered_constituency"),
            voting_constituency: get("voting_constituency"),
            image_path: get("image_path"),
            fraud_type: get("fraud_type"),
            is_suspicious: get("is_suspicious"),
            facenet_embedding: get_opt(EMBEDDING_COLUMN),
        }
    }

    pub fn into_record(self, lineno: u64) -> DashboardResult<VoteRecord> {
        Ok(VoteRecord {
            voter_id: VoterId::new(self.voter_id.trim()),
            claimed_voter_id: self
                .claimed_voter_id
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            registered_constituency: self.registered_constituency.trim().to_string(),
            voting_constituency: self.voting_constituency.trim().to_string(),
            image_path: self.image_path.trim().to_string(),
            fraud_type: FraudType::from_label(self.fraud_type.trim()),
            is_suspicious: parse_bool(&self.is_suspicious, lineno)?,
            facenet_embedding: parse_embedding(self.facenet_embedding.as_deref(), lineno)?,
        })
    }
}

pub fn parse_bool(value: &str, lineno: u64) -> DashboardResult<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "1.0" | "yes" => Ok(true),
        // Missing flags are not suspicious.
        "false" | "0" | "0.0" | "no" | "" => Ok(false),
        _ => InvalidBoolSnafu { value, lineno }.fail(),
    }
}

/// Decodes an embedding cell.
///
/// Lists and tuples of numbers are accepted in the form that Python writes them:
/// `[0.1, -0.2, 3e-05]`, `(0.1, 0.2)`, with an optional trailing comma.
/// Cells that do not start with a bracket are kept as raw text.
pub fn parse_embedding(value: Option<&str>, lineno: u64) -> DashboardResult<Option<Embedding>> {
    let s = match value.map(|s| s.trim()) {
        None | Some("") => return Ok(None),
        Some(s) => s,
    };
    if !s.starts_with('[') && !s.starts_with('(') {
        debug!("parse_embedding: line {}: keeping {:?} as text", lineno, s);
        return Ok(Some(Embedding::Raw(s.to_string())));
    }
    let inner = s
        .strip_prefix('[')
        .and_then(|r| r.strip_suffix(']'))
        .or_else(|| s.strip_prefix('(').and_then(|r| r.strip_suffix(')')))
        .context(EmbeddingParseSnafu { value: s, lineno })?
        .trim();
    if inner.is_empty() {
        return Ok(Some(Embedding::Vector(vec![])));
    }
    let inner = inner.strip_suffix(',').unwrap_or(inner);
    let v: Option<Vec<f64>> = inner
        .split(',')
        .map(|x| x.trim().parse::<f64>().ok())
        .collect();
    let v = v.context(EmbeddingParseSnafu { value: s, lineno })?;
    Ok(Some(Embedding::Vector(v)))
}

/// The suspicious flag and the fraud type are both kept as they were read.
/// Disagreements between them are only reported.
/// Returns the lines of the inconsistent records.
pub fn report_inconsistencies(votes: &ReadVotes) -> Vec<u64> {
    let lines: Vec<u64> = inconsistent_records(&votes.records)
        .into_iter()
        .filter_map(|idx| votes.linenos.get(idx).copied())
        .collect();
    if !lines.is_empty() {
        warn!(
            "{} records have a suspicious flag that disagrees with their fraud type (lines {:?})",
            lines.len(),
            &lines[..lines.len().min(10)]
        );
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(fraud_type: &str, is_suspicious: &str) -> RawVoteRow {
        RawVoteRow {
            voter_id: " 42 ".to_string(),
            claimed_voter_id: Some("".to_string()),
            registered_constituency: "North".to_string(),
            voting_constituency: "South".to_string(),
            image_path: "faces/42.jpg".to_string(),
            fraud_type: fraud_type.to_string(),
            is_suspicious: is_suspicious.to_string(),
            facenet_embedding: None,
        }
    }

    #[test]
    fn headers() {
        assert!(check_headers(REQUIRED_COLUMNS).is_ok());
        let mut with_extra: Vec<&str> = REQUIRED_COLUMNS.to_vec();
        with_extra.push(EMBEDDING_COLUMN);
        with_extra.push("timestamp");
        assert!(check_headers(with_extra).is_ok());

        let partial: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|c| *c != "image_path")
            .collect();
        let err = check_headers(partial).unwrap_err();
        assert_eq!(err.to_string(), "missing required column: image_path");
    }

    #[test]
    fn booleans() {
        assert!(parse_bool("True", 2).unwrap());
        assert!(parse_bool("true", 2).unwrap());
        assert!(parse_bool("1", 2).unwrap());
        assert!(!parse_bool("False", 2).unwrap());
        assert!(!parse_bool("", 2).unwrap());
        let err = parse_bool("maybe", 7).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid boolean \"maybe\" for is_suspicious on line 7"
        );
    }

    fn vector(v: &[f64]) -> Option<Embedding> {
        Some(Embedding::Vector(v.to_vec()))
    }

    #[test]
    fn embeddings() {
        assert_eq!(parse_embedding(None, 2).unwrap(), None);
        assert_eq!(parse_embedding(Some("  "), 2).unwrap(), None);
        assert_eq!(
            parse_embedding(Some("[0.5, -1, 2e-3]"), 2).unwrap(),
            vector(&[0.5, -1.0, 0.002])
        );
        assert_eq!(parse_embedding(Some("[]"), 2).unwrap(), vector(&[]));
    }

    #[test]
    fn python_literal_embeddings() {
        assert_eq!(
            parse_embedding(Some("[0.1, 0.2,]"), 2).unwrap(),
            vector(&[0.1, 0.2])
        );
        assert_eq!(
            parse_embedding(Some("(0.1, 0.2)"), 2).unwrap(),
            vector(&[0.1, 0.2])
        );
        assert_eq!(
            parse_embedding(Some("( 3e-05 , )"), 2).unwrap(),
            vector(&[0.00003])
        );
    }

    #[test]
    fn cells_that_are_not_lists_are_kept() {
        assert_eq!(
            parse_embedding(Some("0.75"), 2).unwrap(),
            Some(Embedding::Raw("0.75".to_string()))
        );
        assert_eq!(
            parse_embedding(Some(" pending "), 2).unwrap(),
            Some(Embedding::Raw("pending".to_string()))
        );
    }

    #[test]
    fn malformed_lists() {
        for s in ["[0.5, oops]", "[1,,2]", "[1, 2", "(1 2)"] {
            match parse_embedding(Some(s), 3) {
                Err(e @ DashboardError::EmbeddingParse { lineno: 3, .. }) => {
                    assert_eq!(e.to_string(), "cannot decode facenet_embedding on line 3")
                }
                x => panic!("unexpected result for {:?}: {:?}", s, x),
            }
        }
    }

    #[test]
    fn raw_rows_become_records() {
        let r = raw("cross_constituency_voting", "True").into_record(2).unwrap();
        assert_eq!(r.voter_id, VoterId::new("42"));
        assert_eq!(r.claimed_voter_id, None);
        assert_eq!(r.fraud_type, FraudType::CrossConstituencyVoting);
        assert!(r.is_suspicious);

        let r = raw("ghost_voting", "True").into_record(2).unwrap();
        assert_eq!(r.fraud_type, FraudType::Other("ghost_voting".to_string()));
    }

    #[test]
    fn rows_from_named_cells() {
        let mut cells: HashMap<&str, String> = HashMap::new();
        cells.insert("voter_id", "7".to_string());
        cells.insert("claimed_voter_id", "".to_string());
        cells.insert("fraud_type", "legitimate".to_string());
        cells.insert("is_suspicious", "False".to_string());
        let row = RawVoteRow::from_named_cells(&cells);
        assert_eq!(row.voter_id, "7");
        assert_eq!(row.claimed_voter_id, None);
        assert_eq!(row.image_path, "");
        assert_eq!(row.facenet_embedding, None);
    }

    #[test]
    fn inconsistencies_use_the_read_lines() {
        let mut votes = ReadVotes::default();
        votes.push(2, raw("legitimate", "False").into_record(2).unwrap());
        // A multi-line record before this one.
        votes.push(5, raw("double_voting", "False").into_record(5).unwrap());
        votes.push(9, raw("legitimate", "True").into_record(9).unwrap());
        assert_eq!(report_inconsistencies(&votes), vec![5, 9]);
        assert!(report_inconsistencies(&ReadVotes::default()).is_empty());
    }

    #[test]
    fn input_types() {
        assert_eq!(InputType::parse("CSV").unwrap(), InputType::Csv);
        assert_eq!(InputType::parse("xlsx").unwrap(), InputType::Xlsx);
        assert!(InputType::parse("ods").is_err());
        assert_eq!(simplify_file_name("/tmp/votes.csv"), "votes.csv");
    }
}
