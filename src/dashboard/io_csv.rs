// Primitives for reading CSV files.

use std::io::Read;
use std::path::Path;

use log::{debug, info};
use snafu::prelude::*;
use crate::dashboard::{
    io_common::{check_headers, RawVoteRow, ReadVotes},
    *,
};

pub fn read_csv_votes(path: &Path) -> DashboardResult<ReadVotes> {
    let p = path.display().to_string();
    info!("read_csv_votes: opening {:?}", p);
    let rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .context(CsvOpenSnafu { path: p })?;
    read_csv_records(rdr)
}

/// Reads all the records of a CSV source whose first row is the header.
pub fn read_csv_records<R: Read>(mut rdr: csv::Reader<R>) -> DashboardResult<ReadVotes> {
    let headers = rdr
        .headers()
        .context(CsvLineParseSnafu { lineno: 1u64 })?
        .clone();
    check_headers(headers.iter())?;

    let mut res = ReadVotes::default();
    for line_r in rdr.records() {
        let line = line_r.context(CsvReadSnafu {})?;
        let lineno = line.position().map(|p| p.line()).unwrap_or(0);
        let raw: RawVoteRow = line
            .deserialize(Some(&headers))
            .context(CsvLineParseSnafu { lineno })?;
        debug!("read_csv_records: lineno: {:?} row: {:?}", lineno, &raw);
        res.push(lineno, raw.into_record(lineno)?);
    }
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::io_common::report_inconsistencies;
    use voter_fraud::{Embedding, FraudType, VoteRecord, VoterId};

    const HEADER: &str = "voter_id,claimed_voter_id,registered_constituency,voting_constituency,image_path,fraud_type,is_suspicious,facenet_embedding";

    fn read_str(s: &str) -> DashboardResult<Vec<VoteRecord>> {
        read_csv_records(csv::Reader::from_reader(s.as_bytes())).map(|v| v.records)
    }

    #[test]
    fn reads_typed_records() {
        let data = format!(
            "{}\n{}\n{}\n",
            HEADER,
            r#"101,,North,North,faces/101.jpg,legitimate,False,"[0.1, 0.2]""#,
            r#"102,201,North,North,faces/102.jpg,same_constituency_identity_theft,True,"#
        );
        let records = read_str(&data).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].voter_id, VoterId::new("101"));
        assert_eq!(records[0].claimed_voter_id, None);
        assert_eq!(
            records[0].facenet_embedding,
            Some(Embedding::Vector(vec![0.1, 0.2]))
        );
        assert!(!records[0].is_suspicious);
        assert_eq!(records[1].claimed_voter_id.as_deref(), Some("201"));
        assert_eq!(
            records[1].fraud_type,
            FraudType::SameConstituencyIdentityTheft
        );
        assert!(records[1].is_suspicious);
        assert_eq!(records[1].facenet_embedding, None);
    }

    #[test]
    fn embedding_column_is_optional() {
        let data = "voter_id,claimed_voter_id,registered_constituency,voting_constituency,image_path,fraud_type,is_suspicious\n\
                    7,,A,B,7.png,cross_constituency_voting,True\n";
        let records = read_str(data).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].facenet_embedding, None);
        assert_eq!(records[0].voting_constituency, "B");
    }

    #[test]
    fn python_style_embeddings() {
        let data = format!(
            "{}\n{}\n{}\n{}\n",
            HEADER,
            r#"1,,A,A,1.png,legitimate,False,"[0.1, 0.2,]""#,
            r#"2,,A,A,2.png,legitimate,False,"(0.3, 0.4)""#,
            "3,,A,A,3.png,legitimate,False,0.5"
        );
        let records = read_str(&data).unwrap();
        assert_eq!(
            records[0].facenet_embedding,
            Some(Embedding::Vector(vec![0.1, 0.2]))
        );
        assert_eq!(
            records[1].facenet_embedding,
            Some(Embedding::Vector(vec![0.3, 0.4]))
        );
        assert_eq!(
            records[2].facenet_embedding,
            Some(Embedding::Raw("0.5".to_string()))
        );
    }

    #[test]
    fn records_keep_their_starting_line() {
        let data = format!(
            "{}\n{}\n{}\n{}\n",
            HEADER,
            "1,,\"North\nDistrict\",North,1.png,legitimate,False,",
            "2,,A,A,2.png,double_voting,False,",
            "3,,A,A,3.png,legitimate,False,"
        );
        let votes = read_csv_records(csv::Reader::from_reader(data.as_bytes())).unwrap();
        assert_eq!(votes.linenos, vec![2, 4, 5]);
        assert_eq!(votes.records[0].registered_constituency, "North\nDistrict");
        assert_eq!(report_inconsistencies(&votes), vec![4]);
    }

    #[test]
    fn columns_may_come_in_any_order() {
        let data = "fraud_type,is_suspicious,voter_id,image_path,voting_constituency,registered_constituency,claimed_voter_id,age\n\
                    double_voting,True,9,9.png,B,A,,33\n";
        let records = read_str(data).unwrap();
        assert_eq!(records[0].voter_id, VoterId::new("9"));
        assert_eq!(records[0].registered_constituency, "A");
        assert_eq!(records[0].fraud_type, FraudType::DoubleVoting);
    }

    #[test]
    fn header_only_gives_an_empty_table() {
        let records = read_str(&format!("{}\n", HEADER)).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn missing_column() {
        let data = "voter_id,registered_constituency,voting_constituency,image_path,fraud_type,is_suspicious\n";
        let err = read_str(data).unwrap_err();
        assert_eq!(err.to_string(), "missing required column: claimed_voter_id");
    }

    #[test]
    fn errors_name_the_line() {
        let data = format!(
            "{}\n{}\n{}\n",
            HEADER,
            "1,,A,A,1.png,legitimate,False,",
            "2,,A,A,2.png,double_voting,perhaps,"
        );
        let err = read_str(&data).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid boolean \"perhaps\" for is_suspicious on line 3"
        );

        let data = format!("{}\n{}\n", HEADER, r#"1,,A,A,1.png,legitimate,False,"[1, 2""#);
        assert!(matches!(
            read_str(&data),
            Err(DashboardError::EmbeddingParse { lineno: 2, .. })
        ));
    }
}
