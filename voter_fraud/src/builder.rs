pub use crate::config::*;

/// A builder for assembling a table of vote records in code.
///
/// The suspicious flag is derived from the fraud type, which is what the
/// upstream labelling produces. Use [`Builder::add_record`] to build
/// records that do not follow this rule.
///
/// ```
/// use voter_fraud::builder::Builder;
/// use voter_fraud::{categorize, FraudCategory, VoterId};
///
/// let mut builder = Builder::new();
/// builder
///     .add_vote("101", "North", "North", "legitimate")
///     .add_vote("102", "North", "South", "cross_constituency_voting");
///
/// let records = builder.build();
/// let categories = categorize(&records);
/// assert_eq!(
///     categories.voters(FraudCategory::AllSuspicious),
///     &[VoterId::new("102")]
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct Builder {
    _records: Vec<VoteRecord>,
}

impl Builder {
    pub fn new() -> Builder {
        Builder {
            _records: Vec::new(),
        }
    }

    /// Adds a vote with the given fraud label.
    ///
    /// The image path is derived from the voter and the position of the vote.
    pub fn add_vote(
        &mut self,
        voter_id: &str,
        registered_constituency: &str,
        voting_constituency: &str,
        fraud_label: &str,
    ) -> &mut Builder {
        let fraud_type = FraudType::from_label(fraud_label);
        let record = VoteRecord {
            voter_id: VoterId::new(voter_id),
            claimed_voter_id: None,
            registered_constituency: registered_constituency.to_string(),
            voting_constituency: voting_constituency.to_string(),
            image_path: format!("images/{}_{}.jpg", voter_id, self._records.len()),
            is_suspicious: fraud_type != FraudType::Legitimate,
            fraud_type,
            facenet_embedding: None,
        };
        self.add_record(record)
    }

    /// Adds a vote where `voter_id` presented the identity `claimed_voter_id`.
    pub fn add_identity_theft(
        &mut self,
        voter_id: &str,
        claimed_voter_id: &str,
        constituency: &str,
    ) -> &mut Builder {
        self.add_vote(
            voter_id,
            constituency,
            constituency,
            FraudType::SameConstituencyIdentityTheft.label(),
        );
        if let Some(last) = self._records.last_mut() {
            last.claimed_voter_id = Some(claimed_voter_id.to_string());
        }
        self
    }

    pub fn add_record(&mut self, record: VoteRecord) -> &mut Builder {
        self._records.push(record);
        self
    }

    pub fn len(&self) -> usize {
        self._records.len()
    }

    pub fn is_empty(&self) -> bool {
        self._records.is_empty()
    }

    pub fn build(&self) -> Vec<VoteRecord> {
        self._records.clone()
    }
}
