//! The selections that drive what the dashboard shows.

use std::path::PathBuf;

use snafu::prelude::*;
use voter_fraud::{DashboardData, FraudCategory, VoterId};

use crate::dashboard::*;

/// The tabs of the analytics section.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub enum AnalyticsTab {
    #[default]
    IdentityTheft,
    CrossConstituency,
    DoubleVoting,
}

impl AnalyticsTab {
    pub const ALL: [AnalyticsTab; 3] = [
        AnalyticsTab::IdentityTheft,
        AnalyticsTab::CrossConstituency,
        AnalyticsTab::DoubleVoting,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AnalyticsTab::IdentityTheft => "Identity Theft Cases",
            AnalyticsTab::CrossConstituency => "Cross-Constituency Fraud",
            AnalyticsTab::DoubleVoting => "Double Voting",
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            AnalyticsTab::IdentityTheft => "identity-theft",
            AnalyticsTab::CrossConstituency => "cross-constituency",
            AnalyticsTab::DoubleVoting => "double-voting",
        }
    }

    pub fn parse(s: &str) -> DashboardResult<AnalyticsTab> {
        AnalyticsTab::ALL
            .iter()
            .find(|t| t.key() == s || t.label().eq_ignore_ascii_case(s))
            .copied()
            .context(UnknownTabSnafu { name: s })
    }
}

/// The current selections. It is built once per rendering and never modified.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct ViewState {
    pub input: Option<PathBuf>,
    pub category: Option<FraudCategory>,
    pub voter: Option<VoterId>,
    pub tab: AnalyticsTab,
}

impl ViewState {
    pub fn new(
        input: Option<PathBuf>,
        category: Option<&str>,
        voter: Option<&str>,
        tab: Option<&str>,
    ) -> DashboardResult<ViewState> {
        let category = match category {
            Some(c) => Some(FraudCategory::parse(c).context(UnknownCategorySnafu { name: c })?),
            None => None,
        };
        let tab = match tab {
            Some(t) => AnalyticsTab::parse(t)?,
            None => AnalyticsTab::default(),
        };
        Ok(ViewState {
            input,
            category,
            voter: voter.map(|v| VoterId::new(v.trim())),
            tab,
        })
    }
}

/// What the page displays, derived from the selections and the data.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum Stage {
    /// Nothing has been provided yet.
    NoFile,
    /// A table is loaded, but no category has any voter to select.
    AwaitingSelection,
    Detail {
        category: FraudCategory,
        voter: VoterId,
    },
}

/// Resolves the selections against the loaded data.
///
/// Missing selections default to the first available option, like a drop-down
/// list would. Selections that are not offered are reported as errors.
pub fn resolve_stage(view: &ViewState, data: Option<&DashboardData>) -> DashboardResult<Stage> {
    let data = match (view.input.as_ref(), data) {
        (Some(_), Some(d)) => d,
        _ => return Ok(Stage::NoFile),
    };
    let active: Vec<FraudCategory> = data
        .categories
        .active()
        .iter()
        .map(|c| c.category)
        .collect();
    if active.is_empty() {
        if let Some(c) = view.category {
            return EmptyCategorySnafu {
                category: c.label(),
            }
            .fail();
        }
        return Ok(Stage::AwaitingSelection);
    }

    let category = match (view.category, view.voter.as_ref()) {
        (Some(c), _) => {
            ensure!(
                active.contains(&c),
                EmptyCategorySnafu {
                    category: c.label()
                }
            );
            c
        }
        // Only a voter was given: pick the first category that lists them.
        (None, Some(v)) => active
            .iter()
            .copied()
            .find(|c| data.categories.voters(*c).contains(v))
            .context(UnknownSelectionSnafu {
                voter: v.as_str(),
                category: FraudCategory::AllSuspicious.label(),
            })?,
        (None, None) => active[0],
    };

    let options = data.categories.voter_options(category);
    let voter = match view.voter.as_ref() {
        Some(v) => {
            ensure!(
                options.contains(v),
                UnknownSelectionSnafu {
                    voter: v.as_str(),
                    category: category.label(),
                }
            );
            v.clone()
        }
        None => options[0].clone(),
    };
    Ok(Stage::Detail { category, voter })
}
