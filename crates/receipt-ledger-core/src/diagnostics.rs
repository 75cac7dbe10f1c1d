//! Decision traces for troubleshooting duplicate detection.
//!
//! Entries are written to a secondary table when diagnostics are enabled.
//! Nothing in the decision path ever reads them back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::matcher::Comparison;
use crate::record::ReceiptRecord;

/// A stored value next to the candidate value it was compared with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldPair {
    pub stored: String,
    pub candidate: String,
}

impl FieldPair {
    pub fn new(stored: impl Into<String>, candidate: impl Into<String>) -> Self {
        Self {
            stored: stored.into(),
            candidate: candidate.into(),
        }
    }
}

/// What the writer decided for one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionOutcome {
    /// A stored row matched; nothing was appended.
    Duplicate,
    /// Rows were scanned and none matched.
    NoMatch,
    /// The caller set `force`; no scan happened.
    Forced,
    /// The ledger had no data rows; no scan happened.
    EmptyLedger,
}

impl DecisionOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Duplicate => "duplicate",
            Self::NoMatch => "no_match",
            Self::Forced => "forced",
            Self::EmptyLedger => "empty_ledger",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "duplicate" => Some(Self::Duplicate),
            "no_match" => Some(Self::NoMatch),
            "forced" => Some(Self::Forced),
            "empty_ledger" => Some(Self::EmptyLedger),
            _ => None,
        }
    }
}

/// One recorded decision.
///
/// For a duplicate, the field pairs come from the matched row. Otherwise the
/// stored side is empty and only the candidate values are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticEntry {
    pub recorded_at: DateTime<Utc>,
    pub outcome: DecisionOutcome,
    pub row_index: Option<u64>,
    pub merchant: FieldPair,
    pub date: FieldPair,
    pub total: FieldPair,
}

impl DiagnosticEntry {
    /// Entry for a decision that compared against a specific row.
    pub fn from_comparison(
        recorded_at: DateTime<Utc>,
        outcome: DecisionOutcome,
        comparison: &Comparison,
    ) -> Self {
        Self {
            recorded_at,
            outcome,
            row_index: Some(comparison.row_index),
            merchant: comparison.merchant.clone(),
            date: comparison.date.clone(),
            total: comparison.total.clone(),
        }
    }

    /// Entry for a decision with no matched row.
    pub fn for_candidate(
        recorded_at: DateTime<Utc>,
        outcome: DecisionOutcome,
        candidate: &ReceiptRecord,
    ) -> Self {
        Self {
            recorded_at,
            outcome,
            row_index: None,
            merchant: FieldPair::new("", candidate.merchant_key()),
            date: FieldPair::new("", candidate.date_key()),
            total: FieldPair::new("", candidate.total_key()),
        }
    }
}
