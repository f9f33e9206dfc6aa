//! Append-only ledger of successfully performed calculator actions.

use serde::{Deserialize, Serialize};

/// Which calculator flavor performed an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Flavor {
    Stack,
    Independent,
}

impl Flavor {
    /// Parses the exact wire names `STACK` / `INDEPENDENT`. Anything else is
    /// `None`, which queries treat as "no filter".
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "STACK" => Some(Self::Stack),
            "INDEPENDENT" => Some(Self::Independent),
            _ => None,
        }
    }
}

/// One successfully performed action. Failed attempts are never recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Flavor that performed the action.
    pub flavor: Flavor,
    /// Operation name exactly as the client supplied it.
    pub operation: String,
    /// Integer arguments in evaluation order.
    pub arguments: Vec<i64>,
    /// The computed value.
    pub result: i64,
}

/// Chronological record of every successful action, both flavors interleaved
/// in execution order.
#[derive(Debug, Default)]
pub struct HistoryLedger {
    records: Vec<HistoryRecord>,
}

impl HistoryLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record.
    pub fn append(&mut self, record: HistoryRecord) {
        self.records.push(record);
    }

    /// Records matching the filter, oldest first. `None` returns both
    /// flavors interleaved chronologically.
    #[must_use]
    pub fn query(&self, flavor: Option<Flavor>) -> Vec<HistoryRecord> {
        self.records
            .iter()
            .filter(|record| flavor.is_none_or(|wanted| record.flavor == wanted))
            .cloned()
            .collect()
    }

    /// Number of recorded actions for one flavor.
    #[must_use]
    pub fn count(&self, flavor: Flavor) -> usize {
        self.records
            .iter()
            .filter(|record| record.flavor == flavor)
            .count()
    }

    /// Total number of recorded actions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
