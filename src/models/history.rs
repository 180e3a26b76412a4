use serde::{Deserialize, Serialize};

use super::RuleAction;

/// Outcome of a processing attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryStatus {
    Success,
    Failed,
}

impl HistoryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }
}

/// Row of the processing log as returned to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: i64,
    pub original_path: String,
    pub original_name: String,
    pub new_path: String,
    pub new_name: String,
    pub rule_name: String,
    pub action: String,
    pub status: String,
    /// Local `YYYY-MM-DD HH:MM:SS`
    pub timestamp: String,
}

/// Fields supplied by the processor; the store assigns id and timestamp.
#[derive(Debug, Clone)]
pub struct NewHistoryRecord {
    pub original_path: String,
    pub original_name: String,
    pub new_path: String,
    pub new_name: String,
    pub rule_name: String,
    pub action: RuleAction,
    pub status: HistoryStatus,
}
