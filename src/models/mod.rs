//! Data types shared by the HTTP layer, the store and the processing pipeline.
//!
//! Field names are snake_case on the wire; the desktop shell depends on them.

mod api;
mod history;
mod rule;
mod template;

pub use api::*;
pub use history::*;
pub use rule::*;
pub use template::*;

use serde::{Deserialize, Serialize};

/// Structured naming suggestion produced by an AI provider.
///
/// A confidence of `0.0` marks a fallback answer rather than a real one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiAnalysis {
    pub suggested_name: String,
    pub category: String,
    pub confidence: f64,
}

impl AiAnalysis {
    /// Degraded result that keeps the original base name.
    pub fn fallback(base_name: &str, category: &str) -> Self {
        Self {
            suggested_name: base_name.to_string(),
            category: category.to_string(),
            confidence: 0.0,
        }
    }
}
