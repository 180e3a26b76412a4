//! File processing pipeline: pick a rule, ask for a name, file the file,
//! record what happened.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

use super::file_ops;
use crate::ai::Analyzer;
use crate::models::{
    AiAnalysis, DateSource, FileProcessRequest, FileProcessResponse, HistoryStatus,
    NewHistoryRecord, Rule, RuleAction, TemplateToken,
};
use crate::rules::{match_rule, template};
use crate::store::Store;

/// Rule name recorded when nothing matched
pub const DEFAULT_RULE_NAME: &str = "Default rule";

/// Category reported when the AI call failed
const FALLBACK_CATEGORY: &str = "document";

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Rule not found: {0}")]
    RuleNotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("File operation failed: {0}")]
    FileOperation(#[from] std::io::Error),
}

/// Effective settings for one file once rule and defaults are merged
#[derive(Debug, Clone, PartialEq)]
struct Plan {
    rule_name: String,
    operation: RuleAction,
    date_source: DateSource,
    template: Vec<TemplateToken>,
    use_ai: bool,
    destination: PathBuf,
}

impl Plan {
    fn new(rule: Option<&Rule>, use_ai: bool, default_destination: &Path) -> Self {
        let mut plan = Self {
            rule_name: DEFAULT_RULE_NAME.to_string(),
            operation: RuleAction::Copy,
            date_source: DateSource::Current,
            template: Vec::new(),
            use_ai,
            destination: default_destination.to_path_buf(),
        };

        if let Some(rule) = rule {
            if !rule.name.trim().is_empty() {
                plan.rule_name = rule.name.clone();
            }
            if !rule.destination.trim().is_empty() {
                plan.destination = PathBuf::from(rule.destination.trim());
            }
            if rule.moves_source() {
                plan.operation = RuleAction::Move;
            }
            plan.date_source = rule.date_source;
            plan.template = rule.name_template.clone();
            plan.use_ai |= rule.ai_enabled;
        }

        plan
    }
}

/// Runs the processing pipeline against the store and an analyzer
pub struct Processor {
    store: Arc<Store>,
    analyzer: Arc<dyn Analyzer>,
    default_destination: PathBuf,
}

impl Processor {
    pub fn new(store: Arc<Store>, analyzer: Arc<dyn Analyzer>, default_destination: PathBuf) -> Self {
        Self {
            store,
            analyzer,
            default_destination,
        }
    }

    /// Process one file. Every attempt past rule selection leaves a history entry.
    pub async fn process(&self, req: &FileProcessRequest) -> Result<FileProcessResponse, ProcessError> {
        let source = PathBuf::from(&req.file_path);
        if tokio::fs::symlink_metadata(&source).await.is_err() {
            return Err(ProcessError::FileNotFound(req.file_path.clone()));
        }

        let original_name = source
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| req.file_path.clone());
        let (base_name, ext) = template::split_name(&original_name);

        let rule = self.resolve_rule(&source, req.rule_id.as_deref())?;
        let plan = Plan::new(rule.as_ref(), req.use_ai, &self.default_destination);

        if let Err(e) = tokio::fs::create_dir_all(&plan.destination).await {
            warn!(destination = %plan.destination.display(), error = %e, "Failed to create destination");
        }

        let analysis = if plan.use_ai {
            let model = Some(req.model.as_str()).filter(|m| !m.trim().is_empty());
            match self.analyzer.analyze(&source, model).await {
                Ok(analysis) => Some(analysis),
                Err(e) => {
                    warn!(file = %req.file_path, error = %e, "AI analysis failed, keeping original name");
                    Some(AiAnalysis::fallback(base_name, FALLBACK_CATEGORY))
                }
            }
        } else {
            None
        };
        let ai_name = analysis
            .as_ref()
            .map(|a| a.suggested_name.as_str())
            .filter(|n| !n.trim().is_empty());

        let timestamp = template::select_timestamp(&source, plan.date_source);
        let new_base = if plan.template.is_empty() {
            template::fallback_name(&original_name, ai_name, &timestamp)
        } else {
            template::render(&plan.template, &original_name, ai_name, &timestamp)
        };
        let wanted = plan.destination.join(format!("{}{}", new_base, ext));

        match file_ops::transfer(&source, &wanted, plan.operation).await {
            Ok(written) => {
                let new_name = written
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();
                self.record(&req.file_path, &original_name, &written, &new_name, &plan, HistoryStatus::Success);
                info!(
                    from = %req.file_path,
                    to = %written.display(),
                    rule = %plan.rule_name,
                    action = %plan.operation,
                    "Processed file"
                );

                Ok(FileProcessResponse {
                    original_path: req.file_path.clone(),
                    original_name,
                    new_name,
                    destination: written.to_string_lossy().to_string(),
                    rule_used: plan.rule_name,
                    ai_analysis: analysis,
                })
            }
            Err(e) => {
                let new_name = format!("{}{}", new_base, ext);
                self.record(&req.file_path, &original_name, &wanted, &new_name, &plan, HistoryStatus::Failed);
                error!(file = %req.file_path, error = %e, "File operation failed");
                Err(ProcessError::FileOperation(e))
            }
        }
    }

    /// Explicit rule id must exist; otherwise match against all rules, and a
    /// failed listing just means no rule.
    fn resolve_rule(&self, source: &Path, rule_id: Option<&str>) -> Result<Option<Rule>, ProcessError> {
        match rule_id.map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => match self.store.get_rule(id)? {
                Some(rule) => Ok(Some(rule)),
                None => Err(ProcessError::RuleNotFound(id.to_string())),
            },
            None => match self.store.get_rules() {
                Ok(rules) => Ok(match_rule(source, &rules).cloned()),
                Err(e) => {
                    warn!(error = %e, "Failed to load rules, using defaults");
                    Ok(None)
                }
            },
        }
    }

    fn record(
        &self,
        original_path: &str,
        original_name: &str,
        new_path: &Path,
        new_name: &str,
        plan: &Plan,
        status: HistoryStatus,
    ) {
        let record = NewHistoryRecord {
            original_path: original_path.to_string(),
            original_name: original_name.to_string(),
            new_path: new_path.to_string_lossy().to_string(),
            new_name: new_name.to_string(),
            rule_name: plan.rule_name.clone(),
            action: plan.operation,
            status,
        };
        if let Err(e) = self.store.save_history(&record) {
            warn!(error = %e, "Failed to save history");
        }
    }
}
