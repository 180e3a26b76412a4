use serde::{Deserialize, Serialize};

/// What happens to the source file once a rule applies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum RuleAction {
    #[default]
    Copy,
    Move,
}

impl RuleAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Copy => "copy",
            Self::Move => "move",
        }
    }
}

impl From<String> for RuleAction {
    /// Anything other than "move" copies, so a bad value never deletes a source file.
    fn from(value: String) -> Self {
        if value.trim().eq_ignore_ascii_case("move") {
            Self::Move
        } else {
            Self::Copy
        }
    }
}

impl std::fmt::Display for RuleAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which timestamp feeds the date tokens of a name template
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum DateSource {
    #[default]
    Current,
    Created,
    Modified,
}

impl DateSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Current => "current",
            Self::Created => "created",
            Self::Modified => "modified",
        }
    }
}

impl From<String> for DateSource {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "created" => Self::Created,
            "modified" => Self::Modified,
            _ => Self::Current,
        }
    }
}

/// One unit of a filename recipe.
///
/// On the wire a token is a plain string: `YYYY`, `MM`, `DD`, `HH`, `mm`,
/// `original`, `separator<chars>` or any other literal text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TemplateToken {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    /// AI suggestion when present, otherwise the original base name
    Original,
    /// Inserted verbatim, never sanitized
    Separator(String),
    /// Literal text, sanitized before use
    Text(String),
}

const SEPARATOR_PREFIX: &str = "separator";

impl From<String> for TemplateToken {
    fn from(value: String) -> Self {
        match value.as_str() {
            "YYYY" => Self::Year,
            "MM" => Self::Month,
            "DD" => Self::Day,
            "HH" => Self::Hour,
            "mm" => Self::Minute,
            "original" => Self::Original,
            _ => match value.strip_prefix(SEPARATOR_PREFIX) {
                Some(sep) => Self::Separator(sep.to_string()),
                None => Self::Text(value),
            },
        }
    }
}

impl From<&str> for TemplateToken {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<TemplateToken> for String {
    fn from(token: TemplateToken) -> Self {
        match token {
            TemplateToken::Year => "YYYY".to_string(),
            TemplateToken::Month => "MM".to_string(),
            TemplateToken::Day => "DD".to_string(),
            TemplateToken::Hour => "HH".to_string(),
            TemplateToken::Minute => "mm".to_string(),
            TemplateToken::Original => "original".to_string(),
            TemplateToken::Separator(sep) => format!("{}{}", SEPARATOR_PREFIX, sep),
            TemplateToken::Text(text) => text,
        }
    }
}

/// User-defined filing policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rule {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub color: String,
    pub destination: String,
    pub action: RuleAction,
    /// Forces copy semantics even when `action` is move
    pub keep_original: bool,
    /// Category labels, see `rules::classifier`
    pub file_types: Vec<String>,
    /// Extensions, case-insensitive, leading dot optional
    pub custom_extensions: Vec<String>,
    pub allow_all_files: bool,
    pub name_template: Vec<TemplateToken>,
    pub date_source: DateSource,
    pub ai_enabled: bool,
    pub quick_access: bool,
    pub enabled: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub created_at: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub updated_at: String,
}

impl Default for Rule {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            icon: String::new(),
            color: String::new(),
            destination: String::new(),
            action: RuleAction::Copy,
            keep_original: false,
            file_types: Vec::new(),
            custom_extensions: Vec::new(),
            allow_all_files: false,
            name_template: Vec::new(),
            date_source: DateSource::Current,
            ai_enabled: false,
            quick_access: false,
            enabled: true,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }
}

impl Rule {
    /// Whether the source should be removed after filing
    pub fn moves_source(&self) -> bool {
        self.action == RuleAction::Move && !self.keep_original
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_wire_format() {
        let tokens: Vec<TemplateToken> =
            serde_json::from_str(r#"["YYYY","separator-","MM","original","separator","draft"]"#)
                .unwrap();
        assert_eq!(
            tokens,
            vec![
                TemplateToken::Year,
                TemplateToken::Separator("-".to_string()),
                TemplateToken::Month,
                TemplateToken::Original,
                TemplateToken::Separator(String::new()),
                TemplateToken::Text("draft".to_string()),
            ]
        );

        let json = serde_json::to_string(&tokens).unwrap();
        assert_eq!(json, r#"["YYYY","separator-","MM","original","separator","draft"]"#);
    }

    #[test]
    fn test_lenient_enums() {
        let rule: Rule =
            serde_json::from_str(r#"{"name":"x","action":"MOVE","date_source":"sometime"}"#)
                .unwrap();
        assert_eq!(rule.action, RuleAction::Move);
        assert_eq!(rule.date_source, DateSource::Current);

        let rule: Rule = serde_json::from_str(r#"{"action":"shred"}"#).unwrap();
        assert_eq!(rule.action, RuleAction::Copy);
    }

    #[test]
    fn test_rule_defaults() {
        let rule: Rule = serde_json::from_str("{}").unwrap();
        assert!(rule.enabled);
        assert!(rule.name_template.is_empty());

        let json = serde_json::to_value(&rule).unwrap();
        assert_eq!(json["action"], "copy");
        assert_eq!(json["date_source"], "current");
        assert!(json.get("created_at").is_none());
    }

    #[test]
    fn test_keep_original_blocks_move() {
        let rule = Rule {
            action: RuleAction::Move,
            keep_original: true,
            ..Default::default()
        };
        assert!(!rule.moves_source());
        assert!(Rule {
            action: RuleAction::Move,
            ..Default::default()
        }
        .moves_source());
    }
}
