use chrono::{Local, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{de::DeserializeOwned, Serialize};

use crate::models::{DateSource, Rule, RuleAction};

const RULE_COLUMNS: &str = "id, name, icon, color, destination, action, keep_original, file_types,
    custom_extensions, allow_all_files, name_template, date_source,
    ai_enabled, quick_access, enabled, created_at, updated_at";

pub(crate) fn now_rfc3339() -> String {
    Local::now().to_rfc3339_opts(SecondsFormat::Micros, false)
}

pub(crate) fn generate_id(prefix: &str) -> String {
    let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    format!("{}_{}", prefix, nanos)
}

fn to_json<T: Serialize>(items: &[T]) -> String {
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
}

/// Unreadable list columns read as empty rather than failing the whole query
fn from_json<T: DeserializeOwned>(text: Option<String>) -> Vec<T> {
    text.and_then(|t| serde_json::from_str(&t).ok())
        .unwrap_or_default()
}

fn row_to_rule(row: &Row<'_>) -> rusqlite::Result<Rule> {
    Ok(Rule {
        id: row.get(0)?,
        name: row.get(1)?,
        icon: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        color: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        destination: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
        action: RuleAction::from(row.get::<_, Option<String>>(5)?.unwrap_or_default()),
        keep_original: row.get::<_, Option<bool>>(6)?.unwrap_or(false),
        file_types: from_json(row.get(7)?),
        custom_extensions: from_json(row.get(8)?),
        allow_all_files: row.get::<_, Option<bool>>(9)?.unwrap_or(false),
        name_template: from_json(row.get(10)?),
        date_source: DateSource::from(row.get::<_, Option<String>>(11)?.unwrap_or_default()),
        ai_enabled: row.get::<_, Option<bool>>(12)?.unwrap_or(false),
        quick_access: row.get::<_, Option<bool>>(13)?.unwrap_or(false),
        enabled: row.get::<_, Option<bool>>(14)?.unwrap_or(false),
        created_at: row.get::<_, Option<String>>(15)?.unwrap_or_default(),
        updated_at: row.get::<_, Option<String>>(16)?.unwrap_or_default(),
    })
}

/// Inserts `rule`, assigning an id when it has none and stamping both timestamps.
pub fn create_rule(conn: &Connection, mut rule: Rule) -> rusqlite::Result<Rule> {
    if rule.id.trim().is_empty() {
        rule.id = generate_id("rule");
    }
    let now = now_rfc3339();
    rule.created_at = now.clone();
    rule.updated_at = now;

    conn.execute(
        &format!(
            "INSERT INTO rules ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
            RULE_COLUMNS
        ),
        params![
            rule.id,
            rule.name,
            rule.icon,
            rule.color,
            rule.destination,
            rule.action.as_str(),
            rule.keep_original,
            to_json(&rule.file_types),
            to_json(&rule.custom_extensions),
            rule.allow_all_files,
            to_json(&rule.name_template),
            rule.date_source.as_str(),
            rule.ai_enabled,
            rule.quick_access,
            rule.enabled,
            rule.created_at,
            rule.updated_at,
        ],
    )?;
    Ok(rule)
}

/// Overwrites every user field of rule `id`; `None` when it does not exist.
pub fn update_rule(conn: &Connection, id: &str, rule: Rule) -> rusqlite::Result<Option<Rule>> {
    let changed = conn.execute(
        "UPDATE rules SET
            name = ?1, icon = ?2, color = ?3, destination = ?4, action = ?5,
            keep_original = ?6, file_types = ?7, custom_extensions = ?8,
            allow_all_files = ?9, name_template = ?10, date_source = ?11,
            ai_enabled = ?12, quick_access = ?13, enabled = ?14, updated_at = ?15
         WHERE id = ?16",
        params![
            rule.name,
            rule.icon,
            rule.color,
            rule.destination,
            rule.action.as_str(),
            rule.keep_original,
            to_json(&rule.file_types),
            to_json(&rule.custom_extensions),
            rule.allow_all_files,
            to_json(&rule.name_template),
            rule.date_source.as_str(),
            rule.ai_enabled,
            rule.quick_access,
            rule.enabled,
            now_rfc3339(),
            id,
        ],
    )?;

    if changed == 0 {
        return Ok(None);
    }
    get_rule(conn, id)
}

/// `false` when no rule had that id
pub fn delete_rule(conn: &Connection, id: &str) -> rusqlite::Result<bool> {
    let changed = conn.execute("DELETE FROM rules WHERE id = ?1", params![id])?;
    Ok(changed > 0)
}

pub fn get_rule(conn: &Connection, id: &str) -> rusqlite::Result<Option<Rule>> {
    conn.query_row(
        &format!("SELECT {} FROM rules WHERE id = ?1", RULE_COLUMNS),
        params![id],
        row_to_rule,
    )
    .optional()
}

/// All rules in creation order, the order the matcher expects
pub fn get_rules(conn: &Connection) -> rusqlite::Result<Vec<Rule>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM rules ORDER BY created_at ASC, rowid ASC",
        RULE_COLUMNS
    ))?;
    let rules = stmt
        .query_map([], row_to_rule)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rules)
}
