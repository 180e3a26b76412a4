use rusqlite::{params, Connection};

use super::rules::{generate_id, now_rfc3339};
use crate::models::{Template, TemplateComponent};
use crate::rules::template::preview_components;

pub fn insert_template(
    conn: &Connection,
    name: &str,
    components: Vec<TemplateComponent>,
) -> rusqlite::Result<Template> {
    let template = Template {
        id: generate_id("template"),
        name: name.to_string(),
        preview: preview_components(&components),
        components,
        created_at: now_rfc3339(),
    };

    let components_json = serde_json::to_string(&template.components)
        .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
    conn.execute(
        "INSERT INTO templates (id, name, components, preview, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            template.id,
            template.name,
            components_json,
            template.preview,
            template.created_at,
        ],
    )?;
    Ok(template)
}

pub fn list_templates(conn: &Connection) -> rusqlite::Result<Vec<Template>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, components, preview, created_at FROM templates ORDER BY created_at ASC, rowid ASC",
    )?;
    let templates = stmt
        .query_map([], |row| {
            let components: String = row.get(2)?;
            Ok(Template {
                id: row.get(0)?,
                name: row.get(1)?,
                components: serde_json::from_str(&components).unwrap_or_default(),
                preview: row.get(3)?,
                created_at: row.get(4)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(templates)
}

/// `false` when no template had that id
pub fn delete_template(conn: &Connection, id: &str) -> rusqlite::Result<bool> {
    let changed = conn.execute("DELETE FROM templates WHERE id = ?1", params![id])?;
    Ok(changed > 0)
}
