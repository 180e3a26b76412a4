//! SQLite persistence for rules, processing history and the template library.

pub mod history;
pub mod migrations;
pub mod rules;
pub mod templates;

use rusqlite::Connection;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use crate::models::{HistoryRecord, NewHistoryRecord, Rule, Template, TemplateComponent};

/// Single-connection store shared by all handlers
pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Open (or create) the database file, creating its directory first
    pub fn open(path: &Path) -> rusqlite::Result<Self> {
        if let Some(parent) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                tracing::warn!("Failed to create database directory {}: {}", parent.display(), e);
            }
        }
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> rusqlite::Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> rusqlite::Result<Self> {
        migrations::run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| {
            tracing::warn!("Store mutex was poisoned, recovering...");
            poisoned.into_inner()
        })
    }

    pub fn create_rule(&self, rule: Rule) -> rusqlite::Result<Rule> {
        rules::create_rule(&self.conn(), rule)
    }

    pub fn update_rule(&self, id: &str, rule: Rule) -> rusqlite::Result<Option<Rule>> {
        rules::update_rule(&self.conn(), id, rule)
    }

    pub fn delete_rule(&self, id: &str) -> rusqlite::Result<bool> {
        rules::delete_rule(&self.conn(), id)
    }

    pub fn get_rule(&self, id: &str) -> rusqlite::Result<Option<Rule>> {
        rules::get_rule(&self.conn(), id)
    }

    pub fn get_rules(&self) -> rusqlite::Result<Vec<Rule>> {
        rules::get_rules(&self.conn())
    }

    pub fn save_history(&self, record: &NewHistoryRecord) -> rusqlite::Result<i64> {
        history::save_history(&self.conn(), record)
    }

    pub fn get_history(&self) -> rusqlite::Result<Vec<HistoryRecord>> {
        history::get_history(&self.conn(), history::HISTORY_LIMIT)
    }

    pub fn clear_history(&self) -> rusqlite::Result<usize> {
        history::clear_history(&self.conn())
    }

    pub fn insert_template(
        &self,
        name: &str,
        components: Vec<TemplateComponent>,
    ) -> rusqlite::Result<Template> {
        templates::insert_template(&self.conn(), name, components)
    }

    pub fn list_templates(&self) -> rusqlite::Result<Vec<Template>> {
        templates::list_templates(&self.conn())
    }

    pub fn delete_template(&self, id: &str) -> rusqlite::Result<bool> {
        templates::delete_template(&self.conn(), id)
    }
}
