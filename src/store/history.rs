use rusqlite::{params, Connection};

use crate::models::{HistoryRecord, NewHistoryRecord};

/// Most records returned by [`get_history`]
pub const HISTORY_LIMIT: usize = 100;

pub fn save_history(conn: &Connection, record: &NewHistoryRecord) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO history (original_path, original_name, new_path, new_name, rule_name, action, status)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            record.original_path,
            record.original_name,
            record.new_path,
            record.new_name,
            record.rule_name,
            record.action.as_str(),
            record.status.as_str(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Newest first, at most `limit` rows, timestamps in local time
pub fn get_history(conn: &Connection, limit: usize) -> rusqlite::Result<Vec<HistoryRecord>> {
    let mut stmt = conn.prepare(
        "SELECT id, original_path, original_name, new_path, new_name, rule_name, action, status,
                strftime('%Y-%m-%d %H:%M:%S', timestamp, 'localtime')
         FROM history
         ORDER BY timestamp DESC, id DESC
         LIMIT ?1",
    )?;

    let records = stmt
        .query_map(params![limit as i64], |row| {
            Ok(HistoryRecord {
                id: row.get(0)?,
                original_path: row.get(1)?,
                original_name: row.get(2)?,
                new_path: row.get(3)?,
                new_name: row.get(4)?,
                rule_name: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
                action: row.get(6)?,
                status: row.get(7)?,
                timestamp: row.get::<_, Option<String>>(8)?.unwrap_or_default(),
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(records)
}

pub fn clear_history(conn: &Connection) -> rusqlite::Result<usize> {
    conn.execute("DELETE FROM history", [])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HistoryStatus, RuleAction};
    use crate::store::migrations::run_migrations;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn record(name: &str, status: HistoryStatus) -> NewHistoryRecord {
        NewHistoryRecord {
            original_path: format!("/in/{}", name),
            original_name: name.to_string(),
            new_path: format!("/out/{}", name),
            new_name: name.to_string(),
            rule_name: "Default rule".to_string(),
            action: RuleAction::Copy,
            status,
        }
    }

    #[test]
    fn test_newest_first() {
        let conn = setup();
        save_history(&conn, &record("a.txt", HistoryStatus::Success)).unwrap();
        save_history(&conn, &record("b.txt", HistoryStatus::Failed)).unwrap();

        let records = get_history(&conn, HISTORY_LIMIT).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].original_name, "b.txt");
        assert_eq!(records[0].status, "failed");
        assert_eq!(records[1].action, "copy");
        assert_eq!(records[1].timestamp.len(), "2024-01-01 00:00:00".len());
    }

    #[test]
    fn test_limit() {
        let conn = setup();
        for i in 0..5 {
            save_history(&conn, &record(&format!("{}.txt", i), HistoryStatus::Success)).unwrap();
        }
        let records = get_history(&conn, 3).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].original_name, "4.txt");
    }

    #[test]
    fn test_clear() {
        let conn = setup();
        save_history(&conn, &record("a.txt", HistoryStatus::Success)).unwrap();
        assert_eq!(clear_history(&conn).unwrap(), 1);
        assert!(get_history(&conn, HISTORY_LIMIT).unwrap().is_empty());
    }
}
