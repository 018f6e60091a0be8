use chrono::{NaiveDateTime, Utc};
use rusqlite::{params, Row};
use serde::Serialize;

use crate::db::DbPool;
use crate::error::AppResult;

/// Most recent entries shown on the audit log page.
pub const AUDIT_VIEW_LIMIT: i64 = 200;

#[derive(Debug, Serialize, Clone)]
pub struct AuditEntry {
    pub id: i64,
    pub admin_email: String,
    pub action: String,
    pub ip_address: Option<String>,
    pub created_at: NaiveDateTime,
}

impl AuditEntry {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(AuditEntry {
            id: row.get("id")?,
            admin_email: row.get("admin_email")?,
            action: row.get("action")?,
            ip_address: row.get("ip_address")?,
            created_at: row.get("created_at")?,
        })
    }

    /// Append one row. The table has no update or delete path.
    pub fn append(
        pool: &DbPool,
        admin_email: &str,
        action: &str,
        ip_address: Option<&str>,
    ) -> AppResult<i64> {
        let conn = pool.get()?;
        conn.execute(
            "INSERT INTO audit_logs (admin_email, action, ip_address, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![admin_email, action, ip_address, Utc::now().naive_utc()],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn recent(pool: &DbPool, limit: i64) -> Vec<Self> {
        let conn = match pool.get() {
            Ok(c) => c,
            Err(_) => return vec![],
        };
        conn.prepare("SELECT * FROM audit_logs ORDER BY created_at DESC, id DESC LIMIT ?1")
            .and_then(|mut stmt| {
                stmt.query_map(params![limit], Self::from_row)
                    .map(|rows| rows.filter_map(|r| r.ok()).collect())
            })
            .unwrap_or_default()
    }

    pub fn count(pool: &DbPool) -> i64 {
        let conn = match pool.get() {
            Ok(c) => c,
            Err(_) => return 0,
        };
        conn.query_row("SELECT COUNT(*) FROM audit_logs", [], |row| row.get(0))
            .unwrap_or(0)
    }
}
