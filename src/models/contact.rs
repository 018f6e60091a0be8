use chrono::{NaiveDateTime, Utc};
use rusqlite::{params, Row};
use serde::Serialize;

use crate::db::DbPool;
use crate::error::{AppError, AppResult};

#[derive(Debug, Serialize, Clone)]
pub struct ContactMessage {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub subject: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub subject: String,
    pub message: String,
}

impl ContactMessage {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(ContactMessage {
            id: row.get("id")?,
            name: row.get("name")?,
            email: row.get("email")?,
            phone: row.get("phone")?,
            subject: row.get("subject")?,
            message: row.get("message")?,
            is_read: row.get::<_, i64>("is_read")? != 0,
            created_at: row.get("created_at")?,
        })
    }

    /// Timestamp comes from the server clock, never the client.
    pub fn create(pool: &DbPool, form: &ContactForm) -> AppResult<i64> {
        let conn = pool.get()?;
        conn.execute(
            "INSERT INTO contact_messages (name, email, phone, subject, message, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                form.name,
                form.email,
                form.phone,
                form.subject,
                form.message,
                Utc::now().naive_utc()
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn list(pool: &DbPool) -> Vec<Self> {
        let conn = match pool.get() {
            Ok(c) => c,
            Err(_) => return vec![],
        };
        conn.prepare("SELECT * FROM contact_messages ORDER BY created_at DESC, id DESC")
            .and_then(|mut stmt| {
                stmt.query_map([], Self::from_row)
                    .map(|rows| rows.filter_map(|r| r.ok()).collect())
            })
            .unwrap_or_default()
    }

    pub fn count(pool: &DbPool, unread_only: bool) -> i64 {
        let conn = match pool.get() {
            Ok(c) => c,
            Err(_) => return 0,
        };
        let sql = if unread_only {
            "SELECT COUNT(*) FROM contact_messages WHERE is_read = 0"
        } else {
            "SELECT COUNT(*) FROM contact_messages"
        };
        conn.query_row(sql, [], |row| row.get(0)).unwrap_or(0)
    }

    pub fn mark_read(pool: &DbPool, id: i64) -> AppResult<()> {
        let conn = pool.get()?;
        let changed = conn.execute(
            "UPDATE contact_messages SET is_read = 1 WHERE id = ?1",
            params![id],
        )?;
        if changed == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}
