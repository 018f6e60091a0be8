use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbPool;
use crate::error::{AppError, AppResult};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

impl Tag {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Tag {
            id: row.get("id")?,
            name: row.get("name")?,
        })
    }

    pub fn find_by_id(pool: &DbPool, id: i64) -> Option<Self> {
        let conn = pool.get().ok()?;
        conn.query_row("SELECT * FROM tags WHERE id = ?1", params![id], Self::from_row)
            .ok()
    }

    pub fn list(pool: &DbPool) -> Vec<Self> {
        let conn = match pool.get() {
            Ok(c) => c,
            Err(_) => return vec![],
        };
        let mut stmt = match conn.prepare("SELECT * FROM tags ORDER BY name") {
            Ok(s) => s,
            Err(_) => return vec![],
        };
        stmt.query_map([], Self::from_row)
            .map(|rows| rows.filter_map(|r| r.ok()).collect())
            .unwrap_or_default()
    }

    pub fn for_blog(pool: &DbPool, blog_id: i64) -> Vec<Self> {
        let conn = match pool.get() {
            Ok(c) => c,
            Err(_) => return vec![],
        };
        conn.prepare(
            "SELECT t.* FROM tags t
             JOIN blog_tags bt ON bt.tag_id = t.id
             WHERE bt.blog_id = ?1 ORDER BY t.name",
        )
        .and_then(|mut stmt| {
            stmt.query_map(params![blog_id], Self::from_row)
                .map(|rows| rows.filter_map(|r| r.ok()).collect())
        })
        .unwrap_or_default()
    }

    pub fn count_blogs(pool: &DbPool, tag_id: i64) -> i64 {
        let conn = match pool.get() {
            Ok(c) => c,
            Err(_) => return 0,
        };
        conn.query_row(
            "SELECT COUNT(*) FROM blog_tags WHERE tag_id = ?1",
            params![tag_id],
            |row| row.get(0),
        )
        .unwrap_or(0)
    }

    pub fn create(pool: &DbPool, name: &str) -> AppResult<i64> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::validation("Tag name is required"));
        }
        let conn = pool.get()?;
        conn.execute("INSERT INTO tags (name) VALUES (?1)", params![name])
            .map_err(|e| match AppError::from(e) {
                AppError::Conflict(_) => AppError::Conflict(format!("Tag '{}' already exists", name)),
                other => other,
            })?;
        Ok(conn.last_insert_rowid())
    }

    /// Only the blog associations go with the tag; blogs are untouched.
    pub fn delete(pool: &DbPool, id: i64) -> AppResult<Self> {
        let existing = Self::find_by_id(pool, id).ok_or(AppError::NotFound)?;
        let mut conn = pool.get()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM blog_tags WHERE tag_id = ?1", params![id])?;
        tx.execute("DELETE FROM tags WHERE id = ?1", params![id])?;
        tx.commit()?;
        Ok(existing)
    }

    /// Find a tag by name or create it, on the caller's connection so it can
    /// join an enclosing transaction.
    pub fn find_or_create(conn: &Connection, name: &str) -> rusqlite::Result<i64> {
        let name = name.trim();
        if let Some(id) = conn
            .query_row("SELECT id FROM tags WHERE name = ?1 COLLATE NOCASE", params![name], |r| r.get(0))
            .optional()?
        {
            return Ok(id);
        }
        conn.execute("INSERT INTO tags (name) VALUES (?1)", params![name])?;
        Ok(conn.last_insert_rowid())
    }

    /// Split a comma-separated tag field into distinct, trimmed names.
    pub fn parse_names(raw: &str) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for n in raw.split(',') {
            let n = n.trim();
            if !n.is_empty() && !names.iter().any(|existing| existing.eq_ignore_ascii_case(n)) {
                names.push(n.to_string());
            }
        }
        names
    }
}
