use rusqlite::{params, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbPool;
use crate::error::{AppError, AppResult};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

/// Category with the number of blogs filed under it.
#[derive(Debug, Serialize, Clone)]
pub struct CategoryUsage {
    pub id: i64,
    pub name: String,
    pub blog_count: i64,
}

impl Category {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Category {
            id: row.get("id")?,
            name: row.get("name")?,
        })
    }

    pub fn find_by_id(pool: &DbPool, id: i64) -> Option<Self> {
        let conn = pool.get().ok()?;
        conn.query_row(
            "SELECT * FROM categories WHERE id = ?1",
            params![id],
            Self::from_row,
        )
        .ok()
    }

    pub fn list(pool: &DbPool) -> Vec<Self> {
        let conn = match pool.get() {
            Ok(c) => c,
            Err(_) => return vec![],
        };
        conn.prepare("SELECT * FROM categories ORDER BY name")
            .and_then(|mut stmt| {
                stmt.query_map([], Self::from_row)
                    .map(|rows| rows.filter_map(|r| r.ok()).collect())
            })
            .unwrap_or_default()
    }

    pub fn list_with_usage(pool: &DbPool) -> Vec<CategoryUsage> {
        let conn = match pool.get() {
            Ok(c) => c,
            Err(_) => return vec![],
        };
        conn.prepare(
            "SELECT c.id, c.name, COUNT(b.id) AS blog_count
             FROM categories c LEFT JOIN blogs b ON b.category_id = c.id
             GROUP BY c.id ORDER BY c.name",
        )
        .and_then(|mut stmt| {
            stmt.query_map([], |row| {
                Ok(CategoryUsage {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    blog_count: row.get(2)?,
                })
            })
            .map(|rows| rows.filter_map(|r| r.ok()).collect())
        })
        .unwrap_or_default()
    }

    pub fn create(pool: &DbPool, name: &str) -> AppResult<i64> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::validation("Category name is required"));
        }
        let conn = pool.get()?;
        conn.execute("INSERT INTO categories (name) VALUES (?1)", params![name])
            .map_err(|e| match AppError::from(e) {
                AppError::Conflict(_) => {
                    AppError::Conflict(format!("Category '{}' already exists", name))
                }
                other => other,
            })?;
        Ok(conn.last_insert_rowid())
    }

    /// Blogs filed under the category keep existing with no category.
    pub fn delete(pool: &DbPool, id: i64) -> AppResult<Self> {
        let existing = Self::find_by_id(pool, id).ok_or(AppError::NotFound)?;
        let conn = pool.get()?;
        conn.execute("DELETE FROM categories WHERE id = ?1", params![id])?;
        Ok(existing)
    }
}
