use chrono::{NaiveDateTime, Utc};
use rusqlite::{params, Row};
use serde::Serialize;

use crate::db::DbPool;
use crate::error::{AppError, AppResult};

pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 5;

/// How many top-rated reviews the home page shows.
pub const HOME_REVIEW_LIMIT: i64 = 6;

#[derive(Debug, Serialize, Clone)]
pub struct Review {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub rating: i64,
    pub message: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct ReviewForm {
    pub name: String,
    pub email: String,
    pub rating: i64,
    pub message: String,
}

impl Review {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Review {
            id: row.get("id")?,
            name: row.get("name")?,
            email: row.get("email")?,
            rating: row.get("rating")?,
            message: row.get("message")?,
            created_at: row.get("created_at")?,
        })
    }

    pub fn create(pool: &DbPool, form: &ReviewForm) -> AppResult<i64> {
        if !(MIN_RATING..=MAX_RATING).contains(&form.rating) {
            return Err(AppError::validation("Rating must be between 1 and 5"));
        }
        let conn = pool.get()?;
        conn.execute(
            "INSERT INTO reviews (name, email, rating, message, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                form.name,
                form.email,
                form.rating,
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
        conn.prepare("SELECT * FROM reviews ORDER BY created_at DESC, id DESC")
            .and_then(|mut stmt| {
                stmt.query_map([], Self::from_row)
                    .map(|rows| rows.filter_map(|r| r.ok()).collect())
            })
            .unwrap_or_default()
    }

    /// Newest reviews rated strictly above `min_rating`.
    pub fn top_rated(pool: &DbPool, min_rating: i64, limit: i64) -> Vec<Self> {
        let conn = match pool.get() {
            Ok(c) => c,
            Err(_) => return vec![],
        };
        conn.prepare(
            "SELECT * FROM reviews WHERE rating > ?1
             ORDER BY created_at DESC, id DESC LIMIT ?2",
        )
        .and_then(|mut stmt| {
            stmt.query_map(params![min_rating, limit], Self::from_row)
                .map(|rows| rows.filter_map(|r| r.ok()).collect())
        })
        .unwrap_or_default()
    }

    pub fn count(pool: &DbPool) -> i64 {
        let conn = match pool.get() {
            Ok(c) => c,
            Err(_) => return 0,
        };
        conn.query_row("SELECT COUNT(*) FROM reviews", [], |row| row.get(0))
            .unwrap_or(0)
    }
}
