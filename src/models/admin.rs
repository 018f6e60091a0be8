use rusqlite::{params, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbPool;
use crate::error::{AppError, AppResult};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Admin {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_admin: bool,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone)]
pub struct NewAdmin {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
    pub is_admin: bool,
}

impl Admin {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Admin {
            id: row.get("id")?,
            name: row.get("name")?,
            email: row.get("email")?,
            phone: row.get("phone")?,
            password_hash: row.get("password_hash")?,
            is_admin: row.get::<_, i64>("is_admin")? != 0,
            is_active: row.get::<_, i64>("is_active")? != 0,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    const SELECT_COLS: &'static str =
        "id, name, email, phone, password_hash, is_admin, is_active, created_at, updated_at";

    // ── Lookups ──

    pub fn get_by_id(pool: &DbPool, id: i64) -> Option<Admin> {
        let conn = pool.get().ok()?;
        conn.query_row(
            &format!("SELECT {} FROM admins WHERE id = ?1", Self::SELECT_COLS),
            params![id],
            Self::from_row,
        )
        .ok()
    }

    /// Email lookup is case-insensitive; stored emails are normalised to lowercase.
    pub fn get_by_email(pool: &DbPool, email: &str) -> Option<Admin> {
        let conn = pool.get().ok()?;
        conn.query_row(
            &format!("SELECT {} FROM admins WHERE email = ?1", Self::SELECT_COLS),
            params![email.trim().to_lowercase()],
            Self::from_row,
        )
        .ok()
    }

    pub fn count(pool: &DbPool) -> i64 {
        let conn = match pool.get() {
            Ok(c) => c,
            Err(_) => return 0,
        };
        conn.query_row("SELECT COUNT(*) FROM admins", [], |row| row.get(0))
            .unwrap_or(0)
    }

    // ── Create ──

    pub fn create(pool: &DbPool, new: &NewAdmin) -> AppResult<i64> {
        let conn = pool.get()?;
        conn.execute(
            "INSERT INTO admins (name, email, phone, password_hash, is_admin, is_active)
             VALUES (?1, ?2, ?3, ?4, ?5, 1)",
            params![
                new.name.trim(),
                new.email.trim().to_lowercase(),
                new.phone.trim(),
                new.password_hash,
                new.is_admin as i64
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    // ── Credentials ──

    /// Update email and/or password hash, then drop every session of this admin.
    /// Both writes commit together.
    pub fn update_credentials(
        pool: &DbPool,
        id: i64,
        email: Option<&str>,
        password_hash: Option<&str>,
    ) -> AppResult<()> {
        let mut conn = pool.get()?;
        let tx = conn.transaction()?;

        let exists: Option<i64> = tx
            .query_row("SELECT id FROM admins WHERE id = ?1", params![id], |r| r.get(0))
            .optional()?;
        if exists.is_none() {
            return Err(AppError::NotFound);
        }

        if let Some(email) = email {
            tx.execute(
                "UPDATE admins SET email = ?1, updated_at = CURRENT_TIMESTAMP WHERE id = ?2",
                params![email.trim().to_lowercase(), id],
            )
            .map_err(|e| match AppError::from(e) {
                AppError::Conflict(_) => {
                    AppError::Conflict("That email is already in use".to_string())
                }
                other => other,
            })?;
        }
        if let Some(hash) = password_hash {
            tx.execute(
                "UPDATE admins SET password_hash = ?1, updated_at = CURRENT_TIMESTAMP WHERE id = ?2",
                params![hash, id],
            )?;
        }
        tx.execute("DELETE FROM sessions WHERE admin_id = ?1", params![id])?;
        tx.commit()?;
        Ok(())
    }
}
