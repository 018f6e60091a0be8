use rusqlite::params;
use serde::Serialize;

use crate::db::DbPool;
use crate::error::AppResult;

/// Key/value rows in the `settings` table.
pub struct Setting;

/// Public-facing site identity, rendered into every page.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SiteIdentity {
    pub site_name: String,
    pub site_tagline: String,
    pub contact_email: String,
    pub site_url: String,
}

impl Default for SiteIdentity {
    fn default() -> Self {
        SiteIdentity {
            site_name: "Leadsite".to_string(),
            site_tagline: String::new(),
            contact_email: String::new(),
            site_url: String::new(),
        }
    }
}

impl SiteIdentity {
    pub fn is_https(&self) -> bool {
        self.site_url.starts_with("https://")
    }
}

impl Setting {
    pub fn get(pool: &DbPool, key: &str) -> Option<String> {
        let conn = pool.get().ok()?;
        conn.query_row(
            "SELECT value FROM settings WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .ok()
    }

    /// Parsed integer value, `default` when missing or malformed.
    pub fn get_i64(pool: &DbPool, key: &str, default: i64) -> i64 {
        Self::get(pool, key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    pub fn set(pool: &DbPool, key: &str, value: &str) -> AppResult<()> {
        let conn = pool.get()?;
        conn.execute(
            "INSERT INTO settings (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = ?2",
            params![key, value],
        )?;
        Ok(())
    }

    /// The identity keys in one query. Missing or NULL rows keep the defaults.
    pub fn identity(pool: &DbPool) -> SiteIdentity {
        let mut identity = SiteIdentity::default();
        let conn = match pool.get() {
            Ok(c) => c,
            Err(_) => return identity,
        };
        let rows: Vec<(String, Option<String>)> = conn
            .prepare(
                "SELECT key, value FROM settings
                 WHERE key IN ('site_name', 'site_tagline', 'contact_email', 'site_url')",
            )
            .and_then(|mut stmt| {
                stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
                    .map(|rows| rows.filter_map(|r| r.ok()).collect())
            })
            .unwrap_or_default();

        for (key, value) in rows {
            let Some(value) = value else { continue };
            match key.as_str() {
                "site_name" if !value.trim().is_empty() => identity.site_name = value,
                "site_tagline" => identity.site_tagline = value,
                "contact_email" => identity.contact_email = value,
                "site_url" => identity.site_url = value.trim_end_matches('/').to_string(),
                _ => {}
            }
        }
        identity
    }
}
