use chrono::NaiveDateTime;
use rusqlite::types::ToSql;
use rusqlite::{params, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use super::{like_pattern, Page};
use crate::db::DbPool;
use crate::error::{AppError, AppResult};

pub const INQUIRIES_PER_PAGE: i64 = 10;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Inquiry {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: Option<String>,
    pub project_types: Vec<String>,
    pub features: Vec<String>,
    pub addons: Vec<String>,
    pub selected_plan: Option<String>,
    pub timeline: Option<String>,
    pub budget: Option<String>,
    pub message: Option<String>,
    pub is_contacted: bool,
    pub created_at: NaiveDateTime,
}

/// Validated inquiry ready to persist.
#[derive(Debug, Clone, Default)]
pub struct InquiryForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: Option<String>,
    pub project_types: Vec<String>,
    pub features: Vec<String>,
    pub addons: Vec<String>,
    pub selected_plan: Option<String>,
    pub timeline: Option<String>,
    pub budget: Option<String>,
    pub message: Option<String>,
}

/// Contacted/pending filter for the admin listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactedFilter {
    Contacted,
    Pending,
}

impl ContactedFilter {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "contacted" => Some(ContactedFilter::Contacted),
            "pending" => Some(ContactedFilter::Pending),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContactedFilter::Contacted => "contacted",
            ContactedFilter::Pending => "pending",
        }
    }
}

fn encode_list(values: &[String]) -> String {
    serde_json::to_string(values).unwrap_or_else(|_| "[]".to_string())
}

fn decode_list(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}

impl Inquiry {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Inquiry {
            id: row.get("id")?,
            name: row.get("name")?,
            email: row.get("email")?,
            phone: row.get("phone")?,
            company: row.get("company")?,
            project_types: decode_list(&row.get::<_, String>("project_types")?),
            features: decode_list(&row.get::<_, String>("features")?),
            addons: decode_list(&row.get::<_, String>("addons")?),
            selected_plan: row.get("selected_plan")?,
            timeline: row.get("timeline")?,
            budget: row.get("budget")?,
            message: row.get("message")?,
            is_contacted: row.get::<_, i64>("is_contacted")? != 0,
            created_at: row.get("created_at")?,
        })
    }

    pub fn find_by_id(pool: &DbPool, id: i64) -> Option<Self> {
        let conn = pool.get().ok()?;
        conn.query_row(
            "SELECT * FROM project_inquiries WHERE id = ?1",
            params![id],
            Self::from_row,
        )
        .ok()
    }

    pub fn create(pool: &DbPool, form: &InquiryForm) -> AppResult<i64> {
        let conn = pool.get()?;
        conn.execute(
            "INSERT INTO project_inquiries
                (name, email, phone, company, project_types, features, addons,
                 selected_plan, timeline, budget, message)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                form.name,
                form.email,
                form.phone,
                form.company,
                encode_list(&form.project_types),
                encode_list(&form.features),
                encode_list(&form.addons),
                form.selected_plan,
                form.timeline,
                form.budget,
                form.message,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Builds the shared WHERE clause for search + status filtering.
    fn filter_clause(
        search: Option<&str>,
        status: Option<ContactedFilter>,
    ) -> (String, Vec<Box<dyn ToSql>>) {
        let mut sql = String::from(" WHERE 1=1");
        let mut params_vec: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(term) = search.map(str::trim).filter(|t| !t.is_empty()) {
            let pattern = like_pattern(&term.to_lowercase());
            sql.push_str(&format!(
                " AND (fold_case(name) LIKE ?{} ESCAPE '\\' OR fold_case(email) LIKE ?{} ESCAPE '\\')",
                params_vec.len() + 1,
                params_vec.len() + 2
            ));
            params_vec.push(Box::new(pattern.clone()));
            params_vec.push(Box::new(pattern));
        }
        match status {
            Some(ContactedFilter::Contacted) => sql.push_str(" AND is_contacted = 1"),
            Some(ContactedFilter::Pending) => sql.push_str(" AND is_contacted = 0"),
            None => {}
        }
        (sql, params_vec)
    }

    pub fn count(pool: &DbPool, search: Option<&str>, status: Option<ContactedFilter>) -> i64 {
        let conn = match pool.get() {
            Ok(c) => c,
            Err(_) => return 0,
        };
        let (where_sql, params_vec) = Self::filter_clause(search, status);
        let param_refs: Vec<&dyn ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
        conn.query_row(
            &format!("SELECT COUNT(*) FROM project_inquiries{}", where_sql),
            param_refs.as_slice(),
            |row| row.get(0),
        )
        .unwrap_or(0)
    }

    /// Newest first; `id` breaks ties between rows created in the same second.
    pub fn list(
        pool: &DbPool,
        search: Option<&str>,
        status: Option<ContactedFilter>,
        page: i64,
    ) -> Page<Self> {
        let page = page.max(1);
        let per_page = INQUIRIES_PER_PAGE;
        let total = Self::count(pool, search, status);

        let conn = match pool.get() {
            Ok(c) => c,
            Err(_) => return Page::new(vec![], page, per_page, 0),
        };
        let (where_sql, mut params_vec) = Self::filter_clause(search, status);
        let idx = params_vec.len();
        let sql = format!(
            "SELECT * FROM project_inquiries{} ORDER BY created_at DESC, id DESC LIMIT ?{} OFFSET ?{}",
            where_sql,
            idx + 1,
            idx + 2
        );
        params_vec.push(Box::new(per_page));
        params_vec.push(Box::new((page - 1) * per_page));
        let param_refs: Vec<&dyn ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();

        let items = conn
            .prepare(&sql)
            .and_then(|mut stmt| {
                stmt.query_map(param_refs.as_slice(), Self::from_row)
                    .map(|rows| rows.filter_map(|r| r.ok()).collect())
            })
            .unwrap_or_default();

        Page::new(items, page, per_page, total)
    }

    /// Flip `is_contacted` and return the resulting value.
    pub fn toggle_contacted(pool: &DbPool, id: i64) -> AppResult<bool> {
        let mut conn = pool.get()?;
        let tx = conn.transaction()?;
        let changed = tx.execute(
            "UPDATE project_inquiries SET is_contacted = 1 - is_contacted WHERE id = ?1",
            params![id],
        )?;
        if changed == 0 {
            return Err(AppError::NotFound);
        }
        let now: i64 = tx.query_row(
            "SELECT is_contacted FROM project_inquiries WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )?;
        tx.commit()?;
        Ok(now != 0)
    }

    /// Delete and return the removed row.
    pub fn delete(pool: &DbPool, id: i64) -> AppResult<Self> {
        let mut conn = pool.get()?;
        let tx = conn.transaction()?;
        let existing = tx
            .query_row(
                "SELECT * FROM project_inquiries WHERE id = ?1",
                params![id],
                Self::from_row,
            )
            .optional()?
            .ok_or(AppError::NotFound)?;
        tx.execute("DELETE FROM project_inquiries WHERE id = ?1", params![id])?;
        tx.commit()?;
        Ok(existing)
    }

    pub fn count_by_status(pool: &DbPool, status: Option<ContactedFilter>) -> i64 {
        Self::count(pool, None, status)
    }
}
