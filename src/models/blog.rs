use chrono::{NaiveDateTime, Utc};
use rusqlite::types::ToSql;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;

use super::category::Category;
use super::tag::Tag;
use super::{like_pattern, Page};
use crate::db::DbPool;
use crate::error::{AppError, AppResult};

pub const BLOGS_PER_PAGE: i64 = 6;
pub const ADMIN_BLOGS_PER_PAGE: i64 = 20;
pub const RELATED_LIMIT: i64 = 3;

#[derive(Debug, Serialize, Clone)]
pub struct Blog {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub short_description: String,
    pub content: String,
    pub image_url: Option<String>,
    pub category_id: Option<i64>,
    pub category_name: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Default)]
pub struct BlogForm {
    pub title: String,
    pub short_description: String,
    pub content: String,
    pub image_url: Option<String>,
    pub category_id: Option<i64>,
    pub tag_names: Vec<String>,
}

/// Public listing filters.
#[derive(Debug, Clone, Default)]
pub struct BlogQuery {
    pub search: Option<String>,
    pub category: Option<String>,
}

/// URL-safe slug: lowercase ASCII, diacritics transliterated, runs of
/// anything else collapsed to a single hyphen.
pub fn slugify_title(title: &str) -> String {
    slug::slugify(title.trim())
}

const SELECT_BLOG: &str = "SELECT b.id, b.title, b.slug, b.short_description, b.content,
            b.image_url, b.category_id, c.name AS category_name, b.created_at
     FROM blogs b LEFT JOIN categories c ON c.id = b.category_id";

fn slug_conflict(slug: &str) -> AppError {
    AppError::Conflict(format!(
        "A blog post with the slug '{}' already exists. Choose a different title.",
        slug
    ))
}

impl Blog {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Blog {
            id: row.get("id")?,
            title: row.get("title")?,
            slug: row.get("slug")?,
            short_description: row.get("short_description")?,
            content: row.get("content")?,
            image_url: row.get("image_url")?,
            category_id: row.get("category_id")?,
            category_name: row.get("category_name")?,
            created_at: row.get("created_at")?,
        })
    }

    pub fn find_by_id(pool: &DbPool, id: i64) -> Option<Self> {
        let conn = pool.get().ok()?;
        conn.query_row(
            &format!("{} WHERE b.id = ?1", SELECT_BLOG),
            params![id],
            Self::from_row,
        )
        .ok()
    }

    pub fn find_by_slug(pool: &DbPool, slug: &str) -> Option<Self> {
        let conn = pool.get().ok()?;
        conn.query_row(
            &format!("{} WHERE b.slug = ?1", SELECT_BLOG),
            params![slug],
            Self::from_row,
        )
        .ok()
    }

    fn filter_clause(query: &BlogQuery) -> (String, Vec<Box<dyn ToSql>>) {
        let mut sql = String::from(" WHERE 1=1");
        let mut params_vec: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(term) = query.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            params_vec.push(Box::new(like_pattern(&term.to_lowercase())));
            sql.push_str(&format!(
                " AND fold_case(b.title) LIKE ?{} ESCAPE '\\'",
                params_vec.len()
            ));
        }
        if let Some(cat) = query.category.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            params_vec.push(Box::new(cat.to_string()));
            sql.push_str(&format!(" AND c.name = ?{}", params_vec.len()));
        }
        (sql, params_vec)
    }

    pub fn count(pool: &DbPool, query: &BlogQuery) -> i64 {
        let conn = match pool.get() {
            Ok(c) => c,
            Err(_) => return 0,
        };
        let (where_sql, params_vec) = Self::filter_clause(query);
        let param_refs: Vec<&dyn ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
        conn.query_row(
            &format!(
                "SELECT COUNT(*) FROM blogs b LEFT JOIN categories c ON c.id = b.category_id{}",
                where_sql
            ),
            param_refs.as_slice(),
            |row| row.get(0),
        )
        .unwrap_or(0)
    }

    /// Newest first, `id` as tie-break.
    pub fn list(pool: &DbPool, query: &BlogQuery, page: i64, per_page: i64) -> Page<Self> {
        let page = page.max(1);
        let total = Self::count(pool, query);
        let conn = match pool.get() {
            Ok(c) => c,
            Err(_) => return Page::new(vec![], page, per_page, 0),
        };

        let (where_sql, mut params_vec) = Self::filter_clause(query);
        let idx = params_vec.len();
        let sql = format!(
            "{}{} ORDER BY b.created_at DESC, b.id DESC LIMIT ?{} OFFSET ?{}",
            SELECT_BLOG,
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

    /// Up to `RELATED_LIMIT` other posts in the same category.
    pub fn related(pool: &DbPool, blog: &Blog) -> Vec<Self> {
        let category_id = match blog.category_id {
            Some(id) => id,
            None => return vec![],
        };
        let conn = match pool.get() {
            Ok(c) => c,
            Err(_) => return vec![],
        };
        conn.prepare(&format!(
            "{} WHERE b.category_id = ?1 AND b.id != ?2
             ORDER BY b.created_at DESC, b.id DESC LIMIT ?3",
            SELECT_BLOG
        ))
        .and_then(|mut stmt| {
            stmt.query_map(params![category_id, blog.id, RELATED_LIMIT], Self::from_row)
                .map(|rows| rows.filter_map(|r| r.ok()).collect())
        })
        .unwrap_or_default()
    }

    pub fn count_all(pool: &DbPool) -> i64 {
        Self::count(pool, &BlogQuery::default())
    }

    fn validate(pool: &DbPool, form: &BlogForm) -> AppResult<String> {
        if form.title.trim().is_empty() {
            return Err(AppError::validation("Title is required"));
        }
        let slug = slugify_title(&form.title);
        if slug.is_empty() {
            return Err(AppError::validation(
                "Title must contain at least one letter or digit",
            ));
        }
        if let Some(raw) = form.image_url.as_deref() {
            match url::Url::parse(raw) {
                Ok(u) if u.scheme() == "http" || u.scheme() == "https" => {}
                _ => return Err(AppError::validation("Image URL must be an http(s) link")),
            }
        }
        if let Some(cat_id) = form.category_id {
            if Category::find_by_id(pool, cat_id).is_none() {
                return Err(AppError::validation("Selected category does not exist"));
            }
        }
        Ok(slug)
    }

    fn reload(conn: &Connection, id: i64) -> AppResult<Self> {
        conn.query_row(
            &format!("{} WHERE b.id = ?1", SELECT_BLOG),
            params![id],
            Self::from_row,
        )
        .map_err(AppError::from)
    }

    fn set_tags(conn: &Connection, blog_id: i64, tag_names: &[String]) -> rusqlite::Result<()> {
        conn.execute("DELETE FROM blog_tags WHERE blog_id = ?1", params![blog_id])?;
        for name in tag_names {
            let tag_id = Tag::find_or_create(conn, name)?;
            conn.execute(
                "INSERT OR IGNORE INTO blog_tags (blog_id, tag_id) VALUES (?1, ?2)",
                params![blog_id, tag_id],
            )?;
        }
        Ok(())
    }

    /// Insert the post and its tag links in one transaction. The slug is
    /// derived from the title; a taken slug is a `Conflict`.
    pub fn create(pool: &DbPool, form: &BlogForm) -> AppResult<Self> {
        let slug = Self::validate(pool, form)?;
        let mut conn = pool.get()?;
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO blogs (title, slug, short_description, content, image_url, category_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                form.title.trim(),
                slug,
                form.short_description,
                form.content,
                form.image_url,
                form.category_id,
                Utc::now().naive_utc()
            ],
        )
        .map_err(|e| match AppError::from(e) {
            AppError::Conflict(_) => slug_conflict(&slug),
            other => other,
        })?;
        let id = tx.last_insert_rowid();
        Self::set_tags(&tx, id, &form.tag_names)?;
        tx.commit()?;

        Self::reload(&conn, id)
    }

    /// Save over an existing post; the slug is re-derived from the new title.
    pub fn update(pool: &DbPool, id: i64, form: &BlogForm) -> AppResult<Self> {
        let slug = Self::validate(pool, form)?;
        let mut conn = pool.get()?;
        let tx = conn.transaction()?;

        let exists: Option<i64> = tx
            .query_row("SELECT id FROM blogs WHERE id = ?1", params![id], |r| r.get(0))
            .optional()?;
        if exists.is_none() {
            return Err(AppError::NotFound);
        }

        tx.execute(
            "UPDATE blogs SET title = ?1, slug = ?2, short_description = ?3, content = ?4,
                 image_url = ?5, category_id = ?6
             WHERE id = ?7",
            params![
                form.title.trim(),
                slug,
                form.short_description,
                form.content,
                form.image_url,
                form.category_id,
                id
            ],
        )
        .map_err(|e| match AppError::from(e) {
            AppError::Conflict(_) => slug_conflict(&slug),
            other => other,
        })?;
        Self::set_tags(&tx, id, &form.tag_names)?;
        tx.commit()?;

        Self::reload(&conn, id)
    }

    /// Removes the post and its tag links; categories and tags stay.
    pub fn delete(pool: &DbPool, id: i64) -> AppResult<Self> {
        let existing = Self::find_by_id(pool, id).ok_or(AppError::NotFound)?;
        let mut conn = pool.get()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM blog_tags WHERE blog_id = ?1", params![id])?;
        tx.execute("DELETE FROM blogs WHERE id = ?1", params![id])?;
        tx.commit()?;
        Ok(existing)
    }
}
