use rusqlite::params;

use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::admin::{Admin, NewAdmin};
use crate::models::audit::AuditEntry;
use crate::models::blog::{Blog, BlogForm, BlogQuery};
use crate::models::category::{Category, CategoryUsage};
use crate::models::contact::{ContactForm, ContactMessage};
use crate::models::inquiry::{ContactedFilter, Inquiry, InquiryForm};
use crate::models::review::{Review, ReviewForm};
use crate::models::settings::{Setting, SiteIdentity};
use crate::models::tag::Tag;
use crate::models::Page;

use super::Store;

/// SQLite-backed implementation of the Store trait.
/// Wraps the r2d2 connection pool and delegates to model methods.
pub struct SqliteStore {
    pub pool: DbPool,
}

impl SqliteStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn new_at(path: &str) -> Result<Self, String> {
        let pool = crate::db::init_pool_at(path)?;
        Ok(Self { pool })
    }
}

impl Store for SqliteStore {
    // ── Lifecycle ───────────────────────────────────────────────────

    fn run_migrations(&self) -> Result<(), String> {
        crate::db::run_migrations(&self.pool).map_err(|e| e.to_string())
    }

    fn seed_defaults(&self) -> Result<(), String> {
        crate::db::seed_defaults(&self.pool).map_err(|e| e.to_string())
    }

    // ── Settings ────────────────────────────────────────────────────

    fn setting_get(&self, key: &str) -> Option<String> {
        Setting::get(&self.pool, key)
    }

    fn setting_set(&self, key: &str, value: &str) -> AppResult<()> {
        Setting::set(&self.pool, key, value)
    }

    fn site_identity(&self) -> SiteIdentity {
        Setting::identity(&self.pool)
    }

    // ── Admins ──────────────────────────────────────────────────────

    fn admin_get_by_id(&self, id: i64) -> Option<Admin> {
        Admin::get_by_id(&self.pool, id)
    }

    fn admin_get_by_email(&self, email: &str) -> Option<Admin> {
        Admin::get_by_email(&self.pool, email)
    }

    fn admin_count(&self) -> i64 {
        Admin::count(&self.pool)
    }

    fn admin_create(&self, new: &NewAdmin) -> AppResult<i64> {
        Admin::create(&self.pool, new)
    }

    fn admin_update_credentials(
        &self,
        id: i64,
        email: Option<&str>,
        password_hash: Option<&str>,
    ) -> AppResult<()> {
        Admin::update_credentials(&self.pool, id, email, password_hash)
    }

    // ── Sessions ────────────────────────────────────────────────────

    fn session_create_full(
        &self,
        admin_id: i64,
        token: &str,
        expires_at: &str,
        ip: Option<&str>,
        user_agent: Option<&str>,
    ) -> AppResult<()> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO sessions (id, admin_id, created_at, expires_at, ip_address, user_agent)
             VALUES (?1, ?2, datetime('now'), ?3, ?4, ?5)",
            params![token, admin_id, expires_at, ip, user_agent],
        )?;
        Ok(())
    }

    fn session_get_admin_id(&self, token: &str) -> Option<i64> {
        let conn = self.pool.get().ok()?;
        conn.query_row(
            "SELECT admin_id FROM sessions WHERE id = ?1 AND expires_at > datetime('now')",
            params![token],
            |row| row.get(0),
        )
        .ok()
    }

    fn session_delete(&self, token: &str) -> AppResult<()> {
        let conn = self.pool.get()?;
        conn.execute("DELETE FROM sessions WHERE id = ?1", params![token])?;
        Ok(())
    }

    fn session_cleanup_expired(&self) {
        if let Ok(conn) = self.pool.get() {
            let _ = conn.execute(
                "DELETE FROM sessions WHERE expires_at <= datetime('now')",
                [],
            );
        }
    }

    // ── Inquiries ───────────────────────────────────────────────────

    fn inquiry_find_by_id(&self, id: i64) -> Option<Inquiry> {
        Inquiry::find_by_id(&self.pool, id)
    }

    fn inquiry_create(&self, form: &InquiryForm) -> AppResult<i64> {
        Inquiry::create(&self.pool, form)
    }

    fn inquiry_list(
        &self,
        search: Option<&str>,
        status: Option<ContactedFilter>,
        page: i64,
    ) -> Page<Inquiry> {
        Inquiry::list(&self.pool, search, status, page)
    }

    fn inquiry_count(&self, status: Option<ContactedFilter>) -> i64 {
        Inquiry::count_by_status(&self.pool, status)
    }

    fn inquiry_toggle_contacted(&self, id: i64) -> AppResult<bool> {
        Inquiry::toggle_contacted(&self.pool, id)
    }

    fn inquiry_delete(&self, id: i64) -> AppResult<Inquiry> {
        Inquiry::delete(&self.pool, id)
    }

    // ── Contact messages ────────────────────────────────────────────

    fn contact_create(&self, form: &ContactForm) -> AppResult<i64> {
        ContactMessage::create(&self.pool, form)
    }

    fn contact_list(&self) -> Vec<ContactMessage> {
        ContactMessage::list(&self.pool)
    }

    fn contact_count(&self, unread_only: bool) -> i64 {
        ContactMessage::count(&self.pool, unread_only)
    }

    fn contact_mark_read(&self, id: i64) -> AppResult<()> {
        ContactMessage::mark_read(&self.pool, id)
    }

    // ── Reviews ─────────────────────────────────────────────────────

    fn review_create(&self, form: &ReviewForm) -> AppResult<i64> {
        Review::create(&self.pool, form)
    }

    fn review_list(&self) -> Vec<Review> {
        Review::list(&self.pool)
    }

    fn review_top_rated(&self, min_rating: i64, limit: i64) -> Vec<Review> {
        Review::top_rated(&self.pool, min_rating, limit)
    }

    fn review_count(&self) -> i64 {
        Review::count(&self.pool)
    }

    // ── Audit log ───────────────────────────────────────────────────

    fn audit_append(&self, admin_email: &str, action: &str, ip: Option<&str>) -> AppResult<i64> {
        AuditEntry::append(&self.pool, admin_email, action, ip)
    }

    fn audit_recent(&self, limit: i64) -> Vec<AuditEntry> {
        AuditEntry::recent(&self.pool, limit)
    }

    fn audit_count(&self) -> i64 {
        AuditEntry::count(&self.pool)
    }

    // ── Blogs ───────────────────────────────────────────────────────

    fn blog_find_by_id(&self, id: i64) -> Option<Blog> {
        Blog::find_by_id(&self.pool, id)
    }

    fn blog_find_by_slug(&self, slug: &str) -> Option<Blog> {
        Blog::find_by_slug(&self.pool, slug)
    }

    fn blog_list(&self, query: &BlogQuery, page: i64, per_page: i64) -> Page<Blog> {
        Blog::list(&self.pool, query, page, per_page)
    }

    fn blog_related(&self, blog: &Blog) -> Vec<Blog> {
        Blog::related(&self.pool, blog)
    }

    fn blog_count(&self) -> i64 {
        Blog::count_all(&self.pool)
    }

    fn blog_create(&self, form: &BlogForm) -> AppResult<Blog> {
        Blog::create(&self.pool, form)
    }

    fn blog_update(&self, id: i64, form: &BlogForm) -> AppResult<Blog> {
        Blog::update(&self.pool, id, form)
    }

    fn blog_delete(&self, id: i64) -> AppResult<Blog> {
        Blog::delete(&self.pool, id)
    }

    // ── Categories ──────────────────────────────────────────────────

    fn category_list(&self) -> Vec<Category> {
        Category::list(&self.pool)
    }

    fn category_list_with_usage(&self) -> Vec<CategoryUsage> {
        Category::list_with_usage(&self.pool)
    }

    fn category_create(&self, name: &str) -> AppResult<i64> {
        Category::create(&self.pool, name)
    }

    fn category_delete(&self, id: i64) -> AppResult<Category> {
        Category::delete(&self.pool, id)
    }

    // ── Tags ────────────────────────────────────────────────────────

    fn tag_list(&self) -> Vec<Tag> {
        Tag::list(&self.pool)
    }

    fn tag_for_blog(&self, blog_id: i64) -> Vec<Tag> {
        Tag::for_blog(&self.pool, blog_id)
    }

    fn tag_count_blogs(&self, tag_id: i64) -> i64 {
        Tag::count_blogs(&self.pool, tag_id)
    }

    fn tag_create(&self, name: &str) -> AppResult<i64> {
        Tag::create(&self.pool, name)
    }

    fn tag_delete(&self, id: i64) -> AppResult<Tag> {
        Tag::delete(&self.pool, id)
    }
}
