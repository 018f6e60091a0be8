use serde::Serialize;

use crate::error::AppResult;
use crate::models::admin::{Admin, NewAdmin};
use crate::models::audit::AuditEntry;
use crate::models::blog::{Blog, BlogForm, BlogQuery};
use crate::models::category::{Category, CategoryUsage};
use crate::models::contact::{ContactForm, ContactMessage};
use crate::models::inquiry::{ContactedFilter, Inquiry, InquiryForm};
use crate::models::review::{Review, ReviewForm};
use crate::models::settings::SiteIdentity;
use crate::models::tag::Tag;
use crate::models::Page;

pub mod sqlite;

/// Headline numbers for the admin dashboard.
#[derive(Debug, Serialize, Default, Clone, PartialEq)]
pub struct DashboardCounts {
    pub inquiries_total: i64,
    pub inquiries_contacted: i64,
    pub inquiries_pending: i64,
    pub messages_total: i64,
    pub messages_unread: i64,
    pub reviews_total: i64,
    pub blogs_total: i64,
}

/// Unified data-access trait. Every database operation goes through here.
pub trait Store: Send + Sync {
    // ── Lifecycle ───────────────────────────────────────────────────
    fn run_migrations(&self) -> Result<(), String>;
    fn seed_defaults(&self) -> Result<(), String>;

    // ── Settings ────────────────────────────────────────────────────
    fn setting_get(&self, key: &str) -> Option<String>;
    fn setting_get_or(&self, key: &str, default: &str) -> String {
        self.setting_get(key).unwrap_or_else(|| default.to_string())
    }
    fn setting_get_i64(&self, key: &str, default: i64) -> i64 {
        self.setting_get(key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }
    fn setting_set(&self, key: &str, value: &str) -> AppResult<()>;
    fn site_identity(&self) -> SiteIdentity;

    // ── Admins ──────────────────────────────────────────────────────
    fn admin_get_by_id(&self, id: i64) -> Option<Admin>;
    fn admin_get_by_email(&self, email: &str) -> Option<Admin>;
    fn admin_count(&self) -> i64;
    fn admin_create(&self, new: &NewAdmin) -> AppResult<i64>;
    fn admin_update_credentials(
        &self,
        id: i64,
        email: Option<&str>,
        password_hash: Option<&str>,
    ) -> AppResult<()>;

    // ── Sessions ────────────────────────────────────────────────────
    fn session_create_full(
        &self,
        admin_id: i64,
        token: &str,
        expires_at: &str,
        ip: Option<&str>,
        user_agent: Option<&str>,
    ) -> AppResult<()>;
    /// Owner of an unexpired session.
    fn session_get_admin_id(&self, token: &str) -> Option<i64>;
    fn session_delete(&self, token: &str) -> AppResult<()>;
    fn session_cleanup_expired(&self);

    // ── Inquiries ───────────────────────────────────────────────────
    fn inquiry_find_by_id(&self, id: i64) -> Option<Inquiry>;
    fn inquiry_create(&self, form: &InquiryForm) -> AppResult<i64>;
    fn inquiry_list(
        &self,
        search: Option<&str>,
        status: Option<ContactedFilter>,
        page: i64,
    ) -> Page<Inquiry>;
    fn inquiry_count(&self, status: Option<ContactedFilter>) -> i64;
    fn inquiry_toggle_contacted(&self, id: i64) -> AppResult<bool>;
    fn inquiry_delete(&self, id: i64) -> AppResult<Inquiry>;

    // ── Contact messages ────────────────────────────────────────────
    fn contact_create(&self, form: &ContactForm) -> AppResult<i64>;
    fn contact_list(&self) -> Vec<ContactMessage>;
    fn contact_count(&self, unread_only: bool) -> i64;
    fn contact_mark_read(&self, id: i64) -> AppResult<()>;

    // ── Reviews ─────────────────────────────────────────────────────
    fn review_create(&self, form: &ReviewForm) -> AppResult<i64>;
    fn review_list(&self) -> Vec<Review>;
    fn review_top_rated(&self, min_rating: i64, limit: i64) -> Vec<Review>;
    fn review_count(&self) -> i64;

    // ── Audit log ───────────────────────────────────────────────────
    fn audit_append(&self, admin_email: &str, action: &str, ip: Option<&str>) -> AppResult<i64>;
    fn audit_recent(&self, limit: i64) -> Vec<AuditEntry>;
    fn audit_count(&self) -> i64;

    // ── Blogs ───────────────────────────────────────────────────────
    fn blog_find_by_id(&self, id: i64) -> Option<Blog>;
    fn blog_find_by_slug(&self, slug: &str) -> Option<Blog>;
    fn blog_list(&self, query: &BlogQuery, page: i64, per_page: i64) -> Page<Blog>;
    fn blog_related(&self, blog: &Blog) -> Vec<Blog>;
    fn blog_count(&self) -> i64;
    fn blog_create(&self, form: &BlogForm) -> AppResult<Blog>;
    fn blog_update(&self, id: i64, form: &BlogForm) -> AppResult<Blog>;
    fn blog_delete(&self, id: i64) -> AppResult<Blog>;

    // ── Categories ──────────────────────────────────────────────────
    fn category_list(&self) -> Vec<Category>;
    fn category_list_with_usage(&self) -> Vec<CategoryUsage>;
    fn category_create(&self, name: &str) -> AppResult<i64>;
    fn category_delete(&self, id: i64) -> AppResult<Category>;

    // ── Tags ────────────────────────────────────────────────────────
    fn tag_list(&self) -> Vec<Tag>;
    fn tag_for_blog(&self, blog_id: i64) -> Vec<Tag>;
    fn tag_count_blogs(&self, tag_id: i64) -> i64;
    fn tag_create(&self, name: &str) -> AppResult<i64>;
    fn tag_delete(&self, id: i64) -> AppResult<Tag>;

    // ── Dashboard ───────────────────────────────────────────────────
    fn dashboard_counts(&self) -> DashboardCounts {
        DashboardCounts {
            inquiries_total: self.inquiry_count(None),
            inquiries_contacted: self.inquiry_count(Some(ContactedFilter::Contacted)),
            inquiries_pending: self.inquiry_count(Some(ContactedFilter::Pending)),
            messages_total: self.contact_count(false),
            messages_unread: self.contact_count(true),
            reviews_total: self.review_count(),
            blogs_total: self.blog_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::store::sqlite::SqliteStore;

    /// Create a fresh in-memory SqliteStore with migrations + seed applied.
    fn test_store() -> SqliteStore {
        let manager = r2d2_sqlite::SqliteConnectionManager::memory()
            .with_init(crate::db::configure_connection);
        let pool = r2d2::Pool::builder()
            .max_size(1)
            .build(manager)
            .expect("Failed to create in-memory pool");
        let store = SqliteStore::new(pool);
        store.run_migrations().expect("migrations failed");
        store.seed_defaults().expect("seed failed");
        store
    }

    fn inquiry(name: &str, email: &str) -> InquiryForm {
        InquiryForm {
            name: name.to_string(),
            email: email.to_string(),
            phone: "555-0100".to_string(),
            project_types: vec!["Website".to_string()],
            features: vec!["Blog".to_string()],
            ..Default::default()
        }
    }

    fn blog(title: &str, category_id: Option<i64>, tags: &[&str]) -> BlogForm {
        BlogForm {
            title: title.to_string(),
            short_description: "Short".to_string(),
            content: "Body".to_string(),
            image_url: None,
            category_id,
            tag_names: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn admin(store: &SqliteStore, email: &str) -> i64 {
        store
            .admin_create(&NewAdmin {
                name: "Admin".to_string(),
                email: email.to_string(),
                phone: format!("555-{}", email),
                password_hash: "hash".to_string(),
                is_admin: true,
            })
            .unwrap()
    }

    // ── Settings ────────────────────────────────────────────────────

    #[test]
    fn test_setting_get_set() {
        let s = test_store();
        assert!(s.setting_get("nonexistent_key_xyz").is_none());
        s.setting_set("test_key", "hello").unwrap();
        assert_eq!(s.setting_get("test_key"), Some("hello".to_string()));
    }

    #[test]
    fn test_setting_defaults_seeded() {
        let s = test_store();
        assert_eq!(s.setting_get_i64("session_expiry_hours", 0), 24);
        assert_eq!(s.setting_get_or("captcha_provider", ""), "recaptcha");
        assert_eq!(s.setting_get_i64("missing_num", 7), 7);
        s.setting_set("num", "not a number").unwrap();
        assert_eq!(s.setting_get_i64("num", 3), 3);
    }

    // ── Admins & sessions ───────────────────────────────────────────

    #[test]
    fn test_admin_email_is_case_insensitive() {
        let s = test_store();
        let id = admin(&s, "Owner@Example.com");
        let found = s.admin_get_by_email("owner@example.COM").unwrap();
        assert_eq!(found.id, id);
        assert_eq!(found.email, "owner@example.com");
    }

    #[test]
    fn test_admin_duplicate_email_conflicts() {
        let s = test_store();
        admin(&s, "a@example.com");
        let err = s
            .admin_create(&NewAdmin {
                name: "Other".to_string(),
                email: "a@example.com".to_string(),
                phone: "555-9999".to_string(),
                password_hash: "hash".to_string(),
                is_admin: false,
            })
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn test_session_lifecycle() {
        let s = test_store();
        let id = admin(&s, "a@example.com");
        s.session_create_full(id, "tok-live", "2999-01-01 00:00:00", None, None)
            .unwrap();
        s.session_create_full(id, "tok-old", "2000-01-01 00:00:00", None, None)
            .unwrap();
        assert_eq!(s.session_get_admin_id("tok-live"), Some(id));
        assert_eq!(s.session_get_admin_id("tok-old"), None);

        s.session_delete("tok-live").unwrap();
        assert_eq!(s.session_get_admin_id("tok-live"), None);
    }

    #[test]
    fn test_credential_change_drops_sessions() {
        let s = test_store();
        let id = admin(&s, "a@example.com");
        s.session_create_full(id, "t1", "2999-01-01 00:00:00", None, None)
            .unwrap();
        s.session_create_full(id, "t2", "2999-01-01 00:00:00", None, None)
            .unwrap();
        s.admin_update_credentials(id, Some("b@example.com"), Some("newhash"))
            .unwrap();
        assert_eq!(s.session_get_admin_id("t1"), None);
        assert_eq!(s.session_get_admin_id("t2"), None);
        let updated = s.admin_get_by_id(id).unwrap();
        assert_eq!(updated.email, "b@example.com");
        assert_eq!(updated.password_hash, "newhash");
    }

    #[test]
    fn test_credential_change_email_taken() {
        let s = test_store();
        let a = admin(&s, "a@example.com");
        admin(&s, "taken@example.com");
        s.session_create_full(a, "keep", "2999-01-01 00:00:00", None, None)
            .unwrap();
        let err = s
            .admin_update_credentials(a, Some("taken@example.com"), None)
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        // Nothing committed, session survives
        assert_eq!(s.session_get_admin_id("keep"), Some(a));
        assert_eq!(s.admin_get_by_id(a).unwrap().email, "a@example.com");
    }

    // ── Inquiries ───────────────────────────────────────────────────

    #[test]
    fn test_inquiry_multi_values_roundtrip() {
        let s = test_store();
        let mut form = inquiry("Ann", "ann@example.com");
        form.features = vec!["Blog".to_string(), "Shop, with cart".to_string()];
        let id = s.inquiry_create(&form).unwrap();
        let got = s.inquiry_find_by_id(id).unwrap();
        assert_eq!(got.features, form.features);
        assert!(got.addons.is_empty());
        assert!(!got.is_contacted);
    }

    #[test]
    fn test_inquiry_toggle_twice_restores() {
        let s = test_store();
        let id = s.inquiry_create(&inquiry("Ann", "ann@example.com")).unwrap();
        assert!(s.inquiry_toggle_contacted(id).unwrap());
        assert!(!s.inquiry_toggle_contacted(id).unwrap());
        assert!(!s.inquiry_find_by_id(id).unwrap().is_contacted);
    }

    #[test]
    fn test_inquiry_toggle_missing() {
        let s = test_store();
        assert!(matches!(
            s.inquiry_toggle_contacted(999),
            Err(AppError::NotFound)
        ));
    }

    #[test]
    fn test_inquiry_search_and_filter() {
        let s = test_store();
        let a = s.inquiry_create(&inquiry("Alice Smith", "alice@example.com")).unwrap();
        s.inquiry_create(&inquiry("Bob", "bob@shop.test")).unwrap();
        s.inquiry_create(&inquiry("Carol", "carol@example.com")).unwrap();
        s.inquiry_toggle_contacted(a).unwrap();

        assert_eq!(s.inquiry_list(Some("ALICE"), None, 1).total, 1);
        assert_eq!(s.inquiry_list(Some("example.com"), None, 1).total, 2);
        assert_eq!(s.inquiry_list(Some("shop"), None, 1).items[0].name, "Bob");

        let contacted = s.inquiry_list(None, Some(ContactedFilter::Contacted), 1);
        assert_eq!(contacted.total, 1);
        assert_eq!(contacted.items[0].id, a);
        assert_eq!(s.inquiry_count(Some(ContactedFilter::Pending)), 2);
        // Wildcards in the term are literal
        assert_eq!(s.inquiry_list(Some("%"), None, 1).total, 0);
    }

    #[test]
    fn test_inquiry_search_folds_non_ascii_case() {
        let s = test_store();
        s.inquiry_create(&inquiry("ÉMILE ZOLA", "emile@example.com")).unwrap();
        s.inquiry_create(&inquiry("Jürgen", "JÜRGEN@EXAMPLE.COM")).unwrap();

        for term in ["émile", "ÉMILE", "Émile zola"] {
            let found = s.inquiry_list(Some(term), None, 1);
            assert_eq!(found.total, 1, "search {:?}", term);
            assert_eq!(found.items[0].name, "ÉMILE ZOLA");
        }
        // Email column folds too
        assert_eq!(s.inquiry_list(Some("jürgen@"), None, 1).total, 1);
        assert_eq!(s.inquiry_list(Some("ö"), None, 1).total, 0);
    }

    #[test]
    fn test_inquiry_delete() {
        let s = test_store();
        let id = s.inquiry_create(&inquiry("Ann", "ann@example.com")).unwrap();
        let removed = s.inquiry_delete(id).unwrap();
        assert_eq!(removed.name, "Ann");
        assert!(s.inquiry_find_by_id(id).is_none());
        assert!(matches!(s.inquiry_delete(id), Err(AppError::NotFound)));
    }

    // ── Contact messages & reviews ──────────────────────────────────

    #[test]
    fn test_contact_mark_read() {
        let s = test_store();
        let id = s
            .contact_create(&ContactForm {
                name: "Ann".to_string(),
                email: "ann@example.com".to_string(),
                phone: "555".to_string(),
                subject: "Hi".to_string(),
                message: "Hello".to_string(),
            })
            .unwrap();
        assert_eq!(s.contact_count(true), 1);
        s.contact_mark_read(id).unwrap();
        assert_eq!(s.contact_count(true), 0);
        assert_eq!(s.contact_count(false), 1);
        assert!(matches!(s.contact_mark_read(42), Err(AppError::NotFound)));
    }

    #[test]
    fn test_review_rating_bounds() {
        let s = test_store();
        for rating in [0, 6, -1] {
            let err = s
                .review_create(&ReviewForm {
                    name: "X".to_string(),
                    email: "x@example.com".to_string(),
                    rating,
                    message: "m".to_string(),
                })
                .unwrap_err();
            assert!(matches!(err, AppError::Validation(_)));
        }
        assert_eq!(s.review_count(), 0);
    }

    #[test]
    fn test_review_top_rated_excludes_low() {
        let s = test_store();
        for rating in 1..=5 {
            s.review_create(&ReviewForm {
                name: format!("R{}", rating),
                email: "r@example.com".to_string(),
                rating,
                message: "m".to_string(),
            })
            .unwrap();
        }
        let top = s.review_top_rated(3, 6);
        assert_eq!(top.len(), 2);
        assert!(top.iter().all(|r| r.rating > 3));
        // Newest first
        assert_eq!(top[0].rating, 5);
    }

    // ── Audit ───────────────────────────────────────────────────────

    #[test]
    fn test_audit_recent_newest_first() {
        let s = test_store();
        s.audit_append("a@example.com", "Logged in", Some("127.0.0.1"))
            .unwrap();
        s.audit_append("a@example.com", "Logged out", None).unwrap();
        let recent = s.audit_recent(1);
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].action, "Logged out");
        assert_eq!(s.audit_count(), 2);
    }

    // ── Blogs & taxonomy ────────────────────────────────────────────

    #[test]
    fn test_blog_slug_from_title() {
        let s = test_store();
        let created = s.blog_create(&blog("Hello, World!", None, &[])).unwrap();
        assert_eq!(created.slug, "hello-world");
        assert!(s.blog_find_by_slug("hello-world").is_some());
    }

    #[test]
    fn test_blog_duplicate_slug_conflicts() {
        let s = test_store();
        s.blog_create(&blog("Hello World", None, &[])).unwrap();
        let err = s.blog_create(&blog("hello   world!", None, &[])).unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(s.blog_count(), 1);
    }

    #[test]
    fn test_blog_symbol_only_title_rejected() {
        let s = test_store();
        let err = s.blog_create(&blog("!!!", None, &[])).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_blog_update_regenerates_slug_and_tags() {
        let s = test_store();
        let created = s.blog_create(&blog("First", None, &["rust", "web"])).unwrap();
        assert_eq!(s.tag_for_blog(created.id).len(), 2);

        let updated = s
            .blog_update(created.id, &blog("Second Title", None, &["Rust"]))
            .unwrap();
        assert_eq!(updated.slug, "second-title");
        let tags = s.tag_for_blog(created.id);
        assert_eq!(tags.len(), 1);
        // Existing tag reused regardless of case
        assert_eq!(tags[0].name, "rust");
        assert_eq!(s.tag_list().len(), 2);
    }

    #[test]
    fn test_blog_update_missing() {
        let s = test_store();
        assert!(matches!(
            s.blog_update(77, &blog("X", None, &[])),
            Err(AppError::NotFound)
        ));
    }

    #[test]
    fn test_blog_list_filters() {
        let s = test_store();
        let news = s.category_create("News").unwrap();
        let guides = s.category_create("Guides").unwrap();
        s.blog_create(&blog("Launch day", Some(news), &[])).unwrap();
        s.blog_create(&blog("Rust guide", Some(guides), &[])).unwrap();
        s.blog_create(&blog("Another launch", Some(news), &[])).unwrap();

        let by_cat = s.blog_list(
            &BlogQuery {
                search: None,
                category: Some("News".to_string()),
            },
            1,
            6,
        );
        assert_eq!(by_cat.total, 2);

        let by_title = s.blog_list(
            &BlogQuery {
                search: Some("LAUNCH".to_string()),
                category: None,
            },
            1,
            6,
        );
        assert_eq!(by_title.total, 2);

        let none = s.blog_list(
            &BlogQuery {
                search: Some("guide".to_string()),
                category: Some("News".to_string()),
            },
            1,
            6,
        );
        assert_eq!(none.total, 0);
    }

    #[test]
    fn test_blog_search_folds_non_ascii_case() {
        let s = test_store();
        s.blog_create(&blog("Über Éclairs", None, &[])).unwrap();
        s.blog_create(&blog("Plain title", None, &[])).unwrap();

        for term in ["über", "ÜBER", "éclairs"] {
            let found = s.blog_list(
                &BlogQuery {
                    search: Some(term.to_string()),
                    category: None,
                },
                1,
                6,
            );
            assert_eq!(found.total, 1, "search {:?}", term);
            assert_eq!(found.items[0].title, "Über Éclairs");
        }
    }

    #[test]
    fn test_blog_related_same_category() {
        let s = test_store();
        let news = s.category_create("News").unwrap();
        let other = s.category_create("Other").unwrap();
        let main = s.blog_create(&blog("Main", Some(news), &[])).unwrap();
        for i in 0..4 {
            s.blog_create(&blog(&format!("News {}", i), Some(news), &[]))
                .unwrap();
        }
        s.blog_create(&blog("Elsewhere", Some(other), &[])).unwrap();

        let related = s.blog_related(&main);
        assert_eq!(related.len(), 3);
        assert!(related
            .iter()
            .all(|b| b.id != main.id && b.category_id == Some(news)));

        let loose = s.blog_create(&blog("No category", None, &[])).unwrap();
        assert!(s.blog_related(&loose).is_empty());
    }

    #[test]
    fn test_category_delete_keeps_blogs() {
        let s = test_store();
        let cat = s.category_create("News").unwrap();
        let post = s.blog_create(&blog("Kept", Some(cat), &[])).unwrap();
        s.category_delete(cat).unwrap();
        let after = s.blog_find_by_id(post.id).unwrap();
        assert_eq!(after.category_id, None);
        assert_eq!(after.category_name, None);
    }

    #[test]
    fn test_tag_delete_keeps_blogs() {
        let s = test_store();
        let post = s.blog_create(&blog("Tagged", None, &["one", "two"])).unwrap();
        let one = s
            .tag_list()
            .into_iter()
            .find(|t| t.name == "one")
            .unwrap();
        s.tag_delete(one.id).unwrap();
        assert!(s.blog_find_by_id(post.id).is_some());
        assert_eq!(s.tag_for_blog(post.id).len(), 1);
    }

    #[test]
    fn test_blog_delete_keeps_taxonomy() {
        let s = test_store();
        let cat = s.category_create("News").unwrap();
        let post = s.blog_create(&blog("Gone", Some(cat), &["t"])).unwrap();
        s.blog_delete(post.id).unwrap();
        assert!(s.blog_find_by_id(post.id).is_none());
        assert_eq!(s.category_list().len(), 1);
        assert_eq!(s.tag_list().len(), 1);
        assert!(matches!(s.blog_delete(post.id), Err(AppError::NotFound)));
    }

    #[test]
    fn test_category_name_conflict() {
        let s = test_store();
        s.category_create("News").unwrap();
        assert!(matches!(
            s.category_create("news"),
            Err(AppError::Conflict(_))
        ));
        assert!(matches!(
            s.category_create("   "),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_dashboard_counts() {
        let s = test_store();
        let id = s.inquiry_create(&inquiry("Ann", "ann@example.com")).unwrap();
        s.inquiry_create(&inquiry("Bob", "bob@example.com")).unwrap();
        s.inquiry_toggle_contacted(id).unwrap();
        let counts = s.dashboard_counts();
        assert_eq!(counts.inquiries_total, 2);
        assert_eq!(counts.inquiries_contacted, 1);
        assert_eq!(counts.inquiries_pending, 1);
        assert_eq!(counts.blogs_total, 0);
    }
}
