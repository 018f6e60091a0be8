use std::sync::Arc;

use rocket::request::FlashMessage;
use rocket::State;
use rocket_dyn_templates::Template;
use serde_json::json;

use super::{non_empty, page_context};
use crate::models::blog::{BlogQuery, BLOGS_PER_PAGE};
use crate::models::review::HOME_REVIEW_LIMIT;
use crate::security::captcha_widget;
use crate::store::Store;

/// Reviews rated above this make the home page.
const HOME_REVIEW_MIN_RATING: i64 = 4;

#[get("/")]
pub fn home(store: &State<Arc<dyn Store>>, flash: Option<FlashMessage<'_>>) -> Template {
    let s: &dyn Store = &**store.inner();
    let reviews = s.review_top_rated(HOME_REVIEW_MIN_RATING, HOME_REVIEW_LIMIT);
    let context = page_context(
        s,
        flash,
        json!({
            "page_title": "Home",
            "reviews": reviews,
            "captcha": captcha_widget(s),
        }),
    );
    Template::render("home", &context)
}

fn static_page(store: &dyn Store, template: &'static str, title: &str) -> Template {
    let context = page_context(store, None, json!({ "page_title": title }));
    Template::render(template, &context)
}

#[get("/plans")]
pub fn plans(store: &State<Arc<dyn Store>>) -> Template {
    static_page(&**store.inner(), "plans", "Plans & Pricing")
}

#[get("/privacy")]
pub fn privacy(store: &State<Arc<dyn Store>>) -> Template {
    static_page(&**store.inner(), "privacy", "Privacy Policy")
}

#[get("/terms")]
pub fn terms(store: &State<Arc<dyn Store>>) -> Template {
    static_page(&**store.inner(), "terms", "Terms of Service")
}

#[get("/refund_policy")]
pub fn refund_policy(store: &State<Arc<dyn Store>>) -> Template {
    static_page(&**store.inner(), "refund_policy", "Refund Policy")
}

// ── Blog ───────────────────────────────────────────────

#[get("/blogs?<q>&<category>&<page>")]
pub fn blog_list(
    store: &State<Arc<dyn Store>>,
    q: Option<&str>,
    category: Option<&str>,
    page: Option<i64>,
) -> Template {
    let s: &dyn Store = &**store.inner();
    let query = BlogQuery {
        search: non_empty(q),
        category: non_empty(category),
    };
    let blogs = s.blog_list(&query, page.unwrap_or(1), BLOGS_PER_PAGE);

    let context = page_context(
        s,
        None,
        json!({
            "page_title": "Blog",
            "blogs": blogs,
            "q": query.search,
            "category": query.category,
            "categories": s.category_list(),
        }),
    );
    Template::render("blogs/list", &context)
}

#[get("/blogs/<slug>")]
pub fn blog_detail(store: &State<Arc<dyn Store>>, slug: &str) -> Option<Template> {
    let s: &dyn Store = &**store.inner();
    let blog = s.blog_find_by_slug(slug)?;
    let tags = s.tag_for_blog(blog.id);
    let related = s.blog_related(&blog);

    let context = page_context(
        s,
        None,
        json!({
            "page_title": blog.title,
            "blog": blog,
            "tags": tags,
            "related": related,
        }),
    );
    Some(Template::render("blogs/detail", &context))
}

pub fn routes() -> Vec<rocket::Route> {
    routes![
        home,
        plans,
        privacy,
        terms,
        refund_policy,
        blog_list,
        blog_detail
    ]
}
