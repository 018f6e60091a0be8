use std::sync::Arc;

use rocket::form::Form;
use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use rocket::State;
use rocket_dyn_templates::Template;
use serde_json::{json, Value};

use super::admin_context;
use crate::audit::AuditRecorder;
use crate::error::{AppError, AppResult};
use crate::models::blog::{BlogForm, BlogQuery, ADMIN_BLOGS_PER_PAGE};
use crate::models::tag::Tag;
use crate::routes::non_empty;
use crate::security::auth::{AdminUser, ClientIp};
use crate::store::Store;

#[derive(Debug, FromForm, Default)]
pub struct BlogSubmit {
    pub title: String,
    pub short_description: String,
    pub content: String,
    pub image_url: Option<String>,
    /// Select value; empty means no category.
    pub category_id: Option<String>,
    /// Comma-separated tag names.
    pub tags: Option<String>,
}

impl BlogSubmit {
    pub fn to_form(&self) -> AppResult<BlogForm> {
        let category_id = match non_empty(self.category_id.as_deref()) {
            Some(raw) => Some(
                raw.parse::<i64>()
                    .map_err(|_| AppError::validation("Invalid category"))?,
            ),
            None => None,
        };
        Ok(BlogForm {
            title: self.title.trim().to_string(),
            short_description: self.short_description.trim().to_string(),
            content: self.content.clone(),
            image_url: non_empty(self.image_url.as_deref()),
            category_id,
            tag_names: Tag::parse_names(self.tags.as_deref().unwrap_or("")),
        })
    }

    /// Echo of the submitted values for re-rendering the editor.
    fn echo(&self) -> Value {
        json!({
            "title": self.title,
            "short_description": self.short_description,
            "content": self.content,
            "image_url": self.image_url,
            "category_id": self.category_id.as_deref().and_then(|c| c.trim().parse::<i64>().ok()),
        })
    }
}

fn editor(
    store: &dyn Store,
    admin: &AdminUser,
    title: &str,
    action: &str,
    blog: Value,
    tags: &str,
    error: Option<String>,
) -> Template {
    let context = admin_context(
        store,
        admin,
        None,
        title,
        json!({
            "blog": blog,
            "tags_value": tags,
            "action": action,
            "error": error,
            "categories": store.category_list(),
        }),
    );
    Template::render("admin/blogs/edit", &context)
}

// ── Blogs ──────────────────────────────────────────────

#[get("/blogs?<page>")]
pub fn blogs_list(
    admin: AdminUser,
    store: &State<Arc<dyn Store>>,
    flash: Option<FlashMessage<'_>>,
    page: Option<i64>,
) -> Template {
    let s: &dyn Store = &**store.inner();
    let blogs = s.blog_list(&BlogQuery::default(), page.unwrap_or(1), ADMIN_BLOGS_PER_PAGE);
    let context = admin_context(s, &admin, flash, "Blog Posts", json!({ "blogs": blogs }));
    Template::render("admin/blogs/list", &context)
}

#[get("/blog/create")]
pub fn blog_new(admin: AdminUser, store: &State<Arc<dyn Store>>) -> Template {
    editor(
        &**store.inner(),
        &admin,
        "New Blog Post",
        "/admin/blog/create",
        Value::Null,
        "",
        None,
    )
}

#[post("/blog/create", data = "<form>")]
pub fn blog_create(
    admin: AdminUser,
    form: Form<BlogSubmit>,
    store: &State<Arc<dyn Store>>,
    audit: &State<AuditRecorder>,
    client_ip: ClientIp,
) -> Result<Flash<Redirect>, Template> {
    let s: &dyn Store = &**store.inner();
    let result = form.to_form().and_then(|f| s.blog_create(&f));

    match result {
        Ok(blog) => {
            audit.record(
                &admin.admin.email,
                Some(&client_ip.0),
                &format!("Created blog post '{}' (#{})", blog.title, blog.id),
            );
            Ok(Flash::success(
                Redirect::to("/admin/blogs"),
                format!("Published '{}'.", blog.title),
            ))
        }
        Err(e) => Err(editor(
            s,
            &admin,
            "New Blog Post",
            "/admin/blog/create",
            form.echo(),
            form.tags.as_deref().unwrap_or(""),
            Some(e.user_message()),
        )),
    }
}

#[get("/blog/edit/<id>")]
pub fn blog_edit(admin: AdminUser, store: &State<Arc<dyn Store>>, id: i64) -> AppResult<Template> {
    let s: &dyn Store = &**store.inner();
    let blog = s.blog_find_by_id(id).ok_or(AppError::NotFound)?;
    let tags = s
        .tag_for_blog(id)
        .into_iter()
        .map(|t| t.name)
        .collect::<Vec<_>>()
        .join(", ");
    Ok(editor(
        s,
        &admin,
        "Edit Blog Post",
        &format!("/admin/blog/edit/{}", id),
        json!(blog),
        &tags,
        None,
    ))
}

#[post("/blog/edit/<id>", data = "<form>")]
pub fn blog_update(
    admin: AdminUser,
    form: Form<BlogSubmit>,
    store: &State<Arc<dyn Store>>,
    audit: &State<AuditRecorder>,
    client_ip: ClientIp,
    id: i64,
) -> AppResult<Result<Flash<Redirect>, Template>> {
    let s: &dyn Store = &**store.inner();
    let result = form.to_form().and_then(|f| s.blog_update(id, &f));

    match result {
        Ok(blog) => {
            audit.record(
                &admin.admin.email,
                Some(&client_ip.0),
                &format!("Updated blog post '{}' (#{})", blog.title, blog.id),
            );
            Ok(Ok(Flash::success(
                Redirect::to("/admin/blogs"),
                format!("Saved '{}'.", blog.title),
            )))
        }
        Err(AppError::NotFound) => Err(AppError::NotFound),
        Err(e) => Ok(Err(editor(
            s,
            &admin,
            "Edit Blog Post",
            &format!("/admin/blog/edit/{}", id),
            form.echo(),
            form.tags.as_deref().unwrap_or(""),
            Some(e.user_message()),
        ))),
    }
}

#[post("/blog/delete/<id>")]
pub fn blog_delete(
    admin: AdminUser,
    store: &State<Arc<dyn Store>>,
    audit: &State<AuditRecorder>,
    client_ip: ClientIp,
    id: i64,
) -> AppResult<Flash<Redirect>> {
    let removed = store.blog_delete(id)?;
    audit.record(
        &admin.admin.email,
        Some(&client_ip.0),
        &format!("Deleted blog post '{}' (#{})", removed.title, removed.id),
    );
    Ok(Flash::success(
        Redirect::to("/admin/blogs"),
        format!("Deleted '{}'.", removed.title),
    ))
}
