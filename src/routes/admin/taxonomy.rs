use std::sync::Arc;

use rocket::form::Form;
use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use rocket::State;
use rocket_dyn_templates::Template;
use serde_json::json;

use super::admin_context;
use crate::audit::AuditRecorder;
use crate::error::AppResult;
use crate::security::auth::{AdminUser, ClientIp};
use crate::store::Store;

#[derive(Debug, FromForm)]
pub struct NameForm {
    pub name: String,
}

fn back() -> Redirect {
    Redirect::to("/admin/taxonomy")
}

// ── Categories & tags ──────────────────────────────────

#[get("/taxonomy")]
pub fn taxonomy(
    admin: AdminUser,
    store: &State<Arc<dyn Store>>,
    flash: Option<FlashMessage<'_>>,
) -> Template {
    let s: &dyn Store = &**store.inner();
    let tags: Vec<_> = s
        .tag_list()
        .into_iter()
        .map(|t| json!({ "id": t.id, "name": t.name, "blog_count": s.tag_count_blogs(t.id) }))
        .collect();
    let context = admin_context(
        s,
        &admin,
        flash,
        "Categories & Tags",
        json!({
            "categories": s.category_list_with_usage(),
            "tags": tags,
        }),
    );
    Template::render("admin/taxonomy", &context)
}

#[post("/category/create", data = "<form>")]
pub fn category_create(
    admin: AdminUser,
    form: Form<NameForm>,
    store: &State<Arc<dyn Store>>,
    audit: &State<AuditRecorder>,
    client_ip: ClientIp,
) -> Flash<Redirect> {
    match store.category_create(&form.name) {
        Ok(id) => {
            let name = form.name.trim();
            audit.record(
                &admin.admin.email,
                Some(&client_ip.0),
                &format!("Created category '{}' (#{})", name, id),
            );
            Flash::success(back(), format!("Category '{}' created.", name))
        }
        Err(e) => Flash::error(back(), e.user_message()),
    }
}

/// Posts in the category stay, uncategorised.
#[post("/category/delete/<id>")]
pub fn category_delete(
    admin: AdminUser,
    store: &State<Arc<dyn Store>>,
    audit: &State<AuditRecorder>,
    client_ip: ClientIp,
    id: i64,
) -> AppResult<Flash<Redirect>> {
    let removed = store.category_delete(id)?;
    audit.record(
        &admin.admin.email,
        Some(&client_ip.0),
        &format!("Deleted category '{}' (#{})", removed.name, removed.id),
    );
    Ok(Flash::success(
        back(),
        format!("Category '{}' deleted.", removed.name),
    ))
}

#[post("/tag/create", data = "<form>")]
pub fn tag_create(
    admin: AdminUser,
    form: Form<NameForm>,
    store: &State<Arc<dyn Store>>,
    audit: &State<AuditRecorder>,
    client_ip: ClientIp,
) -> Flash<Redirect> {
    match store.tag_create(&form.name) {
        Ok(id) => {
            let name = form.name.trim();
            audit.record(
                &admin.admin.email,
                Some(&client_ip.0),
                &format!("Created tag '{}' (#{})", name, id),
            );
            Flash::success(back(), format!("Tag '{}' created.", name))
        }
        Err(e) => Flash::error(back(), e.user_message()),
    }
}

#[post("/tag/delete/<id>")]
pub fn tag_delete(
    admin: AdminUser,
    store: &State<Arc<dyn Store>>,
    audit: &State<AuditRecorder>,
    client_ip: ClientIp,
    id: i64,
) -> AppResult<Flash<Redirect>> {
    let removed = store.tag_delete(id)?;
    audit.record(
        &admin.admin.email,
        Some(&client_ip.0),
        &format!("Deleted tag '{}' (#{})", removed.name, removed.id),
    );
    Ok(Flash::success(back(), format!("Tag '{}' deleted.", removed.name)))
}
