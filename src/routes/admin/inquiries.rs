use std::sync::Arc;

use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use rocket::State;
use rocket_dyn_templates::Template;
use serde_json::json;

use super::admin_context;
use crate::audit::AuditRecorder;
use crate::error::{AppError, AppResult};
use crate::models::inquiry::ContactedFilter;
use crate::routes::non_empty;
use crate::security::auth::{AdminUser, ClientIp};
use crate::store::Store;

// ── Inquiries ──────────────────────────────────────────

#[get("/inquiries?<q>&<status>&<page>")]
pub fn inquiries_list(
    admin: AdminUser,
    store: &State<Arc<dyn Store>>,
    flash: Option<FlashMessage<'_>>,
    q: Option<&str>,
    status: Option<&str>,
    page: Option<i64>,
) -> Template {
    let s: &dyn Store = &**store.inner();
    let search = non_empty(q);
    let filter = status.and_then(ContactedFilter::parse);
    let inquiries = s.inquiry_list(search.as_deref(), filter, page.unwrap_or(1));

    let context = admin_context(
        s,
        &admin,
        flash,
        "Inquiries",
        json!({
            "inquiries": inquiries,
            "q": search,
            "status": filter.map(|f| f.as_str()),
        }),
    );
    Template::render("admin/inquiries", &context)
}

/// Viewing contact details is itself an audited action.
#[get("/inquiry/<id>")]
pub fn inquiry_detail(
    admin: AdminUser,
    store: &State<Arc<dyn Store>>,
    audit: &State<AuditRecorder>,
    flash: Option<FlashMessage<'_>>,
    client_ip: ClientIp,
    id: i64,
) -> AppResult<Template> {
    let s: &dyn Store = &**store.inner();
    let inquiry = s.inquiry_find_by_id(id).ok_or(AppError::NotFound)?;
    audit.record(
        &admin.admin.email,
        Some(&client_ip.0),
        &format!("Viewed inquiry #{} ({})", inquiry.id, inquiry.name),
    );

    let context = admin_context(
        s,
        &admin,
        flash,
        "Inquiry",
        json!({ "inquiry": inquiry }),
    );
    Ok(Template::render("admin/inquiry_detail", &context))
}

/// Flips the flag; the audit row names the state it landed on.
#[post("/inquiry/<id>/toggle")]
pub fn inquiry_toggle(
    admin: AdminUser,
    store: &State<Arc<dyn Store>>,
    audit: &State<AuditRecorder>,
    client_ip: ClientIp,
    id: i64,
) -> AppResult<Flash<Redirect>> {
    let contacted = store.inquiry_toggle_contacted(id)?;
    let state = if contacted { "contacted" } else { "pending" };
    audit.record(
        &admin.admin.email,
        Some(&client_ip.0),
        &format!("Marked inquiry #{} as {}", id, state),
    );
    Ok(Flash::success(
        Redirect::to(format!("/admin/inquiry/{}", id)),
        format!("Inquiry marked as {}.", state),
    ))
}

#[post("/inquiry/<id>/delete")]
pub fn inquiry_delete(
    admin: AdminUser,
    store: &State<Arc<dyn Store>>,
    audit: &State<AuditRecorder>,
    client_ip: ClientIp,
    id: i64,
) -> AppResult<Flash<Redirect>> {
    let removed = store.inquiry_delete(id)?;
    audit.record(
        &admin.admin.email,
        Some(&client_ip.0),
        &format!("Deleted inquiry #{} ({})", removed.id, removed.name),
    );
    Ok(Flash::success(
        Redirect::to("/admin/inquiries"),
        "Inquiry deleted.",
    ))
}
