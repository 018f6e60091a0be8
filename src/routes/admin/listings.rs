use std::sync::Arc;

use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use rocket::State;
use rocket_dyn_templates::Template;
use serde_json::json;

use super::admin_context;
use crate::audit::AuditRecorder;
use crate::error::AppResult;
use crate::models::audit::AUDIT_VIEW_LIMIT;
use crate::security::auth::{AdminUser, ClientIp};
use crate::store::Store;

// ── Contact messages ───────────────────────────────────

#[get("/contact-messages")]
pub fn contact_messages(
    admin: AdminUser,
    store: &State<Arc<dyn Store>>,
    flash: Option<FlashMessage<'_>>,
) -> Template {
    let s: &dyn Store = &**store.inner();
    let context = admin_context(
        s,
        &admin,
        flash,
        "Contact Messages",
        json!({ "messages": s.contact_list() }),
    );
    Template::render("admin/contact_messages", &context)
}

#[post("/contact-message/<id>/read")]
pub fn contact_message_read(
    admin: AdminUser,
    store: &State<Arc<dyn Store>>,
    audit: &State<AuditRecorder>,
    client_ip: ClientIp,
    id: i64,
) -> AppResult<Flash<Redirect>> {
    store.contact_mark_read(id)?;
    audit.record(
        &admin.admin.email,
        Some(&client_ip.0),
        &format!("Marked contact message #{} as read", id),
    );
    Ok(Flash::success(
        Redirect::to("/admin/contact-messages"),
        "Message marked as read.",
    ))
}

// ── Reviews ────────────────────────────────────────────

#[get("/reviews")]
pub fn reviews(admin: AdminUser, store: &State<Arc<dyn Store>>) -> Template {
    let s: &dyn Store = &**store.inner();
    let context = admin_context(
        s,
        &admin,
        None,
        "Reviews",
        json!({ "reviews": s.review_list() }),
    );
    Template::render("admin/reviews", &context)
}

// ── Audit log ──────────────────────────────────────────

#[get("/audit-logs")]
pub fn audit_logs(admin: AdminUser, store: &State<Arc<dyn Store>>) -> Template {
    let s: &dyn Store = &**store.inner();
    let context = admin_context(
        s,
        &admin,
        None,
        "Audit Log",
        json!({
            "entries": s.audit_recent(AUDIT_VIEW_LIMIT),
            "total": s.audit_count(),
            "limit": AUDIT_VIEW_LIMIT,
        }),
    );
    Template::render("admin/audit_logs", &context)
}
