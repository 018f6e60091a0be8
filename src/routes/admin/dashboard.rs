use std::sync::Arc;

use rocket::request::FlashMessage;
use rocket::response::Redirect;
use rocket::State;
use rocket_dyn_templates::Template;
use serde_json::json;

use super::admin_context;
use crate::security::auth::AdminUser;
use crate::store::Store;

const RECENT_INQUIRIES: usize = 5;

#[get("/")]
pub fn index(_admin: AdminUser) -> Redirect {
    Redirect::to("/admin/dashboard")
}

// ── Dashboard ──────────────────────────────────────────

#[get("/dashboard")]
pub fn dashboard(
    admin: AdminUser,
    store: &State<Arc<dyn Store>>,
    flash: Option<FlashMessage<'_>>,
) -> Template {
    let s: &dyn Store = &**store.inner();
    let mut recent = s.inquiry_list(None, None, 1).items;
    recent.truncate(RECENT_INQUIRIES);

    let context = admin_context(
        s,
        &admin,
        flash,
        "Dashboard",
        json!({
            "counts": s.dashboard_counts(),
            "recent_inquiries": recent,
        }),
    );
    Template::render("admin/dashboard", &context)
}
