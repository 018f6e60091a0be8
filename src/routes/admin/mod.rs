pub mod blogs;
pub mod dashboard;
pub mod inquiries;
pub mod listings;
pub mod taxonomy;

use rocket::request::FlashMessage;
use serde_json::{json, Value};

use crate::security::auth::AdminUser;
use crate::store::Store;

/// Template context shared by every admin page.
pub fn admin_context(
    store: &dyn Store,
    admin: &AdminUser,
    flash: Option<FlashMessage<'_>>,
    title: &str,
    extra: Value,
) -> Value {
    let mut ctx = super::page_context(
        store,
        flash,
        json!({ "page_title": title, "admin": admin.admin }),
    );
    if let (Some(base), Value::Object(more)) = (ctx.as_object_mut(), extra) {
        base.extend(more);
    }
    ctx
}

pub fn routes() -> Vec<rocket::Route> {
    routes![
        dashboard::index,
        dashboard::dashboard,
        inquiries::inquiries_list,
        inquiries::inquiry_detail,
        inquiries::inquiry_toggle,
        inquiries::inquiry_delete,
        listings::contact_messages,
        listings::contact_message_read,
        listings::reviews,
        listings::audit_logs,
        blogs::blogs_list,
        blogs::blog_new,
        blogs::blog_create,
        blogs::blog_edit,
        blogs::blog_update,
        blogs::blog_delete,
        taxonomy::taxonomy,
        taxonomy::category_create,
        taxonomy::category_delete,
        taxonomy::tag_create,
        taxonomy::tag_delete,
    ]
}
