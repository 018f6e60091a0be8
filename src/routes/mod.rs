pub mod admin;
pub mod forms;
pub mod public;
pub mod security;

use rocket::request::FlashMessage;
use serde_json::{json, Value};

use crate::store::Store;

/// Merge the site-wide keys every template expects into `extra`.
pub fn page_context(store: &dyn Store, flash: Option<FlashMessage<'_>>, extra: Value) -> Value {
    let identity = store.site_identity();
    let mut ctx = json!({
        "site_name": identity.site_name,
        "site_tagline": identity.site_tagline,
        "contact_email": identity.contact_email,
        "flash": flash.map(|f| json!({ "kind": f.kind(), "message": f.message() })),
    });
    if let (Some(base), Value::Object(more)) = (ctx.as_object_mut(), extra) {
        base.extend(more);
    }
    ctx
}

/// Trimmed value, `None` when blank.
pub fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub fn looks_like_email(value: &str) -> bool {
    let value = value.trim();
    match value.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !value.contains(' '),
        None => false,
    }
}
