use std::sync::Arc;

use rocket::form::Form;
use rocket::http::CookieJar;
use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use rocket::State;
use rocket_dyn_templates::Template;
use serde_json::json;

use crate::audit::AuditRecorder;
use crate::error::{AppError, AppResult};
use crate::models::admin::Admin;
use crate::routes::{looks_like_email, non_empty, page_context};
use crate::security::auth::{self, AdminUser, ClientIp};
use crate::store::Store;

pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, FromForm, Default)]
pub struct CredentialsForm {
    pub current_password: String,
    pub new_email: Option<String>,
    pub new_password: Option<String>,
    pub confirm_password: Option<String>,
}

/// What a valid submission changes.
#[derive(Debug, PartialEq)]
pub struct CredentialChange {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl CredentialsForm {
    /// Check the form against the signed-in admin. Hashing is left to the
    /// caller so this stays cheap to test.
    pub fn validate(&self, admin: &Admin) -> AppResult<CredentialChange> {
        if !auth::verify_password(&self.current_password, &admin.password_hash) {
            return Err(AppError::validation("Current password is incorrect."));
        }

        let email = match non_empty(self.new_email.as_deref()) {
            Some(e) if e.eq_ignore_ascii_case(&admin.email) => None,
            Some(e) if !looks_like_email(&e) => {
                return Err(AppError::validation("Please enter a valid email address."))
            }
            other => other,
        };

        let password = match self.new_password.as_deref().filter(|p| !p.is_empty()) {
            Some(p) if p.chars().count() < MIN_PASSWORD_LEN => {
                return Err(AppError::validation(format!(
                    "New password must be at least {} characters.",
                    MIN_PASSWORD_LEN
                )))
            }
            Some(p) if Some(p) != self.confirm_password.as_deref() => {
                return Err(AppError::validation("New passwords do not match."))
            }
            other => other.map(str::to_string),
        };

        if email.is_none() && password.is_none() {
            return Err(AppError::validation("Nothing to change."));
        }
        Ok(CredentialChange { email, password })
    }
}

#[get("/change-credentials")]
pub fn change_credentials_page(
    admin: AdminUser,
    store: &State<Arc<dyn Store>>,
    flash: Option<FlashMessage<'_>>,
) -> Template {
    let context = page_context(
        &**store.inner(),
        flash,
        json!({ "page_title": "Change Credentials", "admin": admin.admin }),
    );
    Template::render("admin/change_credentials", &context)
}

/// On success every session of this admin is gone, so the caller signs in
/// again with the new credentials.
#[post("/change-credentials", data = "<form>")]
pub fn change_credentials_submit(
    admin: AdminUser,
    form: Form<CredentialsForm>,
    store: &State<Arc<dyn Store>>,
    audit: &State<AuditRecorder>,
    cookies: &CookieJar<'_>,
    client_ip: ClientIp,
) -> Flash<Redirect> {
    let s: &dyn Store = &**store.inner();
    let back = || Redirect::to("/admin/change-credentials");

    let change = match form.validate(&admin.admin) {
        Ok(c) => c,
        Err(e) => return Flash::error(back(), e.user_message()),
    };
    let hash = match change.password.as_deref().map(auth::hash_password).transpose() {
        Ok(h) => h,
        Err(e) => {
            log::error!("Password hashing failed: {}", e);
            return Flash::error(back(), "Could not update credentials. Please try again.");
        }
    };

    if let Err(e) = s.admin_update_credentials(admin.admin.id, change.email.as_deref(), hash.as_deref()) {
        return Flash::error(back(), e.user_message());
    }

    auth::clear_session_cookie(cookies);
    let what = match (&change.email, &change.password) {
        (Some(_), Some(_)) => "email and password",
        (Some(_), None) => "email",
        _ => "password",
    };
    audit.record(
        &admin.admin.email,
        Some(&client_ip.0),
        &format!("Changed {}", what),
    );
    Flash::success(
        Redirect::to("/admin/login"),
        "Credentials updated. Please sign in again.",
    )
}
