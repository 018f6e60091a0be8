use std::sync::Arc;

use rocket::http::CookieJar;
use rocket::response::{Flash, Redirect};
use rocket::State;

use crate::audit::AuditRecorder;
use crate::security::auth::{self, AdminUser, ClientIp};
use crate::store::Store;

#[get("/logout")]
pub fn logout(
    admin: AdminUser,
    store: &State<Arc<dyn Store>>,
    audit: &State<AuditRecorder>,
    cookies: &CookieJar<'_>,
    client_ip: ClientIp,
) -> Flash<Redirect> {
    if let Err(e) = auth::destroy_session(&**store.inner(), &admin.session_id) {
        log::error!("Failed to delete session: {}", e);
    }
    auth::clear_session_cookie(cookies);
    audit.record(&admin.admin.email, Some(&client_ip.0), "Logged out");
    Flash::success(Redirect::to("/admin/login"), "You have been signed out.")
}
