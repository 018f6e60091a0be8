use std::sync::Arc;

use rocket::form::Form;
use rocket::http::CookieJar;
use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use rocket::State;
use rocket_dyn_templates::Template;
use serde_json::json;

use crate::audit::AuditRecorder;
use crate::rate_limit::{Bucket, RateLimiter};
use crate::routes::page_context;
use crate::security::auth::{self, ClientIp, UserAgent};
use crate::store::Store;

#[derive(Debug, FromForm)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[get("/login")]
pub fn login_page(store: &State<Arc<dyn Store>>, flash: Option<FlashMessage<'_>>) -> Template {
    let context = page_context(&**store.inner(), flash, json!({ "page_title": "Admin Login" }));
    Template::render("admin/login", &context)
}

#[post("/login", data = "<form>")]
pub fn login_submit(
    form: Form<LoginForm>,
    store: &State<Arc<dyn Store>>,
    limiter: &State<Arc<RateLimiter>>,
    audit: &State<AuditRecorder>,
    cookies: &CookieJar<'_>,
    client_ip: ClientIp,
    user_agent: UserAgent,
) -> Result<Redirect, Flash<Redirect>> {
    let s: &dyn Store = &**store.inner();
    let fail = |msg: &str| Flash::error(Redirect::to("/admin/login"), msg);

    if !limiter.allow(s, Bucket::Login, &client_ip.0) {
        log::warn!("Login rate limit hit for {}", auth::hash_ip(&client_ip.0));
        return Err(fail("Too many login attempts. Please try again in 15 minutes."));
    }

    let admin = match auth::authenticate(s, &form.email, &form.password) {
        Ok(a) => a,
        Err(e) => return Err(fail(&e.user_message())),
    };
    if !admin.is_admin {
        return Err(fail("This account does not have admin access."));
    }

    let session_id = match auth::create_session(
        s,
        admin.id,
        Some(&client_ip.0),
        user_agent.0.as_deref(),
    ) {
        Ok(id) => id,
        Err(e) => {
            log::error!("Session creation failed: {}", e);
            return Err(fail("Could not sign you in. Please try again."));
        }
    };
    auth::set_session_cookie(cookies, &session_id, s);
    audit.record(&admin.email, Some(&client_ip.0), "Logged in");

    Ok(Redirect::to("/admin/dashboard"))
}
