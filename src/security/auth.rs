use std::sync::{Arc, OnceLock};

use chrono::{Duration, Utc};
use rocket::http::{Cookie, CookieJar, Status};
use rocket::request::{FromRequest, Outcome, Request};
use rocket::State;
use sha2::{Digest, Sha256};

use crate::error::{AppError, AppResult};
use crate::models::admin::Admin;
use crate::store::Store;

pub const SESSION_COOKIE: &str = "leadsite_session";

// ── Client IP request guard ──

/// Extracts the real client IP from the request.
/// Checks headers in priority order:
///   1. CF-Connecting-IP (Cloudflare)
///   2. True-Client-IP (Cloudflare Enterprise / Akamai)
///   3. X-Real-IP (nginx proxy_set_header)
///   4. X-Forwarded-For (first IP in the chain = original client)
///   5. Rocket's client_ip() (socket peer address)
pub struct ClientIp(pub String);

fn first_header<'a>(request: &'a Request<'_>, names: &[&str]) -> Option<&'a str> {
    names.iter().find_map(|name| {
        request
            .headers()
            .get_one(name)
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
    })
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for ClientIp {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        if let Some(ip) = first_header(request, &["CF-Connecting-IP", "True-Client-IP", "X-Real-IP"]) {
            return Outcome::Success(ClientIp(ip.to_string()));
        }

        // X-Forwarded-For: client, proxy1, proxy2: take the leftmost
        if let Some(forwarded) = request.headers().get_one("X-Forwarded-For") {
            if let Some(ip) = forwarded.split(',').next().map(str::trim) {
                if !ip.is_empty() {
                    return Outcome::Success(ClientIp(ip.to_string()));
                }
            }
        }

        let ip = request
            .client_ip()
            .map(|ip| ip.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        Outcome::Success(ClientIp(ip))
    }
}

/// Raw `User-Agent` header, stored alongside the session.
pub struct UserAgent(pub Option<String>);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for UserAgent {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let ua = request.headers().get_one("User-Agent").map(str::to_string);
        Outcome::Success(UserAgent(ua))
    }
}

// ── Admin guard ──

/// Guard for every admin-only route: a live session whose account is
/// active and carries the admin flag.
///
/// No session forwards with 401 (caught and sent to the login page); a
/// session without the admin flag forwards with 403 (sent home).
pub struct AdminUser {
    pub admin: Admin,
    pub session_id: String,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AdminUser {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        match resolve_session_admin(request).await {
            Some((admin, session_id)) if admin.is_admin => {
                Outcome::Success(AdminUser { admin, session_id })
            }
            Some(_) => Outcome::Forward(Status::Forbidden),
            None => Outcome::Forward(Status::Unauthorized),
        }
    }
}

async fn resolve_session_admin(request: &Request<'_>) -> Option<(Admin, String)> {
    let store = request
        .guard::<&State<Arc<dyn Store>>>()
        .await
        .succeeded()?;
    let cookies = request.cookies();
    let session_id = cookies.get_private(SESSION_COOKIE)?.value().to_string();

    let admin = store
        .session_get_admin_id(&session_id)
        .and_then(|id| store.admin_get_by_id(id));
    match admin {
        Some(admin) if admin.is_active => Some((admin, session_id)),
        _ => {
            cookies.remove_private(Cookie::from(SESSION_COOKIE));
            None
        }
    }
}

// ── Password utilities ──

pub fn hash_password(password: &str) -> AppResult<String> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST).map_err(|e| AppError::Database(e.to_string()))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

/// Hash checked when the email matches no account, so a miss costs the
/// same bcrypt work as a wrong password.
fn dummy_hash() -> &'static str {
    static HASH: OnceLock<String> = OnceLock::new();
    HASH.get_or_init(|| {
        bcrypt::hash("not-a-real-password", bcrypt::DEFAULT_COST).unwrap_or_default()
    })
}

/// Check an email/password pair. Unknown email, wrong password and a
/// disabled account all yield the same `InvalidCredentials`.
pub fn authenticate(store: &dyn Store, email: &str, password: &str) -> AppResult<Admin> {
    match store.admin_get_by_email(email) {
        Some(admin) => {
            if verify_password(password, &admin.password_hash) && admin.is_active {
                Ok(admin)
            } else {
                Err(AppError::InvalidCredentials)
            }
        }
        None => {
            let _ = verify_password(password, dummy_hash());
            Err(AppError::InvalidCredentials)
        }
    }
}

// ── Session management ──

pub fn create_session(
    store: &dyn Store,
    admin_id: i64,
    ip: Option<&str>,
    ua: Option<&str>,
) -> AppResult<String> {
    let expiry_hours = store.setting_get_i64("session_expiry_hours", 24).max(1);
    let session_id = uuid::Uuid::new_v4().to_string();
    let expires = Utc::now().naive_utc() + Duration::hours(expiry_hours);
    let expires_str = expires.format("%Y-%m-%d %H:%M:%S").to_string();

    store.session_create_full(admin_id, &session_id, &expires_str, ip, ua)?;

    Ok(session_id)
}

pub fn destroy_session(store: &dyn Store, session_id: &str) -> AppResult<()> {
    store.session_delete(session_id)
}

/// Private (encrypted), HttpOnly, SameSite=Strict. `Secure` when the
/// configured site URL is https.
pub fn set_session_cookie(cookies: &CookieJar<'_>, session_id: &str, store: &dyn Store) {
    let is_secure = store.site_identity().is_https();

    let mut cookie = Cookie::new(SESSION_COOKIE, session_id.to_string());
    cookie.set_http_only(true);
    cookie.set_same_site(rocket::http::SameSite::Strict);
    cookie.set_path("/");
    if is_secure {
        cookie.set_secure(true);
    }
    cookies.add_private(cookie);
}

pub fn clear_session_cookie(cookies: &CookieJar<'_>) {
    cookies.remove_private(Cookie::from(SESSION_COOKIE));
}

pub fn hash_ip(ip: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(ip.as_bytes());
    hex::encode(hasher.finalize())
}
