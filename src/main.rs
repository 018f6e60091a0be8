#[macro_use]
extern crate rocket;

use std::sync::Arc;

use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::Header;
use rocket::response::content::RawHtml;
use rocket::response::Redirect;
use rocket::{Build, Rocket};
use rocket_dyn_templates::Template;

mod audit;
mod boot;
mod db;
mod error;
mod models;
mod rate_limit;
mod routes;
mod security;
mod store;
mod tasks;


use audit::AuditRecorder;
use rate_limit::RateLimiter;
use security::{CaptchaVerifier, SiteCaptcha};
use store::sqlite::SqliteStore;
use store::Store;

pub struct NoCacheAdmin;

#[rocket::async_trait]
impl Fairing for NoCacheAdmin {
    fn info(&self) -> Info {
        Info { name: "No-Cache Admin Pages", kind: Kind::Response }
    }

    async fn on_response<'r>(&self, req: &'r rocket::Request<'_>, res: &mut rocket::Response<'r>) {
        if req.uri().path().starts_with("/admin") {
            res.set_header(Header::new("Cache-Control", "no-store, no-cache, must-revalidate, max-age=0"));
            res.set_header(Header::new("Pragma", "no-cache"));
        }
    }
}

/// No session on an admin route.
#[catch(401)]
fn unauthorized() -> Redirect {
    Redirect::to("/admin/login")
}

/// Signed in, but not an admin.
#[catch(403)]
fn forbidden() -> Redirect {
    Redirect::to("/")
}

#[catch(404)]
fn not_found() -> RawHtml<String> {
    RawHtml("<html><body style='font-family:sans-serif;text-align:center;padding:80px'><h1>404</h1><p>Page not found.</p><a href='/'>Home</a></body></html>".to_string())
}

#[catch(500)]
fn server_error() -> RawHtml<String> {
    RawHtml("<html><body style='font-family:sans-serif;text-align:center;padding:80px'><h1>500</h1><p>Internal server error.</p><a href='/'>Home</a></body></html>".to_string())
}

/// Assemble the application around an already-migrated store.
pub fn build(store: Arc<dyn Store>, captcha: Arc<dyn CaptchaVerifier>) -> Rocket<Build> {
    rocket::build()
        .manage(AuditRecorder::new(Arc::clone(&store)))
        .manage(store)
        .manage(captcha)
        .manage(Arc::new(RateLimiter::new()))
        .attach(Template::fairing())
        .attach(NoCacheAdmin)
        .mount("/", routes::public::routes())
        .mount("/", routes::forms::routes())
        .mount("/admin", routes::security::routes())
        .mount("/admin", routes::admin::routes())
        .register("/", catchers![unauthorized, forbidden, not_found, server_error])
}

#[launch]
fn rocket() -> _ {
    env_logger::init();

    let db_path: String = rocket::Config::figment()
        .extract_inner("database_path")
        .unwrap_or_else(|_| db::DEFAULT_DB_PATH.to_string());

    // Directories, critical templates and Rocket.toml
    boot::run(&db_path);

    let store = SqliteStore::new_at(&db_path).expect("Failed to initialize database pool");
    store.run_migrations().expect("Failed to run database migrations");
    store.seed_defaults().expect("Failed to seed default settings");
    store.session_cleanup_expired();
    boot::bootstrap_admin(&store);

    log::info!("Database ready at {}", db_path);

    let store: Arc<dyn Store> = Arc::new(store);
    let captcha: Arc<dyn CaptchaVerifier> = Arc::new(SiteCaptcha::new(Arc::clone(&store)));

    build(store, captcha).attach(tasks::BackgroundTasks)
}
