use log::{error, info, warn};
use std::env;
use std::fs;
use std::path::Path;
use std::process;

use crate::models::admin::NewAdmin;
use crate::security::auth::hash_password;
use crate::store::Store;

/// Required directories that will be created if missing
const REQUIRED_DIRS: &[&str] = &[
    "website",
    "website/db",
    "website/templates",
    "website/templates/admin",
];

/// Templates the server cannot run without
const CRITICAL_TEMPLATES: &[&str] = &[
    "website/templates/base.html.tera",
    "website/templates/home.html.tera",
    "website/templates/admin/base.html.tera",
    "website/templates/admin/login.html.tera",
    "website/templates/admin/dashboard.html.tera",
];

/// Run all boot checks. Call this before Rocket launches.
/// Creates missing directories, checks templates, and aborts if the
/// database directory is unusable.
pub fn run(db_path: &str) {
    info!("Boot check starting...");

    let mut warnings = 0u32;
    let mut errors = 0u32;

    // ── 1. Directories ─────────────────────────────────
    let db_dir = Path::new(db_path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf);
    let dirs = REQUIRED_DIRS
        .iter()
        .map(|d| Path::new(d).to_path_buf())
        .chain(db_dir.clone());
    for path in dirs {
        if !path.exists() {
            match fs::create_dir_all(&path) {
                Ok(_) => info!("  Created directory: {}", path.display()),
                Err(e) => {
                    error!("  FAILED to create directory {}: {}", path.display(), e);
                    errors += 1;
                }
            }
        }
    }

    // ── 2. Critical templates ──────────────────────────
    for file in CRITICAL_TEMPLATES {
        if !Path::new(file).exists() {
            error!("  MISSING critical template: {}", file);
            errors += 1;
        }
    }

    // ── 3. Database directory writable ──────────────────
    if let Some(dir) = db_dir.filter(|d| d.exists()) {
        let test_file = dir.join(".write_test");
        match fs::write(&test_file, "test") {
            Ok(_) => {
                let _ = fs::remove_file(&test_file);
            }
            Err(e) => {
                error!("  Database directory not writable: {}", e);
                errors += 1;
            }
        }
    }

    // ── 4. Rocket.toml exists ───────────────────────────
    if !Path::new("Rocket.toml").exists() {
        warn!("  Rocket.toml not found, using default config");
        warnings += 1;
    }

    // ── Summary ─────────────────────────────────────────
    if errors > 0 {
        error!(
            "Boot check FAILED: {} error(s), {} warning(s). Aborting.",
            errors, warnings
        );
        process::exit(1);
    }

    if warnings > 0 {
        warn!(
            "Boot check passed with {} warning(s). Some features may not work correctly.",
            warnings
        );
    } else {
        info!("Boot check passed. All systems go.");
    }
}

/// Create the first admin from `SITE_ADMIN_*` environment variables when
/// the admins table is empty.
pub fn bootstrap_admin(store: &dyn Store) {
    if store.admin_count() > 0 {
        return;
    }

    let (email, password) = match (env::var("SITE_ADMIN_EMAIL"), env::var("SITE_ADMIN_PASSWORD")) {
        (Ok(e), Ok(p)) if !e.trim().is_empty() && !p.is_empty() => (e, p),
        _ => {
            warn!("No admin account exists. Set SITE_ADMIN_EMAIL and SITE_ADMIN_PASSWORD to create one.");
            return;
        }
    };

    let password_hash = match hash_password(&password) {
        Ok(h) => h,
        Err(e) => {
            error!("Failed to hash bootstrap admin password: {}", e);
            return;
        }
    };
    let new = NewAdmin {
        name: env::var("SITE_ADMIN_NAME").unwrap_or_else(|_| "Administrator".to_string()),
        email,
        phone: env::var("SITE_ADMIN_PHONE").unwrap_or_else(|_| "0000000000".to_string()),
        password_hash,
        is_admin: true,
    };

    match store.admin_create(&new) {
        Ok(id) => info!("Created admin account #{} for {}", id, new.email.trim().to_lowercase()),
        Err(e) => error!("Failed to create bootstrap admin: {}", e),
    }
}
