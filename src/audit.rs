use std::sync::Arc;

use crate::store::Store;

/// Append-only record of admin actions, written after the business change
/// has committed.
///
/// A failed write never undoes or fails the action it describes; it is
/// reported under the `audit` log target instead.
pub struct AuditRecorder {
    store: Arc<dyn Store>,
}

impl AuditRecorder {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub fn record(&self, admin_email: &str, ip: Option<&str>, action: &str) {
        match self.store.audit_append(admin_email, action, ip) {
            Ok(id) => log::info!(target: "audit", "#{} {}: {}", id, admin_email, action),
            Err(e) => log::error!(
                target: "audit",
                "Failed to record audit entry ({}: {}): {}",
                admin_email,
                action,
                e
            ),
        }
    }
}
