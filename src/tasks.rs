use rocket::fairing::{Fairing, Info, Kind};
use rocket::tokio;
use rocket::{Orbit, Rocket};
use std::sync::Arc;
use std::time::Duration;

use crate::rate_limit::{RateLimiter, WINDOW};
use crate::store::Store;

const SESSION_CLEANUP_MINUTES: u64 = 30;

pub struct BackgroundTasks;

#[rocket::async_trait]
impl Fairing for BackgroundTasks {
    fn info(&self) -> Info {
        Info {
            name: "Background Tasks",
            kind: Kind::Liftoff,
        }
    }

    async fn on_liftoff(&self, rocket: &Rocket<Orbit>) {
        let (Some(store), Some(limiter)) = (
            rocket.state::<Arc<dyn Store>>().cloned(),
            rocket.state::<Arc<RateLimiter>>().cloned(),
        ) else {
            log::error!("[task] Managed state missing; background tasks not started");
            return;
        };

        // Expired session rows
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_secs(SESSION_CLEANUP_MINUTES * 60)).await;
                store.session_cleanup_expired();
                log::debug!("[task] Expired sessions purged");
            }
        });

        // Stale rate-limit keys
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(WINDOW).await;
                limiter.cleanup(WINDOW);
            }
        });

        log::info!("[task] Background tasks started");
    }
}
