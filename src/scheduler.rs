use std::time::Duration;

use chrono::{Local, NaiveDateTime, NaiveTime};
use sqlx::MySqlPool;
use tracing::{info, warn};

use crate::config::Config;
use crate::store::{self, MySqlEmployeeDirectory};

/// Time left until the next `at` strictly after `now`.
pub fn until_next(now: NaiveDateTime, at: NaiveTime) -> Duration {
    let today = now.date().and_time(at);
    let next = if today > now {
        today
    } else {
        today + chrono::Duration::days(1)
    };
    (next - now).to_std().unwrap_or_default()
}

/// Runs a default-date sync every day at `at`, forever.
pub async fn run_daily(at: NaiveTime, pool: MySqlPool, employees: MySqlEmployeeDirectory, config: Config) {
    info!(%at, "Nightly attendance sync scheduled");

    loop {
        let wait = until_next(Local::now().naive_local(), at);
        actix_web::rt::time::sleep(wait).await;

        let result = store::orchestrator(&pool, employees.clone(), &config)
            .run_sync(None, None)
            .await;

        if result.errors.is_empty() {
            info!(
                target_date = %result.target_date,
                processed = result.processed_count,
                "Nightly attendance sync done"
            );
        } else {
            warn!(
                target_date = %result.target_date,
                processed = result.processed_count,
                errors = ?result.errors,
                "Nightly attendance sync finished with errors"
            );
        }
    }
}
