use std::time::Duration;

use anyhow::{Context, Result};
use moka::future::Cache;
use sqlx::MySqlPool;

use crate::sync::collaborators::EmployeeDirectory;

/// Looks employees up by the code the terminals know them by.
///
/// Hits are cached; misses are not, so a newly enrolled employee is picked
/// up on the next run.
#[derive(Clone)]
pub struct MySqlEmployeeDirectory {
    pool: MySqlPool,
    cache: Cache<String, u64>,
}

impl MySqlEmployeeDirectory {
    pub fn new(pool: MySqlPool, ttl: Duration) -> Self {
        Self {
            pool,
            cache: Cache::builder()
                .max_capacity(50_000)
                .time_to_live(ttl)
                .build(),
        }
    }
}

impl EmployeeDirectory for MySqlEmployeeDirectory {
    async fn find_by_external_code(&self, code: &str) -> Result<Option<u64>> {
        if let Some(id) = self.cache.get(code).await {
            return Ok(Some(id));
        }

        let id = sqlx::query_scalar::<_, u64>("SELECT id FROM employees WHERE employee_code = ?")
            .bind(code)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("looking up employee code {code:?}"))?;

        if let Some(id) = id {
            self.cache.insert(code.to_string(), id).await;
        }

        Ok(id)
    }
}
