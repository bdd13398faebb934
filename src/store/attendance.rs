use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveTime};
use sqlx::MySqlPool;

use crate::model::attendance::AttendanceRecord;
use crate::sync::collaborators::AttendanceStore;

#[derive(Clone)]
pub struct MySqlAttendanceStore {
    pool: MySqlPool,
}

impl MySqlAttendanceStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

impl AttendanceStore for MySqlAttendanceStore {
    /// The affected-row count cannot tell insert from update (sqlx sets
    /// `FOUND_ROWS`), so the existing row is locked and read first.
    async fn upsert(
        &self,
        employee_id: u64,
        date: NaiveDate,
        check_in: NaiveTime,
        check_out: Option<NaiveTime>,
        note: &str,
    ) -> Result<(AttendanceRecord, bool)> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("starting attendance upsert transaction")?;

        let existing = sqlx::query_scalar::<_, u64>(
            "SELECT id FROM attendance WHERE employee_id = ? AND date = ? FOR UPDATE",
        )
        .bind(employee_id)
        .bind(date)
        .fetch_optional(&mut *tx)
        .await
        .with_context(|| format!("locking attendance of employee {employee_id} on {date}"))?;

        // (employee_id, date) is a unique key
        sqlx::query(
            r#"
            INSERT INTO attendance (employee_id, date, check_in, check_out, notes)
            VALUES (?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                check_in = VALUES(check_in),
                check_out = VALUES(check_out),
                notes = VALUES(notes)
            "#,
        )
        .bind(employee_id)
        .bind(date)
        .bind(check_in)
        .bind(check_out)
        .bind(note)
        .execute(&mut *tx)
        .await
        .with_context(|| format!("upserting attendance of employee {employee_id} on {date}"))?;

        let record = sqlx::query_as::<_, AttendanceRecord>(
            r#"
            SELECT id, employee_id, date, check_in, check_out, notes
            FROM attendance
            WHERE employee_id = ? AND date = ?
            "#,
        )
        .bind(employee_id)
        .bind(date)
        .fetch_one(&mut *tx)
        .await
        .with_context(|| format!("reading back attendance of employee {employee_id} on {date}"))?;

        tx.commit()
            .await
            .context("committing attendance upsert")?;

        Ok((record, existing.is_none()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // Runs against a scratch database that has the migrations applied and an
    // employee with id 1: `DATABASE_URL=... cargo test -- --ignored`.
    #[actix_web::test]
    #[ignore = "needs MySQL at DATABASE_URL"]
    async fn unchanged_rerun_is_not_reported_as_created() {
        dotenvy::dotenv().ok();
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let pool = MySqlPool::connect(&url).await.unwrap();
        let store = MySqlAttendanceStore::new(pool.clone());

        let date = NaiveDate::from_ymd_opt(1999, 1, 4).unwrap();
        let check_in = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        let check_out = NaiveTime::from_hms_opt(17, 0, 0).unwrap();
        sqlx::query("DELETE FROM attendance WHERE employee_id = 1 AND date = ?")
            .bind(date)
            .execute(&pool)
            .await
            .unwrap();

        let (first, created) = store
            .upsert(1, date, check_in, Some(check_out), "Synced via Device")
            .await
            .unwrap();
        assert!(created);

        let (second, created) = store
            .upsert(1, date, check_in, Some(check_out), "Synced via Device")
            .await
            .unwrap();
        assert!(!created);
        assert_eq!(second, first);

        let (updated, created) = store
            .upsert(1, date, check_in, None, "Synced via Device")
            .await
            .unwrap();
        assert!(!created);
        assert_eq!(updated.id, first.id);
        assert_eq!(updated.check_out, None);
    }
}
