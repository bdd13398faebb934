use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use sqlx::MySqlPool;

use crate::model::device::AttendanceDevice;
use crate::sync::collaborators::{DeviceActivityTracker, DeviceDirectory};

#[derive(Clone)]
pub struct MySqlDeviceDirectory {
    pool: MySqlPool,
}

impl MySqlDeviceDirectory {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, device_id: u64) -> Result<Option<AttendanceDevice>> {
        sqlx::query_as::<_, AttendanceDevice>(
            r#"
            SELECT id, name, ip_address, port, last_activity, is_active
            FROM attendance_devices
            WHERE id = ?
            "#,
        )
        .bind(device_id)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("loading attendance device {device_id}"))
    }
}

impl DeviceDirectory for MySqlDeviceDirectory {
    async fn active_devices(&self, device_id: Option<u64>) -> Result<Vec<AttendanceDevice>> {
        let mut sql = String::from(
            "SELECT id, name, ip_address, port, last_activity, is_active \
             FROM attendance_devices WHERE is_active = TRUE",
        );
        if device_id.is_some() {
            sql.push_str(" AND id = ?");
        }
        sql.push_str(" ORDER BY id");

        let mut query = sqlx::query_as::<_, AttendanceDevice>(&sql);
        if let Some(id) = device_id {
            query = query.bind(id);
        }

        query
            .fetch_all(&self.pool)
            .await
            .context("listing active attendance devices")
    }
}

impl DeviceActivityTracker for MySqlDeviceDirectory {
    async fn mark_seen(&self, device_id: u64, when: NaiveDateTime) -> Result<()> {
        sqlx::query("UPDATE attendance_devices SET last_activity = ? WHERE id = ?")
            .bind(when)
            .bind(device_id)
            .execute(&self.pool)
            .await
            .with_context(|| format!("updating last activity of device {device_id}"))?;
        Ok(())
    }
}
