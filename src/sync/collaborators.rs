//! Seams between the reconciliation core and the outside world.
//!
//! The MySQL and terminal implementations live in `store` and `gateway`;
//! tests plug in the in-memory fakes.

use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use derive_more::Display;

use crate::model::{attendance::AttendanceRecord, device::AttendanceDevice, punch::PunchEvent};

#[derive(Debug, Display)]
pub enum GatewayError {
    #[display(fmt = "connection to {} failed: {}", _0, _1)]
    Connect(String, String),
    #[display(fmt = "connection to {} timed out", _0)]
    Timeout(String),
    #[display(fmt = "fetching logs failed: {}", _0)]
    Fetch(String),
    #[display(fmt = "unexpected terminal response: {}", _0)]
    Protocol(String),
}

impl std::error::Error for GatewayError {}

pub trait DeviceDirectory {
    /// Enabled terminals, optionally narrowed to one id.
    async fn active_devices(&self, device_id: Option<u64>) -> anyhow::Result<Vec<AttendanceDevice>>;
}

pub trait DeviceGateway {
    type Connection: DeviceConnection;

    async fn connect(
        &self,
        address: &str,
        port: u16,
        timeout: Duration,
    ) -> Result<Self::Connection, GatewayError>;
}

pub trait DeviceConnection {
    /// Every log the terminal still holds, any date.
    async fn fetch_all_punches(&mut self) -> Result<Vec<PunchEvent>, GatewayError>;

    async fn close(self) -> Result<(), GatewayError>;
}

pub trait EmployeeDirectory {
    /// Exact match on the employee's external code.
    async fn find_by_external_code(&self, code: &str) -> anyhow::Result<Option<u64>>;
}

pub trait AttendanceStore {
    /// Create-or-update keyed on (employee_id, date). The bool is true when
    /// the row did not exist before.
    async fn upsert(
        &self,
        employee_id: u64,
        date: NaiveDate,
        check_in: NaiveTime,
        check_out: Option<NaiveTime>,
        note: &str,
    ) -> anyhow::Result<(AttendanceRecord, bool)>;
}

pub trait DeviceActivityTracker {
    async fn mark_seen(&self, device_id: u64, when: NaiveDateTime) -> anyhow::Result<()>;
}
