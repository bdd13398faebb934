//! In-memory collaborators for orchestrator tests.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use anyhow::anyhow;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::model::{attendance::AttendanceRecord, device::AttendanceDevice, punch::PunchEvent};
use crate::sync::collaborators::{
    AttendanceStore, DeviceActivityTracker, DeviceConnection, DeviceDirectory, DeviceGateway,
    EmployeeDirectory, GatewayError,
};

#[derive(Clone)]
pub struct FakeDevice {
    pub device: AttendanceDevice,
    pub punches: Vec<PunchEvent>,
    pub reachable: bool,
    pub fail_fetch: bool,
    pub fail_close: bool,
    pub closed: Rc<Cell<bool>>,
}

impl FakeDevice {
    pub fn online(id: u64, name: &str, punches: Vec<(&str, NaiveDateTime, i32)>) -> Self {
        Self {
            device: AttendanceDevice {
                id,
                name: name.to_string(),
                ip_address: format!("10.0.0.{id}"),
                port: 4370,
                last_activity: None,
                is_active: true,
            },
            punches: punches
                .into_iter()
                .map(|(user, at, status)| PunchEvent::new(user, at, status))
                .collect(),
            reachable: true,
            fail_fetch: false,
            fail_close: false,
            closed: Rc::new(Cell::new(false)),
        }
    }

    pub fn unreachable(id: u64, name: &str) -> Self {
        Self {
            reachable: false,
            ..Self::online(id, name, Vec::new())
        }
    }

    pub fn broken_fetch(id: u64, name: &str) -> Self {
        Self {
            fail_fetch: true,
            ..Self::online(id, name, Vec::new())
        }
    }
}

#[derive(Clone)]
pub struct FakeDirectory {
    devices: Vec<AttendanceDevice>,
    seen: Rc<RefCell<Vec<u64>>>,
}

impl FakeDirectory {
    pub fn new(devices: Vec<AttendanceDevice>) -> Self {
        Self {
            devices,
            seen: Rc::default(),
        }
    }

    pub fn seen(&self) -> Vec<u64> {
        self.seen.borrow().clone()
    }
}

impl DeviceDirectory for FakeDirectory {
    async fn active_devices(&self, device_id: Option<u64>) -> anyhow::Result<Vec<AttendanceDevice>> {
        Ok(self
            .devices
            .iter()
            .filter(|d| d.is_active && device_id.is_none_or(|id| id == d.id))
            .cloned()
            .collect())
    }
}

impl DeviceActivityTracker for FakeDirectory {
    async fn mark_seen(&self, device_id: u64, _when: NaiveDateTime) -> anyhow::Result<()> {
        self.seen.borrow_mut().push(device_id);
        Ok(())
    }
}

pub struct FakeGateway {
    devices: Vec<FakeDevice>,
}

impl FakeGateway {
    pub fn new(devices: Vec<FakeDevice>) -> Self {
        Self { devices }
    }
}

pub struct FakeConnection {
    device: FakeDevice,
}

impl DeviceGateway for FakeGateway {
    type Connection = FakeConnection;

    async fn connect(
        &self,
        address: &str,
        port: u16,
        _timeout: Duration,
    ) -> Result<FakeConnection, GatewayError> {
        let target = format!("{address}:{port}");
        match self
            .devices
            .iter()
            .find(|d| d.device.ip_address == address && d.device.port == port)
        {
            Some(device) if device.reachable => Ok(FakeConnection {
                device: device.clone(),
            }),
            Some(_) => Err(GatewayError::Timeout(target)),
            None => Err(GatewayError::Connect(target, "no route to host".to_string())),
        }
    }
}

impl DeviceConnection for FakeConnection {
    async fn fetch_all_punches(&mut self) -> Result<Vec<PunchEvent>, GatewayError> {
        if self.device.fail_fetch {
            return Err(GatewayError::Fetch("connection reset by peer".to_string()));
        }
        Ok(self.device.punches.clone())
    }

    async fn close(self) -> Result<(), GatewayError> {
        self.device.closed.set(true);
        if self.device.fail_close {
            return Err(GatewayError::Protocol("disconnect not acknowledged".to_string()));
        }
        Ok(())
    }
}

pub struct FakeEmployees {
    by_code: HashMap<String, u64>,
}

impl FakeEmployees {
    pub fn new(employees: &[(&str, u64)]) -> Self {
        Self {
            by_code: employees
                .iter()
                .map(|(code, id)| (code.to_string(), *id))
                .collect(),
        }
    }
}

impl EmployeeDirectory for FakeEmployees {
    async fn find_by_external_code(&self, code: &str) -> anyhow::Result<Option<u64>> {
        Ok(self.by_code.get(code).copied())
    }
}

#[derive(Clone, Default)]
pub struct FakeStore {
    rows: Rc<RefCell<HashMap<(u64, NaiveDate), AttendanceRecord>>>,
    failing_employee: Option<u64>,
}

impl FakeStore {
    pub fn failing_for(employee_id: u64) -> Self {
        Self {
            failing_employee: Some(employee_id),
            ..Self::default()
        }
    }

    pub fn get(&self, employee_id: u64, date: NaiveDate) -> Option<AttendanceRecord> {
        self.rows.borrow().get(&(employee_id, date)).cloned()
    }

    pub fn len(&self) -> usize {
        self.rows.borrow().len()
    }
}

impl AttendanceStore for FakeStore {
    async fn upsert(
        &self,
        employee_id: u64,
        date: NaiveDate,
        check_in: NaiveTime,
        check_out: Option<NaiveTime>,
        note: &str,
    ) -> anyhow::Result<(AttendanceRecord, bool)> {
        if self.failing_employee == Some(employee_id) {
            return Err(anyhow!("deadlock found when trying to get lock"));
        }

        let mut rows = self.rows.borrow_mut();
        let next_id = rows.len() as u64 + 1;
        let created = !rows.contains_key(&(employee_id, date));
        let record = rows
            .entry((employee_id, date))
            .or_insert_with(|| AttendanceRecord {
                id: next_id,
                employee_id,
                date,
                check_in,
                check_out,
                notes: None,
            });
        record.check_in = check_in;
        record.check_out = check_out;
        record.notes = Some(note.to_string());

        Ok((record.clone(), created))
    }
}
