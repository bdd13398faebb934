use std::borrow::Cow;
use std::time::Duration;

use chrono::{Days, Local, NaiveDate};
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::model::{
    device::AttendanceDevice,
    punch::DailyPunchSet,
    sync_result::SyncResult,
};
use crate::sync::collaborators::{
    AttendanceStore, DeviceActivityTracker, DeviceConnection, DeviceDirectory, DeviceGateway,
    EmployeeDirectory, GatewayError,
};
use crate::sync::normalizer::{PunchMap, merge_into, normalize};
use crate::sync::resolver::{Confidence, StatusCodes, resolve};

pub const NO_ACTIVE_DEVICES: &str = "No active devices found.";

#[derive(Debug, Clone)]
pub struct SyncSettings {
    pub status_codes: StatusCodes,
    pub connect_timeout: Duration,
    pub note: String,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            status_codes: StatusCodes::default(),
            connect_timeout: Duration::from_secs(10),
            note: "Synced via Device".to_string(),
        }
    }
}

impl From<&Config> for SyncSettings {
    fn from(config: &Config) -> Self {
        Self {
            status_codes: config.status_codes.clone(),
            connect_timeout: config.device_connect_timeout,
            note: config.sync_note.clone(),
        }
    }
}

/// Nightly runs read the terminals the morning after.
pub fn default_target_date(today: NaiveDate) -> NaiveDate {
    today.checked_sub_days(Days::new(1)).unwrap_or(today)
}

/// Drives one reconciliation run over every active terminal.
///
/// Devices are visited one at a time. A failing device only adds an entry to
/// `SyncResult::errors`; the run carries on with the next one.
pub struct SyncOrchestrator<D, G, E, S, T> {
    devices: D,
    gateway: G,
    employees: E,
    store: S,
    tracker: T,
    settings: SyncSettings,
}

impl<D, G, E, S, T> SyncOrchestrator<D, G, E, S, T>
where
    D: DeviceDirectory,
    G: DeviceGateway,
    E: EmployeeDirectory,
    S: AttendanceStore,
    T: DeviceActivityTracker,
{
    pub fn new(devices: D, gateway: G, employees: E, store: S, tracker: T, settings: SyncSettings) -> Self {
        Self {
            devices,
            gateway,
            employees,
            store,
            tracker,
            settings,
        }
    }

    /// Reconciles `target_date` (yesterday when omitted). Never fails; look
    /// at `errors` and `processed_count` on the result.
    pub async fn run_sync(&self, target_date: Option<NaiveDate>, device_id: Option<u64>) -> SyncResult {
        let target_date =
            target_date.unwrap_or_else(|| default_target_date(Local::now().date_naive()));
        let run_id = Uuid::new_v4().to_string();

        let span = info_span!("attendance_sync", run_id = %run_id, target_date = %target_date);
        self.run(run_id, target_date, device_id).instrument(span).await
    }

    async fn run(&self, run_id: String, target_date: NaiveDate, device_id: Option<u64>) -> SyncResult {
        let mut result = SyncResult::new(run_id, target_date);

        let devices = match self.devices.active_devices(device_id).await {
            Ok(devices) => devices,
            Err(e) => {
                error!(error = %e, "Failed to list attendance devices");
                result.errors.push(format!("Error listing devices: {e:#}"));
                return result;
            }
        };

        if devices.is_empty() {
            warn!(?device_id, "No active attendance devices");
            result.errors.push(NO_ACTIVE_DEVICES.to_string());
            return result;
        }

        let mut punches = PunchMap::new();
        for device in &devices {
            match self.pull_device(device, target_date, &mut result).await {
                Ok(device_punches) => {
                    debug!(device = %device.name, employees = device_punches.len(), "Device logs collected");
                    merge_into(&mut punches, device_punches);
                }
                Err(e) => {
                    let message = format!("Error syncing {}: {}", device.name, e);
                    error!(device_id = device.id, "{}", message);
                    result.errors.push(message);
                }
            }
        }

        for (external_id, marks) in punches {
            let Some(day) = DailyPunchSet::new(external_id, target_date, marks) else {
                continue;
            };

            match self.process_employee(&day).await {
                Ok(Some(created)) => {
                    result.processed_count += 1;
                    if created {
                        result.created_count += 1;
                    }
                }
                Ok(None) => {
                    warn!(external_id = day.employee_external_id(), "No employee matches terminal id, skipping");
                    result.unmatched_ids.push(day.employee_external_id().to_string());
                }
                Err(e) => {
                    let message = format!(
                        "Error processing employee {}: {:#}",
                        day.employee_external_id(),
                        e
                    );
                    error!("{}", message);
                    result.errors.push(message);
                }
            }
        }

        info!(
            processed = result.processed_count,
            created = result.created_count,
            devices_connected = result.devices_connected,
            errors = result.errors.len(),
            unmatched = result.unmatched_ids.len(),
            "Attendance sync finished"
        );

        result
    }

    async fn pull_device(
        &self,
        device: &AttendanceDevice,
        target_date: NaiveDate,
        result: &mut SyncResult,
    ) -> Result<PunchMap, GatewayError> {
        let mut conn = self
            .gateway
            .connect(&device.ip_address, device.port, self.settings.connect_timeout)
            .await?;
        result.devices_connected += 1;

        if let Err(e) = self.tracker.mark_seen(device.id, Local::now().naive_local()).await {
            warn!(device_id = device.id, error = %e, "Could not record device activity");
        }

        let fetched = conn.fetch_all_punches().await;
        if let Err(e) = conn.close().await {
            debug!(device_id = device.id, error = %e, "Ignoring close error");
        }

        Ok(normalize(fetched?, target_date))
    }

    /// `Ok(None)` when no employee matches the terminal id.
    async fn process_employee(&self, day: &DailyPunchSet) -> anyhow::Result<Option<bool>> {
        let Some(employee_id) = self.resolve_employee(day.employee_external_id()).await? else {
            return Ok(None);
        };

        let resolution = resolve(day, &self.settings.status_codes);
        debug!(
            employee_id,
            punches = day.len(),
            confidence = %resolution.confidence,
            "Punches resolved"
        );

        let note = self.note_for(resolution.confidence);
        let (record, created) = self
            .store
            .upsert(
                employee_id,
                day.target_date(),
                resolution.check_in,
                resolution.check_out,
                &note,
            )
            .await?;

        debug!(
            employee_id,
            record_id = record.id,
            created,
            check_in = %resolution.check_in,
            check_out = ?resolution.check_out,
            "Attendance upserted"
        );

        Ok(Some(created))
    }

    async fn resolve_employee(&self, external_id: &str) -> anyhow::Result<Option<u64>> {
        if let Some(id) = self.employees.find_by_external_code(external_id).await? {
            return Ok(Some(id));
        }

        match without_leading_zeros(external_id) {
            Some(code) => self.employees.find_by_external_code(&code).await,
            None => Ok(None),
        }
    }

    fn note_for(&self, confidence: Confidence) -> Cow<'_, str> {
        match confidence {
            Confidence::Positional => Cow::Owned(format!("{} (positional)", self.settings.note)),
            _ => Cow::Borrowed(&self.settings.note),
        }
    }
}

/// "007" → "7". Only numeric ids with a leading zero get a second lookup.
fn without_leading_zeros(external_id: &str) -> Option<String> {
    if !external_id.starts_with('0') {
        return None;
    }
    external_id
        .parse::<u64>()
        .ok()
        .map(|n| n.to_string())
        .filter(|code| code != external_id)
}
