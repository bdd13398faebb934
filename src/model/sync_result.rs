use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// Summary of one orchestration run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SyncResult {
    #[schema(example = "5f0c8a9e-3d2b-4f7a-9c1e-2b7d6a4e8f10")]
    pub run_id: String,

    #[schema(example = "2025-12-08", value_type = String, format = "date")]
    pub target_date: NaiveDate,

    /// Records successfully upserted.
    #[schema(example = 42)]
    pub processed_count: u32,

    /// Subset of `processed_count` that did not exist before the run.
    #[schema(example = 40)]
    pub created_count: u32,

    #[schema(example = 2)]
    pub devices_connected: u32,

    /// Per-device and per-employee failures, in the order they happened.
    #[schema(example = json!(["Error syncing Back Door: connection to 192.168.1.211:4370 timed out"]))]
    pub errors: Vec<String>,

    /// Terminal ids with no matching employee. Soft warnings only.
    #[schema(example = json!(["999"]))]
    pub unmatched_ids: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SyncStatus {
    Success,
    Partial,
    Failed,
}

impl SyncResult {
    pub fn new(run_id: impl Into<String>, target_date: NaiveDate) -> Self {
        Self {
            run_id: run_id.into(),
            target_date,
            processed_count: 0,
            created_count: 0,
            devices_connected: 0,
            errors: Vec::new(),
            unmatched_ids: Vec::new(),
        }
    }

    pub fn status(&self) -> SyncStatus {
        match (self.errors.is_empty(), self.processed_count) {
            (true, _) => SyncStatus::Success,
            (false, 0) => SyncStatus::Failed,
            (false, _) => SyncStatus::Partial,
        }
    }

    /// One-line human summary, used by the CLI and the HTTP trigger.
    pub fn message(&self) -> String {
        match self.status() {
            SyncStatus::Success => format!(
                "Successfully processed {} records from {} devices.",
                self.processed_count, self.devices_connected
            ),
            SyncStatus::Partial => format!(
                "Sync completed with errors: processed {} records from {} devices.",
                self.processed_count, self.devices_connected
            ),
            SyncStatus::Failed => "Sync failed; no records were processed.".to_string(),
        }
    }
}
