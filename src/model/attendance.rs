use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One row per (employee, date); owned by the attendance store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct AttendanceRecord {
    #[schema(example = 12)]
    pub id: u64,

    #[schema(example = 7)]
    pub employee_id: u64,

    #[schema(example = "2025-12-08", value_type = String, format = "date")]
    pub date: NaiveDate,

    #[schema(example = "08:55:00", value_type = String)]
    pub check_in: NaiveTime,

    #[schema(example = "17:40:00", value_type = String, nullable = true)]
    pub check_out: Option<NaiveTime>,

    #[schema(example = "Synced via Device", nullable = true)]
    pub notes: Option<String>,
}
