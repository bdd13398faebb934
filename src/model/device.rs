use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "name": "Main Entrance",
        "ip_address": "192.168.1.210",
        "port": 4370,
        "last_activity": "2025-12-09T02:00:04",
        "is_active": true
    })
)]
pub struct AttendanceDevice {
    pub id: u64,
    pub name: String,
    pub ip_address: String,
    pub port: u16,
    #[schema(value_type = String, format = "date-time", nullable = true)]
    pub last_activity: Option<NaiveDateTime>,
    pub is_active: bool,
}
