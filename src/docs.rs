use crate::api::attendance::{SyncRequest, SyncResponse};
use crate::model::device::AttendanceDevice;
use crate::model::sync_result::{SyncResult, SyncStatus};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HRM Attendance Sync API",
        version = "1.0.0",
        description = r#"
## Biometric attendance reconciliation

Reads punch logs from the networked biometric terminals and derives one
check-in/check-out record per employee and day.

### 🔹 Key Features
- **On-demand sync**
  - Reconcile any day (yesterday by default), for all terminals or just one
- **Device checks**
  - List active terminals and test connectivity

### 📦 Response Format
- A sync always completes; `status` is `success`, `partial` or `failed`
  and `result.errors` lists what went wrong per device or employee

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::sync_attendance,

        crate::api::device::list_devices,
        crate::api::device::test_connection
    ),
    components(
        schemas(
            SyncRequest,
            SyncResponse,
            SyncResult,
            SyncStatus,
            AttendanceDevice
        )
    ),
    tags(
        (name = "Attendance", description = "Attendance reconciliation APIs"),
        (name = "Device", description = "Biometric terminal APIs"),
    )
)]
pub struct ApiDoc;
