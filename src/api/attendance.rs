use actix_web::{HttpResponse, error::ErrorBadRequest, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use tracing::info;
use utoipa::ToSchema;

use crate::config::Config;
use crate::model::sync_result::{SyncResult, SyncStatus};
use crate::store::{self, MySqlEmployeeDirectory};

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SyncRequest {
    /// Day to reconcile; yesterday when omitted.
    #[schema(example = "2025-12-08", value_type = String, format = "date", nullable = true)]
    pub date: Option<NaiveDate>,

    /// Restrict the run to one terminal.
    #[schema(example = 1, nullable = true)]
    pub device_id: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct SyncResponse {
    #[schema(example = "partial")]
    pub status: SyncStatus,
    #[schema(example = "Sync completed with errors: processed 42 records from 1 devices.")]
    pub message: String,
    pub result: SyncResult,
}

/// An empty body asks for the defaults; anything else must be a valid request.
fn parse_sync_request(body: &[u8]) -> actix_web::Result<SyncRequest> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(SyncRequest::default());
    }
    serde_json::from_slice(body).map_err(|e| ErrorBadRequest(format!("Invalid sync request: {e}")))
}

impl From<SyncResult> for SyncResponse {
    fn from(result: SyncResult) -> Self {
        Self {
            status: result.status(),
            message: result.message(),
            result,
        }
    }
}

/// Pull punches from the terminals and reconcile one day of attendance
#[utoipa::path(
    post,
    path = "/api/attendance/sync",
    request_body(content = SyncRequest, description = "Optional; defaults to yesterday and all devices"),
    responses(
        (status = 200, description = "Run finished; inspect status and errors", body = SyncResponse),
        (status = 400, description = "Body is present but not a valid sync request"),
        (status = 429, description = "Too many sync requests")
    ),
    tag = "Attendance"
)]
pub async fn sync_attendance(
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    employees: web::Data<MySqlEmployeeDirectory>,
    body: web::Bytes,
) -> actix_web::Result<HttpResponse> {
    let request = parse_sync_request(&body)?;

    let orchestrator = store::orchestrator(pool.get_ref(), employees.get_ref().clone(), config.get_ref());
    let result = orchestrator.run_sync(request.date, request.device_id).await;

    info!(
        status = %result.status(),
        processed = result.processed_count,
        "On-demand attendance sync"
    );

    Ok(HttpResponse::Ok().json(SyncResponse::from(result)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    use actix_web::{App, http::StatusCode, test};
    use std::time::Duration;

    #[::std::prelude::v1::test]
    fn empty_body_means_defaults() {
        for body in ["", "  \n", "{}"] {
            let request = parse_sync_request(body.as_bytes()).unwrap();
            assert_eq!(request.date, None);
            assert_eq!(request.device_id, None);
        }

        let request = parse_sync_request(br#"{"date": "2025-12-08", "device_id": 2}"#).unwrap();
        assert_eq!(request.date, NaiveDate::from_ymd_opt(2025, 12, 8));
        assert_eq!(request.device_id, Some(2));
    }

    #[::std::prelude::v1::test]
    fn malformed_body_is_rejected() {
        for body in [
            r#"{"date": "08/12/2025"}"#,
            r#"{"device_id": "front"}"#,
            "date=2025-12-08",
        ] {
            let err = parse_sync_request(body.as_bytes()).unwrap_err();
            assert_eq!(err.as_response_error().status_code(), StatusCode::BAD_REQUEST);
        }
    }

    #[actix_web::test]
    async fn bad_date_answers_400_without_running_a_sync() {
        // lazy pool: any query would fail, so a 400 proves nothing ran
        let pool = MySqlPool::connect_lazy("mysql://hr@127.0.0.1:1/hr").unwrap();
        let config = Config::from_lookup(|key| {
            (key == "DATABASE_URL").then(|| "mysql://hr@127.0.0.1:1/hr".to_string())
        })
        .unwrap();
        let employees = MySqlEmployeeDirectory::new(pool.clone(), Duration::from_secs(60));
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(pool))
                .app_data(web::Data::new(config))
                .app_data(web::Data::new(employees))
                .route("/attendance/sync", web::post().to(sync_attendance)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/attendance/sync")
            .insert_header(("content-type", "application/json"))
            .set_payload(r#"{"date":"08/12/2025","device_id":3}"#)
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[::std::prelude::v1::test]
    fn response_carries_status_and_message() {
        let mut result = SyncResult::new("run", NaiveDate::from_ymd_opt(2025, 12, 8).unwrap());
        result.processed_count = 3;
        result.devices_connected = 1;
        result.errors.push("Error syncing Gate A: connection to 10.0.0.1:4370 timed out".into());

        let body = serde_json::to_value(SyncResponse::from(result)).unwrap();

        assert_eq!(body["status"], "partial");
        assert_eq!(body["result"]["processed_count"], 3);
        assert_eq!(body["result"]["errors"].as_array().unwrap().len(), 1);
    }
}
