use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use chrono::Local;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::gateway::HttpTerminalGateway;
use crate::model::device::AttendanceDevice;
use crate::store::MySqlDeviceDirectory;
use crate::sync::collaborators::{
    DeviceActivityTracker, DeviceConnection, DeviceDirectory, DeviceGateway,
};

/// List active attendance devices
#[utoipa::path(
    get,
    path = "/api/devices",
    responses(
        (status = 200, description = "Active terminals", body = [AttendanceDevice]),
        (status = 500, description = "Internal server error")
    ),
    tag = "Device"
)]
pub async fn list_devices(pool: web::Data<MySqlPool>) -> actix_web::Result<impl Responder> {
    let devices = MySqlDeviceDirectory::new(pool.get_ref().clone())
        .active_devices(None)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to list devices");
            ErrorInternalServerError("Database error")
        })?;

    Ok(HttpResponse::Ok().json(devices))
}

/// Test the connection to one device
#[utoipa::path(
    post,
    path = "/api/devices/{device_id}/test",
    params(
        ("device_id", Path, description = "Device ID")
    ),
    responses(
        (status = 200, description = "Connection attempted", body = Object, example = json!({
            "status": "connected",
            "message": "Successfully connected to Main Entrance (192.168.1.210)!"
        })),
        (status = 404, description = "Device not found", body = Object, example = json!({
            "message": "Device not found"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Device"
)]
pub async fn test_connection(
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let device_id = path.into_inner();
    let directory = MySqlDeviceDirectory::new(pool.get_ref().clone());

    let device = directory.get(device_id).await.map_err(|e| {
        error!(error = %e, device_id, "Failed to load device");
        ErrorInternalServerError("Database error")
    })?;
    let Some(device) = device else {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Device not found"
        })));
    };

    let gateway = HttpTerminalGateway::new();
    match gateway
        .connect(&device.ip_address, device.port, config.device_probe_timeout)
        .await
    {
        Ok(conn) => {
            if let Err(e) = directory.mark_seen(device.id, Local::now().naive_local()).await {
                warn!(error = %e, device_id, "Could not record device activity");
            }
            let _ = conn.close().await;
            info!(device_id, "Device connection test succeeded");

            Ok(HttpResponse::Ok().json(json!({
                "status": "connected",
                "message": format!("Successfully connected to {} ({})!", device.name, device.ip_address)
            })))
        }
        Err(e) => {
            warn!(error = %e, device_id, "Device connection test failed");
            Ok(HttpResponse::Ok().json(json!({
                "status": "failed",
                "message": format!("Failed to connect: {e}")
            })))
        }
    }
}
