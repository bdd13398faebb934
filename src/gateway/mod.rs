//! Terminal bridge adapter.
//!
//! Each terminal sits behind a small HTTP bridge that answers `GET /status`
//! and dumps its stored logs on `GET /attendance`. The terminal protocol
//! itself stays on the bridge's side.

use std::time::Duration;

use chrono::NaiveDateTime;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::model::punch::PunchEvent;
use crate::sync::collaborators::{DeviceConnection, DeviceGateway, GatewayError};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Clone, Default)]
pub struct HttpTerminalGateway;

impl HttpTerminalGateway {
    pub fn new() -> Self {
        Self
    }
}

pub struct HttpTerminalConnection {
    client: reqwest::Client,
    base_url: String,
    target: String,
}

/// One log entry as the bridge reports it.
#[derive(Debug, Deserialize)]
struct TerminalLog {
    user_id: Value,
    timestamp: String,
    status: i32,
}

impl TerminalLog {
    fn into_event(self) -> Option<PunchEvent> {
        let employee_external_id = match self.user_id {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            other => {
                warn!(user_id = %other, "Dropping log with unusable user id");
                return None;
            }
        };

        match NaiveDateTime::parse_from_str(self.timestamp.trim(), TIMESTAMP_FORMAT) {
            Ok(timestamp) => Some(PunchEvent::new(employee_external_id, timestamp, self.status)),
            Err(e) => {
                warn!(timestamp = %self.timestamp, error = %e, "Dropping log with bad timestamp");
                None
            }
        }
    }
}

fn request_error(target: &str, e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Timeout(target.to_string())
    } else {
        GatewayError::Connect(target.to_string(), e.to_string())
    }
}

fn decode_logs(body: &str) -> Result<Vec<PunchEvent>, GatewayError> {
    let logs: Vec<TerminalLog> =
        serde_json::from_str(body).map_err(|e| GatewayError::Protocol(e.to_string()))?;
    Ok(logs.into_iter().filter_map(TerminalLog::into_event).collect())
}

impl DeviceGateway for HttpTerminalGateway {
    type Connection = HttpTerminalConnection;

    async fn connect(
        &self,
        address: &str,
        port: u16,
        timeout: Duration,
    ) -> Result<HttpTerminalConnection, GatewayError> {
        let target = format!("{address}:{port}");
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Connect(target.clone(), e.to_string()))?;
        let base_url = format!("http://{target}");

        let response = client
            .get(format!("{base_url}/status"))
            .send()
            .await
            .map_err(|e| request_error(&target, e))?;
        if !response.status().is_success() {
            return Err(GatewayError::Protocol(format!(
                "status check answered {}",
                response.status()
            )));
        }

        debug!(address = %target, "Terminal bridge reachable");
        Ok(HttpTerminalConnection {
            client,
            base_url,
            target,
        })
    }
}

impl DeviceConnection for HttpTerminalConnection {
    async fn fetch_all_punches(&mut self) -> Result<Vec<PunchEvent>, GatewayError> {
        let response = self
            .client
            .get(format!("{}/attendance", self.base_url))
            .send()
            .await
            .map_err(|e| request_error(&self.target, e))?;
        if !response.status().is_success() {
            return Err(GatewayError::Fetch(format!(
                "attendance dump answered {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::Fetch(e.to_string()))?;
        let events = decode_logs(&body)?;
        debug!(address = %self.target, events = events.len(), "Fetched terminal logs");
        Ok(events)
    }

    async fn close(self) -> Result<(), GatewayError> {
        // stateless bridge, nothing to release
        Ok(())
    }
}
