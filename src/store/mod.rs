//! MySQL-backed collaborators for the sync orchestrator.

pub mod attendance;
pub mod device;
pub mod employee;

use sqlx::MySqlPool;

use crate::config::Config;
use crate::gateway::HttpTerminalGateway;
use crate::sync::{SyncOrchestrator, SyncSettings};

pub use attendance::MySqlAttendanceStore;
pub use device::MySqlDeviceDirectory;
pub use employee::MySqlEmployeeDirectory;

pub type MySqlSyncOrchestrator = SyncOrchestrator<
    MySqlDeviceDirectory,
    HttpTerminalGateway,
    MySqlEmployeeDirectory,
    MySqlAttendanceStore,
    MySqlDeviceDirectory,
>;

/// Builds a fresh orchestrator for one run. `employees` is passed in so its
/// lookup cache outlives the run.
pub fn orchestrator(
    pool: &MySqlPool,
    employees: MySqlEmployeeDirectory,
    config: &Config,
) -> MySqlSyncOrchestrator {
    let devices = MySqlDeviceDirectory::new(pool.clone());
    SyncOrchestrator::new(
        devices.clone(),
        HttpTerminalGateway::new(),
        employees,
        MySqlAttendanceStore::new(pool.clone()),
        devices,
        SyncSettings::from(config),
    )
}
