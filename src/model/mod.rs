pub mod attendance;
pub mod device;
pub mod punch;
pub mod sync_result;
