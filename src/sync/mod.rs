//! Biometric punch reconciliation: raw terminal logs in, one attendance row
//! per employee and day out.

pub mod collaborators;
pub mod normalizer;
pub mod orchestrator;
pub mod resolver;

#[cfg(test)]
mod fakes;

pub use orchestrator::{SyncOrchestrator, SyncSettings};
