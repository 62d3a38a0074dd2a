//! System orchestration, startup, and shutdown logic.

pub mod address_system;
pub mod telemetry;

pub use address_system::*;
pub use telemetry::*;
