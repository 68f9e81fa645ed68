/*
[INPUT]:  Crate modules and public type definitions
[OUTPUT]: Public marketplace bridge gateway crate surface
[POS]:    Crate root - module wiring
[UPDATE]: When public modules or exports change
*/

pub mod api;
pub mod client;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use api::{ActionDispatcher, StatusSource};
pub use client::{BridgeClient, BridgeConfig};
pub use error::{GatewayError, Result};
pub use types::{ActionRequest, JobStatus, StatusEntry};
