//! HTTP and WebSocket surface of the gateway.

pub mod relay;
pub mod routes;

pub use routes::{routes, GatewayState};
