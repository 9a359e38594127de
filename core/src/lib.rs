//! Core domain model for the NavMap maritime console.
//!
//! Holds the great-circle arithmetic shared by route planning and zone
//! tracking, AIS frame filtering for the relay, the typed assistant command
//! language and the application state with its explicit load/save boundary.

pub mod ais;
pub mod command;
pub mod export;
pub mod geo;
pub mod markers;
pub mod news;
pub mod prelude;
pub mod state;
pub mod telemetry;
pub mod tracking;
pub mod voyage;

pub use prelude::{Coordinate, NavError, NavResult};
