pub mod capped;
pub mod filters;
pub mod zone;

pub use capped::CappedLog;
pub use filters::{MarkerFilter, ShipFilter};
pub use zone::{OperationZone, ZoneAlert, ZoneEvaluation, ZoneTracker};
