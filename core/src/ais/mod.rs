//! AIS position reports: upstream frame filtering, the subscription handshake,
//! the ship registry and the client reconnect policy.

pub mod frame;
pub mod position;
pub mod reconnect;
pub mod registry;

pub use frame::{filter_frame, BoundingBox, DropReason, FrameOutcome, Subscription};
pub use position::ShipPosition;
pub use reconnect::ReconnectPolicy;
pub use registry::ShipRegistry;
