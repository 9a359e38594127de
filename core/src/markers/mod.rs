pub mod model;
pub mod store;

pub use model::{Marker, MarkerDraft, Severity};
pub use store::MarkerStore;
