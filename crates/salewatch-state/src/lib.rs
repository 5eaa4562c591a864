//! Persistent per-store sale status.
//!
//! [`SaleStateStore`] turns the stream of per-run verdicts into "new sale"
//! events: a store notifies once when its sale starts, stays quiet while the
//! sale runs, and can notify again only after the sale has been seen to end.

mod error;
mod record;
mod store;

pub use error::StateError;
pub use record::{PersistedState, StoreRecord};
pub use store::{Observation, SaleStateStore};
