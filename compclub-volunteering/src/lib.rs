//! Volunteer coordination for CompClub events: who offered to help at which
//! workshop, what staff decided, and telling volunteers about it.

pub mod accounts;
pub mod availability;
pub mod catalogue;
pub mod error;
pub mod memory;
pub mod model;
pub mod notifier;
pub mod reconciler;
pub mod store;

pub use error::{Entity, Error, Result, TransportError, ValidationError};
pub use memory::MemoryStore;
pub use store::Store;
