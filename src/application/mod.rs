//! Application layer: the stateful tree store
//!
//! This layer owns the committed tree and drives the pure domain functions.

pub mod error;
pub mod store;

pub use error::{ApplicationError, ApplicationResult};
pub use store::TreeStore;
