//! Domain layer: entities, tree construction and the update engine
//!
//! This layer is independent of external concerns (no I/O, no config loading).

pub mod builder;
pub mod entities;
pub mod error;
pub mod record;
pub mod traverse;
pub mod update;

pub use builder::{build_tree, BuildOptions, Initializer, TreeBuilder};
pub use entities::*;
pub use error::{DomainError, TreeResult};
pub use record::{IdField, SourceRecord};
pub use traverse::PreOrder;
pub use update::{NodeUpdate, PropertiesUpdate, Update};
