//! Option catalog loading and the read-only index the engine queries.

#![deny(unsafe_code)]

pub mod error;
pub mod index;
pub mod loader;

pub use crate::error::CatalogError;
pub use crate::index::{Catalog, DefaultEntry, StyleRecord};
pub use crate::loader::{default_catalog_path, load_catalog, load_engine_options};
