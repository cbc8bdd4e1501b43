//! Option-configuration constraint engine.
//!
//! Given a [`Catalog`](carconf_catalog::Catalog) of interdependent option
//! codes, the engine keeps a selection consistent as options change: it
//! resolves the codes an element pulls in, evicts conflicting activations,
//! re-picks values that became invalid, derives standard and hidden
//! elements, and matches core changes to a catalog style.
//!
//! Start with [`Configurator::apply_defaults`] and feed the returned
//! [`Configuration`] back into each operation.

#![deny(unsafe_code)]

pub mod availability;
pub mod batch;
pub mod configurator;
pub mod derive;
pub mod error;
pub mod merge;
pub mod render;
pub mod resolver;
pub mod style;

pub use batch::{BatchDimensions, BatchItem, enumerate_batch};
pub use configurator::{Configurator, SelectOutcome};
pub use derive::{Configuration, correct_category_values, derive_standard_and_hidden};
pub use error::{EngineError, Result};
pub use merge::{activate, apply, remove_activation_and_update};
pub use render::{code_list, file_stem, image_query};
pub use resolver::resolve;
pub use style::{
    ReapplyOutcome, ReapplyStatus, StyleCandidate, find_compatible_or_groups,
    find_compatible_styles, form_options_using_style, rank_by_minimal_change,
    reapply_activations,
};
