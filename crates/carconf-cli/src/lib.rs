//! CLI library components for the option configurator.

#![deny(unsafe_code)]

pub mod logging;
pub mod session;
pub mod summary;
