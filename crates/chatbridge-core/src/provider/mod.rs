//! Provider catalog and credential resolution.

pub mod credential;
pub mod registry;
