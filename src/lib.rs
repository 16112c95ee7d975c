//! Parsing and analysis of GPC/SEC instrument exports.
//!
//! The `data` layer turns one `.rst` export into a [`data::model::SampleFile`];
//! the `analysis` layer bins a single sample into a molecular-weight
//! distribution or overlays many samples for comparison.

pub mod analysis;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod export;
