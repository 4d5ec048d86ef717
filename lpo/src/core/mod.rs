//! Core data structures and their import/export

/// IO Traits
pub mod io;

pub mod lpo;

pub use lpo::LPO;
