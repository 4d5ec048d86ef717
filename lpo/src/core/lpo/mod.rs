//! Labelled partial orders
pub(crate) mod lpo_struct;
pub use lpo_struct::*;
/// Graph views and structural comparison
pub mod graph;
pub mod io;
pub mod macros;
pub mod xml;

#[doc(inline)]
pub use graph::ArcSelection;
