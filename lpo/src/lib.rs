#![warn(
    clippy::doc_markdown,
    missing_debug_implementations,
    rust_2018_idioms,
    missing_docs
)]
#![doc = include_str!("../README.md")]

///
/// Core data structures: labelled partial orders ([`LPO`]) and their import/export
///
pub mod core;

///
/// Transitive closure, minimal elements and skeleton extraction
///
pub mod analysis;

#[doc(inline)]
pub use crate::core::lpo::{Arc, ArcID, Event, EventID, LPOError, Position, LPO};

#[doc(inline)]
pub use crate::core::io::{Exportable, Importable};

#[doc(inline)]
pub use crate::core::lpo::xml::import_lpo_xml::{import_lpos_xml_path, import_lpos_xml_slice};

#[doc(inline)]
pub use crate::core::lpo::xml::export_lpo_xml::{export_lpos_viptool_xml, export_lpos_xml};

#[doc(inline)]
pub use crate::analysis::incidence_matrix::IncidenceMatrix;

#[doc(inline)]
pub use crate::analysis::minimal_elements::minimal_elements;

#[doc(inline)]
pub use crate::analysis::transitive_closure::{transitive_closure, transitive_closure_with};

#[doc(inline)]
pub use crate::analysis::skeleton::extract_skeleton;

#[doc(inline)]
pub use crate::analysis::derive_views;
