//! Tagged markup (XML) interchange formats for [`LPO`](crate::core::lpo::LPO)s
//!
//! Native layout (`.xml`), which also carries the `skeleton` flag:
//!
//! ```xml
//! <lpos>
//!   <lpo name="morning">
//!     <events>
//!       <event id="e1" label="Wake up">
//!         <offset x="0" y="-20"/>
//!         <position x="40" y="80"/>
//!       </event>
//!     </events>
//!     <arcs>
//!       <arc id="a1" source="e1" target="e2" user-drawn="true"/>
//!     </arcs>
//!   </lpo>
//! </lpos>
//! ```
//!
//! VipTool layout (`.lpo`):
//!
//! ```xml
//! <pnml>
//!   <lpo id="lpo1">
//!     <name><value>morning</value></name>
//!     <event id="e1">
//!       <name>
//!         <value>Wake up</value>
//!         <graphics><offset x="0" y="-20"/></graphics>
//!       </name>
//!       <graphics><position x="40" y="80"/></graphics>
//!     </event>
//!     <lpoArc id="a1" source="e1" target="e2">
//!       <graphics userDrawn="true"/>
//!     </lpoArc>
//!   </lpo>
//! </pnml>
//! ```
//!
//! The importer accepts both layouts.
use thiserror::Error;

use crate::core::lpo::LPOError;

/// Export to XML
pub mod export_lpo_xml;
/// Import from XML
pub mod import_lpo_xml;

///
/// Error encountered while reading or writing the XML format
///
#[derive(Debug, Error)]
pub enum LPOXMLError {
    /// XML error (e.g., incorrect XML format)
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Missing attribute on XML element (with expected key included)
    #[error("missing attribute `{0}`")]
    MissingKey(&'static str),
    /// Invalid value of XML attribute
    #[error("invalid value {value:?} for attribute `{key}`")]
    InvalidKeyValue {
        /// Attribute key
        key: &'static str,
        /// Encountered value
        value: String,
    },
    /// Encountered no `<lpo>` tag (i.e., the parsed data did not contain any order)
    #[error("no <lpo> element found")]
    NoLPOTag,
    /// The described order violates the structural invariants (unknown events, duplicate ids)
    #[error("invalid order: {0}")]
    Order(#[from] LPOError),
}
