//! IO implementations for [`LPO`]
//!
//! Supported formats: `xml` (native layout), `lpo` (VipTool layout, see [`crate::core::lpo::xml`])
//! and `json`. Both XML layouts are accepted on import regardless of the extension.

use std::io::{BufReader, Read, Write};

use thiserror::Error;

use crate::core::io::{Exportable, Importable};
use crate::core::lpo::xml::{
    export_lpo_xml::{export_lpo_xml, export_lpos_viptool_xml},
    import_lpo_xml::{import_lpos_xml_reader, LPOXMLImportOptions},
    LPOXMLError,
};
use crate::core::lpo::LPO;

/// Error type for [`LPO`] IO operations
#[derive(Debug, Error)]
pub enum LPOIOError {
    /// IO Error
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    /// XML import/export error
    #[error("XML Error: {0}")]
    Xml(#[from] LPOXMLError),
    /// JSON (de-)serialization error
    #[error("JSON Error: {0}")]
    Json(#[from] serde_json::Error),
    /// Unsupported Format
    #[error("Unsupported Format: {0}")]
    UnsupportedFormat(String),
}

fn is_xml(format: &str) -> bool {
    matches!(format.trim_start_matches('.'), "xml" | "lpo")
}

fn is_viptool(format: &str) -> bool {
    format.trim_start_matches('.') == "lpo"
}

fn is_json(format: &str) -> bool {
    format.trim_start_matches('.') == "json"
}

impl Importable for LPO {
    type Error = LPOIOError;

    /// Import an [`LPO`]; for XML documents with several orders, the first one is returned
    fn import_from_reader<R: Read>(reader: R, format: &str) -> Result<Self, Self::Error> {
        if is_xml(format) {
            import_lpos_xml_reader(BufReader::new(reader), LPOXMLImportOptions::default())?
                .into_iter()
                .next()
                .ok_or(LPOIOError::Xml(LPOXMLError::NoLPOTag))
        } else if is_json(format) {
            Ok(serde_json::from_reader(reader)?)
        } else {
            Err(LPOIOError::UnsupportedFormat(format.to_string()))
        }
    }
}

impl Exportable for LPO {
    type Error = LPOIOError;

    fn export_to_writer<W: Write>(&self, writer: W, format: &str) -> Result<(), Self::Error> {
        if is_viptool(format) {
            Ok(export_lpos_viptool_xml(std::slice::from_ref(self), writer)?)
        } else if is_xml(format) {
            Ok(export_lpo_xml(self, writer)?)
        } else if is_json(format) {
            Ok(serde_json::to_writer_pretty(writer, self)?)
        } else {
            Err(LPOIOError::UnsupportedFormat(format.to_string()))
        }
    }
}
