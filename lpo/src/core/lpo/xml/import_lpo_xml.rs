use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use quick_xml::{events::BytesStart, Reader};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::LPOXMLError;
use crate::core::lpo::{Arc, Event, Position, LPO};

///
/// Options for XML import
///
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LPOXMLImportOptions {
    /// Log warnings for unexpected tags or tags in unexpected places
    pub verbose: bool,
}

impl Default for LPOXMLImportOptions {
    fn default() -> Self {
        Self { verbose: true }
    }
}

///
/// Current Parsing Mode (i.e., which tag is currently open / being parsed)
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    None,
    Root,
    Lpo,
    LpoName,
    Events,
    Event,
    EventName,
    Arcs,
    Arc,
}

fn read_to_string(x: &[u8]) -> String {
    if let Ok(x_str) = std::str::from_utf8(x) {
        if let Ok(unescaped) = quick_xml::escape::unescape(x_str) {
            return unescaped.to_string();
        }
        return x_str.to_string();
    }
    String::from_utf8_lossy(x).to_string()
}

fn optional_attribute(t: &BytesStart<'_>, key: &str) -> Result<Option<String>, LPOXMLError> {
    Ok(t.try_get_attribute(key)
        .map_err(quick_xml::Error::from)?
        .map(|attr| read_to_string(attr.value.as_ref())))
}

fn required_attribute(t: &BytesStart<'_>, key: &'static str) -> Result<String, LPOXMLError> {
    optional_attribute(t, key)?.ok_or(LPOXMLError::MissingKey(key))
}

fn parse_coordinate(t: &BytesStart<'_>, key: &'static str) -> Result<f64, LPOXMLError> {
    match optional_attribute(t, key)? {
        None => Ok(0.0),
        Some(value) => value
            .trim()
            .parse::<f64>()
            .map_err(|_| LPOXMLError::InvalidKeyValue { key, value }),
    }
}

fn parse_position(t: &BytesStart<'_>) -> Result<Position, LPOXMLError> {
    Ok(Position::new(parse_coordinate(t, "x")?, parse_coordinate(t, "y")?))
}

fn parse_flag(t: &BytesStart<'_>, key: &'static str, default: bool) -> Result<bool, LPOXMLError> {
    match optional_attribute(t, key)? {
        None => Ok(default),
        Some(value) => match value.trim() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            _ => Err(LPOXMLError::InvalidKeyValue { key, value }),
        },
    }
}

///
/// Import all [`LPO`]s from the given XML reader ([`quick_xml::Reader`])
///
/// Two layouts are accepted (also mixed):
///
/// - the native layout written by [`super::export_lpo_xml::export_lpos_xml`] (`<lpos>` root,
///   `name`/`label` attributes, `<events>`/`<arcs>` wrappers, `<arc user-drawn skeleton>`),
/// - the VipTool layout (`<pnml>`, `<name><value>..</value></name>` children for order and event
///   names, `<lpoArc>` with a nested `<graphics userDrawn="true"/>`).
///
/// Events and arcs are added through [`LPO::add_event`] and [`LPO::add_arc`], so dangling arcs or
/// duplicate ids are reported as [`LPOXMLError::Order`]. Arcs of an order are only added once all
/// its events are known, so their relative position in the document does not matter.
///
/// `<arc>` elements are generating unless `user-drawn="false"`; `<lpoArc>` elements are generating
/// only with `userDrawn="true"` on their `<graphics>` child. The optional `skeleton` attribute maps
/// to [`Arc::skeleton`] (default: `false`).
///
pub fn import_lpos_xml<T>(
    reader: &mut Reader<T>,
    options: LPOXMLImportOptions,
) -> Result<Vec<LPO>, LPOXMLError>
where
    T: BufRead,
{
    reader.config_mut().trim_text(true);
    reader.config_mut().expand_empty_elements = true;
    let mut buf: Vec<u8> = Vec::new();

    let mut mode = Mode::None;
    // Mode to return to after </event> or </arc> (with or without wrapper element)
    let mut parent_mode = Mode::Lpo;
    let mut result: Vec<LPO> = Vec::new();
    let mut current_lpo: Option<LPO> = None;
    let mut current_event: Option<Event> = None;
    let mut current_arc: Option<Arc> = None;
    let mut pending_arcs: Vec<Arc> = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            quick_xml::events::Event::Start(t) => match t.name().as_ref() {
                b"lpos" | b"pnml" => mode = Mode::Root,
                b"lpo" => {
                    // VipTool files carry the name in a <name><value> child instead
                    let name = optional_attribute(&t, "name")?.unwrap_or_default();
                    current_lpo = Some(LPO::new(name));
                    pending_arcs.clear();
                    mode = Mode::Lpo;
                }
                b"name" => match mode {
                    Mode::Lpo => mode = Mode::LpoName,
                    Mode::Event => mode = Mode::EventName,
                    _ => {}
                },
                b"value" | b"text" => {}
                b"graphics" => {
                    if let Some(arc) = current_arc.as_mut() {
                        arc.generating = parse_flag(&t, "userDrawn", arc.generating)?;
                    }
                }
                b"events" => mode = Mode::Events,
                b"event" => {
                    if !matches!(mode, Mode::Events | Mode::Lpo) && options.verbose {
                        warn!(?mode, "expected <event> inside <lpo> or <events>");
                    }
                    let id = required_attribute(&t, "id")?;
                    let label = optional_attribute(&t, "label")?.unwrap_or_else(|| id.clone());
                    current_event = Some(Event::new(id, label));
                    parent_mode = if mode == Mode::Events {
                        Mode::Events
                    } else {
                        Mode::Lpo
                    };
                    mode = Mode::Event;
                }
                b"position" => match current_event.as_mut() {
                    Some(event) => event.position = parse_position(&t)?,
                    None if options.verbose => warn!("ignoring <position> outside of <event>"),
                    None => {}
                },
                b"offset" => match current_event.as_mut() {
                    Some(event) => event.offset = parse_position(&t)?,
                    None if options.verbose => warn!("ignoring <offset> outside of <event>"),
                    None => {}
                },
                b"arcs" => mode = Mode::Arcs,
                tag @ (b"arc" | b"lpoArc") => {
                    if !matches!(mode, Mode::Arcs | Mode::Lpo) && options.verbose {
                        warn!(?mode, "expected arc inside <lpo> or <arcs>");
                    }
                    let drawn_by_default = tag == b"arc";
                    let mut arc = Arc::new(
                        required_attribute(&t, "id")?,
                        required_attribute(&t, "source")?,
                        required_attribute(&t, "target")?,
                        parse_flag(&t, "user-drawn", drawn_by_default)?,
                    );
                    arc.skeleton = parse_flag(&t, "skeleton", false)?;
                    current_arc = Some(arc);
                    parent_mode = if mode == Mode::Arcs {
                        Mode::Arcs
                    } else {
                        Mode::Lpo
                    };
                    mode = Mode::Arc;
                }
                other => {
                    if options.verbose {
                        warn!(
                            tag = %String::from_utf8_lossy(other),
                            ?mode,
                            "ignoring unexpected tag"
                        );
                    }
                }
            },
            quick_xml::events::Event::Text(t) => {
                let text = read_to_string(t.as_ref());
                match mode {
                    Mode::LpoName => {
                        if let Some(lpo) = current_lpo.as_mut() {
                            lpo.name = text;
                        }
                    }
                    Mode::EventName => {
                        if let Some(event) = current_event.as_mut() {
                            event.label = text;
                        }
                    }
                    _ => {}
                }
            }
            quick_xml::events::Event::End(t) => match t.name().as_ref() {
                b"name" => match mode {
                    Mode::LpoName => mode = Mode::Lpo,
                    Mode::EventName => mode = Mode::Event,
                    _ => {}
                },
                b"event" => {
                    match (current_lpo.as_mut(), current_event.take()) {
                        (Some(lpo), Some(event)) => {
                            lpo.add_event(event)?;
                        }
                        (None, Some(event)) if options.verbose => {
                            warn!(event = %event.id, "ignoring <event> outside of <lpo>");
                        }
                        _ => {}
                    }
                    mode = parent_mode;
                }
                b"arc" | b"lpoArc" => {
                    if let Some(arc) = current_arc.take() {
                        pending_arcs.push(arc);
                    }
                    mode = parent_mode;
                }
                b"events" | b"arcs" => mode = Mode::Lpo,
                b"lpo" => {
                    if let Some(mut lpo) = current_lpo.take() {
                        for arc in pending_arcs.drain(..) {
                            lpo.add_arc(arc)?;
                        }
                        result.push(lpo);
                    }
                    mode = Mode::Root;
                }
                b"lpos" | b"pnml" => mode = Mode::None,
                _ => {}
            },
            quick_xml::events::Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if result.is_empty() {
        return Err(LPOXMLError::NoLPOTag);
    }
    Ok(result)
}

///
/// Import all [`LPO`]s from a buffered reader implementing [`std::io::BufRead`]
///
pub fn import_lpos_xml_reader<R: BufRead>(
    reader: R,
    options: LPOXMLImportOptions,
) -> Result<Vec<LPO>, LPOXMLError> {
    let mut xml_reader = Reader::from_reader(reader);
    import_lpos_xml(&mut xml_reader, options)
}

///
/// Import all [`LPO`]s from a byte slice
///
pub fn import_lpos_xml_slice(
    xml_data: &[u8],
    options: LPOXMLImportOptions,
) -> Result<Vec<LPO>, LPOXMLError> {
    import_lpos_xml_reader(xml_data, options)
}

///
/// Import all [`LPO`]s from an XML file given by a filepath
///
pub fn import_lpos_xml_path<P: AsRef<Path>>(
    path: P,
    options: LPOXMLImportOptions,
) -> Result<Vec<LPO>, LPOXMLError> {
    let file = File::open(path)?;
    import_lpos_xml_reader(BufReader::new(file), options)
}

///
/// Import the first [`LPO`] of an XML byte slice
///
pub fn import_lpo_xml_slice(xml_data: &[u8]) -> Result<LPO, LPOXMLError> {
    import_lpos_xml_slice(xml_data, LPOXMLImportOptions::default())?
        .into_iter()
        .next()
        .ok_or(LPOXMLError::NoLPOTag)
}
