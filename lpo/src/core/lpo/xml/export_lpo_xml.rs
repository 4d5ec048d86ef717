use std::io::Write;

use quick_xml::{
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event as XMLEvent},
    Writer,
};

use super::LPOXMLError;
use crate::core::lpo::{Position, LPO};

fn position_element<'a>(tag: &'a str, position: &Position) -> BytesStart<'a> {
    let mut element = BytesStart::new(tag);
    element.push_attribute(("x", position.x.to_string().as_str()));
    element.push_attribute(("y", position.y.to_string().as_str()));
    element
}

fn write_lpo<W: Write>(writer: &mut Writer<W>, lpo: &LPO) -> Result<(), LPOXMLError> {
    let mut lpo_start = BytesStart::new("lpo");
    lpo_start.push_attribute(("name", lpo.name.as_str()));
    writer.write_event(XMLEvent::Start(lpo_start))?;

    writer.write_event(XMLEvent::Start(BytesStart::new("events")))?;
    for event in lpo.events() {
        let mut event_start = BytesStart::new("event");
        event_start.push_attribute(("id", event.id.as_str()));
        event_start.push_attribute(("label", event.label.as_str()));
        writer.write_event(XMLEvent::Start(event_start))?;
        writer.write_event(XMLEvent::Empty(position_element("offset", &event.offset)))?;
        writer.write_event(XMLEvent::Empty(position_element("position", &event.position)))?;
        writer.write_event(XMLEvent::End(BytesEnd::new("event")))?;
    }
    writer.write_event(XMLEvent::End(BytesEnd::new("events")))?;

    writer.write_event(XMLEvent::Start(BytesStart::new("arcs")))?;
    for arc in lpo.arcs() {
        let mut arc_element = BytesStart::new("arc");
        arc_element.push_attribute(("id", arc.id.as_str()));
        arc_element.push_attribute(("source", arc.source.as_str()));
        arc_element.push_attribute(("target", arc.target.as_str()));
        arc_element.push_attribute(("user-drawn", if arc.generating { "true" } else { "false" }));
        arc_element.push_attribute(("skeleton", if arc.skeleton { "true" } else { "false" }));
        writer.write_event(XMLEvent::Empty(arc_element))?;
    }
    writer.write_event(XMLEvent::End(BytesEnd::new("arcs")))?;

    writer.write_event(XMLEvent::End(BytesEnd::new("lpo")))?;
    Ok(())
}

///
/// Export [`LPO`]s to the XML format and write the result to the provided writer
///
/// Events are written in [`LPO::events`] order, arcs in their stored order (including derived arcs
/// and the `skeleton` flag).
///
pub fn export_lpos_xml<W: Write>(lpos: &[LPO], writer: W) -> Result<(), LPOXMLError> {
    let mut writer = Writer::new_with_indent(writer, b' ', 2);
    writer.write_event(XMLEvent::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(XMLEvent::Start(BytesStart::new("lpos")))?;
    for lpo in lpos {
        write_lpo(&mut writer, lpo)?;
    }
    writer.write_event(XMLEvent::End(BytesEnd::new("lpos")))?;
    Ok(())
}

///
/// Export a single [`LPO`] to the XML format
///
pub fn export_lpo_xml<W: Write>(lpo: &LPO, writer: W) -> Result<(), LPOXMLError> {
    export_lpos_xml(std::slice::from_ref(lpo), writer)
}

///
/// Export [`LPO`]s to XML in a byte array ([`Vec<u8>`])
///
pub fn export_lpos_xml_to_vec(lpos: &[LPO]) -> Result<Vec<u8>, LPOXMLError> {
    let mut bytes = Vec::new();
    export_lpos_xml(lpos, &mut bytes)?;
    Ok(bytes)
}

fn write_name<W: Write>(writer: &mut Writer<W>, name: &str) -> Result<(), LPOXMLError> {
    writer.write_event(XMLEvent::Start(BytesStart::new("value")))?;
    writer.write_event(XMLEvent::Text(BytesText::new(name)))?;
    writer.write_event(XMLEvent::End(BytesEnd::new("value")))?;
    Ok(())
}

fn write_viptool_lpo<W: Write>(
    writer: &mut Writer<W>,
    lpo: &LPO,
    index: usize,
) -> Result<(), LPOXMLError> {
    let mut lpo_start = BytesStart::new("lpo");
    lpo_start.push_attribute(("id", format!("lpo{}", index + 1).as_str()));
    writer.write_event(XMLEvent::Start(lpo_start))?;
    writer.write_event(XMLEvent::Start(BytesStart::new("name")))?;
    write_name(writer, &lpo.name)?;
    writer.write_event(XMLEvent::End(BytesEnd::new("name")))?;

    for event in lpo.events() {
        let mut event_start = BytesStart::new("event");
        event_start.push_attribute(("id", event.id.as_str()));
        writer.write_event(XMLEvent::Start(event_start))?;

        writer.write_event(XMLEvent::Start(BytesStart::new("name")))?;
        write_name(writer, &event.label)?;
        writer.write_event(XMLEvent::Start(BytesStart::new("graphics")))?;
        writer.write_event(XMLEvent::Empty(position_element("offset", &event.offset)))?;
        writer.write_event(XMLEvent::End(BytesEnd::new("graphics")))?;
        writer.write_event(XMLEvent::End(BytesEnd::new("name")))?;

        writer.write_event(XMLEvent::Start(BytesStart::new("graphics")))?;
        writer.write_event(XMLEvent::Empty(position_element("position", &event.position)))?;
        writer.write_event(XMLEvent::End(BytesEnd::new("graphics")))?;

        writer.write_event(XMLEvent::End(BytesEnd::new("event")))?;
    }

    for arc in lpo.arcs() {
        let mut arc_start = BytesStart::new("lpoArc");
        arc_start.push_attribute(("id", arc.id.as_str()));
        arc_start.push_attribute(("source", arc.source.as_str()));
        arc_start.push_attribute(("target", arc.target.as_str()));
        writer.write_event(XMLEvent::Start(arc_start))?;
        let mut graphics = BytesStart::new("graphics");
        graphics.push_attribute(("userDrawn", if arc.generating { "true" } else { "false" }));
        writer.write_event(XMLEvent::Empty(graphics))?;
        writer.write_event(XMLEvent::End(BytesEnd::new("lpoArc")))?;
    }

    writer.write_event(XMLEvent::End(BytesEnd::new("lpo")))?;
    Ok(())
}

///
/// Export [`LPO`]s in the VipTool layout (`<pnml>` root, `<lpoArc>` elements)
///
/// VipTool files have no notion of skeleton arcs: the `skeleton` flags are not written and have to
/// be derived again after import.
///
pub fn export_lpos_viptool_xml<W: Write>(lpos: &[LPO], writer: W) -> Result<(), LPOXMLError> {
    let mut writer = Writer::new_with_indent(writer, b' ', 2);
    writer.write_event(XMLEvent::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(XMLEvent::Start(BytesStart::new("pnml")))?;
    for (index, lpo) in lpos.iter().enumerate() {
        write_viptool_lpo(&mut writer, lpo, index)?;
    }
    writer.write_event(XMLEvent::End(BytesEnd::new("pnml")))?;
    Ok(())
}
