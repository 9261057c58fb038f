//! XML rendering of a validated graph.
//!
//! Output is fully determined by the graph: records appear in declaration
//! order, attributes in a fixed order, two-space indentation, trailing
//! newline.

use std::borrow::Cow;

use df_graph::{Graph, Link};
use quick_xml::Writer;
use quick_xml::escape::escape;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::name::QName;

use crate::{EmitError, EmitResult};

type XmlWriter = Writer<Vec<u8>>;

/// Render the network document: modules with nested ports, then connections.
pub fn network_document(graph: &Graph, name: &str) -> EmitResult<String> {
    let mut writer = new_writer()?;

    let mut root = BytesStart::new("network");
    root.push_attribute(text_attribute("id", name));
    if graph.nodes().is_empty() && graph.links().is_empty() {
        writer.write_event(Event::Empty(root))?;
        return finish(writer);
    }
    writer.write_event(Event::Start(root))?;

    for node in graph.nodes() {
        let mut module = BytesStart::new("module");
        module.push_attribute(("id", node.name.as_str()));
        module.push_attribute(text_attribute("command", &node.command));

        if graph.node_ports(node.id).is_empty() {
            writer.write_event(Event::Empty(module))?;
            continue;
        }
        writer.write_event(Event::Start(module))?;
        for port in graph.ports_of(node.id) {
            let mut elem = BytesStart::new("port");
            elem.push_attribute(("id", port.name.as_str()));
            elem.push_attribute(("direction", port.direction.as_str()));
            writer.write_event(Event::Empty(elem))?;
        }
        writer.write_event(Event::End(BytesEnd::new("module")))?;
    }

    for link in graph.links() {
        write_connection(&mut writer, graph, link)?;
    }

    writer.write_event(Event::End(BytesEnd::new("network")))?;
    finish(writer)
}

/// Render the launch document: one `run` record per module.
pub fn launch_document(graph: &Graph, name: &str) -> EmitResult<String> {
    let mut writer = new_writer()?;

    let mut root = BytesStart::new("commands");
    root.push_attribute(text_attribute("id", name));
    if graph.nodes().is_empty() {
        writer.write_event(Event::Empty(root))?;
        return finish(writer);
    }
    writer.write_event(Event::Start(root))?;

    for node in graph.nodes() {
        let mut run = BytesStart::new("run");
        run.push_attribute(("module", node.name.as_str()));
        run.push_attribute(text_attribute("host", &node.host));
        writer.write_event(Event::Start(run))?;
        writer.write_event(Event::Text(BytesText::new(&node.command)))?;
        writer.write_event(Event::End(BytesEnd::new("run")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("commands")))?;
    finish(writer)
}

fn write_connection(writer: &mut XmlWriter, graph: &Graph, link: &Link) -> EmitResult<()> {
    let (src_node, src_port) = graph.endpoint(link.source).ok_or_else(|| dangling(link))?;
    let (dst_node, dst_port) = graph
        .endpoint(link.destination)
        .ok_or_else(|| dangling(link))?;

    let id = format!("c{}", link.id.index());
    let mut conn = BytesStart::new("connection");
    conn.push_attribute(("id", id.as_str()));
    writer.write_event(Event::Start(conn))?;

    let mut source = BytesStart::new("source");
    source.push_attribute(("module", src_node.name.as_str()));
    source.push_attribute(("port", src_port.name.as_str()));
    writer.write_event(Event::Empty(source))?;

    let mut destination = BytesStart::new("destination");
    destination.push_attribute(("module", dst_node.name.as_str()));
    destination.push_attribute(("port", dst_port.name.as_str()));
    writer.write_event(Event::Empty(destination))?;

    writer.write_event(Event::End(BytesEnd::new("connection")))?;
    Ok(())
}

/// Attribute for free text. Tab, newline and carriage return become
/// character references; a parser would turn the raw characters into spaces.
fn text_attribute<'a>(key: &'a str, value: &str) -> Attribute<'a> {
    let escaped = escape(value)
        .replace('\t', "&#9;")
        .replace('\n', "&#10;")
        .replace('\r', "&#13;");
    Attribute {
        key: QName(key.as_bytes()),
        value: Cow::Owned(escaped.into_bytes()),
    }
}

// Unreachable for graphs that came out of validation.
fn dangling(link: &Link) -> EmitError {
    EmitError::Graph(
        df_graph::Invariant::DanglingLinkEndpoint {
            link: link.id,
            port: link.source,
        }
        .into(),
    )
}

fn new_writer() -> EmitResult<XmlWriter> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    Ok(writer)
}

fn finish(writer: XmlWriter) -> EmitResult<String> {
    let mut text = String::from_utf8(writer.into_inner())?;
    text.push('\n');
    Ok(text)
}
