//! Graph validation logic.
//!
//! The builder already refuses bad calls, so these checks only fail when
//! the records were assembled some other way. They run on every
//! validation anyway.

use std::collections::{HashMap, HashSet};

use df_core::{LinkId, PortId};

use crate::error::Invariant;
use crate::graph::{Direction, Link, Node, Port};

/// Validate the graph structure: ids, names, ownership and links.
pub(crate) fn validate_structure(
    nodes: &[Node],
    ports: &[Port],
    links: &[Link],
) -> Result<(), Invariant> {
    // IDs are positions; anything else breaks slot lookups
    check_contiguous("node", nodes.iter().map(|n| n.id))?;
    check_contiguous("port", ports.iter().map(|p| p.id))?;
    check_contiguous("link", links.iter().map(|l| l.id))?;

    let mut node_names = HashSet::new();
    for node in nodes {
        if !node_names.insert(node.name.as_str()) {
            return Err(Invariant::DuplicateNodeName {
                name: node.name.clone(),
            });
        }
    }

    let mut port_names = HashSet::new();
    for port in ports {
        let owner = nodes.get(port.node.slot()).filter(|n| n.id == port.node);
        let Some(owner) = owner else {
            return Err(Invariant::DanglingPortOwner {
                port: port.id,
                node: port.node,
            });
        };
        if !port_names.insert((port.node, port.name.as_str())) {
            return Err(Invariant::DuplicatePortName {
                node: owner.name.clone(),
                port: port.name.clone(),
            });
        }
    }

    let mut seen: HashMap<(PortId, PortId), LinkId> = HashMap::new();
    for link in links {
        let src = endpoint(ports, link, link.source)?;
        let dst = endpoint(ports, link, link.destination)?;

        if src.direction != Direction::Out || dst.direction != Direction::In {
            return Err(Invariant::LinkDirection {
                link: link.id,
                source_port: qualified(nodes, src),
                destination_port: qualified(nodes, dst),
            });
        }

        if let Some(&first) = seen.get(&(link.source, link.destination)) {
            return Err(Invariant::DuplicateLink {
                first,
                second: link.id,
                source_port: qualified(nodes, src),
                destination_port: qualified(nodes, dst),
            });
        }
        seen.insert((link.source, link.destination), link.id);
    }

    Ok(())
}

/// Validate adjacency lists for consistency.
pub(crate) fn validate_adjacency(
    nodes: &[Node],
    ports: &[Port],
    node_port_offsets: &[usize],
    node_ports: &[PortId],
) -> Result<(), Invariant> {
    if node_port_offsets.len() != nodes.len() + 1
        || node_port_offsets.last().copied().unwrap_or(0) != node_ports.len()
    {
        let port = ports.first();
        return Err(Invariant::InconsistentAdjacency {
            port: port.map_or(PortId::from_index(0), |p| p.id),
            node: port.map_or(df_core::NodeId::from_index(0), |p| p.node),
        });
    }

    for node in nodes {
        let idx = node.id.slot();
        let start = node_port_offsets[idx];
        let end = node_port_offsets[idx + 1];

        for &port_id in &node_ports[start..end] {
            match ports.get(port_id.slot()) {
                Some(port) if port.node == node.id => {}
                _ => {
                    return Err(Invariant::InconsistentAdjacency {
                        port: port_id,
                        node: node.id,
                    });
                }
            }
        }
    }

    // Every port appears exactly once
    let mut ports_in_adj: HashSet<PortId> = HashSet::new();
    for &port_id in node_ports {
        if !ports_in_adj.insert(port_id) {
            return Err(Invariant::InconsistentAdjacency {
                port: port_id,
                node: ports[port_id.slot()].node,
            });
        }
    }
    for port in ports {
        if !ports_in_adj.contains(&port.id) {
            return Err(Invariant::InconsistentAdjacency {
                port: port.id,
                node: port.node,
            });
        }
    }

    Ok(())
}

fn check_contiguous(
    what: &'static str,
    ids: impl Iterator<Item = df_core::Id>,
) -> Result<(), Invariant> {
    for (position, id) in ids.enumerate() {
        if id.slot() != position {
            return Err(Invariant::NonContiguousId { what, position, id });
        }
    }
    Ok(())
}

fn endpoint<'a>(ports: &'a [Port], link: &Link, port: PortId) -> Result<&'a Port, Invariant> {
    ports
        .get(port.slot())
        .filter(|p| p.id == port)
        .ok_or(Invariant::DanglingLinkEndpoint {
            link: link.id,
            port,
        })
}

fn qualified(nodes: &[Node], port: &Port) -> String {
    let node = nodes.get(port.node.slot()).map_or("?", |n| n.name.as_str());
    format!("{}.{}", node, port.name)
}
