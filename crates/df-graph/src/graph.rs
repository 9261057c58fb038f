//! Core graph data structures.

use std::fmt;
use std::str::FromStr;

use df_core::{LinkId, NodeId, PortId};

use crate::error::GraphError;

/// Host a node is launched on unless told otherwise.
pub const DEFAULT_HOST: &str = "localhost";

/// Direction of a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    /// Data enters the node through this port.
    In,
    /// Data leaves the node through this port.
    Out,
}

impl Direction {
    /// The spelling used in application files and descriptors.
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::In => "in",
            Direction::Out => "out",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in" => Ok(Direction::In),
            "out" => Ok(Direction::Out),
            other => Err(GraphError::InvalidDirection {
                value: other.to_string(),
            }),
        }
    }
}

impl TryFrom<&str> for Direction {
    type Error = GraphError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A node: one external process the runtime will launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    /// Launch command, opaque to the builder.
    pub command: String,
    pub host: String,
}

/// A named, directional attachment point owned by exactly one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Port {
    pub id: PortId,
    pub node: NodeId,
    pub name: String,
    pub direction: Direction,
}

/// A directed connection from an `out` port to an `in` port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link {
    pub id: LinkId,
    pub source: PortId,
    pub destination: PortId,
}

/// The graph: a validated, immutable collection of nodes, ports, and links.
///
/// All records are kept in declaration order, which is also the order the
/// descriptor lists them in. Per-node port lists are stored as compact
/// adjacency (offsets into one flat vector).
#[derive(Debug, Clone)]
pub struct Graph {
    /// Scope of the builder that issued every id below.
    pub(crate) scope: u32,
    pub(crate) nodes: Vec<Node>,
    pub(crate) ports: Vec<Port>,
    pub(crate) links: Vec<Link>,

    /// Node i's ports are in node_ports[node_port_offsets[i]..node_port_offsets[i+1]].
    pub(crate) node_port_offsets: Vec<usize>,

    /// Flat list of port IDs grouped by node, declaration order within a node.
    pub(crate) node_ports: Vec<PortId>,
}

impl Graph {
    /// Return all nodes.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Return all ports.
    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    /// Return all links.
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.slot()).filter(|n| n.id == id)
    }

    pub fn port(&self, id: PortId) -> Option<&Port> {
        self.ports.get(id.slot()).filter(|p| p.id == id)
    }

    pub fn link(&self, id: LinkId) -> Option<&Link> {
        self.links.get(id.slot()).filter(|l| l.id == id)
    }

    /// Port IDs owned by a node, in declaration order.
    pub fn node_ports(&self, node_id: NodeId) -> &[PortId] {
        let idx = node_id.slot();
        if node_id.scope() != self.scope || idx >= self.nodes.len() {
            return &[];
        }
        let start = self.node_port_offsets[idx];
        let end = self.node_port_offsets[idx + 1];
        &self.node_ports[start..end]
    }

    /// Iterate the ports of a node as records.
    pub fn ports_of(&self, node_id: NodeId) -> impl Iterator<Item = &Port> + '_ {
        self.node_ports(node_id)
            .iter()
            .filter_map(move |&id| self.port(id))
    }

    /// Resolve a port to its owning node and itself.
    pub fn endpoint(&self, port_id: PortId) -> Option<(&Node, &Port)> {
        let port = self.port(port_id)?;
        let node = self.node(port.node)?;
        Some((node, port))
    }

    /// `node.port` form of a port, as used in diagnostics and application files.
    pub fn qualified_name(&self, port_id: PortId) -> Option<String> {
        self.endpoint(port_id)
            .map(|(node, port)| format!("{}.{}", node.name, port.name))
    }
}
