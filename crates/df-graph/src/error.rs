//! Graph-specific error types.

use std::convert::Infallible;
use std::fmt;

use df_core::{Id, LinkId, NameError, NodeId, PortId};
use thiserror::Error;

use crate::graph::Direction;

pub type GraphResult<T> = Result<T, GraphError>;

/// Where a name collision happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameScope {
    /// Node names are unique within the graph.
    Graph,
    /// Port names are unique within their owning node.
    Node { node: String },
}

impl fmt::Display for NameScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameScope::Graph => write!(f, "node name"),
            NameScope::Node { node } => write!(f, "port name on node '{}'", node),
        }
    }
}

/// Errors raised by graph construction calls.
///
/// Every variant except `Validation` is reported at the offending call and
/// leaves the builder untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Duplicate {scope}: '{name}'")]
    DuplicateName { scope: NameScope, name: String },

    #[error("Invalid port direction '{value}' (expected 'in' or 'out')")]
    InvalidDirection { value: String },

    #[error(
        "Direction mismatch: cannot link {source_port} ({source_dir}) to {destination_port} ({destination_dir}); expected out -> in"
    )]
    DirectionMismatch {
        source_port: String,
        source_dir: Direction,
        destination_port: String,
        destination_dir: Direction,
    },

    #[error("Port {port} is not registered in this graph")]
    UnknownPort { port: PortId },

    #[error("Node {node} is not registered in this graph")]
    UnknownNode { node: NodeId },

    #[error("Invalid name: {0}")]
    InvalidName(#[from] NameError),

    #[error("Too many {what} (id space exhausted)")]
    CapacityExceeded { what: &'static str },

    #[error("Graph validation failed: {0}")]
    Validation(#[from] Invariant),
}

impl From<Infallible> for GraphError {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}

/// A structural rule checked when the graph is validated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Invariant {
    #[error("node names must be unique: '{name}' appears more than once")]
    DuplicateNodeName { name: String },

    #[error("port names must be unique within a node: '{node}.{port}' appears more than once")]
    DuplicatePortName { node: String, port: String },

    #[error("port {port} refers to non-existent node {node}")]
    DanglingPortOwner { port: PortId, node: NodeId },

    #[error("link {link} refers to non-existent port {port}")]
    DanglingLinkEndpoint { link: LinkId, port: PortId },

    #[error("link {link} must connect an out port to an in port: {source_port} -> {destination_port}")]
    LinkDirection {
        link: LinkId,
        source_port: String,
        destination_port: String,
    },

    #[error("link {second} duplicates link {first}: {source_port} -> {destination_port}")]
    DuplicateLink {
        first: LinkId,
        second: LinkId,
        source_port: String,
        destination_port: String,
    },

    #[error("{what} at position {position} carries id {id}")]
    NonContiguousId {
        what: &'static str,
        position: usize,
        id: Id,
    },

    #[error("port {port} is missing from or misplaced in the adjacency of node {node}")]
    InconsistentAdjacency { port: PortId, node: NodeId },
}
