//! Incremental graph builder.

use std::collections::HashMap;

use df_core::{Id, LinkId, NameError, NodeId, PortId, check_name, next_scope};
use tracing::debug;

use crate::error::{GraphError, GraphResult, NameScope};
use crate::graph::{DEFAULT_HOST, Direction, Graph, Link, Node, Port};
use crate::validate;

/// Builder for constructing a graph incrementally.
///
/// Use `create_node`, `add_port` and `link` to accumulate the graph, then
/// `validate()` (non-consuming) or `build()` to check it and obtain an
/// immutable `Graph`. Records are never removed; a call that fails leaves
/// the builder exactly as it was.
///
/// Every builder issues ids in its own scope; ids from another builder are
/// reported as unknown.
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    scope: u32,
    nodes: Vec<Node>,
    ports: Vec<Port>,
    links: Vec<Link>,
    node_names: HashMap<String, NodeId>,
    port_names: HashMap<(NodeId, String), PortId>,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self {
            scope: next_scope(),
            nodes: Vec::new(),
            ports: Vec::new(),
            links: Vec::new(),
            node_names: HashMap::new(),
            port_names: HashMap::new(),
        }
    }
}

impl GraphBuilder {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node with its launch command and return its ID.
    pub fn create_node(
        &mut self,
        name: impl Into<String>,
        command: impl Into<String>,
    ) -> GraphResult<NodeId> {
        let name = name.into();
        check_name(&name)?;
        if self.node_names.contains_key(&name) {
            return Err(GraphError::DuplicateName {
                scope: NameScope::Graph,
                name,
            });
        }

        let id = next_id(self.scope, self.nodes.len(), "nodes")?;
        let command = command.into();
        debug!(node = %name, command = %command, "registered node");
        self.node_names.insert(name.clone(), id);
        self.nodes.push(Node {
            id,
            name,
            command,
            host: DEFAULT_HOST.to_string(),
        });
        Ok(id)
    }

    /// Attach a port to `node`.
    ///
    /// `direction` may be a [`Direction`] or its string spelling (`"in"` / `"out"`).
    pub fn add_port<D>(
        &mut self,
        node: NodeId,
        name: impl Into<String>,
        direction: D,
    ) -> GraphResult<PortId>
    where
        D: TryInto<Direction>,
        GraphError: From<D::Error>,
    {
        let owner = self.node(node).ok_or(GraphError::UnknownNode { node })?;
        let direction = direction.try_into()?;
        let name = name.into();
        check_name(&name)?;

        let key = (node, name);
        if self.port_names.contains_key(&key) {
            return Err(GraphError::DuplicateName {
                scope: NameScope::Node {
                    node: owner.name.clone(),
                },
                name: key.1,
            });
        }

        let id = next_id(self.scope, self.ports.len(), "ports")?;
        debug!(node = %owner.name, port = %key.1, %direction, "registered port");
        self.ports.push(Port {
            id,
            node,
            name: key.1.clone(),
            direction,
        });
        self.port_names.insert(key, id);
        Ok(id)
    }

    /// Connect an `out` port to an `in` port.
    ///
    /// Linking the same pair twice is accepted here and appended as a second
    /// link; `validate()` rejects it as a duplicate.
    pub fn link(&mut self, source: PortId, destination: PortId) -> GraphResult<LinkId> {
        let src = self
            .port(source)
            .ok_or(GraphError::UnknownPort { port: source })?;
        let dst = self
            .port(destination)
            .ok_or(GraphError::UnknownPort { port: destination })?;

        if src.direction != Direction::Out || dst.direction != Direction::In {
            return Err(GraphError::DirectionMismatch {
                source_port: self.qualify(src),
                source_dir: src.direction,
                destination_port: self.qualify(dst),
                destination_dir: dst.direction,
            });
        }

        let id = next_id(self.scope, self.links.len(), "links")?;
        debug!(
            source = %self.qualify(src),
            destination = %self.qualify(dst),
            "registered link"
        );
        self.links.push(Link {
            id,
            source,
            destination,
        });
        Ok(id)
    }

    /// Set the host a node is launched on (defaults to `localhost`).
    pub fn set_host(&mut self, node: NodeId, host: impl Into<String>) -> GraphResult<()> {
        let host = host.into();
        if host.is_empty() {
            return Err(NameError::Empty.into());
        }
        if host.chars().any(char::is_whitespace) {
            return Err(NameError::Whitespace { name: host }.into());
        }
        if node.scope() != self.scope {
            return Err(GraphError::UnknownNode { node });
        }
        let record = self
            .nodes
            .get_mut(node.slot())
            .ok_or(GraphError::UnknownNode { node })?;
        record.host = host;
        Ok(())
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Resolve a node id issued by this builder.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.slot()).filter(|n| n.id == id)
    }

    /// Resolve a port id issued by this builder.
    pub fn port(&self, id: PortId) -> Option<&Port> {
        self.ports.get(id.slot()).filter(|p| p.id == id)
    }

    pub fn node_by_name(&self, name: &str) -> Option<NodeId> {
        self.node_names.get(name).copied()
    }

    /// Look a port up by its owning node's name and its own name.
    pub fn port_by_name(&self, node: &str, port: &str) -> Option<PortId> {
        let node = self.node_by_name(node)?;
        self.port_names.get(&(node, port.to_string())).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Validate the accumulated records and return an immutable snapshot.
    ///
    /// The builder is left untouched, so this can be called repeatedly.
    pub fn validate(&self) -> GraphResult<Graph> {
        freeze(
            self.scope,
            self.nodes.clone(),
            self.ports.clone(),
            self.links.clone(),
        )
    }

    /// Validate and freeze the graph, consuming the builder.
    pub fn build(self) -> GraphResult<Graph> {
        freeze(self.scope, self.nodes, self.ports, self.links)
    }

    fn qualify(&self, port: &Port) -> String {
        match self.nodes.get(port.node.slot()) {
            Some(node) => format!("{}.{}", node.name, port.name),
            None => format!("?.{}", port.name),
        }
    }
}

fn next_id(scope: u32, len: usize, what: &'static str) -> GraphResult<Id> {
    u32::try_from(len)
        .ok()
        .and_then(|index| Id::try_scoped(scope, index))
        .ok_or(GraphError::CapacityExceeded { what })
}

fn freeze(
    scope: u32,
    nodes: Vec<Node>,
    ports: Vec<Port>,
    links: Vec<Link>,
) -> GraphResult<Graph> {
    validate::validate_structure(&nodes, &ports, &links)?;

    let (node_port_offsets, node_ports) = build_adjacency(&nodes, &ports);
    validate::validate_adjacency(&nodes, &ports, &node_port_offsets, &node_ports)?;

    Ok(Graph {
        scope,
        nodes,
        ports,
        links,
        node_port_offsets,
        node_ports,
    })
}

/// Build compact adjacency lists: for each node, collect its ports.
fn build_adjacency(nodes: &[Node], ports: &[Port]) -> (Vec<usize>, Vec<PortId>) {
    // Ports are already in declaration order, so grouping keeps that order.
    let mut node_to_ports: HashMap<NodeId, Vec<PortId>> = HashMap::new();
    for port in ports {
        node_to_ports.entry(port.node).or_default().push(port.id);
    }

    let mut offsets = Vec::with_capacity(nodes.len() + 1);
    let mut flat_ports = Vec::with_capacity(ports.len());
    offsets.push(0);

    for node in nodes {
        if let Some(ports_list) = node_to_ports.get(&node.id) {
            flat_ports.extend_from_slice(ports_list);
        }
        offsets.push(flat_ports.len());
    }

    (offsets, flat_ports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Invariant;

    fn tictac() -> (GraphBuilder, PortId, PortId) {
        let mut builder = GraphBuilder::new();
        let put = builder.create_node("put", "bin/put").unwrap();
        let out = builder.add_port(put, "text", "out").unwrap();
        let get = builder.create_node("get", "bin/get").unwrap();
        let inp = builder.add_port(get, "text", "in").unwrap();
        (builder, out, inp)
    }

    #[test]
    fn builder_basic() {
        let (mut builder, out, inp) = tictac();
        let link = builder.link(out, inp).unwrap();

        assert_eq!(link.index(), 0);
        assert_eq!(builder.nodes.len(), 2);
        assert_eq!(builder.ports.len(), 2);
        assert_eq!(builder.links.len(), 1);
        assert_eq!(builder.nodes[0].host, DEFAULT_HOST);
    }

    #[test]
    fn same_port_name_on_different_nodes() {
        let (builder, out, inp) = tictac();
        assert_ne!(out, inp);
        assert_eq!(builder.port_by_name("put", "text"), Some(out));
        assert_eq!(builder.port_by_name("get", "text"), Some(inp));
        assert_eq!(builder.port_by_name("get", "missing"), None);
        assert_eq!(builder.port_by_name("missing", "text"), None);
    }

    #[test]
    fn duplicate_port_is_rejected() {
        let (mut builder, _, _) = tictac();
        let put = builder.node_by_name("put").unwrap();
        let err = builder.add_port(put, "text", Direction::In).unwrap_err();
        assert_eq!(
            err,
            GraphError::DuplicateName {
                scope: NameScope::Node { node: "put".into() },
                name: "text".into(),
            }
        );
        assert_eq!(builder.ports.len(), 2);
    }

    #[test]
    fn port_on_unknown_node() {
        let mut builder = GraphBuilder::new();
        let err = builder
            .add_port(NodeId::from_index(3), "p", Direction::In)
            .unwrap_err();
        assert_eq!(
            err,
            GraphError::UnknownNode {
                node: NodeId::from_index(3)
            }
        );
    }

    #[test]
    fn invalid_names_are_rejected() {
        let mut builder = GraphBuilder::new();
        assert!(matches!(
            builder.create_node("", "bin/x"),
            Err(GraphError::InvalidName(NameError::Empty))
        ));
        assert!(matches!(
            builder.create_node("a.b", "bin/x"),
            Err(GraphError::InvalidName(NameError::Reserved { .. }))
        ));
        let a = builder.create_node("a", "bin/x").unwrap();
        assert!(matches!(
            builder.add_port(a, "my port", "in"),
            Err(GraphError::InvalidName(NameError::Whitespace { .. }))
        ));
        assert!(builder.ports.is_empty());
    }

    #[test]
    fn host_override() {
        let (mut builder, _, _) = tictac();
        let get = builder.node_by_name("get").unwrap();
        builder.set_host(get, "node2.cluster").unwrap();
        assert_eq!(builder.node(get).unwrap().host, "node2.cluster");
        assert!(builder.set_host(get, "").is_err());
        assert!(builder.set_host(NodeId::from_index(9), "h").is_err());
    }

    #[test]
    fn validate_is_repeatable() {
        let (mut builder, out, inp) = tictac();
        builder.link(out, inp).unwrap();

        let first = builder.validate().unwrap();
        let second = builder.validate().unwrap();
        assert_eq!(first.nodes(), second.nodes());
        assert_eq!(first.links(), second.links());

        let put = builder.node_by_name("put").unwrap();
        assert_eq!(first.node_ports(put), &[out]);
    }

    #[test]
    fn duplicate_link_appends_then_fails_validation() {
        let (mut builder, out, inp) = tictac();
        let first = builder.link(out, inp).unwrap();
        let second = builder.link(out, inp).unwrap();
        assert_ne!(first, second);
        assert_eq!(builder.links().len(), 2);

        match builder.validate().unwrap_err() {
            GraphError::Validation(Invariant::DuplicateLink {
                first: f,
                second: s,
                source_port,
                destination_port,
            }) => {
                assert_eq!((f, s), (first, second));
                assert_eq!(source_port, "put.text");
                assert_eq!(destination_port, "get.text");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn reversed_link_is_a_mismatch() {
        let (mut builder, out, inp) = tictac();
        let err = builder.link(inp, out).unwrap_err();
        assert_eq!(
            err,
            GraphError::DirectionMismatch {
                source_port: "get.text".into(),
                source_dir: Direction::In,
                destination_port: "put.text".into(),
                destination_dir: Direction::Out,
            }
        );
        assert!(builder.links.is_empty());
    }
}
