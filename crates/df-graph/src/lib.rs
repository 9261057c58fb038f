//! df-graph: graph/model layer for dataflow application descriptors.
//!
//! Provides:
//! - Typed graph records (Node, Port, Link, Direction)
//! - Incremental graph builder that enforces naming and linking rules
//! - Validation into an immutable `Graph` with node -> port adjacency
//!
//! # Example
//!
//! ```
//! use df_graph::{Direction, GraphBuilder};
//!
//! let mut builder = GraphBuilder::new();
//! let put = builder.create_node("put", "bin/put").unwrap();
//! let out = builder.add_port(put, "text", Direction::Out).unwrap();
//! let get = builder.create_node("get", "bin/get").unwrap();
//! let inp = builder.add_port(get, "text", "in").unwrap();
//! builder.link(out, inp).unwrap();
//!
//! let graph = builder.validate().unwrap();
//! assert_eq!(graph.nodes().len(), 2);
//! assert_eq!(graph.links().len(), 1);
//! ```

pub mod builder;
pub mod error;
pub mod graph;
pub(crate) mod validate;

// Re-exports for ergonomics
pub use builder::GraphBuilder;
pub use error::{GraphError, GraphResult, Invariant, NameScope};
pub use graph::{DEFAULT_HOST, Direction, Graph, Link, Node, Port};
