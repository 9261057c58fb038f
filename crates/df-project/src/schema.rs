//! Application file schema.

use df_graph::{DEFAULT_HOST, Direction, GraphBuilder};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::validate::Endpoint;
use crate::{ProjectError, ProjectResult};

pub const LATEST_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Application {
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub modules: Vec<ModuleDef>,
    #[serde(default)]
    pub links: Vec<LinkDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModuleDef {
    pub name: String,
    pub cmdline: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default)]
    pub ports: Vec<PortDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PortDef {
    pub name: String,
    /// `in` or `out`; kept as text so a bad value is reported by the builder.
    pub direction: String,
}

/// `from` / `to` are `module.port` references.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinkDef {
    pub from: String,
    pub to: String,
}

impl Application {
    /// Replay the declarations, in file order, through a fresh builder.
    pub fn to_builder(&self) -> ProjectResult<GraphBuilder> {
        let mut builder = GraphBuilder::new();

        for module in &self.modules {
            let node = builder.create_node(module.name.as_str(), module.cmdline.as_str())?;
            if let Some(host) = &module.host {
                builder.set_host(node, host.as_str())?;
            }
            for port in &module.ports {
                builder.add_port(node, port.name.as_str(), port.direction.as_str())?;
            }
        }

        for (i, link) in self.links.iter().enumerate() {
            let context = format!("links[{}]", i);
            let from = Endpoint::parse(&link.from, &context)?;
            let to = Endpoint::parse(&link.to, &context)?;
            let source = resolve(&builder, &from, &context)?;
            let destination = resolve(&builder, &to, &context)?;
            builder.link(source, destination)?;
        }

        debug!(
            application = %self.name,
            nodes = builder.nodes().len(),
            links = builder.links().len(),
            "application loaded into builder"
        );
        Ok(builder)
    }

    /// Describe an existing graph as an application file.
    pub fn from_builder(name: impl Into<String>, builder: &GraphBuilder) -> Self {
        let qualified = |port_id| {
            builder
                .port(port_id)
                .and_then(|p| builder.node(p.node).map(|n| format!("{}.{}", n.name, p.name)))
                .unwrap_or_default()
        };

        let modules = builder
            .nodes()
            .iter()
            .map(|node| ModuleDef {
                name: node.name.clone(),
                cmdline: node.command.clone(),
                host: (node.host != DEFAULT_HOST).then(|| node.host.clone()),
                ports: builder
                    .ports()
                    .iter()
                    .filter(|p| p.node == node.id)
                    .map(|p| PortDef {
                        name: p.name.clone(),
                        direction: p.direction.to_string(),
                    })
                    .collect(),
            })
            .collect();

        let links = builder
            .links()
            .iter()
            .map(|l| LinkDef {
                from: qualified(l.source),
                to: qualified(l.destination),
            })
            .collect();

        Self {
            version: LATEST_VERSION,
            name: name.into(),
            modules,
            links,
        }
    }

    /// First module declared under `name`.
    pub fn module(&self, name: &str) -> Option<&ModuleDef> {
        self.modules.iter().find(|m| m.name == name)
    }
}

impl PortDef {
    pub fn new(name: impl Into<String>, direction: Direction) -> Self {
        Self {
            name: name.into(),
            direction: direction.to_string(),
        }
    }
}

fn resolve(
    builder: &GraphBuilder,
    endpoint: &Endpoint<'_>,
    context: &str,
) -> ProjectResult<df_core::PortId> {
    builder
        .port_by_name(endpoint.module, endpoint.port)
        .ok_or_else(|| {
            ProjectError::Validation(crate::ValidationError::MissingReference {
                id: endpoint.to_string(),
                context: context.to_string(),
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use df_graph::GraphError;

    fn tictac() -> Application {
        Application {
            version: LATEST_VERSION,
            name: "tictac".into(),
            modules: vec![
                ModuleDef {
                    name: "put".into(),
                    cmdline: "bin/put".into(),
                    host: None,
                    ports: vec![PortDef::new("text", Direction::Out)],
                },
                ModuleDef {
                    name: "get".into(),
                    cmdline: "bin/get".into(),
                    host: Some("node2".into()),
                    ports: vec![PortDef::new("text", Direction::In)],
                },
            ],
            links: vec![LinkDef {
                from: "put.text".into(),
                to: "get.text".into(),
            }],
        }
    }

    #[test]
    fn replays_into_builder() {
        let builder = tictac().to_builder().unwrap();
        assert_eq!(builder.nodes().len(), 2);
        assert_eq!(builder.ports().len(), 2);
        assert_eq!(builder.links().len(), 1);
        let get = builder.node_by_name("get").unwrap();
        assert_eq!(builder.node(get).unwrap().host, "node2");
    }

    #[test]
    fn builder_errors_pass_through() {
        let mut app = tictac();
        app.modules[1].ports[0].direction = "input".into();
        assert!(matches!(
            app.to_builder(),
            Err(ProjectError::Graph(GraphError::InvalidDirection { .. }))
        ));

        let mut app = tictac();
        app.modules[1].name = "put".into();
        assert!(matches!(
            app.to_builder(),
            Err(ProjectError::Graph(GraphError::DuplicateName { .. }))
        ));

        let mut app = tictac();
        app.links[0] = LinkDef {
            from: "get.text".into(),
            to: "put.text".into(),
        };
        assert!(matches!(
            app.to_builder(),
            Err(ProjectError::Graph(GraphError::DirectionMismatch { .. }))
        ));
    }

    #[test]
    fn from_builder_mirrors_graph() {
        let app = tictac();
        let builder = app.to_builder().unwrap();
        assert_eq!(Application::from_builder("tictac", &builder), app);
    }
}
