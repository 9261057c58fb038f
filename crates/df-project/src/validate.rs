//! Application file validation.
//!
//! Only checks what the graph builder cannot: the file version and the
//! `module.port` references used by links. Names, directions and link
//! directions are left to the builder so they surface with its errors.

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::schema::{Application, LATEST_VERSION};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing reference: {id} in {context}")]
    MissingReference { id: String, context: String },

    #[error("Invalid endpoint '{value}' in {context} (expected module.port)")]
    InvalidEndpoint { value: String, context: String },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

/// A parsed `module.port` reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint<'a> {
    pub module: &'a str,
    pub port: &'a str,
}

impl<'a> Endpoint<'a> {
    pub fn parse(value: &'a str, context: &str) -> Result<Self, ValidationError> {
        match value.split_once('.') {
            Some((module, port))
                if !module.is_empty() && !port.is_empty() && !port.contains('.') =>
            {
                Ok(Self { module, port })
            }
            _ => Err(ValidationError::InvalidEndpoint {
                value: value.to_string(),
                context: context.to_string(),
            }),
        }
    }
}

impl fmt::Display for Endpoint<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.module, self.port)
    }
}

pub fn validate_application(app: &Application) -> Result<(), ValidationError> {
    if app.version == 0 || app.version > LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: app.version,
        });
    }

    // Duplicate module names are the builder's to report.
    let mut ports: HashMap<&str, HashSet<&str>> = HashMap::new();
    for module in &app.modules {
        let entry = ports.entry(module.name.as_str()).or_default();
        entry.extend(module.ports.iter().map(|p| p.name.as_str()));
    }

    for (i, link) in app.links.iter().enumerate() {
        let context = format!("links[{}]", i);
        for value in [&link.from, &link.to] {
            let endpoint = Endpoint::parse(value, &context)?;
            let Some(module_ports) = ports.get(endpoint.module) else {
                return Err(ValidationError::MissingReference {
                    id: endpoint.module.to_string(),
                    context: format!("{} module", context),
                });
            };
            if !module_ports.contains(endpoint.port) {
                return Err(ValidationError::MissingReference {
                    id: endpoint.to_string(),
                    context: format!("{} port", context),
                });
            }
        }
    }

    Ok(())
}
