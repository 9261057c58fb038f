//! df-project: declarative application files (YAML / JSON) describing a
//! dataflow graph by name.

pub mod schema;
pub mod validate;

use std::path::Path;

use df_graph::{GraphBuilder, GraphError};

pub use schema::*;
pub use validate::{Endpoint, ValidationError, validate_application};

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn load_yaml(path: &Path) -> ProjectResult<Application> {
    let content = std::fs::read_to_string(path)?;
    let app: Application = serde_yaml::from_str(&content)?;
    validate_application(&app)?;
    Ok(app)
}

pub fn save_yaml(path: &Path, app: &Application) -> ProjectResult<()> {
    validate_application(app)?;
    let content = serde_yaml::to_string(app)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_json(path: &Path) -> ProjectResult<Application> {
    let content = std::fs::read_to_string(path)?;
    let app: Application = serde_json::from_str(&content)?;
    validate_application(&app)?;
    Ok(app)
}

pub fn save_json(path: &Path, app: &Application) -> ProjectResult<()> {
    validate_application(app)?;
    let content = serde_json::to_string_pretty(app)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Load an application file, picking the format from the extension
/// (`.json` is JSON, anything else YAML).
pub fn load(path: &Path) -> ProjectResult<Application> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => load_json(path),
        _ => load_yaml(path),
    }
}

/// Load an application file and replay it into a graph builder.
pub fn load_graph(path: &Path) -> ProjectResult<(Application, GraphBuilder)> {
    let app = load(path)?;
    let builder = app.to_builder()?;
    Ok((app, builder))
}
