//! df-descriptor: serializes a dataflow graph into the XML application
//! description read by the runtime.
//!
//! Two documents are produced per application:
//! - `<prefix>.net.xml`: modules, their ports, and the connections between them
//! - `<prefix>.run.xml`: the launch command (and host) of every module
//!
//! Writing is all-or-nothing: either both files land complete, or neither
//! is touched.

pub mod digest;
pub mod xml;
pub(crate) mod write;

use std::path::{Component, MAIN_SEPARATOR, Path, PathBuf};

use df_graph::{Graph, GraphBuilder, GraphError};
use tracing::info;

pub use digest::digest_hex;

pub type EmitResult<T> = Result<T, EmitError>;

#[derive(thiserror::Error, Debug)]
pub enum EmitError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Descriptor is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Invalid output prefix '{prefix}': {reason}")]
    InvalidPrefix { prefix: String, reason: &'static str },
}

/// File names a descriptor is written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorPaths {
    pub network: PathBuf,
    pub launch: PathBuf,
}

impl DescriptorPaths {
    /// Derive `<prefix>.net.xml` and `<prefix>.run.xml`.
    pub fn for_prefix(prefix: &Path) -> EmitResult<Self> {
        check_prefix(prefix)?;
        Ok(Self {
            network: with_suffix(prefix, ".net.xml"),
            launch: with_suffix(prefix, ".run.xml"),
        })
    }
}

/// A fully rendered application description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    name: String,
    network: String,
    launch: String,
}

impl Descriptor {
    /// Validate the accumulated graph and render it.
    pub fn render(builder: &GraphBuilder, name: &str) -> EmitResult<Self> {
        let graph = builder.validate()?;
        Self::from_graph(&graph, name)
    }

    /// Render an already validated graph.
    pub fn from_graph(graph: &Graph, name: &str) -> EmitResult<Self> {
        Ok(Self {
            name: name.to_string(),
            network: xml::network_document(graph, name)?,
            launch: xml::launch_document(graph, name)?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The network document (`.net.xml`).
    pub fn network(&self) -> &str {
        &self.network
    }

    /// The launch document (`.run.xml`).
    pub fn launch(&self) -> &str {
        &self.launch
    }

    /// Content hash of both documents, lowercase hex SHA-256.
    pub fn digest(&self) -> String {
        digest_hex(&self.network, &self.launch)
    }

    /// Write both documents next to `prefix`, all-or-nothing.
    pub fn write(&self, prefix: &Path) -> EmitResult<DescriptorPaths> {
        let paths = DescriptorPaths::for_prefix(prefix)?;
        write::write_all_or_nothing(&[
            (paths.network.as_path(), self.network.as_bytes()),
            (paths.launch.as_path(), self.launch.as_bytes()),
        ])?;
        info!(
            network = %paths.network.display(),
            launch = %paths.launch.display(),
            digest = %self.digest(),
            "descriptor written"
        );
        Ok(paths)
    }
}

/// Validate `builder`, render it and write `<prefix>.net.xml` / `<prefix>.run.xml`.
///
/// The application is named after the last component of `prefix`. Nothing is
/// written if validation or rendering fails.
pub fn emit(builder: &GraphBuilder, prefix: impl AsRef<Path>) -> EmitResult<Descriptor> {
    let prefix = prefix.as_ref();
    let name = application_name(prefix)?;
    let descriptor = Descriptor::render(builder, &name)?;
    descriptor.write(prefix)?;
    Ok(descriptor)
}

/// The application name implied by an output prefix (`out/tictac` -> `tictac`).
pub fn application_name(prefix: &Path) -> EmitResult<String> {
    check_prefix(prefix)?;
    prefix
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| invalid_prefix(prefix, "does not name a file"))
}

fn check_prefix(prefix: &Path) -> EmitResult<()> {
    let text = prefix.to_string_lossy();
    if text.is_empty() {
        return Err(invalid_prefix(prefix, "prefix is empty"));
    }
    if text.ends_with('/') || text.ends_with(MAIN_SEPARATOR) {
        return Err(invalid_prefix(prefix, "prefix ends with a path separator"));
    }
    // components() drops an inner `.`, so `out/.` would pass as `out`
    let last = text.rsplit(['/', MAIN_SEPARATOR]).next().unwrap_or_default();
    if last == "." || last == ".." {
        return Err(invalid_prefix(prefix, "does not name a file"));
    }
    if !matches!(prefix.components().next_back(), Some(Component::Normal(_))) {
        return Err(invalid_prefix(prefix, "does not name a file"));
    }
    Ok(())
}

fn invalid_prefix(prefix: &Path, reason: &'static str) -> EmitError {
    EmitError::InvalidPrefix {
        prefix: prefix.display().to_string(),
        reason,
    }
}

fn with_suffix(prefix: &Path, suffix: &str) -> PathBuf {
    let mut path = prefix.as_os_str().to_owned();
    path.push(suffix);
    PathBuf::from(path)
}
