use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use df_descriptor::{Descriptor, EmitError};
use df_graph::Graph;
use df_project::{Application, ProjectError};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "df-cli")]
#[command(about = "Dataflow descriptor generator - turns application files into runtime XML", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load an application file and validate its graph
    Validate {
        /// Path to the application file (YAML or JSON)
        app_path: PathBuf,
    },
    /// List the modules of an application with their ports
    Modules {
        /// Path to the application file (YAML or JSON)
        app_path: PathBuf,
    },
    /// Print a descriptor document to stdout
    Show {
        /// Path to the application file (YAML or JSON)
        app_path: PathBuf,
        /// Print the launch document instead of the network document
        #[arg(long)]
        launch: bool,
    },
    /// Write <prefix>.net.xml and <prefix>.run.xml
    Generate {
        /// Path to the application file (YAML or JSON)
        app_path: PathBuf,
        /// Output prefix (defaults to the application name)
        #[arg(short, long)]
        prefix: Option<PathBuf>,
    },
    /// Print the content digest of the descriptor
    Digest {
        /// Path to the application file (YAML or JSON)
        app_path: PathBuf,
    },
}

type CliResult<T> = Result<T, CliError>;

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Project(#[from] ProjectError),

    #[error(transparent)]
    Emit(#[from] EmitError),
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate { app_path } => cmd_validate(&app_path),
        Commands::Modules { app_path } => cmd_modules(&app_path),
        Commands::Show { app_path, launch } => cmd_show(&app_path, launch),
        Commands::Generate { app_path, prefix } => cmd_generate(&app_path, prefix.as_deref()),
        Commands::Digest { app_path } => cmd_digest(&app_path),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Not through tracing: RUST_LOG must not be able to hide it
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn cmd_validate(app_path: &Path) -> CliResult<()> {
    println!("Validating application: {}", app_path.display());
    let (app, builder) = df_project::load_graph(app_path)?;
    let graph = builder.validate().map_err(ProjectError::from)?;
    println!(
        "✓ {} is valid ({} modules, {} ports, {} links)",
        app.name,
        graph.nodes().len(),
        graph.ports().len(),
        graph.links().len()
    );
    Ok(())
}

fn cmd_modules(app_path: &Path) -> CliResult<()> {
    let (app, builder) = df_project::load_graph(app_path)?;
    let graph = builder.validate().map_err(ProjectError::from)?;

    if graph.nodes().is_empty() {
        println!("No modules found in application");
        return Ok(());
    }
    println!("Modules:");
    for line in module_lines(&app, &graph) {
        println!("{line}");
    }
    Ok(())
}

/// One line per module, then one per port; hosts the file leaves out are marked.
fn module_lines(app: &Application, graph: &Graph) -> Vec<String> {
    let mut lines = Vec::new();
    for node in graph.nodes() {
        let declared = app.module(&node.name).and_then(|m| m.host.as_ref());
        let host_note = if declared.is_some() { "" } else { " (default)" };
        lines.push(format!(
            "  {} @ {}{} - {}",
            node.name, node.host, host_note, node.command
        ));
        for port in graph.ports_of(node.id) {
            lines.push(format!("    {:<3} {}", port.direction, port.name));
        }
    }
    lines
}

fn cmd_show(app_path: &Path, launch: bool) -> CliResult<()> {
    let descriptor = render(app_path)?;
    if launch {
        print!("{}", descriptor.launch());
    } else {
        print!("{}", descriptor.network());
    }
    Ok(())
}

fn cmd_generate(app_path: &Path, prefix: Option<&Path>) -> CliResult<()> {
    let (app, builder) = df_project::load_graph(app_path)?;
    let prefix = prefix
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&app.name));

    debug!(app = %app.name, prefix = %prefix.display(), "generating descriptor");
    // Root ids follow the application name, whatever the prefix is called
    let descriptor = Descriptor::render(&builder, &app.name)?;
    let paths = descriptor.write(&prefix)?;
    println!("✓ Wrote {}", paths.network.display());
    println!("✓ Wrote {}", paths.launch.display());
    println!("  digest: {}", descriptor.digest());
    Ok(())
}

fn cmd_digest(app_path: &Path) -> CliResult<()> {
    println!("{}", render(app_path)?.digest());
    Ok(())
}

fn render(app_path: &Path) -> CliResult<Descriptor> {
    let (app, builder) = df_project::load_graph(app_path)?;
    Ok(Descriptor::render(&builder, &app.name)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn demo(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../demos")
            .join(name)
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn generate_parses_prefix() {
        let cli = Cli::try_parse_from(["df-cli", "generate", "app.yaml", "-p", "out/app"]).unwrap();
        match cli.command {
            Commands::Generate { app_path, prefix } => {
                assert_eq!(app_path, PathBuf::from("app.yaml"));
                assert_eq!(prefix, Some(PathBuf::from("out/app")));
            }
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn generate_writes_both_documents() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("tictac");
        cmd_generate(&demo("tictac.yaml"), Some(&prefix)).unwrap();
        assert!(dir.path().join("tictac.net.xml").exists());
        assert!(dir.path().join("tictac.run.xml").exists());
    }

    #[test]
    fn generate_names_documents_after_the_application() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("out_name");
        cmd_generate(&demo("tictac.yaml"), Some(&prefix)).unwrap();

        let network = std::fs::read_to_string(dir.path().join("out_name.net.xml")).unwrap();
        let launch = std::fs::read_to_string(dir.path().join("out_name.run.xml")).unwrap();
        assert!(network.contains(r#"<network id="tictac">"#));
        assert!(launch.contains(r#"<commands id="tictac">"#));

        // Same bytes as `show`, so the same digest as `digest`
        let rendered = render(&demo("tictac.yaml")).unwrap();
        assert_eq!(network, rendered.network());
        assert_eq!(launch, rendered.launch());
        assert_eq!(
            df_descriptor::digest_hex(&network, &launch),
            rendered.digest()
        );
    }

    #[test]
    fn modules_marks_default_hosts() {
        let (app, builder) = df_project::load_graph(&demo("pipeline.yaml")).unwrap();
        let graph = builder.validate().unwrap();
        let lines = module_lines(&app, &graph);

        assert_eq!(lines[0], "  capture @ grab-01 - bin/capture --device /dev/video0");
        assert_eq!(lines[1], "    out frames");
        assert_eq!(lines[2], "  filter @ localhost (default) - bin/filter --kernel gauss");
        assert_eq!(lines[3], "    in  frames");
        assert!(lines.contains(&"  viewer @ render-01 - bin/viewer".to_string()));
    }

    #[test]
    fn missing_file_is_reported() {
        assert!(matches!(
            cmd_validate(Path::new("does/not/exist.yaml")),
            Err(CliError::Project(ProjectError::Io(_)))
        ));
    }
}
