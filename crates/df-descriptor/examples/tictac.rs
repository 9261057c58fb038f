//! Two modules exchanging text: `put` writes, `get` reads.
//!
//! Run with `cargo run -p df-descriptor --example tictac [PREFIX]`; writes
//! `PREFIX.net.xml` and `PREFIX.run.xml` (default prefix `tictac`).

use df_descriptor::EmitResult;
use df_graph::{Direction, GraphBuilder};

fn main() -> EmitResult<()> {
    tracing_subscriber::fmt::init();

    let prefix = std::env::args().nth(1).unwrap_or_else(|| "tictac".to_string());

    let mut app = GraphBuilder::new();

    let put = app.create_node("put", "bin/put")?;
    let outport = app.add_port(put, "text", Direction::Out)?;

    let get = app.create_node("get", "bin/get")?;
    let inport = app.add_port(get, "text", Direction::In)?;

    app.link(outport, inport)?;

    let descriptor = df_descriptor::emit(&app, &prefix)?;
    println!("{} ({})", prefix, descriptor.digest());
    Ok(())
}
