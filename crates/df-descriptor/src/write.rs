//! All-or-nothing file output.
//!
//! Every file is first staged as a temporary file in its target directory.
//! Only once all of them are complete on disk are they renamed into place.
//! If a rename fails midway, files already moved are put back to their
//! previous state.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::{debug, warn};

pub(crate) fn write_all_or_nothing(files: &[(&Path, &[u8])]) -> io::Result<()> {
    let mut staged = Vec::with_capacity(files.len());
    for &(path, content) in files {
        let mut tmp = NamedTempFile::new_in(parent_dir(path))?;
        tmp.write_all(content)?;
        tmp.as_file().sync_all()?;
        staged.push((tmp, path));
    }

    // Snapshot what we are about to replace so a failed commit can be undone.
    let mut previous = Vec::with_capacity(staged.len());
    for (_, path) in &staged {
        previous.push(match fs::read(path) {
            Ok(bytes) => Some(bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => return Err(e),
        });
    }

    let mut committed: Vec<(&Path, Option<Vec<u8>>)> = Vec::with_capacity(staged.len());
    for ((tmp, path), before) in staged.into_iter().zip(previous) {
        if let Err(err) = tmp.persist(path) {
            rollback(&committed);
            return Err(err.error);
        }
        debug!(path = %path.display(), "committed");
        committed.push((path, before));
    }

    Ok(())
}

fn rollback(committed: &[(&Path, Option<Vec<u8>>)]) {
    for (path, before) in committed.iter().rev() {
        let result = match before {
            Some(bytes) => fs::write(path, bytes),
            None => fs::remove_file(path),
        };
        if let Err(e) = result {
            warn!(path = %path.display(), error = %e, "rollback failed");
        }
    }
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}
