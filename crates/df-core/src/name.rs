//! Identifier rules for node and port names.
//!
//! Names end up as XML attribute values and inside `node.port` endpoint
//! references, so a few characters are reserved.

use thiserror::Error;

/// Characters that may not appear in a node or port name.
pub const RESERVED_CHARS: [char; 2] = ['.', '/'];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NameError {
    #[error("name is empty")]
    Empty,

    #[error("name {name:?} contains whitespace")]
    Whitespace { name: String },

    #[error("name {name:?} contains reserved character {ch:?}")]
    Reserved { name: String, ch: char },
}

/// Check that `name` is usable as a node or port identifier.
pub fn check_name(name: &str) -> Result<(), NameError> {
    if name.is_empty() {
        return Err(NameError::Empty);
    }
    if name.chars().any(char::is_whitespace) {
        return Err(NameError::Whitespace {
            name: name.to_string(),
        });
    }
    if let Some(ch) = name.chars().find(|c| RESERVED_CHARS.contains(c)) {
        return Err(NameError::Reserved {
            name: name.to_string(),
            ch,
        });
    }
    Ok(())
}
