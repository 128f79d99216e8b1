use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::DocumentError;
use crate::shape::Shape;

/// On-disk representation of a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Container {
    pub shape: Shape,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
}

/// Reads a container from `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or is not a valid container.
pub fn read_container(path: &Path) -> Result<Container, DocumentError> {
    let file = File::open(path).map_err(|source| DocumentError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

/// Writes a container to `path`, replacing any existing file.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn write_container(path: &Path, container: &Container) -> Result<(), DocumentError> {
    let write_error = |source| DocumentError::Write {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(write_error)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, container)?;
    writer.flush().map_err(write_error)
}
