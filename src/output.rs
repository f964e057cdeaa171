//! JSON persistence of parsed versions

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use tracing::debug;

use crate::version::error::OutputError;
use crate::version::types::StructuredVersion;

/// Write the full structured form of `versions` as indented JSON
///
/// Parent directories are created and an existing file is truncated.
pub fn write_versions(path: &Path, versions: &[StructuredVersion]) -> Result<(), OutputError> {
    write_json(path, versions)
}

/// Write only the original strings of `versions`, in order
pub fn write_minimal(path: &Path, versions: &[StructuredVersion]) -> Result<(), OutputError> {
    let originals: Vec<&str> = versions.iter().map(StructuredVersion::original).collect();
    write_json(path, &originals)
}

/// Render `value` as JSON with a four-space indent
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String, OutputError> {
    let mut buf = Vec::new();
    serialize_pretty(&mut buf, value)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn serialize_pretty<W: Write, T: Serialize + ?Sized>(
    writer: W,
    value: &T,
) -> Result<(), serde_json::Error> {
    let mut serializer = Serializer::with_formatter(writer, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut serializer)
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), OutputError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| OutputError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let write_err = |source| OutputError::Write {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(write_err)?;
    let mut writer = BufWriter::new(file);
    serialize_pretty(&mut writer, value)?;
    writer.flush().map_err(write_err)?;

    debug!("Wrote {:?}", path);
    Ok(())
}
