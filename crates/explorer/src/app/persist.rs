use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use super::AppError;

/// Stages `bytes` in the target directory, then renames over `path`.
pub(crate) fn persist_bytes(path: &Path, bytes: &[u8]) -> Result<(), AppError> {
    stage_and_rename(path, bytes).map_err(|source| AppError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn stage_and_rename(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut staged = NamedTempFile::new_in(dir)?;
    staged.write_all(bytes)?;
    staged.as_file().sync_all()?;
    staged.persist(path).map_err(|err| err.error)?;
    Ok(())
}
