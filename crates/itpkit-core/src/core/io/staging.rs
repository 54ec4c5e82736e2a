//! Staging files for atomic replacement of an output path.

use std::fs;
use std::io;
use std::path::Path;
use tempfile::{Builder, NamedTempFile};

/// Creates a temporary file in the directory of `path`, ready to be
/// persisted over it.
///
/// The file takes the permissions of an existing `path`; otherwise it gets
/// the mode of a freshly created file (`0o666` minus the umask).
///
/// # Errors
///
/// Returns an error if the directory is missing or not writable, or if the
/// permissions of `path` cannot be read or applied.
pub fn staging_file(path: &Path) -> io::Result<NamedTempFile> {
    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    let mut builder = Builder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    let temp = builder.tempfile_in(parent)?;

    match fs::metadata(path) {
        Ok(existing) => temp.as_file().set_permissions(existing.permissions())?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }
    Ok(temp)
}
