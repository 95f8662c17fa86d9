use crate::error::{Error, Result};
use std::fs::{self, File, OpenOptions};
use std::io::Read;
use std::path::Path;

fn reject_symlink(path: &Path) -> Result<()> {
    if let Ok(meta) = fs::symlink_metadata(path) {
        if meta.file_type().is_symlink() {
            return Err(Error::Validation(format!(
                "Refusing to follow symbolic link: {}",
                path.display()
            )));
        }
    }
    Ok(())
}

/// Open a file for reading, refusing symbolic links unless `follow_symlinks` is set
pub fn safe_open_file(path: &Path, follow_symlinks: bool) -> Result<File> {
    if !follow_symlinks {
        reject_symlink(path)?;
    }
    Ok(File::open(path)?)
}

/// Create (or truncate) a file for writing, refusing symbolic links unless `follow_symlinks` is set
pub fn safe_create_file(path: &Path, follow_symlinks: bool) -> Result<File> {
    if !follow_symlinks {
        reject_symlink(path)?;
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)?)
}

pub fn read_file_to_string(path: &Path) -> Result<String> {
    let mut content = String::new();
    safe_open_file(path, false)?.read_to_string(&mut content)?;
    Ok(content)
}

/// Copy `from` to `to`, replacing any file already at `to`
pub fn copy_file(from: &Path, to: &Path) -> Result<u64> {
    reject_symlink(to)?;
    if to.exists() {
        fs::remove_file(to)?;
    }
    Ok(fs::copy(from, to)?)
}
