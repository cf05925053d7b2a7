use crate::error::Error;
use crate::result::Result;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Component, Path, PathBuf};

/// Mirror `source` into `destination`, copying only files accepted by `include_file`.
///
/// Directories are always created and descended regardless of the predicate.
pub fn copy_tree<F>(source: &Path, destination: &Path, include_file: &F) -> Result<()>
where
    F: Fn(&Path) -> bool,
{
    ensure_dir(destination)?;

    for entry in fs::read_dir(source).map_err(|e| Error::io_at(source, e))? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let src_path = entry.path();
        let dst_path = destination.join(entry.file_name());

        if file_type.is_dir() {
            copy_tree(&src_path, &dst_path, include_file)?;
        } else if include_file(&src_path) {
            fs::copy(&src_path, &dst_path).map_err(|e| Error::io_at(&src_path, e))?;
        }
    }

    Ok(())
}

/// Copy a single file, creating the destination's parent directories
pub fn copy_file(source: &Path, destination: &Path) -> Result<()> {
    if let Some(parent) = destination.parent() {
        ensure_dir(parent)?;
    }
    fs::copy(source, destination).map_err(|e| Error::io_at(source, e))?;
    Ok(())
}

/// True unless the path names an `.htm` or `.html` file
pub fn is_not_html(path: &Path) -> bool {
    !path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("htm") || ext.eq_ignore_ascii_case("html"))
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path).map_err(|e| Error::io_at(path, e))?;
    }
    Ok(())
}

/// Remove `path` recursively if it exists
pub fn remove_dir(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_dir_all(path).map_err(|e| Error::io_at(path, e))?;
    }
    Ok(())
}

/// Write `target` through a sibling `.part` file that is renamed into place
/// only when `write` succeeds; on failure the partial file is removed.
pub fn write_atomically<F>(target: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<()>,
{
    let partial = partial_path(target);
    let result = File::create(&partial)
        .map_err(|e| Error::io_at(&partial, e))
        .and_then(|file| {
            let mut writer = BufWriter::new(file);
            write(&mut writer)?;
            writer.flush()?;
            let file = writer
                .into_inner()
                .map_err(|e| Error::io_at(&partial, e.into_error()))?;
            file.sync_all()?;
            Ok(())
        })
        .and_then(|()| fs::rename(&partial, target).map_err(|e| Error::io_at(target, e)));

    if result.is_err() {
        let _ = fs::remove_file(&partial);
    }
    result
}

fn partial_path(target: &Path) -> PathBuf {
    let mut name = target.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    target.with_file_name(name)
}

/// Archive entry name for `path` relative to `base`, always `/` separated
pub fn archive_name(base: &Path, path: &Path) -> Result<String> {
    let relative = path.strip_prefix(base).map_err(|_| {
        Error::Archive(format!(
            "{} is not inside {}",
            path.display(),
            base.display()
        ))
    })?;
    let parts: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    Ok(parts.join("/"))
}
