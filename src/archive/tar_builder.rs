use crate::error::Error;
use crate::result::Result;
use crate::utils;
use std::fs;
use std::path::Path;
use tar::Builder;

/// Archive the immediate children of `source_dir` into `target_file`.
///
/// Subdirectories become subtrees named after the child, regular files are
/// stored under their base name and anything else is skipped.
pub fn build_tar(source_dir: &Path, target_file: &Path) -> Result<()> {
    let mut children = fs::read_dir(source_dir)
        .map_err(|e| Error::io_at(source_dir, e))?
        .collect::<std::io::Result<Vec<_>>>()?;
    children.sort_by_key(|entry| entry.file_name());

    utils::write_atomically(target_file, |writer| {
        let mut tar = Builder::new(writer);
        tar.follow_symlinks(false);

        for child in &children {
            let path = child.path();
            let name = child.file_name();
            let file_type = fs::symlink_metadata(&path)
                .map_err(|e| Error::io_at(&path, e))?
                .file_type();

            if file_type.is_dir() {
                tar.append_dir_all(&name, &path).map_err(|e| stream_error(&path, e))?;
            } else if file_type.is_file() {
                tar.append_path_with_name(&path, &name)
                    .map_err(|e| stream_error(&path, e))?;
            }
        }

        tar.finish().map_err(|e| stream_error(target_file, e))?;
        Ok(())
    })
}

fn stream_error(path: &Path, err: std::io::Error) -> Error {
    Error::Archive(format!("tar {}: {}", path.display(), err))
}
