use crate::error::Error;
use crate::result::Result;
use crate::utils;
use std::fs::File;
use std::io;
use std::path::Path;
use walkdir::WalkDir;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Deflate every regular file below `source_dir` into `target_file`.
///
/// Entry names are paths relative to `source_dir` with `/` separators.
pub fn build_zip(source_dir: &Path, target_file: &Path) -> Result<()> {
    if !source_dir.is_dir() {
        return Err(Error::io_at(
            source_dir,
            io::Error::new(io::ErrorKind::NotFound, "zip source is not a directory"),
        ));
    }

    utils::write_atomically(target_file, |writer| {
        let mut zip = ZipWriter::new(writer);

        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .unix_permissions(0o644);

        let walkdir = WalkDir::new(source_dir).sort_by_file_name();
        for entry in walkdir {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let name = utils::archive_name(source_dir, path)?;
            zip.start_file(name, options)?;
            let mut f = File::open(path).map_err(|e| Error::io_at(path, e))?;
            io::copy(&mut f, &mut zip).map_err(|e| {
                Error::Archive(format!("zip {}: {}", path.display(), e))
            })?;
        }

        zip.finish()?;
        Ok(())
    })
}
