use std::path::{Path, PathBuf};

/// Context passed throughout the application containing global configuration
#[derive(Clone)]
pub struct Context {
    /// Enable verbose output (show stage details and build command lines)
    pub verbose: bool,

    /// Project directory (directory containing package.json)
    pub project_dir: PathBuf,

    /// Offline package folder (holds config.json, receives dist/ and temp/)
    pub root_path: PathBuf,
}

impl Context {
    pub fn new(project_dir: PathBuf, path: &Path, verbose: bool) -> Self {
        let root_path = project_dir.join(path);

        Self {
            verbose,
            project_dir,
            root_path,
        }
    }

    /// Emit a stage detail line when running verbosely
    pub fn remark(&self, msg: impl std::fmt::Display) {
        if self.verbose {
            let _ = cliclack::log::remark(msg);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_path_is_relative_to_project() {
        let ctx = Context::new(PathBuf::from("/work/app"), Path::new("offline"), false);
        assert_eq!(ctx.root_path, PathBuf::from("/work/app/offline"));
    }

    #[test]
    fn test_absolute_path_overrides_project() {
        let ctx = Context::new(PathBuf::from("/work/app"), Path::new("/elsewhere"), true);
        assert_eq!(ctx.root_path, PathBuf::from("/elsewhere"));
        assert!(ctx.verbose);
    }
}
