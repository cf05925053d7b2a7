use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Can't locate package.json at {0}, run offpack inside a valid project")]
    ManifestNotFound(String),

    #[error("Can't read package.json at {0}")]
    ManifestInvalid(String),

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Build failed: {0}")]
    Build(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("I/O error at {}: {source}", path.display())]
    IoAt {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Template error: {0}")]
    Template(String),

    #[error("Descriptor error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl Error {
    /// Attach the path an I/O operation failed on
    pub fn io_at<P: Into<PathBuf>>(path: P, source: std::io::Error) -> Self {
        Error::IoAt {
            path: path.into(),
            source,
        }
    }

    /// Process exit code reported for this failure kind
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::ManifestNotFound(_) | Error::ManifestInvalid(_) | Error::Regex(_) => 1,
            Error::Configuration(_) => 2,
            Error::Build(_) => 3,
            Error::Io(_) | Error::IoAt { .. } | Error::Walk(_) => 4,
            Error::Template(_) | Error::Json(_) => 5,
            Error::Archive(_) | Error::Zip(_) => 6,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct_per_kind() {
        let codes = [
            Error::Configuration("x".into()).exit_code(),
            Error::Build("x".into()).exit_code(),
            Error::Io(std::io::Error::other("x")).exit_code(),
            Error::Template("x".into()).exit_code(),
            Error::Archive("x".into()).exit_code(),
        ];
        let mut unique = codes.to_vec();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), codes.len());
        assert_eq!(Error::ManifestNotFound("p".into()).exit_code(), 1);
        assert_eq!(Error::ManifestInvalid("p".into()).exit_code(), 1);
    }
}
