use crate::config::OfflineConfig;
use crate::result::Result;
use std::path::{Component, Path, PathBuf};

/// Every location a single packaging run touches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    /// `<root>/dist`, filled by the web build
    pub build_dir: PathBuf,
    /// `<root>/temp`, recreated every run
    pub temp_dir: PathBuf,
    /// `<temp>/<appid>`, mirrors the packaged layout
    pub archive_root: PathBuf,
    /// `<archive_root>/<basePath>`
    pub server_base: PathBuf,
    /// `<server_base>/<assetsPath>`
    pub assets_dir: PathBuf,
    /// `<temp>/<appid>.tar`
    pub tar_file: PathBuf,
    /// `<temp>/Manifest.xml`
    pub manifest_file: PathBuf,
    /// `<archive_root>/hpmfile.json`
    pub hpmfile: PathBuf,
}

impl Plan {
    /// Derive all paths for `config` under `root_path` and record its `entryPath`.
    ///
    /// Performs no I/O; a missing entry page fails before anything is created.
    pub fn new(config: &mut OfflineConfig, root_path: &Path) -> Result<Self> {
        let entry = config.entry()?;
        config.entry_path = entry_path(entry);

        let build_dir = root_path.join("dist");
        let temp_dir = root_path.join("temp");
        let archive_root = temp_dir.join(&config.appid);
        let server_base = join_relative(&archive_root, config.base_path_trimmed());
        let assets_dir = join_relative(&server_base, &config.assets_path);

        Ok(Plan {
            tar_file: temp_dir.join(format!("{}.tar", config.appid)),
            manifest_file: temp_dir.join("Manifest.xml"),
            hpmfile: archive_root.join("hpmfile.json"),
            build_dir,
            temp_dir,
            archive_root,
            server_base,
            assets_dir,
        })
    }

    /// Target directory of a configured html file
    pub fn html_dir(&self, dir: &str) -> PathBuf {
        join_relative(&self.server_base, dir)
    }

    /// Final offline package `<root>/<version>.<ext>`
    pub fn package_file(root_path: &Path, version: &str, extension: &str) -> PathBuf {
        root_path.join(format!("{}.{}", version, extension))
    }
}

/// Entry directory relative to the server base: `""` or `/<relative>`
pub fn entry_path(entry: &str) -> String {
    let relative = normalize(entry);
    if relative.is_empty() {
        String::new()
    } else {
        format!("/{}", relative.join("/"))
    }
}

/// Join `rel` onto `base` treating a leading `/` as relative to `base`
fn join_relative(base: &Path, rel: &str) -> PathBuf {
    normalize(rel)
        .into_iter()
        .fold(base.to_path_buf(), |acc, part| acc.join(part))
}

/// Lexically resolve `.` and `..` in a slash separated relative path
fn normalize(rel: &str) -> Vec<String> {
    let mut parts: Vec<String> = Vec::new();
    for component in Path::new(rel.trim_start_matches(['/', '\\'])).components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            Component::ParentDir => {
                if parts.last().is_some_and(|p| p != "..") {
                    parts.pop();
                } else {
                    parts.push("..".to_string());
                }
            }
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }
    parts
}
