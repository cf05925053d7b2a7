use crate::error::Error;
use crate::manifest::Manifest;
use crate::result::Result;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// Key in `htmls` naming the entry page
pub const ENTRY_HTML: &str = "index.htm";

pub const DEFAULT_ASSETS_PATH: &str = "assets";

/// Offline package configuration read from `<root>/config.json`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfflineConfig {
    pub appid: String,

    pub base_path: String,

    #[serde(default = "default_assets_path")]
    pub assets_path: String,

    /// Output filename -> directory (relative to the server base path)
    pub htmls: Map<String, Value>,

    #[serde(default)]
    pub version: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub hpm_assign: Option<Map<String, Value>>,

    /// Computed while planning, never read from disk
    #[serde(default, skip_deserializing)]
    pub entry_path: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_assets_path() -> String {
    DEFAULT_ASSETS_PATH.to_string()
}

impl OfflineConfig {
    /// Load `config.json` from the offline package folder
    pub fn load(root_path: &Path) -> Result<Self> {
        let path = root_path.join("config.json");
        let content = fs::read_to_string(&path).map_err(|e| {
            Error::Configuration(format!("can't read {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
            .map_err(|e| Error::Configuration(format!("{}: {}", path.display(), e)))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: OfflineConfig = serde_json::from_str(content)
            .map_err(|e| Error::Configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks run before any filesystem side effect
    pub fn validate(&self) -> Result<()> {
        if self.appid.trim().is_empty() {
            return Err(Error::Configuration("\"appid\" must not be empty".into()));
        }
        self.entry()?;
        for (filename, dir) in &self.htmls {
            if !dir.is_string() {
                return Err(Error::Configuration(format!(
                    "htmls[\"{}\"] must be a directory path string",
                    filename
                )));
            }
        }
        Ok(())
    }

    /// Directory of the entry page as configured
    pub fn entry(&self) -> Result<&str> {
        self.htmls
            .get(ENTRY_HTML)
            .and_then(Value::as_str)
            .ok_or_else(|| {
                Error::Configuration(format!(
                    "can't find entry \"{}\" in your config['htmls']",
                    ENTRY_HTML
                ))
            })
    }

    /// Configured html files with their target directories
    pub fn html_entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.htmls
            .iter()
            .filter_map(|(file, dir)| dir.as_str().map(|dir| (file.as_str(), dir)))
    }

    /// Fill `version`, `name` and `description` from the host manifest when absent
    pub fn apply_defaults(&mut self, manifest: &Manifest) {
        fill(&mut self.version, &manifest.version);
        fill(&mut self.name, &manifest.name);
        fill(&mut self.description, &manifest.description);
    }

    /// `basePath` with its leading slashes removed
    pub fn base_path_trimmed(&self) -> &str {
        self.base_path.trim_start_matches('/')
    }
}

fn fill(field: &mut Option<String>, default: &Option<String>) {
    if field.as_deref().is_none_or(str::is_empty) {
        *field = default.clone();
    }
}
