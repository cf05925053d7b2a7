use crate::context::Context;
use crate::error::Error;
use crate::result::Result;
use regex::Regex;
use serde::Deserialize;
use std::fs;
use time::OffsetDateTime;

#[derive(Debug, Deserialize, Default)]
pub struct PackageJson {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Host project information used as defaults for the offline config
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    pub name: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
}

impl Manifest {
    /// Load package.json from the project directory and stamp its version
    pub fn load(ctx: &Context) -> Result<Self> {
        Self::load_at(ctx, now())
    }

    pub fn load_at(ctx: &Context, at: OffsetDateTime) -> Result<Self> {
        let path = ctx.project_dir.join("package.json");
        let content = fs::read_to_string(&path)
            .map_err(|_| Error::ManifestNotFound(path.display().to_string()))?;
        let package: PackageJson = serde_json::from_str(&content)
            .map_err(|e| Error::ManifestInvalid(format!("{}: {}", path.display(), e)))?;

        let version = package
            .version
            .map(|v| derive_version(&v, at))
            .transpose()?;

        Ok(Manifest {
            name: package.name,
            version,
            description: package.description,
        })
    }
}

/// Current local time, falling back to UTC when the offset is unknown
pub fn now() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

/// Turn `MAJOR.MINOR.PATCH...` into `MAJOR.MINOR.PATCH.<stamp>`.
///
/// The stamp concatenates year, month, day, hour and minute without zero
/// padding, so `1.2.3` at 2024-03-05 14:07 becomes `1.2.3.202435147`.
/// Versions without a numeric triple prefix are returned unchanged.
pub fn derive_version(version: &str, at: OffsetDateTime) -> Result<String> {
    let semver = Regex::new(r"^[0-9]+\.[0-9]+\.[0-9]+")?;
    Ok(match semver.find(version) {
        Some(m) => format!(
            "{}.{}{}{}{}{}",
            m.as_str(),
            at.year(),
            u8::from(at.month()),
            at.day(),
            at.hour(),
            at.minute()
        ),
        None => version.to_string(),
    })
}
