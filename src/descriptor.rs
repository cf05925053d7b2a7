use crate::config::OfflineConfig;
use crate::context::Context;
use crate::error::Error;
use crate::plan::Plan;
use crate::result::Result;
use crate::tpl::{Escape, Tpl};
use crate::utils;
use serde_json::{Map, Value};
use std::fs;

pub const HPMFILE_TEMPLATE: &str = include_str!("../templates/hpmfile.json.hbs");
pub const MANIFEST_TEMPLATE: &str = include_str!("../templates/Manifest.xml.hbs");

/// Build a template processor exposing the config's flat fields
fn template_for(config: &OfflineConfig, escape: Escape) -> Tpl {
    let mut tpl = Tpl::new(escape);

    for (key, value) in &config.extra {
        match value {
            Value::String(s) => tpl.register(key.as_str(), s.as_str()),
            Value::Number(n) => tpl.register(key.as_str(), n.to_string()),
            Value::Bool(b) => tpl.register(key.as_str(), b.to_string()),
            _ => {}
        }
    }

    tpl.register("appid", config.appid.as_str());
    tpl.register("basePath", config.base_path.as_str());
    tpl.register("assetsPath", config.assets_path.as_str());
    tpl.register("entryPath", config.entry_path.as_str());
    for (key, value) in [
        ("name", &config.name),
        ("version", &config.version),
        ("description", &config.description),
    ] {
        if let Some(value) = value {
            tpl.register(key, value.as_str());
        }
    }
    tpl
}

/// Render the application descriptor and merge `hpmAssign` over it
pub fn render_hpmfile(template: &str, config: &OfflineConfig) -> Result<Map<String, Value>> {
    let rendered = template_for(config, Escape::Json).parse(template)?;
    let mut descriptor = match serde_json::from_str::<Value>(&rendered)? {
        Value::Object(map) => map,
        other => {
            return Err(Error::Template(format!(
                "application descriptor must render to a JSON object, got {}",
                other
            )));
        }
    };

    if let Some(assign) = &config.hpm_assign {
        for (key, value) in assign {
            descriptor.insert(key.clone(), value.clone());
        }
    }
    Ok(descriptor)
}

/// Render the manifest descriptor as plain text
pub fn render_manifest(template: &str, config: &OfflineConfig) -> Result<String> {
    template_for(config, Escape::Xml).parse(template)
}

/// Write `hpmfile.json` into the archive root and `Manifest.xml` into staging
pub fn write_all(ctx: &Context, config: &OfflineConfig, plan: &Plan) -> Result<()> {
    let hpmfile = render_hpmfile(HPMFILE_TEMPLATE, config)?;
    let manifest = render_manifest(MANIFEST_TEMPLATE, config)?;

    utils::ensure_dir(&plan.archive_root)?;
    ctx.remark(format!("generate hpmfile.json to {}", plan.hpmfile.display()));
    fs::write(&plan.hpmfile, serde_json::to_vec(&Value::Object(hpmfile))?)
        .map_err(|e| Error::io_at(&plan.hpmfile, e))?;

    ctx.remark(format!("generate Manifest.xml to {}", plan.manifest_file.display()));
    fs::write(&plan.manifest_file, manifest).map_err(|e| Error::io_at(&plan.manifest_file, e))?;
    Ok(())
}
