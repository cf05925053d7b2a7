use crate::archive;
use crate::cmd;
use crate::config::OfflineConfig;
use crate::context::Context;
use crate::descriptor;
use crate::error::Error;
use crate::manifest::Manifest;
use crate::plan::Plan;
use crate::result::Result;
use crate::utils;
use rayon::prelude::*;
use std::io;
use std::path::PathBuf;

/// Ordered stages of a packaging run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Load,
    Plan,
    ResetStaging,
    Build,
    DistributeAssets,
    DistributeEntries,
    RenderDescriptors,
    Compress,
    Done,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Load => "Loading config.json",
            Stage::Plan => "Planning package layout",
            Stage::ResetStaging => "Resetting staging folder",
            Stage::Build => "Building application",
            Stage::DistributeAssets => "Copying assets",
            Stage::DistributeEntries => "Copying html entries",
            Stage::RenderDescriptors => "Generating descriptors",
            Stage::Compress => "Compressing offline package",
            Stage::Done => "Finished",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct Options {
    pub skip_build: bool,
    pub skip_compress: bool,
    /// Extension of the final package, without the dot
    pub extension: String,
    /// Program invoked as `<program> build ...`
    pub build_command: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            skip_build: false,
            skip_compress: false,
            extension: "amr".to_string(),
            build_command: "nowa".to_string(),
        }
    }
}

/// What a finished run produced
#[derive(Debug, Clone)]
pub struct Outcome {
    pub config: OfflineConfig,
    pub plan: Plan,
    /// Final archive, `None` when compression was skipped
    pub package: Option<PathBuf>,
}

/// Run every stage in order, reporting each one to `on_stage` before it starts.
///
/// The first failure aborts the run; staging is left as-is for the next reset.
pub fn run<F>(
    ctx: &Context,
    options: &Options,
    manifest: &Manifest,
    mut on_stage: F,
) -> Result<Outcome>
where
    F: FnMut(Stage),
{
    on_stage(Stage::Load);
    let mut config = OfflineConfig::load(&ctx.root_path)?;
    config.apply_defaults(manifest);
    if !options.skip_compress {
        package_version(&config)?;
    }

    on_stage(Stage::Plan);
    let plan = Plan::new(&mut config, &ctx.root_path)?;

    on_stage(Stage::ResetStaging);
    reset_staging(ctx, &plan)?;

    if !options.skip_build {
        on_stage(Stage::Build);
        cmd::build(ctx, &options.build_command, &plan.build_dir)?;
    }

    on_stage(Stage::DistributeAssets);
    distribute_assets(ctx, &plan)?;

    on_stage(Stage::DistributeEntries);
    distribute_entries(ctx, &config, &plan)?;

    on_stage(Stage::RenderDescriptors);
    descriptor::write_all(ctx, &config, &plan)?;

    let package = if options.skip_compress {
        None
    } else {
        on_stage(Stage::Compress);
        Some(compress(ctx, &config, &plan, &options.extension)?)
    };

    on_stage(Stage::Done);
    Ok(Outcome {
        config,
        plan,
        package,
    })
}

/// Delete the staging folder and recreate the assets directory with its ancestors
pub fn reset_staging(ctx: &Context, plan: &Plan) -> Result<()> {
    ctx.remark(format!(
        "remove folder {}, since it may populate assets",
        plan.temp_dir.display()
    ));
    utils::remove_dir(&plan.temp_dir)?;
    ctx.remark(format!("create folder {}", plan.assets_dir.display()));
    utils::ensure_dir(&plan.assets_dir)
}

/// Copy the build output into the assets directory, leaving html files out
pub fn distribute_assets(ctx: &Context, plan: &Plan) -> Result<()> {
    ctx.remark(format!(
        "copy all files from {} to {}, except htmls",
        plan.build_dir.display(),
        plan.assets_dir.display()
    ));
    utils::copy_tree(&plan.build_dir, &plan.assets_dir, &utils::is_not_html)
}

/// Copy each configured html file into its target directory
pub fn distribute_entries(ctx: &Context, config: &OfflineConfig, plan: &Plan) -> Result<()> {
    let entries: Vec<(&str, &str)> = config.html_entries().collect();

    // Remarks are emitted once every parallel copy has finished
    let copied = entries
        .par_iter()
        .map(|&(filename, dir)| {
            let source = entry_source(ctx, plan, filename)?;
            let html_dir = plan.html_dir(dir);
            utils::copy_file(&source, &html_dir.join(filename))?;
            Ok(format!("copy {} to {}", filename, html_dir.display()))
        })
        .collect::<Result<Vec<String>>>()?;

    for line in copied {
        ctx.remark(line);
    }
    Ok(())
}

/// An html entry comes from the offline folder, else from the build output
fn entry_source(ctx: &Context, plan: &Plan, filename: &str) -> Result<PathBuf> {
    [ctx.root_path.join(filename), plan.build_dir.join(filename)]
        .into_iter()
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| {
            Error::io_at(
                ctx.root_path.join(filename),
                io::Error::new(io::ErrorKind::NotFound, "html entry not found"),
            )
        })
}

/// Version naming the final package; checked before any staging I/O
fn package_version(config: &OfflineConfig) -> Result<&str> {
    config
        .version
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::Configuration("no version in config.json or package.json".into()))
}

/// Tar the archive root into staging, then zip staging into `<root>/<version>.<ext>`
pub fn compress(
    ctx: &Context,
    config: &OfflineConfig,
    plan: &Plan,
    extension: &str,
) -> Result<PathBuf> {
    let version = package_version(config)?;

    ctx.remark(format!("create {}", plan.tar_file.display()));
    archive::build_tar(&plan.archive_root, &plan.tar_file)?;

    let package = Plan::package_file(&ctx.root_path, version, extension);
    ctx.remark(format!("create {}", package.display()));
    archive::build_zip(&plan.temp_dir, &package)?;
    Ok(package)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Read;
    use std::path::Path;
    use tempfile::TempDir;

    const DEMO_CONFIG: &str = r#"{
        "appid": "demo",
        "basePath": "/app",
        "assetsPath": "assets",
        "htmls": { "index.htm": "pages" }
    }"#;

    fn project(config: &str) -> (TempDir, Context) {
        let dir = TempDir::new().unwrap();
        let ctx = Context::new(dir.path().to_path_buf(), Path::new("offline"), false);
        fs::create_dir_all(ctx.root_path.join("dist")).unwrap();
        fs::write(ctx.root_path.join("config.json"), config).unwrap();
        fs::write(ctx.root_path.join("dist/main.js"), "main()").unwrap();
        fs::write(ctx.root_path.join("dist/index.htm"), "<html>").unwrap();
        (dir, ctx)
    }

    fn manifest() -> Manifest {
        Manifest {
            name: Some("demo-app".into()),
            version: Some("1.2.3.202435147".into()),
            description: Some("A demo".into()),
        }
    }

    fn skip_build() -> Options {
        Options {
            skip_build: true,
            ..Options::default()
        }
    }

    #[test]
    fn test_assembles_staging_tree() {
        let (_dir, ctx) = project(DEMO_CONFIG);
        let options = Options {
            skip_compress: true,
            ..skip_build()
        };
        let mut stages = Vec::new();
        let outcome = run(&ctx, &options, &manifest(), |s| stages.push(s)).unwrap();

        let app = ctx.root_path.join("temp/demo/app");
        assert!(app.join("assets/main.js").is_file());
        assert!(!app.join("assets/index.htm").exists());
        assert_eq!(fs::read_to_string(app.join("pages/index.htm")).unwrap(), "<html>");
        assert!(ctx.root_path.join("temp/demo/hpmfile.json").is_file());
        assert!(ctx.root_path.join("temp/Manifest.xml").is_file());
        assert!(!ctx.root_path.join("temp/demo.tar").exists());
        assert!(outcome.package.is_none());
        assert_eq!(outcome.config.entry_path, "/pages");
        assert!(!stages.contains(&Stage::Build));
        assert!(!stages.contains(&Stage::Compress));
        assert_eq!(stages.last(), Some(&Stage::Done));

        let hpmfile: serde_json::Value =
            serde_json::from_slice(&fs::read(ctx.root_path.join("temp/demo/hpmfile.json")).unwrap())
                .unwrap();
        assert_eq!(hpmfile["version"], "1.2.3.202435147");
        assert_eq!(hpmfile["name"], "demo-app");
    }

    #[test]
    fn test_entry_in_offline_folder_wins_over_dist() {
        let (_dir, ctx) = project(DEMO_CONFIG);
        fs::write(ctx.root_path.join("index.htm"), "<html offline>").unwrap();
        let options = Options {
            skip_compress: true,
            ..skip_build()
        };
        run(&ctx, &options, &manifest(), |_| {}).unwrap();
        assert_eq!(
            fs::read_to_string(ctx.root_path.join("temp/demo/app/pages/index.htm")).unwrap(),
            "<html offline>"
        );
    }

    #[test]
    fn test_produces_versioned_package() {
        let (_dir, ctx) = project(DEMO_CONFIG);
        let outcome = run(&ctx, &skip_build(), &manifest(), |_| {}).unwrap();

        let package = outcome.package.unwrap();
        assert_eq!(package, ctx.root_path.join("1.2.3.202435147.amr"));
        assert!(ctx.root_path.join("temp/demo.tar").is_file());

        let mut archive = zip::ZipArchive::new(fs::File::open(&package).unwrap()).unwrap();
        let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
        names.sort();
        assert!(names.contains(&"Manifest.xml".to_string()));
        assert!(names.contains(&"demo.tar".to_string()));
        assert!(names.contains(&"demo/app/assets/main.js".to_string()));
        assert!(names.contains(&"demo/app/pages/index.htm".to_string()));

        let mut manifest_xml = String::new();
        archive
            .by_name("Manifest.xml")
            .unwrap()
            .read_to_string(&mut manifest_xml)
            .unwrap();
        assert!(manifest_xml.contains("<entryPath>/pages</entryPath>"));
    }

    #[test]
    fn test_reset_staging_removes_leftovers() {
        let (_dir, ctx) = project(DEMO_CONFIG);
        let mut config = OfflineConfig::load(&ctx.root_path).unwrap();
        let plan = Plan::new(&mut config, &ctx.root_path).unwrap();

        reset_staging(&ctx, &plan).unwrap();
        fs::write(plan.assets_dir.join("stale.js"), "old").unwrap();
        fs::write(plan.temp_dir.join("old.tar"), "old").unwrap();
        reset_staging(&ctx, &plan).unwrap();

        assert!(plan.assets_dir.is_dir());
        assert_eq!(fs::read_dir(&plan.assets_dir).unwrap().count(), 0);
        assert!(!plan.temp_dir.join("old.tar").exists());
    }

    #[test]
    fn test_missing_entry_creates_nothing() {
        let (_dir, ctx) = project(r#"{"appid":"demo","basePath":"/","htmls":{"a.htm":"x"}}"#);
        let err = run(&ctx, &skip_build(), &manifest(), |_| {}).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert!(!ctx.root_path.join("temp").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_build_aborts_before_copy() {
        let (_dir, ctx) = project(DEMO_CONFIG);
        let options = Options {
            build_command: "false".into(),
            ..Options::default()
        };
        let err = run(&ctx, &options, &manifest(), |_| {}).unwrap_err();
        assert!(matches!(err, Error::Build(_)));
        assert!(ctx.root_path.join("temp/demo/app/assets").is_dir());
        assert!(!ctx.root_path.join("temp/demo/app/assets/main.js").exists());
    }

    #[test]
    fn test_missing_version_fails_before_staging() {
        let (_dir, ctx) = project(DEMO_CONFIG);
        let err = run(&ctx, &skip_build(), &Manifest::default(), |_| {}).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert!(!ctx.root_path.join("temp").exists());
    }

    #[test]
    fn test_missing_version_allowed_without_compression() {
        let (_dir, ctx) = project(DEMO_CONFIG);
        let options = Options {
            skip_compress: true,
            ..skip_build()
        };
        let outcome = run(&ctx, &options, &Manifest::default(), |_| {}).unwrap();
        assert!(outcome.package.is_none());
        assert!(ctx.root_path.join("temp/demo/hpmfile.json").is_file());
    }

    #[test]
    fn test_each_html_entry_lands_in_its_own_dir() {
        let (_dir, ctx) = project(
            r#"{
                "appid": "demo",
                "basePath": "/app",
                "htmls": { "index.htm": "pages", "help.htm": "/help" }
            }"#,
        );
        fs::write(ctx.root_path.join("dist/help.htm"), "<html help>").unwrap();
        let options = Options {
            skip_compress: true,
            ..skip_build()
        };
        run(&ctx, &options, &manifest(), |_| {}).unwrap();

        let app = ctx.root_path.join("temp/demo/app");
        assert_eq!(fs::read_to_string(app.join("pages/index.htm")).unwrap(), "<html>");
        assert_eq!(fs::read_to_string(app.join("help/help.htm")).unwrap(), "<html help>");
        assert!(!app.join("pages/help.htm").exists());
        assert!(!app.join("help/index.htm").exists());
        assert!(!app.join("assets/index.htm").exists());
        assert!(!app.join("assets/help.htm").exists());
        assert!(!ctx.root_path.join("help/help.htm").exists());
        assert!(app.join("assets/main.js").is_file());
    }

    #[test]
    fn test_missing_html_entry_is_io_error() {
        let (_dir, ctx) = project(
            r#"{"appid":"demo","basePath":"/","htmls":{"index.htm":"","help.htm":"help"}}"#,
        );
        let err = run(&ctx, &skip_build(), &manifest(), |_| {}).unwrap_err();
        assert_eq!(err.exit_code(), 4);
        assert!(err.to_string().contains("help.htm"));
    }
}
