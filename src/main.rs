mod archive;
mod args;
mod cmd;
mod config;
mod context;
mod descriptor;
mod error;
mod manifest;
mod pipeline;
mod plan;
mod result;
mod tpl;
mod utils;

use args::Args;
use context::Context;
use manifest::Manifest;
use pipeline::{Options, Stage};

fn main() {
    if let Err(e) = run() {
        let _ = cliclack::outro_cancel(e.to_string());
        std::process::exit(e.exit_code());
    }
}

fn run() -> result::Result<()> {
    // Parse command-line arguments
    let Args {
        verbose,
        path,
        skip_build,
        skip_compress,
        extension,
        build_command,
    } = Args::parse();

    let project_dir = std::env::current_dir()?;
    let ctx = Context::new(project_dir, &path, verbose);

    cliclack::intro("offpack")?;

    // package.json supplies name, version and description defaults
    let manifest = Manifest::load(&ctx)?;
    if let Some(version) = &manifest.version {
        cliclack::log::info(format!("Packaging version {}", version))?;
    }

    let options = Options {
        skip_build,
        skip_compress,
        extension,
        build_command,
    };

    let mut current: Option<(cliclack::ProgressBar, Stage)> = None;
    let outcome = pipeline::run(&ctx, &options, &manifest, |stage| {
        if let Some((spinner, previous)) = current.take() {
            spinner.stop(previous);
        }
        match stage {
            Stage::Done => {}
            // The build streams its own output, no spinner over it
            Stage::Build => {
                let _ = cliclack::log::step(stage);
            }
            stage => {
                let spinner = cliclack::spinner();
                spinner.start(format!("{}...", stage));
                current = Some((spinner, stage));
            }
        }
    });

    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(e) => {
            if let Some((spinner, stage)) = current.take() {
                spinner.error(format!("{} failed", stage));
            }
            return Err(e);
        }
    };

    match &outcome.package {
        Some(package) => cliclack::outro(format!(
            "Finished! {} packaged to {}",
            outcome.config.appid,
            package.display()
        ))?,
        None => cliclack::outro(format!(
            "Finished! {} left unarchived in {}",
            outcome.config.appid,
            outcome.plan.temp_dir.display()
        ))?,
    }
    Ok(())
}
