use clap::{Arg, ArgAction, Command};
use std::path::PathBuf;

/// Command-line arguments for the offpack tool
#[derive(Debug)]
pub struct Args {
    /// Enable verbose output
    pub verbose: bool,

    /// Folder holding config.json and the html entry files
    pub path: PathBuf,

    /// Skip the external build (reuse the existing dist folder)
    pub skip_build: bool,

    /// Leave the assembled tree in temp/ instead of archiving it
    pub skip_compress: bool,

    /// Extension of the final offline package
    pub extension: String,

    /// Program invoked to build the web application
    pub build_command: String,
}

impl Args {
    /// Parse command-line arguments
    pub fn parse() -> Self {
        let matches = Command::new("offpack")
            .version(env!("CARGO_PKG_VERSION"))
            .about("Offline package generation tool for hybrid web applications")
            .arg(
                Arg::new("path")
                    .short('p')
                    .long("path")
                    .value_name("PATH")
                    .default_value("offline")
                    .help("Offline package folder holding config.json and html files")
            )
            .arg(
                Arg::new("verbose")
                    .short('v')
                    .long("verbose")
                    .action(ArgAction::SetTrue)
                    .help("Enable verbose output")
            )
            .arg(
                Arg::new("skip-build")
                    .short('s')
                    .long("skip-build")
                    .action(ArgAction::SetTrue)
                    .help("Skip the web application build (use existing dist)")
            )
            .arg(
                Arg::new("skip-compress")
                    .short('c')
                    .long("skip-compress")
                    .action(ArgAction::SetTrue)
                    .help("Skip compression and keep the assembled temp folder")
            )
            .arg(
                Arg::new("extension")
                    .short('e')
                    .long("extension")
                    .value_name("EXT")
                    .default_value("amr")
                    .help("Extension of the generated offline package")
            )
            .arg(
                Arg::new("build-command")
                    .long("build-command")
                    .value_name("PROGRAM")
                    .env("OFFPACK_BUILD_COMMAND")
                    .default_value("nowa")
                    .help("Program used to build the web application")
            )
            .get_matches();

        Self {
            verbose: matches.get_flag("verbose"),
            path: matches
                .get_one::<String>("path")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("offline")),
            skip_build: matches.get_flag("skip-build"),
            skip_compress: matches.get_flag("skip-compress"),
            extension: matches
                .get_one::<String>("extension")
                .cloned()
                .unwrap_or_else(|| "amr".to_string()),
            build_command: matches
                .get_one::<String>("build-command")
                .cloned()
                .unwrap_or_else(|| "nowa".to_string()),
        }
    }
}
