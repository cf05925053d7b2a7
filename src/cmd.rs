use crate::context::Context;
use crate::error::Error;
use crate::result::Result;
use std::ffi::OsString;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;

/// Public path the build is told its assets are served from
pub const PUBLIC_PATH: &str = "/assets";

/// Run the web build so that it fills `build_dir`
pub fn build(ctx: &Context, program: &str, build_dir: &Path) -> Result<()> {
    let target = build_dir
        .strip_prefix(&ctx.project_dir)
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| build_dir.to_path_buf());
    let target = target.to_string_lossy();

    let args = ["build", "--publicPath", PUBLIC_PATH, "-d", target.as_ref()];
    let path = tool_path(&ctx.project_dir)?;
    execute(ctx, program, &args, Some(path))
}

/// `PATH` with the project's `node_modules/.bin` in front
pub fn tool_path(project_dir: &Path) -> Result<OsString> {
    let bin = project_dir.join("node_modules").join(".bin");
    let mut paths: Vec<PathBuf> = vec![bin];
    if let Some(existing) = std::env::var_os("PATH") {
        paths.extend(std::env::split_paths(&existing));
    }
    std::env::join_paths(paths).map_err(|e| Error::Build(format!("invalid PATH: {}", e)))
}

/// Execute a command in the project directory and stream its output live
pub fn execute(ctx: &Context, program: &str, args: &[&str], path: Option<OsString>) -> Result<()> {
    if ctx.verbose {
        println!("Executing: {} {}", program, args.join(" "));
    }

    let mut command = Command::new(program);
    command
        .args(args)
        .current_dir(&ctx.project_dir)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(path) = path {
        command.env("PATH", path);
    }

    let mut child = command
        .spawn()
        .map_err(|e| Error::Build(format!("can't start {}: {}", program, e)))?;

    // stderr drains on its own thread while stdout is forwarded here
    let stderr = child.stderr.take().map(|stderr| {
        thread::spawn(move || {
            let reader = BufReader::new(stderr);
            for line in reader.lines().map_while(|l| l.ok()) {
                eprintln!("{}", line);
            }
        })
    });

    if let Some(stdout) = child.stdout.take() {
        let reader = BufReader::new(stdout);
        for line in reader.lines().map_while(|l| l.ok()) {
            println!("{}", line);
        }
    }

    let status = child.wait()?;
    if let Some(handle) = stderr {
        let _ = handle.join();
    }

    if !status.success() {
        return Err(Error::Build(format!(
            "{} {} failed with exit code: {}",
            program,
            args.join(" "),
            status.code().unwrap_or(-1)
        )));
    }

    Ok(())
}
