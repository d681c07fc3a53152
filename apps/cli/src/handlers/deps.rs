use anyhow::Context;
use std::path::Path;
use std::process::ExitCode;
use vtl_manifest::{DependencyManifest, render};

fn load(path: Option<&Path>) -> anyhow::Result<DependencyManifest> {
    match path {
        Some(path) => DependencyManifest::load(path).with_context(|| format!("Cannot use manifest {}", path.display())),
        None => Ok(DependencyManifest::builtin()?),
    }
}

/// Prints the base requirements followed by one line per extra.
///
/// # Errors
/// Returns an error if the manifest cannot be read or is invalid.
pub fn list(path: Option<&Path>) -> anyhow::Result<ExitCode> {
    let manifest = load(path)?;

    print!("{}", render(manifest.requirements()));
    for name in manifest.extra_names() {
        let packages: Vec<&str> = manifest
            .extra(name)
            .unwrap_or_default()
            .iter()
            .map(|req| req.name.as_str())
            .collect();
        println!("[{name}] {}", packages.join(" "));
    }
    Ok(ExitCode::SUCCESS)
}

/// Prints `requirements.txt` content for the base set plus `extras`.
///
/// # Errors
/// Returns an error for an unreadable manifest or an unknown extra.
pub fn resolve(path: Option<&Path>, extras: &[String]) -> anyhow::Result<ExitCode> {
    let manifest = load(path)?;
    let resolved = manifest.resolve(extras)?;
    print!("{}", render(&resolved));
    Ok(ExitCode::SUCCESS)
}
