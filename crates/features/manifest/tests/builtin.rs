use std::fs;
use tempfile::tempdir;
use vtl_manifest::{ALL_EXTRAS, DependencyManifest, ManifestError, render};

#[test]
fn builtin_manifest_is_valid() {
    let manifest = DependencyManifest::builtin().expect("embedded manifest parses");
    assert!(manifest.requirements().iter().any(|r| r.name == "transformers"));
    assert!(manifest.extra_names().any(|name| name == "deepspeed"));
    assert!(manifest.extra_names().any(|name| name == "metrics"));
}

#[test]
fn builtin_all_extras_have_no_duplicates() {
    let manifest = DependencyManifest::builtin().unwrap();
    let resolved = manifest.resolve(&[ALL_EXTRAS]).unwrap();

    let mut keys: Vec<_> = resolved.iter().map(vtl_manifest::Requirement::key).collect();
    let total = keys.len();
    keys.sort();
    keys.dedup();
    assert_eq!(keys.len(), total);
}

#[test]
fn extras_are_applied_in_requested_order() {
    let manifest = DependencyManifest::builtin().unwrap();
    let resolved = manifest.resolve(&["deepspeed", "torch"]).unwrap();
    let tail: Vec<_> = resolved.iter().rev().take(2).map(|r| r.name.as_str()).collect();
    assert_eq!(tail, ["torch", "deepspeed"]);
}

#[test]
fn load_picks_parser_by_extension() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;

    let txt = dir.path().join("requirements.txt");
    fs::write(&txt, "torch>=2.1\n# comment\ndeepspeed\n")?;
    let manifest = DependencyManifest::load(&txt)?;
    assert_eq!(render(manifest.requirements()), "torch>=2.1\ndeepspeed\n");

    let toml = dir.path().join("deps.toml");
    fs::write(&toml, "requirements = [\"torch>=2.1\"]\n[extras]\ndev = [\"ruff\"]\n")?;
    let manifest = DependencyManifest::load(&toml)?;
    assert_eq!(manifest.extra("dev").map(<[_]>::len), Some(1));
    Ok(())
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempdir().unwrap();
    let err = DependencyManifest::load(dir.path().join("nope.toml")).unwrap_err();
    assert!(matches!(err, ManifestError::Io { context: Some(_), .. }));
}
