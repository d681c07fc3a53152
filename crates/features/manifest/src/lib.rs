//! # Dependency Manifest
//!
//! Reads the package list of the multimodal fine-tuning toolkit and turns a
//! selection of extras into a flat `requirements.txt`.
//!
//! * [`requirement`]: parsing and rendering of single requirement lines.
//! * [`manifest`]: validation, extras resolution and rendering of whole manifests.
//!
//! ## Example
//! ```rust
//! use vtl_manifest::{DependencyManifest, render};
//!
//! let manifest = DependencyManifest::builtin().unwrap();
//! let resolved = manifest.resolve(&["deepspeed"]).unwrap();
//! assert!(render(&resolved).contains("deepspeed>=0.10.0,<=0.14.4\n"));
//! ```

mod error;
pub mod manifest;
pub mod requirement;

pub use crate::error::{ManifestError, ManifestErrorExt};
pub use crate::manifest::{ALL_EXTRAS, DependencyManifest, render};
pub use crate::requirement::{Comparator, Requirement, VersionSpec, normalize_name};

/// The toolkit manifest shipped with the binary.
pub const BUILTIN_MANIFEST: &str = include_str!("../assets/multimodal-toolkit.toml");

impl DependencyManifest {
    /// Parses [`BUILTIN_MANIFEST`].
    ///
    /// # Errors
    /// Only fails if the embedded manifest itself is broken.
    pub fn builtin() -> Result<Self, ManifestError> {
        Self::from_toml(BUILTIN_MANIFEST).context("Parsing built-in manifest")
    }
}
