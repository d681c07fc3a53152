use serde::Deserialize;
use std::collections::BTreeMap;

/// On-disk shape of a dependency manifest.
///
/// ```toml
/// requirements = ["transformers>=4.41.2,<=4.43.4", "einops"]
///
/// [extras]
/// deepspeed = ["deepspeed>=0.10.0,<=0.14.4"]
/// ```
///
/// Entries stay raw strings here; parsing and validation live in `vtl-manifest`.
#[derive(Default, Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ManifestFile {
    pub requirements: Vec<String>,
    pub extras: BTreeMap<String, Vec<String>>,
}
