use crate::error::{ManifestError, ManifestErrorExt};
use crate::requirement::{Requirement, is_valid_name};
use fxhash::FxHashSet;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;
use vtl_domain::manifest::ManifestFile;

/// Selector that enables every extra.
pub const ALL_EXTRAS: &str = "all";

const BASE_GROUP: &str = "requirements";

/// A validated dependency manifest: base requirements plus named extras.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyManifest {
    requirements: Vec<Requirement>,
    extras: BTreeMap<String, Vec<Requirement>>,
}

impl DependencyManifest {
    /// Parses and validates the raw file representation.
    ///
    /// # Errors
    /// * [`ManifestError::InvalidRequirement`] for an unparseable entry or extra name.
    /// * [`ManifestError::Duplicate`] if a group lists a package twice.
    pub fn from_file(file: ManifestFile) -> Result<Self, ManifestError> {
        let requirements = parse_group(BASE_GROUP, &file.requirements)?;

        let mut extras = BTreeMap::new();
        for (name, entries) in &file.extras {
            if !is_valid_name(name) || name == ALL_EXTRAS {
                return Err(ManifestError::InvalidRequirement {
                    line: name.clone(),
                    reason: "extra names must be valid names other than 'all'".into(),
                });
            }
            extras.insert(name.clone(), parse_group(&format!("extra '{name}'"), entries)?);
        }

        Ok(Self { requirements, extras })
    }

    /// Parses a TOML manifest (`requirements = [..]`, `[extras]`).
    ///
    /// # Errors
    /// Returns [`ManifestError::Toml`] for malformed TOML, otherwise see [`Self::from_file`].
    pub fn from_toml(raw: &str) -> Result<Self, ManifestError> {
        let file: ManifestFile = toml::from_str(raw).context("Parsing TOML manifest")?;
        Self::from_file(file)
    }

    /// Parses a `requirements.txt` body: one requirement per line, `#` comments allowed.
    /// A `#` only starts a comment at the line start or after whitespace, as pip reads it.
    ///
    /// # Errors
    /// Rejects pip options such as `-r` or `-e`; otherwise see [`Self::from_file`].
    pub fn from_requirements_txt(raw: &str) -> Result<Self, ManifestError> {
        let mut requirements = Vec::new();
        for line in raw.lines() {
            let line = strip_comment(line).trim();
            if line.is_empty() {
                continue;
            }
            if line.starts_with('-') {
                return Err(ManifestError::InvalidRequirement {
                    line: line.to_owned(),
                    reason: "pip options are not supported in manifests".into(),
                });
            }
            requirements.push(line.to_owned());
        }
        Self::from_file(ManifestFile { requirements, extras: BTreeMap::new() })
    }

    /// Reads a manifest from disk; `.txt` files are read as `requirements.txt`, anything else as TOML.
    ///
    /// # Errors
    /// Returns [`ManifestError::Io`] if the file cannot be read, otherwise see the parsers.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).context(format!("Reading {}", path.display()))?;
        debug!(path = %path.display(), "Loaded manifest");

        if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("txt")) {
            Self::from_requirements_txt(&raw)
        } else {
            Self::from_toml(&raw)
        }
    }

    #[must_use]
    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    /// Extra names in sorted order.
    pub fn extra_names(&self) -> impl Iterator<Item = &str> {
        self.extras.keys().map(String::as_str)
    }

    #[must_use]
    pub fn extra(&self, name: &str) -> Option<&[Requirement]> {
        self.extras.get(name).map(Vec::as_slice)
    }

    /// Base requirements followed by the selected extras, first occurrence of a package wins.
    ///
    /// Extras are applied in the order given; [`ALL_EXTRAS`] expands to every extra in name order.
    ///
    /// # Errors
    /// Returns [`ManifestError::UnknownExtra`] for a name the manifest does not define.
    pub fn resolve<S: AsRef<str>>(&self, selected: &[S]) -> Result<Vec<Requirement>, ManifestError> {
        let mut groups: Vec<&[Requirement]> = vec![&self.requirements];
        for name in selected.iter().map(|s| s.as_ref().trim()) {
            if name == ALL_EXTRAS {
                groups.extend(self.extras.values().map(Vec::as_slice));
                continue;
            }
            let group = self.extra(name).ok_or_else(|| ManifestError::UnknownExtra {
                name: name.to_owned(),
                available: self.extra_names().collect::<Vec<_>>().join(", "),
            })?;
            groups.push(group);
        }

        let mut seen = FxHashSet::default();
        let resolved: Vec<Requirement> = groups
            .into_iter()
            .flatten()
            .filter(|req| seen.insert(req.key()))
            .cloned()
            .collect();

        debug!(extras = selected.len(), count = resolved.len(), "Resolved requirements");
        Ok(resolved)
    }
}

/// One requirement per line, newline terminated.
#[must_use]
pub fn render(requirements: &[Requirement]) -> String {
    requirements.iter().map(|req| format!("{req}\n")).collect()
}

/// Cuts a trailing `#` comment that starts the line or follows whitespace.
fn strip_comment(line: &str) -> &str {
    line.char_indices()
        .find(|&(at, c)| c == '#' && (at == 0 || line[..at].ends_with(char::is_whitespace)))
        .map_or(line, |(at, _)| &line[..at])
}

fn parse_group(group: &str, entries: &[String]) -> Result<Vec<Requirement>, ManifestError> {
    let mut seen = FxHashSet::default();
    let mut parsed = Vec::with_capacity(entries.len());
    for entry in entries {
        let req = Requirement::parse(entry)?;
        if !seen.insert(req.key()) {
            return Err(ManifestError::Duplicate { name: req.name, group: group.to_owned() });
        }
        parsed.push(req);
    }
    Ok(parsed)
}
