//! A single package requirement, e.g. `transformers>=4.41.2,<=4.43.4` or
//! `aqlm[gpu]>=1.1.0; platform_system == "Linux"`.
//!
//! This covers the subset of PEP 508 used by packaging manifests: a name,
//! optional extras, comma-separated version specifiers and an environment
//! marker kept verbatim. Direct URL references are rejected.

use crate::error::ManifestError;
use std::fmt;
use std::str::FromStr;

/// A version comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparator {
    Arbitrary,
    Compatible,
    Equal,
    NotEqual,
    GreaterEq,
    LessEq,
    Greater,
    Less,
}

impl Comparator {
    /// Longest tokens first so `===` is not read as `==`.
    const TOKENS: [(&'static str, Self); 8] = [
        ("===", Self::Arbitrary),
        ("~=", Self::Compatible),
        ("==", Self::Equal),
        ("!=", Self::NotEqual),
        (">=", Self::GreaterEq),
        ("<=", Self::LessEq),
        (">", Self::Greater),
        ("<", Self::Less),
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Arbitrary => "===",
            Self::Compatible => "~=",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::GreaterEq => ">=",
            Self::LessEq => "<=",
            Self::Greater => ">",
            Self::Less => "<",
        }
    }

    fn split_prefix(raw: &str) -> Option<(Self, &str)> {
        Self::TOKENS
            .iter()
            .find_map(|(token, op)| raw.strip_prefix(token).map(|rest| (*op, rest)))
    }
}

/// One `<op><version>` clause.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionSpec {
    pub op: Comparator,
    pub version: String,
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.op.as_str(), self.version)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Requirement {
    pub name: String,
    pub extras: Vec<String>,
    pub specs: Vec<VersionSpec>,
    pub marker: Option<String>,
}

impl Requirement {
    /// Parses one requirement line.
    ///
    /// # Errors
    /// Returns [`ManifestError::InvalidRequirement`] describing the first problem found.
    pub fn parse(line: &str) -> Result<Self, ManifestError> {
        let invalid = |reason: &'static str| ManifestError::InvalidRequirement {
            line: line.trim().to_owned(),
            reason: reason.into(),
        };

        let (body, marker) = match line.split_once(';') {
            Some((body, marker)) => {
                let marker = marker.trim();
                if marker.is_empty() {
                    return Err(invalid("empty environment marker"));
                }
                (body.trim(), Some(marker.to_owned()))
            },
            None => (line.trim(), None),
        };

        let name_len = body
            .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
            .unwrap_or(body.len());
        let name = &body[..name_len];
        if !is_valid_name(name) {
            return Err(invalid("package names must start and end with a letter or digit"));
        }

        let mut rest = body[name_len..].trim_start();
        if rest.starts_with('@') {
            return Err(invalid("direct URL references are not supported"));
        }

        let mut extras = Vec::new();
        if let Some(after) = rest.strip_prefix('[') {
            let Some((inside, tail)) = after.split_once(']') else {
                return Err(invalid("unterminated extras bracket"));
            };
            for extra in inside.split(',').map(str::trim).filter(|e| !e.is_empty()) {
                if !is_valid_name(extra) {
                    return Err(invalid("extras must be valid names"));
                }
                extras.push(extra.to_owned());
            }
            rest = tail.trim_start();
        }

        let mut specs = Vec::new();
        if !rest.is_empty() {
            for clause in rest.split(',').map(str::trim) {
                let Some((op, version)) = Comparator::split_prefix(clause) else {
                    return Err(invalid("expected a version operator (==, !=, >=, <=, >, <, ~=, ===)"));
                };
                let version = version.trim();
                if version.is_empty() || !version.chars().all(is_version_char) {
                    return Err(invalid("malformed version"));
                }
                specs.push(VersionSpec { op, version: version.to_owned() });
            }
        }

        Ok(Self { name: name.to_owned(), extras, specs, marker })
    }

    /// The name used for comparisons (see [`normalize_name`]).
    #[must_use]
    pub fn key(&self) -> String {
        normalize_name(&self.name)
    }

    /// Whether the requirement names exactly one version.
    #[must_use]
    pub fn is_pinned(&self) -> bool {
        matches!(self.specs.as_slice(), [VersionSpec { op: Comparator::Equal | Comparator::Arbitrary, version }] if !version.contains('*'))
    }
}

impl FromStr for Requirement {
    type Err = ManifestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.extras.is_empty() {
            write!(f, "[{}]", self.extras.join(","))?;
        }
        for (i, spec) in self.specs.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{spec}")?;
        }
        if let Some(marker) = &self.marker {
            write!(f, "; {marker}")?;
        }
        Ok(())
    }
}

/// Lower-cases and collapses runs of `-`, `_` and `.` into one `-`.
#[must_use]
pub fn normalize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_separator = false;
    for c in name.chars() {
        if matches!(c, '-' | '_' | '.') {
            if !in_separator {
                out.push('-');
            }
            in_separator = true;
        } else {
            out.push(c.to_ascii_lowercase());
            in_separator = false;
        }
    }
    out
}

pub(crate) fn is_valid_name(name: &str) -> bool {
    let bytes = name.as_bytes();
    match (bytes.first(), bytes.last()) {
        (Some(first), Some(last)) => {
            first.is_ascii_alphanumeric()
                && last.is_ascii_alphanumeric()
                && bytes.iter().all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'))
        },
        _ => false,
    }
}

const fn is_version_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '*' | '+' | '!' | '-' | '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_name() {
        let req = Requirement::parse("einops").unwrap();
        assert_eq!(req.name, "einops");
        assert!(req.specs.is_empty());
        assert!(req.marker.is_none());
    }

    #[test]
    fn range_specifiers() {
        let req = Requirement::parse("transformers>=4.41.2,<=4.43.4").unwrap();
        assert_eq!(
            req.specs,
            vec![
                VersionSpec { op: Comparator::GreaterEq, version: "4.41.2".into() },
                VersionSpec { op: Comparator::LessEq, version: "4.43.4".into() },
            ]
        );
        assert_eq!(req.to_string(), "transformers>=4.41.2,<=4.43.4");
    }

    #[test]
    fn extras_and_marker() {
        let req = Requirement::parse(" aqlm [gpu] >= 1.1.0 ; platform_system == \"Linux\" ").unwrap();
        assert_eq!(req.extras, vec!["gpu".to_owned()]);
        assert_eq!(req.marker.as_deref(), Some("platform_system == \"Linux\""));
        assert_eq!(req.to_string(), "aqlm[gpu]>=1.1.0; platform_system == \"Linux\"");
    }

    #[test]
    fn triple_equals_is_not_double_equals() {
        let req = Requirement::parse("torch-npu===2.1.0.post3").unwrap();
        assert_eq!(req.specs[0].op, Comparator::Arbitrary);
        assert_eq!(req.specs[0].version, "2.1.0.post3");
        assert!(req.is_pinned());
    }

    #[test]
    fn wildcard_pins_are_not_pins() {
        assert!(Requirement::parse("torch==2.1.0").unwrap().is_pinned());
        assert!(!Requirement::parse("torch==2.*").unwrap().is_pinned());
        assert!(!Requirement::parse("numpy<2.0.0").unwrap().is_pinned());
    }

    #[test]
    fn rejects_malformed_lines() {
        for line in ["", "-torch", "torch>=", "torch 1.0", "torch[gpu", "torch @ https://x", "torch;"] {
            assert!(
                matches!(Requirement::parse(line), Err(ManifestError::InvalidRequirement { .. })),
                "expected '{line}' to be rejected"
            );
        }
    }

    #[test]
    fn names_normalize() {
        assert_eq!(normalize_name("Rouge_Chinese"), "rouge-chinese");
        assert_eq!(normalize_name("transformers_stream.generator"), "transformers-stream-generator");
        assert_eq!(normalize_name("a-_.b"), "a-b");
    }
}
