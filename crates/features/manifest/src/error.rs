use std::borrow::Cow;

/// Errors raised while reading or resolving a dependency manifest.
#[vtl_derive::vtl_error]
pub enum ManifestError {
    #[error("Invalid requirement '{line}': {reason}")]
    InvalidRequirement { line: String, reason: Cow<'static, str> },

    /// The same package is listed twice within one group.
    #[error("Duplicate requirement '{name}' in {group}")]
    Duplicate { name: String, group: String },

    #[error("Unknown extra '{name}' (available: {available})")]
    UnknownExtra { name: String, available: String },

    #[error("Failed to read manifest{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Malformed manifest{}: {source}", format_context(.context))]
    Toml { source: toml::de::Error, context: Option<Cow<'static, str>> },
}
