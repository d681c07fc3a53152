#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros for the launcher workspace.
//!
//! The only macro exported today is [`vtl_error`], which turns a plain enum into a
//! `thiserror` error with context support. Every library crate in the workspace
//! declares its error type through it so that errors read the same everywhere:
//! `"<what failed> (<context>): <cause>"`.

mod error;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Attribute macro for defining crate-level error enums.
///
/// # Features
///
/// * **Automatic Derives**: Injects `#[derive(Debug, thiserror::Error)]` unless already present.
/// * **Context Support**: Generates a companion `<Name>Ext` trait that adds `.context(..)`
///   to `Result<T, Name>` and to `Result<T, Source>` for every wrapped source type.
/// * **Conversions**: Implements `From<Source>` for each variant holding a `source` field
///   (or a field marked `#[source]`/`#[from]`), so `?` works on upstream errors.
/// * **Internal Fallback**: Implements `From<&'static str>` and `From<String>` when an
///   `Internal { message, context }` variant exists.
/// * **Formatting Helper**: Emits a module-level `format_context` function for use in
///   `#[error(..)]` strings. Declare at most one error enum per module.
///
/// # Requirements
///
/// 1. The macro must be applied to an **enum** with named-field variants only.
/// 2. A variant wrapping a source must also carry `context: Option<Cow<'static, str>>`.
/// 3. Two variants must not wrap the same source type.
///
/// # Example
///
/// ```rust,ignore
/// use std::borrow::Cow;
///
/// #[vtl_derive::vtl_error]
/// pub enum ManifestError {
///     #[error("Failed to read manifest{}: {source}", format_context(.context))]
///     Io { source: std::io::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Internal manifest error{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn read(path: &std::path::Path) -> Result<String, ManifestError> {
///     std::fs::read_to_string(path).context("Reading manifest")
/// }
/// ```
#[proc_macro_attribute]
pub fn vtl_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    error::expand(input).into()
}
