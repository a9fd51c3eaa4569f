#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros used across the lineage workspace.
//!
//! Only one macro lives here for now: [`macro@lineage_error`], which turns a plain enum into
//! the error type every lineage crate exposes.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Attribute macro for crate-level error enums.
///
/// # What it generates
///
/// * `#[derive(Debug, thiserror::Error)]` unless the enum already derives them.
/// * A companion `<Name>Ext<T>` trait with `.context(..)`, implemented for
///   `Result<T, Name>` and for `Result<T, Source>` of every variant carrying a source.
/// * `From<Source>` for each variant with a `source` field (or one marked `#[source]`/`#[from]`),
///   so `?` works on upstream errors.
/// * `From<&'static str>` and `From<String>` when the enum has an `Internal` variant.
/// * A private `format_context` helper used in `#[error(..)]` strings.
///
/// # Requirements
///
/// 1. Applies to enums only.
/// 2. Every variant uses named fields. Tuple and unit variants are rejected.
/// 3. A `context` field, when present, must be `Option<Cow<'static, str>>`.
/// 4. Variants with a source must also carry `context`.
///
/// # Example
///
/// ```rust,ignore
/// use lineage_derive::lineage_error;
/// use std::borrow::Cow;
///
/// #[lineage_error]
/// pub enum ManifestError {
///     #[error("Config error{}: {source}", format_context(.context))]
///     Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
///
///     #[error("Internal fault{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn load() -> Result<Settings, ManifestError> {
///     builder.build().context("Reading manifest")?.try_deserialize().context("Decoding manifest")
/// }
/// ```
#[proc_macro_attribute]
pub fn lineage_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand(input).into()
}
