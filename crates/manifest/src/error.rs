use lineage_core::LineageError;
use std::borrow::Cow;

#[lineage_derive::lineage_error]
pub enum ManifestError {
    #[error("Manifest config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },

    #[error("Manifest rejected by hierarchy{}: {source}", format_context(.context))]
    Lineage { source: LineageError, context: Option<Cow<'static, str>> },

    /// A unit or capability name that the manifest never declares.
    #[error("Unknown reference{}: {message}", format_context(.context))]
    UnknownReference { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Invalid manifest{}: {message}", format_context(.context))]
    Invalid { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
