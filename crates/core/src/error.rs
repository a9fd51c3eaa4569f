use std::borrow::Cow;

/// Errors raised by hierarchy operations.
///
/// Missing declarations and empty ancestor sets are not errors: they surface as `None`
/// or an empty aggregation.
#[lineage_derive::lineage_error]
pub enum LineageError {
    /// Adding the edge would make a unit its own ancestor. The graph is left unchanged.
    #[error("Composition cycle{}: `{unit}` cannot compose `{ancestor}`", format_context(.context))]
    Cycle { unit: Box<str>, ancestor: Box<str>, context: Option<Cow<'static, str>> },

    /// Neither the unit nor any ancestor could provide the method, even after
    /// attaching the ancestor's extensions.
    #[error("Method not found{}: `{method}` on `{unit}`", format_context(.context))]
    MethodNotFound { unit: Box<str>, method: Box<str>, context: Option<Cow<'static, str>> },

    /// The unit handle does not belong to this hierarchy or was removed.
    #[error("Unknown unit{}: {message}", format_context(.context))]
    UnknownUnit { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A unit with the same name already exists.
    #[error("Duplicate unit{}: {message}", format_context(.context))]
    DuplicateUnit { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Unknown capability{}: {message}", format_context(.context))]
    UnknownCapability { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Duplicate capability{}: {message}", format_context(.context))]
    DuplicateCapability { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Invariant violation inside the hierarchy.
    #[error("Internal lineage error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
