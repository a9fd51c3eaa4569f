use lineage_derive::lineage_error;
use std::borrow::Cow;

#[lineage_error]
pub enum ParseError {
    #[error("IO error{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Unknown unit{}: {name}", format_context(.context))]
    UnknownUnit { name: String, context: Option<Cow<'static, str>> },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn read() -> Result<(), ParseError> {
    Err(std::io::Error::other("disk")).context("Reading manifest")
}

fn main() {
    let err = read().unwrap_err();
    assert_eq!(err.to_string(), "IO error (Reading manifest): disk");

    let err: ParseError = "boom".into();
    assert!(matches!(err, ParseError::Internal { .. }));

    let err = Err::<(), _>(ParseError::UnknownUnit { name: "A".to_owned(), context: None })
        .context("Resolving edges")
        .unwrap_err();
    assert_eq!(err.to_string(), "Unknown unit (Resolving edges): A");
}
