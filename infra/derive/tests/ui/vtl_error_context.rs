use std::borrow::Cow;
use vtl_derive::vtl_error;

#[vtl_error]
pub enum ParseError {
    #[error("Number error{}: {source}", format_context(.context))]
    Number { source: std::num::ParseIntError, context: Option<std::borrow::Cow<'static, str>> },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn parse(raw: &str) -> Result<u32, ParseError> {
    let value = raw.parse::<u32>().context("Parsing WORLD_SIZE")?;
    Ok(value)
}

fn fail() -> Result<(), ParseError> {
    Err(ParseError::from("nothing to do"))
}

fn main() {
    assert_eq!(parse("8").ok(), Some(8));

    let err = parse("eight").err().map(|e| e.to_string()).unwrap_or_default();
    assert!(err.starts_with("Number error (Parsing WORLD_SIZE): "));

    let err = fail().context("Dry run").err().map(|e| e.to_string()).unwrap_or_default();
    assert_eq!(err, "Internal error (Dry run): nothing to do");
}
