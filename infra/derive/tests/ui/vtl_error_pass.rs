use std::borrow::Cow;
use vtl_derive::vtl_error;

#[vtl_error]
pub enum DemoError {
    #[error("IO error{}: {source}", format_context(.context))]
    Io {
        #[source]
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },

    #[error("Bad value {value}")]
    BadValue { value: u32 },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn main() {
    let from_io: DemoError = std::io::Error::other("boom").into();
    assert!(matches!(from_io, DemoError::Io { context: None, .. }));

    let from_str: DemoError = "broken".into();
    assert_eq!(from_str.to_string(), "Internal error: broken");

    let bad = DemoError::BadValue { value: 3 };
    assert_eq!(bad.to_string(), "Bad value 3");
}
