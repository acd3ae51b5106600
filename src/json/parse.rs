//! Purpose: Provide the runtime JSON entrypoint and parse-failure categorization.
//! Exports: `from_str`, `from_slice`, `ParseFailureCategory`, `categorize_error`, `hint_for_error`.
//! Role: Parser boundary; everything decoded from the wire is first validated here.
//! Invariants: Only syntax is checked here; shape checks belong to the decoder.
//! Invariants: Depends on serde/serde_json only so tests can include it by path.
//! Notes: Error mapping into the crate error is done by callsites so context stays explicit.

use serde_json::error::Category;
use serde_json::value::RawValue;

pub(crate) fn from_str(input: &str) -> Result<&RawValue, serde_json::Error> {
    serde_json::from_str(input)
}

pub(crate) fn from_slice(input: &[u8]) -> Result<&RawValue, serde_json::Error> {
    serde_json::from_slice(input)
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum ParseFailureCategory {
    Syntax,
    Eof,
    Data,
    Io,
}

impl ParseFailureCategory {
    pub(crate) fn label(self) -> &'static str {
        match self {
            ParseFailureCategory::Syntax => "syntax",
            ParseFailureCategory::Eof => "eof",
            ParseFailureCategory::Data => "data",
            ParseFailureCategory::Io => "io",
        }
    }
}

pub(crate) fn categorize_error(err: &serde_json::Error) -> ParseFailureCategory {
    match err.classify() {
        Category::Syntax => ParseFailureCategory::Syntax,
        Category::Eof => ParseFailureCategory::Eof,
        Category::Data => ParseFailureCategory::Data,
        Category::Io => ParseFailureCategory::Io,
    }
}

pub(crate) fn hint_for_error(err: &serde_json::Error, context: &str) -> String {
    let category = categorize_error(err);
    format!(
        "parse category: {}; line {}, column {}; context: {context}",
        category.label(),
        err.line(),
        err.column()
    )
}
