use std::error::Error as StdError;
use std::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    Internal,
    Usage,
    Io,
    Parse,
    MissingField,
    TypeMismatch,
    InvalidRequest,
    Authentication,
    Permission,
    NotFound,
    Conflict,
    RateLimited,
    Server,
}

impl ErrorKind {
    pub fn is_decode(self) -> bool {
        matches!(
            self,
            ErrorKind::Parse | ErrorKind::MissingField | ErrorKind::TypeMismatch
        )
    }
}

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    message: Option<String>,
    hint: Option<String>,
    field: Option<String>,
    expected: Option<&'static str>,
    actual: Option<&'static str>,
    status: Option<u16>,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            hint: None,
            field: None,
            expected: None,
            actual: None,
            status: None,
            source: None,
        }
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::new(ErrorKind::MissingField)
            .with_message("required field is missing")
            .with_field(field)
    }

    pub fn type_mismatch(expected: &'static str, actual: &'static str) -> Self {
        Self::new(ErrorKind::TypeMismatch)
            .with_message(format!("expected {expected}, found {actual}"))
            .with_expected(expected)
            .with_actual(actual)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    /// Dotted path of the offending field, e.g. `source.ach_transfer_intention.amount`.
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    pub fn expected(&self) -> Option<&'static str> {
        self.expected
    }

    pub fn actual(&self) -> Option<&'static str> {
        self.actual
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn with_expected(mut self, expected: &'static str) -> Self {
        self.expected = Some(expected);
        self
    }

    pub fn with_actual(mut self, actual: &'static str) -> Self {
        self.actual = Some(actual);
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Prefixes the field path with the enclosing object key.
    pub(crate) fn within_field(mut self, key: &str) -> Self {
        self.field = Some(match self.field.take() {
            None => key.to_string(),
            Some(inner) if inner.starts_with('[') => format!("{key}{inner}"),
            Some(inner) => format!("{key}.{inner}"),
        });
        self
    }

    /// Prefixes the field path with an array position.
    pub(crate) fn within_index(mut self, index: usize) -> Self {
        self.field = Some(match self.field.take() {
            None => format!("[{index}]"),
            Some(inner) if inner.starts_with('[') => format!("[{index}]{inner}"),
            Some(inner) => format!("[{index}].{inner}"),
        });
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.kind)?;
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        if let Some(field) = &self.field {
            write!(f, " (field: {field})")?;
        }
        if let Some(status) = self.status {
            write!(f, " (status: {status})")?;
        }
        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn StdError + 'static))
    }
}

pub fn to_exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::Internal => 1,
        ErrorKind::Usage => 2,
        ErrorKind::Io => 3,
        ErrorKind::Parse => 4,
        ErrorKind::MissingField => 5,
        ErrorKind::TypeMismatch => 6,
        ErrorKind::InvalidRequest => 7,
        ErrorKind::Authentication => 8,
        ErrorKind::Permission => 9,
        ErrorKind::NotFound => 10,
        ErrorKind::Conflict => 11,
        ErrorKind::RateLimited => 12,
        ErrorKind::Server => 13,
    }
}
