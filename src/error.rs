use thiserror::Error;

/// Faults raised while decoding or translating a single dataset member.
///
/// These never abort a report; listeners log them against the member and
/// carry on with the next one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslationError {
    #[error("{reference}: missing leaf {leaf}")]
    MissingLeaf { reference: String, leaf: &'static str },

    #[error("{reference}: expected {expected} leaf, found {found}")]
    UnexpectedType {
        reference: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("{reference}: leaf has no value")]
    EmptyLeaf { reference: String },

    #[error("{reference}: value {value} out of range for {target}")]
    OutOfRange {
        reference: String,
        value: String,
        target: &'static str,
    },
}

/// Creates an anyhow error with the current file and line number
#[macro_export]
macro_rules! file_error {
    ($($arg:tt)*) => {
        anyhow!(
            "[{}:{}] {}",
            std::path::Path::new(file!()).file_name().map(|f| f.to_string_lossy()).unwrap_or_default(),
            line!(),
            format!($($arg)*)
        )
    };
}

/// Creates an anyhow error with the current file and line number, and includes a source error
#[macro_export]
macro_rules! file_error_with_source {
    ($source:expr, $($arg:tt)*) => {
        anyhow!(
            "[{}:{}] {}: {}",
            std::path::Path::new(file!()).file_name().map(|f| f.to_string_lossy()).unwrap_or_default(),
            line!(),
            format!($($arg)*),
            $source
        )
    };
}
