use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VttError {
    /// Text that does not match the grammar of a timestamp, adjustment,
    /// snip or cue timing line.
    #[error("malformed {what} '{text}', expected {expected}")]
    Format {
        what: &'static str,
        text: String,
        expected: &'static str,
    },
    /// A well-formed argument that cannot be used as given.
    #[error("invalid argument '{arg}': {reason}")]
    Argument { arg: String, reason: String },
}

impl VttError {
    pub fn format(what: &'static str, text: &str, expected: &'static str) -> Self {
        VttError::Format {
            what,
            text: text.to_string(),
            expected,
        }
    }

    pub fn argument<S: Into<String>>(arg: &str, reason: S) -> Self {
        VttError::Argument {
            arg: arg.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, VttError>;
