use thiserror::Error;

/// Core error type shared across entigen crates.
#[derive(Debug, Error)]
pub enum Error {
    /// The schema document is not valid YAML.
    #[error("parse error: {0}")]
    Parse(String),
    /// A schema member does not match any recognized shorthand.
    #[error("unsupported shape for {entity}.{member}: {reason}")]
    Shape {
        entity: String,
        member: String,
        reason: String,
    },
    /// The schema violates internal invariants.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),
}

impl Error {
    pub(crate) fn shape(
        entity: impl Into<String>,
        member: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Error::Shape {
            entity: entity.into(),
            member: member.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(value: serde_yaml::Error) -> Self {
        Error::Parse(value.to_string())
    }
}

/// Convenience alias for results returned by entigen crates.
pub type Result<T> = std::result::Result<T, Error>;
