//! Error kinds raised by the engine.
//!
//! Every public fallible operation returns [`Result<T>`]. Variants carry
//! the context needed to render a user-visible message without the caller
//! having to re-derive it (human dimension names, caret position, etc).

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("dimensions are incompatible: {left} vs {right}")]
    DimensionMismatch { left: String, right: String },

    #[error("no conversion path from '{from}' to '{to}'")]
    ConversionNotFound { from: String, to: String },

    #[error(
        "adding edge {src} -> {dst} contradicts the existing reverse edge \
         (round trip deviates by {deviation})"
    )]
    CyclicInconsistency {
        src: String,
        dst: String,
        deviation: f64,
    },

    #[error(
        "transform from basis '{source_basis}' to '{target_basis}' would discard \
         nonzero component '{component}'"
    )]
    LossyProjection {
        component: String,
        source_basis: String,
        target_basis: String,
    },

    #[error("no transform path from basis '{from}' to basis '{to}'")]
    NoTransformPath { from: String, to: String },

    #[error("transform is not invertible: {reason}")]
    NonInvertibleTransform { reason: String },

    #[error("unknown unit '{name}'")]
    UnknownUnit { name: String },

    #[error("unknown dimension '{name}'")]
    UnknownDimension { name: String },

    #[error("parse error at position {position}: {message}\n  {input}\n  {caret}")]
    ParseError {
        message: String,
        position: usize,
        input: String,
        caret: String,
    },

    #[error("failed to load package '{package}': {message}")]
    PackageLoadError { package: String, message: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Builds a [`Error::ParseError`] with the caret rendered under `position`.
    pub fn parse_error(message: impl Into<String>, position: usize, input: &str) -> Self {
        let caret: String = " ".repeat(position) + "^";
        Error::ParseError {
            message: message.into(),
            position,
            input: input.to_string(),
            caret,
        }
    }

    /// The RPC façade's `error_type` discriminant (§6).
    pub fn error_type(&self) -> &'static str {
        match self {
            Error::UnknownUnit { .. } | Error::UnknownDimension { .. } => "unknown_unit",
            Error::DimensionMismatch { .. } => "dimension_mismatch",
            Error::ConversionNotFound { .. }
            | Error::NoTransformPath { .. }
            | Error::LossyProjection { .. } => "no_conversion_path",
            Error::ParseError { .. } => "parse_error",
            Error::CyclicInconsistency { .. }
            | Error::NonInvertibleTransform { .. }
            | Error::PackageLoadError { .. }
            | Error::InvalidInput(_) => "invalid_input",
        }
    }
}
