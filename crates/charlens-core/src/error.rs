//! Error types shared by every conversion operation.
//!
//! Operation-level failures are returned as [`Error`]. Failures that belong to a
//! single (character, encoding) pair inside a batch are not errors at all: they
//! are reported inline as [`ErrorReason`] values so the batch keeps going.

use serde::{Deserialize, Serialize};

use crate::character::DataKind;

/// Wire form of a failure cause, embedded in `success: false` results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorReason {
    UnknownEncoding,
    EncodingUnrepresentable,
    DecodingError,
    EmptyInput,
    InvalidDataKind,
}

impl ErrorReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnknownEncoding => "unknown_encoding",
            Self::EncodingUnrepresentable => "encoding_unrepresentable",
            Self::DecodingError => "decoding_error",
            Self::EmptyInput => "empty_input",
            Self::InvalidDataKind => "invalid_data_kind",
        }
    }
}

impl std::fmt::Display for ErrorReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("unknown encoding: {0}")]
    UnknownEncoding(String),

    #[error("character {ch:?} cannot be represented in {encoding}")]
    EncodingUnrepresentable { ch: char, encoding: &'static str },

    #[error("malformed {encoding} byte sequence at offset {offset}")]
    DecodingError { encoding: &'static str, offset: usize },

    #[error("input text is empty")]
    EmptyInput,

    #[error("payload is not valid {kind}: {detail}")]
    InvalidDataKind { kind: DataKind, detail: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Maps the error onto its inline wire reason.
    ///
    /// Configuration errors never surface per item, they are reported as the
    /// closest request-level reason.
    pub fn reason(&self) -> ErrorReason {
        match self {
            Self::UnknownEncoding(_) => ErrorReason::UnknownEncoding,
            Self::EncodingUnrepresentable { .. } => ErrorReason::EncodingUnrepresentable,
            Self::DecodingError { .. } => ErrorReason::DecodingError,
            Self::EmptyInput => ErrorReason::EmptyInput,
            Self::InvalidDataKind { .. } | Self::InvalidConfig(_) => ErrorReason::InvalidDataKind,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
