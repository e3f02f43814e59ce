//! Interchange codecs for the comment document.
//!
//! # Responsibility
//! - Encode/decode the durable JSON document schema.
//! - Encode/decode the flattened CSV view.
//!
//! # Invariants
//! - Decoding is side-effect free: a codec never touches live store state,
//!   so a mid-parse failure cannot corrupt anything (transactional import).
//! - Decoded documents are normalized and fully validated before they are
//!   returned.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod csv;
pub mod json;

pub type CodecResult<T> = Result<T, CodecError>;

/// Codec-layer error for malformed interchange payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Payload does not match the expected schema.
    InvalidFormat(String),
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidFormat(message) => write!(f, "invalid interchange payload: {message}"),
        }
    }
}

impl Error for CodecError {}
