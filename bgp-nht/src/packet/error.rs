//
// Copyright (c) The bgp-nht Contributors
//
// SPDX-License-Identifier: MIT
//

use bytes::TryGetError;
use serde::{Deserialize, Serialize};

// Frame decoding errors.
#[derive(Clone, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub enum DecodeError {
    ReadOutOfBounds,
    IncompleteFrame(u16),
    VersionMismatch { marker: u8, version: u8 },
    UnknownCommand(u16),
    InvalidPrefixLength(u8),
}

pub type DecodeResult<T> = Result<T, DecodeError>;

// ===== impl DecodeError =====

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeError::ReadOutOfBounds => {
                write!(f, "attempt to read out of bounds")
            }
            DecodeError::IncompleteFrame(length) => {
                write!(f, "frame shorter than its length field ({length})")
            }
            DecodeError::VersionMismatch { marker, version } => {
                write!(f, "marker/version mismatch ({marker}/{version})")
            }
            DecodeError::UnknownCommand(command) => {
                write!(f, "unknown command ({command})")
            }
            DecodeError::InvalidPrefixLength(prefixlen) => {
                write!(f, "invalid prefix length ({prefixlen})")
            }
        }
    }
}

impl std::error::Error for DecodeError {}

impl From<TryGetError> for DecodeError {
    fn from(_error: TryGetError) -> DecodeError {
        DecodeError::ReadOutOfBounds
    }
}
