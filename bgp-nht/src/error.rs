//
// Copyright (c) The bgp-nht Contributors
//
// SPDX-License-Identifier: MIT
//

use ipnetwork::Ipv4Network;
use tracing::{error, warn};

use crate::packet::error::DecodeError;

// Nexthop tracking errors.
#[derive(Debug)]
pub enum Error {
    // I/O errors
    IoError(IoError),
    // Resolver replies
    ReplyDecodeError(DecodeError),
    ReplyUnexpected(u16),
    DuplicateDesyncPrefix(Ipv4Network),
}

// Resolver connection I/O errors.
#[derive(Debug)]
pub enum IoError {
    UnixConnectError(std::io::Error),
    UnixSendError(std::io::Error),
    UnixRecvError(std::io::Error),
}

// ===== impl Error =====

impl Error {
    pub(crate) fn log(&self) {
        match self {
            Error::IoError(error) => {
                error.log();
            }
            Error::ReplyDecodeError(error) => {
                error!(error = %with_source(error), "{}", self);
            }
            Error::ReplyUnexpected(command) => {
                error!(%command, "{}", self);
            }
            Error::DuplicateDesyncPrefix(prefix) => {
                warn!(%prefix, "{}", self);
            }
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::IoError(error) => error.fmt(f),
            Error::ReplyDecodeError(..) => {
                write!(f, "failed to decode resolver reply")
            }
            Error::ReplyUnexpected(..) => {
                write!(f, "reply doesn't match the outstanding request")
            }
            Error::DuplicateDesyncPrefix(..) => {
                write!(f, "duplicate prefix in verification reply")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(error) => Some(error),
            Error::ReplyDecodeError(error) => Some(error),
            _ => None,
        }
    }
}

impl From<IoError> for Error {
    fn from(error: IoError) -> Error {
        Error::IoError(error)
    }
}

// ===== impl IoError =====

impl IoError {
    pub(crate) fn log(&self) {
        match self {
            IoError::UnixConnectError(error)
            | IoError::UnixSendError(error)
            | IoError::UnixRecvError(error) => {
                warn!(error = %with_source(error), "{}", self);
            }
        }
    }
}

impl std::fmt::Display for IoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IoError::UnixConnectError(..) => {
                write!(f, "failed to connect to the routing service")
            }
            IoError::UnixSendError(..) => {
                write!(f, "failed to send data to the routing service")
            }
            IoError::UnixRecvError(..) => {
                write!(f, "failed to read data from the routing service")
            }
        }
    }
}

impl std::error::Error for IoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IoError::UnixConnectError(error)
            | IoError::UnixSendError(error)
            | IoError::UnixRecvError(error) => Some(error),
        }
    }
}

// ===== global functions =====

fn with_source<E: std::error::Error>(error: E) -> String {
    if let Some(source) = error.source() {
        format!("{} ({})", error, with_source(source))
    } else {
        error.to_string()
    }
}
