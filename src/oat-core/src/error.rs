// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

use thiserror::Error;

/// A caller-supplied value failed a format or range check.
///
/// Raised before any bytes are written to the mount.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("'{input}' does not match the expected {what} format")]
    BadFormat { what: &'static str, input: String },

    #[error("{what} '{input}' is out of range: {detail}")]
    OutOfRange {
        what: &'static str,
        input: String,
        detail: String,
    },

    /// The local timezone offset has a minute component the `:SG` command
    /// cannot express. Failing beats silently truncating a site parameter.
    #[error("UTC offset {offset_minutes} minutes is not a whole number of hours")]
    OffsetNotWholeHours { offset_minutes: i32 },
}

/// A reply line that cannot be interpreted in the expected shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("reply to {command} is not '#'-terminated: {line:?}")]
    MalformedTerminator { command: String, line: String },
}

/// Fatal failure of a configuration run.
///
/// None of these are retried: an unverified, half-configured mount is
/// worse than stopping, so every protocol-level failure aborts the run.
#[derive(Debug, Error)]
pub enum MountError {
    #[error("mount identity check failed: {0}")]
    Connection(String),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("mount rejected {command}")]
    DeviceRejected { command: String },

    #[error("{parameter} read-back mismatch: sent {expected:?}, device reports {actual:?}")]
    Verification {
        parameter: &'static str,
        expected: String,
        actual: String,
    },

    #[error("mount still homing after {polls} status polls")]
    HomingTimeout { polls: u32 },

    #[error("serial I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type MountResult<T> = Result<T, MountError>;
