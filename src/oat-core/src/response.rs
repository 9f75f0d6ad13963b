// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Reply decoding.
//!
//! The mount answers in two shapes and nothing in the reply itself says
//! which one to expect; the caller picks the decoder from protocol
//! knowledge of the command it just sent.

use crate::command::Command;
use crate::error::ProtocolError;

/// Decode a boolean acknowledgment.
///
/// Total over every possible line, including the empty one: anything that
/// does not start with `'1'` (a timed-out read in particular) is `false`.
pub fn decode_status(line: &str) -> bool {
    line.as_bytes().first() == Some(&b'1')
}

/// Decode a `'#'`-terminated string payload.
///
/// Returns the line with the terminator stripped, or a protocol error
/// naming the command when the line is empty or unterminated.
pub fn decode_string(command: &Command, line: &str) -> Result<String, ProtocolError> {
    match line.strip_suffix('#') {
        Some(payload) => Ok(payload.to_string()),
        None => Err(ProtocolError::MalformedTerminator {
            command: command.as_str().to_string(),
            line: line.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_true_only_on_leading_one() {
        assert!(decode_status("1"));
        assert!(decode_status("1garbage"));
        assert!(!decode_status("0"));
        assert!(!decode_status("01"));
        assert!(!decode_status(""));
        assert!(!decode_status("#"));
    }

    #[test]
    fn test_string_strips_terminator() {
        let cmd = Command::get_product_name();
        assert_eq!(
            decode_string(&cmd, "OpenAstroTracker#").unwrap(),
            "OpenAstroTracker"
        );
        // A bare terminator is a well-formed empty payload.
        assert_eq!(decode_string(&cmd, "#").unwrap(), "");
    }

    #[test]
    fn test_string_rejects_missing_terminator() {
        let cmd = Command::get_firmware_version();
        assert!(matches!(
            decode_string(&cmd, "V1.13.10"),
            Err(ProtocolError::MalformedTerminator { .. })
        ));
        assert!(matches!(
            decode_string(&cmd, ""),
            Err(ProtocolError::MalformedTerminator { .. })
        ));
    }
}
