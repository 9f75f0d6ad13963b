// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Host-side port preparation.
//!
//! Opening the port toggles DTR, and on stock Arduino-style controller
//! boards that resets the MCU mid-handshake. Clearing the HUPCL termios
//! flag beforehand keeps the line state stable across the open.

use oat_mount::PortPreparer;
use tracing::{debug, warn};

/// Clears HUPCL on the port via `stty` before it is opened.
///
/// A failed `stty` is logged and tolerated: USB-serial adapters without
/// the reset circuit work either way.
pub struct HupclDisabler;

impl PortPreparer for HupclDisabler {
    #[cfg(unix)]
    fn prepare(&self, path: &str) -> std::io::Result<()> {
        match std::process::Command::new("stty")
            .args(["-F", path, "-hupcl"])
            .status()
        {
            Ok(status) if status.success() => debug!("disabled HUPCL on {path}"),
            Ok(status) => warn!("stty -hupcl on {path} exited with {status}; continuing"),
            Err(err) => warn!("could not run stty for {path}: {err}; continuing"),
        }
        Ok(())
    }

    #[cfg(not(unix))]
    fn prepare(&self, path: &str) -> std::io::Result<()> {
        debug!("no port preparation needed for {path} on this platform");
        Ok(())
    }
}
