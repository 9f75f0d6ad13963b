// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Port preparation seam.
//!
//! Some host setups reset the controller through DTR when the port
//! opens (the Arduino auto-reset circuit), and undoing that is an
//! OS-specific affair the driver must not know about. Callers hand in
//! whatever preparation their platform needs; the driver only promises
//! to run it before touching the port.

/// Platform hook run once before the serial port is opened.
pub trait PortPreparer {
    fn prepare(&self, path: &str) -> std::io::Result<()>;
}

/// Preparer for ports that need nothing done.
pub struct NoopPreparer;

impl PortPreparer for NoopPreparer {
    fn prepare(&self, _path: &str) -> std::io::Result<()> {
        Ok(())
    }
}
