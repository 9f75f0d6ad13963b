// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Meade/LX200-style command framing.
//!
//! Every command is an immutable ASCII string `:<mnemonic><args>#`,
//! built once per exchange and written to the wire verbatim.

use std::fmt;

use crate::coords::WireLongitude;
use crate::homing::HomingDirection;
use crate::site_time::SiteTime;
use crate::Latitude;

/// One framed outbound command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command(String);

impl Command {
    fn framed(body: impl AsRef<str>) -> Self {
        Self(format!(":{}#", body.as_ref()))
    }

    /// Query the product name, e.g. `OpenAstroTracker`.
    pub fn get_product_name() -> Self {
        Self::framed("GVP")
    }

    /// Query the firmware version string.
    pub fn get_firmware_version() -> Self {
        Self::framed("GVN")
    }

    /// Switch the controller into serial-control mode. No reply.
    pub fn enter_serial_control() -> Self {
        Self::framed("I")
    }

    pub fn set_latitude(latitude: &Latitude) -> Self {
        Self::framed(format!("St{}", latitude.wire()))
    }

    pub fn get_latitude() -> Self {
        Self::framed("Gt")
    }

    pub fn set_longitude(longitude: &WireLongitude) -> Self {
        Self::framed(format!("Sg{}", longitude.as_str()))
    }

    pub fn get_longitude() -> Self {
        Self::framed("Gg")
    }

    pub fn set_local_time(time: &SiteTime) -> Self {
        Self::framed(format!("SL{}", time.local_time()))
    }

    pub fn get_local_time() -> Self {
        Self::framed("GL")
    }

    pub fn set_date(time: &SiteTime) -> Self {
        Self::framed(format!("SC{}", time.date()))
    }

    pub fn get_date() -> Self {
        Self::framed("GC")
    }

    pub fn set_utc_offset(time: &SiteTime) -> Self {
        Self::framed(format!("SG{}", time.utc_offset()))
    }

    pub fn get_utc_offset() -> Self {
        Self::framed("GG")
    }

    /// Start the RA auto-home search in the given direction.
    pub fn start_ra_auto_home(direction: HomingDirection) -> Self {
        Self::framed(format!("MHR{}", direction.wire_char()))
    }

    /// Query the mount status tuple (comma-delimited, field 0 is the
    /// current state label, e.g. `Homing` or `Tracking`).
    pub fn get_mount_status() -> Self {
        Self::framed("GX")
    }

    /// Commit the current orientation as the home position.
    pub fn set_home_point() -> Self {
        Self::framed("SHP")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_framing() {
        assert_eq!(Command::get_product_name().as_str(), ":GVP#");
        assert_eq!(Command::get_mount_status().as_str(), ":GX#");
        assert_eq!(Command::set_home_point().as_str(), ":SHP#");
        assert_eq!(Command::enter_serial_control().as_str(), ":I#");
    }

    #[test]
    fn test_homing_direction_args() {
        assert_eq!(
            Command::start_ra_auto_home(HomingDirection::Right).as_str(),
            ":MHRR#"
        );
        assert_eq!(
            Command::start_ra_auto_home(HomingDirection::Left).as_str(),
            ":MHRL#"
        );
    }
}
