// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Local wall-clock decomposition for the mount's clock commands.
//!
//! One instant is captured per configuration run and every time-derived
//! parameter (`:SL`, `:SC`, `:SG`) is cut from it, so the UTC offset can
//! never disagree with the time and date it was captured alongside.

use chrono::{DateTime, Datelike, Offset, TimeZone, Timelike};

use crate::error::ValidationError;

/// A captured local instant, decomposed into the three wire fields the
/// mount's site-time commands accept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteTime {
    local_time: String,
    date: String,
    utc_offset: String,
}

impl SiteTime {
    /// Decompose an instant.
    ///
    /// Fails when the timezone offset is not a whole number of hours:
    /// `:SG` carries signed whole hours only, and truncating a half-hour
    /// zone (UTC+5:30 and friends) would silently mis-configure the
    /// mount's astronomical calculations.
    pub fn from_instant<Tz: TimeZone>(instant: &DateTime<Tz>) -> Result<Self, ValidationError> {
        let offset_seconds = instant.offset().fix().local_minus_utc();
        if offset_seconds % 3600 != 0 {
            return Err(ValidationError::OffsetNotWholeHours {
                offset_minutes: offset_seconds / 60,
            });
        }

        let local = instant.with_timezone(&instant.offset().fix());
        Ok(Self {
            local_time: format!(
                "{:02}:{:02}:{:02}",
                local.hour(),
                local.minute(),
                local.second()
            ),
            date: format!(
                "{:02}/{:02}/{:02}",
                local.month(),
                local.day(),
                local.year() % 100
            ),
            utc_offset: format!("{:+03}", offset_seconds / 3600),
        })
    }

    /// `HH:MM:SS` for `:SL`.
    pub fn local_time(&self) -> &str {
        &self.local_time
    }

    /// `MM/DD/YY` for `:SC`.
    pub fn date(&self) -> &str {
        &self.date
    }

    /// `sHH` for `:SG`.
    pub fn utc_offset(&self) -> &str {
        &self.utc_offset
    }
}
