// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Geographic coordinate validation and wire encoding.
//!
//! The mount stores site coordinates as whole degrees and minutes.
//! Latitude goes over the wire exactly as entered (`sDD*MM`); longitude
//! has two mutually incompatible wire conventions across firmware
//! revisions, selected explicitly by [`LongitudeConvention`]; the
//! protocol offers no way to auto-detect which one a device speaks.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::ValidationError;

/// Sign, whole-degree magnitude and minute magnitude of a coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Angle {
    negative: bool,
    degrees: u16,
    minutes: u8,
}

impl Angle {
    /// Signed total in arc-minutes.
    fn total_minutes(&self) -> i32 {
        let magnitude = i32::from(self.degrees) * 60 + i32::from(self.minutes);
        if self.negative {
            -magnitude
        } else {
            magnitude
        }
    }

    fn sign_char(&self) -> char {
        if self.negative {
            '-'
        } else {
            '+'
        }
    }

    /// Parse `<sign><degrees>*<minutes>` with the degree field limited to
    /// `max_degree_digits` and the minute field exactly two digits.
    fn parse(input: &str, what: &'static str, max_degree_digits: usize) -> Result<Self, ValidationError> {
        let bad_format = || ValidationError::BadFormat {
            what,
            input: input.to_string(),
        };

        let mut chars = input.chars();
        let negative = match chars.next() {
            Some('+') => false,
            Some('-') => true,
            _ => return Err(bad_format()),
        };
        let rest = chars.as_str();
        let (deg_text, min_text) = rest.split_once('*').ok_or_else(bad_format)?;
        if deg_text.is_empty()
            || deg_text.len() > max_degree_digits
            || !deg_text.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(bad_format());
        }
        if min_text.len() != 2 || !min_text.bytes().all(|b| b.is_ascii_digit()) {
            return Err(bad_format());
        }

        Ok(Self {
            negative,
            // Both fields are short all-digit strings; parse cannot fail.
            degrees: deg_text.parse().map_err(|_| bad_format())?,
            minutes: min_text.parse().map_err(|_| bad_format())?,
        })
    }

    fn from_decimal_degrees(value: f64, what: &'static str) -> Result<Self, ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::BadFormat {
                what,
                input: value.to_string(),
            });
        }
        let magnitude = value.abs();
        let mut degrees = magnitude.trunc() as u16;
        let mut minutes = ((magnitude - magnitude.trunc()) * 60.0).round() as u8;
        if minutes == 60 {
            degrees += 1;
            minutes = 0;
        }
        Ok(Self {
            negative: value < 0.0,
            degrees,
            minutes,
        })
    }

    /// Degree magnitude must not exceed `max_degrees`, the limit itself
    /// only with zero minutes, and minutes must not exceed 60.
    fn check_range(&self, what: &'static str, input: &str, max_degrees: u16) -> Result<(), ValidationError> {
        let out_of_range = |detail: String| ValidationError::OutOfRange {
            what,
            input: input.to_string(),
            detail,
        };

        if self.degrees > max_degrees {
            return Err(out_of_range(format!(
                "degree magnitude {} exceeds {}",
                self.degrees, max_degrees
            )));
        }
        if self.degrees == max_degrees && self.minutes != 0 {
            return Err(out_of_range(format!(
                "{}° permits only 0 minutes",
                max_degrees
            )));
        }
        if self.minutes > 60 {
            return Err(out_of_range(format!("minutes {} exceed 60", self.minutes)));
        }
        Ok(())
    }
}

/// A validated site latitude, range [-90°, +90°].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Latitude(Angle);

impl Latitude {
    const WHAT: &'static str = "latitude";

    pub fn from_decimal_degrees(value: f64) -> Result<Self, ValidationError> {
        let angle = Angle::from_decimal_degrees(value, Self::WHAT)?;
        angle.check_range(Self::WHAT, &value.to_string(), 90)?;
        Ok(Self(angle))
    }

    /// The `sDD*MM` text a `:St` command carries; latitude needs no
    /// conversion, so this equals the validated canonical form.
    pub fn wire(&self) -> String {
        format!(
            "{}{:02}*{:02}",
            self.0.sign_char(),
            self.0.degrees,
            self.0.minutes
        )
    }
}

impl FromStr for Latitude {
    type Err = ValidationError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let angle = Angle::parse(input, Self::WHAT, 2)?;
        angle.check_range(Self::WHAT, input, 90)?;
        Ok(Self(angle))
    }
}

impl fmt::Display for Latitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.wire())
    }
}

/// A validated site longitude, range [-180°, +180°], east positive as
/// entered by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Longitude(Angle);

impl Longitude {
    const WHAT: &'static str = "longitude";

    pub fn from_decimal_degrees(value: f64) -> Result<Self, ValidationError> {
        let angle = Angle::from_decimal_degrees(value, Self::WHAT)?;
        angle.check_range(Self::WHAT, &value.to_string(), 180)?;
        Ok(Self(angle))
    }

    /// Encode for a `:Sg` command under the given wire convention.
    pub fn encode(&self, convention: LongitudeConvention) -> WireLongitude {
        let text = match convention {
            LongitudeConvention::LegacyUnsigned => {
                // Wire value counts degrees west from the meridian
                // opposite Greenwich: 10800' minus the signed total,
                // which is exact in integer arithmetic (0..=21600).
                let wire_total = 10800 - self.0.total_minutes();
                format!("{:03}*{:02}", wire_total / 60, wire_total % 60)
            }
            LongitudeConvention::Signed => format!(
                "{}{:03}*{:02}",
                self.0.sign_char(),
                self.0.degrees,
                self.0.minutes
            ),
        };
        WireLongitude(text)
    }
}

impl FromStr for Longitude {
    type Err = ValidationError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let angle = Angle::parse(input, Self::WHAT, 3)?;
        angle.check_range(Self::WHAT, input, 180)?;
        Ok(Self(angle))
    }
}

/// Longitude wire convention of the target firmware.
///
/// A config choice, never inferred: the two encodings are mutually
/// incompatible and the device cannot report which one it expects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LongitudeConvention {
    /// Pre-V1.9.x firmware: unsigned `DDD*MM`, 0–360° going west.
    #[serde(rename = "legacy")]
    LegacyUnsigned,
    /// V1.9.x and later: the signed `sDDD*MM` value verbatim.
    #[default]
    Signed,
}

/// A longitude already encoded for the wire; what `:Sg` sends and what a
/// `:Gg` read-back is compared against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireLongitude(String);

impl WireLongitude {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WireLongitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latitude_accepts_valid_forms() {
        assert_eq!("+51*28".parse::<Latitude>().unwrap().wire(), "+51*28");
        assert_eq!("-33*52".parse::<Latitude>().unwrap().wire(), "-33*52");
        assert_eq!("+90*00".parse::<Latitude>().unwrap().wire(), "+90*00");
        assert_eq!("-00*00".parse::<Latitude>().unwrap().wire(), "-00*00");
    }

    #[test]
    fn test_latitude_rejects_bad_grammar() {
        for input in ["51*28", "+5*28", "+511*28", "+51:28", "+51*2", "+51*281", "", "+51*2a"] {
            assert!(
                matches!(
                    input.parse::<Latitude>(),
                    Err(ValidationError::BadFormat { .. })
                ),
                "{input:?} should be a format error"
            );
        }
    }

    #[test]
    fn test_latitude_rejects_out_of_range() {
        assert!(matches!(
            "+91*00".parse::<Latitude>(),
            Err(ValidationError::OutOfRange { .. })
        ));
        // The pole permits only zero minutes.
        assert!(matches!(
            "-90*01".parse::<Latitude>(),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert!(matches!(
            "+51*61".parse::<Latitude>(),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_latitude_from_decimal_degrees() {
        assert_eq!(Latitude::from_decimal_degrees(51.4667).unwrap().wire(), "+51*28");
        assert_eq!(Latitude::from_decimal_degrees(-33.87).unwrap().wire(), "-33*52");
        // Minute rounding that carries into the degree field.
        assert_eq!(Latitude::from_decimal_degrees(50.9999).unwrap().wire(), "+51*00");
        assert!(Latitude::from_decimal_degrees(90.5).is_err());
    }

    #[test]
    fn test_longitude_legacy_encoding() {
        let enc = |s: &str| {
            s.parse::<Longitude>()
                .unwrap()
                .encode(LongitudeConvention::LegacyUnsigned)
                .as_str()
                .to_string()
        };
        // Documented reference points for the 0-360 west-going domain.
        assert_eq!(enc("+00*00"), "180*00");
        assert_eq!(enc("-90*00"), "270*00");
        assert_eq!(enc("+90*00"), "090*00");
        assert_eq!(enc("+179*59"), "000*01");
        assert_eq!(enc("+180*00"), "000*00");
        assert_eq!(enc("-00*30"), "180*30");
        assert_eq!(enc("+00*30"), "179*30");
    }

    #[test]
    fn test_longitude_signed_encoding_is_identity() {
        let wire = "+051*28"
            .parse::<Longitude>()
            .unwrap()
            .encode(LongitudeConvention::Signed);
        assert_eq!(wire.as_str(), "+051*28");

        // Two-digit degree input canonicalizes to the padded form.
        let wire = "-73*58"
            .parse::<Longitude>()
            .unwrap()
            .encode(LongitudeConvention::Signed);
        assert_eq!(wire.as_str(), "-073*58");
    }

    #[test]
    fn test_longitude_range() {
        assert!("+180*00".parse::<Longitude>().is_ok());
        assert!(matches!(
            "-180*01".parse::<Longitude>(),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert!(matches!(
            "+181*00".parse::<Longitude>(),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_longitude_from_decimal_degrees() {
        assert_eq!(
            Longitude::from_decimal_degrees(-0.5)
                .unwrap()
                .encode(LongitudeConvention::LegacyUnsigned)
                .as_str(),
            "180*30"
        );
        assert_eq!(
            Longitude::from_decimal_degrees(51.4667)
                .unwrap()
                .encode(LongitudeConvention::Signed)
                .as_str(),
            "+051*28"
        );
    }
}
