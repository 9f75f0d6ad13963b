// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

pub mod command;
pub mod coords;
pub mod error;
pub mod homing;
pub mod response;
pub mod site_time;

pub use command::Command;
pub use coords::{Latitude, Longitude, LongitudeConvention, WireLongitude};
pub use error::{MountError, MountResult, ProtocolError, ValidationError};
pub use homing::{HomingDirection, HomingEvent, HomingMachine, HomingState};
pub use site_time::SiteTime;
