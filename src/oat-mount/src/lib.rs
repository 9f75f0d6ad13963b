// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Serial driver for OpenAstroTracker-compatible equatorial mounts.
//!
//! Owns the command channel for a whole configuration run and exposes
//! the site-parameter setters (each a set-then-verify round-trip) and
//! the RA auto-home procedure. Every protocol-level failure is fatal:
//! a half-configured, unverified mount is worse than stopping.

pub mod channel;
pub mod mock;
pub mod prepare;

use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use oat_core::response::{decode_status, decode_string};
use oat_core::{
    Command, HomingDirection, HomingEvent, HomingMachine, Latitude, Longitude,
    LongitudeConvention, MountError, MountResult, SiteTime,
};

pub use channel::{Channel, SerialChannel};
pub use prepare::{NoopPreparer, PortPreparer};

/// Identity strings reported by the handshake queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountIdentity {
    pub product: String,
    pub firmware: String,
}

/// How homing completion is confirmed.
///
/// Two strategies exist because the firmware grew a pollable status
/// field late; older setups depended on the operator watching the
/// mount.
pub enum HomingMode {
    /// Suspend until the operator signals that homing is physically
    /// complete. The signal source is the caller's business.
    Manual(oneshot::Receiver<()>),
    /// Poll `:GX#` until the state label leaves `Homing`.
    Polled {
        interval: Duration,
        /// Poll budget before giving up with a timeout error; `None`
        /// waits for as long as the mount keeps reporting `Homing`.
        max_polls: Option<u32>,
    },
}

/// Result of a completed auto-home request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomingOutcome {
    /// Home position found and committed.
    Homed,
    /// The firmware refused `:MHR`; it has no RA home sensor support.
    NotSupported,
}

/// Lower bound on the status poll interval; hammering the controller
/// faster starves its stepper interrupt handling.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// The mount protocol driver.
pub struct Mount<C: Channel> {
    channel: C,
    convention: LongitudeConvention,
}

impl<C: Channel> Mount<C> {
    pub fn new(channel: C, convention: LongitudeConvention) -> Self {
        Self {
            channel,
            convention,
        }
    }

    /// Handshake with the device: product name and firmware version must
    /// both answer with non-empty payloads, then `:I#` switches the
    /// controller into serial-control mode.
    pub async fn connect(&mut self) -> MountResult<MountIdentity> {
        let product = self.query_string(Command::get_product_name()).await?;
        let firmware = self.query_string(Command::get_firmware_version()).await?;
        if product.is_empty() || firmware.is_empty() {
            return Err(MountError::Connection(format!(
                "empty identity reply (product {product:?}, firmware {firmware:?})"
            )));
        }
        // No reply to this one; the next exchange follows directly.
        self.channel.send(&Command::enter_serial_control()).await?;
        info!("connected to {product} firmware {firmware}");
        Ok(MountIdentity { product, firmware })
    }

    pub async fn set_latitude(&mut self, latitude: &Latitude) -> MountResult<()> {
        let wire = latitude.wire();
        self.set_and_verify(
            "latitude",
            Command::set_latitude(latitude),
            Command::get_latitude(),
            &wire,
            true,
        )
        .await
    }

    pub async fn set_longitude(&mut self, longitude: &Longitude) -> MountResult<()> {
        let wire = longitude.encode(self.convention);
        self.set_and_verify(
            "longitude",
            Command::set_longitude(&wire),
            Command::get_longitude(),
            wire.as_str(),
            true,
        )
        .await
    }

    /// Local time read-back is logged but not compared: the device clock
    /// may tick between set and get.
    pub async fn set_local_time(&mut self, time: &SiteTime) -> MountResult<()> {
        self.set_and_verify(
            "local time",
            Command::set_local_time(time),
            Command::get_local_time(),
            time.local_time(),
            false,
        )
        .await
    }

    pub async fn set_date(&mut self, time: &SiteTime) -> MountResult<()> {
        self.set_and_verify(
            "date",
            Command::set_date(time),
            Command::get_date(),
            time.date(),
            true,
        )
        .await
    }

    pub async fn set_utc_offset(&mut self, time: &SiteTime) -> MountResult<()> {
        self.set_and_verify(
            "UTC offset",
            Command::set_utc_offset(time),
            Command::get_utc_offset(),
            time.utc_offset(),
            true,
        )
        .await
    }

    /// Configure all five site parameters from one captured instant, in
    /// the fixed order latitude, longitude, UTC offset, local time,
    /// date. Offset and time/date must come from the same instant so the
    /// device's clock tick cannot race the read-backs.
    pub async fn configure_site(
        &mut self,
        latitude: &Latitude,
        longitude: &Longitude,
        time: &SiteTime,
    ) -> MountResult<()> {
        self.set_latitude(latitude).await?;
        self.set_longitude(longitude).await?;
        self.set_utc_offset(time).await?;
        self.set_local_time(time).await?;
        self.set_date(time).await?;
        Ok(())
    }

    /// Drive the RA auto-home sequence.
    ///
    /// A refused start is a normal outcome (older firmware has no home
    /// sensor); a refused commit is not. `:SHP#` is never sent before
    /// the confirmation step observes the end of motion.
    pub async fn run_auto_home(
        &mut self,
        direction: HomingDirection,
        mode: HomingMode,
    ) -> MountResult<HomingOutcome> {
        let mut machine = HomingMachine::new();

        let start = Command::start_ra_auto_home(direction);
        if !self.request_status(&start).await? {
            machine.process_event(HomingEvent::StartRefused);
            info!("mount has no RA auto-home support, skipping homing");
            return Ok(HomingOutcome::NotSupported);
        }
        machine.process_event(HomingEvent::StartAccepted);
        info!("RA auto-home started ({})", direction.wire_char());

        let waited = match mode {
            HomingMode::Manual(confirm) => confirm.await.map_err(|_| {
                MountError::Connection("homing confirmation channel closed".to_string())
            }),
            HomingMode::Polled {
                interval,
                max_polls,
            } => self.poll_until_homed(interval, max_polls).await,
        };
        if let Err(err) = waited {
            machine.process_event(HomingEvent::Fault);
            return Err(err);
        }
        machine.process_event(HomingEvent::MotionStopped);

        let commit = Command::set_home_point();
        match self.request_status(&commit).await {
            Ok(true) => {
                machine.process_event(HomingEvent::CommitAccepted);
                info!("home position committed");
                Ok(HomingOutcome::Homed)
            }
            Ok(false) => {
                machine.process_event(HomingEvent::Fault);
                Err(MountError::DeviceRejected {
                    command: commit.as_str().to_string(),
                })
            }
            Err(err) => {
                machine.process_event(HomingEvent::Fault);
                Err(err)
            }
        }
    }

    /// Release the channel. Nothing to tell the device; the controller
    /// leaves serial-control mode when the line drops.
    pub fn disconnect(self) -> C {
        debug!("releasing mount channel");
        self.channel
    }

    async fn poll_until_homed(
        &mut self,
        interval: Duration,
        max_polls: Option<u32>,
    ) -> MountResult<()> {
        let interval = interval.max(MIN_POLL_INTERVAL);
        let mut polls = 0u32;
        loop {
            if max_polls.is_some_and(|limit| polls >= limit) {
                return Err(MountError::HomingTimeout { polls });
            }
            sleep(interval).await;
            polls += 1;
            let status = self.query_string(Command::get_mount_status()).await?;
            let label = status.split(',').next().unwrap_or_default();
            debug!("mount status poll {polls}: {label}");
            if label != "Homing" {
                return Ok(());
            }
        }
    }

    /// One set-then-verify round-trip.
    ///
    /// The setter must be acknowledged and, when `compare` is set, the
    /// getter must echo the sent value byte-exactly.
    async fn set_and_verify(
        &mut self,
        parameter: &'static str,
        set: Command,
        get: Command,
        expected: &str,
        compare: bool,
    ) -> MountResult<()> {
        if !self.request_status(&set).await? {
            return Err(MountError::DeviceRejected {
                command: set.as_str().to_string(),
            });
        }
        let actual = self.query_string(get).await?;
        if compare && actual != expected {
            return Err(MountError::Verification {
                parameter,
                expected: expected.to_string(),
                actual,
            });
        }
        if compare {
            info!("{parameter} confirmed as {actual:?}");
        } else {
            info!("{parameter} set to {expected:?}, device reports {actual:?}");
        }
        Ok(())
    }

    async fn request_status(&mut self, command: &Command) -> MountResult<bool> {
        let line = self.exchange(command).await?;
        let ok = decode_status(&line);
        if !ok {
            warn!("{command} not acknowledged (reply {line:?})");
        }
        Ok(ok)
    }

    async fn query_string(&mut self, command: Command) -> MountResult<String> {
        let line = self.exchange(&command).await?;
        Ok(decode_string(&command, &line)?)
    }

    async fn exchange(&mut self, command: &Command) -> MountResult<String> {
        self.channel.send(command).await?;
        let line = self.channel.receive_line().await?;
        debug!("{command} -> {line:?}");
        Ok(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockDevice;

    fn mount(device: MockDevice) -> Mount<MockDevice> {
        Mount::new(device, LongitudeConvention::Signed)
    }

    #[tokio::test]
    async fn test_connect_reports_identity() {
        let mut mount = mount(MockDevice::new());
        let identity = mount.connect().await.unwrap();
        assert_eq!(identity.product, "OpenAstroTracker");
        assert_eq!(identity.firmware, "V1.13.10");
        let device = mount.disconnect();
        assert_eq!(device.sent, vec![":GVP#", ":GVN#", ":I#"]);
    }

    #[tokio::test]
    async fn test_connect_rejects_empty_identity() {
        let mut mount = mount(MockDevice::new().with_identity("", "V1.13.10"));
        assert!(matches!(
            mount.connect().await,
            Err(MountError::Connection(_))
        ));
    }

    #[tokio::test]
    async fn test_set_latitude_round_trip() {
        let latitude: Latitude = "+51*28".parse().unwrap();
        let mut mount = mount(MockDevice::new());
        mount.set_latitude(&latitude).await.unwrap();
        let device = mount.disconnect();
        assert_eq!(device.sent, vec![":St+51*28#", ":Gt#"]);
    }

    #[tokio::test]
    async fn test_rejected_setter_is_fatal() {
        let latitude: Latitude = "+51*28".parse().unwrap();
        let mut mount = mount(MockDevice::new().rejecting("St"));
        let err = mount.set_latitude(&latitude).await.unwrap_err();
        assert!(matches!(
            err,
            MountError::DeviceRejected { ref command } if command == ":St+51*28#"
        ));
    }

    #[tokio::test]
    async fn test_verification_mismatch_is_fatal_even_after_ack() {
        let latitude: Latitude = "+51*28".parse().unwrap();
        let mut mount = mount(MockDevice::new().skewing('t', "+50*00"));
        let err = mount.set_latitude(&latitude).await.unwrap_err();
        match err {
            MountError::Verification {
                parameter,
                expected,
                actual,
            } => {
                assert_eq!(parameter, "latitude");
                assert_eq!(expected, "+51*28");
                assert_eq!(actual, "+50*00");
            }
            other => panic!("expected verification error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_local_time_skew_is_tolerated() {
        let time = site_time();
        // Device clock ticked between set and read-back.
        let mut mount = mount(MockDevice::new().skewing('L', "21:05:10"));
        mount.set_local_time(&time).await.unwrap();
    }

    #[tokio::test]
    async fn test_legacy_longitude_goes_out_unsigned() {
        let longitude: Longitude = "-90*00".parse().unwrap();
        let mut mount = Mount::new(MockDevice::new(), LongitudeConvention::LegacyUnsigned);
        mount.set_longitude(&longitude).await.unwrap();
        let device = mount.disconnect();
        assert_eq!(device.sent, vec![":Sg270*00#", ":Gg#"]);
    }

    #[tokio::test]
    async fn test_auto_home_not_supported_is_not_an_error() {
        let mut mount = mount(MockDevice::new().without_auto_home());
        let outcome = mount
            .run_auto_home(
                HomingDirection::Right,
                HomingMode::Polled {
                    interval: Duration::from_millis(1),
                    max_polls: Some(3),
                },
            )
            .await
            .unwrap();
        assert_eq!(outcome, HomingOutcome::NotSupported);
        let device = mount.disconnect();
        // Nothing beyond the refused start request went out.
        assert_eq!(device.sent, vec![":MHRR#"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_polled_homing_commits_only_after_motion_stops() {
        let mut mount = mount(MockDevice::new().homing_for(2));
        let outcome = mount
            .run_auto_home(
                HomingDirection::Right,
                HomingMode::Polled {
                    interval: MIN_POLL_INTERVAL,
                    max_polls: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(outcome, HomingOutcome::Homed);
        let device = mount.disconnect();
        assert_eq!(
            device.sent,
            vec![":MHRR#", ":GX#", ":GX#", ":GX#", ":SHP#"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_polled_homing_times_out() {
        let mut mount = mount(MockDevice::new().homing_for(100));
        let err = mount
            .run_auto_home(
                HomingDirection::Left,
                HomingMode::Polled {
                    interval: MIN_POLL_INTERVAL,
                    max_polls: Some(4),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, MountError::HomingTimeout { polls: 4 }));
        let device = mount.disconnect();
        assert!(!device.sent.contains(&":SHP#".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_commit_is_fatal() {
        let mut mount = mount(MockDevice::new().rejecting("SHP"));
        let err = mount
            .run_auto_home(
                HomingDirection::Right,
                HomingMode::Polled {
                    interval: Duration::from_millis(1),
                    max_polls: Some(3),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            MountError::DeviceRejected { ref command } if command == ":SHP#"
        ));
    }

    #[tokio::test]
    async fn test_manual_mode_waits_for_operator_signal() {
        let (confirm_tx, confirm_rx) = oneshot::channel();
        confirm_tx.send(()).unwrap();
        let mut mount = mount(MockDevice::new());
        let outcome = mount
            .run_auto_home(HomingDirection::Right, HomingMode::Manual(confirm_rx))
            .await
            .unwrap();
        assert_eq!(outcome, HomingOutcome::Homed);
        let device = mount.disconnect();
        // Manual mode never polls :GX#.
        assert_eq!(device.sent, vec![":MHRR#", ":SHP#"]);
    }

    #[tokio::test]
    async fn test_manual_mode_dropped_signal_is_fatal() {
        let (confirm_tx, confirm_rx) = oneshot::channel::<()>();
        drop(confirm_tx);
        let mut mount = mount(MockDevice::new());
        let err = mount
            .run_auto_home(HomingDirection::Right, HomingMode::Manual(confirm_rx))
            .await
            .unwrap_err();
        assert!(matches!(err, MountError::Connection(_)));
    }

    fn site_time() -> SiteTime {
        use chrono::{FixedOffset, NaiveDate, TimeZone};
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let instant = tz
            .from_local_datetime(
                &NaiveDate::from_ymd_opt(2026, 3, 7)
                    .unwrap()
                    .and_hms_opt(21, 5, 9)
                    .unwrap(),
            )
            .unwrap();
        SiteTime::from_instant(&instant).unwrap()
    }
}
