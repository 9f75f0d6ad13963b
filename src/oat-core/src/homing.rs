// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! RA auto-home state machine.
//!
//! An explicit machine for the homing lifecycle, making the transitions
//! clear and keeping invalid ones unrepresentable. The machine is pure:
//! the mount driver feeds it events observed on the wire, it never
//! touches the channel itself. One machine is created per homing
//! operation and discarded when the operation ends.

use std::fmt;

/// Direction of the RA home-sensor search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HomingDirection {
    #[default]
    Right,
    Left,
}

impl HomingDirection {
    pub fn wire_char(self) -> char {
        match self {
            Self::Right => 'R',
            Self::Left => 'L',
        }
    }
}

/// Wire observations that drive the machine.
#[derive(Debug, Clone)]
pub enum HomingEvent {
    /// `:MHR` acknowledged; the mount is searching for the home sensor.
    StartAccepted,
    /// `:MHR` refused; the firmware lacks auto-home. A normal outcome.
    StartRefused,
    /// The mount no longer reports the `Homing` state label, or the
    /// operator confirmed completion in manual mode.
    MotionStopped,
    /// `:SHP` acknowledged; the home point is committed.
    CommitAccepted,
    /// Any fatal condition (rejected commit, protocol failure, timeout).
    Fault,
}

/// Lifecycle states. `Confirmed` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HomingState {
    #[default]
    Disabled,
    Requested,
    InProgress,
    Confirmed,
    Failed,
}

impl fmt::Display for HomingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Disabled => "Disabled",
            Self::Requested => "Requested",
            Self::InProgress => "InProgress",
            Self::Confirmed => "Confirmed",
            Self::Failed => "Failed",
        };
        f.write_str(name)
    }
}

/// The homing state machine.
#[derive(Debug, Clone, Default)]
pub struct HomingMachine {
    state: HomingState,
}

impl HomingMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> HomingState {
        self.state
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.state, HomingState::Confirmed | HomingState::Failed)
    }

    /// Process an event, returning true when a transition occurred.
    /// Invalid (state, event) pairs leave the state untouched.
    pub fn process_event(&mut self, event: HomingEvent) -> bool {
        let next = match (self.state, event) {
            (HomingState::Disabled, HomingEvent::StartAccepted) => Some(HomingState::Requested),
            // Capability absent: stay Disabled, not a fault.
            (HomingState::Disabled, HomingEvent::StartRefused) => None,
            (HomingState::Requested, HomingEvent::MotionStopped) => Some(HomingState::InProgress),
            (HomingState::InProgress, HomingEvent::CommitAccepted) => Some(HomingState::Confirmed),
            (HomingState::Confirmed | HomingState::Failed, _) => None,
            (_, HomingEvent::Fault) => Some(HomingState::Failed),
            _ => None,
        };
        match next {
            Some(state) => {
                self.state = state;
                true
            }
            None => false,
        }
    }
}
