// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! TOML configuration for the setup tool.
//!
//! Everything here can also be set on the command line; CLI flags win
//! over the file, the file wins over the built-in defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use oat_core::{HomingDirection, LongitudeConvention};

pub const DEFAULT_CONFIG_FILE: &str = "oat-setup.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {0}: {1}")]
    Read(PathBuf, String),

    #[error("failed to parse config file {0}: {1}")]
    Parse(PathBuf, String),
}

/// How the end of the homing search is confirmed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfirmationKind {
    /// Poll `:GX#` until the mount stops reporting `Homing`.
    #[default]
    Polled,
    /// Wait for the operator to confirm on stdin.
    Manual,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SetupConfig {
    pub serial_port: String,
    pub baud: u32,
    pub longitude_convention: LongitudeConvention,
    /// Run the RA auto-home sequence after site configuration.
    pub auto_home: bool,
    pub homing_direction: HomingDirection,
    pub homing_confirmation: ConfirmationKind,
    pub poll_interval_secs: u64,
    /// Poll budget before the run fails with a timeout; absent means
    /// wait as long as the mount keeps homing.
    pub max_polls: Option<u32>,
    pub log_level: Option<String>,
}

impl Default for SetupConfig {
    fn default() -> Self {
        Self {
            serial_port: "/dev/ttyUSB0".to_string(),
            baud: 19200,
            longitude_convention: LongitudeConvention::default(),
            auto_home: true,
            homing_direction: HomingDirection::default(),
            homing_confirmation: ConfirmationKind::default(),
            poll_interval_secs: 1,
            max_polls: Some(120),
            log_level: None,
        }
    }
}

impl SetupConfig {
    /// Load from an explicit path, or from `oat-setup.toml` in the
    /// working directory when present, or fall back to defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Read(path.clone(), e.to_string()))?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse(path, e.to_string()))
    }
}
