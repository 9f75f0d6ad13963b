// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! In-memory mount simulator for development and testing.
//!
//! Holds site parameters in memory, echoes every set value back through
//! the matching getter and acknowledges status commands. No hardware or
//! serial port required. Failure paths (rejected commands, skewed
//! read-backs, missing auto-home) are injectable.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;

use oat_core::{Command, MountResult};

use crate::channel::Channel;

/// A scripted LX200-style device behind the [`Channel`] trait.
pub struct MockDevice {
    product: String,
    firmware: String,
    stored: HashMap<char, String>,
    /// Setter prefixes (e.g. "St") that reply `'0'`.
    rejected: HashSet<&'static str>,
    /// Getter mnemonics (e.g. 't') whose read-back is forced to a fixed
    /// value regardless of what was stored.
    skewed: HashMap<char, String>,
    supports_auto_home: bool,
    /// `:GX#` reports `Homing` this many more times before `Tracking`.
    homing_polls: u32,
    reply: Option<String>,
    /// Every command received, in order, as framed text.
    pub sent: Vec<String>,
}

impl MockDevice {
    pub fn new() -> Self {
        Self {
            product: "OpenAstroTracker".to_string(),
            firmware: "V1.13.10".to_string(),
            stored: HashMap::new(),
            rejected: HashSet::new(),
            skewed: HashMap::new(),
            supports_auto_home: true,
            homing_polls: 0,
            reply: None,
            sent: Vec::new(),
        }
    }

    pub fn with_identity(mut self, product: &str, firmware: &str) -> Self {
        self.product = product.to_string();
        self.firmware = firmware.to_string();
        self
    }

    /// Make the device answer `'0'` to a setter (prefix without colon,
    /// e.g. `"St"` or `"SHP"`).
    pub fn rejecting(mut self, prefix: &'static str) -> Self {
        self.rejected.insert(prefix);
        self
    }

    /// Force a getter (`'t'`, `'g'`, `'L'`, `'C'` or `'G'`) to report a
    /// fixed value, breaking set/verify round-trips.
    pub fn skewing(mut self, getter: char, value: &str) -> Self {
        self.skewed.insert(getter, value.to_string());
        self
    }

    pub fn without_auto_home(mut self) -> Self {
        self.supports_auto_home = false;
        self
    }

    /// Report `Homing` for the first `polls` status queries.
    pub fn homing_for(mut self, polls: u32) -> Self {
        self.homing_polls = polls;
        self
    }

    fn status_for(&self, prefix: &'static str) -> String {
        if self.rejected.contains(prefix) {
            "0".to_string()
        } else {
            "1".to_string()
        }
    }

    fn read_back(&self, getter: char) -> String {
        let value = self
            .skewed
            .get(&getter)
            .or_else(|| self.stored.get(&getter))
            .cloned()
            .unwrap_or_default();
        format!("{value}#")
    }

    fn respond(&mut self, body: &str) -> Option<String> {
        // Setter mnemonics are keyed by the getter character that reads
        // them back: St/Gt, Sg/Gg, SL/GL, SC/GC, SG/GG.
        if let Some(value) = body.strip_prefix("St") {
            self.stored.insert('t', value.to_string());
            return Some(self.status_for("St"));
        }
        if let Some(value) = body.strip_prefix("Sg") {
            self.stored.insert('g', value.to_string());
            return Some(self.status_for("Sg"));
        }
        if let Some(value) = body.strip_prefix("SL") {
            self.stored.insert('L', value.to_string());
            return Some(self.status_for("SL"));
        }
        if let Some(value) = body.strip_prefix("SC") {
            self.stored.insert('C', value.to_string());
            return Some(self.status_for("SC"));
        }
        if let Some(value) = body.strip_prefix("SG") {
            self.stored.insert('G', value.to_string());
            return Some(self.status_for("SG"));
        }
        match body {
            "GVP" => Some(format!("{}#", self.product)),
            "GVN" => Some(format!("{}#", self.firmware)),
            "I" => None,
            "Gt" => Some(self.read_back('t')),
            "Gg" => Some(self.read_back('g')),
            "GL" => Some(self.read_back('L')),
            "GC" => Some(self.read_back('C')),
            "GG" => Some(self.read_back('G')),
            "MHRR" | "MHRL" => {
                if self.supports_auto_home {
                    Some(self.status_for("MHR"))
                } else {
                    Some("0".to_string())
                }
            }
            "GX" => {
                let label = if self.homing_polls > 0 {
                    self.homing_polls -= 1;
                    "Homing"
                } else {
                    "Tracking"
                };
                Some(format!("{label},RR--,0,0,0,0#"))
            }
            "SHP" => Some(self.status_for("SHP")),
            // Unknown command: stay silent, like a confused device.
            _ => Some(String::new()),
        }
    }
}

impl Default for MockDevice {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Channel for MockDevice {
    async fn send(&mut self, command: &Command) -> MountResult<()> {
        self.sent.push(command.as_str().to_string());
        let body = command
            .as_str()
            .trim_start_matches(':')
            .trim_end_matches('#');
        self.reply = self.respond(body);
        Ok(())
    }

    async fn receive_line(&mut self) -> MountResult<String> {
        // A missing reply reads like a timed-out line: empty.
        Ok(self.reply.take().unwrap_or_default())
    }
}
