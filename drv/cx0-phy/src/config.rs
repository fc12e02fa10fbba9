// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tunables for the PHY driver
//!
//! Every field has a default matching the hardware documentation, so a
//! platform only needs to spell out what it changes.

use serde::{Deserialize, Serialize};

/// Timing of the message bus idle/ack polls.  The fast phase polls once per
/// microsecond, the slow phase once per millisecond.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MsgBusTiming {
    pub fast_us: u32,
    pub slow_ms: u32,
}

impl Default for MsgBusTiming {
    fn default() -> Self {
        Self {
            fast_us: 2,
            slow_ms: 1,
        }
    }
}

/// Bounds on the MMIO handshakes performed by the sequencer.  None of these
/// abort bring-up when they expire.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandshakeTimeouts {
    pub soc_ready_us: u32,
    pub reset_start_us: u32,
    pub refclk_ack_us: u32,
    pub powerdown_update_us: u32,
    pub reset_end_ms: u32,
    pub pll_enable_us: u32,
    pub pll_disable_us: u32,
    pub tbt_enable_us: u32,
    pub tbt_disable_us: u32,
}

impl Default for HandshakeTimeouts {
    fn default() -> Self {
        Self {
            soc_ready_us: 100,
            reset_start_us: 5,
            refclk_ack_us: 1,
            powerdown_update_us: 100,
            reset_end_ms: 15,
            pll_enable_us: 3200,
            pll_disable_us: 2000,
            tbt_enable_us: 100,
            tbt_disable_us: 10,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PllConfig {
    /// Compute C10 HDMI PLL state in closed form when the target clock has
    /// no exact table entry, instead of rounding up to the next entry.
    pub hdmi_synthesis: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhyConfig {
    pub msgbus: MsgBusTiming,
    pub timeouts: HandshakeTimeouts,
    pub pll: PllConfig,
    /// Bit `n` is set if port `n` is wired to a C10; everything else is a
    /// C20.
    pub c10_port_mask: u8,
    /// Delay between lanes powering their PLLs, in units of the hardware's
    /// staggering clock
    pub pll_lane_staggering_delay: u8,
}

impl Default for PhyConfig {
    fn default() -> Self {
        Self {
            msgbus: MsgBusTiming::default(),
            timeouts: HandshakeTimeouts::default(),
            pll: PllConfig::default(),
            c10_port_mask: 0b11,
            pll_lane_staggering_delay: 0,
        }
    }
}
