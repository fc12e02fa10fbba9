// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! C10 PLL register image
//!
//! The C10 PLL is configured by 20 consecutive bytes at `0xc00`, plus one
//! common and one TX byte.  The fields we care about:
//!
//! | byte    | contents                                   |
//! |---------|--------------------------------------------|
//! | 0       | bit 4: fractional divider enable           |
//! | 2, 3    | `(multiplier - 16) * 2`, 12 bits           |
//! | 4       | nonzero when spread spectrum is enabled    |
//! | 9, 10   | fractional denominator, little endian      |
//! | 11, 12  | fractional quotient                        |
//! | 13, 14  | fractional remainder                       |
//! | 15      | bits 2:0 TX clock divider, 5:3 HDMI divider|

use super::{Dividers, REFCLK_KHZ};
use crate::codec::SchemeA;
use crate::msgbus::PhyBus;
use crate::regs::{
    c10_vdr_cmn, c10_vdr_pll, c10_vdr_tx, C10_VDR_CTRL_MASTER_LANE,
    C10_VDR_CTRL_MSGBUS_ACCESS, C10_VDR_CTRL_UPDATE_CFG,
    C10_VDR_CUSTOM_WIDTH_8_10, C10_VDR_CUSTOM_WIDTH_MASK,
    PHY_C10_VDR_CONTROL1, PHY_C10_VDR_CUSTOM_WIDTH,
};
use crate::{Commit, Lane, Lanes, PhyError};

pub const C10_PLL_BYTES: usize = 20;

const PLL0_FRAC_EN: u8 = 1 << 4;
const PLL15_TX_CLK_DIV_MASK: u8 = 0b111;
const PLL15_HDMI_DIV_SHIFT: u8 = 3;

/// Lowest VCO frequency the closed-form HDMI calculation will pick, in kHz
const VCO_MIN_KHZ: u64 = 4_800_000;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct C10PllState {
    /// Port clock in kHz
    pub clock: u32,
    pub tx: u8,
    pub cmn: u8,
    pub pll: [u8; C10_PLL_BYTES],
}

impl C10PllState {
    fn le16(&self, lo: usize) -> u32 {
        u32::from(u16::from_le_bytes([self.pll[lo], self.pll[lo + 1]]))
    }

    pub fn dividers(&self) -> Dividers {
        let raw = (u32::from(self.pll[3] & 0xf) << 8) | u32::from(self.pll[2]);
        Dividers {
            multiplier: raw / 2 + 16,
            frac_en: self.pll[0] & PLL0_FRAC_EN != 0,
            frac_den: self.le16(9),
            frac_quot: self.le16(11),
            frac_rem: self.le16(13),
            tx_clk_div: u32::from(self.pll[15] & PLL15_TX_CLK_DIV_MASK),
        }
    }

    pub fn hdmi_div(&self) -> u8 {
        (self.pll[15] >> PLL15_HDMI_DIV_SHIFT) & 0b111
    }

    pub fn ssc_enabled(&self) -> bool {
        self.pll[4] != 0
    }

    /// Computes an HDMI PLL state for an arbitrary TMDS clock, for modes
    /// that aren't in the table.  The result reverse-calculates to exactly
    /// `clock`.
    pub fn compute_hdmi(clock: u32) -> Result<Self, PhyError> {
        if !(25_000..=600_000).contains(&clock) {
            return Err(PhyError::NotSupported { clock });
        }

        // Smallest TX divider that keeps the VCO in range
        let mut tx_clk_div = 0u32;
        while (u64::from(clock) * 10) << tx_clk_div < VCO_MIN_KHZ {
            tx_clk_div += 1;
        }

        // VCO / refclk in 16.16 fixed point, with the fractional part split
        // into quotient and remainder over a denominator of 15.  The
        // reference is 15 * 256 * 10 kHz, so dividing by it and applying the
        // post-divider reduces to a single division by (15 << 16).
        let num = u64::from(clock) << (tx_clk_div + 8);
        let whole_den = 15u64 << 16;
        let multiplier = (num / whole_den) as u32;
        let rem = num - u64::from(multiplier) * whole_den;
        let frac_quot = (rem / 15) as u16;
        let frac_rem = (rem % 15) as u16;
        let frac_den: u16 = if frac_rem != 0 { 15 } else { 1 };
        let frac_en = frac_quot != 0 || frac_rem != 0;

        let raw = multiplier
            .checked_sub(16)
            .map(|m| m * 2)
            .filter(|&r| r < 0x1000)
            .ok_or(PhyError::NotSupported { clock })?;

        let mut pll = [0u8; C10_PLL_BYTES];
        pll[0] = 0xa4 | if frac_en { PLL0_FRAC_EN } else { 0 };
        pll[2] = raw as u8;
        pll[3] = ((raw >> 8) & 0xf) as u8;
        pll[4..9].copy_from_slice(&[0x00, 0x00, 0x98, 0x46, 0x01]);
        pll[9..11].copy_from_slice(&frac_den.to_le_bytes());
        pll[11..13].copy_from_slice(&frac_quot.to_le_bytes());
        pll[13..15].copy_from_slice(&frac_rem.to_le_bytes());
        pll[15] = tx_clk_div as u8 | (1 << PLL15_HDMI_DIV_SHIFT);
        pll[16..20].copy_from_slice(&[0x84, 0x4f, 0xe5, 0x21]);

        Ok(Self {
            clock,
            tx: 0x10,
            cmn: 0x1,
            pll,
        })
    }

    /// Writes this state into the PHY.  The PLL bytes go out as a single
    /// burst on `master`, committed on the last byte.
    pub fn program<B: PhyBus>(
        &self,
        bus: &mut B,
        master: Lane,
    ) -> Result<(), PhyError> {
        bus.rmw(
            Lanes::Both,
            PHY_C10_VDR_CONTROL1,
            0,
            C10_VDR_CTRL_MSGBUS_ACCESS,
            Commit::Committed,
        )?;
        bus.rmw(
            Lanes::Both,
            PHY_C10_VDR_CUSTOM_WIDTH,
            C10_VDR_CUSTOM_WIDTH_MASK,
            C10_VDR_CUSTOM_WIDTH_8_10,
            Commit::Committed,
        )?;
        bus.rmw(
            Lanes::Both,
            PHY_C10_VDR_CONTROL1,
            0,
            C10_VDR_CTRL_UPDATE_CFG,
            Commit::Committed,
        )?;

        SchemeA.write_burst(
            bus,
            master,
            c10_vdr_pll(0),
            &self.pll,
            Commit::Committed,
        )?;
        bus.write(master, c10_vdr_cmn(0), self.cmn, Commit::Committed)?;
        bus.write(master, c10_vdr_tx(0), self.tx, Commit::Committed)?;

        bus.rmw(
            master.into(),
            PHY_C10_VDR_CONTROL1,
            0,
            C10_VDR_CTRL_MASTER_LANE | C10_VDR_CTRL_UPDATE_CFG,
            Commit::Committed,
        )
    }

    /// Reads the live PLL state back from `master`
    pub fn read_out<B: PhyBus>(
        bus: &mut B,
        master: Lane,
    ) -> Result<Self, PhyError> {
        bus.rmw(
            master.into(),
            PHY_C10_VDR_CONTROL1,
            0,
            C10_VDR_CTRL_MSGBUS_ACCESS,
            Commit::Committed,
        )?;

        let mut pll = [0u8; C10_PLL_BYTES];
        SchemeA.read_burst(bus, master, c10_vdr_pll(0), &mut pll)?;
        let cmn = bus.read(master, c10_vdr_cmn(0))?;
        let tx = bus.read(master, c10_vdr_tx(0))?;

        let mut s = Self {
            clock: 0,
            tx,
            cmn,
            pll,
        };
        s.clock = s.dividers().port_clock();
        Ok(s)
    }
}

// The closed-form calculation above leans on this
static_assertions::const_assert_eq!(REFCLK_KHZ, (15 << 8) * 10);
