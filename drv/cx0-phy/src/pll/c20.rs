// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! C20 PLL register image
//!
//! The C20 has two PLLs, MPLLA and MPLLB, each configured by a block of
//! 16-bit SRAM words.  A state carries the words for whichever one it uses;
//! bit 7 of the first TX word tells the PHY which that is.  Configuration
//! is double-buffered: we always write the idle context and then flip the
//! context toggle, so the live link never sees a half-written state.

use super::Dividers;
use crate::codec::{RegisterCodec, SchemeB};
use crate::msgbus::PhyBus;
use crate::regs::{
    C20Context, C20CustomWidth, C20_CONTEXT_TOGGLE, C20_CUSTOM_WIDTH_MASK,
    C20_DP_RATE_MASK, C20_DP_RATE_SHIFT, C20_HDMI_RATE_MASK, C20_IS_DP,
    C20_IS_HDMI_FRL, PHY_C20_VDR_CUSTOM_SERDES_RATE,
    PHY_C20_VDR_CUSTOM_WIDTH, PHY_C20_VDR_HDMI_RATE,
};
use crate::{Commit, Lane, OutputType, PhyError};

/// Set in `tx[0]` when the state runs from MPLLB
pub const C20_USE_MPLLB: u16 = 1 << 7;

/// Clocks at or above this run from MPLLA
pub const C20_MPLLA_MIN_KHZ: u32 = 1_000_000;

const MPLL_MULTIPLIER_MASK: u16 = 0xfff;
const MPLL_TX_CLK_DIV_SHIFT: u16 = 13;
const MPLLA_FRAC_EN: u16 = 1 << 14;
const MPLLB_FRAC_EN: u16 = 1 << 13;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mpll {
    Mplla([u16; 10]),
    Mpllb([u16; 11]),
}

impl Mpll {
    pub fn words(&self) -> &[u16] {
        match self {
            Mpll::Mplla(w) => w,
            Mpll::Mpllb(w) => w,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct C20PllState {
    /// Port clock in kHz; per lane for FRL
    pub clock: u32,
    pub tx: [u16; 3],
    pub cmn: [u16; 4],
    pub mpll: Mpll,
}

impl C20PllState {
    pub fn uses_mplla(&self) -> bool {
        matches!(self.mpll, Mpll::Mplla(_))
    }

    pub fn dividers(&self) -> Dividers {
        let (w, tx_clk_div, frac_en) = match &self.mpll {
            Mpll::Mplla(w) => (
                &w[..],
                (w[1] >> MPLL_TX_CLK_DIV_SHIFT) & 0b111,
                w[6] & MPLLA_FRAC_EN != 0,
            ),
            Mpll::Mpllb(w) => (
                &w[..],
                w[0] >> MPLL_TX_CLK_DIV_SHIFT,
                w[6] & MPLLB_FRAC_EN != 0,
            ),
        };
        Dividers {
            multiplier: u32::from(w[0] & MPLL_MULTIPLIER_MASK),
            frac_en,
            frac_den: u32::from(w[7]),
            frac_quot: u32::from(w[8]),
            frac_rem: u32::from(w[9]),
            tx_clk_div: u32::from(tx_clk_div),
        }
    }

    pub fn ssc_enabled(&self) -> bool {
        self.mpll.words()[5] != 0
    }

    /// Writes this state into the idle context on `lane` and makes it live.
    pub fn program<B: PhyBus>(
        &self,
        bus: &mut B,
        lane: Lane,
        output: OutputType,
    ) -> Result<(), PhyError> {
        let width = custom_width(output, self.clock);
        let rate = match output {
            OutputType::Dp | OutputType::Edp => {
                RateConfig::Dp(dp_rate_code(self.clock)?)
            }
            OutputType::HdmiTmds => RateConfig::Hdmi { frl: false, code: 0 },
            OutputType::HdmiFrl => RateConfig::Hdmi {
                frl: true,
                code: frl_rate_code(self.clock)?,
            },
            OutputType::Tbt => return Err(PhyError::NoPllTable),
        };

        let serdes = bus.read(lane, PHY_C20_VDR_CUSTOM_SERDES_RATE)?;
        let target = C20Context::active(serdes).other();

        let codec = SchemeB;
        let lanes = lane.into();
        for (i, w) in self.tx.iter().enumerate() {
            let addr = target.tx(i as u16);
            codec.write_word(bus, lanes, addr, *w, Commit::Committed)?;
        }
        for (i, w) in self.cmn.iter().enumerate() {
            let addr = target.cmn(i as u16);
            codec.write_word(bus, lanes, addr, *w, Commit::Committed)?;
        }
        match &self.mpll {
            Mpll::Mplla(words) => {
                for (i, w) in words.iter().enumerate() {
                    let addr = target.mplla(i as u16);
                    let c = Commit::Committed;
                    codec.write_word(bus, lanes, addr, *w, c)?;
                }
            }
            Mpll::Mpllb(words) => {
                for (i, w) in words.iter().enumerate() {
                    let addr = target.mpllb(i as u16);
                    let c = Commit::Committed;
                    codec.write_word(bus, lanes, addr, *w, c)?;
                }
            }
        }

        bus.rmw(
            lanes,
            PHY_C20_VDR_CUSTOM_WIDTH,
            C20_CUSTOM_WIDTH_MASK,
            width as u8,
            Commit::Committed,
        )?;

        match rate {
            RateConfig::Dp(code) => {
                bus.rmw(
                    lanes,
                    PHY_C20_VDR_CUSTOM_SERDES_RATE,
                    C20_IS_DP | C20_IS_HDMI_FRL | C20_DP_RATE_MASK,
                    C20_IS_DP | (code << C20_DP_RATE_SHIFT),
                    Commit::Committed,
                )?;
            }
            RateConfig::Hdmi { frl, code } => {
                bus.rmw(
                    lanes,
                    PHY_C20_VDR_CUSTOM_SERDES_RATE,
                    C20_IS_DP | C20_IS_HDMI_FRL,
                    if frl { C20_IS_HDMI_FRL } else { 0 },
                    Commit::Committed,
                )?;
                bus.rmw(
                    lanes,
                    PHY_C20_VDR_HDMI_RATE,
                    C20_HDMI_RATE_MASK,
                    code,
                    Commit::Committed,
                )?;
            }
        }

        bus.rmw(
            lanes,
            PHY_C20_VDR_CUSTOM_SERDES_RATE,
            C20_CONTEXT_TOGGLE,
            target.toggle_bit(),
            Commit::Committed,
        )
    }

    /// Reads the live context back from `lane`
    pub fn read_out<B: PhyBus>(
        bus: &mut B,
        lane: Lane,
    ) -> Result<Self, PhyError> {
        let serdes = bus.read(lane, PHY_C20_VDR_CUSTOM_SERDES_RATE)?;
        let ctx = C20Context::active(serdes);
        let codec = SchemeB;

        let mut tx = [0u16; 3];
        for (i, w) in tx.iter_mut().enumerate() {
            *w = codec.read_word(bus, lane, ctx.tx(i as u16))?;
        }
        let mut cmn = [0u16; 4];
        for (i, w) in cmn.iter_mut().enumerate() {
            *w = codec.read_word(bus, lane, ctx.cmn(i as u16))?;
        }
        let mpll = if tx[0] & C20_USE_MPLLB != 0 {
            let mut words = [0u16; 11];
            for (i, w) in words.iter_mut().enumerate() {
                *w = codec.read_word(bus, lane, ctx.mpllb(i as u16))?;
            }
            Mpll::Mpllb(words)
        } else {
            let mut words = [0u16; 10];
            for (i, w) in words.iter_mut().enumerate() {
                *w = codec.read_word(bus, lane, ctx.mplla(i as u16))?;
            }
            Mpll::Mplla(words)
        };

        // A context that was never programmed reads back a zero multiplier
        let word0 = mpll.words()[0];
        if word0 & MPLL_MULTIPLIER_MASK == 0 {
            let addr = match mpll {
                Mpll::Mplla(_) => ctx.mplla(0),
                Mpll::Mpllb(_) => ctx.mpllb(0),
            };
            return Err(PhyError::BadRegisterValue {
                addr: u32::from(addr),
                value: u32::from(word0),
            });
        }

        let mut s = Self {
            clock: 0,
            tx,
            cmn,
            mpll,
        };
        s.clock = s.dividers().port_clock();
        Ok(s)
    }
}

enum RateConfig {
    Dp(u8),
    Hdmi { frl: bool, code: u8 },
}

fn custom_width(output: OutputType, clock: u32) -> C20CustomWidth {
    match output {
        OutputType::HdmiFrl => C20CustomWidth::Bits16,
        OutputType::Dp | OutputType::Edp if clock >= C20_MPLLA_MIN_KHZ => {
            C20CustomWidth::Bits20
        }
        _ => C20CustomWidth::Bits10,
    }
}

fn dp_rate_code(clock: u32) -> Result<u8, PhyError> {
    Ok(match clock {
        162_000 => 0,
        270_000 => 1,
        540_000 => 2,
        810_000 => 3,
        1_000_000 => 8,
        1_350_000 => 9,
        2_000_000 => 10,
        _ => return Err(PhyError::NotSupported { clock }),
    })
}

fn frl_rate_code(clock: u32) -> Result<u8, PhyError> {
    Ok(match clock {
        300_000 => 1,
        600_000 => 2,
        800_000 => 3,
        1_000_000 => 4,
        1_200_000 => 5,
        _ => return Err(PhyError::NotSupported { clock }),
    })
}
