// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! PLL state selection and the inverse clock calculation
//!
//! Both PHY generations synthesize the link clock from a 38.4 MHz reference
//! with a fractional-N divider:
//!
//! ```text
//!   clock = refclk * (multiplier + (frac_quot + frac_rem / frac_den) / 2^16)
//!           / (10 * 2^tx_clk_div)
//! ```
//!
//! The forward direction is table driven ([`calc_state`]); the reverse
//! ([`calc_port_clock`]) is used to check what was actually programmed.

pub mod c10;
pub mod c20;
mod c10_tables;
mod c20_tables;

pub use c10::C10PllState;
pub use c10_tables::{C10_DP_TABLE, C10_EDP_TABLE, C10_HDMI_TABLE};
pub use c20::{C20PllState, Mpll};
pub use c20_tables::{C20_DP_TABLE, C20_FRL_TABLE, C20_HDMI_TABLE};

use crate::config::PllConfig;
use crate::{OutputType, PhyError, PhyGeneration};

/// Reference clock, in kHz
pub const REFCLK_KHZ: u32 = 38_400;

/// The VCO runs at ten times the port clock before the TX clock divider
const DIVISOR: u64 = 10;

pub(crate) fn mul_u32_u32(a: u32, b: u32) -> u64 {
    u64::from(a) * u64::from(b)
}

pub(crate) fn div_round_closest_u64(n: u64, d: u64) -> u64 {
    (n + d / 2) / d
}

/// Divider settings decoded from either generation's register image
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Dividers {
    pub multiplier: u32,
    pub frac_en: bool,
    pub frac_quot: u32,
    pub frac_rem: u32,
    pub frac_den: u32,
    pub tx_clk_div: u32,
}

impl Dividers {
    /// Port clock in kHz, rounded to nearest
    pub fn port_clock(&self) -> u32 {
        let (quot, rem, den) = match (self.frac_en, self.frac_den) {
            (false, _) => (0, 0, 1),
            (true, 0) => (self.frac_quot, 0, 1),
            (true, d) => (self.frac_quot, self.frac_rem, d),
        };
        let whole = mul_u32_u32(REFCLK_KHZ, (self.multiplier << 16) + quot);
        let frac = div_round_closest_u64(
            mul_u32_u32(REFCLK_KHZ, rem),
            u64::from(den),
        );
        let clock = div_round_closest_u64(
            whole + frac,
            DIVISOR << (self.tx_clk_div + 16),
        );
        clock as u32
    }
}

/// Anything that sits in a PLL table
pub trait ClockEntry {
    fn clock(&self) -> u32;
}

impl ClockEntry for C10PllState {
    fn clock(&self) -> u32 {
        self.clock
    }
}

impl ClockEntry for C20PllState {
    fn clock(&self) -> u32 {
        self.clock
    }
}

/// Picks the first entry whose clock is at least `target`.  Tables are
/// never extrapolated: a target above the last entry, or below the first
/// entry, is not supported.
pub fn select_entry<T: ClockEntry>(
    table: &[T],
    target: u32,
) -> Result<&T, PhyError> {
    let not_supported = PhyError::NotSupported { clock: target };
    let first = table.first().ok_or(PhyError::NoPllTable)?;
    if target < first.clock() {
        return Err(not_supported);
    }
    table
        .iter()
        .find(|e| e.clock() >= target)
        .ok_or(not_supported)
}

/// A static PLL table for one generation/output combination
#[derive(Copy, Clone, Debug)]
pub enum PllTable {
    C10(&'static [C10PllState]),
    C20(&'static [C20PllState]),
}

/// Returns the table for `output` on `generation`, if there is one.
pub fn table(generation: PhyGeneration, output: OutputType) -> Option<PllTable> {
    match (generation, output) {
        (PhyGeneration::C10, OutputType::Dp) => {
            Some(PllTable::C10(&C10_DP_TABLE))
        }
        (PhyGeneration::C10, OutputType::Edp) => {
            Some(PllTable::C10(&C10_EDP_TABLE))
        }
        (PhyGeneration::C10, OutputType::HdmiTmds) => {
            Some(PllTable::C10(&C10_HDMI_TABLE))
        }
        (PhyGeneration::C20, OutputType::Dp) => {
            Some(PllTable::C20(&C20_DP_TABLE))
        }
        (PhyGeneration::C20, OutputType::HdmiTmds) => {
            Some(PllTable::C20(&C20_HDMI_TABLE))
        }
        (PhyGeneration::C20, OutputType::HdmiFrl) => {
            Some(PllTable::C20(&C20_FRL_TABLE))
        }
        // eDP panels only hang off C10 ports, the C10 can't do FRL, and
        // Thunderbolt clocks come from the TBT PLL rather than the PHY.
        (PhyGeneration::C20, OutputType::Edp)
        | (PhyGeneration::C10, OutputType::HdmiFrl)
        | (_, OutputType::Tbt) => None,
    }
}

/// Register image for one link's PLL
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PllState {
    C10(C10PllState),
    C20(C20PllState),
}

impl PllState {
    /// The clock this state was selected for
    pub fn clock(&self) -> u32 {
        match self {
            PllState::C10(s) => s.clock,
            PllState::C20(s) => s.clock,
        }
    }

    pub fn generation(&self) -> PhyGeneration {
        match self {
            PllState::C10(_) => PhyGeneration::C10,
            PllState::C20(_) => PhyGeneration::C20,
        }
    }

    pub fn dividers(&self) -> Dividers {
        match self {
            PllState::C10(s) => s.dividers(),
            PllState::C20(s) => s.dividers(),
        }
    }

    pub fn ssc_enabled(&self) -> bool {
        match self {
            PllState::C10(s) => s.ssc_enabled(),
            PllState::C20(s) => s.ssc_enabled(),
        }
    }
}

/// Computes the PLL state for driving `output` at `clock` kHz.
pub fn calc_state(
    generation: PhyGeneration,
    output: OutputType,
    clock: u32,
    cfg: &PllConfig,
) -> Result<PllState, PhyError> {
    match table(generation, output).ok_or(PhyError::NoPllTable)? {
        PllTable::C10(t) => {
            let exact = t.iter().any(|e| e.clock == clock);
            if output == OutputType::HdmiTmds && cfg.hdmi_synthesis && !exact
            {
                C10PllState::compute_hdmi(clock).map(PllState::C10)
            } else {
                select_entry(t, clock).map(|e| PllState::C10(*e))
            }
        }
        PllTable::C20(t) => select_entry(t, clock).map(|e| PllState::C20(*e)),
    }
}

/// Recovers the port clock, in kHz, from a PLL register image
pub fn calc_port_clock(state: &PllState) -> u32 {
    state.dividers().port_clock()
}
