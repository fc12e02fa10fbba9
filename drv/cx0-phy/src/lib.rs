// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Driver for the CX0 family of display PHYs (C10 and C20)
//!
//! The PHY's configuration space isn't memory mapped.  Instead, each port
//! has a pair of message bus registers per PHY lane, through which we tunnel
//! single-byte reads and writes; see [`msgbus`].  On top of that sits a
//! register codec ([`codec`]) which hides the difference between the C10's
//! flat 8-bit space and the C20's windowed 16-bit SRAM, the PLL tables and
//! arithmetic ([`pll`]), and the bring-up sequencer ([`seq`], [`tbt`]).
//!
//! Hardware access goes through the [`DisplayRw`] trait, power domains
//! through [`DisplayPower`], and all waiting through an `embedded-hal` delay,
//! so the same code runs against real MMIO or against a simulation.

#![cfg_attr(target_os = "none", no_std)]

pub mod codec;
pub mod config;
pub mod msgbus;
pub mod pll;
pub mod regs;
pub mod seq;
pub mod tbt;

#[cfg(test)]
mod testbus;

use embedded_hal::blocking::delay::{DelayMs, DelayUs};
use ringbuf::*;

pub use drv_phy_err::{BusFault, Disposition, PhyError};

use crate::regs::RegisterAddress;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Trace {
    None,
    BusReset { port: u8, lane: u8 },
    BusResetStuck { port: u8, lane: u8 },
    BusAttemptFailed { port: u8, lane: u8, addr: u16, cause: BusFault },
    BusRetriesExhausted { port: u8, lane: u8, addr: u16 },
    SeqState { port: u8, state: seq::SeqState },
    HandshakeTimeout { port: u8, step: seq::Warnings },
    PowerDomainFailed { port: u8 },
    LevelClamped { port: u8, lane: u8 },
    PllMismatch { port: u8, expected: u32, actual: u32 },
    TbtClock { port: u8, clock: u32 },
}
ringbuf!(Trace, 64, Trace::None);

/// A display port driven by a CX0 PHY
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, num_derive::FromPrimitive,
)]
pub enum Port {
    A = 0,
    B = 1,
    Tc1 = 2,
    Tc2 = 3,
    Tc3 = 4,
    Tc4 = 5,
}

impl Port {
    pub fn index(self) -> u8 {
        self as u8
    }
}

/// One PHY lane.  Each PHY lane carries two transmitters (TX lanes).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Lane {
    Lane0 = 0,
    Lane1 = 1,
}

/// A set of PHY lanes to operate on.  Operations on [`Lanes::Both`] are
/// issued to lane 0 and then to lane 1; they are never atomic as a pair.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Lanes {
    Lane0,
    Lane1,
    Both,
}

impl Lanes {
    pub fn iter(self) -> impl Iterator<Item = Lane> {
        let (first, second) = match self {
            Lanes::Lane0 => (Some(Lane::Lane0), None),
            Lanes::Lane1 => (Some(Lane::Lane1), None),
            Lanes::Both => (Some(Lane::Lane0), Some(Lane::Lane1)),
        };
        first.into_iter().chain(second)
    }

    pub fn contains(self, lane: Lane) -> bool {
        self.iter().any(|l| l == lane)
    }
}

/// One of the two transmitters on a PHY lane
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Tx {
    Tx1 = 0,
    Tx2 = 1,
}

impl Tx {
    pub const BOTH: [Tx; 2] = [Tx::Tx1, Tx::Tx2];

    /// Offset of this transmitter's registers in PHY configuration space
    pub const fn offset(self) -> u16 {
        self as u16 * 0x200
    }
}

impl From<Lane> for Lanes {
    fn from(l: Lane) -> Self {
        match l {
            Lane::Lane0 => Lanes::Lane0,
            Lane::Lane1 => Lanes::Lane1,
        }
    }
}

/// Whether a message bus write waits for the PHY to apply it and
/// acknowledge.  Uncommitted writes are only staged.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Commit {
    Uncommitted,
    Committed,
}

/// The two PHY generations, which differ in how their configuration space is
/// addressed and in their PLL layout.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PhyGeneration {
    C10,
    C20,
}

impl PhyGeneration {
    /// Decides which PHY sits behind `port`.  This is resolved once, when the
    /// port is brought up, and cached by the caller.
    pub fn detect(port: Port, cfg: &config::PhyConfig) -> Self {
        if cfg.c10_port_mask & (1 << port.index()) != 0 {
            PhyGeneration::C10
        } else {
            PhyGeneration::C20
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub enum OutputType {
    Dp,
    Edp,
    HdmiTmds,
    HdmiFrl,
    Tbt,
}

/// A mode-set request as handed to us by the orchestrator.
///
/// For DP and eDP, `pixel_clock` is the link symbol clock that the DP link
/// policy has already settled on; for HDMI it's the mode's pixel clock.
/// Both are in kHz.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LinkRequest {
    pub output_type: OutputType,
    pub pixel_clock: u32,
    pub bit_depth: u8,
    pub lane_count: u8,
    pub ycbcr420: bool,
    pub compression_requested: bool,
    pub lane_reversal: bool,
}

impl LinkRequest {
    /// PHY lanes that are physically wired for this link.  Up to two TX
    /// lanes fit on one PHY lane; which one depends on lane reversal.
    pub fn owned_lanes(&self) -> Lanes {
        if self.lane_count > 2 {
            Lanes::Both
        } else {
            self.master_lane().into()
        }
    }

    /// The lane that owns PLL programming and the max-pclk request
    pub fn master_lane(&self) -> Lane {
        if self.lane_reversal {
            Lane::Lane1
        } else {
            Lane::Lane0
        }
    }

    /// The PHY lane and transmitter carrying logical TX lane `ln`
    pub fn tx_location(&self, ln: u8) -> (Lane, Tx) {
        let phy = if (ln / 2 == 0) != self.lane_reversal {
            Lane::Lane0
        } else {
            Lane::Lane1
        };
        let tx = if ln % 2 == 0 { Tx::Tx1 } else { Tx::Tx2 };
        (phy, tx)
    }

    pub fn check_lanes(&self) -> Result<(), PhyError> {
        match self.lane_count {
            1..=4 => Ok(()),
            n => Err(PhyError::InvalidLaneCount(n)),
        }
    }
}

/// This trait abstracts over the ways of reaching the display engine's
/// MMIO registers.
pub trait DisplayRw {
    fn write<T>(
        &self,
        reg: RegisterAddress<T>,
        value: T,
    ) -> Result<(), PhyError>
    where
        u32: From<T>;

    fn read<T>(&self, reg: RegisterAddress<T>) -> Result<T, PhyError>
    where
        T: From<u32>;

    /// Performs a write operation on the given register, where the value is
    /// calculated by calling f(0).  This is helpful as a way to reduce manual
    /// type information.
    fn write_with<T, F>(
        &self,
        reg: RegisterAddress<T>,
        f: F,
    ) -> Result<(), PhyError>
    where
        T: From<u32>,
        u32: From<T>,
        F: Fn(&mut T),
    {
        let mut data = 0.into();
        f(&mut data);
        self.write(reg, data)
    }

    /// Performs a read-modify-write operation on a register
    fn modify<T, F>(
        &self,
        reg: RegisterAddress<T>,
        f: F,
    ) -> Result<(), PhyError>
    where
        T: From<u32>,
        u32: From<T>,
        F: Fn(&mut T),
    {
        let mut data = self.read(reg)?;
        f(&mut data);
        self.write(reg, data)
    }

    /// Clears `clear` and then sets `set`, on the raw value
    fn rmw<T>(
        &self,
        reg: RegisterAddress<T>,
        clear: u32,
        set: u32,
    ) -> Result<(), PhyError>
    where
        T: From<u32>,
        u32: From<T>,
    {
        let v = u32::from(self.read(reg)?);
        self.write(reg, T::from((v & !clear) | set))
    }
}

/// Opaque token for a held power-domain reference
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Wakeref(pub u32);

/// Power domains and panel self-refresh are owned by the rest of the display
/// driver; we only borrow them around PHY accesses.
pub trait DisplayPower {
    /// Takes a reference on the power domain that feeds `port`.  The
    /// domain is reference-counted and shared with other consumers.
    fn acquire(&self, port: Port) -> Result<Wakeref, PhyError>;
    fn release(&self, port: Port, wakeref: Wakeref);

    /// Pauses panel self-refresh on `port`, if it's active
    fn psr_pause(&self, port: Port);
    fn psr_resume(&self, port: Port);
}

/// Everything we need from a delay provider
pub trait Delay: DelayUs<u32> + DelayMs<u32> {}
impl<T: DelayUs<u32> + DelayMs<u32>> Delay for T {}

/// Polls `reg` once per microsecond until `done` is satisfied.  Returns the
/// final register value on success and `None` on timeout.
pub(crate) fn wait_us<R, D, T, F>(
    rw: &R,
    delay: &mut D,
    reg: RegisterAddress<T>,
    timeout_us: u32,
    done: F,
) -> Result<Option<T>, PhyError>
where
    R: DisplayRw,
    D: Delay,
    T: From<u32>,
    F: Fn(&T) -> bool,
{
    wait_custom(rw, delay, reg, timeout_us, 0, done)
}

/// Polls `reg` until `done` is satisfied: first once per microsecond for
/// `fast_us`, then once per millisecond for `slow_ms`.
pub(crate) fn wait_custom<R, D, T, F>(
    rw: &R,
    delay: &mut D,
    reg: RegisterAddress<T>,
    fast_us: u32,
    slow_ms: u32,
    done: F,
) -> Result<Option<T>, PhyError>
where
    R: DisplayRw,
    D: Delay,
    T: From<u32>,
    F: Fn(&T) -> bool,
{
    for _ in 0..fast_us {
        let v = rw.read(reg)?;
        if done(&v) {
            return Ok(Some(v));
        }
        delay.delay_us(1);
    }
    for _ in 0..slow_ms {
        let v = rw.read(reg)?;
        if done(&v) {
            return Ok(Some(v));
        }
        delay.delay_ms(1);
    }
    let v = rw.read(reg)?;
    Ok(if done(&v) { Some(v) } else { None })
}
