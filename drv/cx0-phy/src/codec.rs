// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Register codecs for the two PHY generations
//!
//! The C10 exposes a flat byte-addressed space, so a 16-bit quantity is just
//! two adjacent bytes (low byte first).  The C20 keeps its configuration in
//! a 16-bit SRAM that can only be reached through an address/data window in
//! the byte space.  [`RegisterCodec`] papers over the difference.

use crate::msgbus::PhyBus;
use crate::regs::{
    PHY_C20_RD_ADDRESS_H, PHY_C20_RD_ADDRESS_L, PHY_C20_RD_DATA_H,
    PHY_C20_RD_DATA_L, PHY_C20_WR_ADDRESS_H, PHY_C20_WR_ADDRESS_L,
    PHY_C20_WR_DATA_H, PHY_C20_WR_DATA_L,
};
use crate::{Commit, Lane, Lanes, PhyError, PhyGeneration};

pub trait RegisterCodec {
    fn read_word<B: PhyBus>(
        &self,
        bus: &mut B,
        lane: Lane,
        addr: u16,
    ) -> Result<u16, PhyError>;

    /// Writes `value` to `addr` on each lane in turn.  `commit` applies to
    /// the final byte of each lane's sequence; earlier bytes are staged.
    fn write_word<B: PhyBus>(
        &self,
        bus: &mut B,
        lanes: Lanes,
        addr: u16,
        value: u16,
        commit: Commit,
    ) -> Result<(), PhyError>;

    fn rmw<B: PhyBus>(
        &self,
        bus: &mut B,
        lanes: Lanes,
        addr: u16,
        clear: u16,
        set: u16,
        commit: Commit,
    ) -> Result<(), PhyError> {
        for lane in lanes.iter() {
            let old = self.read_word(bus, lane, addr)?;
            let new = (old & !clear) | set;
            if new != old {
                self.write_word(bus, lane.into(), addr, new, commit)?;
            }
        }
        Ok(())
    }
}

/// Direct 8-bit addressing, as used by the C10
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SchemeA;

impl SchemeA {
    /// Writes `bytes` to consecutive addresses starting at `addr`.  Only the
    /// final byte carries `commit`, so the PHY applies the whole burst at
    /// once.
    pub fn write_burst<B: PhyBus>(
        &self,
        bus: &mut B,
        lane: Lane,
        addr: u16,
        bytes: &[u8],
        commit: Commit,
    ) -> Result<(), PhyError> {
        let last = bytes.len().saturating_sub(1);
        for (i, b) in bytes.iter().enumerate() {
            let c = if i == last { commit } else { Commit::Uncommitted };
            bus.write(lane, addr + i as u16, *b, c)?;
        }
        Ok(())
    }

    pub fn read_burst<B: PhyBus>(
        &self,
        bus: &mut B,
        lane: Lane,
        addr: u16,
        out: &mut [u8],
    ) -> Result<(), PhyError> {
        for (i, b) in out.iter_mut().enumerate() {
            *b = bus.read(lane, addr + i as u16)?;
        }
        Ok(())
    }
}

impl RegisterCodec for SchemeA {
    fn read_word<B: PhyBus>(
        &self,
        bus: &mut B,
        lane: Lane,
        addr: u16,
    ) -> Result<u16, PhyError> {
        let mut b = [0u8; 2];
        self.read_burst(bus, lane, addr, &mut b)?;
        Ok(u16::from_le_bytes(b))
    }

    fn write_word<B: PhyBus>(
        &self,
        bus: &mut B,
        lanes: Lanes,
        addr: u16,
        value: u16,
        commit: Commit,
    ) -> Result<(), PhyError> {
        for lane in lanes.iter() {
            self.write_burst(bus, lane, addr, &value.to_le_bytes(), commit)?;
        }
        Ok(())
    }
}

/// Windowed 16-bit SRAM addressing, as used by the C20
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SchemeB;

impl RegisterCodec for SchemeB {
    fn read_word<B: PhyBus>(
        &self,
        bus: &mut B,
        lane: Lane,
        addr: u16,
    ) -> Result<u16, PhyError> {
        let [lo, hi] = addr.to_le_bytes();
        bus.write(lane, PHY_C20_RD_ADDRESS_L, lo, Commit::Uncommitted)?;
        bus.write(lane, PHY_C20_RD_ADDRESS_H, hi, Commit::Committed)?;
        let hi = bus.read(lane, PHY_C20_RD_DATA_H)?;
        let lo = bus.read(lane, PHY_C20_RD_DATA_L)?;
        Ok(u16::from_be_bytes([hi, lo]))
    }

    fn write_word<B: PhyBus>(
        &self,
        bus: &mut B,
        lanes: Lanes,
        addr: u16,
        value: u16,
        commit: Commit,
    ) -> Result<(), PhyError> {
        let [addr_lo, addr_hi] = addr.to_le_bytes();
        let [data_lo, data_hi] = value.to_le_bytes();
        for lane in lanes.iter() {
            bus.write(lane, PHY_C20_WR_ADDRESS_L, addr_lo, Commit::Uncommitted)?;
            bus.write(lane, PHY_C20_WR_ADDRESS_H, addr_hi, Commit::Uncommitted)?;
            bus.write(lane, PHY_C20_WR_DATA_L, data_lo, Commit::Uncommitted)?;
            bus.write(lane, PHY_C20_WR_DATA_H, data_hi, commit)?;
        }
        Ok(())
    }
}

/// The codec for one port, chosen once from its PHY generation
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Codec {
    C10(SchemeA),
    C20(SchemeB),
}

impl From<PhyGeneration> for Codec {
    fn from(g: PhyGeneration) -> Self {
        match g {
            PhyGeneration::C10 => Codec::C10(SchemeA),
            PhyGeneration::C20 => Codec::C20(SchemeB),
        }
    }
}

impl RegisterCodec for Codec {
    fn read_word<B: PhyBus>(
        &self,
        bus: &mut B,
        lane: Lane,
        addr: u16,
    ) -> Result<u16, PhyError> {
        match self {
            Codec::C10(a) => a.read_word(bus, lane, addr),
            Codec::C20(b) => b.read_word(bus, lane, addr),
        }
    }

    fn write_word<B: PhyBus>(
        &self,
        bus: &mut B,
        lanes: Lanes,
        addr: u16,
        value: u16,
        commit: Commit,
    ) -> Result<(), PhyError> {
        match self {
            Codec::C10(a) => a.write_word(bus, lanes, addr, value, commit),
            Codec::C20(b) => b.write_word(bus, lanes, addr, value, commit),
        }
    }
}
