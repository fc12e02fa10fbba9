// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Thunderbolt alt-mode clocking
//!
//! In TBT mode the PHY's own PLL isn't used; the port clock comes from the
//! shared TBT PLL, and all we do is select the right tap and ask for it.

use ringbuf::ringbuf_entry_root as ringbuf_entry;

use crate::regs::DdiClockSelect;
use crate::seq::{Cx0Phy, LinkHealth, PhyTransaction, SeqState, Warnings};
use crate::{Delay, DisplayPower, DisplayRw, PhyError, Trace};

const TBT_CLOCK_REQUEST: u32 = 1 << 19;
const TBT_CLOCK_ACK: u32 = 1 << 18;

fn tbt_clock_select(clock: u32) -> Result<DdiClockSelect, PhyError> {
    match clock {
        162_000 => Ok(DdiClockSelect::Tbt162),
        270_000 => Ok(DdiClockSelect::Tbt270),
        540_000 => Ok(DdiClockSelect::Tbt540),
        810_000 => Ok(DdiClockSelect::Tbt810),
        _ => Err(PhyError::NotSupported { clock }),
    }
}

impl<R: DisplayRw, D: Delay, P: DisplayPower> Cx0Phy<'_, R, D, P> {
    pub fn enable_tbt(&mut self, clock: u32) -> Result<LinkHealth, PhyError> {
        let select = tbt_clock_select(clock)?;
        let _txn = PhyTransaction::begin(self.power(), self.port())?;
        let mut warnings = Warnings::empty();
        let regs = self.regs();

        ringbuf_entry!(Trace::TbtClock {
            port: self.port().index(),
            clock
        });
        self.rw().modify(regs.clock_ctl(), |r| {
            r.set_ddi_clock_select(select as u8);
            r.set_forward_clock_ungate(true);
        })?;
        self.rw().rmw(regs.clock_ctl(), 0, TBT_CLOCK_REQUEST)?;

        let us = self.config().timeouts.tbt_enable_us;
        let acked =
            self.wait_mask(regs.clock_ctl(), TBT_CLOCK_ACK, true, us, 0)?;
        self.check(acked, Warnings::TBT_ACK, &mut warnings);

        self.rw()
            .write_with(regs.clk_valfreq(), |r| r.set_freq(clock))?;
        self.set_state(SeqState::Locked);
        Ok(warnings.into())
    }

    pub fn disable_tbt(&mut self) -> Result<LinkHealth, PhyError> {
        let _txn = PhyTransaction::begin(self.power(), self.port())?;
        let mut warnings = Warnings::empty();
        let regs = self.regs();

        self.rw().rmw(regs.clock_ctl(), TBT_CLOCK_REQUEST, 0)?;
        let us = self.config().timeouts.tbt_disable_us;
        let released =
            self.wait_mask(regs.clock_ctl(), TBT_CLOCK_ACK, false, us, 0)?;
        self.check(released, Warnings::TBT_ACK, &mut warnings);

        self.rw().modify(regs.clock_ctl(), |r| {
            r.set_ddi_clock_select(DdiClockSelect::None as u8);
            r.set_forward_clock_ungate(false);
        })?;
        self.rw().write_with(regs.clk_valfreq(), |r| r.set_freq(0))?;
        self.set_state(SeqState::Idle);
        Ok(warnings.into())
    }
}
