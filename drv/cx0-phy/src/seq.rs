// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! PHY bring-up and tear-down
//!
//! [`Cx0Phy::enable`] walks a port from [`SeqState::Idle`] to
//! [`SeqState::Locked`]:
//!
//! ```text
//!   Idle -> BusPrepared -> LaneReset -> PowerReady -> PllProgrammed
//!        -> ClockRequested -> Locked
//! ```
//!
//! The only hard failures are a power domain that can't be acquired and
//! errors from the message bus or MMIO backend.  Every other handshake is
//! bounded: if the hardware doesn't answer in time we note it in
//! [`Warnings`], log it, and carry on.  The caller gets the accumulated
//! warnings back as a [`LinkHealth`].

use bitflags::bitflags;
use ringbuf::ringbuf_entry_root as ringbuf_entry;
use serde::{Deserialize, Serialize};

use crate::config::PhyConfig;
use crate::msgbus::{MsgBus, PhyBus};
use crate::pll::{self, C10PllState, C20PllState, PllState};
use crate::regs::{
    phy_tx_control2, phy_vdrovrd_main, phy_vdrovrd_post, phy_vdrovrd_pre,
    DdiClockSelect, PortBufCtl2, PortClockCtl, PortRegs, PowerState,
    RegisterAddress, C10_VDR_CTRL_MSGBUS_ACCESS, C10_VDR_CTRL_UPDATE_CFG,
    PHY_C10_VDR_CONTROL1, PHY_OVRD_LEVEL_MASK, PHY_VDR_OVRD,
    TX_CONTROL2_DISABLE_SINGLE_TX, VDR_OVRD_TX1, VDR_OVRD_TX2,
};
use crate::{
    wait_custom, wait_us, Commit, Delay, Disposition, DisplayPower,
    DisplayRw, Lane, Lanes, LinkRequest, OutputType, PhyError,
    PhyGeneration, Port, Trace, Tx, Wakeref,
};

/// Where a port is in its bring-up sequence
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SeqState {
    Idle,
    BusPrepared,
    LaneReset,
    PowerReady,
    PllProgrammed,
    ClockRequested,
    Locked,
}

bitflags! {
    /// Handshakes that timed out without aborting the sequence
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct Warnings: u32 {
        const SOC_READY = 1 << 0;
        const PIPE_RESET_START = 1 << 1;
        const REFCLK_ACK = 1 << 2;
        const POWERDOWN_UPDATE = 1 << 3;
        const RESET_END = 1 << 4;
        const PLL_ACK = 1 << 5;
        const PLL_DISABLE_ACK = 1 << 6;
        const TBT_ACK = 1 << 7;
        /// A requested drive level wasn't in the table
        const LEVEL_CLAMPED = 1 << 8;
        /// The PLL read back something other than what we programmed
        const PLL_STATE_MISMATCH = 1 << 9;
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LinkHealth {
    Nominal,
    Marginal(Warnings),
}

impl From<Warnings> for LinkHealth {
    fn from(w: Warnings) -> Self {
        if w.is_empty() {
            LinkHealth::Nominal
        } else {
            LinkHealth::Marginal(w)
        }
    }
}

impl LinkHealth {
    pub fn warnings(&self) -> Warnings {
        match self {
            LinkHealth::Nominal => Warnings::empty(),
            LinkHealth::Marginal(w) => *w,
        }
    }

    /// A marginal link still counts as up, but the orchestrator is told
    pub fn disposition(&self) -> Option<Disposition> {
        match self {
            LinkHealth::Nominal => None,
            LinkHealth::Marginal(_) => Some(Disposition::LinkMarginal),
        }
    }
}

/// Drive settings for one `(swing, pre-emphasis)` pair
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelEntry {
    pub swing: u8,
    pub pre_emphasis: u8,
    pub pre: u8,
    pub main: u8,
    pub post: u8,
}

/// Requested swing and pre-emphasis indices for one logical TX lane
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct LevelRequest {
    pub swing: u8,
    pub pre_emphasis: u8,
}

/// A drive level table along with what each logical lane wants from it
#[derive(Copy, Clone, Debug)]
pub struct SignalLevels<'t> {
    pub table: &'t [LevelEntry],
    pub lanes: [LevelRequest; 4],
}

impl SignalLevels<'_> {
    /// Looks up the entry for `ln`.  Requests that aren't in the table get
    /// the last (strongest) entry, and `true` to say so.
    fn lookup(&self, ln: u8) -> Option<(LevelEntry, bool)> {
        let want = self.lanes[usize::from(ln)];
        match self.table.iter().find(|e| {
            e.swing == want.swing && e.pre_emphasis == want.pre_emphasis
        }) {
            Some(e) => Some((*e, false)),
            None => self.table.last().map(|e| (*e, true)),
        }
    }
}

/// What we last told one physical TX lane to do
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LaneState {
    pub power_state: PowerState,
    pub voltage_swing_index: u8,
    pub pre_emphasis_index: u8,
}

impl Default for LaneState {
    fn default() -> Self {
        Self {
            power_state: PowerState::Reset,
            voltage_swing_index: 0,
            pre_emphasis_index: 0,
        }
    }
}

/// Holds the port's power domain and keeps panel self-refresh paused for as
/// long as it lives.
pub struct PhyTransaction<'a, P: DisplayPower> {
    power: &'a P,
    port: Port,
    wakeref: Wakeref,
}

impl<'a, P: DisplayPower> PhyTransaction<'a, P> {
    pub fn begin(power: &'a P, port: Port) -> Result<Self, PhyError> {
        let wakeref = power.acquire(port).map_err(|_| {
            ringbuf_entry!(Trace::PowerDomainFailed { port: port.index() });
            PhyError::PowerDomainUnavailable { port: port.index() }
        })?;
        power.psr_pause(port);
        Ok(Self {
            power,
            port,
            wakeref,
        })
    }
}

impl<P: DisplayPower> Drop for PhyTransaction<'_, P> {
    fn drop(&mut self) {
        self.power.psr_resume(self.port);
        self.power.release(self.port, self.wakeref);
    }
}

/// One port's PHY
pub struct Cx0Phy<'a, R, D, P> {
    port: Port,
    regs: PortRegs,
    rw: &'a R,
    delay: D,
    power: &'a P,
    generation: PhyGeneration,
    config: &'a PhyConfig,
    state: SeqState,
    lanes: [LaneState; 4],
}

impl<'a, R: DisplayRw, D: Delay, P: DisplayPower> Cx0Phy<'a, R, D, P> {
    pub fn new(
        port: Port,
        rw: &'a R,
        delay: D,
        power: &'a P,
        config: &'a PhyConfig,
    ) -> Self {
        Self {
            port,
            regs: PortRegs::new(port),
            rw,
            delay,
            power,
            generation: PhyGeneration::detect(port, config),
            config,
            state: SeqState::Idle,
            lanes: [LaneState::default(); 4],
        }
    }

    pub fn port(&self) -> Port {
        self.port
    }

    pub fn generation(&self) -> PhyGeneration {
        self.generation
    }

    pub fn state(&self) -> SeqState {
        self.state
    }

    /// State of transmitter `tx` on PHY lane `lane`
    pub fn lane_state(&self, lane: Lane, tx: Tx) -> LaneState {
        self.lanes[Self::lane_index(lane, tx)]
    }

    fn lane_index(lane: Lane, tx: Tx) -> usize {
        lane as usize * 2 + tx as usize
    }

    pub(crate) fn regs(&self) -> PortRegs {
        self.regs
    }

    pub(crate) fn rw(&self) -> &'a R {
        self.rw
    }

    pub(crate) fn power(&self) -> &'a P {
        self.power
    }

    pub(crate) fn config(&self) -> &'a PhyConfig {
        self.config
    }

    pub(crate) fn bus(&mut self) -> MsgBus<'_, R, D> {
        MsgBus::new(self.rw, &mut self.delay, self.port, self.config.msgbus)
    }

    pub(crate) fn set_state(&mut self, state: SeqState) {
        ringbuf_entry!(Trace::SeqState {
            port: self.port.index(),
            state
        });
        self.state = state;
    }

    /// Records `step` in `warnings` if `ok` is false
    pub(crate) fn check(
        &self,
        ok: bool,
        step: Warnings,
        warnings: &mut Warnings,
    ) {
        if !ok {
            ringbuf_entry!(Trace::HandshakeTimeout {
                port: self.port.index(),
                step
            });
            *warnings |= step;
        }
    }

    /// Polls until the bits of `mask` in `reg` are all set (or all clear,
    /// if `set` is false).  Returns false on timeout.
    pub(crate) fn wait_mask<T>(
        &mut self,
        reg: RegisterAddress<T>,
        mask: u32,
        set: bool,
        timeout_us: u32,
        timeout_ms: u32,
    ) -> Result<bool, PhyError>
    where
        T: From<u32> + Copy,
        u32: From<T>,
    {
        let want = if set { mask } else { 0 };
        let v = wait_custom(
            self.rw,
            &mut self.delay,
            reg,
            timeout_us,
            timeout_ms,
            |r| u32::from(*r) & mask == want,
        )?;
        Ok(v.is_some())
    }

    /// Brings the link up with `pll`, which must have been computed for
    /// this port's PHY generation.
    pub fn enable(
        &mut self,
        req: &LinkRequest,
        pll: &PllState,
        levels: &SignalLevels<'_>,
    ) -> Result<LinkHealth, PhyError> {
        req.check_lanes()?;
        if pll.generation() != self.generation {
            return Err(PhyError::NoPllTable);
        }
        let _txn = PhyTransaction::begin(self.power, self.port)?;
        let mut warnings = Warnings::empty();
        let t = self.config.timeouts;

        let soc_ready = wait_us(
            self.rw,
            &mut self.delay,
            self.regs.buf_ctl1(),
            t.soc_ready_us,
            |r| r.soc_phy_ready(),
        )?;
        self.check(soc_ready.is_some(), Warnings::SOC_READY, &mut warnings);
        self.set_state(SeqState::BusPrepared);

        self.lane_reset(req, &mut warnings)?;
        self.set_state(SeqState::LaneReset);

        self.powerdown_change(Lanes::Both, PowerState::Ready, &mut warnings)?;
        self.set_state(SeqState::PowerReady);

        self.program_pll(req, pll)?;
        self.set_state(SeqState::PllProgrammed);

        self.program_tx_lanes(req)?;
        self.apply_signal_levels(req, levels, &mut warnings)?;
        self.program_clock_ctl(req, pll)?;
        self.rw
            .write_with(self.regs.clk_valfreq(), |r| r.set_freq(pll.clock()))?;
        self.set_state(SeqState::ClockRequested);

        let master = req.master_lane();
        let request = PortClockCtl::pll_request_bit(master);
        self.rw.rmw(self.regs.clock_ctl(), 0, request)?;
        let locked = self.wait_mask(
            self.regs.clock_ctl(),
            PortClockCtl::pll_ack_bit(master),
            true,
            t.pll_enable_us,
            0,
        )?;
        self.check(locked, Warnings::PLL_ACK, &mut warnings);
        self.set_state(SeqState::Locked);

        Ok(warnings.into())
    }

    /// Asserts pipe reset, brings up the reference clock, and releases
    /// reset with both lanes parked in the Ready state.
    fn lane_reset(
        &mut self,
        req: &LinkRequest,
        warnings: &mut Warnings,
    ) -> Result<(), PhyError> {
        let t = self.config.timeouts;
        let owned = req.owned_lanes();
        let buf_ctl2 = self.regs.buf_ctl2();

        // Reset always covers both lanes, whatever the link owns
        self.rw
            .rmw(buf_ctl2, 0, PortBufCtl2::pipe_reset_mask(Lanes::Both))?;
        let started = self.wait_mask(
            buf_ctl2,
            PortBufCtl2::phy_current_status_mask(Lanes::Both),
            true,
            t.reset_start_us,
            0,
        )?;
        self.check(started, Warnings::PIPE_RESET_START, warnings);

        let clock_ctl = self.regs.clock_ctl();
        self.rw
            .rmw(clock_ctl, 0, PortClockCtl::refclk_request_mask(owned))?;
        let refclk = self.wait_mask(
            clock_ctl,
            PortClockCtl::refclk_ack_mask(owned),
            true,
            t.refclk_ack_us,
            0,
        )?;
        self.check(refclk, Warnings::REFCLK_ACK, warnings);

        self.powerdown_change(Lanes::Both, PowerState::Reset, warnings)?;

        self.rw.modify(buf_ctl2, |r| {
            r.set_power_state_ready(PowerState::Ready as u8)
        })?;
        let stagger = self.config.pll_lane_staggering_delay;
        self.rw.modify(self.regs.buf_ctl3(), |r| {
            r.set_power_state_active(PowerState::Active as u8);
            r.set_pll_lane_staggering_delay(stagger);
        })?;

        self.rw
            .rmw(buf_ctl2, PortBufCtl2::pipe_reset_mask(Lanes::Both), 0)?;
        let ended = self.wait_mask(
            buf_ctl2,
            PortBufCtl2::phy_current_status_mask(Lanes::Both),
            false,
            0,
            t.reset_end_ms,
        )?;
        self.check(ended, Warnings::RESET_END, warnings);
        Ok(())
    }

    /// Moves `lanes` into `state`.  The message bus must be idle on each
    /// lane first; a lane that isn't gets its bus reset.
    pub(crate) fn powerdown_change(
        &mut self,
        lanes: Lanes,
        state: PowerState,
        warnings: &mut Warnings,
    ) -> Result<(), PhyError> {
        let timing = self.config.msgbus;
        for lane in lanes.iter() {
            let idle = wait_custom(
                self.rw,
                &mut self.delay,
                self.regs.m2p_msgbus_ctl(lane),
                timing.fast_us,
                timing.slow_ms,
                |r| !r.transaction_pending(),
            )?;
            if idle.is_none() {
                self.bus().reset(lane)?;
            }
        }

        let buf_ctl2 = self.regs.buf_ctl2();
        self.rw.modify(buf_ctl2, |r| {
            for lane in lanes.iter() {
                r.set_new_state(lane, state as u8);
            }
        })?;

        let mask = PortBufCtl2::powerdown_update_mask(lanes);
        let us = self.config.timeouts.powerdown_update_us;
        let clear = self.wait_mask(buf_ctl2, mask, false, us, 0)?;
        self.check(clear, Warnings::POWERDOWN_UPDATE, warnings);
        self.rw.rmw(buf_ctl2, 0, mask)?;
        let applied = self.wait_mask(buf_ctl2, mask, false, us, 0)?;
        self.check(applied, Warnings::POWERDOWN_UPDATE, warnings);

        for lane in lanes.iter() {
            for tx in Tx::BOTH {
                self.lanes[Self::lane_index(lane, tx)].power_state = state;
            }
        }
        Ok(())
    }

    fn program_pll(
        &mut self,
        req: &LinkRequest,
        pll: &PllState,
    ) -> Result<(), PhyError> {
        let master = req.master_lane();
        let output = req.output_type;
        let mut bus = self.bus();
        match pll {
            PllState::C10(s) => s.program(&mut bus, master),
            PllState::C20(s) => s.program(&mut bus, master, output),
        }
    }

    /// Runs `f` with the bus, wrapped in the C10's message bus access
    /// window when this is a C10.
    fn with_vdr_window<F>(
        &mut self,
        req: &LinkRequest,
        f: F,
    ) -> Result<(), PhyError>
    where
        F: FnOnce(&mut MsgBus<'_, R, D>) -> Result<(), PhyError>,
    {
        let c10 = self.generation == PhyGeneration::C10;
        let owned = req.owned_lanes();
        let master = req.master_lane();
        let mut bus = self.bus();
        if c10 {
            bus.rmw(
                owned,
                PHY_C10_VDR_CONTROL1,
                0,
                C10_VDR_CTRL_MSGBUS_ACCESS,
                Commit::Committed,
            )?;
        }
        f(&mut bus)?;
        if c10 {
            bus.rmw(
                master.into(),
                PHY_C10_VDR_CONTROL1,
                0,
                C10_VDR_CTRL_UPDATE_CFG,
                Commit::Committed,
            )?;
        }
        Ok(())
    }

    /// Enables the TX lanes the link uses and disables the rest of the
    /// owned ones.
    fn program_tx_lanes(&mut self, req: &LinkRequest) -> Result<(), PhyError> {
        let owned = req.owned_lanes();
        let used: heapless::Vec<(Lane, Tx), 4> =
            (0..req.lane_count).map(|ln| req.tx_location(ln)).collect();
        self.with_vdr_window(req, |bus| {
            for lane in owned.iter() {
                for tx in Tx::BOTH {
                    let (clear, set) = if used.contains(&(lane, tx)) {
                        (TX_CONTROL2_DISABLE_SINGLE_TX, 0)
                    } else {
                        (0, TX_CONTROL2_DISABLE_SINGLE_TX)
                    };
                    bus.rmw(
                        lane.into(),
                        phy_tx_control2(tx),
                        clear,
                        set,
                        Commit::Committed,
                    )?;
                }
            }
            Ok(())
        })
    }

    /// Programs drive levels for every lane of the link and switches the
    /// owned lanes over to them.
    pub fn set_signal_levels(
        &mut self,
        req: &LinkRequest,
        levels: &SignalLevels<'_>,
    ) -> Result<LinkHealth, PhyError> {
        req.check_lanes()?;
        let _txn = PhyTransaction::begin(self.power, self.port)?;
        let mut warnings = Warnings::empty();
        self.apply_signal_levels(req, levels, &mut warnings)?;
        Ok(warnings.into())
    }

    fn apply_signal_levels(
        &mut self,
        req: &LinkRequest,
        levels: &SignalLevels<'_>,
        warnings: &mut Warnings,
    ) -> Result<(), PhyError> {
        let port = self.port.index();
        let mut plan: heapless::Vec<(Lane, Tx, LevelEntry), 4> =
            heapless::Vec::new();
        for ln in 0..req.lane_count {
            let Some((entry, clamped)) = levels.lookup(ln) else {
                ringbuf_entry!(Trace::LevelClamped { port, lane: ln });
                *warnings |= Warnings::LEVEL_CLAMPED;
                continue;
            };
            if clamped {
                ringbuf_entry!(Trace::LevelClamped { port, lane: ln });
                *warnings |= Warnings::LEVEL_CLAMPED;
            }
            let (lane, tx) = req.tx_location(ln);
            // Capacity matches the largest legal lane count
            let _ = plan.push((lane, tx, entry));
        }

        let owned = req.owned_lanes();
        self.with_vdr_window(req, |bus| {
            for (lane, tx, e) in plan.iter() {
                let l = Lanes::from(*lane);
                let m = PHY_OVRD_LEVEL_MASK;
                let c = Commit::Committed;
                bus.rmw(l, phy_vdrovrd_pre(*tx), m, e.pre & m, c)?;
                bus.rmw(l, phy_vdrovrd_main(*tx), m, e.main & m, c)?;
                bus.rmw(l, phy_vdrovrd_post(*tx), m, e.post & m, c)?;
            }
            bus.rmw(
                owned,
                PHY_VDR_OVRD,
                0,
                VDR_OVRD_TX1 | VDR_OVRD_TX2,
                Commit::Committed,
            )
        })?;

        for (lane, tx, e) in plan.iter() {
            let s = &mut self.lanes[Self::lane_index(*lane, *tx)];
            s.voltage_swing_index = e.swing;
            s.pre_emphasis_index = e.pre_emphasis;
        }
        Ok(())
    }

    fn program_clock_ctl(
        &mut self,
        req: &LinkRequest,
        pll: &PllState,
    ) -> Result<(), PhyError> {
        let reversal = req.lane_reversal;
        self.rw
            .modify(self.regs.buf_ctl1(), |r| r.set_port_reversal(reversal))?;

        let select = if req.output_type == OutputType::HdmiFrl {
            DdiClockSelect::Div18Clk
        } else {
            DdiClockSelect::MaxPclk
        };
        let (ssc_a, ssc_b) = match pll {
            PllState::C10(s) => (false, s.ssc_enabled()),
            PllState::C20(s) => {
                let ssc = s.ssc_enabled();
                (ssc && s.uses_mplla(), ssc && !s.uses_mplla())
            }
        };
        self.rw.modify(self.regs.clock_ctl(), |r| {
            r.set_lane1_phy_clock_select(reversal);
            r.set_forward_clock_ungate(true);
            r.set_ddi_clock_select(select as u8);
            r.set_ssc_enable_plla(ssc_a);
            r.set_ssc_enable_pllb(ssc_b);
        })
    }

    /// Powers the PHY down and gates its clocks
    pub fn disable(&mut self) -> Result<LinkHealth, PhyError> {
        let _txn = PhyTransaction::begin(self.power, self.port)?;
        let mut warnings = Warnings::empty();

        let off = match self.generation {
            PhyGeneration::C10 => PowerState::C10Disable,
            PhyGeneration::C20 => PowerState::C20Disable,
        };
        self.powerdown_change(Lanes::Both, off, &mut warnings)?;

        let clock_ctl = self.regs.clock_ctl();
        self.rw.rmw(
            clock_ctl,
            PortClockCtl::pll_request_mask(Lanes::Both)
                | PortClockCtl::refclk_request_mask(Lanes::Both),
            0,
        )?;
        self.rw.write_with(self.regs.clk_valfreq(), |r| r.set_freq(0))?;

        let acks = PortClockCtl::pll_ack_mask(Lanes::Both)
            | PortClockCtl::refclk_ack_mask(Lanes::Both);
        let us = self.config.timeouts.pll_disable_us;
        let released = self.wait_mask(clock_ctl, acks, false, us, 0)?;
        self.check(released, Warnings::PLL_DISABLE_ACK, &mut warnings);

        self.rw.modify(clock_ctl, |r| {
            r.set_ddi_clock_select(DdiClockSelect::None as u8)
        })?;
        self.rw
            .modify(clock_ctl, |r| r.set_forward_clock_ungate(false))?;

        self.set_state(SeqState::Idle);
        Ok(warnings.into())
    }

    /// Reads back whatever PLL state is live in the hardware
    pub fn read_pll(&mut self, master: Lane) -> Result<PllState, PhyError> {
        let _txn = PhyTransaction::begin(self.power, self.port)?;
        let generation = self.generation;
        let mut bus = self.bus();
        Ok(match generation {
            PhyGeneration::C10 => {
                PllState::C10(C10PllState::read_out(&mut bus, master)?)
            }
            PhyGeneration::C20 => {
                PllState::C20(C20PllState::read_out(&mut bus, master)?)
            }
        })
    }

    /// Checks that the clock the hardware would produce matches `expected`.
    pub fn verify_pll(
        &mut self,
        master: Lane,
        expected: &PllState,
    ) -> Result<Warnings, PhyError> {
        let actual = pll::calc_port_clock(&self.read_pll(master)?);
        let expected = pll::calc_port_clock(expected);
        if actual == expected {
            Ok(Warnings::empty())
        } else {
            ringbuf_entry!(Trace::PllMismatch {
                port: self.port.index(),
                expected,
                actual
            });
            Ok(Warnings::PLL_STATE_MISMATCH)
        }
    }
}
