// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Simulated display hardware for host-side tests.
//!
//! [`SimDisplay`] stands in for one port's MMIO block: the message bus
//! registers drive a model of the PHY's byte-addressed configuration space
//! (with the C20's SRAM window behind it), and the buffer and clock control
//! registers acknowledge requests the way the hardware does.  Knobs on each
//! model inject the faults the drivers are meant to survive.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use drv_cx0_phy::regs::{
    M2pMsgbusCtl, P2mMsgbusStatus, PortBufCtl1, PortBufCtl2, PortClockCtl,
    PortRegs, RegisterAddress, M2P_COMMAND_READ, M2P_COMMAND_WRITE_COMMITTED,
    M2P_COMMAND_WRITE_UNCOMMITTED, P2M_COMMAND_READ_ACK,
    P2M_COMMAND_WRITE_ACK, PHY_C20_RD_ADDRESS_H, PHY_C20_RD_ADDRESS_L,
    PHY_C20_RD_DATA_H, PHY_C20_RD_DATA_L, PHY_C20_WR_ADDRESS_H,
    PHY_C20_WR_ADDRESS_L, PHY_C20_WR_DATA_H, PHY_C20_WR_DATA_L,
};
use drv_cx0_phy::{
    Commit, DisplayPower, DisplayRw, Lane, PhyGeneration, Port, Wakeref,
};
use drv_hdmi_frl::rate::FrlRate;
use drv_hdmi_frl::scdc::{
    ScdcRw, SCDC_CONFIG_1, SCDC_STATUS_FLAGS_0, SCDC_STATUS_FLAGS_1,
    SCDC_STATUS_FLAGS_2, SCDC_UPDATE_0,
};
use drv_hdmi_frl::session::ModesetNotifier;
use drv_phy_err::PhyError;
use embedded_hal::blocking::delay::{DelayMs, DelayUs};
use num_traits::FromPrimitive;

/// One message bus transaction that reached the PHY
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BusOp {
    pub lane: Lane,
    pub addr: u16,
    /// Data written, or data returned for a read
    pub data: u8,
    /// `None` for reads
    pub commit: Option<Commit>,
}

/// One port's worth of display MMIO, with a CX0 PHY hanging off the
/// message bus.
pub struct SimDisplay {
    regs: PortRegs,
    generation: PhyGeneration,
    mmio: RefCell<BTreeMap<u32, u32>>,
    bytes: RefCell<[BTreeMap<u16, u8>; 2]>,
    sram: RefCell<[BTreeMap<u16, u16>; 2]>,
    log: RefCell<Vec<BusOp>>,
    resets: Cell<[u32; 2]>,

    /// The bus never drops its pending flag, not even across a reset
    pub stuck_pending: Cell<bool>,
    /// The next this-many transactions get an error response
    pub error_responses: Cell<u32>,
    /// The PHY never raises SOC ready
    pub soc_not_ready: Cell<bool>,
    /// PLL requests are never acknowledged
    pub stuck_pll_ack: Cell<bool>,
    /// TBT clock requests are never acknowledged
    pub stuck_tbt_ack: Cell<bool>,
    /// Any MMIO access to this address fails
    pub mmio_fault: Cell<Option<u32>>,
}

impl SimDisplay {
    pub fn new(port: Port, generation: PhyGeneration) -> Self {
        Self {
            regs: PortRegs::new(port),
            generation,
            mmio: RefCell::new(BTreeMap::new()),
            bytes: RefCell::new([BTreeMap::new(), BTreeMap::new()]),
            sram: RefCell::new([BTreeMap::new(), BTreeMap::new()]),
            log: RefCell::new(Vec::new()),
            resets: Cell::new([0; 2]),
            stuck_pending: Cell::new(false),
            error_responses: Cell::new(0),
            soc_not_ready: Cell::new(false),
            stuck_pll_ack: Cell::new(false),
            stuck_tbt_ack: Cell::new(false),
            mmio_fault: Cell::new(None),
        }
    }

    pub fn generation(&self) -> PhyGeneration {
        self.generation
    }

    /// Raw value of an MMIO register, as last written or updated
    pub fn mmio(&self, addr: u32) -> u32 {
        self.mmio.borrow().get(&addr).copied().unwrap_or(0)
    }

    pub fn set_mmio(&self, addr: u32, value: u32) {
        self.mmio.borrow_mut().insert(addr, value);
    }

    pub fn phy_byte(&self, lane: Lane, addr: u16) -> u8 {
        let bytes = self.bytes.borrow();
        bytes[lane as usize].get(&addr).copied().unwrap_or(0)
    }

    pub fn set_phy_byte(&self, lane: Lane, addr: u16, value: u8) {
        self.bytes.borrow_mut()[lane as usize].insert(addr, value);
    }

    pub fn sram_word(&self, lane: Lane, addr: u16) -> u16 {
        let sram = self.sram.borrow();
        sram[lane as usize].get(&addr).copied().unwrap_or(0)
    }

    pub fn set_sram_word(&self, lane: Lane, addr: u16, value: u16) {
        self.sram.borrow_mut()[lane as usize].insert(addr, value);
    }

    /// How many times the bus on `lane` has been reset
    pub fn resets(&self, lane: Lane) -> u32 {
        self.resets.get()[lane as usize]
    }

    /// Every transaction the PHY has completed, oldest first
    pub fn bus_log(&self) -> Vec<BusOp> {
        self.log.borrow().clone()
    }

    pub fn clear_bus_log(&self) {
        self.log.borrow_mut().clear();
    }

    fn lane_of(&self, addr: u32) -> Option<(Lane, bool)> {
        [Lane::Lane0, Lane::Lane1].into_iter().find_map(|lane| {
            if addr == self.regs.m2p_msgbus_ctl(lane).addr {
                Some((lane, true))
            } else if addr == self.regs.p2m_msgbus_status(lane).addr {
                Some((lane, false))
            } else {
                None
            }
        })
    }

    fn read_raw(&self, addr: u32) -> u32 {
        let v = self.mmio(addr);
        if addr == self.regs.buf_ctl1().addr {
            let mut r = PortBufCtl1(v);
            r.set_soc_phy_ready(!self.soc_not_ready.get());
            return r.into();
        }
        match self.lane_of(addr) {
            Some((_, true)) if self.stuck_pending.get() => {
                let mut r = M2pMsgbusCtl(v);
                r.set_transaction_pending(true);
                r.into()
            }
            _ => v,
        }
    }

    fn write_raw(&self, addr: u32, v: u32) {
        if addr == self.regs.buf_ctl2().addr {
            return self.write_buf_ctl2(v);
        }
        if addr == self.regs.clock_ctl().addr {
            return self.write_clock_ctl(v);
        }
        match self.lane_of(addr) {
            Some((lane, true)) => self.write_m2p(lane, v),
            Some((_, false)) if v == u32::MAX => self.set_mmio(addr, 0),
            _ => self.set_mmio(addr, v),
        }
    }

    /// Pipe reset is reflected in the status bits straight away, and
    /// powerdown updates complete as soon as they're requested.
    fn write_buf_ctl2(&self, v: u32) {
        let lanes = [Lane::Lane0, Lane::Lane1];
        let mut out = v;
        for lane in lanes {
            let status = PortBufCtl2::phy_current_status_bit(lane);
            if v & PortBufCtl2::pipe_reset_bit(lane) != 0 {
                out |= status;
            } else {
                out &= !status;
            }
            out &= !PortBufCtl2::powerdown_update_bit(lane);
        }
        self.set_mmio(self.regs.buf_ctl2().addr, out);
    }

    /// Every request bit is mirrored into its acknowledge bit
    fn write_clock_ctl(&self, v: u32) {
        let mut r = PortClockCtl(v);
        r.set_lane0_refclk_ack(r.lane0_refclk_request());
        r.set_lane1_refclk_ack(r.lane1_refclk_request());
        let pll = !self.stuck_pll_ack.get();
        r.set_lane0_pll_ack(pll && r.lane0_pll_request());
        r.set_lane1_pll_ack(pll && r.lane1_pll_request());
        let tbt = !self.stuck_tbt_ack.get();
        r.set_tbt_clock_ack(tbt && r.tbt_clock_request());
        self.set_mmio(self.regs.clock_ctl().addr, r.into());
    }

    fn write_m2p(&self, lane: Lane, v: u32) {
        let m2p = self.regs.m2p_msgbus_ctl(lane).addr;
        let p2m = self.regs.p2m_msgbus_status(lane).addr;
        let req = M2pMsgbusCtl(v);

        if req.transaction_reset() {
            let mut r = self.resets.get();
            r[lane as usize] += 1;
            self.resets.set(r);
            self.set_mmio(m2p, 0);
            self.set_mmio(p2m, 0);
            return;
        }
        if !req.transaction_pending() || self.stuck_pending.get() {
            self.set_mmio(m2p, v);
            return;
        }

        let mut done = req;
        done.set_transaction_pending(false);
        self.set_mmio(m2p, done.into());

        let mut status = P2mMsgbusStatus(0);
        let n = self.error_responses.get();
        if n > 0 {
            self.error_responses.set(n - 1);
            status.set_response_ready(true);
            status.set_error(true);
            self.set_mmio(p2m, status.into());
            return;
        }

        let addr = req.address();
        match req.command() {
            M2P_COMMAND_READ => {
                let data = self.phy_read(lane, addr);
                status.set_response_ready(true);
                status.set_command(P2M_COMMAND_READ_ACK);
                status.set_data(data);
                self.set_mmio(p2m, status.into());
                self.log_op(lane, addr, data, None);
            }
            M2P_COMMAND_WRITE_COMMITTED => {
                self.phy_write(lane, addr, req.data());
                status.set_response_ready(true);
                status.set_command(P2M_COMMAND_WRITE_ACK);
                self.set_mmio(p2m, status.into());
                self.log_op(lane, addr, req.data(), Some(Commit::Committed));
            }
            M2P_COMMAND_WRITE_UNCOMMITTED => {
                self.phy_write(lane, addr, req.data());
                let c = Some(Commit::Uncommitted);
                self.log_op(lane, addr, req.data(), c);
            }
            _ => {
                status.set_response_ready(true);
                status.set_error(true);
                self.set_mmio(p2m, status.into());
            }
        }
    }

    fn log_op(&self, lane: Lane, addr: u16, data: u8, commit: Option<Commit>) {
        self.log.borrow_mut().push(BusOp {
            lane,
            addr,
            data,
            commit,
        });
    }

    fn phy_read(&self, lane: Lane, addr: u16) -> u8 {
        self.phy_byte(lane, addr)
    }

    fn phy_write(&self, lane: Lane, addr: u16, data: u8) {
        self.set_phy_byte(lane, addr, data);
        if self.generation != PhyGeneration::C20 {
            return;
        }
        let word = |hi: u16, lo: u16| {
            u16::from_be_bytes([
                self.phy_byte(lane, hi),
                self.phy_byte(lane, lo),
            ])
        };
        match addr {
            PHY_C20_WR_DATA_H => {
                let a = word(PHY_C20_WR_ADDRESS_H, PHY_C20_WR_ADDRESS_L);
                let v = word(PHY_C20_WR_DATA_H, PHY_C20_WR_DATA_L);
                self.set_sram_word(lane, a, v);
            }
            PHY_C20_RD_ADDRESS_H => {
                let a = word(PHY_C20_RD_ADDRESS_H, PHY_C20_RD_ADDRESS_L);
                let [hi, lo] = self.sram_word(lane, a).to_be_bytes();
                self.set_phy_byte(lane, PHY_C20_RD_DATA_H, hi);
                self.set_phy_byte(lane, PHY_C20_RD_DATA_L, lo);
            }
            _ => (),
        }
    }

    fn check_fault(&self, addr: u32) -> Result<(), PhyError> {
        if self.mmio_fault.get() == Some(addr) {
            Err(PhyError::MmioFault { addr })
        } else {
            Ok(())
        }
    }
}

impl DisplayRw for SimDisplay {
    fn write<T>(
        &self,
        reg: RegisterAddress<T>,
        value: T,
    ) -> Result<(), PhyError>
    where
        u32: From<T>,
    {
        self.check_fault(reg.addr)?;
        self.write_raw(reg.addr, u32::from(value));
        Ok(())
    }

    fn read<T>(&self, reg: RegisterAddress<T>) -> Result<T, PhyError>
    where
        T: From<u32>,
    {
        self.check_fault(reg.addr)?;
        Ok(T::from(self.read_raw(reg.addr)))
    }
}

/// A delay provider that only keeps count
#[derive(Copy, Clone, Debug, Default)]
pub struct SimDelay {
    pub elapsed_us: u64,
}

impl DelayUs<u32> for SimDelay {
    fn delay_us(&mut self, us: u32) {
        self.elapsed_us += u64::from(us);
    }
}

impl DelayMs<u32> for SimDelay {
    fn delay_ms(&mut self, ms: u32) {
        self.elapsed_us += u64::from(ms) * 1000;
    }
}

/// Reference-counted power domains and PSR, for checking that every
/// acquire is paired with a release.
#[derive(Default)]
pub struct SimPower {
    held: Cell<u32>,
    acquires: Cell<u32>,
    psr_paused: Cell<u32>,
    psr_pauses: Cell<u32>,
    pub fail_acquire: Cell<bool>,
}

impl SimPower {
    /// References currently outstanding
    pub fn held(&self) -> u32 {
        self.held.get()
    }

    pub fn acquires(&self) -> u32 {
        self.acquires.get()
    }

    pub fn psr_paused(&self) -> u32 {
        self.psr_paused.get()
    }

    pub fn psr_pauses(&self) -> u32 {
        self.psr_pauses.get()
    }
}

impl DisplayPower for SimPower {
    fn acquire(&self, port: Port) -> Result<Wakeref, PhyError> {
        if self.fail_acquire.get() {
            return Err(PhyError::PowerDomainUnavailable { port: port.index() });
        }
        self.held.set(self.held.get() + 1);
        self.acquires.set(self.acquires.get() + 1);
        Ok(Wakeref(self.acquires.get()))
    }

    fn release(&self, _port: Port, _wakeref: Wakeref) {
        self.held.set(self.held.get() - 1);
    }

    fn psr_pause(&self, _port: Port) {
        self.psr_paused.set(self.psr_paused.get() + 1);
        self.psr_pauses.set(self.psr_pauses.get() + 1);
    }

    fn psr_resume(&self, _port: Port) {
        self.psr_paused.set(self.psr_paused.get() - 1);
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum SinkPhase {
    Idle,
    /// Walking the pattern script
    Lts3,
    /// All lanes reported done; waiting for the source to acknowledge
    Lts3Done,
    Started,
}

struct SinkState {
    ready: bool,
    max_gbps: u8,
    script: Vec<[u8; 4]>,
    retrains: u32,
    mute: bool,
    fail_io: bool,
    update: u8,
    lanes: [u8; 4],
    phase: SinkPhase,
    step: usize,
    config_writes: Vec<u8>,
}

const FLT_UPDATE: u8 = 1 << 5;
const FRL_START: u8 = 1 << 4;
const FLT_READY: u8 = 1 << 6;

/// An HDMI 2.1 sink's SCDC registers, scripted.
///
/// After each rate is written to CONFIG_1, the sink walks through its
/// pattern script (one entry per FLT_update) and then reports every lane
/// done.  Rates above `max_gbps` get a rate change request instead.
pub struct SimSink {
    state: RefCell<SinkState>,
}

impl SimSink {
    pub fn new(max_gbps: u8) -> Self {
        Self {
            state: RefCell::new(SinkState {
                ready: true,
                max_gbps,
                script: vec![[1; 4], [5, 6, 7, 8]],
                retrains: 0,
                mute: false,
                fail_io: false,
                update: 0,
                lanes: [0; 4],
                phase: SinkPhase::Idle,
                step: 0,
                config_writes: Vec::new(),
            }),
        }
    }

    /// Pattern requests the sink makes before it's satisfied
    pub fn set_script(&self, script: &[[u8; 4]]) {
        self.state.borrow_mut().script = script.to_vec();
    }

    pub fn set_ready(&self, ready: bool) {
        self.state.borrow_mut().ready = ready;
    }

    /// The sink never raises FLT_update
    pub fn set_mute(&self, mute: bool) {
        self.state.borrow_mut().mute = mute;
    }

    pub fn set_fail_io(&self, fail: bool) {
        self.state.borrow_mut().fail_io = fail;
    }

    /// Number of times LTSP sends the source back to LTS2
    pub fn set_retrains(&self, n: u32) {
        self.state.borrow_mut().retrains = n;
    }

    /// Every value written to CONFIG_1, oldest first
    pub fn config_writes(&self) -> Vec<u8> {
        self.state.borrow().config_writes.clone()
    }

    /// Rates the source has tried to train at, in Gbit/s
    pub fn rates_tried(&self) -> Vec<u8> {
        self.config_writes()
            .iter()
            .filter_map(|c| FrlRate::from_u8(c & 0xf))
            .map(FrlRate::gbps)
            .collect()
    }

    pub fn started(&self) -> bool {
        self.state.borrow().phase == SinkPhase::Started
    }
}

impl SinkState {
    fn raise_update(&mut self) {
        if !self.mute {
            self.update |= FLT_UPDATE;
        }
    }

    fn start_rate(&mut self, config: u8) {
        self.config_writes.push(config);
        self.step = 0;
        let gbps = FrlRate::from_u8(config & 0xf).map(FrlRate::gbps);
        if gbps.map_or(true, |g| g > self.max_gbps) {
            self.lanes = [0xf; 4];
            self.phase = SinkPhase::Idle;
        } else if let Some(first) = self.script.first() {
            self.lanes = *first;
            self.phase = SinkPhase::Lts3;
        } else {
            self.lanes = [0; 4];
            self.phase = SinkPhase::Lts3Done;
        }
        self.raise_update();
    }

    /// The source cleared FLT_update
    fn advance(&mut self) {
        match self.phase {
            SinkPhase::Lts3 => {
                self.step += 1;
                match self.script.get(self.step) {
                    Some(next) => self.lanes = *next,
                    None => {
                        self.lanes = [0; 4];
                        self.phase = SinkPhase::Lts3Done;
                    }
                }
                self.raise_update();
            }
            SinkPhase::Lts3Done if self.retrains > 0 => {
                self.retrains -= 1;
                self.phase = SinkPhase::Idle;
                self.raise_update();
            }
            SinkPhase::Lts3Done => {
                self.phase = SinkPhase::Started;
                self.update |= FRL_START;
            }
            SinkPhase::Idle | SinkPhase::Started => (),
        }
    }
}

impl ScdcRw for SimSink {
    fn read(&self, offset: u8) -> Result<u8, PhyError> {
        let s = self.state.borrow();
        if s.fail_io {
            return Err(PhyError::ScdcIo { offset });
        }
        Ok(match offset {
            SCDC_UPDATE_0 => s.update,
            SCDC_STATUS_FLAGS_0 if s.ready => FLT_READY,
            SCDC_STATUS_FLAGS_1 => s.lanes[0] | (s.lanes[1] << 4),
            SCDC_STATUS_FLAGS_2 => s.lanes[2] | (s.lanes[3] << 4),
            SCDC_CONFIG_1 => s.config_writes.last().copied().unwrap_or(0),
            _ => 0,
        })
    }

    fn write(&self, offset: u8, value: u8) -> Result<(), PhyError> {
        let mut s = self.state.borrow_mut();
        if s.fail_io {
            return Err(PhyError::ScdcIo { offset });
        }
        match offset {
            SCDC_CONFIG_1 => s.start_rate(value),
            SCDC_UPDATE_0 => {
                s.update &= !value;
                if value & FLT_UPDATE != 0 {
                    s.advance();
                }
            }
            _ => (),
        }
        Ok(())
    }
}

/// Remembers which ports were sent back through mode-set
#[derive(Default)]
pub struct SimNotifier {
    calls: RefCell<Vec<Port>>,
}

impl SimNotifier {
    pub fn calls(&self) -> Vec<Port> {
        self.calls.borrow().clone()
    }
}

impl ModesetNotifier for SimNotifier {
    fn redo_negotiation(&self, port: Port) {
        self.calls.borrow_mut().push(port);
    }
}
