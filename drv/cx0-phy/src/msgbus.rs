// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Message bus transport into PHY configuration space
//!
//! Each PHY lane has a request register (M2P) and a response register
//! (P2M).  A transaction waits for the bus to go idle, writes a command into
//! M2P and, for reads and committed writes, waits for the PHY to post an
//! acknowledgment in P2M.  Any fault along the way resets the bus and the
//! whole transaction is retried, up to [`MSGBUS_ATTEMPTS`] times in total.

use crate::config::MsgBusTiming;
use crate::regs::{
    P2mMsgbusStatus, PortRegs, M2P_COMMAND_READ,
    M2P_COMMAND_WRITE_COMMITTED, M2P_COMMAND_WRITE_UNCOMMITTED,
    P2M_COMMAND_READ_ACK, P2M_COMMAND_WRITE_ACK,
};
use crate::{
    wait_custom, BusFault, Commit, Delay, DisplayRw, Lane, Lanes, PhyError,
    Port, Trace,
};
use ringbuf::ringbuf_entry_root;

/// Attempts per transaction.  Every failed attempt resets the bus once, so a
/// wedged bus sees exactly this many resets before we give up.
pub const MSGBUS_ATTEMPTS: u8 = 3;

/// Byte-level access to PHY configuration space.
pub trait PhyBus {
    fn read(&mut self, lane: Lane, addr: u16) -> Result<u8, PhyError>;

    fn write(
        &mut self,
        lane: Lane,
        addr: u16,
        data: u8,
        commit: Commit,
    ) -> Result<(), PhyError>;

    /// Writes the same byte to each lane in `lanes`, one after the other
    fn write_lanes(
        &mut self,
        lanes: Lanes,
        addr: u16,
        data: u8,
        commit: Commit,
    ) -> Result<(), PhyError> {
        for lane in lanes.iter() {
            self.write(lane, addr, data, commit)?;
        }
        Ok(())
    }

    /// Read-modify-write on each lane in `lanes`.  A lane whose value would
    /// not change is not written.
    fn rmw(
        &mut self,
        lanes: Lanes,
        addr: u16,
        clear: u8,
        set: u8,
        commit: Commit,
    ) -> Result<(), PhyError> {
        for lane in lanes.iter() {
            let old = self.read(lane, addr)?;
            let new = (old & !clear) | set;
            if new != old {
                self.write(lane, addr, new, commit)?;
            }
        }
        Ok(())
    }
}

impl<B: PhyBus + ?Sized> PhyBus for &mut B {
    fn read(&mut self, lane: Lane, addr: u16) -> Result<u8, PhyError> {
        (**self).read(lane, addr)
    }

    fn write(
        &mut self,
        lane: Lane,
        addr: u16,
        data: u8,
        commit: Commit,
    ) -> Result<(), PhyError> {
        (**self).write(lane, addr, data, commit)
    }
}

/// Outcome of one message bus operation, along with how many attempts it
/// took (1 if it succeeded immediately).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TransactionResult<T> {
    pub value: Result<T, PhyError>,
    pub attempts: u8,
}

/// The message bus for one port.  It borrows the MMIO backend and the delay
/// provider for the duration of a higher-level operation; nothing else may
/// touch this port's bus registers meanwhile.
pub struct MsgBus<'a, R, D> {
    rw: &'a R,
    delay: &'a mut D,
    port: Port,
    regs: PortRegs,
    timing: MsgBusTiming,
}

impl<'a, R: DisplayRw, D: Delay> MsgBus<'a, R, D> {
    pub fn new(
        rw: &'a R,
        delay: &'a mut D,
        port: Port,
        timing: MsgBusTiming,
    ) -> Self {
        Self {
            rw,
            delay,
            port,
            regs: PortRegs::new(port),
            timing,
        }
    }

    pub fn transact_read(
        &mut self,
        lane: Lane,
        addr: u16,
    ) -> TransactionResult<u8> {
        self.transact(lane, addr, |bus| bus.read_once(lane, addr))
    }

    pub fn transact_write(
        &mut self,
        lane: Lane,
        addr: u16,
        data: u8,
        commit: Commit,
    ) -> TransactionResult<()> {
        self.transact(lane, addr, |bus| {
            bus.write_once(lane, addr, data, commit)
        })
    }

    /// Runs `once` until it succeeds or we run out of attempts.  Only bus
    /// faults are retried; anything else (e.g. an MMIO failure) is returned
    /// as-is.
    fn transact<T, F>(
        &mut self,
        lane: Lane,
        addr: u16,
        mut once: F,
    ) -> TransactionResult<T>
    where
        F: FnMut(&mut Self) -> Result<T, PhyError>,
    {
        let port = self.port.index();
        let mut cause = BusFault::IdleTimeout;
        for attempt in 1..=MSGBUS_ATTEMPTS {
            match once(self) {
                Ok(v) => {
                    return TransactionResult {
                        value: Ok(v),
                        attempts: attempt,
                    }
                }
                Err(PhyError::MsgBus(fault)) => {
                    ringbuf_entry_root!(Trace::BusAttemptFailed {
                        port,
                        lane: lane as u8,
                        addr,
                        cause: fault,
                    });
                    cause = fault;
                }
                Err(e) => {
                    return TransactionResult {
                        value: Err(e),
                        attempts: attempt,
                    }
                }
            }
        }
        ringbuf_entry_root!(Trace::BusRetriesExhausted {
            port,
            lane: lane as u8,
            addr,
        });
        TransactionResult {
            value: Err(PhyError::MsgBusFailed {
                port,
                lane: lane as u8,
                addr,
                cause,
            }),
            attempts: MSGBUS_ATTEMPTS,
        }
    }

    fn read_once(&mut self, lane: Lane, addr: u16) -> Result<u8, PhyError> {
        self.wait_idle(lane)?;

        self.rw.write_with(self.regs.m2p_msgbus_ctl(lane), |r| {
            r.set_transaction_pending(true);
            r.set_command(M2P_COMMAND_READ);
            r.set_address(addr);
        })?;

        let status = match self.wait_for_ack(lane, P2M_COMMAND_READ_ACK) {
            Ok(s) => s,
            Err(e) => {
                self.reset(lane)?;
                return Err(e);
            }
        };
        self.clear_response(lane)?;
        Ok(status.data())
    }

    fn write_once(
        &mut self,
        lane: Lane,
        addr: u16,
        data: u8,
        commit: Commit,
    ) -> Result<(), PhyError> {
        self.wait_idle(lane)?;

        let command = match commit {
            Commit::Committed => M2P_COMMAND_WRITE_COMMITTED,
            Commit::Uncommitted => M2P_COMMAND_WRITE_UNCOMMITTED,
        };
        self.rw.write_with(self.regs.m2p_msgbus_ctl(lane), |r| {
            r.set_transaction_pending(true);
            r.set_command(command);
            r.set_data(data);
            r.set_address(addr);
        })?;

        // Wait for the PHY to consume the request
        let taken = wait_custom(
            self.rw,
            &mut *self.delay,
            self.regs.m2p_msgbus_ctl(lane),
            0,
            self.timing.slow_ms,
            |r| !r.transaction_pending(),
        )?;
        if taken.is_none() {
            self.reset(lane)?;
            return Err(BusFault::PendingTimeout.into());
        }

        match commit {
            Commit::Committed => {
                if let Err(e) = self.wait_for_ack(lane, P2M_COMMAND_WRITE_ACK)
                {
                    self.reset(lane)?;
                    return Err(e);
                }
            }
            Commit::Uncommitted => {
                let status = self.rw.read(self.regs.p2m_msgbus_status(lane))?;
                if status.error() {
                    self.reset(lane)?;
                    return Err(BusFault::ErrorResponse.into());
                }
            }
        }
        self.clear_response(lane)
    }

    /// Waits for any earlier transaction on `lane` to drain, resetting the
    /// bus if it doesn't.
    fn wait_idle(&mut self, lane: Lane) -> Result<(), PhyError> {
        let idle = wait_custom(
            self.rw,
            &mut *self.delay,
            self.regs.m2p_msgbus_ctl(lane),
            self.timing.fast_us,
            self.timing.slow_ms,
            |r| !r.transaction_pending(),
        )?;
        if idle.is_none() {
            self.reset(lane)?;
            return Err(BusFault::IdleTimeout.into());
        }
        Ok(())
    }

    fn wait_for_ack(
        &mut self,
        lane: Lane,
        expected: u8,
    ) -> Result<P2mMsgbusStatus, PhyError> {
        let status = wait_custom(
            self.rw,
            &mut *self.delay,
            self.regs.p2m_msgbus_status(lane),
            self.timing.fast_us,
            self.timing.slow_ms,
            |s| s.response_ready(),
        )?
        .ok_or(BusFault::AckTimeout)?;

        if status.error() {
            return Err(BusFault::ErrorResponse.into());
        }
        if status.command() != expected {
            return Err(BusFault::UnexpectedAck(status.command()).into());
        }
        Ok(status)
    }

    /// Forces the lane's bus back to idle and clears any stale response
    pub fn reset(&mut self, lane: Lane) -> Result<(), PhyError> {
        let port = self.port.index();
        ringbuf_entry_root!(Trace::BusReset {
            port,
            lane: lane as u8
        });

        let m2p = self.regs.m2p_msgbus_ctl(lane);
        self.rw.write_with(m2p, |r| r.set_transaction_reset(true))?;
        let cleared = wait_custom(
            self.rw,
            &mut *self.delay,
            m2p,
            0,
            self.timing.slow_ms,
            |r| !r.transaction_reset(),
        )?;
        if cleared.is_none() {
            ringbuf_entry_root!(Trace::BusResetStuck {
                port,
                lane: lane as u8
            });
        }
        self.clear_response(lane)
    }

    fn clear_response(&mut self, lane: Lane) -> Result<(), PhyError> {
        self.rw.write(
            self.regs.p2m_msgbus_status(lane),
            P2mMsgbusStatus::from(u32::MAX),
        )
    }

    pub fn port(&self) -> Port {
        self.port
    }
}

impl<R: DisplayRw, D: Delay> PhyBus for MsgBus<'_, R, D> {
    fn read(&mut self, lane: Lane, addr: u16) -> Result<u8, PhyError> {
        self.transact_read(lane, addr).value
    }

    fn write(
        &mut self,
        lane: Lane,
        addr: u16,
        data: u8,
        commit: Commit,
    ) -> Result<(), PhyError> {
        self.transact_write(lane, addr, data, commit).value
    }
}
