// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! This crate provides an error type that is used by the display PHY and
//! the HDMI FRL negotiator.  It is factored into its own crate so that it
//! can be used by both `drv/cx0-phy` and `drv/hdmi-frl` (and by the
//! simulated hardware in `drv/mock-cx0-phy`) without introducing any
//! unneeded dependencies in each case.

#![cfg_attr(target_os = "none", no_std)]

/// The specific way in which a single message bus attempt went wrong.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BusFault {
    /// A previous transaction never cleared its pending flag
    IdleTimeout,
    /// The transaction we issued never cleared its pending flag
    PendingTimeout,
    /// No response arrived in the status register
    AckTimeout,
    /// The PHY flagged an error in its response
    ErrorResponse,
    /// The response carried a command other than the expected acknowledgment
    UnexpectedAck(u8),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PhyError {
    /// Every attempt at a message bus transaction failed; `cause` is the
    /// fault seen on the final attempt.
    MsgBusFailed {
        port: u8,
        lane: u8,
        addr: u16,
        cause: BusFault,
    },
    /// A single failed attempt, before retries have been exhausted
    MsgBus(BusFault),
    /// The display power domain for this port could not be acquired
    PowerDomainUnavailable {
        port: u8,
    },
    /// The target clock is outside the range of the selected PLL table
    NotSupported {
        clock: u32,
    },
    /// There is no PLL table for this output type on this PHY generation
    NoPllTable,
    /// Requested lane count is not 1, 2, 3 or 4
    InvalidLaneCount(u8),
    /// A register held a value that doesn't decode
    BadRegisterValue {
        addr: u32,
        value: u32,
    },
    /// The MMIO backend failed to complete an access
    MmioFault {
        addr: u32,
    },
    /// A side-channel (SCDC) access to the sink failed
    ScdcIo {
        offset: u8,
    },
    /// No FRL rate, with or without compression, carries the mode
    FrlCannotSupport,
}

impl From<BusFault> for PhyError {
    fn from(f: BusFault) -> Self {
        Self::MsgBus(f)
    }
}

/// What the mode-set orchestrator should do in response to an error.  Raw
/// errors never leave this subsystem; callers act on one of these instead.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Disposition {
    /// The requested mode cannot be set on this port
    ModesetRejected,
    /// Drop back to the legacy (TMDS) signalling path and retry the mode-set
    FallBackToLegacy,
    /// The link works, but some handshake was not confirmed
    LinkMarginal,
}

impl PhyError {
    pub fn disposition(&self) -> Disposition {
        match self {
            PhyError::ScdcIo { .. } | PhyError::FrlCannotSupport => {
                Disposition::FallBackToLegacy
            }
            PhyError::BadRegisterValue { .. } => Disposition::LinkMarginal,
            PhyError::MsgBusFailed { .. }
            | PhyError::MsgBus(..)
            | PhyError::PowerDomainUnavailable { .. }
            | PhyError::NotSupported { .. }
            | PhyError::NoPllTable
            | PhyError::InvalidLaneCount(..)
            | PhyError::MmioFault { .. } => Disposition::ModesetRejected,
        }
    }
}
