// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HDMI 2.1 Fixed Rate Link negotiation
//!
//! Bringing up an FRL link happens in three layers:
//!
//! - [`rate`] works out which link rates could carry a mode at all, with or
//!   without compression, using an external bandwidth model.
//! - [`train`] runs the link training handshake with the sink over SCDC
//!   ([`scdc`]) and the source's FRL training registers ([`regs`]).
//! - [`session`] tries candidates in order, remembers what trained, and
//!   turns FRL off for the sink when nothing works.
//!
//! [`link`] ties the result back to a PHY clock and PLL state.

#![cfg_attr(target_os = "none", no_std)]

pub mod config;
pub mod link;
pub mod rate;
pub mod regs;
pub mod scdc;
pub mod session;
pub mod train;

use ringbuf::*;

pub use drv_phy_err::{Disposition, PhyError};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Trace {
    None,
    Candidate {
        rate_gbps: u8,
        audio_rate: u32,
        compressed_bpp_x16: u16,
    },
    NoCandidates,
    TrainState {
        port: u8,
        state: train::TrainState,
    },
    LaneRequest {
        lane: u8,
        code: u8,
    },
    FfeChangeIgnored {
        lane: u8,
    },
    Timeout {
        port: u8,
        state: train::TrainState,
    },
    TrainFailed {
        port: u8,
        err: PhyError,
    },
    RetrainLimit {
        port: u8,
        rate_gbps: u8,
    },
    Memoized {
        port: u8,
        rate_gbps: u8,
    },
    FrlDisabled {
        port: u8,
    },
    SessionReset {
        port: u8,
    },
}
ringbuf!(Trace, 64, Trace::None);
