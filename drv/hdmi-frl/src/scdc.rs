// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Status and Control Data Channel registers used for FRL training

use bitfield::bitfield;
use derive_more::{From, Into};
use num_traits::FromPrimitive;

use crate::PhyError;

/// Byte access to the sink's SCDC registers (an I2C side channel)
pub trait ScdcRw {
    fn read(&self, offset: u8) -> Result<u8, PhyError>;
    fn write(&self, offset: u8, value: u8) -> Result<(), PhyError>;
}

pub const SCDC_UPDATE_0: u8 = 0x10;
pub const SCDC_CONFIG_1: u8 = 0x31;
pub const SCDC_STATUS_FLAGS_0: u8 = 0x40;
pub const SCDC_STATUS_FLAGS_1: u8 = 0x41;
pub const SCDC_STATUS_FLAGS_2: u8 = 0x42;

bitfield! {
    /// Sink-side update flags.  Flags are cleared by writing 1s back.
    #[derive(Copy, Clone, Default, PartialEq, Eq, From, Into)]
    pub struct ScdcUpdate0(u8);
    impl Debug;
    pub flt_update, set_flt_update: 5;
    pub frl_start, set_frl_start: 4;
}

bitfield! {
    #[derive(Copy, Clone, Default, PartialEq, Eq, From, Into)]
    pub struct ScdcConfig1(u8);
    impl Debug;
    pub u8, ffe_levels, set_ffe_levels: 7, 4;
    pub u8, frl_rate, set_frl_rate: 3, 0;
}

bitfield! {
    #[derive(Copy, Clone, Default, PartialEq, Eq, From, Into)]
    pub struct ScdcStatusFlags0(u8);
    impl Debug;
    pub flt_ready, set_flt_ready: 6;
}

/// Link training pattern request from the sink, one per lane
#[derive(Copy, Clone, Debug, PartialEq, Eq, num_derive::FromPrimitive)]
pub enum LtpRequest {
    /// The lane is trained
    None = 0x0,
    AllOnes = 0x1,
    AllZeros = 0x2,
    NyquistClock = 0x3,
    TxDdeCompliance = 0x4,
    Lfsr0 = 0x5,
    Lfsr1 = 0x6,
    Lfsr2 = 0x7,
    Lfsr3 = 0x8,
    /// Sink wants a different TX FFE level
    FfeChange = 0xe,
    /// Sink wants a lower link rate
    RateChange = 0xf,
}

impl LtpRequest {
    /// Decodes a lane nibble, or returns the raw code if it's reserved
    pub fn decode(code: u8) -> Result<Self, u8> {
        Self::from_u8(code).ok_or(code)
    }

    pub fn is_pattern(self) -> bool {
        !matches!(
            self,
            LtpRequest::None | LtpRequest::FfeChange | LtpRequest::RateChange
        )
    }
}

/// Reads the pattern request nibble of every lane
pub fn lane_requests<S: ScdcRw>(scdc: &S) -> Result<[u8; 4], PhyError> {
    let a = scdc.read(SCDC_STATUS_FLAGS_1)?;
    let b = scdc.read(SCDC_STATUS_FLAGS_2)?;
    Ok([a & 0xf, a >> 4, b & 0xf, b >> 4])
}
