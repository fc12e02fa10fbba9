// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Source-side FRL training registers

use bitfield::bitfield;
use derive_more::{From, Into};
use drv_cx0_phy::regs::{PortRegs, RegisterAddress};
use drv_cx0_phy::Port;

bitfield! {
    #[derive(Copy, Clone, Default, PartialEq, Eq, From, Into)]
    pub struct HdmiFrlCfg(u32);
    impl Debug;
    pub enable, set_enable: 31;
    pub training_enable, set_training_enable: 30;
    pub training_complete, set_training_complete: 29;
    pub four_lanes, set_four_lanes: 8;
    pub u8, ffe, set_ffe: 7, 4;
    pub u8, rate, set_rate: 3, 0;
}

bitfield! {
    /// Pattern the source transmits on each lane during LTS3
    #[derive(Copy, Clone, Default, PartialEq, Eq, From, Into)]
    pub struct HdmiFrlTrain(u32);
    impl Debug;
}

impl HdmiFrlTrain {
    pub fn lane(&self, lane: u8) -> u8 {
        ((self.0 >> (4 * u32::from(lane))) & 0xf) as u8
    }

    pub fn set_lane(&mut self, lane: u8, pattern: u8) {
        let shift = 4 * u32::from(lane);
        let v = u32::from(pattern & 0xf) << shift;
        self.0 = (self.0 & !(0xf << shift)) | v;
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FrlRegs {
    base: u32,
}

impl FrlRegs {
    pub const fn new(port: Port) -> Self {
        Self {
            base: PortRegs::new(port).base(),
        }
    }

    pub const fn cfg(&self) -> RegisterAddress<HdmiFrlCfg> {
        RegisterAddress::new(self.base + 0x60)
    }

    pub const fn train(&self) -> RegisterAddress<HdmiFrlTrain> {
        RegisterAddress::new(self.base + 0x64)
    }
}
