// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Register definitions for the CX0 PHY family
//!
//! There are two address spaces in play here.  The display engine's MMIO
//! space holds the per-port buffer control, clock control and message bus
//! registers; these are described as bitfields and accessed through
//! [`crate::DisplayRw`] with a typed [`RegisterAddress`].  The PHY's own
//! configuration space is only reachable by tunnelling byte transactions over
//! the message bus; addresses in that space are plain `u16` constants.

use bitfield::bitfield;
use core::marker::PhantomData;
use derive_more::{From, Into};

use crate::{Lane, Lanes, Port, Tx};

/// A typed MMIO register address.  The type parameter is the bitfield used to
/// interpret the register's 32-bit value.
pub struct RegisterAddress<T> {
    pub addr: u32,
    _phantom: PhantomData<T>,
}

impl<T> RegisterAddress<T> {
    pub const fn new(addr: u32) -> Self {
        Self {
            addr,
            _phantom: PhantomData,
        }
    }
}

// Manual impls: deriving would require `T: Copy`, which isn't needed for an
// address.
impl<T> Clone for RegisterAddress<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Copy for RegisterAddress<T> {}

impl<T> core::fmt::Debug for RegisterAddress<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "RegisterAddress({:#x})", self.addr)
    }
}

impl<T> PartialEq for RegisterAddress<T> {
    fn eq(&self, other: &Self) -> bool {
        self.addr == other.addr
    }
}
impl<T> Eq for RegisterAddress<T> {}

////////////////////////////////////////////////////////////////////////////////
// Message bus

/// Commands carried in the request (M2P) register
pub const M2P_COMMAND_WRITE_UNCOMMITTED: u8 = 0x1;
pub const M2P_COMMAND_WRITE_COMMITTED: u8 = 0x2;
pub const M2P_COMMAND_READ: u8 = 0x3;

/// Commands carried in the response (P2M) register
pub const P2M_COMMAND_READ_ACK: u8 = 0x4;
pub const P2M_COMMAND_WRITE_ACK: u8 = 0x5;

bitfield! {
    /// Host-to-PHY message bus request
    #[derive(Copy, Clone, Default, PartialEq, Eq, From, Into)]
    pub struct M2pMsgbusCtl(u32);
    impl Debug;
    pub transaction_pending, set_transaction_pending: 31;
    pub u8, command, set_command: 30, 27;
    pub u8, data, set_data: 23, 16;
    pub transaction_reset, set_transaction_reset: 15;
    pub u16, address, set_address: 11, 0;
}

bitfield! {
    /// PHY-to-host message bus response.  Writing all-ones clears it.
    #[derive(Copy, Clone, Default, PartialEq, Eq, From, Into)]
    pub struct P2mMsgbusStatus(u32);
    impl Debug;
    pub response_ready, set_response_ready: 31;
    pub u8, command, set_command: 30, 27;
    pub u8, data, set_data: 23, 16;
    pub error, set_error: 15;
}

////////////////////////////////////////////////////////////////////////////////
// Port buffer and clock control

bitfield! {
    #[derive(Copy, Clone, Default, PartialEq, Eq, From, Into)]
    pub struct PortBufCtl1(u32);
    impl Debug;
    pub soc_phy_ready, set_soc_phy_ready: 24;
    pub u8, port_width, set_port_width: 20, 18;
    pub port_reversal, set_port_reversal: 16;
    pub io_select_tbt, set_io_select_tbt: 11;
}

bitfield! {
    #[derive(Copy, Clone, Default, PartialEq, Eq, From, Into)]
    pub struct PortBufCtl2(u32);
    impl Debug;
    pub u8, lane0_new_state, set_lane0_new_state: 23, 20;
    pub u8, lane1_new_state, set_lane1_new_state: 19, 16;
    pub u8, power_state_ready, set_power_state_ready: 7, 4;
}

impl PortBufCtl2 {
    pub const fn pipe_reset_bit(lane: Lane) -> u32 {
        1 << (31 - lane as u32)
    }
    pub const fn phy_current_status_bit(lane: Lane) -> u32 {
        1 << (29 - lane as u32)
    }
    pub const fn powerdown_update_bit(lane: Lane) -> u32 {
        1 << (25 - lane as u32)
    }

    pub fn pipe_reset_mask(lanes: Lanes) -> u32 {
        lanes.iter().fold(0, |m, l| m | Self::pipe_reset_bit(l))
    }
    pub fn phy_current_status_mask(lanes: Lanes) -> u32 {
        lanes
            .iter()
            .fold(0, |m, l| m | Self::phy_current_status_bit(l))
    }
    pub fn powerdown_update_mask(lanes: Lanes) -> u32 {
        lanes
            .iter()
            .fold(0, |m, l| m | Self::powerdown_update_bit(l))
    }

    pub fn new_state(&self, lane: Lane) -> u8 {
        match lane {
            Lane::Lane0 => self.lane0_new_state(),
            Lane::Lane1 => self.lane1_new_state(),
        }
    }

    pub fn set_new_state(&mut self, lane: Lane, state: u8) {
        match lane {
            Lane::Lane0 => self.set_lane0_new_state(state),
            Lane::Lane1 => self.set_lane1_new_state(state),
        }
    }
}

bitfield! {
    #[derive(Copy, Clone, Default, PartialEq, Eq, From, Into)]
    pub struct PortBufCtl3(u32);
    impl Debug;
    pub u8, pll_lane_staggering_delay, set_pll_lane_staggering_delay: 15, 8;
    pub u8, power_state_active, set_power_state_active: 3, 0;
}

bitfield! {
    #[derive(Copy, Clone, Default, PartialEq, Eq, From, Into)]
    pub struct PortClockCtl(u32);
    impl Debug;
    pub lane0_pll_request, set_lane0_pll_request: 31;
    pub lane0_pll_ack, set_lane0_pll_ack: 30;
    pub lane0_refclk_request, set_lane0_refclk_request: 29;
    pub lane0_refclk_ack, set_lane0_refclk_ack: 28;
    pub lane1_pll_request, set_lane1_pll_request: 27;
    pub lane1_pll_ack, set_lane1_pll_ack: 26;
    pub lane1_refclk_request, set_lane1_refclk_request: 25;
    pub lane1_refclk_ack, set_lane1_refclk_ack: 24;
    pub tbt_clock_request, set_tbt_clock_request: 19;
    pub tbt_clock_ack, set_tbt_clock_ack: 18;
    pub u8, ddi_clock_select, set_ddi_clock_select: 15, 12;
    pub forward_clock_ungate, set_forward_clock_ungate: 10;
    pub lane1_phy_clock_select, set_lane1_phy_clock_select: 8;
    pub ssc_enable_plla, set_ssc_enable_plla: 1;
    pub ssc_enable_pllb, set_ssc_enable_pllb: 0;
}

impl PortClockCtl {
    pub const fn pll_request_bit(lane: Lane) -> u32 {
        1 << (31 - 4 * lane as u32)
    }
    pub const fn pll_ack_bit(lane: Lane) -> u32 {
        1 << (30 - 4 * lane as u32)
    }
    pub const fn refclk_request_bit(lane: Lane) -> u32 {
        1 << (29 - 4 * lane as u32)
    }
    pub const fn refclk_ack_bit(lane: Lane) -> u32 {
        1 << (28 - 4 * lane as u32)
    }

    pub fn pll_request_mask(lanes: Lanes) -> u32 {
        lanes.iter().fold(0, |m, l| m | Self::pll_request_bit(l))
    }
    pub fn pll_ack_mask(lanes: Lanes) -> u32 {
        lanes.iter().fold(0, |m, l| m | Self::pll_ack_bit(l))
    }
    pub fn refclk_request_mask(lanes: Lanes) -> u32 {
        lanes.iter().fold(0, |m, l| m | Self::refclk_request_bit(l))
    }
    pub fn refclk_ack_mask(lanes: Lanes) -> u32 {
        lanes.iter().fold(0, |m, l| m | Self::refclk_ack_bit(l))
    }
}

/// Values for [`PortClockCtl::ddi_clock_select`]
#[derive(Copy, Clone, Debug, PartialEq, Eq, num_derive::FromPrimitive)]
pub enum DdiClockSelect {
    None = 0x0,
    MaxPclk = 0x8,
    Div18Clk = 0x9,
    Tbt162 = 0xc,
    Tbt270 = 0xd,
    Tbt540 = 0xe,
    Tbt810 = 0xf,
}

bitfield! {
    /// Frequency of the port clock, in kHz, used by the hardware to check
    /// that the PLL came up where we asked it to.
    #[derive(Copy, Clone, Default, PartialEq, Eq, From, Into)]
    pub struct DdiClkValfreq(u32);
    impl Debug;
    pub u32, freq, set_freq: 31, 0;
}

/// MMIO addresses of the per-port registers
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PortRegs {
    base: u32,
}

impl PortRegs {
    pub const fn new(port: Port) -> Self {
        let base = match port {
            Port::A => 0x6_4000,
            Port::B => 0x6_4100,
            Port::Tc1 => 0x16_f200,
            Port::Tc2 => 0x16_f400,
            Port::Tc3 => 0x16_f600,
            Port::Tc4 => 0x16_f800,
        };
        Self { base }
    }

    pub const fn base(&self) -> u32 {
        self.base
    }

    pub const fn buf_ctl1(&self) -> RegisterAddress<PortBufCtl1> {
        RegisterAddress::new(self.base + 0x04)
    }
    pub const fn buf_ctl2(&self) -> RegisterAddress<PortBufCtl2> {
        RegisterAddress::new(self.base + 0x08)
    }
    pub const fn buf_ctl3(&self) -> RegisterAddress<PortBufCtl3> {
        RegisterAddress::new(self.base + 0x0c)
    }
    pub const fn clk_valfreq(&self) -> RegisterAddress<DdiClkValfreq> {
        RegisterAddress::new(self.base + 0x30)
    }
    pub const fn m2p_msgbus_ctl(
        &self,
        lane: Lane,
    ) -> RegisterAddress<M2pMsgbusCtl> {
        RegisterAddress::new(self.base + 0x40 + 4 * lane as u32)
    }
    pub const fn p2m_msgbus_status(
        &self,
        lane: Lane,
    ) -> RegisterAddress<P2mMsgbusStatus> {
        RegisterAddress::new(self.base + 0x48 + 4 * lane as u32)
    }
    pub const fn clock_ctl(&self) -> RegisterAddress<PortClockCtl> {
        RegisterAddress::new(self.base + 0xe0)
    }
}

////////////////////////////////////////////////////////////////////////////////
// PHY configuration space, reached over the message bus

/// PHY power states, as written to the `*_new_state` fields of BUF_CTL2
#[derive(Copy, Clone, Debug, PartialEq, Eq, num_derive::FromPrimitive)]
pub enum PowerState {
    /// P0
    Active = 0x0,
    /// P2
    Ready = 0x2,
    /// P2, held in reset
    Reset = 0x3,
    /// P2PG, the C10 power-gated state
    C10Disable = 0x9,
    /// P4PG, the C20 power-gated state
    C20Disable = 0xc,
}

pub const fn c10_vdr_pll(i: u16) -> u16 {
    0xc00 + i
}
pub const fn c10_vdr_cmn(i: u16) -> u16 {
    0xc20 + i
}
pub const fn c10_vdr_tx(i: u16) -> u16 {
    0xc30 + i
}

pub const PHY_C10_VDR_CONTROL1: u16 = 0xc70;
pub const C10_VDR_CTRL_MSGBUS_ACCESS: u8 = 1 << 2;
pub const C10_VDR_CTRL_MASTER_LANE: u8 = 1 << 1;
pub const C10_VDR_CTRL_UPDATE_CFG: u8 = 1 << 0;

pub const PHY_C10_VDR_CUSTOM_WIDTH: u16 = 0xd02;
pub const C10_VDR_CUSTOM_WIDTH_MASK: u8 = 0b11;
pub const C10_VDR_CUSTOM_WIDTH_8_10: u8 = 0;

/// Indirect window into the C20's 16-bit SRAM
pub const PHY_C20_WR_ADDRESS_L: u16 = 0xc02;
pub const PHY_C20_WR_ADDRESS_H: u16 = 0xc03;
pub const PHY_C20_WR_DATA_L: u16 = 0xc04;
pub const PHY_C20_WR_DATA_H: u16 = 0xc05;
pub const PHY_C20_RD_ADDRESS_L: u16 = 0xc06;
pub const PHY_C20_RD_ADDRESS_H: u16 = 0xc07;
pub const PHY_C20_RD_DATA_L: u16 = 0xc08;
pub const PHY_C20_RD_DATA_H: u16 = 0xc09;

pub const PHY_C20_VDR_CUSTOM_SERDES_RATE: u16 = 0xd00;
/// Set when context A holds the live configuration
pub const C20_CONTEXT_TOGGLE: u8 = 1 << 0;
pub const C20_DP_RATE_SHIFT: u8 = 1;
pub const C20_DP_RATE_MASK: u8 = 0b1111 << C20_DP_RATE_SHIFT;
pub const C20_IS_DP: u8 = 1 << 6;
pub const C20_IS_HDMI_FRL: u8 = 1 << 7;

pub const PHY_C20_VDR_HDMI_RATE: u16 = 0xd01;
pub const C20_HDMI_RATE_MASK: u8 = 0b111;

pub const PHY_C20_VDR_CUSTOM_WIDTH: u16 = 0xd02;
pub const C20_CUSTOM_WIDTH_MASK: u8 = 0b11;

/// Serializer width selected through `PHY_C20_VDR_CUSTOM_WIDTH`
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum C20CustomWidth {
    Bits10 = 0,
    Bits16 = 1,
    Bits20 = 2,
}

/// The two SRAM contexts of a C20.  One is live; the other is written and
/// then swapped in by flipping [`C20_CONTEXT_TOGGLE`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum C20Context {
    A,
    B,
}

impl C20Context {
    /// Decodes the live context from `PHY_C20_VDR_CUSTOM_SERDES_RATE`
    pub fn active(serdes_rate: u8) -> Self {
        if serdes_rate & C20_CONTEXT_TOGGLE != 0 {
            C20Context::A
        } else {
            C20Context::B
        }
    }

    pub fn other(self) -> Self {
        match self {
            C20Context::A => C20Context::B,
            C20Context::B => C20Context::A,
        }
    }

    /// Value of [`C20_CONTEXT_TOGGLE`] that makes this context live
    pub fn toggle_bit(self) -> u8 {
        match self {
            C20Context::A => C20_CONTEXT_TOGGLE,
            C20Context::B => 0,
        }
    }

    pub const fn tx(self, i: u16) -> u16 {
        match self {
            C20Context::A => 0xcf2e - i,
            C20Context::B => 0xcf2a - i,
        }
    }
    pub const fn cmn(self, i: u16) -> u16 {
        match self {
            C20Context::A => 0xcdaa - i,
            C20Context::B => 0xcda5 - i,
        }
    }
    pub const fn mplla(self, i: u16) -> u16 {
        match self {
            C20Context::A => 0xccf0 - i,
            C20Context::B => 0xcce5 - i,
        }
    }
    pub const fn mpllb(self, i: u16) -> u16 {
        match self {
            C20Context::A => 0xcb5a - i,
            C20Context::B => 0xcb4e - i,
        }
    }
}

/// Per-transmitter drive overrides
pub const fn phy_vdrovrd_pre(tx: Tx) -> u16 {
    0x400 + tx.offset()
}
pub const fn phy_vdrovrd_main(tx: Tx) -> u16 {
    0x401 + tx.offset()
}
pub const fn phy_vdrovrd_post(tx: Tx) -> u16 {
    0x402 + tx.offset()
}
pub const PHY_OVRD_LEVEL_MASK: u8 = 0b11_1111;

pub const fn phy_tx_control2(tx: Tx) -> u16 {
    0x408 + tx.offset()
}
pub const TX_CONTROL2_DISABLE_SINGLE_TX: u8 = 1 << 6;

pub const PHY_VDR_OVRD: u16 = 0xd71;
pub const VDR_OVRD_TX1: u8 = 1 << 0;
pub const VDR_OVRD_TX2: u8 = 1 << 2;
