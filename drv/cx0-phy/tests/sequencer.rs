// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use drv_cx0_phy::config::PhyConfig;
use drv_cx0_phy::pll::{calc_state, PllState};
use drv_cx0_phy::regs::{
    c10_vdr_pll, phy_tx_control2, phy_vdrovrd_main, phy_vdrovrd_post,
    DdiClockSelect, PortClockCtl, PortRegs, PowerState, C20_CONTEXT_TOGGLE,
    PHY_C20_VDR_CUSTOM_SERDES_RATE, PHY_VDR_OVRD,
    TX_CONTROL2_DISABLE_SINGLE_TX, VDR_OVRD_TX1, VDR_OVRD_TX2,
};
use drv_cx0_phy::seq::{
    Cx0Phy, LevelEntry, LevelRequest, LinkHealth, SeqState, SignalLevels,
    Warnings,
};
use drv_cx0_phy::{
    Disposition, Lane, LinkRequest, OutputType, PhyError, PhyGeneration, Port,
    Tx,
};
use drv_mock_cx0_phy::{SimDelay, SimDisplay, SimPower};

const TABLE: [LevelEntry; 3] = [
    LevelEntry {
        swing: 0,
        pre_emphasis: 0,
        pre: 0x00,
        main: 0x26,
        post: 0x00,
    },
    LevelEntry {
        swing: 1,
        pre_emphasis: 1,
        pre: 0x00,
        main: 0x22,
        post: 0x06,
    },
    LevelEntry {
        swing: 3,
        pre_emphasis: 0,
        pre: 0x00,
        main: 0x3f,
        post: 0x00,
    },
];

fn levels() -> SignalLevels<'static> {
    SignalLevels {
        table: &TABLE,
        lanes: [LevelRequest::default(); 4],
    }
}

fn dp(lane_count: u8, lane_reversal: bool) -> LinkRequest {
    LinkRequest {
        output_type: OutputType::Dp,
        pixel_clock: 270_000,
        bit_depth: 8,
        lane_count,
        ycbcr420: false,
        compression_requested: false,
        lane_reversal,
    }
}

fn c10_dp_pll(cfg: &PhyConfig) -> PllState {
    calc_state(PhyGeneration::C10, OutputType::Dp, 270_000, &cfg.pll).unwrap()
}

fn tx_disabled(sim: &SimDisplay, lane: Lane, tx: Tx) -> bool {
    sim.phy_byte(lane, phy_tx_control2(tx)) & TX_CONTROL2_DISABLE_SINGLE_TX
        != 0
}

#[test]
fn enable_and_disable_c10_dp() {
    let cfg = PhyConfig::default();
    let sim = SimDisplay::new(Port::A, PhyGeneration::C10);
    let power = SimPower::default();
    let pll = c10_dp_pll(&cfg);
    let regs = PortRegs::new(Port::A);

    let mut phy =
        Cx0Phy::new(Port::A, &sim, SimDelay::default(), &power, &cfg);
    assert_eq!(phy.generation(), PhyGeneration::C10);
    assert_eq!(phy.state(), SeqState::Idle);

    let health = phy.enable(&dp(4, false), &pll, &levels()).unwrap();
    assert_eq!(health, LinkHealth::Nominal);
    assert_eq!(phy.state(), SeqState::Locked);
    assert_eq!(power.held(), 0);
    assert_eq!(power.psr_paused(), 0);
    assert_eq!(power.acquires(), 1);
    assert_eq!(power.psr_pauses(), 1);

    for lane in [Lane::Lane0, Lane::Lane1] {
        for tx in Tx::BOTH {
            assert!(!tx_disabled(&sim, lane, tx));
            let s = phy.lane_state(lane, tx);
            assert_eq!(s.power_state, PowerState::Ready);
            assert_eq!(s.voltage_swing_index, 0);
            assert_eq!(sim.phy_byte(lane, phy_vdrovrd_main(tx)), 0x26);
        }
        assert_eq!(
            sim.phy_byte(lane, PHY_VDR_OVRD),
            VDR_OVRD_TX1 | VDR_OVRD_TX2
        );
    }

    let clk = PortClockCtl(sim.mmio(regs.clock_ctl().addr));
    assert!(clk.lane0_pll_request());
    assert!(clk.lane0_pll_ack());
    assert!(clk.forward_clock_ungate());
    assert_eq!(clk.ddi_clock_select(), DdiClockSelect::MaxPclk as u8);
    assert_eq!(sim.mmio(regs.clk_valfreq().addr), 270_000);

    assert_eq!(phy.verify_pll(Lane::Lane0, &pll), Ok(Warnings::empty()));
    let back = phy.read_pll(Lane::Lane0).unwrap();
    assert_eq!(back.clock(), 270_000);

    let health = phy.disable().unwrap();
    assert_eq!(health, LinkHealth::Nominal);
    assert_eq!(phy.state(), SeqState::Idle);
    assert_eq!(
        phy.lane_state(Lane::Lane1, Tx::Tx2).power_state,
        PowerState::C10Disable
    );
    let clk = PortClockCtl(sim.mmio(regs.clock_ctl().addr));
    assert!(!clk.lane0_pll_request());
    assert!(!clk.lane0_refclk_request());
    assert!(!clk.forward_clock_ungate());
    assert_eq!(clk.ddi_clock_select(), DdiClockSelect::None as u8);
    assert_eq!(sim.mmio(regs.clk_valfreq().addr), 0);
    assert_eq!(power.held(), 0);
    assert_eq!(power.psr_paused(), 0);
}

#[test]
fn single_lane_disables_the_spare_transmitter() {
    let cfg = PhyConfig::default();
    let sim = SimDisplay::new(Port::A, PhyGeneration::C10);
    let power = SimPower::default();
    let pll = c10_dp_pll(&cfg);

    let mut phy =
        Cx0Phy::new(Port::A, &sim, SimDelay::default(), &power, &cfg);
    phy.enable(&dp(1, false), &pll, &levels()).unwrap();
    assert!(!tx_disabled(&sim, Lane::Lane0, Tx::Tx1));
    assert!(tx_disabled(&sim, Lane::Lane0, Tx::Tx2));
}

#[test]
fn reversed_link_stays_on_lane_one() {
    let cfg = PhyConfig::default();
    let sim = SimDisplay::new(Port::B, PhyGeneration::C10);
    let power = SimPower::default();
    let pll = c10_dp_pll(&cfg);

    let mut phy =
        Cx0Phy::new(Port::B, &sim, SimDelay::default(), &power, &cfg);
    phy.enable(&dp(2, true), &pll, &levels()).unwrap();

    assert!(!tx_disabled(&sim, Lane::Lane1, Tx::Tx1));
    assert!(!tx_disabled(&sim, Lane::Lane1, Tx::Tx2));
    let tx_regs = [phy_tx_control2(Tx::Tx1), phy_tx_control2(Tx::Tx2)];
    assert!(!sim
        .bus_log()
        .iter()
        .any(|op| op.lane == Lane::Lane0 && tx_regs.contains(&op.addr)));

    let regs = PortRegs::new(Port::B);
    let clk = PortClockCtl(sim.mmio(regs.clock_ctl().addr));
    assert!(clk.lane1_pll_ack());
    assert!(clk.lane1_phy_clock_select());
    assert_eq!(phy.verify_pll(Lane::Lane1, &pll), Ok(Warnings::empty()));
}

#[test]
fn unknown_drive_level_is_clamped() {
    let cfg = PhyConfig::default();
    let sim = SimDisplay::new(Port::A, PhyGeneration::C10);
    let power = SimPower::default();
    let pll = c10_dp_pll(&cfg);

    let mut lv = levels();
    lv.lanes[1] = LevelRequest {
        swing: 1,
        pre_emphasis: 1,
    };
    lv.lanes[3] = LevelRequest {
        swing: 2,
        pre_emphasis: 3,
    };
    let mut phy =
        Cx0Phy::new(Port::A, &sim, SimDelay::default(), &power, &cfg);
    let health = phy.enable(&dp(4, false), &pll, &lv).unwrap();
    assert_eq!(health, LinkHealth::Marginal(Warnings::LEVEL_CLAMPED));
    assert_eq!(health.disposition(), Some(Disposition::LinkMarginal));

    // Logical lane 1 is TX2 of PHY lane 0, lane 3 is TX2 of PHY lane 1
    assert_eq!(sim.phy_byte(Lane::Lane0, phy_vdrovrd_post(Tx::Tx2)), 0x06);
    assert_eq!(sim.phy_byte(Lane::Lane1, phy_vdrovrd_main(Tx::Tx2)), 0x3f);
    assert_eq!(phy.lane_state(Lane::Lane1, Tx::Tx2).voltage_swing_index, 3);

    // Levels can be changed again later on their own
    lv.lanes[3] = LevelRequest::default();
    let health = phy.set_signal_levels(&dp(4, false), &lv).unwrap();
    assert_eq!(health, LinkHealth::Nominal);
    assert_eq!(sim.phy_byte(Lane::Lane1, phy_vdrovrd_main(Tx::Tx2)), 0x26);
    assert_eq!(power.held(), 0);
}

#[test]
fn timeouts_are_warnings() {
    let cfg = PhyConfig::default();
    let sim = SimDisplay::new(Port::A, PhyGeneration::C10);
    sim.soc_not_ready.set(true);
    sim.stuck_pll_ack.set(true);
    let power = SimPower::default();
    let pll = c10_dp_pll(&cfg);

    let mut phy =
        Cx0Phy::new(Port::A, &sim, SimDelay::default(), &power, &cfg);
    let health = phy.enable(&dp(4, false), &pll, &levels()).unwrap();
    assert_eq!(
        health,
        LinkHealth::Marginal(Warnings::SOC_READY | Warnings::PLL_ACK)
    );
    assert_eq!(phy.state(), SeqState::Locked);
}

#[test]
fn bus_failure_mid_sequence_releases_power() {
    let cfg = PhyConfig::default();
    let sim = SimDisplay::new(Port::A, PhyGeneration::C10);
    sim.stuck_pending.set(true);
    let power = SimPower::default();
    let pll = c10_dp_pll(&cfg);

    let mut phy =
        Cx0Phy::new(Port::A, &sim, SimDelay::default(), &power, &cfg);
    let err = phy.enable(&dp(4, false), &pll, &levels()).unwrap_err();
    assert!(matches!(err, PhyError::MsgBusFailed { port: 0, .. }));
    assert_eq!(err.disposition(), Disposition::ModesetRejected);

    // Lane reset and power-up only touch MMIO; PLL programming is the
    // first thing to need the bus.
    assert_eq!(phy.state(), SeqState::PowerReady);
    assert_eq!(power.acquires(), 1);
    assert_eq!(power.held(), 0);
    assert_eq!(power.psr_paused(), 0);
}

#[test]
fn power_domain_failure_touches_nothing() {
    let cfg = PhyConfig::default();
    let sim = SimDisplay::new(Port::A, PhyGeneration::C10);
    let power = SimPower::default();
    power.fail_acquire.set(true);
    let pll = c10_dp_pll(&cfg);

    let mut phy =
        Cx0Phy::new(Port::A, &sim, SimDelay::default(), &power, &cfg);
    let err = phy.enable(&dp(4, false), &pll, &levels()).unwrap_err();
    assert_eq!(err, PhyError::PowerDomainUnavailable { port: 0 });
    assert_eq!(phy.state(), SeqState::Idle);
    assert_eq!(power.psr_pauses(), 0);
    assert!(sim.bus_log().is_empty());
}

#[test]
fn bad_requests_are_rejected_up_front() {
    let cfg = PhyConfig::default();
    let sim = SimDisplay::new(Port::A, PhyGeneration::C10);
    let power = SimPower::default();
    let mut phy =
        Cx0Phy::new(Port::A, &sim, SimDelay::default(), &power, &cfg);

    let pll = c10_dp_pll(&cfg);
    let err = phy.enable(&dp(5, false), &pll, &levels()).unwrap_err();
    assert_eq!(err, PhyError::InvalidLaneCount(5));

    let c20 =
        calc_state(PhyGeneration::C20, OutputType::Dp, 270_000, &cfg.pll)
            .unwrap();
    let err = phy.enable(&dp(4, false), &c20, &levels()).unwrap_err();
    assert_eq!(err, PhyError::NoPllTable);
    assert_eq!(power.acquires(), 0);
}

#[test]
fn pll_mismatch_is_reported() {
    let cfg = PhyConfig::default();
    let sim = SimDisplay::new(Port::A, PhyGeneration::C10);
    let power = SimPower::default();
    let pll = c10_dp_pll(&cfg);

    let mut phy =
        Cx0Phy::new(Port::A, &sim, SimDelay::default(), &power, &cfg);
    phy.enable(&dp(4, false), &pll, &levels()).unwrap();

    let b = sim.phy_byte(Lane::Lane0, c10_vdr_pll(2));
    sim.set_phy_byte(Lane::Lane0, c10_vdr_pll(2), b.wrapping_add(2));
    assert_eq!(
        phy.verify_pll(Lane::Lane0, &pll),
        Ok(Warnings::PLL_STATE_MISMATCH)
    );
    assert_eq!(power.held(), 0);
}

#[test]
fn c20_hdmi_swaps_contexts() {
    let cfg = PhyConfig::default();
    let sim = SimDisplay::new(Port::Tc1, PhyGeneration::C20);
    let power = SimPower::default();
    let pll =
        calc_state(PhyGeneration::C20, OutputType::HdmiTmds, 148_500, &cfg.pll)
            .unwrap();
    let req = LinkRequest {
        output_type: OutputType::HdmiTmds,
        pixel_clock: 148_500,
        ..dp(4, false)
    };

    let mut phy =
        Cx0Phy::new(Port::Tc1, &sim, SimDelay::default(), &power, &cfg);
    assert_eq!(phy.generation(), PhyGeneration::C20);
    let health = phy.enable(&req, &pll, &levels()).unwrap();
    assert_eq!(health, LinkHealth::Nominal);

    let serdes = sim.phy_byte(Lane::Lane0, PHY_C20_VDR_CUSTOM_SERDES_RATE);
    assert_ne!(serdes & C20_CONTEXT_TOGGLE, 0);
    assert_eq!(phy.verify_pll(Lane::Lane0, &pll), Ok(Warnings::empty()));

    let health = phy.disable().unwrap();
    assert_eq!(health, LinkHealth::Nominal);
    assert_eq!(
        phy.lane_state(Lane::Lane0, Tx::Tx1).power_state,
        PowerState::C20Disable
    );
    assert_eq!(power.held(), 0);
}

#[test]
fn tbt_clock_request() {
    let cfg = PhyConfig::default();
    let sim = SimDisplay::new(Port::Tc2, PhyGeneration::C20);
    let power = SimPower::default();
    let regs = PortRegs::new(Port::Tc2);

    let mut phy =
        Cx0Phy::new(Port::Tc2, &sim, SimDelay::default(), &power, &cfg);
    assert_eq!(
        phy.enable_tbt(1_000_000),
        Err(PhyError::NotSupported { clock: 1_000_000 })
    );
    assert_eq!(power.acquires(), 0);

    assert_eq!(phy.enable_tbt(540_000), Ok(LinkHealth::Nominal));
    assert_eq!(phy.state(), SeqState::Locked);
    let clk = PortClockCtl(sim.mmio(regs.clock_ctl().addr));
    assert!(clk.tbt_clock_request());
    assert!(clk.tbt_clock_ack());
    assert_eq!(clk.ddi_clock_select(), DdiClockSelect::Tbt540 as u8);
    assert_eq!(sim.mmio(regs.clk_valfreq().addr), 540_000);

    assert_eq!(phy.disable_tbt(), Ok(LinkHealth::Nominal));
    assert_eq!(phy.state(), SeqState::Idle);
    let clk = PortClockCtl(sim.mmio(regs.clock_ctl().addr));
    assert!(!clk.tbt_clock_request());
    assert_eq!(clk.ddi_clock_select(), DdiClockSelect::None as u8);
    assert_eq!(power.held(), 0);
}

#[test]
fn tbt_ack_timeout_is_a_warning() {
    let cfg = PhyConfig::default();
    let sim = SimDisplay::new(Port::Tc2, PhyGeneration::C20);
    sim.stuck_tbt_ack.set(true);
    let power = SimPower::default();

    let mut phy =
        Cx0Phy::new(Port::Tc2, &sim, SimDelay::default(), &power, &cfg);
    assert_eq!(
        phy.enable_tbt(162_000),
        Ok(LinkHealth::Marginal(Warnings::TBT_ACK))
    );
    // With no ack ever raised, the release check passes straight away
    assert_eq!(phy.disable_tbt(), Ok(LinkHealth::Nominal));
}
