// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use drv_cx0_phy::config::{HandshakeTimeouts, MsgBusTiming, PhyConfig};
use drv_cx0_phy::pll::{calc_port_clock, calc_state};
use drv_cx0_phy::{OutputType, PhyGeneration, Port};

#[test]
fn empty_config_is_the_default() {
    let cfg: PhyConfig = toml::from_str("").unwrap();
    assert_eq!(cfg, PhyConfig::default());
    assert_eq!(PhyGeneration::detect(Port::A, &cfg), PhyGeneration::C10);
    assert_eq!(PhyGeneration::detect(Port::Tc1, &cfg), PhyGeneration::C20);
}

#[test]
fn partial_overrides() {
    let cfg: PhyConfig = toml::from_str(
        r#"
        c10_port_mask = 0b100001

        [msgbus]
        slow_ms = 3

        [timeouts]
        pll_enable_us = 5000

        [pll]
        hdmi_synthesis = true
        "#,
    )
    .unwrap();

    assert_eq!(
        cfg.msgbus,
        MsgBusTiming {
            slow_ms: 3,
            ..MsgBusTiming::default()
        }
    );
    assert_eq!(
        cfg.timeouts,
        HandshakeTimeouts {
            pll_enable_us: 5000,
            ..HandshakeTimeouts::default()
        }
    );
    assert_eq!(PhyGeneration::detect(Port::B, &cfg), PhyGeneration::C20);
    assert_eq!(PhyGeneration::detect(Port::Tc4, &cfg), PhyGeneration::C10);

    // With synthesis on, an off-table HDMI clock is hit exactly
    let pll =
        calc_state(PhyGeneration::C10, OutputType::HdmiTmds, 100_000, &cfg.pll)
            .unwrap();
    assert_eq!(pll.clock(), 100_000);
    assert_eq!(calc_port_clock(&pll), 100_000);

    let default = PhyConfig::default();
    let pll = calc_state(
        PhyGeneration::C10,
        OutputType::HdmiTmds,
        100_000,
        &default.pll,
    )
    .unwrap();
    assert_eq!(pll.clock(), 106_500);
}

#[test]
fn mistyped_fields_are_rejected() {
    let r: Result<PhyConfig, _> = toml::from_str("c10_port_mask = \"all\"");
    assert!(r.is_err());
}
