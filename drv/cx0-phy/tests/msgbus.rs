// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use drv_cx0_phy::codec::{RegisterCodec, SchemeB};
use drv_cx0_phy::config::MsgBusTiming;
use drv_cx0_phy::msgbus::{MsgBus, PhyBus, MSGBUS_ATTEMPTS};
use drv_cx0_phy::regs::{
    PHY_C20_RD_ADDRESS_H, PHY_C20_RD_ADDRESS_L, PHY_C20_RD_DATA_H,
    PHY_C20_RD_DATA_L, PHY_C20_WR_ADDRESS_H, PHY_C20_WR_ADDRESS_L,
    PHY_C20_WR_DATA_H, PHY_C20_WR_DATA_L,
};
use drv_cx0_phy::{
    BusFault, Commit, Lane, Lanes, PhyError, PhyGeneration, Port,
};
use drv_mock_cx0_phy::{SimDelay, SimDisplay};
use proptest::prelude::*;

fn bus<'a>(
    sim: &'a SimDisplay,
    delay: &'a mut SimDelay,
) -> MsgBus<'a, SimDisplay, SimDelay> {
    MsgBus::new(sim, delay, Port::A, MsgBusTiming::default())
}

#[test]
fn stuck_bus_is_reset_once_per_attempt() {
    let sim = SimDisplay::new(Port::A, PhyGeneration::C10);
    sim.stuck_pending.set(true);
    let mut delay = SimDelay::default();

    let r = bus(&sim, &mut delay).transact_read(Lane::Lane0, 0xc70);
    assert_eq!(r.attempts, MSGBUS_ATTEMPTS);
    assert_eq!(
        r.value,
        Err(PhyError::MsgBusFailed {
            port: 0,
            lane: 0,
            addr: 0xc70,
            cause: BusFault::IdleTimeout,
        })
    );
    assert_eq!(sim.resets(Lane::Lane0), 3);
    assert_eq!(sim.resets(Lane::Lane1), 0);
    assert!(sim.bus_log().is_empty());
    assert!(delay.elapsed_us > 0);
}

#[test]
fn error_response_is_retried() {
    let sim = SimDisplay::new(Port::A, PhyGeneration::C10);
    sim.set_phy_byte(Lane::Lane1, 0xd71, 0x5a);
    sim.error_responses.set(1);
    let mut delay = SimDelay::default();

    let r = bus(&sim, &mut delay).transact_read(Lane::Lane1, 0xd71);
    assert_eq!(r.value, Ok(0x5a));
    assert_eq!(r.attempts, 2);
    assert_eq!(sim.resets(Lane::Lane1), 1);
}

#[test]
fn committed_write_is_retried() {
    let sim = SimDisplay::new(Port::A, PhyGeneration::C10);
    sim.error_responses.set(2);
    let mut delay = SimDelay::default();

    let r = bus(&sim, &mut delay).transact_write(
        Lane::Lane0,
        0xc20,
        0x11,
        Commit::Committed,
    );
    assert_eq!(r.value, Ok(()));
    assert_eq!(r.attempts, 3);
    assert_eq!(sim.phy_byte(Lane::Lane0, 0xc20), 0x11);
    assert_eq!(sim.resets(Lane::Lane0), 2);
}

#[test]
fn uncommitted_write_checks_for_errors() {
    let sim = SimDisplay::new(Port::A, PhyGeneration::C10);
    sim.error_responses.set(1);
    let mut delay = SimDelay::default();

    let mut b = bus(&sim, &mut delay);
    b.write(Lane::Lane0, 0xc21, 0x22, Commit::Uncommitted)
        .unwrap();
    assert_eq!(sim.phy_byte(Lane::Lane0, 0xc21), 0x22);
    assert_eq!(sim.resets(Lane::Lane0), 1);
}

#[test]
fn c20_sram_window() {
    let sim = SimDisplay::new(Port::Tc1, PhyGeneration::C20);
    let mut delay = SimDelay::default();
    let timing = MsgBusTiming::default();
    let mut b = MsgBus::new(&sim, &mut delay, Port::Tc1, timing);

    SchemeB
        .write_word(&mut b, Lanes::Both, 0xcf2e, 0xbeef, Commit::Committed)
        .unwrap();
    assert_eq!(sim.sram_word(Lane::Lane0, 0xcf2e), 0xbeef);
    assert_eq!(sim.sram_word(Lane::Lane1, 0xcf2e), 0xbeef);

    // Address low, address high, data low, data high; lane 0 then lane 1
    let writes: Vec<_> = sim
        .bus_log()
        .iter()
        .map(|op| (op.lane, op.addr, op.commit))
        .collect();
    let lane = |l| {
        [
            (l, PHY_C20_WR_ADDRESS_L, Some(Commit::Uncommitted)),
            (l, PHY_C20_WR_ADDRESS_H, Some(Commit::Uncommitted)),
            (l, PHY_C20_WR_DATA_L, Some(Commit::Uncommitted)),
            (l, PHY_C20_WR_DATA_H, Some(Commit::Committed)),
        ]
    };
    let mut expected = lane(Lane::Lane0).to_vec();
    expected.extend(lane(Lane::Lane1));
    assert_eq!(writes, expected);

    sim.clear_bus_log();
    let v = SchemeB.read_word(&mut b, Lane::Lane1, 0xcf2e).unwrap();
    assert_eq!(v, 0xbeef);
    let order: Vec<_> = sim.bus_log().iter().map(|op| op.addr).collect();
    assert_eq!(
        order,
        [
            PHY_C20_RD_ADDRESS_L,
            PHY_C20_RD_ADDRESS_H,
            PHY_C20_RD_DATA_H,
            PHY_C20_RD_DATA_L
        ]
    );
}

proptest! {
    #[test]
    fn bus_survives_up_to_two_faults(
        faults in 0u32..6,
        data in any::<u8>(),
    ) {
        let sim = SimDisplay::new(Port::B, PhyGeneration::C10);
        sim.set_phy_byte(Lane::Lane0, 0xc40, data);
        sim.error_responses.set(faults);
        let mut delay = SimDelay::default();
        let mut b =
            MsgBus::new(&sim, &mut delay, Port::B, MsgBusTiming::default());

        let r = b.transact_read(Lane::Lane0, 0xc40);
        if faults < u32::from(MSGBUS_ATTEMPTS) {
            prop_assert_eq!(r.value, Ok(data));
            prop_assert_eq!(u32::from(r.attempts), faults + 1);
            prop_assert_eq!(sim.resets(Lane::Lane0), faults);
        } else {
            prop_assert_eq!(
                r.value,
                Err(PhyError::MsgBusFailed {
                    port: 1,
                    lane: 0,
                    addr: 0xc40,
                    cause: BusFault::ErrorResponse,
                })
            );
            prop_assert_eq!(r.attempts, MSGBUS_ATTEMPTS);
            prop_assert_eq!(sim.resets(Lane::Lane0), 3);
        }
    }
}
