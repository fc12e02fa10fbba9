// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! C20 PLL tables, keyed by port clock in kHz
//!
//! Entries at or above 1 000 000 (UHBR and the faster FRL rates) run from
//! MPLLA; everything below uses MPLLB.  FRL entries are per-lane rates.

use static_assertions::const_assert;

use super::c20::{C20PllState, Mpll};

const C20_DP: [C20PllState; 7] = [
    C20PllState {
        clock: 162_000,
        tx: [0xbe88, 0x4800, 0x0000],
        cmn: [0x0500, 0x0005, 0x0000, 0x0000],
        mpll: Mpll::Mpllb([
            0x40a8, 0x2110, 0xcc9c, 0xbfc1,
            0x4c34, 0x2000, 0x20a9, 0x0001,
            0xc000, 0x0000, 0x0003,
        ]),
    },
    C20PllState {
        clock: 270_000,
        tx: [0xbe88, 0x4800, 0x0000],
        cmn: [0x0500, 0x0005, 0x0000, 0x0000],
        mpll: Mpll::Mpllb([
            0x208c, 0x2110, 0xcc9c, 0xbfc1,
            0x4c34, 0x2000, 0x20a9, 0x0001,
            0xa000, 0x0000, 0x0003,
        ]),
    },
    C20PllState {
        clock: 540_000,
        tx: [0xbe88, 0x4800, 0x0000],
        cmn: [0x0500, 0x0005, 0x0000, 0x0000],
        mpll: Mpll::Mpllb([
            0x008c, 0x2110, 0xcc9c, 0xbfc1,
            0x4c34, 0x2000, 0x20a9, 0x0001,
            0xa000, 0x0000, 0x0003,
        ]),
    },
    C20PllState {
        clock: 810_000,
        tx: [0xbe88, 0x4800, 0x0000],
        cmn: [0x0500, 0x0005, 0x0000, 0x0000],
        mpll: Mpll::Mpllb([
            0x00d2, 0x2110, 0xcc9c, 0xbfc1,
            0x4c34, 0x2000, 0x20a9, 0x0001,
            0xf000, 0x0000, 0x0003,
        ]),
    },
    C20PllState {
        clock: 1_000_000,
        tx: [0xbe21, 0x4800, 0x0000],
        cmn: [0x0500, 0x0005, 0x0000, 0x0000],
        mpll: Mpll::Mplla([
            0x2104, 0x0610, 0x7800, 0x0017,
            0x8100, 0x2000, 0x4031, 0x000f,
            0x6aaa, 0x000a,
        ]),
    },
    C20PllState {
        clock: 1_350_000,
        tx: [0xbe21, 0x4800, 0x0000],
        cmn: [0x0500, 0x0005, 0x0000, 0x0000],
        mpll: Mpll::Mplla([
            0x215f, 0x0610, 0x7800, 0x0017,
            0x8100, 0x2000, 0x4031, 0x0001,
            0x9000, 0x0000,
        ]),
    },
    C20PllState {
        clock: 2_000_000,
        tx: [0xbe21, 0x4800, 0x0000],
        cmn: [0x0500, 0x0005, 0x0000, 0x0000],
        mpll: Mpll::Mplla([
            0x2208, 0x0610, 0x7800, 0x0017,
            0x8100, 0x2000, 0x4031, 0x000f,
            0xd555, 0x0005,
        ]),
    },
];

const C20_HDMI: [C20PllState; 5] = [
    C20PllState {
        clock: 25_175,
        tx: [0xbe88, 0x4000, 0x0000],
        cmn: [0x0500, 0x0005, 0x0000, 0x0000],
        mpll: Mpll::Mpllb([
            0xa0d1, 0x2110, 0xcc9c, 0xbfc1,
            0x4c34, 0x0000, 0x20a9, 0x000f,
            0xcaaa, 0x000a, 0x0000,
        ]),
    },
    C20PllState {
        clock: 27_000,
        tx: [0xbe88, 0x4000, 0x0000],
        cmn: [0x0500, 0x0005, 0x0000, 0x0000],
        mpll: Mpll::Mpllb([
            0xa0e1, 0x2110, 0xcc9c, 0xbfc1,
            0x4c34, 0x0000, 0x00a9, 0x0001,
            0x0000, 0x0000, 0x0000,
        ]),
    },
    C20PllState {
        clock: 74_250,
        tx: [0xbe88, 0x4000, 0x0000],
        cmn: [0x0500, 0x0005, 0x0000, 0x0000],
        mpll: Mpll::Mpllb([
            0x609a, 0x2110, 0xcc9c, 0xbfc1,
            0x4c34, 0x0000, 0x20a9, 0x0001,
            0xb000, 0x0000, 0x0000,
        ]),
    },
    C20PllState {
        clock: 148_500,
        tx: [0xbe88, 0x4000, 0x0000],
        cmn: [0x0500, 0x0005, 0x0000, 0x0000],
        mpll: Mpll::Mpllb([
            0x409a, 0x2110, 0xcc9c, 0xbfc1,
            0x4c34, 0x0000, 0x20a9, 0x0001,
            0xb000, 0x0000, 0x0000,
        ]),
    },
    C20PllState {
        clock: 594_000,
        tx: [0xbe88, 0x4000, 0x0000],
        cmn: [0x0500, 0x0005, 0x0000, 0x0000],
        mpll: Mpll::Mpllb([
            0x009a, 0x2110, 0xcc9c, 0xbfc1,
            0x4c34, 0x0000, 0x20a9, 0x0001,
            0xb000, 0x0000, 0x0000,
        ]),
    },
];

const C20_FRL: [C20PllState; 5] = [
    C20PllState {
        clock: 300_000,
        tx: [0xbe88, 0x4000, 0x0000],
        cmn: [0x0500, 0x0005, 0x0000, 0x0000],
        mpll: Mpll::Mpllb([
            0x209c, 0x2110, 0xcc9c, 0xbfc1,
            0x4c34, 0x0000, 0x20a9, 0x0001,
            0x4000, 0x0000, 0x0000,
        ]),
    },
    C20PllState {
        clock: 600_000,
        tx: [0xbe88, 0x4000, 0x0000],
        cmn: [0x0500, 0x0005, 0x0000, 0x0000],
        mpll: Mpll::Mpllb([
            0x009c, 0x2110, 0xcc9c, 0xbfc1,
            0x4c34, 0x0000, 0x20a9, 0x0001,
            0x4000, 0x0000, 0x0000,
        ]),
    },
    C20PllState {
        clock: 800_000,
        tx: [0xbe88, 0x4000, 0x0000],
        cmn: [0x0500, 0x0005, 0x0000, 0x0000],
        mpll: Mpll::Mpllb([
            0x00d0, 0x2110, 0xcc9c, 0xbfc1,
            0x4c34, 0x0000, 0x20a9, 0x000f,
            0x5555, 0x0005, 0x0000,
        ]),
    },
    C20PllState {
        clock: 1_000_000,
        tx: [0xbe21, 0x4000, 0x0000],
        cmn: [0x0500, 0x0005, 0x0000, 0x0000],
        mpll: Mpll::Mplla([
            0x2104, 0x0610, 0x7800, 0x0017,
            0x8100, 0x0000, 0x4031, 0x000f,
            0x6aaa, 0x000a,
        ]),
    },
    C20PllState {
        clock: 1_200_000,
        tx: [0xbe21, 0x4000, 0x0000],
        cmn: [0x0500, 0x0005, 0x0000, 0x0000],
        mpll: Mpll::Mplla([
            0x2138, 0x0610, 0x7800, 0x0017,
            0x8100, 0x0000, 0x4031, 0x0001,
            0x8000, 0x0000,
        ]),
    },
];

pub static C20_DP_TABLE: [C20PllState; 7] = C20_DP;
pub static C20_HDMI_TABLE: [C20PllState; 5] = C20_HDMI;
pub static C20_FRL_TABLE: [C20PllState; 5] = C20_FRL;

const fn ascending(t: &[C20PllState]) -> bool {
    let mut i = 1;
    while i < t.len() {
        if t[i - 1].clock >= t[i].clock {
            return false;
        }
        i += 1;
    }
    true
}

const_assert!(ascending(&C20_DP));
const_assert!(ascending(&C20_HDMI));
const_assert!(ascending(&C20_FRL));
