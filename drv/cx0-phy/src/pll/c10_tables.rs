// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! C10 PLL tables, keyed by port clock in kHz
//!
//! Each table must be strictly ascending by clock; this is checked at
//! compile time below.

use static_assertions::const_assert;

use super::c10::C10PllState;

const C10_DP: [C10PllState; 4] = [
    C10PllState {
        clock: 162_000,
        tx: 0x10,
        cmn: 0x21,
        pll: [
            0xB4, 0x00, 0x30, 0x01, 0x26,
            0x0C, 0x98, 0x46, 0x01, 0x01,
            0x00, 0x00, 0xC0, 0x00, 0x00,
            0x02, 0x84, 0x4F, 0xE5, 0x23,
        ],
    },
    C10PllState {
        clock: 270_000,
        tx: 0x10,
        cmn: 0x21,
        pll: [
            0xB4, 0x00, 0xF8, 0x00, 0x26,
            0x0C, 0x98, 0x46, 0x01, 0x01,
            0x00, 0x00, 0xA0, 0x00, 0x00,
            0x01, 0x84, 0x4F, 0xE5, 0x23,
        ],
    },
    C10PllState {
        clock: 540_000,
        tx: 0x10,
        cmn: 0x21,
        pll: [
            0xB4, 0x00, 0xF8, 0x00, 0x26,
            0x0C, 0x98, 0x46, 0x01, 0x01,
            0x00, 0x00, 0xA0, 0x00, 0x00,
            0x00, 0x84, 0x4F, 0xE5, 0x23,
        ],
    },
    C10PllState {
        clock: 810_000,
        tx: 0x10,
        cmn: 0x21,
        pll: [
            0xB4, 0x00, 0x84, 0x01, 0x26,
            0x0C, 0x98, 0x46, 0x01, 0x01,
            0x00, 0x00, 0xF0, 0x00, 0x00,
            0x00, 0x84, 0x4F, 0xE5, 0x23,
        ],
    },
];

const C10_EDP: [C10PllState; 9] = [
    C10PllState {
        clock: 162_000,
        tx: 0x10,
        cmn: 0x21,
        pll: [
            0xB4, 0x00, 0x30, 0x01, 0x26,
            0x0C, 0x98, 0x46, 0x01, 0x01,
            0x00, 0x00, 0xC0, 0x00, 0x00,
            0x02, 0x84, 0x4F, 0xE5, 0x23,
        ],
    },
    C10PllState {
        clock: 216_000,
        tx: 0x10,
        cmn: 0x21,
        pll: [
            0xA4, 0x00, 0xA2, 0x01, 0x26,
            0x0C, 0x98, 0x46, 0x01, 0x01,
            0x00, 0x00, 0x00, 0x00, 0x00,
            0x02, 0x84, 0x4F, 0xE5, 0x23,
        ],
    },
    C10PllState {
        clock: 243_000,
        tx: 0x10,
        cmn: 0x21,
        pll: [
            0xB4, 0x00, 0xDC, 0x00, 0x26,
            0x0C, 0x98, 0x46, 0x01, 0x01,
            0x00, 0x00, 0x90, 0x00, 0x00,
            0x01, 0x84, 0x4F, 0xE5, 0x23,
        ],
    },
    C10PllState {
        clock: 270_000,
        tx: 0x10,
        cmn: 0x21,
        pll: [
            0xB4, 0x00, 0xF8, 0x00, 0x26,
            0x0C, 0x98, 0x46, 0x01, 0x01,
            0x00, 0x00, 0xA0, 0x00, 0x00,
            0x01, 0x84, 0x4F, 0xE5, 0x23,
        ],
    },
    C10PllState {
        clock: 324_000,
        tx: 0x10,
        cmn: 0x21,
        pll: [
            0xB4, 0x00, 0x30, 0x01, 0x26,
            0x0C, 0x98, 0x46, 0x01, 0x01,
            0x00, 0x00, 0xC0, 0x00, 0x00,
            0x01, 0x84, 0x4F, 0xE5, 0x23,
        ],
    },
    C10PllState {
        clock: 432_000,
        tx: 0x10,
        cmn: 0x21,
        pll: [
            0xA4, 0x00, 0xA2, 0x01, 0x26,
            0x0C, 0x98, 0x46, 0x01, 0x01,
            0x00, 0x00, 0x00, 0x00, 0x00,
            0x01, 0x84, 0x4F, 0xE5, 0x23,
        ],
    },
    C10PllState {
        clock: 540_000,
        tx: 0x10,
        cmn: 0x21,
        pll: [
            0xB4, 0x00, 0xF8, 0x00, 0x26,
            0x0C, 0x98, 0x46, 0x01, 0x01,
            0x00, 0x00, 0xA0, 0x00, 0x00,
            0x00, 0x84, 0x4F, 0xE5, 0x23,
        ],
    },
    C10PllState {
        clock: 675_000,
        tx: 0x10,
        cmn: 0x21,
        pll: [
            0xB4, 0x00, 0x3E, 0x01, 0x26,
            0x0C, 0x98, 0x46, 0x01, 0x01,
            0x00, 0x00, 0xC8, 0x00, 0x00,
            0x00, 0x84, 0x4F, 0xE5, 0x23,
        ],
    },
    C10PllState {
        clock: 810_000,
        tx: 0x10,
        cmn: 0x21,
        pll: [
            0xB4, 0x00, 0x84, 0x01, 0x26,
            0x0C, 0x98, 0x46, 0x01, 0x01,
            0x00, 0x00, 0xF0, 0x00, 0x00,
            0x00, 0x84, 0x4F, 0xE5, 0x23,
        ],
    },
];

const C10_HDMI: [C10PllState; 45] = [
    C10PllState {
        clock: 25_175,
        tx: 0x10,
        cmn: 0x1,
        pll: [
            0xB4, 0x00, 0x82, 0x01, 0x00,
            0x00, 0x98, 0x46, 0x01, 0x0F,
            0x00, 0xAA, 0xCA, 0x0A, 0x00,
            0x0D, 0x84, 0x4F, 0xE5, 0x21,
        ],
    },
    C10PllState {
        clock: 27_000,
        tx: 0x10,
        cmn: 0x1,
        pll: [
            0xA4, 0x00, 0xA2, 0x01, 0x00,
            0x00, 0x98, 0x46, 0x01, 0x01,
            0x00, 0x00, 0x00, 0x00, 0x00,
            0x0D, 0x84, 0x4F, 0xE5, 0x21,
        ],
    },
    C10PllState {
        clock: 27_027,
        tx: 0x10,
        cmn: 0x1,
        pll: [
            0xB4, 0x00, 0xA2, 0x01, 0x00,
            0x00, 0x98, 0x46, 0x01, 0x0F,
            0x00, 0x99, 0x39, 0x09, 0x00,
            0x0D, 0x84, 0x4F, 0xE5, 0x21,
        ],
    },
    C10PllState {
        clock: 28_320,
        tx: 0x10,
        cmn: 0x1,
        pll: [
            0xA4, 0x00, 0xB8, 0x01, 0x00,
            0x00, 0x98, 0x46, 0x01, 0x01,
            0x00, 0x00, 0x00, 0x00, 0x00,
            0x0D, 0x84, 0x4F, 0xE5, 0x21,
        ],
    },
    C10PllState {
        clock: 30_240,
        tx: 0x10,
        cmn: 0x1,
        pll: [
            0xA4, 0x00, 0xDC, 0x00, 0x00,
            0x00, 0x98, 0x46, 0x01, 0x01,
            0x00, 0x00, 0x00, 0x00, 0x00,
            0x0C, 0x84, 0x4F, 0xE5, 0x21,
        ],
    },
    C10PllState {
        clock: 31_500,
        tx: 0x10,
        cmn: 0x1,
        pll: [
            0xB4, 0x00, 0xE6, 0x00, 0x00,
            0x00, 0x98, 0x46, 0x01, 0x01,
            0x00, 0x00, 0x40, 0x00, 0x00,
            0x0C, 0x84, 0x4F, 0xE5, 0x21,
        ],
    },
    C10PllState {
        clock: 36_000,
        tx: 0x10,
        cmn: 0x1,
        pll: [
            0xA4, 0x00, 0x0C, 0x01, 0x00,
            0x00, 0x98, 0x46, 0x01, 0x01,
            0x00, 0x00, 0x00, 0x00, 0x00,
            0x0C, 0x84, 0x4F, 0xE5, 0x21,
        ],
    },
    C10PllState {
        clock: 40_000,
        tx: 0x10,
        cmn: 0x1,
        pll: [
            0xB4, 0x00, 0x2C, 0x01, 0x00,
            0x00, 0x98, 0x46, 0x01, 0x0F,
            0x00, 0xAA, 0xAA, 0x0A, 0x00,
            0x0C, 0x84, 0x4F, 0xE5, 0x21,
        ],
    },
    C10PllState {
        clock: 49_500,
        tx: 0x10,
        cmn: 0x1,
        pll: [
            0xB4, 0x00, 0x7C, 0x01, 0x00,
            0x00, 0x98, 0x46, 0x01, 0x01,
            0x00, 0x00, 0x40, 0x00, 0x00,
            0x0C, 0x84, 0x4F, 0xE5, 0x21,
        ],
    },
    C10PllState {
        clock: 50_000,
        tx: 0x10,
        cmn: 0x1,
        pll: [
            0xB4, 0x00, 0x80, 0x01, 0x00,
            0x00, 0x98, 0x46, 0x01, 0x0F,
            0x00, 0x55, 0x55, 0x05, 0x00,
            0x0C, 0x84, 0x4F, 0xE5, 0x21,
        ],
    },
    C10PllState {
        clock: 57_284,
        tx: 0x10,
        cmn: 0x1,
        pll: [
            0xB4, 0x00, 0xBC, 0x01, 0x00,
            0x00, 0x98, 0x46, 0x01, 0x0F,
            0x00, 0xEE, 0xAE, 0x0E, 0x00,
            0x0C, 0x84, 0x4F, 0xE5, 0x21,
        ],
    },
    C10PllState {
        clock: 58_000,
        tx: 0x10,
        cmn: 0x1,
        pll: [
            0xB4, 0x00, 0xC2, 0x01, 0x00,
            0x00, 0x98, 0x46, 0x01, 0x0F,
            0x00, 0xAA, 0xAA, 0x0A, 0x00,
            0x0C, 0x84, 0x4F, 0xE5, 0x21,
        ],
    },
    C10PllState {
        clock: 65_000,
        tx: 0x10,
        cmn: 0x1,
        pll: [
            0xB4, 0x00, 0xEE, 0x00, 0x00,
            0x00, 0x98, 0x46, 0x01, 0x0F,
            0x00, 0xAA, 0x6A, 0x0A, 0x00,
            0x0B, 0x84, 0x4F, 0xE5, 0x21,
        ],
    },
    C10PllState {
        clock: 71_000,
        tx: 0x10,
        cmn: 0x1,
        pll: [
            0xB4, 0x00, 0x06, 0x01, 0x00,
            0x00, 0x98, 0x46, 0x01, 0x0F,
            0x00, 0xAA, 0xEA, 0x0A, 0x00,
            0x0B, 0x84, 0x4F, 0xE5, 0x21,
        ],
    },
    C10PllState {
        clock: 74_176,
        tx: 0x10,
        cmn: 0x1,
        pll: [
            0xB4, 0x00, 0x14, 0x01, 0x00,
            0x00, 0x98, 0x46, 0x01, 0x0F,
            0x00, 0x88, 0x88, 0x08, 0x00,
            0x0B, 0x84, 0x4F, 0xE5, 0x21,
        ],
    },
    C10PllState {
        clock: 74_250,
        tx: 0x10,
        cmn: 0x1,
        pll: [
            0xB4, 0x00, 0x14, 0x01, 0x00,
            0x00, 0x98, 0x46, 0x01, 0x01,
            0x00, 0x00, 0xB0, 0x00, 0x00,
            0x0B, 0x84, 0x4F, 0xE5, 0x21,
        ],
    },
    C10PllState {
        clock: 75_000,
        tx: 0x10,
        cmn: 0x1,
        pll: [
            0xB4, 0x00, 0x18, 0x01, 0x00,
            0x00, 0x98, 0x46, 0x01, 0x01,
            0x00, 0x00, 0x40, 0x00, 0x00,
            0x0B, 0x84, 0x4F, 0xE5, 0x21,
        ],
    },
    C10PllState {
        clock: 78_750,
        tx: 0x10,
        cmn: 0x1,
        pll: [
            0xB4, 0x00, 0x28, 0x01, 0x00,
            0x00, 0x98, 0x46, 0x01, 0x01,
            0x00, 0x00, 0x10, 0x00, 0x00,
            0x0B, 0x84, 0x4F, 0xE5, 0x21,
        ],
    },
    C10PllState {
        clock: 85_500,
        tx: 0x10,
        cmn: 0x1,
        pll: [
            0xB4, 0x00, 0x44, 0x01, 0x00,
            0x00, 0x98, 0x46, 0x01, 0x01,
            0x00, 0x00, 0x20, 0x00, 0x00,
            0x0B, 0x84, 0x4F, 0xE5, 0x21,
        ],
    },
    C10PllState {
        clock: 88_750,
        tx: 0x10,
        cmn: 0x1,
        pll: [
            0xB4, 0x00, 0x50, 0x01, 0x00,
            0x00, 0x98, 0x46, 0x01, 0x0F,
            0x00, 0x55, 0xE5, 0x05, 0x00,
            0x0B, 0x84, 0x4F, 0xE5, 0x21,
        ],
    },
    C10PllState {
        clock: 106_500,
        tx: 0x10,
        cmn: 0x1,
        pll: [
            0xB4, 0x00, 0x9A, 0x01, 0x00,
            0x00, 0x98, 0x46, 0x01, 0x01,
            0x00, 0x00, 0xE0, 0x00, 0x00,
            0x0B, 0x84, 0x4F, 0xE5, 0x21,
        ],
    },
    C10PllState {
        clock: 108_000,
        tx: 0x10,
        cmn: 0x1,
        pll: [
            0xA4, 0x00, 0xA2, 0x01, 0x00,
            0x00, 0x98, 0x46, 0x01, 0x01,
            0x00, 0x00, 0x00, 0x00, 0x00,
            0x0B, 0x84, 0x4F, 0xE5, 0x21,
        ],
    },
    C10PllState {
        clock: 115_500,
        tx: 0x10,
        cmn: 0x1,
        pll: [
            0xB4, 0x00, 0xC0, 0x01, 0x00,
            0x00, 0x98, 0x46, 0x01, 0x01,
            0x00, 0x00, 0xA0, 0x00, 0x00,
            0x0B, 0x84, 0x4F, 0xE5, 0x21,
        ],
    },
    C10PllState {
        clock: 119_000,
        tx: 0x10,
        cmn: 0x1,
        pll: [
            0xB4, 0x00, 0xCE, 0x01, 0x00,
            0x00, 0x98, 0x46, 0x01, 0x0F,
            0x00, 0xAA, 0xEA, 0x0A, 0x00,
            0x0B, 0x84, 0x4F, 0xE5, 0x21,
        ],
    },
    C10PllState {
        clock: 135_000,
        tx: 0x10,
        cmn: 0x1,
        pll: [
            0xB4, 0x00, 0xF8, 0x00, 0x00,
            0x00, 0x98, 0x46, 0x01, 0x01,
            0x00, 0x00, 0xA0, 0x00, 0x00,
            0x0A, 0x84, 0x4F, 0xE5, 0x21,
        ],
    },
    C10PllState {
        clock: 138_500,
        tx: 0x10,
        cmn: 0x1,
        pll: [
            0xB4, 0x00, 0x00, 0x01, 0x00,
            0x00, 0x98, 0x46, 0x01, 0x0F,
            0x00, 0x55, 0x45, 0x05, 0x00,
            0x0A, 0x84, 0x4F, 0xE5, 0x21,
        ],
    },
    C10PllState {
        clock: 147_160,
        tx: 0x10,
        cmn: 0x1,
        pll: [
            0xB4, 0x00, 0x12, 0x01, 0x00,
            0x00, 0x98, 0x46, 0x01, 0x0F,
            0x00, 0xAA, 0x4A, 0x0A, 0x00,
            0x0A, 0x84, 0x4F, 0xE5, 0x21,
        ],
    },
    C10PllState {
        clock: 148_352,
        tx: 0x10,
        cmn: 0x1,
        pll: [
            0xB4, 0x00, 0x14, 0x01, 0x00,
            0x00, 0x98, 0x46, 0x01, 0x0F,
            0x00, 0x88, 0x88, 0x08, 0x00,
            0x0A, 0x84, 0x4F, 0xE5, 0x21,
        ],
    },
    C10PllState {
        clock: 148_500,
        tx: 0x10,
        cmn: 0x1,
        pll: [
            0xB4, 0x00, 0x14, 0x01, 0x00,
            0x00, 0x98, 0x46, 0x01, 0x01,
            0x00, 0x00, 0xB0, 0x00, 0x00,
            0x0A, 0x84, 0x4F, 0xE5, 0x21,
        ],
    },
    C10PllState {
        clock: 154_000,
        tx: 0x10,
        cmn: 0x1,
        pll: [
            0xB4, 0x00, 0x20, 0x01, 0x00,
            0x00, 0x98, 0x46, 0x01, 0x0F,
            0x00, 0xAA, 0x6A, 0x0A, 0x00,
            0x0A, 0x84, 0x4F, 0xE5, 0x21,
        ],
    },
    C10PllState {
        clock: 162_000,
        tx: 0x10,
        cmn: 0x1,
        pll: [
            0xB4, 0x00, 0x30, 0x01, 0x00,
            0x00, 0x98, 0x46, 0x01, 0x01,
            0x00, 0x00, 0xC0, 0x00, 0x00,
            0x0A, 0x84, 0x4F, 0xE5, 0x21,
        ],
    },
    C10PllState {
        clock: 167_000,
        tx: 0x10,
        cmn: 0x1,
        pll: [
            0xB4, 0x00, 0x3A, 0x01, 0x00,
            0x00, 0x98, 0x46, 0x01, 0x0F,
            0x00, 0x55, 0xF5, 0x05, 0x00,
            0x0A, 0x84, 0x4F, 0xE5, 0x21,
        ],
    },
    C10PllState {
        clock: 197_802,
        tx: 0x10,
        cmn: 0x1,
        pll: [
            0xB4, 0x00, 0x7C, 0x01, 0x00,
            0x00, 0x98, 0x46, 0x01, 0x0F,
            0x00, 0x33, 0x0B, 0x03, 0x00,
            0x0A, 0x84, 0x4F, 0xE5, 0x21,
        ],
    },
    C10PllState {
        clock: 198_000,
        tx: 0x10,
        cmn: 0x1,
        pll: [
            0xB4, 0x00, 0x7C, 0x01, 0x00,
            0x00, 0x98, 0x46, 0x01, 0x01,
            0x00, 0x00, 0x40, 0x00, 0x00,
            0x0A, 0x84, 0x4F, 0xE5, 0x21,
        ],
    },
    C10PllState {
        clock: 209_800,
        tx: 0x10,
        cmn: 0x1,
        pll: [
            0xB4, 0x00, 0x94, 0x01, 0x00,
            0x00, 0x98, 0x46, 0x01, 0x0F,
            0x00, 0xAA, 0x8A, 0x0A, 0x00,
            0x0A, 0x84, 0x4F, 0xE5, 0x21,
        ],
    },
    C10PllState {
        clock: 241_500,
        tx: 0x10,
        cmn: 0x1,
        pll: [
            0xB4, 0x00, 0xDA, 0x00, 0x00,
            0x00, 0x98, 0x46, 0x01, 0x01,
            0x00, 0x00, 0xC8, 0x00, 0x00,
            0x09, 0x84, 0x4F, 0xE5, 0x21,
        ],
    },
    C10PllState {
        clock: 262_750,
        tx: 0x10,
        cmn: 0x1,
        pll: [
            0xB4, 0x00, 0xF0, 0x00, 0x00,
            0x00, 0x98, 0x46, 0x01, 0x0F,
            0x00, 0x55, 0xD9, 0x05, 0x00,
            0x09, 0x84, 0x4F, 0xE5, 0x21,
        ],
    },
    C10PllState {
        clock: 268_500,
        tx: 0x10,
        cmn: 0x1,
        pll: [
            0xB4, 0x00, 0xF6, 0x00, 0x00,
            0x00, 0x98, 0x46, 0x01, 0x01,
            0x00, 0x00, 0xD8, 0x00, 0x00,
            0x09, 0x84, 0x4F, 0xE5, 0x21,
        ],
    },
    C10PllState {
        clock: 296_703,
        tx: 0x10,
        cmn: 0x1,
        pll: [
            0xB4, 0x00, 0x14, 0x01, 0x00,
            0x00, 0x98, 0x46, 0x01, 0x0F,
            0x00, 0x66, 0x88, 0x06, 0x00,
            0x09, 0x84, 0x4F, 0xE5, 0x21,
        ],
    },
    C10PllState {
        clock: 297_000,
        tx: 0x10,
        cmn: 0x1,
        pll: [
            0xB4, 0x00, 0x14, 0x01, 0x00,
            0x00, 0x98, 0x46, 0x01, 0x01,
            0x00, 0x00, 0xB0, 0x00, 0x00,
            0x09, 0x84, 0x4F, 0xE5, 0x21,
        ],
    },
    C10PllState {
        clock: 319_750,
        tx: 0x10,
        cmn: 0x1,
        pll: [
            0xB4, 0x00, 0x2C, 0x01, 0x00,
            0x00, 0x98, 0x46, 0x01, 0x0F,
            0x00, 0x55, 0x89, 0x05, 0x00,
            0x09, 0x84, 0x4F, 0xE5, 0x21,
        ],
    },
    C10PllState {
        clock: 497_750,
        tx: 0x10,
        cmn: 0x1,
        pll: [
            0xB4, 0x00, 0xE2, 0x00, 0x00,
            0x00, 0x98, 0x46, 0x01, 0x0F,
            0x00, 0x55, 0x9F, 0x05, 0x00,
            0x08, 0x84, 0x4F, 0xE5, 0x21,
        ],
    },
    C10PllState {
        clock: 592_000,
        tx: 0x10,
        cmn: 0x1,
        pll: [
            0xB4, 0x00, 0x14, 0x01, 0x00,
            0x00, 0x98, 0x46, 0x01, 0x0F,
            0x00, 0xAA, 0x2A, 0x0A, 0x00,
            0x08, 0x84, 0x4F, 0xE5, 0x21,
        ],
    },
    C10PllState {
        clock: 593_407,
        tx: 0x10,
        cmn: 0x1,
        pll: [
            0xB4, 0x00, 0x14, 0x01, 0x00,
            0x00, 0x98, 0x46, 0x01, 0x0F,
            0x00, 0x77, 0x88, 0x07, 0x00,
            0x08, 0x84, 0x4F, 0xE5, 0x21,
        ],
    },
    C10PllState {
        clock: 594_000,
        tx: 0x10,
        cmn: 0x1,
        pll: [
            0xB4, 0x00, 0x14, 0x01, 0x00,
            0x00, 0x98, 0x46, 0x01, 0x01,
            0x00, 0x00, 0xB0, 0x00, 0x00,
            0x08, 0x84, 0x4F, 0xE5, 0x21,
        ],
    },
];

pub static C10_DP_TABLE: [C10PllState; 4] = C10_DP;
pub static C10_EDP_TABLE: [C10PllState; 9] = C10_EDP;
pub static C10_HDMI_TABLE: [C10PllState; 45] = C10_HDMI;

const fn ascending(t: &[C10PllState]) -> bool {
    let mut i = 1;
    while i < t.len() {
        if t[i - 1].clock >= t[i].clock {
            return false;
        }
        i += 1;
    }
    true
}

const_assert!(ascending(&C10_DP));
const_assert!(ascending(&C10_EDP));
const_assert!(ascending(&C10_HDMI));
