// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! FRL rate selection
//!
//! Whether a mode fits a given link rate is decided by the data flow
//! metering model, which is supplied by the caller through [`DfmModel`].
//! What lives here is the search around it: which rates to offer, which
//! audio rates to try, and how far to compress.

use heapless::Vec;
use ringbuf::ringbuf_entry_root as ringbuf_entry;
use serde::{Deserialize, Serialize};

use crate::Trace;

/// The six FRL rates.  The discriminant is the rate's SCDC code.
#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    num_derive::FromPrimitive,
)]
#[repr(u8)]
pub enum FrlRate {
    /// 3 Gbit/s on 3 lanes
    Gbps9 = 1,
    /// 6 Gbit/s on 3 lanes
    Gbps18 = 2,
    /// 6 Gbit/s on 4 lanes
    Gbps24 = 3,
    /// 8 Gbit/s on 4 lanes
    Gbps32 = 4,
    /// 10 Gbit/s on 4 lanes
    Gbps40 = 5,
    /// 12 Gbit/s on 4 lanes
    Gbps48 = 6,
}

impl FrlRate {
    /// Every rate, fastest first; candidates are always tried in this order
    pub const DESCENDING: [FrlRate; 6] = [
        FrlRate::Gbps48,
        FrlRate::Gbps40,
        FrlRate::Gbps32,
        FrlRate::Gbps24,
        FrlRate::Gbps18,
        FrlRate::Gbps9,
    ];

    pub fn gbps(self) -> u8 {
        match self {
            FrlRate::Gbps9 => 9,
            FrlRate::Gbps18 => 18,
            FrlRate::Gbps24 => 24,
            FrlRate::Gbps32 => 32,
            FrlRate::Gbps40 => 40,
            FrlRate::Gbps48 => 48,
        }
    }

    pub fn from_gbps(gbps: u8) -> Option<Self> {
        Self::DESCENDING.into_iter().find(|r| r.gbps() == gbps)
    }

    pub fn scdc_code(self) -> u8 {
        self as u8
    }

    pub fn lanes(self) -> u8 {
        if self.gbps() < 24 {
            3
        } else {
            4
        }
    }

    /// PHY port clock for this rate, in the per-lane units used by the FRL
    /// PLL table (Gbit/s per lane * 100 000)
    pub fn per_lane_clock(self) -> u32 {
        u32::from(self.gbps() / self.lanes()) * 100_000
    }
}

/// Step size for compressed bits-per-pixel values the source can produce
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BppIncrement {
    #[default]
    Sixteenth,
    Eighth,
    Quarter,
    Half,
    One,
}

impl BppIncrement {
    /// The step, in 1/16 bpp units
    pub fn step_x16(self) -> u16 {
        match self {
            BppIncrement::Sixteenth => 1,
            BppIncrement::Eighth => 2,
            BppIncrement::Quarter => 4,
            BppIncrement::Half => 8,
            BppIncrement::One => 16,
        }
    }
}

/// What the sink advertised in its EDID.  Never modified here.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SinkCaps {
    /// Fastest uncompressed FRL rate, in Gbit/s; 0 if FRL isn't supported
    pub max_frl_gbps: u8,
    pub dsc_supported: bool,
    /// Fastest FRL rate with compression
    pub dsc_max_frl_gbps: u8,
    /// Per-line compressed data limit
    pub dsc_total_chunk_kbytes: u32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceCaps {
    pub max_frl_gbps: u8,
    pub dsc_supported: bool,
    /// Compressed bpp range, in 1/16 bpp units
    pub max_bpp_x16: u16,
    pub min_bpp_x16: u16,
    pub bpp_increment: BppIncrement,
}

impl Default for SourceCaps {
    fn default() -> Self {
        Self {
            max_frl_gbps: 48,
            dsc_supported: false,
            max_bpp_x16: 24 * 16,
            min_bpp_x16: 8 * 16,
            bpp_increment: BppIncrement::Sixteenth,
        }
    }
}

/// The parts of a mode that matter for link bandwidth
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ModeTiming {
    /// Pixel clock in kHz
    pub pixel_clock: u32,
    pub hactive: u32,
    pub hblank: u32,
    pub bpc: u8,
    pub ycbcr420: bool,
}

impl ModeTiming {
    /// Uncompressed bits per pixel, in 1/16 units
    pub fn max_bpp_x16(&self) -> u16 {
        let bpp = u16::from(self.bpc) * 3 * 16;
        if self.ycbcr420 {
            bpp / 2
        } else {
            bpp
        }
    }
}

/// One feasibility question put to the DFM model
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FrlDfmConfig {
    pub pixel_clock: u32,
    pub hactive: u32,
    pub hblank: u32,
    pub bpc: u8,
    pub ycbcr420: bool,
    pub rate: FrlRate,
    pub lanes: u8,
    pub audio_rate: u32,
    /// `None` for an uncompressed stream
    pub compressed_bpp_x16: Option<u16>,
}

/// Data flow metering: decides whether a configuration fits on the link
pub trait DfmModel {
    fn fits(&self, cfg: &FrlDfmConfig) -> bool;
}

impl<F: Fn(&FrlDfmConfig) -> bool> DfmModel for F {
    fn fits(&self, cfg: &FrlDfmConfig) -> bool {
        self(cfg)
    }
}

/// Audio sample rates, highest first
pub const AUDIO_RATES_HZ: [u32; 7] =
    [192_000, 176_400, 96_000, 88_200, 48_000, 44_100, 32_000];

/// A rate that the model says will carry the mode
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FrlCandidate {
    pub rate: FrlRate,
    pub audio_rate: u32,
    pub compressed_bpp_x16: Option<u16>,
}

pub type Candidates = Vec<FrlCandidate, 6>;

// At most one candidate per rate
static_assertions::const_assert_eq!(FrlRate::DESCENDING.len(), 6);

/// Does one compressed line fit in the sink's chunk buffer?
pub fn chunk_fits(hactive: u32, bpp_x16: u16, chunk_kbytes: u32) -> bool {
    let bits = u64::from(hactive) * u64::from(bpp_x16);
    let bytes = bits.div_ceil(8 * 16);
    bytes <= u64::from(chunk_kbytes) * 1024
}

fn first_audio_fit<M: DfmModel>(
    mode: &ModeTiming,
    rate: FrlRate,
    compressed_bpp_x16: Option<u16>,
    dfm: &M,
) -> Option<FrlCandidate> {
    AUDIO_RATES_HZ.iter().find_map(|&audio_rate| {
        let cfg = FrlDfmConfig {
            pixel_clock: mode.pixel_clock,
            hactive: mode.hactive,
            hblank: mode.hblank,
            bpc: mode.bpc,
            ycbcr420: mode.ycbcr420,
            rate,
            lanes: rate.lanes(),
            audio_rate,
            compressed_bpp_x16,
        };
        dfm.fits(&cfg).then_some(FrlCandidate {
            rate,
            audio_rate,
            compressed_bpp_x16,
        })
    })
}

/// Scans downward from the highest usable bpp; the first value that fits
/// both the sink's chunk limit and the link wins.
fn compressed_fit<M: DfmModel>(
    mode: &ModeTiming,
    rate: FrlRate,
    sink: &SinkCaps,
    source: &SourceCaps,
    dfm: &M,
) -> Option<FrlCandidate> {
    let step = source.bpp_increment.step_x16();
    let mut bpp = source.max_bpp_x16.min(mode.max_bpp_x16());
    while bpp >= source.min_bpp_x16 && bpp > 0 {
        if chunk_fits(mode.hactive, bpp, sink.dsc_total_chunk_kbytes) {
            if let Some(c) = first_audio_fit(mode, rate, Some(bpp), dfm) {
                return Some(c);
            }
        }
        bpp = bpp.checked_sub(step)?;
    }
    None
}

/// Lists the FRL rates that can carry `mode`, fastest first.
///
/// `sink_max_gbps` is the sink's effective limit, which may be lower than
/// what it advertises (it's 0 once FRL has been given up on).  Compression
/// is only used when no uncompressed rate fits, or when the caller asks for
/// it outright, and only if both ends support it.
pub fn candidates<M: DfmModel>(
    mode: &ModeTiming,
    sink_max_gbps: u8,
    sink: &SinkCaps,
    source: &SourceCaps,
    compression_requested: bool,
    dfm: &M,
) -> Candidates {
    let mut out = Candidates::new();
    let limit = sink_max_gbps.min(source.max_frl_gbps);

    if !compression_requested {
        let rates = FrlRate::DESCENDING.into_iter();
        for rate in rates.filter(|r| r.gbps() <= limit) {
            if let Some(c) = first_audio_fit(mode, rate, None, dfm) {
                let _ = out.push(c);
            }
        }
    }

    if out.is_empty() && sink.dsc_supported && source.dsc_supported {
        let limit = limit.min(sink.dsc_max_frl_gbps);
        let rates = FrlRate::DESCENDING.into_iter();
        for rate in rates.filter(|r| r.gbps() <= limit) {
            if let Some(c) = compressed_fit(mode, rate, sink, source, dfm) {
                let _ = out.push(c);
            }
        }
    }

    if out.is_empty() {
        ringbuf_entry!(Trace::NoCandidates);
    }
    for c in out.iter() {
        ringbuf_entry!(Trace::Candidate {
            rate_gbps: c.rate.gbps(),
            audio_rate: c.audio_rate,
            compressed_bpp_x16: c.compressed_bpp_x16.unwrap_or(0),
        });
    }
    out
}
