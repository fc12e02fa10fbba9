// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use drv_hdmi_frl::config::FrlConfig;
use drv_hdmi_frl::rate::{
    candidates, chunk_fits, BppIncrement, FrlDfmConfig, FrlRate, ModeTiming,
    SinkCaps, SourceCaps, AUDIO_RATES_HZ,
};
use proptest::prelude::*;

#[test]
fn frl_config_from_toml() {
    let cfg: FrlConfig = toml::from_str("").unwrap();
    assert_eq!(cfg, FrlConfig::default());

    let cfg: FrlConfig = toml::from_str(
        r#"
        lts3_ms = 500
        max_retrains = 1
        "#,
    )
    .unwrap();
    assert_eq!(cfg.lts3_ms, 500);
    assert_eq!(cfg.max_retrains, 1);
    assert_eq!(cfg.lts2_ready_ms, FrlConfig::default().lts2_ready_ms);
}

#[test]
fn caps_from_toml() {
    let sink: SinkCaps = toml::from_str(
        r#"
        max_frl_gbps = 48
        dsc_supported = true
        dsc_max_frl_gbps = 40
        dsc_total_chunk_kbytes = 16
        "#,
    )
    .unwrap();
    assert_eq!(
        sink,
        SinkCaps {
            max_frl_gbps: 48,
            dsc_supported: true,
            dsc_max_frl_gbps: 40,
            dsc_total_chunk_kbytes: 16,
        }
    );

    let source: SourceCaps = toml::from_str(
        r#"
        dsc_supported = true
        bpp_increment = "Quarter"
        "#,
    )
    .unwrap();
    assert_eq!(source.max_frl_gbps, 48);
    assert_eq!(source.bpp_increment, BppIncrement::Quarter);
    assert_eq!(source.bpp_increment.step_x16(), 4);

    let r: Result<SourceCaps, _> = toml::from_str("bpp_increment = \"Third\"");
    assert!(r.is_err());
}

#[test]
fn compression_on_request() {
    let mode = ModeTiming {
        pixel_clock: 1_188_000,
        hactive: 7680,
        hblank: 1120,
        bpc: 8,
        ycbcr420: false,
    };
    let sink = SinkCaps {
        max_frl_gbps: 48,
        dsc_supported: true,
        dsc_max_frl_gbps: 32,
        dsc_total_chunk_kbytes: 64,
    };
    let source = SourceCaps {
        dsc_supported: true,
        ..SourceCaps::default()
    };
    // Uncompressed would fit, but the caller wants compression anyway
    let dfm = |_: &FrlDfmConfig| true;
    let c = candidates(&mode, 48, &sink, &source, true, &dfm);
    let rates: Vec<_> = c.iter().map(|c| c.rate.gbps()).collect();
    assert_eq!(rates, [32, 24, 18, 9]);
    // The highest bpp the mode can use
    assert!(c.iter().all(|c| c.compressed_bpp_x16 == Some(24 * 16)));
}

fn any_rate() -> impl Strategy<Value = u8> {
    prop::sample::select(vec![0u8, 9, 18, 24, 32, 40, 48])
}

proptest! {
    #[test]
    fn candidates_descend_within_limits(
        sink_max in any_rate(),
        source_max in any_rate(),
        dsc in any::<bool>(),
        min_gbps in 0u8..50,
        min_audio in 0usize..AUDIO_RATES_HZ.len(),
    ) {
        let mode = ModeTiming {
            pixel_clock: 594_000,
            hactive: 3840,
            hblank: 560,
            bpc: 10,
            ycbcr420: false,
        };
        let sink = SinkCaps {
            max_frl_gbps: sink_max,
            dsc_supported: dsc,
            dsc_max_frl_gbps: sink_max,
            dsc_total_chunk_kbytes: 64,
        };
        let source = SourceCaps {
            max_frl_gbps: source_max,
            dsc_supported: dsc,
            ..SourceCaps::default()
        };
        let audio_max = AUDIO_RATES_HZ[min_audio];
        let dfm = |cfg: &FrlDfmConfig| {
            cfg.rate.gbps() >= min_gbps && cfg.audio_rate <= audio_max
        };

        let c = candidates(&mode, sink_max, &sink, &source, false, &dfm);
        let limit = sink_max.min(source_max);
        for pair in c.windows(2) {
            prop_assert!(pair[0].rate > pair[1].rate);
        }
        for cand in c.iter() {
            prop_assert!(cand.rate.gbps() <= limit);
            prop_assert!(cand.rate.gbps() >= min_gbps);
            prop_assert_eq!(cand.audio_rate, audio_max);
            prop_assert_eq!(cand.compressed_bpp_x16, None);
        }
        // Every rate the model accepts is offered
        let expected = FrlRate::DESCENDING
            .iter()
            .filter(|r| r.gbps() <= limit && r.gbps() >= min_gbps)
            .count();
        prop_assert_eq!(c.len(), expected);
    }

    #[test]
    fn chunk_limit_is_monotonic(
        hactive in 1u32..10_000,
        bpp in 1u16..(36 * 16),
        kbytes in 0u32..64,
    ) {
        if chunk_fits(hactive, bpp, kbytes) {
            prop_assert!(chunk_fits(hactive, bpp - 1, kbytes));
            prop_assert!(chunk_fits(hactive, bpp, kbytes + 1));
        }
    }
}
