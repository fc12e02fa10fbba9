// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use drv_cx0_phy::{PhyGeneration, Port};
use drv_hdmi_frl::config::FrlConfig;
use drv_hdmi_frl::rate::{
    FrlDfmConfig, FrlRate, ModeTiming, SinkCaps, SourceCaps,
};
use drv_hdmi_frl::regs::{FrlRegs, HdmiFrlCfg, HdmiFrlTrain};
use drv_hdmi_frl::session::{FrlOutcome, FrlSession, HdmiLink};
use drv_mock_cx0_phy::{SimDelay, SimDisplay, SimNotifier, SimSink};

const PORT: Port = Port::Tc1;

fn mode() -> ModeTiming {
    ModeTiming {
        pixel_clock: 594_000,
        hactive: 3840,
        hblank: 560,
        bpc: 10,
        ycbcr420: false,
    }
}

fn sink_caps(max_frl_gbps: u8) -> SinkCaps {
    SinkCaps {
        max_frl_gbps,
        ..SinkCaps::default()
    }
}

fn anything_fits(_: &FrlDfmConfig) -> bool {
    true
}

/// Everything a negotiation needs, wired to simulated hardware
struct Bench {
    link: HdmiLink,
    sim: SimDisplay,
    sink: SimSink,
    delay: SimDelay,
    notifier: SimNotifier,
}

impl Bench {
    fn new(sink_max: u8, advertised_max: u8) -> Self {
        Self::with_config(sink_max, advertised_max, FrlConfig::default())
    }

    fn with_config(
        sink_max: u8,
        advertised_max: u8,
        config: FrlConfig,
    ) -> Self {
        let mut link = HdmiLink::new(PORT, SourceCaps::default(), config);
        link.hotplug(&sink_caps(advertised_max));
        Self {
            link,
            sim: SimDisplay::new(PORT, PhyGeneration::C20),
            sink: SimSink::new(sink_max),
            delay: SimDelay::default(),
            notifier: SimNotifier::default(),
        }
    }

    fn negotiate_with<M>(&mut self, dfm: &M) -> FrlOutcome
    where
        M: Fn(&FrlDfmConfig) -> bool,
    {
        self.link.negotiate(
            &mode(),
            false,
            dfm,
            &self.sim,
            &self.sink,
            &mut self.delay,
            &self.notifier,
        )
    }

    fn negotiate(&mut self) -> FrlOutcome {
        self.negotiate_with(&anything_fits)
    }

    fn cfg(&self) -> HdmiFrlCfg {
        HdmiFrlCfg(self.sim.mmio(FrlRegs::new(PORT).cfg().addr))
    }

    fn train(&self) -> HdmiFrlTrain {
        HdmiFrlTrain(self.sim.mmio(FrlRegs::new(PORT).train().addr))
    }
}

fn trained_at(outcome: &FrlOutcome) -> Option<u8> {
    match outcome {
        FrlOutcome::Trained { session, .. } => Some(session.rate_gbps),
        FrlOutcome::Legacy => None,
    }
}

#[test]
fn trains_at_the_fastest_candidate() {
    let mut b = Bench::new(40, 40);
    let outcome = b.negotiate();

    assert_eq!(
        outcome,
        FrlOutcome::Trained {
            session: FrlSession {
                trained: true,
                lanes: 4,
                rate_gbps: 40,
                ffe_level: 0,
            },
            audio_rate: 192_000,
            compressed_bpp_x16: None,
        }
    );
    assert_eq!(b.sink.rates_tried(), [40]);
    assert!(b.sink.started());
    assert!(b.notifier.calls().is_empty());
    assert!(b.link.session().trained);

    let cfg = b.cfg();
    assert!(cfg.enable());
    assert!(cfg.training_enable());
    assert!(cfg.training_complete());
    assert!(cfg.four_lanes());
    assert_eq!(cfg.rate(), FrlRate::Gbps40.scdc_code());

    // The last pattern request before the sink was satisfied
    let train = b.train();
    assert_eq!(
        [train.lane(0), train.lane(1), train.lane(2), train.lane(3)],
        [5, 6, 7, 8]
    );
}

#[test]
fn ffe_level_is_advertised() {
    let config = FrlConfig {
        ffe_level: 2,
        ..FrlConfig::default()
    };
    let mut b = Bench::with_config(48, 48, config);
    let outcome = b.negotiate();
    assert_eq!(trained_at(&outcome), Some(48));
    assert_eq!(b.sink.config_writes(), [0x26]);
    assert_eq!(b.cfg().ffe(), 2);
    assert_eq!(b.link.session().ffe_level, 2);
}

#[test]
fn three_lane_rates() {
    let mut b = Bench::new(18, 18);
    let outcome = b.negotiate();
    assert_eq!(trained_at(&outcome), Some(18));
    assert_eq!(b.link.session().lanes, 3);
    assert!(!b.cfg().four_lanes());

    // Only three lanes were asked about
    assert_eq!(b.train().lane(3), 0);
    assert_eq!(b.train().lane(2), 7);
}

#[test]
fn no_candidates_disables_frl() {
    let mut b = Bench::new(9, 9);
    let outcome = b.negotiate_with(&|_: &FrlDfmConfig| false);

    assert_eq!(outcome, FrlOutcome::Legacy);
    assert!(b.sink.config_writes().is_empty());
    assert_eq!(b.notifier.calls(), [PORT]);
    assert!(b.link.frl_disabled());
    assert_eq!(b.link.effective_sink_max(), 0);
    // What the sink advertised is left alone
    assert_eq!(b.link.sink().max_frl_gbps, 9);

    // Further attempts stay on TMDS without another mode-set
    let outcome = b.negotiate();
    assert_eq!(outcome, FrlOutcome::Legacy);
    assert_eq!(b.notifier.calls().len(), 1);
    assert!(b.sink.config_writes().is_empty());
}

#[test]
fn sink_without_frl_is_legacy() {
    let mut b = Bench::new(0, 0);
    assert_eq!(b.negotiate(), FrlOutcome::Legacy);
    assert!(b.notifier.calls().is_empty());
    assert!(!b.link.frl_disabled());
}

#[test]
fn trained_session_is_reused() {
    let mut b = Bench::new(40, 40);
    let first = b.negotiate();
    let writes = b.sink.config_writes().len();

    let second = b.negotiate();
    assert_eq!(first, second);
    assert_eq!(b.sink.config_writes().len(), writes);

    // Unless a retrain is asked for
    b.link.request_retrain();
    assert!(!b.link.session().trained);
    let third = b.negotiate();
    assert_eq!(trained_at(&third), Some(40));
    assert_eq!(b.sink.config_writes().len(), writes + 1);
}

#[test]
fn rate_change_moves_down_the_list() {
    // The EDID claims 48 but the sink only trains at 24 and below
    let mut b = Bench::new(24, 48);
    let outcome = b.negotiate();

    assert_eq!(trained_at(&outcome), Some(24));
    assert_eq!(b.sink.rates_tried(), [48, 40, 32, 24]);
    assert!(b.notifier.calls().is_empty());
    assert_eq!(b.link.effective_sink_max(), 48);
}

#[test]
fn fallback_session_is_reused() {
    let mut b = Bench::new(24, 48);
    let first = b.negotiate();
    assert_eq!(trained_at(&first), Some(24));
    assert_eq!(b.sink.config_writes().len(), 4);

    // 48, 40 and 32 are still candidates, but 24 is what's on the wire
    let second = b.negotiate();
    assert_eq!(first, second);
    assert_eq!(b.sink.rates_tried(), [48, 40, 32, 24]);
    assert!(b.link.session().trained);
    assert!(b.notifier.calls().is_empty());
}

#[test]
fn ffe_change_forces_retraining() {
    let mut b = Bench::new(40, 40);
    assert_eq!(trained_at(&b.negotiate()), Some(40));
    assert_eq!(b.sink.config_writes(), [0x05]);

    b.link.set_ffe_level(2);
    let outcome = b.negotiate();
    assert_eq!(trained_at(&outcome), Some(40));
    assert_eq!(b.sink.config_writes(), [0x05, 0x25]);
    assert_eq!(b.link.session().ffe_level, 2);
    assert_eq!(b.cfg().ffe(), 2);

    // Same level again is a hit
    assert_eq!(b.negotiate(), outcome);
    assert_eq!(b.sink.config_writes().len(), 2);
}

#[test]
fn retrains_are_bounded() {
    let mut b = Bench::new(40, 40);
    b.sink.set_retrains(3);
    assert_eq!(trained_at(&b.negotiate()), Some(40));
    assert_eq!(b.sink.rates_tried(), [40; 4]);

    let mut b = Bench::new(40, 40);
    b.sink.set_retrains(4);
    assert_eq!(b.negotiate(), FrlOutcome::Legacy);
    assert_eq!(b.notifier.calls(), [PORT]);
    assert!(b.link.frl_disabled());
    // A failed attempt is not retried at lower rates
    assert_eq!(b.sink.rates_tried(), [40; 4]);
}

#[test]
fn failed_training_turns_the_source_off() {
    let mut b = Bench::new(40, 40);
    b.sink.set_retrains(10);
    assert_eq!(b.negotiate(), FrlOutcome::Legacy);
    assert_eq!(b.cfg(), HdmiFrlCfg(0));
    assert_eq!(b.train(), HdmiFrlTrain(0));
    assert_eq!(*b.link.session(), FrlSession::default());
}

#[test]
fn hotplug_reenables_frl() {
    let mut b = Bench::new(40, 40);
    b.sink.set_ready(false);
    assert_eq!(b.negotiate(), FrlOutcome::Legacy);
    assert!(b.link.frl_disabled());

    b.sink.set_ready(true);
    b.link.hotplug(&sink_caps(40));
    assert!(!b.link.frl_disabled());
    assert_eq!(b.link.effective_sink_max(), 40);
    assert_eq!(trained_at(&b.negotiate()), Some(40));
}

#[test]
fn disconnect_forgets_the_sink() {
    let mut b = Bench::new(40, 40);
    assert!(b.negotiate() != FrlOutcome::Legacy);
    b.link.disconnect();
    assert_eq!(b.link.effective_sink_max(), 0);
    assert!(!b.link.frl_disabled());
    assert_eq!(b.negotiate(), FrlOutcome::Legacy);
    assert!(b.notifier.calls().is_empty());
}

#[test]
fn sink_never_ready() {
    let mut b = Bench::new(40, 40);
    b.sink.set_ready(false);
    assert_eq!(b.negotiate(), FrlOutcome::Legacy);
    assert!(b.sink.config_writes().is_empty());
    assert_eq!(b.delay.elapsed_us, 250_000);
    assert_eq!(b.notifier.calls(), [PORT]);
}

#[test]
fn sink_never_asks_for_patterns() {
    let mut b = Bench::new(40, 40);
    b.sink.set_mute(true);
    assert_eq!(b.negotiate(), FrlOutcome::Legacy);
    assert_eq!(b.sink.rates_tried(), [40]);
    assert_eq!(b.delay.elapsed_us, 200_000);
    assert_eq!(b.cfg(), HdmiFrlCfg(0));
}

#[test]
fn endless_pattern_requests_time_out() {
    let mut b = Bench::new(40, 40);
    b.sink.set_script(&[[1; 4]; 300]);
    assert_eq!(b.negotiate(), FrlOutcome::Legacy);
    assert_eq!(b.sink.rates_tried(), [40]);
    // A millisecond per pass, answered requests included
    assert_eq!(b.delay.elapsed_us, 200_000);
    assert_eq!(b.notifier.calls(), [PORT]);
}

#[test]
fn scdc_failure_stops_training() {
    let mut b = Bench::new(40, 40);
    b.sink.set_fail_io(true);
    assert_eq!(b.negotiate(), FrlOutcome::Legacy);
    assert_eq!(b.notifier.calls(), [PORT]);
    assert!(b.link.frl_disabled());
}

#[test]
fn register_failure_stops_training() {
    let mut b = Bench::new(40, 40);
    b.sim.mmio_fault.set(Some(FrlRegs::new(PORT).train().addr));
    assert_eq!(b.negotiate(), FrlOutcome::Legacy);
    assert_eq!(b.sink.rates_tried(), [40]);
    assert!(!b.sink.started());
}

#[test]
fn ffe_change_requests_leave_the_lane_alone() {
    let mut b = Bench::new(40, 40);
    b.sink.set_script(&[[0xe, 1, 1, 1]]);
    assert_eq!(trained_at(&b.negotiate()), Some(40));
    let train = b.train();
    assert_eq!(
        [train.lane(0), train.lane(1), train.lane(2), train.lane(3)],
        [0, 1, 1, 1]
    );
}

#[test]
fn reserved_codes_are_ignored() {
    let mut b = Bench::new(40, 40);
    b.sink.set_script(&[[2, 2, 2, 2], [9, 3, 0xa, 4]]);
    assert_eq!(trained_at(&b.negotiate()), Some(40));
    let train = b.train();
    assert_eq!(
        [train.lane(0), train.lane(1), train.lane(2), train.lane(3)],
        [2, 3, 2, 4]
    );
}

#[test]
fn sink_satisfied_straight_away() {
    let mut b = Bench::new(32, 32);
    b.sink.set_script(&[]);
    assert_eq!(trained_at(&b.negotiate()), Some(32));
    assert_eq!(b.train(), HdmiFrlTrain(0));
}
