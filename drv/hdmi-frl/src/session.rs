// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-link FRL state: what trained last time, and whether FRL is still on
//! the table for the attached sink.

use drv_cx0_phy::{Delay, DisplayRw, Port};
use ringbuf::ringbuf_entry_root as ringbuf_entry;

use crate::config::FrlConfig;
use crate::rate::{
    self, DfmModel, FrlCandidate, ModeTiming, SinkCaps, SourceCaps,
};
use crate::scdc::ScdcRw;
use crate::train::{FrlTrainer, TrainState};
use crate::Trace;

/// The last FRL configuration put on the wire.  `trained` is only set by a
/// successful handshake, and is cleared whenever anything else changes.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FrlSession {
    pub trained: bool,
    pub lanes: u8,
    pub rate_gbps: u8,
    pub ffe_level: u8,
}

impl FrlCandidate {
    fn trained(&self, ffe_level: u8) -> FrlOutcome {
        FrlOutcome::Trained {
            session: FrlSession {
                trained: true,
                lanes: self.rate.lanes(),
                rate_gbps: self.rate.gbps(),
                ffe_level,
            },
            audio_rate: self.audio_rate,
            compressed_bpp_x16: self.compressed_bpp_x16,
        }
    }
}

impl FrlSession {
    fn matches(&self, c: &FrlCandidate, ffe_level: u8) -> bool {
        self.trained
            && self.rate_gbps == c.rate.gbps()
            && self.lanes == c.rate.lanes()
            && self.ffe_level == ffe_level
    }
}

/// Told when a link has to go through mode-set again, e.g. because FRL was
/// given up on and the mode now has to be driven over TMDS.
pub trait ModesetNotifier {
    fn redo_negotiation(&self, port: Port);
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FrlOutcome {
    Trained {
        session: FrlSession,
        audio_rate: u32,
        compressed_bpp_x16: Option<u16>,
    },
    /// Drive the sink with TMDS instead
    Legacy,
}

/// The HDMI side of one port
pub struct HdmiLink {
    port: Port,
    sink: SinkCaps,
    /// Our copy of the sink's max FRL rate.  Zeroed when FRL is disabled,
    /// and only restored by the next hot-plug.
    sink_max_gbps: u8,
    source: SourceCaps,
    config: FrlConfig,
    session: FrlSession,
}

impl HdmiLink {
    /// Creates a link with no sink attached
    pub fn new(port: Port, source: SourceCaps, config: FrlConfig) -> Self {
        Self {
            port,
            sink: SinkCaps::default(),
            sink_max_gbps: 0,
            source,
            config,
            session: FrlSession::default(),
        }
    }

    pub fn port(&self) -> Port {
        self.port
    }

    pub fn session(&self) -> &FrlSession {
        &self.session
    }

    pub fn sink(&self) -> &SinkCaps {
        &self.sink
    }

    /// The fastest rate we're still willing to try with this sink
    pub fn effective_sink_max(&self) -> u8 {
        self.sink_max_gbps
    }

    /// True if the sink can do FRL but we've stopped trying
    pub fn frl_disabled(&self) -> bool {
        self.sink_max_gbps == 0 && self.sink.max_frl_gbps != 0
    }

    fn reset_session(&mut self) {
        ringbuf_entry!(Trace::SessionReset {
            port: self.port.index()
        });
        self.session = FrlSession::default();
    }

    /// A sink was attached; this is the only thing that re-enables FRL
    pub fn hotplug(&mut self, sink: &SinkCaps) {
        self.sink = *sink;
        self.sink_max_gbps = sink.max_frl_gbps;
        self.reset_session();
    }

    pub fn disconnect(&mut self) {
        self.sink = SinkCaps::default();
        self.sink_max_gbps = 0;
        self.reset_session();
    }

    /// Changes the FFE level advertised from the next negotiation on.  A
    /// session trained at another level no longer counts as trained.
    pub fn set_ffe_level(&mut self, ffe_level: u8) {
        self.config.ffe_level = ffe_level;
    }

    /// Forces the next negotiation to train again, even at the same rate
    pub fn request_retrain(&mut self) {
        self.reset_session();
    }

    fn disable_frl<N: ModesetNotifier>(&mut self, notifier: &N) -> FrlOutcome {
        ringbuf_entry!(Trace::FrlDisabled {
            port: self.port.index()
        });
        self.sink_max_gbps = 0;
        self.session = FrlSession::default();
        notifier.redo_negotiation(self.port);
        FrlOutcome::Legacy
    }

    /// Finds and trains an FRL configuration for `mode`.
    ///
    /// A session still trained at one of the candidates is reused as is.
    /// Otherwise candidates are tried fastest first.  A sink asking for a
    /// lower rate moves us to the next candidate; running out of candidates,
    /// or a training failure, disables FRL for this sink until it's plugged
    /// in again and asks the notifier for a fresh mode-set.
    pub fn negotiate<R, S, D, M, N>(
        &mut self,
        mode: &ModeTiming,
        compression_requested: bool,
        dfm: &M,
        rw: &R,
        scdc: &S,
        delay: &mut D,
        notifier: &N,
    ) -> FrlOutcome
    where
        R: DisplayRw,
        S: ScdcRw,
        D: Delay,
        M: DfmModel,
        N: ModesetNotifier,
    {
        if self.sink_max_gbps == 0 {
            // FRL is already off (or was never on); nothing to undo
            return FrlOutcome::Legacy;
        }

        let candidates = rate::candidates(
            mode,
            self.sink_max_gbps,
            &self.sink,
            &self.source,
            compression_requested,
            dfm,
        );

        let ffe_level = self.config.ffe_level;
        if let Some(c) =
            candidates.iter().find(|c| self.session.matches(c, ffe_level))
        {
            ringbuf_entry!(Trace::Memoized {
                port: self.port.index(),
                rate_gbps: c.rate.gbps(),
            });
            return c.trained(ffe_level);
        }

        for c in candidates.iter() {
            self.session = FrlSession {
                trained: false,
                lanes: c.rate.lanes(),
                rate_gbps: c.rate.gbps(),
                ffe_level,
            };
            let mut trainer = FrlTrainer::new(
                self.port,
                rw,
                scdc,
                &mut *delay,
                &self.config,
            );
            match trainer.train(c.rate, ffe_level) {
                TrainState::Trained => {
                    self.session.trained = true;
                    return c.trained(ffe_level);
                }
                TrainState::ChangeRate => continue,
                _ => break,
            }
        }
        self.disable_frl(notifier)
    }
}
