// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! FRL link training
//!
//! Training is a conversation with the sink over SCDC.  The sink raises
//! FLT_ready once it can train (LTS2), then asks for one test pattern per
//! lane until it's happy (LTS3), and finally either tells us to start FRL or
//! sends us back to the beginning (LTSP).  It may also ask for a lower rate
//! at any point during LTS3.

use drv_cx0_phy::{Delay, DisplayRw, Port};
use ringbuf::ringbuf_entry_root as ringbuf_entry;

use crate::config::FrlConfig;
use crate::rate::FrlRate;
use crate::regs::{FrlRegs, HdmiFrlCfg, HdmiFrlTrain};
use crate::scdc::{self, LtpRequest, ScdcRw, ScdcStatusFlags0, ScdcUpdate0};
use crate::{PhyError, Trace};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TrainState {
    PrepareLts2,
    TrainLts3,
    CompleteLtsp,
    Trained,
    ChangeRate,
    Retrain,
    Stop,
}

/// Runs training for one port at one rate.  The trainer borrows everything
/// it touches and keeps nothing between calls to [`FrlTrainer::train`].
pub struct FrlTrainer<'a, R, S, D> {
    port: Port,
    regs: FrlRegs,
    rw: &'a R,
    scdc: &'a S,
    delay: &'a mut D,
    config: &'a FrlConfig,
}

impl<'a, R: DisplayRw, S: ScdcRw, D: Delay> FrlTrainer<'a, R, S, D> {
    pub fn new(
        port: Port,
        rw: &'a R,
        scdc: &'a S,
        delay: &'a mut D,
        config: &'a FrlConfig,
    ) -> Self {
        Self {
            port,
            regs: FrlRegs::new(port),
            rw,
            scdc,
            delay,
            config,
        }
    }

    /// Trains the link at `rate` with the given FFE level.
    ///
    /// Returns the terminal state: `Trained`, `ChangeRate` if the sink wants
    /// a lower rate, or `Stop` if training failed outright.  In the latter
    /// two cases the source's FRL output has been turned off again.
    pub fn train(&mut self, rate: FrlRate, ffe_level: u8) -> TrainState {
        let port = self.port.index();
        let mut retrains = 0u8;
        let mut state = TrainState::PrepareLts2;
        loop {
            ringbuf_entry!(Trace::TrainState { port, state });
            let next = match state {
                TrainState::PrepareLts2 => self.prepare_lts2(rate, ffe_level),
                TrainState::TrainLts3 => self.train_lts3(rate, ffe_level),
                TrainState::CompleteLtsp => self.complete_ltsp(),
                TrainState::Retrain => {
                    retrains += 1;
                    if retrains > self.config.max_retrains {
                        ringbuf_entry!(Trace::RetrainLimit {
                            port,
                            rate_gbps: rate.gbps(),
                        });
                        Ok(TrainState::Stop)
                    } else {
                        Ok(TrainState::PrepareLts2)
                    }
                }
                TrainState::Trained => return state,
                TrainState::ChangeRate | TrainState::Stop => {
                    self.quiesce();
                    return state;
                }
            };
            state = next.unwrap_or_else(|err| {
                ringbuf_entry!(Trace::TrainFailed { port, err });
                TrainState::Stop
            });
        }
    }

    /// Polls an SCDC register once per millisecond until `f` accepts it
    fn poll_scdc<T>(
        &mut self,
        offset: u8,
        timeout_ms: u32,
        f: impl Fn(u8) -> Option<T>,
    ) -> Result<Option<T>, PhyError> {
        for _ in 0..timeout_ms {
            if let Some(v) = f(self.scdc.read(offset)?) {
                return Ok(Some(v));
            }
            self.delay.delay_ms(1);
        }
        Ok(None)
    }

    fn timeout(&self, state: TrainState) -> TrainState {
        ringbuf_entry!(Trace::Timeout {
            port: self.port.index(),
            state,
        });
        TrainState::Stop
    }

    fn prepare_lts2(
        &mut self,
        rate: FrlRate,
        ffe_level: u8,
    ) -> Result<TrainState, PhyError> {
        let ready = self.poll_scdc(
            scdc::SCDC_STATUS_FLAGS_0,
            self.config.lts2_ready_ms,
            |v| ScdcStatusFlags0(v).flt_ready().then_some(()),
        )?;
        if ready.is_none() {
            return Ok(self.timeout(TrainState::PrepareLts2));
        }

        let mut cfg = scdc::ScdcConfig1(0);
        cfg.set_frl_rate(rate.scdc_code());
        cfg.set_ffe_levels(ffe_level);
        self.scdc.write(scdc::SCDC_CONFIG_1, cfg.into())?;
        Ok(TrainState::TrainLts3)
    }

    fn train_lts3(
        &mut self,
        rate: FrlRate,
        ffe_level: u8,
    ) -> Result<TrainState, PhyError> {
        let four_lanes = rate.lanes() == 4;
        self.rw.modify(self.regs.cfg(), |r: &mut HdmiFrlCfg| {
            r.set_rate(rate.scdc_code());
            r.set_four_lanes(four_lanes);
            r.set_ffe(ffe_level);
            r.set_enable(true);
            r.set_training_enable(true);
            r.set_training_complete(false);
        })?;

        let lanes = usize::from(rate.lanes());
        for _ in 0..self.config.lts3_ms {
            let update = ScdcUpdate0(self.scdc.read(scdc::SCDC_UPDATE_0)?);
            if update.flt_update() {
                let codes = scdc::lane_requests(self.scdc)?;
                let codes = &codes[..lanes];
                if codes.contains(&(LtpRequest::RateChange as u8)) {
                    return Ok(TrainState::ChangeRate);
                }
                if codes.iter().all(|&c| c == LtpRequest::None as u8) {
                    return Ok(TrainState::CompleteLtsp);
                }
                self.request_patterns(codes)?;
            }
            self.delay.delay_ms(1);
        }
        Ok(self.timeout(TrainState::TrainLts3))
    }

    /// Puts the requested patterns on the lanes and acknowledges the update
    fn request_patterns(&self, codes: &[u8]) -> Result<(), PhyError> {
        let mut train = self.rw.read(self.regs.train())?;
        for (lane, &code) in codes.iter().enumerate() {
            let lane = lane as u8;
            ringbuf_entry!(Trace::LaneRequest { lane, code });
            match LtpRequest::decode(code) {
                Ok(p) if p.is_pattern() => train.set_lane(lane, code),
                Ok(LtpRequest::FfeChange) => {
                    // TODO: step the TX FFE level once the PHY exposes
                    // per-lane FFE overrides
                    ringbuf_entry!(Trace::FfeChangeIgnored { lane });
                }
                // Reserved codes are ignored
                _ => (),
            }
        }
        self.rw.write(self.regs.train(), train)?;
        self.clear_update(|u| u.set_flt_update(true))
    }

    fn complete_ltsp(&mut self) -> Result<TrainState, PhyError> {
        self.rw.modify(self.regs.cfg(), |r: &mut HdmiFrlCfg| {
            r.set_training_complete(true);
        })?;
        self.clear_update(|u| u.set_flt_update(true))?;

        let next = self.poll_scdc(
            scdc::SCDC_UPDATE_0,
            self.config.ltsp_ms,
            |v| {
                let u = ScdcUpdate0(v);
                if u.frl_start() {
                    Some(TrainState::Trained)
                } else if u.flt_update() {
                    Some(TrainState::Retrain)
                } else {
                    None
                }
            },
        )?;
        match next {
            Some(TrainState::Trained) => {
                self.clear_update(|u| u.set_frl_start(true))?;
                Ok(TrainState::Trained)
            }
            Some(s) => Ok(s),
            None => Ok(self.timeout(TrainState::CompleteLtsp)),
        }
    }

    /// UPDATE_0 flags are write-1-to-clear
    fn clear_update(
        &self,
        f: impl Fn(&mut ScdcUpdate0),
    ) -> Result<(), PhyError> {
        let mut u = ScdcUpdate0(0);
        f(&mut u);
        self.scdc.write(scdc::SCDC_UPDATE_0, u.into())
    }

    /// Turns the source side back off after a failed attempt
    fn quiesce(&self) {
        let port = self.port.index();
        if let Err(err) = self.rw.write(self.regs.cfg(), HdmiFrlCfg(0)) {
            ringbuf_entry!(Trace::TrainFailed { port, err });
        }
        if let Err(err) = self.rw.write(self.regs.train(), HdmiFrlTrain(0)) {
            ringbuf_entry!(Trace::TrainFailed { port, err });
        }
    }
}
