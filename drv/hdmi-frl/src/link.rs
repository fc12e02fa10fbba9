// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Turning a mode-set request (and the FRL outcome, for HDMI) into the PHY
//! clock and PLL state to program.

use drv_cx0_phy::config::PllConfig;
use drv_cx0_phy::pll::{self, PllState};
use drv_cx0_phy::{LinkRequest, OutputType, PhyGeneration};

use crate::rate::FrlRate;
use crate::session::{FrlOutcome, FrlSession};
use crate::PhyError;

/// What the sequencer needs to bring up one link
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LinkPlan {
    /// kHz
    pub port_clock: u32,
    pub lane_count: u8,
    pub pll: PllState,
    /// Set if the link runs in FRL mode
    pub frl: Option<FrlSession>,
}

/// TMDS character clock for an HDMI mode, in kHz
pub fn tmds_clock(req: &LinkRequest) -> u32 {
    let clock = req.pixel_clock * u32::from(req.bit_depth) / 8;
    if req.ycbcr420 {
        clock / 2
    } else {
        clock
    }
}

fn tmds_plan(
    generation: PhyGeneration,
    req: &LinkRequest,
    cfg: &PllConfig,
) -> Result<LinkPlan, PhyError> {
    let pll =
        pll::calc_state(generation, OutputType::HdmiTmds, tmds_clock(req), cfg)?;
    Ok(LinkPlan {
        port_clock: pll.clock(),
        lane_count: 4,
        pll,
        frl: None,
    })
}

/// Plans the PHY configuration for `req`.
///
/// For HDMI FRL, `frl` is the result of negotiation; a `Legacy` outcome, or
/// a PHY without an FRL PLL table, falls back to TMDS.  Errors are meant to
/// be mapped through [`PhyError::disposition`].
pub fn plan_link(
    generation: PhyGeneration,
    req: &LinkRequest,
    frl: &FrlOutcome,
    cfg: &PllConfig,
) -> Result<LinkPlan, PhyError> {
    req.check_lanes()?;
    match req.output_type {
        OutputType::HdmiTmds => tmds_plan(generation, req, cfg),
        OutputType::HdmiFrl => {
            let FrlOutcome::Trained { session, .. } = frl else {
                return tmds_plan(generation, req, cfg);
            };
            let rate = FrlRate::from_gbps(session.rate_gbps)
                .ok_or(PhyError::FrlCannotSupport)?;
            match pll::calc_state(
                generation,
                OutputType::HdmiFrl,
                rate.per_lane_clock(),
                cfg,
            ) {
                Ok(pll) => Ok(LinkPlan {
                    port_clock: pll.clock(),
                    lane_count: session.lanes,
                    pll,
                    frl: Some(*session),
                }),
                Err(PhyError::NoPllTable) => tmds_plan(generation, req, cfg),
                Err(e) => Err(e),
            }
        }
        output => {
            let pll = pll::calc_state(generation, output, req.pixel_clock, cfg)?;
            Ok(LinkPlan {
                port_clock: pll.clock(),
                lane_count: req.lane_count,
                pll,
                frl: None,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Disposition;

    fn req(output_type: OutputType, pixel_clock: u32) -> LinkRequest {
        LinkRequest {
            output_type,
            pixel_clock,
            bit_depth: 8,
            lane_count: 4,
            ycbcr420: false,
            compression_requested: false,
            lane_reversal: false,
        }
    }

    fn trained(rate_gbps: u8, lanes: u8) -> FrlOutcome {
        FrlOutcome::Trained {
            session: FrlSession {
                trained: true,
                lanes,
                rate_gbps,
                ffe_level: 0,
            },
            audio_rate: 48_000,
            compressed_bpp_x16: None,
        }
    }

    #[test]
    fn tmds_clock_scales_with_depth() {
        let mut r = req(OutputType::HdmiTmds, 148_500);
        assert_eq!(tmds_clock(&r), 148_500);
        r.bit_depth = 10;
        assert_eq!(tmds_clock(&r), 185_625);
        r.ycbcr420 = true;
        assert_eq!(tmds_clock(&r), 92_812);
    }

    #[test]
    fn dp_uses_link_clock() {
        let cfg = PllConfig::default();
        let r = req(OutputType::Dp, 270_000);
        let plan =
            plan_link(PhyGeneration::C10, &r, &FrlOutcome::Legacy, &cfg)
                .unwrap();
        assert_eq!(plan.port_clock, 270_000);
        assert_eq!(plan.lane_count, 4);
        assert_eq!(plan.frl, None);
    }

    #[test]
    fn frl_on_c20() {
        let cfg = PllConfig::default();
        let r = req(OutputType::HdmiFrl, 594_000);
        let plan =
            plan_link(PhyGeneration::C20, &r, &trained(40, 4), &cfg).unwrap();
        assert_eq!(plan.port_clock, 1_000_000);
        assert_eq!(plan.lane_count, 4);
        assert_eq!(plan.frl.map(|s| s.rate_gbps), Some(40));
    }

    #[test]
    fn frl_falls_back_to_tmds() {
        let cfg = PllConfig::default();
        let r = req(OutputType::HdmiFrl, 148_500);

        // The C10 has no FRL table at all
        let plan =
            plan_link(PhyGeneration::C10, &r, &trained(18, 3), &cfg).unwrap();
        assert_eq!(plan.frl, None);
        assert_eq!(plan.port_clock, 148_500);

        let plan =
            plan_link(PhyGeneration::C20, &r, &FrlOutcome::Legacy, &cfg)
                .unwrap();
        assert_eq!(plan.frl, None);
        assert_eq!(plan.lane_count, 4);
    }

    #[test]
    fn errors_map_to_dispositions() {
        let cfg = PllConfig::default();
        let r = req(OutputType::HdmiTmds, 700_000);
        let err = plan_link(PhyGeneration::C10, &r, &FrlOutcome::Legacy, &cfg)
            .unwrap_err();
        assert_eq!(err, PhyError::NotSupported { clock: 700_000 });
        assert_eq!(err.disposition(), Disposition::ModesetRejected);

        let mut r = req(OutputType::Dp, 270_000);
        r.lane_count = 0;
        let err = plan_link(PhyGeneration::C10, &r, &FrlOutcome::Legacy, &cfg)
            .unwrap_err();
        assert_eq!(err, PhyError::InvalidLaneCount(0));
    }
}
