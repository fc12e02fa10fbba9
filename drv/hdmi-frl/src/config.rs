// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Timeouts and limits for FRL link training, loadable from TOML

use serde::{Deserialize, Serialize};

/// Link training tunables.  Defaults follow the HDMI 2.1 timing
/// requirements for each phase.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrlConfig {
    /// How long the sink has to raise FLT_ready before LTS2 gives up
    pub lts2_ready_ms: u32,
    /// How long the sink gets to finish asking for patterns in LTS3
    pub lts3_ms: u32,
    /// How long the sink has to start FRL (or ask for a retrain) in LTSP
    pub ltsp_ms: u32,
    /// Number of times the sink may send us back to LTS2 at one rate
    pub max_retrains: u8,
    /// TX FFE level advertised to the sink
    pub ffe_level: u8,
}

impl Default for FrlConfig {
    fn default() -> Self {
        Self {
            lts2_ready_ms: 250,
            lts3_ms: 200,
            ltsp_ms: 200,
            max_retrains: 3,
            ffe_level: 0,
        }
    }
}
