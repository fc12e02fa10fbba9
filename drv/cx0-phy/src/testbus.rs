// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory [`PhyBus`] for unit tests

use std::collections::BTreeMap;

use crate::msgbus::PhyBus;
use crate::{Commit, Lane, PhyError};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Access {
    Read(Lane, u16),
    Write(Lane, u16, u8, Commit),
}

/// A bus that remembers register contents and logs every access.  Reads of
/// registers that were never written return 0.
#[derive(Default)]
pub struct Recorder {
    pub mem: BTreeMap<(u8, u16), u8>,
    pub log: Vec<Access>,
}

impl Recorder {
    pub fn writes(&self) -> Vec<(Lane, u16, u8, Commit)> {
        self.log
            .iter()
            .filter_map(|a| match *a {
                Access::Write(l, addr, d, c) => Some((l, addr, d, c)),
                Access::Read(..) => None,
            })
            .collect()
    }
}

impl PhyBus for Recorder {
    fn read(&mut self, lane: Lane, addr: u16) -> Result<u8, PhyError> {
        self.log.push(Access::Read(lane, addr));
        Ok(*self.mem.get(&(lane as u8, addr)).unwrap_or(&0))
    }

    fn write(
        &mut self,
        lane: Lane,
        addr: u16,
        data: u8,
        commit: Commit,
    ) -> Result<(), PhyError> {
        self.mem.insert((lane as u8, addr), data);
        self.log.push(Access::Write(lane, addr, data, commit));
        Ok(())
    }
}
