// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Index Recovery
//!
//! Reloads the local VP-tree from the newest intact journal record and
//! writes checkpoints back. A journal that is missing, damaged, or holds an
//! undecodable tree yields "no prior index"; only device errors surface.

use parking_lot::Mutex;
use std::marker::PhantomData;
use std::time::Instant;
use tracing::{debug, info, warn};

use genodb_core::{Decode, Encode, JournalConfig, MetricPoint};
use genodb_index::{ConcurrentVpTree, VpTree};

use crate::error::Result;
use crate::journal::{Journal, JournalScan};

pub struct RecoveryManager<P> {
    journal: Mutex<Journal>,
    _point: PhantomData<fn() -> P>,
}

impl<P: MetricPoint + Encode + Decode> RecoveryManager<P> {
    /// Wrap an existing journal; it must be started before checkpoints
    pub fn new(journal: Journal) -> Self {
        Self {
            journal: Mutex::new(journal),
            _point: PhantomData,
        }
    }

    /// Open and start the journal described by `config`
    pub fn open(config: JournalConfig) -> Result<Self> {
        let mut journal = Journal::open(config);
        journal.start()?;
        Ok(Self::new(journal))
    }

    pub fn recover(&self) -> Result<Option<VpTree<P>>> {
        let started = Instant::now();
        let journal = self.journal.lock();
        let Some(bytes) = journal.recover()? else {
            info!(path = %journal.path().display(), "no prior index in journal");
            return Ok(None);
        };

        match VpTree::<P>::from_bytes(&bytes) {
            Ok(tree) => {
                info!(
                    path = %journal.path().display(),
                    points = tree.size(),
                    bytes = bytes.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "index recovered from journal"
                );
                Ok(Some(tree))
            }
            Err(e) => {
                warn!(
                    path = %journal.path().display(),
                    error = %e,
                    "journal record does not decode as an index; starting empty"
                );
                Ok(None)
            }
        }
    }

    /// Recovered tree, or an empty one with `bin_size`
    pub fn recover_or_empty(&self, bin_size: usize) -> Result<VpTree<P>> {
        Ok(self
            .recover()?
            .unwrap_or_else(|| VpTree::new(bin_size)))
    }

    /// Snapshot `tree` and append it to the journal.
    ///
    /// Only the serialization holds the tree's read lock; the disk write
    /// happens after it is released. Returns the snapshot size in bytes.
    pub fn checkpoint(&self, tree: &ConcurrentVpTree<P>) -> Result<usize> {
        let bytes = tree.snapshot_bytes()?;
        let offset = self.journal.lock().append(&bytes)?;
        debug!(offset, bytes = bytes.len(), "checkpoint written");
        Ok(bytes.len())
    }

    pub fn erase(&self) -> Result<()> {
        self.journal.lock().erase()
    }

    pub fn journal_len(&self) -> u64 {
        self.journal.lock().len_bytes()
    }

    pub fn scan(&self) -> Result<JournalScan> {
        self.journal.lock().scan()
    }
}
