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

//! Node Configuration
//!
//! Index, ring, journal and checkpoint settings for a storage node. All
//! sections deserialize from JSON with per-field defaults, so a config file
//! only needs to name what it overrides.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{GenoDbError, Result};
use crate::network::NodeInfo;

/// Deepest tree level the similarity hash may descend to.
///
/// The descent prefix carries one sentinel bit and must fit a `u128`.
pub const MAX_HASH_DEPTH: u32 = 126;

/// Vantage-point index settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Points a leaf holds before it tries to split
    #[serde(default = "default_bin_size")]
    pub bin_size: usize,

    /// Tree depth used by the similarity hash
    #[serde(default = "default_hash_depth")]
    pub hash_depth: u32,
}

fn default_bin_size() -> usize {
    16
}

fn default_hash_depth() -> u32 {
    8
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            bin_size: default_bin_size(),
            hash_depth: default_hash_depth(),
        }
    }
}

impl IndexConfig {
    pub fn with_bin_size(mut self, bin_size: usize) -> Self {
        self.bin_size = bin_size;
        self
    }

    pub fn with_hash_depth(mut self, depth: u32) -> Self {
        self.hash_depth = depth;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.bin_size == 0 {
            return Err(GenoDbError::Config("bin_size must be at least 1".into()));
        }
        if self.hash_depth > MAX_HASH_DEPTH {
            return Err(GenoDbError::Config(format!(
                "hash_depth {} exceeds maximum {}",
                self.hash_depth, MAX_HASH_DEPTH
            )));
        }
        Ok(())
    }
}

/// Where the first entry of an empty ring is placed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RingPlacement {
    /// Position zero
    #[default]
    Origin,
    /// A random position drawn from the hash function
    Random,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RingConfig {
    #[serde(default)]
    pub placement: RingPlacement,
}

/// Index journal settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalConfig {
    /// Journal file path
    #[serde(default = "default_journal_path")]
    pub path: PathBuf,

    /// fsync after every appended record
    #[serde(default = "default_sync_on_write")]
    pub sync_on_write: bool,

    /// Rewrite the journal down to its latest record past this size
    #[serde(default = "default_compact_threshold")]
    pub compact_threshold_bytes: u64,
}

fn default_journal_path() -> PathBuf {
    PathBuf::from("genodb_data/index.journal")
}

fn default_sync_on_write() -> bool {
    true
}

fn default_compact_threshold() -> u64 {
    64 * 1024 * 1024
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            path: default_journal_path(),
            sync_on_write: default_sync_on_write(),
            compact_threshold_bytes: default_compact_threshold(),
        }
    }
}

impl JournalConfig {
    pub fn with_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.path = path.as_ref().to_path_buf();
        self
    }

    pub fn with_compact_threshold(mut self, bytes: u64) -> Self {
        self.compact_threshold_bytes = bytes;
        self
    }

    pub fn with_sync_on_write(mut self, sync: bool) -> Self {
        self.sync_on_write = sync;
        self
    }
}

/// Periodic checkpoint settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointConfig {
    #[serde(default = "default_checkpoint_secs")]
    pub interval_secs: u64,
}

fn default_checkpoint_secs() -> u64 {
    60
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_checkpoint_secs(),
        }
    }
}

impl CheckpointConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }
}

/// Everything a storage node needs besides the network description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfig {
    /// This node's own identity
    pub local: NodeInfo,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub ring: RingConfig,
    #[serde(default)]
    pub journal: JournalConfig,
    #[serde(default)]
    pub checkpoint: CheckpointConfig,
}

impl NodeConfig {
    pub fn new(local: NodeInfo) -> Self {
        Self {
            local,
            index: IndexConfig::default(),
            ring: RingConfig::default(),
            journal: JournalConfig::default(),
            checkpoint: CheckpointConfig::default(),
        }
    }

    pub fn with_index(mut self, index: IndexConfig) -> Self {
        self.index = index;
        self
    }

    pub fn with_journal(mut self, journal: JournalConfig) -> Self {
        self.journal = journal;
        self
    }

    pub fn with_ring(mut self, ring: RingConfig) -> Self {
        self.ring = ring;
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: NodeConfig = serde_json::from_str(json)?;
        config.index.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }
}
