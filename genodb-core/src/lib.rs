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

//! GenoDB Core
//!
//! Fundamental types shared by the index, storage and cluster layers.
//!
//! # Core Components
//!
//! - **Metric points** (`metric`): the distance contract every indexed value
//!   satisfies, plus sampling verification of the metric axioms
//! - **Sequence points** (`kmer`): nucleotide k-mers and protein fragments
//! - **Records** (`record`): named sequence fragments
//! - **Network identities** (`network`): static cluster description
//! - **Binary codec** (`codec`): length-prefixed little-endian encoding
//! - **Configuration** (`config`): per-node settings with serde defaults

pub mod codec;
pub mod config;
pub mod error;
pub mod kmer;
pub mod metric;
pub mod network;
pub mod record;

pub use codec::{Decode, Encode};
pub use config::{
    CheckpointConfig, IndexConfig, JournalConfig, NodeConfig, RingConfig, RingPlacement,
    MAX_HASH_DEPTH,
};
pub use error::{GenoDbError, Result};
pub use kmer::{KmerPoint, ProteinPoint};
pub use metric::{verify_metric_space, MetricPoint, MetricViolation};
pub use network::{GroupInfo, NetworkConfig, NodeInfo};
pub use record::MetadataRecord;
