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


//! GenoDB Placement Layer
//!
//! Resolves sequence records to storage nodes through two nested
//! consistent-hash rings. The hash itself comes from the local VP-tree, so
//! records with similar sequences land on the same nodes.
//!
//! - `hash`: hash space arithmetic, content and similarity hashes
//! - `ring`: balanced consistent-hash ring
//! - `partitioner`: group ring over per-group node rings
//! - `node`: storage node lifecycle tying index, journal, and placement

pub mod error;
pub mod hash;
pub mod node;
pub mod partitioner;
pub mod ring;

pub use error::{LookupError, NodeError, PartitionerBuildError, RingError};
pub use hash::{ContentHash, HashFunction, HashSpace, SimilarityHash};
pub use node::{InsertOutcome, NodeState, StorageNode};
pub use partitioner::{LayoutEntry, Partitioner, Placement};
pub use ring::HashRing;
