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

//! GenoDB Index Layer
//!
//! Similarity index over metric-space sequence points.
//!
//! - **VP-Tree** (`vptree`): vantage-point tree with median-distance splits,
//!   pruning k-nearest-neighbor search, and removal with subtree folding
//! - **Neighbor sets** (`neighbors`): bounded max-heap of the k closest points
//! - **Persistence** (`persistence`): depth-first binary encoding of trees
//! - **Shared tree** (`concurrent`): reader/writer-locked handle used by the
//!   placement hash and the checkpoint path

pub mod concurrent;
pub mod error;
pub mod neighbors;
pub mod persistence;
pub mod vptree;

pub use concurrent::ConcurrentVpTree;
pub use error::PartitionError;
pub use neighbors::{BoundedNeighborSet, Neighbor};
pub use vptree::{NodeView, Points, TreePath, TreeStats, VpNode, VpTree, MAX_PATH_BITS};
