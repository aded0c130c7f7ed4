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

//! Index error types

use thiserror::Error;

/// Why a leaf could not be split into closer/farther children.
///
/// Both cases are recoverable: the caller keeps the points in an oversized
/// leaf.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionError {
    #[error("cannot partition {count} points (need at least 2)")]
    TooFewPoints { count: usize },

    #[error("all {count} points coincide under the metric")]
    AllCoincident { count: usize },
}
