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

//! Error types for placement

use thiserror::Error;

use genodb_core::GenoDbError;
use genodb_storage::JournalError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RingError {
    #[error("hash space exhausted: position {position:#x} is already taken")]
    HashSpaceExhausted { position: u128 },

    #[error("hash space must be 1..=128 bits wide, got {bits}")]
    InvalidSpace { bits: u32 },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("not found: {0}")]
    NotFound(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PartitionerBuildError {
    #[error("network configuration has no groups")]
    NoGroupsConfigured,

    #[error("group '{0}' has no nodes")]
    EmptyGroup(String),

    #[error(transparent)]
    Ring(#[from] RingError),
}

#[derive(Error, Debug)]
pub enum NodeError {
    #[error("storage node is {actual}, operation requires {expected}")]
    InvalidState {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("local node {0} is not part of the network configuration")]
    UnknownLocalNode(String),

    #[error(transparent)]
    Config(#[from] GenoDbError),

    #[error(transparent)]
    Journal(#[from] JournalError),

    #[error(transparent)]
    Build(#[from] PartitionerBuildError),

    #[error(transparent)]
    Lookup(#[from] LookupError),
}

pub type Result<T> = std::result::Result<T, NodeError>;
