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

//! Error types for journal storage

use std::io;
use thiserror::Error;

use genodb_core::GenoDbError;

#[derive(Error, Debug)]
pub enum JournalError {
    #[error("journal has not been started")]
    NotStarted,

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("checksum mismatch in record at offset {offset}: stored {expected:#x}, computed {actual:#x}")]
    ChecksumMismatch {
        offset: u64,
        expected: u64,
        actual: u64,
    },

    #[error("record at offset {offset} is truncated")]
    Truncated { offset: u64 },

    #[error("codec error: {0}")]
    Codec(String),
}

impl JournalError {
    /// Damage to the journal contents, as opposed to a failing device
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            JournalError::ChecksumMismatch { .. } | JournalError::Truncated { .. }
        )
    }
}

impl From<GenoDbError> for JournalError {
    fn from(err: GenoDbError) -> Self {
        match err {
            GenoDbError::Io(e) => JournalError::Io(e),
            other => JournalError::Codec(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, JournalError>;
