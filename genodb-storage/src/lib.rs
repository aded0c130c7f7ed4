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


//! GenoDB Storage Layer
//!
//! Durability for the local similarity index:
//!
//! - **Journal** (`journal`): append-only, CRC-checked records with
//!   threshold compaction
//! - **Recovery** (`recovery`): reload the newest intact tree, append
//!   checkpoints
//! - **Checkpoint worker** (`checkpoint`): periodic background checkpoints

pub mod checkpoint;
pub mod error;
pub mod journal;
pub mod recovery;

pub use checkpoint::CheckpointWorker;
pub use error::{JournalError, Result};
pub use journal::{scan_file, Journal, JournalScan, RecordInfo, RECORD_HEADER_SIZE};
pub use recovery::RecoveryManager;
