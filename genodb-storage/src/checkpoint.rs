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

//! Background Checkpointing
//!
//! A dedicated thread writes the shared tree to the journal on a fixed tick,
//! keeping journal I/O off query-serving threads. Shutdown takes one last
//! checkpoint before the thread exits.
//!
//! ```text
//! tick ──► snapshot (read lock) ──► journal append ──► wait
//!   ▲                                                   │
//!   └───────────────────────────────────────────────────┘
//! shutdown ──► final checkpoint ──► exit
//! ```

use crossbeam_channel::{bounded, select, tick, Sender};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, warn};

use genodb_core::{CheckpointConfig, Decode, Encode, MetricPoint};
use genodb_index::ConcurrentVpTree;

use crate::error::Result;
use crate::recovery::RecoveryManager;

const MIN_INTERVAL: Duration = Duration::from_millis(1);

pub struct CheckpointWorker {
    shutdown: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
    completed: Arc<AtomicU64>,
}

impl CheckpointWorker {
    pub fn spawn<P>(
        recovery: Arc<RecoveryManager<P>>,
        tree: Arc<ConcurrentVpTree<P>>,
        config: &CheckpointConfig,
    ) -> Result<Self>
    where
        P: MetricPoint + Encode + Decode,
    {
        Self::spawn_with_interval(recovery, tree, config.interval())
    }

    pub fn spawn_with_interval<P>(
        recovery: Arc<RecoveryManager<P>>,
        tree: Arc<ConcurrentVpTree<P>>,
        interval: Duration,
    ) -> Result<Self>
    where
        P: MetricPoint + Encode + Decode,
    {
        let interval = interval.max(MIN_INTERVAL);
        let (shutdown_tx, shutdown_rx) = bounded::<()>(1);
        let completed = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&completed);

        let handle = thread::Builder::new()
            .name("genodb-checkpoint".into())
            .spawn(move || {
                let ticker = tick(interval);
                let run = |reason: &str| match recovery.checkpoint(&tree) {
                    Ok(bytes) => {
                        counter.fetch_add(1, Ordering::Relaxed);
                        debug!(bytes, reason, "checkpoint complete");
                    }
                    Err(e) => warn!(error = %e, reason, "checkpoint failed"),
                };

                loop {
                    select! {
                        recv(ticker) -> _ => run("interval"),
                        recv(shutdown_rx) -> _ => {
                            run("shutdown");
                            break;
                        }
                    }
                }
            })?;

        info!(interval_ms = interval.as_millis() as u64, "checkpoint worker started");
        Ok(Self {
            shutdown: Some(shutdown_tx),
            handle: Some(handle),
            completed,
        })
    }

    /// Checkpoints written so far
    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }

    /// Stop the worker after a final checkpoint
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        // Dropping the sender also wakes the select
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("checkpoint worker panicked");
            } else {
                info!(checkpoints = self.completed(), "checkpoint worker stopped");
            }
        }
    }
}

impl Drop for CheckpointWorker {
    fn drop(&mut self) {
        self.stop();
    }
}
