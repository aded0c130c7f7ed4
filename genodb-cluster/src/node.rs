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

//! Storage Node Placement Role
//!
//! ```text
//! Unconfigured ──configure(network)──► Configured ──serve()──► Serving
//! ```
//!
//! `configure` recovers the local tree from the journal and builds the
//! partitioner over it; `serve` starts background checkpoints and opens the
//! node to inserts and queries. There is no way back.

use std::fmt;
use std::sync::Arc;
use tracing::info;

use genodb_core::{Decode, Encode, MetadataRecord, MetricPoint, NetworkConfig, NodeConfig, NodeInfo};
use genodb_index::{ConcurrentVpTree, Neighbor, TreePath};
use genodb_storage::{CheckpointWorker, RecoveryManager};

use crate::error::{NodeError, Result};
use crate::hash::{HashFunction, HashSpace, SimilarityHash};
use crate::partitioner::Partitioner;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    Unconfigured,
    Configured,
    Serving,
}

impl NodeState {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeState::Unconfigured => "unconfigured",
            NodeState::Configured => "configured",
            NodeState::Serving => "serving",
        }
    }
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an inserted record belongs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertOutcome {
    pub owner: NodeInfo,
    pub is_local: bool,
    /// Descent path of the point in the local tree
    pub path: TreePath,
}

pub struct StorageNode<P> {
    config: NodeConfig,
    state: NodeState,
    tree: Arc<ConcurrentVpTree<P>>,
    recovery: Option<Arc<RecoveryManager<P>>>,
    partitioner: Option<Partitioner<P>>,
    worker: Option<CheckpointWorker>,
}

impl<P: MetricPoint + Encode + Decode> StorageNode<P> {
    pub fn new(config: NodeConfig) -> Result<Self> {
        config.index.validate()?;
        let tree = Arc::new(ConcurrentVpTree::empty(config.index.bin_size));
        Ok(Self {
            config,
            state: NodeState::Unconfigured,
            tree,
            recovery: None,
            partitioner: None,
            worker: None,
        })
    }

    pub fn state(&self) -> NodeState {
        self.state
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn local(&self) -> &NodeInfo {
        &self.config.local
    }

    pub fn tree(&self) -> &Arc<ConcurrentVpTree<P>> {
        &self.tree
    }

    /// Recover the local index and build placement for `network`
    pub fn configure(&mut self, network: &NetworkConfig) -> Result<()> {
        self.require(NodeState::Unconfigured)?;
        network.validate()?;
        if network.group_of(&self.config.local).is_none() {
            return Err(NodeError::UnknownLocalNode(self.config.local.to_string()));
        }

        let recovery = Arc::new(RecoveryManager::open(self.config.journal.clone())?);
        let recovered = recovery.recover_or_empty(self.config.index.bin_size)?;
        let points = recovered.size();
        self.tree.replace(recovered);

        let hash: Arc<dyn HashFunction<P>> = Arc::new(SimilarityHash::new(
            Arc::clone(&self.tree),
            self.config.index.hash_depth,
            HashSpace::FULL,
        )?);
        let partitioner = Partitioner::build(network, hash, &self.config.ring)?;

        self.recovery = Some(recovery);
        self.partitioner = Some(partitioner);
        self.state = NodeState::Configured;
        info!(
            local = %self.config.local,
            recovered_points = points,
            groups = network.groups.len(),
            "storage node configured"
        );
        Ok(())
    }

    /// Start background checkpoints and accept traffic
    pub fn serve(&mut self) -> Result<()> {
        self.require(NodeState::Configured)?;
        let recovery = self.recovery()?;
        let worker = CheckpointWorker::spawn(
            Arc::clone(recovery),
            Arc::clone(&self.tree),
            &self.config.checkpoint,
        )?;
        self.worker = Some(worker);
        self.state = NodeState::Serving;
        info!(local = %self.config.local, "storage node serving");
        Ok(())
    }

    /// Place `record` and index its point locally
    pub fn insert(&self, record: MetadataRecord<P>) -> Result<InsertOutcome> {
        self.require(NodeState::Serving)?;
        let owner = self.partitioner()?.locate_data(&record)?.clone();
        let is_local = owner == self.config.local;
        let path = self.tree.add(record.point);
        Ok(InsertOutcome {
            owner,
            is_local,
            path,
        })
    }

    pub fn locate(&self, record: &MetadataRecord<P>) -> Result<&NodeInfo> {
        Ok(self.partitioner()?.locate_data(record)?)
    }

    pub fn k_nearest(&self, query: &P, k: usize) -> Result<Vec<Neighbor<P>>> {
        self.require(NodeState::Serving)?;
        Ok(self.tree.k_nearest(query, k))
    }

    /// Write the local tree to the journal now
    pub fn checkpoint(&self) -> Result<usize> {
        Ok(self.recovery()?.checkpoint(&self.tree)?)
    }

    pub fn partitioner(&self) -> Result<&Partitioner<P>> {
        self.partitioner.as_ref().ok_or(NodeError::InvalidState {
            expected: NodeState::Configured.as_str(),
            actual: self.state.as_str(),
        })
    }

    /// Stop background checkpoints after a final one
    pub fn shutdown(mut self) {
        if let Some(worker) = self.worker.take() {
            worker.shutdown();
        }
        info!(local = %self.config.local, "storage node stopped");
    }

    fn recovery(&self) -> Result<&Arc<RecoveryManager<P>>> {
        self.recovery.as_ref().ok_or(NodeError::InvalidState {
            expected: NodeState::Configured.as_str(),
            actual: self.state.as_str(),
        })
    }

    fn require(&self, expected: NodeState) -> Result<()> {
        if self.state != expected {
            return Err(NodeError::InvalidState {
                expected: expected.as_str(),
                actual: self.state.as_str(),
            });
        }
        Ok(())
    }
}
