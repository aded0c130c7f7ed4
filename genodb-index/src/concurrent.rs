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

//! Shared VP-Tree
//!
//! One coarse reader/writer lock around the whole tree. Partitioning and
//! absorption replace child subtrees wholesale, so every mutation takes the
//! write lock and every traversal (queries, hash descent, snapshots) takes
//! the read lock.

use parking_lot::RwLock;

use genodb_core::{Encode, MetricPoint, Result};

use crate::neighbors::Neighbor;
use crate::vptree::{TreePath, TreeStats, VpTree};

pub struct ConcurrentVpTree<P> {
    inner: RwLock<VpTree<P>>,
}

impl<P: MetricPoint> ConcurrentVpTree<P> {
    pub fn new(tree: VpTree<P>) -> Self {
        Self {
            inner: RwLock::new(tree),
        }
    }

    pub fn empty(bin_size: usize) -> Self {
        Self::new(VpTree::new(bin_size))
    }

    pub fn add(&self, point: P) -> TreePath {
        self.inner.write().add(point)
    }

    pub fn add_all<I: IntoIterator<Item = P>>(&self, points: I) {
        self.inner.write().add_all(points)
    }

    pub fn remove(&self, point: &P) -> bool
    where
        P: PartialEq,
    {
        self.inner.write().remove(point)
    }

    pub fn k_nearest(&self, query: &P, k: usize) -> Vec<Neighbor<P>> {
        self.inner.read().k_nearest(query, k)
    }

    pub fn nearest(&self, query: &P) -> Option<Neighbor<P>> {
        self.inner.read().nearest(query)
    }

    pub fn path_of(&self, point: &P, depth: u32) -> TreePath {
        self.inner.read().path_of(point, depth)
    }

    pub fn size(&self) -> usize {
        self.inner.read().size()
    }

    pub fn stats(&self) -> TreeStats {
        self.inner.read().stats()
    }

    /// Serialize under the read lock; callers do the I/O after release
    pub fn snapshot_bytes(&self) -> Result<Vec<u8>>
    where
        P: Encode,
    {
        self.inner.read().to_bytes()
    }

    /// Swap in a whole tree (used after recovery)
    pub fn replace(&self, tree: VpTree<P>) -> VpTree<P> {
        std::mem::replace(&mut *self.inner.write(), tree)
    }

    /// Run `f` against the tree under the read lock
    pub fn with_tree<R>(&self, f: impl FnOnce(&VpTree<P>) -> R) -> R {
        f(&self.inner.read())
    }
}
