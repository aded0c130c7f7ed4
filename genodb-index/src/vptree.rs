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

//! Vantage-Point Tree
//!
//! Recursive partitioning of a metric space around a chosen center point:
//!
//! ```text
//!                    ┌──────────────────────┐
//!                    │ center c, threshold t│
//!                    └──────────┬───────────┘
//!              d(c,p) <= t      │      d(c,p) > t
//!             ┌─────────────────┴─────────────────┐
//!        ┌────▼────┐                         ┌────▼────┐
//!        │ closer  │                         │ farther │
//!        └─────────┘                         └─────────┘
//! ```
//!
//! Nodes start as leaves holding up to `bin_size` points. A leaf that
//! overflows is split once at the (approximate) median distance from its
//! center; ties always land in "closer". When every point coincides with
//! the center the split fails and the leaf is simply allowed to grow past
//! `bin_size`.
//!
//! Removal that empties a leaf folds the parent's children back into the
//! parent; a merged node that overflows is split again.
//!
//! ## Complexity
//!
//! | Operation | Average | Worst (degenerate splits) |
//! |-----------|---------|---------------------------|
//! | add       | O(log n)| O(n)                      |
//! | k_nearest | O(log n)| O(n)                      |
//! | remove    | O(log n)| O(n)                      |

use std::any::type_name;
use std::fmt;
use std::mem;

use genodb_core::{verify_metric_space, GenoDbError, IndexConfig, MetricPoint};
use tracing::{debug, warn};

use crate::error::PartitionError;
use crate::neighbors::{BoundedNeighborSet, Neighbor};

/// Most descent bits a [`TreePath`] records (one bit is kept for the sentinel)
pub const MAX_PATH_BITS: u32 = 127;

// =============================================================================
// Tree paths
// =============================================================================

/// Descent path from the root: one bit per internal node, `0` = closer,
/// `1` = farther. Paths deeper than [`MAX_PATH_BITS`] are truncated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TreePath {
    bits: u128,
    len: u32,
}

impl TreePath {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, farther: bool) {
        if self.len < MAX_PATH_BITS {
            self.bits = (self.bits << 1) | farther as u128;
            self.len += 1;
        }
    }

    /// Number of recorded descent steps
    pub fn len(&self) -> u32 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Raw descent bits, most significant = first step
    pub fn bits(&self) -> u128 {
        self.bits
    }

    /// Step `i` from the root (`true` = farther)
    pub fn step(&self, i: u32) -> Option<bool> {
        if i >= self.len {
            return None;
        }
        Some((self.bits >> (self.len - 1 - i)) & 1 == 1)
    }

    /// The path as an integer with a leading sentinel bit, so `1` and `01`
    /// stay distinct
    pub fn to_integer(&self) -> u128 {
        (1u128 << self.len) | self.bits
    }
}

impl fmt::Display for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.len == 0 {
            return f.write_str("ε");
        }
        for i in 0..self.len {
            let bit = if self.step(i) == Some(true) { '1' } else { '0' };
            write!(f, "{}", bit)?;
        }
        Ok(())
    }
}

// =============================================================================
// Partitioning
// =============================================================================

/// One Hoare-style pass around the distance at `median`: smaller distances
/// move left, larger ones right. Ties with the pivot may end up on either
/// side, so the element left at `median` is only an approximate median.
fn hoare_pass<P>(points: &mut [P], dists: &mut [f64], median: usize) {
    let pivot = dists[median];
    let last = dists.len() - 1;
    let mut i = 0usize;
    let mut j = last;
    loop {
        while i < last && dists[i] < pivot {
            i += 1;
        }
        while j > 0 && dists[j] > pivot {
            j -= 1;
        }
        if i >= j {
            return;
        }
        dists.swap(i, j);
        points.swap(i, j);
        i += 1;
        j -= 1;
    }
}

/// Pick the split threshold after reordering `points` around the median
/// distance. Requires at least two distinct distances.
fn select_threshold<P>(points: &mut [P], dists: &mut [f64]) -> f64 {
    let n = dists.len();
    let median = (n - 1) / 2;
    hoare_pass(points, dists, median);
    let median_distance = dists[median];

    // Something strictly farther than the median: split at the median itself
    if dists[median + 1..].iter().any(|&d| d > median_distance) {
        return median_distance;
    }

    // Otherwise the nearest smaller distance towards the front
    if let Some(&below) = dists[..=median].iter().rev().find(|&&d| d < median_distance) {
        return below;
    }

    // Only the center (or its duplicates) sits below everything else
    dists.iter().copied().fold(f64::INFINITY, f64::min)
}

fn distance_range(dists: &[f64]) -> (f64, f64) {
    dists
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &d| (lo.min(d), hi.max(d)))
}

/// Result of splitting a point list
struct Split<P> {
    center: P,
    threshold: f64,
    closer: Vec<P>,
    farther: Vec<P>,
}

/// Split `points` around `center` (the first point when unset).
///
/// On failure `points` is left holding every point, possibly reordered.
fn partition_points<P: MetricPoint>(
    center: &mut Option<P>,
    points: &mut Vec<P>,
) -> Result<Split<P>, PartitionError> {
    let count = points.len();
    if count < 2 {
        return Err(PartitionError::TooFewPoints { count });
    }

    let mut vantage = center.take().unwrap_or_else(|| points[0].clone());
    let mut dists: Vec<f64> = points.iter().map(|p| vantage.distance(p)).collect();
    let (lo, hi) = distance_range(&dists);

    if lo == hi {
        if hi == 0.0 {
            *center = Some(vantage);
            return Err(PartitionError::AllCoincident { count });
        }
        // The center no longer belongs to this leaf and every point is
        // equidistant from it: move the vantage point onto the first point.
        vantage = points[0].clone();
        dists = points.iter().map(|p| vantage.distance(p)).collect();
        let (lo, hi) = distance_range(&dists);
        if lo == hi {
            *center = Some(vantage);
            return Err(PartitionError::AllCoincident { count });
        }
    }

    let threshold = select_threshold(points, &mut dists);

    // Closer side first, ties included
    let mut split = 0;
    for k in 0..count {
        if dists[k] <= threshold {
            points.swap(k, split);
            dists.swap(k, split);
            split += 1;
        }
    }
    debug_assert!(split > 0 && split < count, "degenerate split {} of {}", split, count);

    let mut closer = mem::take(points);
    let farther = closer.split_off(split);
    Ok(Split {
        center: vantage,
        threshold,
        closer,
        farther,
    })
}

// =============================================================================
// Nodes
// =============================================================================

enum NodeBody<P> {
    Leaf {
        /// Provisional center, used once the leaf splits
        center: Option<P>,
        points: Vec<P>,
    },
    Internal {
        center: P,
        threshold: f64,
        closer: Box<VpNode<P>>,
        farther: Box<VpNode<P>>,
    },
}

/// A vantage-point tree node: either a leaf of points or an internal
/// center/threshold split with exactly two children.
///
/// Every walk over a subtree (insert, search, removal, encoding, drop) uses
/// an explicit stack, so tree depth is bounded by memory and not by the
/// thread stack.
pub struct VpNode<P> {
    bin_size: usize,
    depth: u32,
    body: NodeBody<P>,
}

/// Borrowed view of a node's contents
pub enum NodeView<'a, P> {
    Leaf {
        center: Option<&'a P>,
        points: &'a [P],
    },
    Internal {
        center: &'a P,
        threshold: f64,
        closer: &'a VpNode<P>,
        farther: &'a VpNode<P>,
    },
}

/// Pending work in a k-nearest search
enum SearchStep<'a, P> {
    Visit(&'a VpNode<P>),
    /// Side away from the query; visited only if it can still hold a closer
    /// point than the current furthest
    Far { node: &'a VpNode<P>, margin: f64 },
}

impl<P> VpNode<P> {
    fn take_body(&mut self) -> NodeBody<P> {
        mem::replace(
            &mut self.body,
            NodeBody::Leaf {
                center: None,
                points: Vec::new(),
            },
        )
    }

    /// Depth-first iterator over every point in this subtree
    pub fn points(&self) -> Points<'_, P> {
        Points {
            stack: vec![self],
            current: [].iter(),
        }
    }
}

impl<P: MetricPoint> VpNode<P> {
    /// An empty leaf
    pub fn new(bin_size: usize, depth: u32) -> Self {
        Self {
            bin_size,
            depth,
            body: NodeBody::Leaf {
                center: None,
                points: Vec::new(),
            },
        }
    }

    /// Build a subtree from `points`, splitting while leaves overflow
    pub fn build(points: Vec<P>, bin_size: usize, depth: u32) -> Self {
        let center = points.first().cloned();
        let mut node = Self::from_parts_leaf(bin_size, depth, center, points);
        node.settle();
        node
    }

    pub(crate) fn from_parts_leaf(bin_size: usize, depth: u32, center: Option<P>, points: Vec<P>) -> Self {
        Self {
            bin_size,
            depth,
            body: NodeBody::Leaf { center, points },
        }
    }

    pub(crate) fn from_parts_internal(
        bin_size: usize,
        depth: u32,
        center: P,
        threshold: f64,
        closer: VpNode<P>,
        farther: VpNode<P>,
    ) -> Self {
        Self {
            bin_size,
            depth,
            body: NodeBody::Internal {
                center,
                threshold,
                closer: Box::new(closer),
                farther: Box::new(farther),
            },
        }
    }

    pub fn bin_size(&self) -> usize {
        self.bin_size
    }

    /// Distance from the root (root = 0)
    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.body, NodeBody::Leaf { .. })
    }

    pub fn view(&self) -> NodeView<'_, P> {
        match &self.body {
            NodeBody::Leaf { center, points } => NodeView::Leaf {
                center: center.as_ref(),
                points,
            },
            NodeBody::Internal {
                center,
                threshold,
                closer,
                farther,
            } => NodeView::Internal {
                center,
                threshold: *threshold,
                closer,
                farther,
            },
        }
    }

    /// Points held directly by this leaf.
    ///
    /// # Panics
    /// On an internal node.
    pub fn leaf_points(&self) -> &[P] {
        match &self.body {
            NodeBody::Leaf { points, .. } => points,
            NodeBody::Internal { .. } => panic!("leaf_points called on internal VpNode at depth {}", self.depth),
        }
    }

    fn leaf_len(&self) -> usize {
        self.leaf_points().len()
    }

    fn is_empty_leaf(&self) -> bool {
        matches!(&self.body, NodeBody::Leaf { points, .. } if points.is_empty())
    }

    /// Which child `point` descends into (`true` = farther); `None` at a leaf
    fn route(&self, point: &P) -> Option<bool> {
        match &self.body {
            NodeBody::Internal { center, threshold, .. } => Some(center.distance(point) > *threshold),
            NodeBody::Leaf { .. } => None,
        }
    }

    /// # Panics
    /// On a leaf.
    fn child_mut(&mut self, farther: bool) -> &mut VpNode<P> {
        let depth = self.depth;
        match &mut self.body {
            NodeBody::Internal {
                closer,
                farther: far,
                ..
            } => {
                if farther {
                    &mut **far
                } else {
                    &mut **closer
                }
            }
            NodeBody::Leaf { .. } => panic!("child_mut called on leaf VpNode at depth {}", depth),
        }
    }

    fn descend_mut(&mut self, steps: &[bool]) -> &mut VpNode<P> {
        let mut node = self;
        for &farther in steps {
            node = node.child_mut(farther);
        }
        node
    }

    /// Split this leaf into closer/farther children, splitting those in turn
    /// while they overflow.
    ///
    /// # Panics
    /// On an internal node.
    pub fn partition(&mut self) -> Result<(), PartitionError> {
        self.split_once()?;
        if let NodeBody::Internal { closer, farther, .. } = &mut self.body {
            closer.settle();
            farther.settle();
        }
        Ok(())
    }

    /// Split this leaf once; both children start as leaves
    fn split_once(&mut self) -> Result<(), PartitionError> {
        let (bin_size, depth) = (self.bin_size, self.depth);
        let split = match &mut self.body {
            NodeBody::Leaf { center, points } => partition_points(center, points)?,
            NodeBody::Internal { .. } => panic!("partition called on internal VpNode at depth {}", depth),
        };
        let closer_center = split.closer.first().cloned();
        let farther_center = split.farther.first().cloned();
        self.body = NodeBody::Internal {
            center: split.center,
            threshold: split.threshold,
            closer: Box::new(VpNode::from_parts_leaf(bin_size, depth + 1, closer_center, split.closer)),
            farther: Box::new(VpNode::from_parts_leaf(bin_size, depth + 1, farther_center, split.farther)),
        };
        Ok(())
    }

    /// Split every overflowing leaf of this subtree. A leaf that cannot be
    /// split is kept oversized.
    fn settle(&mut self) {
        let mut pending: Vec<&mut VpNode<P>> = vec![self];
        while let Some(node) = pending.pop() {
            if !node.is_leaf() || node.leaf_len() <= node.bin_size {
                continue;
            }
            if let Err(err) = node.split_once() {
                debug!(depth = node.depth, %err, "keeping oversized leaf");
                continue;
            }
            if let NodeBody::Internal { closer, farther, .. } = &mut node.body {
                pending.push(&mut **farther);
                pending.push(&mut **closer);
            }
        }
    }

    /// Insert a point, recording the descent path into `path`
    pub fn add(&mut self, point: P, path: &mut TreePath) {
        let mut node = self;
        while let Some(farther) = node.route(&point) {
            path.push(farther);
            node = node.child_mut(farther);
        }
        if let NodeBody::Leaf { center, points } = &mut node.body {
            if center.is_none() {
                *center = Some(point.clone());
            }
            points.push(point);
        }
        node.settle();
    }

    /// Remove one point equal to `point` from this leaf.
    ///
    /// # Panics
    /// On an internal node.
    pub fn remove_from_leaf(&mut self, point: &P) -> bool
    where
        P: PartialEq,
    {
        match &mut self.body {
            NodeBody::Leaf { center, points } => match points.iter().position(|p| p == point) {
                Some(idx) => {
                    points.remove(idx);
                    if points.is_empty() {
                        *center = None;
                    }
                    true
                }
                None => false,
            },
            NodeBody::Internal { .. } => panic!("remove_from_leaf called on internal VpNode at depth {}", self.depth),
        }
    }

    /// Walk down to the owning leaf and remove `point`. When a leaf empties,
    /// its parent folds both children back into itself, and so on upwards
    /// while the folded node is itself empty.
    fn remove(&mut self, point: &P) -> bool
    where
        P: PartialEq,
    {
        let mut steps = Vec::new();
        let mut node = &mut *self;
        while let Some(farther) = node.route(point) {
            steps.push(farther);
            node = node.child_mut(farther);
        }
        if !node.remove_from_leaf(point) {
            return false;
        }

        let mut emptied = node.is_empty_leaf();
        while emptied && steps.pop().is_some() {
            let parent = self.descend_mut(&steps);
            parent.absorb_children();
            emptied = parent.is_empty_leaf();
            parent.settle();
        }
        true
    }

    /// Undo a partition: pull every descendant point back into this node
    /// as a leaf.
    pub fn absorb_children(&mut self) {
        match self.take_body() {
            NodeBody::Internal {
                center,
                closer,
                farther,
                ..
            } => {
                let mut points = (*closer).into_points();
                points.extend((*farther).into_points());
                debug!(depth = self.depth, merged = points.len(), "absorbed children");
                let center = if points.is_empty() { None } else { Some(center) };
                self.body = NodeBody::Leaf { center, points };
            }
            leaf @ NodeBody::Leaf { .. } => self.body = leaf,
        }
    }

    /// Consume the subtree, returning every point it holds
    pub fn into_points(mut self) -> Vec<P> {
        let mut out = Vec::new();
        let mut pending = vec![self.take_body()];
        while let Some(body) = pending.pop() {
            match body {
                NodeBody::Leaf { points, .. } => out.extend(points),
                NodeBody::Internal {
                    mut closer,
                    mut farther,
                    ..
                } => {
                    pending.push(farther.take_body());
                    pending.push(closer.take_body());
                }
            }
        }
        out
    }

    fn search(&self, set: &mut BoundedNeighborSet<P>) {
        let mut pending = vec![SearchStep::Visit(self)];
        while let Some(step) = pending.pop() {
            let node = match step {
                SearchStep::Visit(node) => node,
                SearchStep::Far { node, margin } => {
                    if set.is_full() && margin > set.furthest_distance() {
                        continue;
                    }
                    node
                }
            };
            match &node.body {
                NodeBody::Leaf { points, .. } => {
                    for p in points {
                        let d = set.query().distance(p);
                        if !set.is_full() || d < set.furthest_distance() {
                            set.offer_at(p.clone(), d);
                        }
                    }
                }
                NodeBody::Internal {
                    center,
                    threshold,
                    closer,
                    farther,
                } => {
                    let d = center.distance(set.query());
                    let (near, far) = if d <= *threshold {
                        (closer, farther)
                    } else {
                        (farther, closer)
                    };
                    pending.push(SearchStep::Far {
                        node: &**far,
                        margin: (*threshold - d).abs(),
                    });
                    pending.push(SearchStep::Visit(&**near));
                }
            }
        }
    }

    fn path_of(&self, point: &P, depth: u32) -> TreePath {
        let mut path = TreePath::new();
        let mut node = self;
        while let NodeBody::Internal {
            center,
            threshold,
            closer,
            farther,
        } = &node.body
        {
            if node.depth >= depth {
                break;
            }
            let go_farther = center.distance(point) > *threshold;
            path.push(go_farther);
            node = if go_farther { &**farther } else { &**closer };
        }
        path
    }

    fn accumulate_stats(&self, stats: &mut TreeStats) {
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            stats.max_depth = stats.max_depth.max(node.depth);
            match &node.body {
                NodeBody::Leaf { points, .. } => {
                    stats.size += points.len();
                    stats.leaf_count += 1;
                    if points.len() > node.bin_size {
                        stats.oversized_leaves += 1;
                    }
                }
                NodeBody::Internal { closer, farther, .. } => {
                    stats.internal_count += 1;
                    pending.push(&**farther);
                    pending.push(&**closer);
                }
            }
        }
    }
}

impl<P> Drop for VpNode<P> {
    fn drop(&mut self) {
        // Detach children onto a heap stack so deep chains do not recurse
        let mut pending: Vec<Box<VpNode<P>>> = Vec::new();
        let mut body = self.take_body();
        loop {
            if let NodeBody::Internal { closer, farther, .. } = body {
                pending.push(closer);
                pending.push(farther);
            }
            let Some(mut node) = pending.pop() else {
                break;
            };
            body = node.take_body();
        }
    }
}

impl<P: fmt::Debug> fmt::Debug for VpNode<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.body {
            NodeBody::Leaf { center, points } => f
                .debug_struct("Leaf")
                .field("depth", &self.depth)
                .field("center", center)
                .field("points", points)
                .finish(),
            NodeBody::Internal {
                center,
                threshold,
                closer,
                farther,
            } => f
                .debug_struct("Internal")
                .field("depth", &self.depth)
                .field("center", center)
                .field("threshold", threshold)
                .field("closer_points", &closer.points().count())
                .field("farther_points", &farther.points().count())
                .finish(),
        }
    }
}

// =============================================================================
// Tree
// =============================================================================

/// Shape statistics for a tree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeStats {
    pub size: usize,
    pub leaf_count: usize,
    pub internal_count: usize,
    pub max_depth: u32,
    pub oversized_leaves: usize,
}

/// Root handle of a vantage-point tree
pub struct VpTree<P> {
    bin_size: usize,
    len: usize,
    root: VpNode<P>,
}

fn note_metric_assumption<P: MetricPoint>() {
    if !P::IS_METRIC {
        warn!(
            point_type = type_name::<P>(),
            "distance is not a true metric; nearest-neighbor pruning is approximate"
        );
    }
}

impl<P: MetricPoint> VpTree<P> {
    /// An empty tree. A `bin_size` of zero is treated as one.
    pub fn new(bin_size: usize) -> Self {
        note_metric_assumption::<P>();
        let bin_size = bin_size.max(1);
        Self {
            bin_size,
            len: 0,
            root: VpNode::new(bin_size, 0),
        }
    }

    pub fn with_config(config: &IndexConfig) -> Self {
        Self::new(config.bin_size)
    }

    /// Bulk-build a tree from `points`
    pub fn build(points: Vec<P>, bin_size: usize) -> Self {
        note_metric_assumption::<P>();
        let bin_size = bin_size.max(1);
        let len = points.len();
        Self {
            bin_size,
            len,
            root: VpNode::build(points, bin_size, 0),
        }
    }

    pub(crate) fn from_root(bin_size: usize, root: VpNode<P>) -> Self {
        let mut stats = TreeStats::default();
        root.accumulate_stats(&mut stats);
        Self {
            bin_size,
            len: stats.size,
            root,
        }
    }

    pub fn bin_size(&self) -> usize {
        self.bin_size
    }

    pub fn size(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn root(&self) -> &VpNode<P> {
        &self.root
    }

    /// Insert a point; returns the descent path to the leaf that took it
    pub fn add(&mut self, point: P) -> TreePath {
        let mut path = TreePath::new();
        self.root.add(point, &mut path);
        self.len += 1;
        path
    }

    pub fn add_all<I: IntoIterator<Item = P>>(&mut self, points: I) {
        for point in points {
            self.add(point);
        }
    }

    /// Remove one occurrence of `point`; returns whether it was present
    pub fn remove(&mut self, point: &P) -> bool
    where
        P: PartialEq,
    {
        let removed = self.root.remove(point);
        if removed {
            self.len -= 1;
        }
        removed
    }

    /// Remove every listed point; returns how many were present
    pub fn remove_all<'a, I>(&mut self, points: I) -> usize
    where
        P: PartialEq + 'a,
        I: IntoIterator<Item = &'a P>,
    {
        points.into_iter().filter(|p| self.remove(p)).count()
    }

    /// The `k` closest points to `query`, ascending by distance
    pub fn k_nearest(&self, query: &P, k: usize) -> Vec<Neighbor<P>> {
        let mut set = BoundedNeighborSet::new(query.clone(), k);
        if k > 0 {
            self.root.search(&mut set);
        }
        set.into_sorted()
    }

    pub fn nearest(&self, query: &P) -> Option<Neighbor<P>> {
        self.k_nearest(query, 1).into_iter().next()
    }

    /// Descent path of `point`, stopping at the first node whose depth is
    /// at least `depth` or at a leaf
    pub fn path_of(&self, point: &P, depth: u32) -> TreePath {
        self.root.path_of(point, depth)
    }

    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats::default();
        self.root.accumulate_stats(&mut stats);
        stats
    }

    /// Depth-first iterator over every stored point
    pub fn points(&self) -> Points<'_, P> {
        self.root.points()
    }

    /// Sample the metric axioms over the stored points
    pub fn verify_metric(&self, samples: usize) -> genodb_core::Result<()> {
        let points: Vec<P> = self.points().cloned().collect();
        verify_metric_space(&points, samples).map_err(GenoDbError::MetricViolation)
    }

    pub fn into_points(self) -> Vec<P> {
        self.root.into_points()
    }
}

impl<P: fmt::Debug> fmt::Debug for VpTree<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VpTree")
            .field("bin_size", &self.bin_size)
            .field("len", &self.len)
            .field("root", &self.root)
            .finish()
    }
}

/// Iterator returned by [`VpTree::points`]
pub struct Points<'a, P> {
    stack: Vec<&'a VpNode<P>>,
    current: std::slice::Iter<'a, P>,
}

impl<'a, P> Iterator for Points<'a, P> {
    type Item = &'a P;

    fn next(&mut self) -> Option<&'a P> {
        loop {
            if let Some(p) = self.current.next() {
                return Some(p);
            }
            let node = self.stack.pop()?;
            match &node.body {
                NodeBody::Leaf { points, .. } => self.current = points.iter(),
                NodeBody::Internal { closer, farther, .. } => {
                    self.stack.push(farther);
                    self.stack.push(closer);
                }
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
