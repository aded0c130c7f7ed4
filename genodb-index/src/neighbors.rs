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

//! Bounded Neighbor Set
//!
//! Keeps the `k` closest points seen so far relative to a fixed query
//! point. Backed by a max-heap on distance, so the current farthest member
//! is always at the root and eviction is O(log k).

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use genodb_core::MetricPoint;

/// A point and its distance from the query
#[derive(Debug, Clone)]
pub struct Neighbor<P> {
    pub distance: f64,
    pub point: P,
}

impl<P> PartialEq for Neighbor<P> {
    fn eq(&self, other: &Self) -> bool {
        self.distance.total_cmp(&other.distance) == Ordering::Equal
    }
}

impl<P> Eq for Neighbor<P> {}

impl<P> PartialOrd for Neighbor<P> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<P> Ord for Neighbor<P> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Max-heap: farthest neighbor at the top
        self.distance.total_cmp(&other.distance)
    }
}

/// Capacity-bounded set of the closest points to `query`
#[derive(Debug, Clone)]
pub struct BoundedNeighborSet<P> {
    query: P,
    capacity: usize,
    heap: BinaryHeap<Neighbor<P>>,
}

impl<P: MetricPoint> BoundedNeighborSet<P> {
    pub fn new(query: P, capacity: usize) -> Self {
        Self {
            query,
            capacity,
            heap: BinaryHeap::with_capacity(capacity.min(1024)),
        }
    }

    pub fn query(&self) -> &P {
        &self.query
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.heap.len() >= self.capacity
    }

    /// Offer a point; returns whether it was kept
    pub fn offer(&mut self, point: P) -> bool {
        let distance = self.query.distance(&point);
        self.offer_at(point, distance)
    }

    /// Offer a point whose distance from the query is already known
    pub fn offer_at(&mut self, point: P, distance: f64) -> bool {
        if self.capacity == 0 {
            return false;
        }
        if !self.is_full() {
            self.heap.push(Neighbor { distance, point });
            return true;
        }
        if distance < self.furthest_distance() {
            self.heap.pop();
            self.heap.push(Neighbor { distance, point });
            return true;
        }
        false
    }

    /// Distance of the farthest member, `+inf` when empty
    pub fn furthest_distance(&self) -> f64 {
        self.heap.peek().map(|n| n.distance).unwrap_or(f64::INFINITY)
    }

    /// Members in ascending distance order; the set is left untouched
    pub fn to_sorted(&self) -> Vec<Neighbor<P>> {
        self.heap.clone().into_sorted_vec()
    }

    pub fn into_sorted(self) -> Vec<Neighbor<P>> {
        self.heap.into_sorted_vec()
    }
}
