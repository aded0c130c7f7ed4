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

//! Two-Level Placement
//!
//! ```text
//! record ──hash──► position ──outer ring──► group
//!                      │
//!                      └─ stretch over the group's arc ──inner ring──► node
//! ```
//!
//! A group owns only the arc ending at its outer position. Lookups inside
//! that arc are stretched linearly onto the whole inner ring, so every node
//! of the group owns part of the group's share and order along the ring is
//! kept (similar records stay on the same or neighboring nodes).

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

use genodb_core::{GroupInfo, MetadataRecord, NetworkConfig, NodeInfo, RingConfig};

use crate::error::{LookupError, PartitionerBuildError};
use crate::hash::{HashFunction, HashSpace};
use crate::ring::HashRing;

/// One row of [`Partitioner::layout`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutEntry {
    pub group: String,
    pub group_position: u128,
    pub node: NodeInfo,
    pub node_position: u128,
}

/// Owner of one position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement<'a> {
    pub position: u128,
    pub group_position: u128,
    pub group: &'a GroupInfo,
    pub node_position: u128,
    pub node: &'a NodeInfo,
}

pub struct Partitioner<P> {
    hash: Arc<dyn HashFunction<P>>,
    groups: HashRing<GroupInfo, P>,
    /// Inner ring per group position
    nodes: BTreeMap<u128, HashRing<NodeInfo, P>>,
}

impl<P> Partitioner<P> {
    pub fn build(
        network: &NetworkConfig,
        hash: Arc<dyn HashFunction<P>>,
        config: &RingConfig,
    ) -> Result<Self, PartitionerBuildError> {
        if network.groups.is_empty() {
            return Err(PartitionerBuildError::NoGroupsConfigured);
        }

        let mut groups = HashRing::new(Arc::clone(&hash), config);
        let mut nodes = BTreeMap::new();
        for group in &network.groups {
            if group.nodes.is_empty() {
                return Err(PartitionerBuildError::EmptyGroup(group.name.clone()));
            }
            let group_position = groups.add_node(group.clone())?;

            let mut ring = HashRing::new(Arc::clone(&hash), config);
            for node in &group.nodes {
                ring.add_node(node.clone())?;
            }
            nodes.insert(group_position, ring);
        }

        info!(
            groups = groups.len(),
            nodes = network.node_count(),
            bits = hash.space().bits(),
            "partitioner built"
        );
        Ok(Self {
            hash,
            groups,
            nodes,
        })
    }

    pub fn space(&self) -> HashSpace {
        self.hash.space()
    }

    pub fn hash_function(&self) -> &Arc<dyn HashFunction<P>> {
        &self.hash
    }

    pub fn group_ring(&self) -> &HashRing<GroupInfo, P> {
        &self.groups
    }

    pub fn node_ring(&self, group_position: u128) -> Option<&HashRing<NodeInfo, P>> {
        self.nodes.get(&group_position)
    }

    /// Resolve a hash position to its group and node
    pub fn locate_position(&self, position: u128) -> Result<Placement<'_>, LookupError> {
        let (group_position, group) = self.groups.locate_position(position).ok_or_else(|| {
            LookupError::NotFound(format!("no group for position {:#x}", position))
        })?;
        let ring = self.nodes.get(&group_position).ok_or_else(|| {
            LookupError::NotFound(format!("no node ring for group at {:#x}", group_position))
        })?;

        let inner = self.inner_position(position, group_position);
        let (node_position, node) = ring.locate_position(inner).ok_or_else(|| {
            LookupError::NotFound(format!(
                "no node in group '{}' for position {:#x}",
                group.name, inner
            ))
        })?;

        Ok(Placement {
            position,
            group_position,
            group,
            node_position,
            node,
        })
    }

    pub fn locate_data(&self, record: &MetadataRecord<P>) -> Result<&NodeInfo, LookupError> {
        let position = self.hash.hash(record);
        self.locate_position(position).map(|placement| placement.node)
    }

    /// Every (group, node) pair with its ring positions, in ring order
    pub fn layout(&self) -> Vec<LayoutEntry> {
        let mut rows = Vec::new();
        for (group_position, group) in self.groups.entries() {
            if let Some(ring) = self.nodes.get(&group_position) {
                for (node_position, node) in ring.entries() {
                    rows.push(LayoutEntry {
                        group: group.name.clone(),
                        group_position,
                        node: node.clone(),
                        node_position,
                    });
                }
            }
        }
        rows
    }

    /// Map `position` from the group's arc onto the whole inner ring.
    ///
    /// The arc is `(predecessor, group_position]`. The group position itself
    /// maps to itself and positions further back along the arc map further
    /// back around the inner ring.
    fn inner_position(&self, position: u128, group_position: u128) -> u128 {
        let space = self.space();
        let back = space.gap(position, group_position);
        let predecessor = match self.groups.predecessor(group_position) {
            Some(p) if p != group_position => p,
            // A lone group owns the whole ring
            _ => return position,
        };
        let arc = space.gap(predecessor, group_position);
        space.gap(stretch(back, arc, space.bits()), group_position)
    }
}

/// `floor(offset * 2^bits / arc)` for `offset < arc`, without overflow
fn stretch(offset: u128, arc: u128, bits: u32) -> u128 {
    let mut quotient = 0u128;
    let mut rem = offset;
    for _ in 0..bits {
        quotient <<= 1;
        if rem >= arc - rem {
            quotient |= 1;
            rem -= arc - rem;
        } else {
            rem <<= 1;
        }
    }
    quotient
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RingError;
    use crate::hash::ContentHash;
    use genodb_core::{KmerPoint, RingPlacement};
    use std::collections::HashSet;

    fn network(groups: &[(&str, usize)]) -> NetworkConfig {
        NetworkConfig::new(
            groups
                .iter()
                .enumerate()
                .map(|(g, (name, n))| {
                    GroupInfo::new(
                        *name,
                        (0..*n)
                            .map(|i| NodeInfo::new(format!("{}-{}.genodb", name, i), 7000 + (g * 100 + i) as u16))
                            .collect(),
                    )
                })
                .collect(),
        )
    }

    fn content(bits: u32) -> Arc<dyn HashFunction<KmerPoint>> {
        Arc::new(ContentHash::new(HashSpace::new(bits).unwrap()))
    }

    #[test]
    fn test_stretch() {
        assert_eq!(stretch(0, 16, 8), 0);
        assert_eq!(stretch(1, 16, 8), 16);
        assert_eq!(stretch(15, 16, 8), 240);
        assert_eq!(stretch(1, 3, 8), 85);
        assert_eq!(stretch(u128::MAX - 1, u128::MAX, 128), u128::MAX - 1);
    }

    #[test]
    fn test_no_groups() {
        let err = Partitioner::build(&NetworkConfig::new(vec![]), content(16), &RingConfig::default())
            .err()
            .unwrap();
        assert_eq!(err, PartitionerBuildError::NoGroupsConfigured);
    }

    #[test]
    fn test_empty_group() {
        let err = Partitioner::build(&network(&[("a", 2), ("b", 0)]), content(16), &RingConfig::default())
            .err()
            .unwrap();
        assert_eq!(err, PartitionerBuildError::EmptyGroup("b".into()));
    }

    #[test]
    fn test_tiny_space_exhausts() {
        let err = Partitioner::build(&network(&[("a", 5)]), content(2), &RingConfig::default())
            .err()
            .unwrap();
        assert!(matches!(
            err,
            PartitionerBuildError::Ring(RingError::HashSpaceExhausted { .. })
        ));
    }

    #[test]
    fn test_every_node_reachable() {
        let net = network(&[("east", 3), ("west", 2), ("north", 5)]);
        let partitioner = Partitioner::build(&net, content(12), &RingConfig::default()).unwrap();

        let reached: HashSet<NodeInfo> = (0u128..(1 << 12))
            .map(|p| partitioner.locate_position(p).unwrap().node.clone())
            .collect();
        assert_eq!(reached.len(), net.node_count());
        assert_eq!(partitioner.layout().len(), net.node_count());
    }

    #[test]
    fn test_placement_stays_in_group() {
        let net = network(&[("east", 3), ("west", 2)]);
        let partitioner = Partitioner::build(
            &net,
            content(16),
            &RingConfig {
                placement: RingPlacement::Random,
            },
        )
        .unwrap();

        for p in (0u128..(1 << 16)).step_by(97) {
            let placement = partitioner.locate_position(p).unwrap();
            assert!(placement.group.nodes.contains(placement.node));
        }
    }

    #[test]
    fn test_locate_data_is_deterministic() {
        let partitioner =
            Partitioner::build(&network(&[("a", 4), ("b", 4)]), content(128), &RingConfig::default())
                .unwrap();
        let record = MetadataRecord::new("read-1", KmerPoint::new("ACGTTGCA"));
        let first = partitioner.locate_data(&record).unwrap().clone();
        for _ in 0..10 {
            assert_eq!(partitioner.locate_data(&record).unwrap(), &first);
        }
    }
}
