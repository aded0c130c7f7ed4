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

//! VP-Tree Persistence
//!
//! Depth-first, leaf-flag-prefixed encoding of a tree. Both directions walk
//! with an explicit stack, so any depth the tree can reach round-trips:
//!
//! ```text
//! tree  := bin_size:u32 node
//! node  := is_leaf:u8 bin_size:u32 depth:u32 center:Option<P> body
//! body  := count:u32 P*                    (leaf)
//!        | threshold:f64 node node         (internal: closer, farther)
//! ```

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

use genodb_core::codec::{read_bool, write_bool};
use genodb_core::{Decode, Encode, GenoDbError, MetricPoint, Result};

use crate::vptree::{NodeView, VpNode, VpTree};

impl<P: MetricPoint + Encode> Encode for VpNode<P> {
    fn encode<W: Write>(&self, writer: &mut W) -> Result<()> {
        // Pre-order, closer before farther
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            write_bool(writer, node.is_leaf())?;
            writer.write_u32::<LittleEndian>(node.bin_size() as u32)?;
            writer.write_u32::<LittleEndian>(node.depth())?;
            match node.view() {
                NodeView::Leaf { center, points } => {
                    center.cloned().encode(writer)?;
                    writer.write_u32::<LittleEndian>(points.len() as u32)?;
                    for p in points {
                        p.encode(writer)?;
                    }
                }
                NodeView::Internal {
                    center,
                    threshold,
                    closer,
                    farther,
                } => {
                    write_bool(writer, true)?;
                    center.encode(writer)?;
                    writer.write_f64::<LittleEndian>(threshold)?;
                    pending.push(farther);
                    pending.push(closer);
                }
            }
        }
        Ok(())
    }
}

/// Internal node whose children are still being read
struct PendingInternal<P> {
    bin_size: usize,
    depth: u32,
    center: P,
    threshold: f64,
    closer: Option<VpNode<P>>,
}

fn decode_node<P, R>(reader: &mut R) -> Result<VpNode<P>>
where
    P: MetricPoint + Decode,
    R: Read,
{
    let mut open: Vec<PendingInternal<P>> = Vec::new();
    let mut expected_depth = 0u32;
    loop {
        let is_leaf = read_bool(reader)?;
        let bin_size = reader.read_u32::<LittleEndian>()? as usize;
        let depth = reader.read_u32::<LittleEndian>()?;
        if depth != expected_depth {
            return Err(GenoDbError::Codec(format!(
                "node depth {} where {} was expected",
                depth, expected_depth
            )));
        }
        let center = Option::<P>::decode(reader)?;

        if !is_leaf {
            let center = center.ok_or_else(|| {
                GenoDbError::Codec(format!("internal node at depth {} has no center", depth))
            })?;
            let threshold = reader.read_f64::<LittleEndian>()?;
            open.push(PendingInternal {
                bin_size,
                depth,
                center,
                threshold,
                closer: None,
            });
            expected_depth = depth.checked_add(1).ok_or_else(|| {
                GenoDbError::Codec("node depth overflows u32".into())
            })?;
            continue;
        }

        let count = reader.read_u32::<LittleEndian>()? as usize;
        // Cap the preallocation; a corrupt count fails on read instead
        let mut points = Vec::with_capacity(count.min(4096));
        for _ in 0..count {
            points.push(P::decode(reader)?);
        }
        let mut done = VpNode::from_parts_leaf(bin_size, depth, center, points);

        // Close every internal node whose farther child just completed
        loop {
            let Some(mut parent) = open.pop() else {
                return Ok(done);
            };
            match parent.closer.take() {
                None => {
                    expected_depth = parent.depth + 1;
                    parent.closer = Some(done);
                    open.push(parent);
                    break;
                }
                Some(closer) => {
                    done = VpNode::from_parts_internal(
                        parent.bin_size,
                        parent.depth,
                        parent.center,
                        parent.threshold,
                        closer,
                        done,
                    );
                }
            }
        }
    }
}

impl<P: MetricPoint + Decode> Decode for VpNode<P> {
    fn decode<R: Read>(reader: &mut R) -> Result<Self> {
        decode_node(reader)
    }
}

impl<P: MetricPoint + Encode> Encode for VpTree<P> {
    fn encode<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u32::<LittleEndian>(self.bin_size() as u32)?;
        self.root().encode(writer)
    }
}

impl<P: MetricPoint + Decode> Decode for VpTree<P> {
    fn decode<R: Read>(reader: &mut R) -> Result<Self> {
        let bin_size = reader.read_u32::<LittleEndian>()? as usize;
        if bin_size == 0 {
            return Err(GenoDbError::Codec("tree bin_size is zero".into()));
        }
        let root = decode_node(reader)?;
        Ok(VpTree::from_root(bin_size, root))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use genodb_core::KmerPoint;

    fn sample_tree() -> VpTree<KmerPoint> {
        let kmers = [
            "ACTGCCTGA", "ACTTCCTGA", "ACTCCCTGA", "AAGGCCTGA", "TTTTTTTTT", "GGGGCCTGA",
            "ACTGCCAAA", "CCCCCCCCC",
        ];
        VpTree::build(kmers.iter().map(|s| KmerPoint::new(s)).collect(), 2)
    }

    #[test]
    fn test_tree_survives_encoding() {
        let tree = sample_tree();
        let bytes = tree.to_bytes().unwrap();
        let restored = VpTree::<KmerPoint>::from_bytes(&bytes).unwrap();

        assert_eq!(restored.size(), tree.size());
        assert_eq!(restored.bin_size(), 2);
        assert_eq!(restored.stats(), tree.stats());

        let query = KmerPoint::new("ACTGCCTGG");
        let before: Vec<_> = tree.k_nearest(&query, 3).into_iter().map(|n| n.point).collect();
        let after: Vec<_> = restored.k_nearest(&query, 3).into_iter().map(|n| n.point).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_empty_tree_encoding() {
        let tree = VpTree::<KmerPoint>::new(8);
        let restored = VpTree::<KmerPoint>::from_bytes(&tree.to_bytes().unwrap()).unwrap();
        assert!(restored.is_empty());
        assert!(restored.root().is_leaf());
    }

    #[test]
    fn test_truncated_snapshot_rejected() {
        let bytes = sample_tree().to_bytes().unwrap();
        let cut = &bytes[..bytes.len() / 2];
        assert!(VpTree::<KmerPoint>::from_bytes(cut).is_err());
    }

    #[test]
    fn test_leaf_flag_leads_node() {
        let tree = VpTree::build(vec![KmerPoint::new("AC")], 4);
        let bytes = tree.to_bytes().unwrap();
        // bin_size, then the root's leaf flag
        assert_eq!(&bytes[..4], &4u32.to_le_bytes());
        assert_eq!(bytes[4], 1);
    }

    /// Integer coordinate on a line
    #[derive(Debug, Clone, PartialEq)]
    struct Position(u32);

    impl MetricPoint for Position {
        const IS_METRIC: bool = true;

        fn distance(&self, other: &Self) -> f64 {
            self.0.abs_diff(other.0) as f64
        }
    }

    impl Encode for Position {
        fn encode<W: Write>(&self, writer: &mut W) -> Result<()> {
            writer.write_u32::<LittleEndian>(self.0)?;
            Ok(())
        }
    }

    impl Decode for Position {
        fn decode<R: Read>(reader: &mut R) -> Result<Self> {
            Ok(Position(reader.read_u32::<LittleEndian>()?))
        }
    }

    /// Run `f` on a thread with a stack far too small for one frame per level
    fn on_small_stack<F: FnOnce() + Send + 'static>(f: F) {
        std::thread::Builder::new()
            .stack_size(256 * 1024)
            .spawn(f)
            .unwrap()
            .join()
            .unwrap();
    }

    #[test]
    fn test_chain_shaped_tree_round_trips() {
        on_small_stack(|| {
            // Ascending inserts into single-point bins grow one level per point
            let mut tree = VpTree::new(1);
            for i in 0..6_000u32 {
                tree.add(Position(i));
            }
            let stats = tree.stats();
            assert!(stats.max_depth > 5_000, "max_depth {}", stats.max_depth);

            let bytes = tree.to_bytes().unwrap();
            let restored = VpTree::<Position>::from_bytes(&bytes).unwrap();
            assert_eq!(restored.size(), 6_000);
            assert_eq!(restored.stats(), stats);
            assert_eq!(restored.to_bytes().unwrap(), bytes);

            let near: Vec<u32> = restored
                .k_nearest(&Position(3_000), 3)
                .into_iter()
                .map(|n| n.point.0)
                .collect();
            assert_eq!(near[0], 3_000);
            assert_eq!(near.len(), 3);
        });
    }

    #[test]
    fn test_sorted_kmers_with_unit_bins_round_trip() {
        on_small_stack(|| {
            let mut kmers = vec![String::new()];
            for _ in 0..6 {
                kmers = kmers
                    .iter()
                    .flat_map(|prefix| "ACGT".chars().map(move |c| format!("{}{}", prefix, c)))
                    .collect();
            }
            let mut tree = VpTree::new(1);
            for kmer in &kmers {
                tree.add(KmerPoint::new(kmer));
            }

            let restored = VpTree::<KmerPoint>::from_bytes(&tree.to_bytes().unwrap()).unwrap();
            assert_eq!(restored.size(), 4_096);
            assert_eq!(restored.stats(), tree.stats());
            let query = KmerPoint::new("ACGTAC");
            assert_eq!(restored.nearest(&query).unwrap().distance, 0.0);
        });
    }

    #[test]
    fn test_depth_mismatch_rejected() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&2u32.to_le_bytes());
        bytes.push(1); // leaf
        bytes.extend_from_slice(&2u32.to_le_bytes());
        bytes.extend_from_slice(&3u32.to_le_bytes()); // root must be depth 0
        bytes.push(0);
        bytes.extend_from_slice(&0u32.to_le_bytes());
        let err = VpTree::<KmerPoint>::from_bytes(&bytes).unwrap_err();
        assert!(matches!(err, GenoDbError::Codec(_)));
    }

    #[test]
    fn test_internal_without_center_rejected() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&2u32.to_le_bytes());
        bytes.push(0); // internal
        bytes.extend_from_slice(&2u32.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.push(0); // no center
        let err = VpTree::<KmerPoint>::from_bytes(&bytes).unwrap_err();
        assert!(matches!(err, GenoDbError::Codec(_)));
    }
}
