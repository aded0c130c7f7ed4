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

//! Ring Positions and Hash Functions
//!
//! Positions live on a circle of `2^bits` values stored in a `u128`.
//!
//! - [`ContentHash`]: SHA-256 of the encoded point, truncated to the space
//! - [`SimilarityHash`]: content hash of the point's VP-tree descent path,
//!   so points the tree keeps together share a position

use rand::RngCore;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::warn;

use genodb_core::config::MAX_HASH_DEPTH;
use genodb_core::{Encode, GenoDbError, MetadataRecord, MetricPoint};
use genodb_index::{ConcurrentVpTree, TreePath};

use crate::error::RingError;

/// A circular space of `2^bits` positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HashSpace {
    bits: u32,
}

impl HashSpace {
    pub const FULL: HashSpace = HashSpace { bits: 128 };

    pub fn new(bits: u32) -> Result<Self, RingError> {
        if bits == 0 || bits > 128 {
            return Err(RingError::InvalidSpace { bits });
        }
        Ok(Self { bits })
    }

    pub fn bits(&self) -> u32 {
        self.bits
    }

    /// Largest position in the space
    pub fn mask(&self) -> u128 {
        u128::MAX >> (128 - self.bits)
    }

    /// Half the circumference, `2^(bits-1)`
    pub fn half(&self) -> u128 {
        1u128 << (self.bits - 1)
    }

    pub fn contains(&self, position: u128) -> bool {
        position <= self.mask()
    }

    /// Clockwise `position + offset`
    pub fn add(&self, position: u128, offset: u128) -> u128 {
        position.wrapping_add(offset) & self.mask()
    }

    /// Clockwise distance from `from` to `to`; zero when they coincide
    pub fn gap(&self, from: u128, to: u128) -> u128 {
        to.wrapping_sub(from) & self.mask()
    }

    /// Halfway along the clockwise arc of length `gap` starting at `from`
    pub fn midpoint(&self, from: u128, gap: u128) -> u128 {
        self.add(from, gap / 2)
    }

    /// Keep the high `bits` of a 128-bit value
    pub fn truncate(&self, value: u128) -> u128 {
        value >> (128 - self.bits)
    }
}

impl Default for HashSpace {
    fn default() -> Self {
        Self::FULL
    }
}

/// Maps records onto a ring position
pub trait HashFunction<P>: Send + Sync {
    fn hash(&self, record: &MetadataRecord<P>) -> u128;

    fn space(&self) -> HashSpace;

    /// A uniformly random position, for randomized first placement
    fn random(&self) -> u128;
}

/// SHA-256 truncated to the hash space
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentHash {
    space: HashSpace,
}

impl ContentHash {
    pub fn new(space: HashSpace) -> Self {
        Self { space }
    }

    pub fn hash_bytes(&self, bytes: &[u8]) -> u128 {
        self.finish(Sha256::new().chain_update(bytes))
    }

    /// Hash of the point's full encoding; fails when the point cannot be
    /// encoded
    pub fn try_hash_point<P: Encode>(&self, point: &P) -> Result<u128, GenoDbError> {
        let bytes = point.to_bytes()?;
        Ok(self.hash_bytes(&bytes))
    }

    /// Like [`ContentHash::try_hash_point`], but a point that fails to
    /// encode lands on the hash of the empty encoding, with a warning.
    /// Partial encodings are never hashed.
    pub fn hash_point<P: Encode>(&self, point: &P) -> u128 {
        self.try_hash_point(point).unwrap_or_else(|e| {
            warn!(error = %e, "point encoding failed while hashing");
            self.hash_bytes(&[])
        })
    }

    fn finish(&self, hasher: Sha256) -> u128 {
        let digest = hasher.finalize();
        let mut head = [0u8; 16];
        head.copy_from_slice(&digest[..16]);
        self.space.truncate(u128::from_be_bytes(head))
    }
}

impl<P: MetricPoint + Encode> HashFunction<P> for ContentHash {
    fn hash(&self, record: &MetadataRecord<P>) -> u128 {
        self.hash_point(&record.point)
    }

    fn space(&self) -> HashSpace {
        self.space
    }

    fn random(&self) -> u128 {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        self.hash_bytes(&bytes)
    }
}

/// Locality-sensitive hash from the shared VP-tree.
///
/// The record's point walks the tree for at most `depth` internal levels;
/// the resulting path is content-hashed. The tree keeps growing as points
/// are indexed, so positions of new records follow its current shape.
pub struct SimilarityHash<P> {
    tree: Arc<ConcurrentVpTree<P>>,
    depth: u32,
    content: ContentHash,
}

impl<P: MetricPoint> SimilarityHash<P> {
    pub fn new(
        tree: Arc<ConcurrentVpTree<P>>,
        depth: u32,
        space: HashSpace,
    ) -> Result<Self, GenoDbError> {
        if depth > MAX_HASH_DEPTH {
            return Err(GenoDbError::InvalidArgument(format!(
                "similarity hash depth {} exceeds {}",
                depth, MAX_HASH_DEPTH
            )));
        }
        Ok(Self {
            tree,
            depth,
            content: ContentHash::new(space),
        })
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn tree(&self) -> &Arc<ConcurrentVpTree<P>> {
        &self.tree
    }

    pub fn path(&self, point: &P) -> TreePath {
        self.tree.path_of(point, self.depth)
    }

    pub fn hash_path(&self, path: TreePath) -> u128 {
        self.content.hash_bytes(&path.to_integer().to_be_bytes())
    }
}

impl<P: MetricPoint> HashFunction<P> for SimilarityHash<P> {
    fn hash(&self, record: &MetadataRecord<P>) -> u128 {
        self.hash_path(self.path(&record.point))
    }

    fn space(&self) -> HashSpace {
        self.content.space
    }

    fn random(&self) -> u128 {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        self.content.hash_bytes(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use genodb_core::KmerPoint;
    use genodb_index::VpTree;

    #[test]
    fn test_space_arithmetic_wraps() {
        let space = HashSpace::new(8).unwrap();
        assert_eq!(space.mask(), 255);
        assert_eq!(space.half(), 128);
        assert_eq!(space.add(200, 100), 44);
        assert_eq!(space.gap(250, 4), 10);
        assert_eq!(space.gap(4, 4), 0);
        assert_eq!(space.midpoint(250, 10), 255);
    }

    #[test]
    fn test_full_space_edges() {
        let space = HashSpace::FULL;
        assert_eq!(space.mask(), u128::MAX);
        assert_eq!(space.half(), 1u128 << 127);
        assert_eq!(space.add(u128::MAX, 1), 0);
        assert!(HashSpace::new(0).is_err());
        assert!(HashSpace::new(129).is_err());
    }

    #[test]
    fn test_content_hash_respects_space() {
        let small = ContentHash::new(HashSpace::new(12).unwrap());
        for i in 0u32..100 {
            assert!(small.hash_bytes(&i.to_le_bytes()) <= 0xFFF);
        }
        let full = ContentHash::default();
        assert_eq!(full.hash_bytes(b"ACGT"), full.hash_bytes(b"ACGT"));
        assert_ne!(full.hash_bytes(b"ACGT"), full.hash_bytes(b"ACGA"));
    }

    /// Writes a prefix, then fails
    struct Unencodable;

    impl Encode for Unencodable {
        fn encode<W: std::io::Write>(&self, writer: &mut W) -> genodb_core::Result<()> {
            writer.write_all(b"ACGT")?;
            Err(GenoDbError::Codec("unencodable point".to_string()))
        }
    }

    #[test]
    fn test_encode_failure_never_hashes_a_prefix() {
        let hash = ContentHash::default();
        assert!(matches!(hash.try_hash_point(&Unencodable), Err(GenoDbError::Codec(_))));
        // Falls back to the empty encoding, not to the four bytes written
        assert_eq!(hash.hash_point(&Unencodable), hash.hash_bytes(&[]));
        assert_ne!(hash.hash_point(&Unencodable), hash.hash_bytes(b"ACGT"));

        let point = KmerPoint::new("ACGT");
        assert_eq!(
            hash.try_hash_point(&point).unwrap(),
            hash.hash_bytes(&point.to_bytes().unwrap())
        );
    }

    #[test]
    fn test_sentinel_separates_paths() {
        let tree = Arc::new(ConcurrentVpTree::<KmerPoint>::empty(4));
        let hash = SimilarityHash::new(tree, 8, HashSpace::FULL).unwrap();
        assert_ne!(
            hash.content.hash_bytes(&0b1u128.to_be_bytes()),
            hash.content.hash_bytes(&0b10u128.to_be_bytes())
        );
        // The empty path is the bare sentinel
        assert_eq!(hash.hash_path(TreePath::new()), hash.content.hash_bytes(&1u128.to_be_bytes()));
    }

    #[test]
    fn test_similar_points_share_position() {
        let kmers = [
            "AAAAAAAA", "AAAAAAAC", "AAAAAACC", "CCCCCCCC", "CCCCCCCA", "GGGGGGGG", "GGGGGGGT",
            "TTTTTTTT", "TTTTTTTA",
        ];
        let tree = VpTree::build(kmers.iter().map(|s| KmerPoint::new(s)).collect(), 2);
        let hash = SimilarityHash::new(Arc::new(ConcurrentVpTree::new(tree)), 1, HashSpace::FULL)
            .unwrap();

        let record = |s: &str| MetadataRecord::new(s, KmerPoint::new(s));
        // One level deep there are only two possible positions
        let positions: std::collections::HashSet<u128> =
            kmers.iter().map(|s| hash.hash(&record(s))).collect();
        assert!(positions.len() <= 2);

        // An indexed point hashes where its own path leads
        let a = record("AAAAAAAA");
        assert_eq!(hash.hash(&a), hash.hash_path(hash.path(&a.point)));
    }

    #[test]
    fn test_depth_limit() {
        let tree = Arc::new(ConcurrentVpTree::<KmerPoint>::empty(4));
        assert!(SimilarityHash::new(tree, MAX_HASH_DEPTH + 1, HashSpace::FULL).is_err());
    }
}
