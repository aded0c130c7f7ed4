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

//! Property Tests for the VP-Tree
//!
//! - Closer/farther invariant on every internal node
//! - k-nearest results match a brute-force scan
//! - Encode/decode preserves size and query results
//! - Removal keeps the invariant and the remaining point set

use proptest::prelude::*;
use rand::{Rng, SeedableRng};

use genodb_core::{Decode, Encode, KmerPoint, MetricPoint};
use genodb_index::{NodeView, VpNode, VpTree};

#[derive(Debug, Clone, PartialEq)]
struct Plane(f64, f64);

impl MetricPoint for Plane {
    const IS_METRIC: bool = true;

    fn distance(&self, other: &Self) -> f64 {
        ((self.0 - other.0).powi(2) + (self.1 - other.1).powi(2)).sqrt()
    }
}

impl Encode for Plane {
    fn encode<W: std::io::Write>(&self, writer: &mut W) -> genodb_core::Result<()> {
        writer.write_all(&self.0.to_le_bytes())?;
        writer.write_all(&self.1.to_le_bytes())?;
        Ok(())
    }
}

impl Decode for Plane {
    fn decode<R: std::io::Read>(reader: &mut R) -> genodb_core::Result<Self> {
        let mut buf = [0u8; 8];
        reader.read_exact(&mut buf)?;
        let x = f64::from_le_bytes(buf);
        reader.read_exact(&mut buf)?;
        Ok(Plane(x, f64::from_le_bytes(buf)))
    }
}

fn subtree_points<P: MetricPoint>(node: &VpNode<P>, out: &mut Vec<P>) {
    match node.view() {
        NodeView::Leaf { points, .. } => out.extend_from_slice(points),
        NodeView::Internal { closer, farther, .. } => {
            subtree_points(closer, out);
            subtree_points(farther, out);
        }
    }
}

fn assert_invariant<P: MetricPoint>(node: &VpNode<P>) -> Result<(), TestCaseError> {
    if let NodeView::Internal {
        center,
        threshold,
        closer,
        farther,
    } = node.view()
    {
        let mut near = Vec::new();
        subtree_points(closer, &mut near);
        for p in &near {
            prop_assert!(center.distance(p) <= threshold);
        }
        let mut far = Vec::new();
        subtree_points(farther, &mut far);
        for p in &far {
            prop_assert!(center.distance(p) > threshold);
        }
        assert_invariant(closer)?;
        assert_invariant(farther)?;
    }
    Ok(())
}

fn brute_force_distances(points: &[Plane], query: &Plane, k: usize) -> Vec<f64> {
    let mut dists: Vec<f64> = points.iter().map(|p| query.distance(p)).collect();
    dists.sort_by(f64::total_cmp);
    dists.truncate(k);
    dists
}

fn plane_points() -> impl Strategy<Value = Vec<Plane>> {
    // Coarse grid values force plenty of distance ties
    prop::collection::vec((0i32..20, 0i32..20), 1..200)
        .prop_map(|v| v.into_iter().map(|(x, y)| Plane(x as f64, y as f64)).collect())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_built_tree_invariant(points in plane_points(), bin_size in 1usize..8) {
        let tree = VpTree::build(points.clone(), bin_size);
        prop_assert_eq!(tree.size(), points.len());
        prop_assert_eq!(tree.stats().size, points.len());
        assert_invariant(tree.root())?;
    }

    #[test]
    fn test_incremental_tree_invariant(points in plane_points(), bin_size in 1usize..8) {
        let mut tree = VpTree::new(bin_size);
        tree.add_all(points.clone());
        prop_assert_eq!(tree.points().count(), points.len());
        assert_invariant(tree.root())?;
    }

    #[test]
    fn test_k_nearest_matches_brute_force(
        points in plane_points(),
        qx in -5.0f64..25.0,
        qy in -5.0f64..25.0,
        k in 1usize..12,
        bin_size in 1usize..6,
    ) {
        let tree = VpTree::build(points.clone(), bin_size);
        let query = Plane(qx, qy);
        let got: Vec<f64> = tree.k_nearest(&query, k).iter().map(|n| n.distance).collect();
        let expected = brute_force_distances(&points, &query, k);
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn test_encoding_idempotent(points in plane_points(), bin_size in 1usize..8) {
        let tree = VpTree::build(points, bin_size);
        let restored = VpTree::<Plane>::from_bytes(&tree.to_bytes().unwrap()).unwrap();
        prop_assert_eq!(restored.size(), tree.size());
        prop_assert_eq!(restored.stats(), tree.stats());
        for query in [Plane(0.0, 0.0), Plane(10.5, 3.2), Plane(19.0, 19.0)] {
            let a: Vec<f64> = tree.k_nearest(&query, 5).iter().map(|n| n.distance).collect();
            let b: Vec<f64> = restored.k_nearest(&query, 5).iter().map(|n| n.distance).collect();
            prop_assert_eq!(a, b);
        }
        // Re-encoding the restored tree yields the same bytes
        prop_assert_eq!(restored.to_bytes().unwrap(), tree.to_bytes().unwrap());
    }

    #[test]
    fn test_removal_keeps_invariant(points in plane_points(), bin_size in 1usize..6, stride in 1usize..4) {
        let mut tree = VpTree::build(points.clone(), bin_size);
        let mut kept = Vec::new();
        for (i, p) in points.iter().enumerate() {
            if i % stride == 0 {
                prop_assert!(tree.remove(p));
            } else {
                kept.push(p.clone());
            }
        }
        prop_assert_eq!(tree.size(), kept.len());
        assert_invariant(tree.root())?;

        let mut remaining: Vec<(f64, f64)> = tree.points().map(|p| (p.0, p.1)).collect();
        let mut expected: Vec<(f64, f64)> = kept.iter().map(|p| (p.0, p.1)).collect();
        remaining.sort_by(|a, b| a.partial_cmp(b).unwrap());
        expected.sort_by(|a, b| a.partial_cmp(b).unwrap());
        prop_assert_eq!(remaining, expected);
    }
}

#[test]
fn test_exact_hamming_kmers_match_brute_force() {
    let mut rng = rand::rngs::StdRng::seed_from_u64(0x5eed);
    let bases = b"ACGT";
    let random_kmer = |rng: &mut rand::rngs::StdRng| {
        let symbols: Vec<u8> = (0..12).map(|_| bases[rng.gen_range(0..4)]).collect();
        KmerPoint::new(symbols)
    };

    let points: Vec<KmerPoint> = (0..500).map(|_| random_kmer(&mut rng)).collect();
    let tree = VpTree::build(points.clone(), 8);

    for _ in 0..50 {
        let query = random_kmer(&mut rng);
        let got: Vec<f64> = tree.k_nearest(&query, 5).iter().map(|n| n.distance).collect();
        let mut expected: Vec<f64> = points.iter().map(|p| query.distance(p)).collect();
        expected.sort_by(f64::total_cmp);
        expected.truncate(5);
        assert_eq!(got, expected);
    }
}
