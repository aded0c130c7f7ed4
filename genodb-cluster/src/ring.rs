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

//! Balanced Consistent-Hash Ring
//!
//! Entries are kept in a position-ordered map and also linked clockwise to
//! their neighbor. New entries go to the midpoint of the widest gap, so the
//! ring stays evenly split instead of relying on random placement:
//!
//! ```text
//!     0            0            0            0
//!     ●            ●            ●            ●
//!                            ●     ●      ●  ●  ●
//!                                          ●   ●
//!            ●            ●            ●     ●
//!    1 entry      2 entries    3 entries    8 entries
//! ```
//!
//! A record belongs to the first entry at or clockwise after its hash.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use genodb_core::{MetadataRecord, RingConfig, RingPlacement};

use crate::error::{LookupError, RingError};
use crate::hash::{HashFunction, HashSpace};

struct RingEntry<T> {
    value: T,
    /// Next position clockwise
    neighbor: u128,
}

pub struct HashRing<T, P> {
    entries: BTreeMap<u128, RingEntry<T>>,
    hash: Arc<dyn HashFunction<P>>,
    placement: RingPlacement,
}

impl<T, P> HashRing<T, P> {
    pub fn new(hash: Arc<dyn HashFunction<P>>, config: &RingConfig) -> Self {
        Self {
            entries: BTreeMap::new(),
            hash,
            placement: config.placement,
        }
    }

    pub fn space(&self) -> HashSpace {
        self.hash.space()
    }

    pub fn hash_function(&self) -> &Arc<dyn HashFunction<P>> {
        &self.hash
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Place `value` on the ring and return its position
    pub fn add_node(&mut self, value: T) -> Result<u128, RingError> {
        let space = self.space();

        let first = self.entries.keys().next().copied();
        let (position, after) = match first {
            Some(_) if self.entries.len() >= 2 => {
                let (from, gap) = self.widest_gap();
                (space.midpoint(from, gap), from)
            }
            Some(first) => (space.add(first, space.half()), first),
            None => {
                let position = match self.placement {
                    RingPlacement::Origin => 0,
                    RingPlacement::Random => self.hash.random() & space.mask(),
                };
                self.entries.insert(
                    position,
                    RingEntry {
                        value,
                        neighbor: position,
                    },
                );
                debug!(position = %format!("{:#x}", position), "first ring entry");
                return Ok(position);
            }
        };

        if self.entries.contains_key(&position) {
            return Err(RingError::HashSpaceExhausted { position });
        }

        // Splice between `after` and its old neighbor
        let next = match self.entries.get_mut(&after) {
            Some(entry) => std::mem::replace(&mut entry.neighbor, position),
            None => after,
        };
        self.entries.insert(
            position,
            RingEntry {
                value,
                neighbor: next,
            },
        );
        debug!(
            position = %format!("{:#x}", position),
            entries = self.entries.len(),
            "ring entry placed"
        );
        Ok(position)
    }

    /// Start and length of the widest clockwise gap; first wins on ties.
    /// Requires at least two entries.
    fn widest_gap(&self) -> (u128, u128) {
        let space = self.space();
        let mut best = (0u128, 0u128);
        for (&position, entry) in &self.entries {
            let gap = space.gap(position, entry.neighbor);
            if gap > best.1 {
                best = (position, gap);
            }
        }
        best
    }

    /// Owner of `position`: the first entry at or after it, wrapping
    pub fn locate_position(&self, position: u128) -> Option<(u128, &T)> {
        self.entries
            .range(position..)
            .next()
            .or_else(|| self.entries.iter().next())
            .map(|(&p, entry)| (p, &entry.value))
    }

    pub fn position_of(&self, record: &MetadataRecord<P>) -> u128 {
        self.hash.hash(record)
    }

    pub fn locate(&self, record: &MetadataRecord<P>) -> Result<&T, LookupError> {
        let position = self.position_of(record);
        self.locate_position(position)
            .map(|(_, value)| value)
            .ok_or_else(|| LookupError::NotFound(format!("empty ring for position {:#x}", position)))
    }

    pub fn get(&self, position: u128) -> Option<&T> {
        self.entries.get(&position).map(|entry| &entry.value)
    }

    /// Next entry clockwise from an existing position
    pub fn successor(&self, position: u128) -> Option<u128> {
        self.entries.get(&position).map(|entry| entry.neighbor)
    }

    /// Entry clockwise before `position`; an entry is its own predecessor
    /// on a one-entry ring
    pub fn predecessor(&self, position: u128) -> Option<u128> {
        self.entries
            .range(..position)
            .next_back()
            .or_else(|| self.entries.iter().next_back())
            .map(|(&p, _)| p)
    }

    pub fn entries(&self) -> impl Iterator<Item = (u128, &T)> + '_ {
        self.entries.iter().map(|(&p, entry)| (p, &entry.value))
    }

    /// `(position, clockwise gap to neighbor)` for every entry. A lone
    /// entry reports the whole ring as `mask`.
    pub fn gaps(&self) -> Vec<(u128, u128)> {
        let space = self.space();
        if self.entries.len() == 1 {
            return self.entries.keys().map(|&p| (p, space.mask())).collect();
        }
        self.entries
            .iter()
            .map(|(&p, entry)| (p, space.gap(p, entry.neighbor)))
            .collect()
    }
}

impl<T: fmt::Debug, P> fmt::Debug for HashRing<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(p, e)| (format!("{:#x}", p), &e.value)))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::ContentHash;
    use genodb_core::KmerPoint;

    fn ring(bits: u32, placement: RingPlacement) -> HashRing<usize, KmerPoint> {
        let hash: Arc<dyn HashFunction<KmerPoint>> =
            Arc::new(ContentHash::new(HashSpace::new(bits).unwrap()));
        HashRing::new(hash, &RingConfig { placement })
    }

    #[test]
    fn test_first_two_positions() {
        let mut r = ring(128, RingPlacement::Origin);
        assert_eq!(r.add_node(0).unwrap(), 0);
        assert_eq!(r.add_node(1).unwrap(), 1u128 << 127);
        assert_eq!(r.successor(0), Some(1u128 << 127));
        assert_eq!(r.successor(1u128 << 127), Some(0));
    }

    #[test]
    fn test_midpoint_of_widest_gap() {
        let mut r = ring(8, RingPlacement::Origin);
        let positions: Vec<u128> = (0..4).map(|i| r.add_node(i).unwrap()).collect();
        assert_eq!(positions, vec![0, 128, 64, 192]);
        assert_eq!(r.gaps(), vec![(0, 64), (64, 64), (128, 64), (192, 64)]);
    }

    #[test]
    fn test_random_first_placement_keeps_spacing() {
        let mut r = ring(16, RingPlacement::Random);
        let first = r.add_node(0).unwrap();
        let second = r.add_node(1).unwrap();
        assert_eq!(r.space().gap(first, second), 1 << 15);
    }

    #[test]
    fn test_exhausted_space() {
        let mut r = ring(2, RingPlacement::Origin);
        for i in 0..4 {
            r.add_node(i).unwrap();
        }
        assert!(matches!(
            r.add_node(4),
            Err(RingError::HashSpaceExhausted { .. })
        ));
        assert_eq!(r.len(), 4);
    }

    #[test]
    fn test_locate_wraps_to_smallest() {
        let mut r = ring(8, RingPlacement::Origin);
        r.add_node(10).unwrap(); // 0
        r.add_node(20).unwrap(); // 128
        assert_eq!(r.locate_position(0), Some((0, &10)));
        assert_eq!(r.locate_position(1), Some((128, &20)));
        assert_eq!(r.locate_position(128), Some((128, &20)));
        assert_eq!(r.locate_position(200), Some((0, &10)));
        assert_eq!(r.predecessor(0), Some(128));
        assert_eq!(r.predecessor(128), Some(0));
    }

    #[test]
    fn test_empty_ring_lookup_fails() {
        let r = ring(8, RingPlacement::Origin);
        let record = MetadataRecord::new("r", KmerPoint::new("ACGT"));
        assert!(matches!(r.locate(&record), Err(LookupError::NotFound(_))));
        assert_eq!(r.locate_position(5), None);
    }
}
