//! Learns which address bits to index with from the trace itself
//!
//! Every bit is scored by how evenly it splits the trace between 0 and 1, and every pair of bits
//! by how evenly they split it between agreeing and disagreeing. Index bits are then picked one at
//! a time, best score first, with the remaining scores damped by their correlation with each pick.

use log::debug;
use crate::address::{bit_at, parse_address};
use crate::config::CacheGeometry;
use crate::error::SimError;
use crate::indexing::{offset_positions, BitPositionAssignment, IndexingPolicy};

/// How evenly two counts split their total. 1 when equal, 0 when one of them is 0
#[inline(always)]
fn balance(a: u64, b: u64) -> f32 {
    if a == b {
        1.0
    } else if a > b {
        b as f32 / a as f32
    } else {
        a as f32 / b as f32
    }
}

/// Per position scores, higher is a better index bit. Positions which have been picked, or which
/// belong to the offset, are no longer eligible and have no score
#[derive(Debug, Clone, PartialEq)]
pub struct BitQualityTable {
    scores: Vec<Option<f32>>,
    address_bits: u32,
}

impl BitQualityTable {
    /// Scores every position of the given parsed addresses
    pub fn from_values(address_bits: u32, values: &[u64]) -> Self {
        let scores = (0..address_bits)
            .map(|p| {
                let ones = values.iter().filter(|v| bit_at(**v, address_bits, p) == 1).count() as u64;
                Some(balance(values.len() as u64 - ones, ones))
            })
            .collect();
        Self { scores, address_bits }
    }

    pub fn score(&self, position: u32) -> Option<f32> {
        self.scores[position as usize]
    }

    fn exclude(&mut self, position: u32) {
        self.scores[position as usize] = None;
    }

    /// Finds the eligible position with the highest score
    ///
    /// Scanning starts at the least significant bit, and only a strictly higher score replaces the
    /// current best, so ties go to the less significant bit
    fn best(&self) -> Option<u32> {
        let mut best: Option<(u32, f32)> = None;
        for position in (0..self.address_bits).rev() {
            if let Some(score) = self.score(position) {
                if best.map_or(true, |(_, best_score)| score > best_score) {
                    best = Some((position, score));
                }
            }
        }
        best.map(|(position, _)| position)
    }

    /// Scales every eligible score by its correlation with the picked position
    fn damp(&mut self, picked: u32, correlation: &BitCorrelationMatrix) {
        for (position, score) in self.scores.iter_mut().enumerate() {
            if let Some(score) = score {
                *score *= correlation.get(picked, position as u32);
            }
        }
    }

    fn eligible(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.address_bits).filter(|p| self.score(*p).is_some())
    }
}

/// Symmetric table of how evenly each pair of positions splits the trace into agreements and
/// disagreements. The diagonal is fixed at 1
#[derive(Debug, Clone, PartialEq)]
pub struct BitCorrelationMatrix {
    scores: Vec<f32>,
    address_bits: u32,
}

impl BitCorrelationMatrix {
    pub fn from_values(address_bits: u32, values: &[u64]) -> Self {
        let n = address_bits as usize;
        let mut scores = vec![1.0; n * n];
        // Only the upper triangle is counted, the lower is mirrored
        for i in 0..address_bits {
            for j in (i + 1)..address_bits {
                let disagreements = values
                    .iter()
                    .filter(|v| bit_at(**v, address_bits, i) != bit_at(**v, address_bits, j))
                    .count() as u64;
                let score = balance(values.len() as u64 - disagreements, disagreements);
                scores[i as usize * n + j as usize] = score;
                scores[j as usize * n + i as usize] = score;
            }
        }
        Self { scores, address_bits }
    }

    #[inline(always)]
    pub fn get(&self, i: u32, j: u32) -> f32 {
        self.scores[(i * self.address_bits + j) as usize]
    }
}

/// Greedily picks `index_bits` positions from the quality table, damping after each pick
///
/// The offset positions are taken out first and every eligible position left after the last pick
/// becomes a tag bit
pub fn select(geometry: &CacheGeometry, mut quality: BitQualityTable, correlation: &BitCorrelationMatrix) -> BitPositionAssignment {
    let offset: Vec<u32> = offset_positions(geometry).collect();
    for position in &offset {
        quality.exclude(*position);
    }
    let mut index = Vec::with_capacity(geometry.index_bits() as usize);
    for _ in 0..geometry.index_bits() {
        // The geometry guarantees at least index_bits positions outside the offset
        let Some(picked) = quality.best() else { break };
        debug!("Picked bit {} (position {picked}) with quality {:?}", geometry.address_bits() - 1 - picked, quality.score(picked));
        quality.exclude(picked);
        index.push(picked);
        quality.damp(picked, correlation);
    }
    let tag = quality.eligible().collect();
    BitPositionAssignment::new(geometry.address_bits(), tag, index, offset)
}

/// Indexing which learns from the whole trace up front
#[derive(Debug, Default, Clone, Copy)]
pub struct Adaptive;

impl Adaptive {
    pub fn compute(geometry: &CacheGeometry, trace: &[String]) -> Result<BitPositionAssignment, SimError> {
        if trace.is_empty() {
            return Err(SimError::EmptyTrace);
        }
        let width = geometry.address_bits();
        let values = trace.iter().map(|a| parse_address(a, width)).collect::<Result<Vec<_>, _>>()?;
        let quality = BitQualityTable::from_values(width, &values);
        let correlation = BitCorrelationMatrix::from_values(width, &values);
        let assignment = select(geometry, quality, &correlation);
        debug!("Adaptive index bits: {:?}", assignment.index_bit_numbers());
        Ok(assignment)
    }
}

impl IndexingPolicy for Adaptive {
    fn assign(&self, geometry: &CacheGeometry, trace: &[String]) -> Result<BitPositionAssignment, SimError> {
        Self::compute(geometry, trace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trace(addresses: &[&str]) -> Vec<String> {
        addresses.iter().map(|a| a.to_string()).collect()
    }

    fn values(addresses: &[&str], width: u32) -> Vec<u64> {
        addresses.iter().map(|a| parse_address(a, width).unwrap()).collect()
    }

    const EXAMPLE: [&str; 7] = ["00000000", "00010000", "00100000", "00000000", "00101100", "00000000", "00101100"];

    #[test]
    fn quality_rewards_balanced_bits() {
        let quality = BitQualityTable::from_values(4, &values(&["0011", "0101", "0110", "0100"], 4));
        assert_eq!(quality.score(0), Some(0.0));
        assert_eq!(quality.score(1), Some(1.0 / 3.0));
        assert_eq!(quality.score(2), Some(1.0));
        assert_eq!(quality.score(3), Some(1.0));
    }

    #[test]
    fn scores_stay_in_unit_range_and_correlation_is_symmetric() {
        let width = 8;
        let parsed = values(&EXAMPLE, width);
        let quality = BitQualityTable::from_values(width, &parsed);
        let correlation = BitCorrelationMatrix::from_values(width, &parsed);
        for i in 0..width {
            let q = quality.score(i).unwrap();
            assert!((0.0..=1.0).contains(&q));
            assert_eq!(correlation.get(i, i), 1.0);
            for j in 0..width {
                let c = correlation.get(i, j);
                assert!((0.0..=1.0).contains(&c));
                assert_eq!(c, correlation.get(j, i));
            }
        }
    }

    #[test]
    fn correlation_counts_agreements() {
        // Positions 0 and 1 agree in 3 of 4 addresses, positions 2 and 3 always disagree
        let correlation = BitCorrelationMatrix::from_values(4, &values(&["0001", "1101", "0010", "1010"], 4));
        assert_eq!(correlation.get(0, 1), 1.0 / 3.0);
        assert_eq!(correlation.get(2, 3), 0.0);
        assert_eq!(correlation.get(0, 2), 1.0);
    }

    #[test]
    fn picks_balanced_then_decorrelated_bits() {
        // Position 2 is the most balanced; positions 4 and 5 mirror it in most addresses so the
        // damping lets position 3 through as the second pick
        let geometry = CacheGeometry::new(8, 4, 4, 2).unwrap();
        let assignment = Adaptive::compute(&geometry, &trace(&EXAMPLE)).unwrap();
        assert_eq!(assignment.index_positions(), &[2, 3]);
        assert_eq!(assignment.index_bit_numbers(), vec![5, 4]);
        assert_eq!(assignment.tag_positions(), &[0, 1, 4, 5]);
        assert_eq!(assignment.offset_positions(), &[6, 7]);
    }

    #[test]
    fn ties_go_to_the_less_significant_bit() {
        let geometry = CacheGeometry::new(4, 1, 2, 1).unwrap();
        // Every bit is perfectly balanced
        let assignment = Adaptive::compute(&geometry, &trace(&["0000", "1111"])).unwrap();
        assert_eq!(assignment.index_positions(), &[3]);
    }

    #[test]
    fn never_uses_offset_bits() {
        // The offset bits are the only ones that vary
        let geometry = CacheGeometry::new(6, 4, 4, 1).unwrap();
        let assignment = Adaptive::compute(&geometry, &trace(&["000001", "000010", "000011", "000000"])).unwrap();
        assert_eq!(assignment.offset_positions(), &[4, 5]);
        assert!(assignment.index_positions().iter().all(|p| *p < 4));
        assert!(assignment.tag_positions().iter().all(|p| *p < 4));
        assert_eq!(assignment.index_positions().len() + assignment.tag_positions().len(), 4);
    }

    #[test]
    fn is_deterministic() {
        let geometry = CacheGeometry::new(8, 2, 8, 2).unwrap();
        let addresses = trace(&["10110011", "01101010", "11100001", "00011110", "10101010", "01010101"]);
        let first = Adaptive::compute(&geometry, &addresses).unwrap();
        let second = Adaptive::compute(&geometry, &addresses).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.index_positions().len(), 3);
    }

    #[test]
    fn rejects_empty_and_malformed_traces() {
        let geometry = CacheGeometry::new(8, 4, 4, 2).unwrap();
        assert_eq!(Adaptive::compute(&geometry, &[]), Err(SimError::EmptyTrace));
        assert!(matches!(Adaptive::compute(&geometry, &trace(&["0000000"])), Err(SimError::MalformedAddress { .. })));
    }
}
