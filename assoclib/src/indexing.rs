use serde::Serialize;
use crate::adaptive::Adaptive;
use crate::config::{CacheGeometry, IndexingMode};
use crate::error::SimError;

/// Which positions of the address string make up the tag, index and offset
///
/// Positions count from 0 at the most significant character. Every list is sorted ascending by
/// position, so the first listed position becomes the most significant bit of its field. Between
/// them the three lists cover each position exactly once
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BitPositionAssignment {
    address_bits: u32,
    tag: Vec<u32>,
    index: Vec<u32>,
    offset: Vec<u32>,
}

impl BitPositionAssignment {
    /// Builds an assignment, sorting each field into position order
    ///
    /// Panics in debug builds if the fields don't partition the address. Only the policies in this
    /// crate construct assignments, and they are expected to uphold that
    pub(crate) fn new(address_bits: u32, mut tag: Vec<u32>, mut index: Vec<u32>, mut offset: Vec<u32>) -> Self {
        tag.sort_unstable();
        index.sort_unstable();
        offset.sort_unstable();
        debug_assert_eq!(
            {
                let mut all: Vec<u32> = tag.iter().chain(&index).chain(&offset).copied().collect();
                all.sort_unstable();
                all
            },
            (0..address_bits).collect::<Vec<_>>()
        );
        Self { address_bits, tag, index, offset }
    }

    pub fn address_bits(&self) -> u32 {
        self.address_bits
    }

    pub fn tag_positions(&self) -> &[u32] {
        &self.tag
    }

    pub fn index_positions(&self) -> &[u32] {
        &self.index
    }

    pub fn offset_positions(&self) -> &[u32] {
        &self.offset
    }

    /// Converts a string position into its bit number, where 0 is the least significant bit
    pub fn bit_number(&self, position: u32) -> u32 {
        self.address_bits - 1 - position
    }

    /// Bit numbers of the index positions, most significant first. This is the form reports use
    pub fn index_bit_numbers(&self) -> Vec<u32> {
        self.index.iter().map(|p| self.bit_number(*p)).collect()
    }
}

/// A strategy for deciding which address bits index the cache
///
/// Implementations run once per simulation, before any reference is classified. The trace is
/// every address of the run in order; strategies that don't learn from it can ignore it
pub trait IndexingPolicy {
    fn assign(&self, geometry: &CacheGeometry, trace: &[String]) -> Result<BitPositionAssignment, SimError>;
}

/// The conventional layout: offset in the lowest bits, index directly above, tag in the rest
#[derive(Debug, Default, Clone, Copy)]
pub struct LeastSignificantBits;

impl LeastSignificantBits {
    pub fn compute(geometry: &CacheGeometry) -> BitPositionAssignment {
        let width = geometry.address_bits();
        let index_start = geometry.tag_bits();
        let offset_start = index_start + geometry.index_bits();
        BitPositionAssignment::new(
            width,
            (0..index_start).collect(),
            (index_start..offset_start).collect(),
            (offset_start..width).collect(),
        )
    }
}

impl IndexingPolicy for LeastSignificantBits {
    fn assign(&self, geometry: &CacheGeometry, _trace: &[String]) -> Result<BitPositionAssignment, SimError> {
        Ok(Self::compute(geometry))
    }
}

/// Offset positions are the same for every strategy, the lowest `offset_bits` of the address
pub(crate) fn offset_positions(geometry: &CacheGeometry) -> std::ops::Range<u32> {
    (geometry.address_bits() - geometry.offset_bits())..geometry.address_bits()
}

/// Enum over the provided policies, so the mode can be picked from configuration without boxing
pub enum GenericIndexing {
    LeastSignificantBits(LeastSignificantBits),
    Adaptive(Adaptive),
}

impl From<IndexingMode> for GenericIndexing {
    fn from(value: IndexingMode) -> Self {
        match value {
            IndexingMode::LeastSignificantBits => GenericIndexing::LeastSignificantBits(LeastSignificantBits),
            IndexingMode::Adaptive => GenericIndexing::Adaptive(Adaptive),
        }
    }
}

impl IndexingPolicy for GenericIndexing {
    fn assign(&self, geometry: &CacheGeometry, trace: &[String]) -> Result<BitPositionAssignment, SimError> {
        match self {
            GenericIndexing::LeastSignificantBits(p) => p.assign(geometry, trace),
            GenericIndexing::Adaptive(p) => p.assign(geometry, trace),
        }
    }
}
