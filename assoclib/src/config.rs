use serde::{Deserialize, Serialize};
use crate::error::SimError;

/// The widest address the codec can pack into a single field
pub const MAX_ADDRESS_BITS: u32 = u64::BITS;

/// A cache configuration as read from disk
///
/// Either JSON, or the key/value format where every second token is a value, in the order
/// address bits, block size, cache sets, associativity
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct CacheConfig {
    pub address_bits: u32,
    pub block_size: u64,
    pub num_sets: u64,
    pub associativity: u64,
    #[serde(default = "IndexingMode::default")]
    pub indexing: IndexingMode,
}

/// How the index bits are chosen - the conventional low order bits, or learnt from the trace.
/// Defaults to lsb.
#[derive(Debug, Copy, Clone, Deserialize, Serialize, PartialEq, Eq, clap::ValueEnum)]
pub enum IndexingMode {
    #[serde(rename = "lsb")]
    #[value(name = "lsb")]
    LeastSignificantBits,
    #[serde(rename = "adaptive", alias = "opt")]
    #[value(name = "adaptive", alias = "opt")]
    Adaptive,
}

impl Default for IndexingMode {
    fn default() -> Self {
        IndexingMode::LeastSignificantBits
    }
}

impl IndexingMode {
    /// Short name used in reports and fixture file names
    pub fn name(&self) -> &'static str {
        match self {
            IndexingMode::LeastSignificantBits => "lsb",
            IndexingMode::Adaptive => "adaptive",
        }
    }
}

impl CacheConfig {
    /// Reads the key/value configuration format
    ///
    /// Keys are not checked, values are taken purely by position. Anything past the fourth value
    /// is ignored
    ///
    /// # Examples
    ///
    /// ```
    /// use assoclib::config::CacheConfig;
    /// let config = CacheConfig::from_key_value("Address_bits: 8\nBlock_size: 4\nCache_sets: 4\nAssociativity: 2").unwrap();
    /// assert_eq!(config.associativity, 2);
    /// ```
    pub fn from_key_value(text: &str) -> Result<Self, SimError> {
        let values = text
            .split_whitespace()
            .skip(1)
            .step_by(2)
            .take(4)
            .map(|token| token.parse::<u64>().map_err(|e| SimError::Config(format!("{token:?} is not a number: {e}"))))
            .collect::<Result<Vec<_>, _>>()?;
        if values.len() < 4 {
            return Err(SimError::Config(format!("Expected 4 values, found {}", values.len())));
        }
        let address_bits = u32::try_from(values[0]).map_err(|_| SimError::Config(format!("Address width {} is too large", values[0])))?;
        Ok(Self {
            address_bits,
            block_size: values[1],
            num_sets: values[2],
            associativity: values[3],
            indexing: IndexingMode::default(),
        })
    }
}

/// The validated shape of a cache, with the bit counts derived from it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheGeometry {
    address_bits: u32,
    block_size: u64,
    num_sets: u64,
    associativity: u64,
    offset_bits: u32,
    index_bits: u32,
    tag_bits: u32,
}

impl CacheGeometry {
    pub fn new(address_bits: u32, block_size: u64, num_sets: u64, associativity: u64) -> Result<Self, SimError> {
        if address_bits == 0 || address_bits > MAX_ADDRESS_BITS {
            return Err(SimError::InvalidGeometry(format!("Address width must be between 1 and {MAX_ADDRESS_BITS} bits, got {address_bits}")));
        }
        if !block_size.is_power_of_two() {
            return Err(SimError::InvalidGeometry(format!("Block size must be a power of two, got {block_size}")));
        }
        if !num_sets.is_power_of_two() {
            return Err(SimError::InvalidGeometry(format!("Set count must be a power of two, got {num_sets}")));
        }
        if associativity == 0 {
            return Err(SimError::InvalidGeometry("Associativity must be at least 1".to_string()));
        }
        let offset_bits = block_size.trailing_zeros();
        let index_bits = num_sets.trailing_zeros();
        let tag_bits = address_bits.checked_sub(offset_bits + index_bits).ok_or_else(|| {
            SimError::InvalidGeometry(format!("{offset_bits} offset bits and {index_bits} index bits don't fit in a {address_bits} bit address"))
        })?;
        Ok(Self {
            address_bits,
            block_size,
            num_sets,
            associativity,
            offset_bits,
            index_bits,
            tag_bits,
        })
    }

    pub fn address_bits(&self) -> u32 {
        self.address_bits
    }

    pub fn block_size(&self) -> u64 {
        self.block_size
    }

    pub fn num_sets(&self) -> u64 {
        self.num_sets
    }

    pub fn associativity(&self) -> u64 {
        self.associativity
    }

    pub fn offset_bits(&self) -> u32 {
        self.offset_bits
    }

    pub fn index_bits(&self) -> u32 {
        self.index_bits
    }

    pub fn tag_bits(&self) -> u32 {
        self.tag_bits
    }
}

impl TryFrom<&CacheConfig> for CacheGeometry {
    type Error = SimError;

    fn try_from(value: &CacheConfig) -> Result<Self, Self::Error> {
        CacheGeometry::new(value.address_bits, value.block_size, value.num_sets, value.associativity)
    }
}
