use serde::Serialize;
use crate::error::SimError;
use crate::indexing::BitPositionAssignment;

/// One trace entry: the address as written in the trace, and the fields the cache sees
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemoryReference {
    pub address: String,
    pub tag: u64,
    pub index: usize,
    pub offset: u64,
}

/// Parses a fixed width binary address string, most significant character first
///
/// # Examples
///
/// ```
/// use assoclib::address::parse_address;
/// assert_eq!(parse_address("00101100", 8).unwrap(), 0b0010_1100);
/// assert!(parse_address("0010110", 8).is_err());
/// ```
pub fn parse_address(address: &str, width: u32) -> Result<u64, SimError> {
    if address.len() != width as usize {
        return Err(SimError::MalformedAddress {
            address: address.to_string(),
            reason: format!("expected {width} bits, found {}", address.len()),
        });
    }
    let mut res: u64 = 0;
    for c in address.bytes() {
        res <<= 1;
        match c {
            b'0' => {}
            b'1' => res |= 1,
            other => {
                return Err(SimError::MalformedAddress {
                    address: address.to_string(),
                    reason: format!("bad character {:?}", other as char),
                })
            }
        }
    }
    Ok(res)
}

/// Reads the bit at a string position of a parsed address
#[inline(always)]
pub(crate) fn bit_at(value: u64, width: u32, position: u32) -> u64 {
    (value >> (width - 1 - position)) & 1
}

/// Splits addresses into tag, index and offset according to an assignment
///
/// The bits of each field are taken in the order the assignment lists them, the first becoming
/// the most significant bit of the field
pub struct AddressCodec<'a> {
    assignment: &'a BitPositionAssignment,
}

impl<'a> AddressCodec<'a> {
    pub fn new(assignment: &'a BitPositionAssignment) -> Self {
        Self { assignment }
    }

    pub fn decode(&self, address: &str) -> Result<MemoryReference, SimError> {
        let width = self.assignment.address_bits();
        let value = parse_address(address, width)?;
        let gather = |positions: &[u32]| positions.iter().fold(0u64, |acc, p| (acc << 1) | bit_at(value, width, *p));
        Ok(MemoryReference {
            address: address.to_string(),
            tag: gather(self.assignment.tag_positions()),
            index: gather(self.assignment.index_positions()) as usize,
            offset: gather(self.assignment.offset_positions()),
        })
    }

    /// Scatters the decoded fields back to their positions, the inverse of decode
    pub fn encode(&self, reference: &MemoryReference) -> String {
        let width = self.assignment.address_bits();
        let mut bits = vec![b'0'; width as usize];
        let mut scatter = |positions: &[u32], value: u64| {
            let len = positions.len();
            for (i, p) in positions.iter().enumerate() {
                if (value >> (len - 1 - i)) & 1 == 1 {
                    bits[*p as usize] = b'1';
                }
            }
        };
        scatter(self.assignment.tag_positions(), reference.tag);
        scatter(self.assignment.index_positions(), reference.index as u64);
        scatter(self.assignment.offset_positions(), reference.offset);
        // Only ever '0' or '1'
        String::from_utf8(bits).unwrap_or_default()
    }
}
