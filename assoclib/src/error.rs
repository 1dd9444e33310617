use std::fmt::{Display, Formatter};
use std::io;

/// Every way a simulation run can fail
///
/// The first three come from the core itself, the rest are raised by the loaders when handing data
/// to the core. None of them are recoverable, the run is abandoned on the first one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    /// The cache geometry is inconsistent, e.g. a non power of two set count or more offset and
    /// index bits than the address holds
    InvalidGeometry(String),
    /// Adaptive indexing was requested without any addresses to learn from
    EmptyTrace,
    /// An address of the wrong width, or containing something other than '0' and '1'
    MalformedAddress { address: String, reason: String },
    /// A reference handed straight to the simulator names a set the geometry doesn't have
    IndexOutOfRange { index: usize, num_sets: usize },
    /// The configuration file couldn't be read into a geometry
    Config(String),
    /// The trace file doesn't follow the `.benchmark <name> ... .end` layout
    Trace(String),
    Io(String),
}

impl Display for SimError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SimError::InvalidGeometry(reason) => write!(f, "Invalid cache geometry: {reason}"),
            SimError::EmptyTrace => write!(f, "Adaptive indexing needs at least one address in the trace"),
            SimError::MalformedAddress { address, reason } => write!(f, "Malformed address {address:?}: {reason}"),
            SimError::IndexOutOfRange { index, num_sets } => write!(f, "Set index {index} is out of range for {num_sets} sets"),
            SimError::Config(reason) => write!(f, "Couldn't parse the config: {reason}"),
            SimError::Trace(reason) => write!(f, "Couldn't parse the trace: {reason}"),
            SimError::Io(reason) => write!(f, "IO error: {reason}"),
        }
    }
}

impl std::error::Error for SimError {}

impl From<io::Error> for SimError {
    fn from(value: io::Error) -> Self {
        SimError::Io(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_address() {
        let err = SimError::MalformedAddress { address: "01x1".to_string(), reason: "bad character 'x'".to_string() };
        assert_eq!(err.to_string(), "Malformed address \"01x1\": bad character 'x'");
    }

    #[test]
    fn out_of_range_names_both_sides() {
        let err = SimError::IndexOutOfRange { index: 9, num_sets: 4 };
        assert_eq!(err.to_string(), "Set index 9 is out of range for 4 sets");
    }

    #[test]
    fn io_errors_are_wrapped() {
        let err: SimError = io::Error::new(io::ErrorKind::NotFound, "gone").into();
        assert_eq!(err, SimError::Io("gone".to_string()));
    }
}
