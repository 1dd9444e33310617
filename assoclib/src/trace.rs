use std::io::Read;
use serde::Serialize;
use crate::error::SimError;

const HEADER_KEYWORD: &str = ".benchmark";
const TERMINATOR: &str = ".end";

/// A memory trace: the benchmark name from the header, and the addresses in order
///
/// Addresses are kept exactly as written, they are only checked when decoded
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Trace {
    pub benchmark: String,
    pub addresses: Vec<String>,
}

impl Trace {
    /// Parses the whitespace separated trace format
    ///
    /// `.benchmark <name>`, then one address per token up to `.end`. Anything after `.end` is
    /// ignored, and a missing `.end` just means the trace runs to the end of the input
    ///
    /// # Examples
    ///
    /// ```
    /// use assoclib::trace::Trace;
    /// let trace = Trace::parse(".benchmark testcase1\n0000\n0100\n.end\n").unwrap();
    /// assert_eq!(trace.benchmark, "testcase1");
    /// assert_eq!(trace.addresses, vec!["0000", "0100"]);
    /// ```
    pub fn parse(text: &str) -> Result<Self, SimError> {
        let mut tokens = text.split_whitespace();
        match tokens.next() {
            Some(HEADER_KEYWORD) => {}
            Some(other) => return Err(SimError::Trace(format!("Expected {HEADER_KEYWORD}, found {other:?}"))),
            None => return Err(SimError::Trace("The trace is empty".to_string())),
        }
        let benchmark = tokens
            .next()
            .filter(|t| *t != TERMINATOR)
            .ok_or_else(|| SimError::Trace("Missing benchmark name".to_string()))?
            .to_string();
        let addresses = tokens.take_while(|t| *t != TERMINATOR).map(str::to_string).collect();
        Ok(Self { benchmark, addresses })
    }

    pub fn from_reader(mut reader: impl Read) -> Result<Self, SimError> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        Self::parse(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_and_terminator_are_not_addresses() {
        let trace = Trace::parse(".benchmark bench\n01 10\n11\n.end\n00\n").unwrap();
        assert_eq!(trace.benchmark, "bench");
        assert_eq!(trace.addresses, vec!["01", "10", "11"]);
    }

    #[test]
    fn missing_terminator_reads_to_the_end() {
        let trace = Trace::parse(".benchmark bench 01 10").unwrap();
        assert_eq!(trace.addresses, vec!["01", "10"]);
    }

    #[test]
    fn header_only() {
        let trace = Trace::parse(".benchmark bench\n.end").unwrap();
        assert!(trace.addresses.is_empty());
    }

    #[test]
    fn rejects_missing_header() {
        assert!(matches!(Trace::parse(""), Err(SimError::Trace(_))));
        assert!(matches!(Trace::parse("0101 0000"), Err(SimError::Trace(_))));
        assert!(matches!(Trace::parse(".benchmark\n.end"), Err(SimError::Trace(_))));
    }

    #[test]
    fn reads_from_any_reader() {
        let trace = Trace::from_reader(&b".benchmark b 1 0 .end"[..]).unwrap();
        assert_eq!(trace.addresses, vec!["1", "0"]);
    }
}
