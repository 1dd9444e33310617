//! # AssocLib
//!
//! Assoclib simulates a set-associative LRU cache over a trace of binary addresses, to compare
//! how the choice of index bits affects the hit rate
//!
//! Two indexing strategies are provided: the conventional low order bits, and an adaptive
//! strategy which scores each bit on the trace and picks a balanced, decorrelated subset. Both
//! produce a bit assignment which the codec uses to split addresses before replaying them

/// Contains the error type shared by the whole library
pub mod error;

/// Contains the configuration formats and the validated cache geometry
pub mod config;

/// Contains the codec which splits addresses into tag, index and offset
pub mod address;

/// Contains the bit assignment, the trait for indexing strategies and the lsb strategy
pub mod indexing;

/// Contains the adaptive indexing strategy
pub mod adaptive;

/// Contains the LRU ordered cache sets
pub mod cache;

/// Contains the simulator, and the pipeline from configuration and trace to a finished run
pub mod simulator;

/// Contains the trace format
pub mod trace;

/// Contains file loading for traces and configurations
pub mod io;

/// Contains the text report
pub mod report;

#[cfg(test)]
mod test;

/// Contains utilities for running tests and benchmarks.
pub mod util;
