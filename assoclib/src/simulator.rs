use std::collections::BTreeMap;
use std::thread;
use std::time::{Duration, Instant};
use log::info;
use serde::{Deserialize, Serialize};
use crate::address::{AddressCodec, MemoryReference};
use crate::cache::{AccessKind, CacheSet};
use crate::config::{CacheConfig, CacheGeometry, IndexingMode};
use crate::error::SimError;
use crate::indexing::{BitPositionAssignment, GenericIndexing, IndexingPolicy};
use crate::trace::Trace;

/// The simulator replays decoded references against one LRU ordered set per index value, and
/// collects the results.
///
/// Sets are created on first touch, an index which has never been referenced holds nothing, so
/// very wide geometries cost nothing up front
///
/// It supports calling simulate multiple times, the sets are not reset in between so later calls
/// see the residency left by earlier ones. The time taken and the results accumulate accordingly
pub struct Simulator {
    sets: BTreeMap<usize, CacheSet>,
    num_sets: usize,
    associativity: usize,
    result: SimulationResult,
    simulation_time: Duration,
}

/// The outcome of a simulation. One label per reference, in trace order, plus the totals
#[derive(Debug, Clone, Default, Serialize, Deserialize, Eq, PartialEq)]
pub struct SimulationResult {
    pub labels: Vec<AccessKind>,
    pub hits: u64,
    pub misses: u64,
}

impl Simulator {

    /// Creates a simulator with every set empty
    ///
    /// # Arguments
    ///
    /// * `geometry`: The validated cache shape, which fixes the set count and associativity
    ///
    /// returns: Simulator
    pub fn new(geometry: &CacheGeometry) -> Self {
        Self {
            sets: BTreeMap::new(),
            num_sets: usize::try_from(geometry.num_sets()).unwrap_or(usize::MAX),
            associativity: usize::try_from(geometry.associativity()).unwrap_or(usize::MAX),
            result: SimulationResult::default(),
            simulation_time: Duration::new(0, 0),
        }
    }

    /// Classifies one reference, updating the residency of its set
    ///
    /// Order matters, each call sees the state left by every earlier one
    ///
    /// Fails if the reference's index is not below the set count, which can't happen for
    /// references decoded with an assignment for the same geometry. Nothing is recorded then
    pub fn classify(&mut self, reference: &MemoryReference) -> Result<AccessKind, SimError> {
        if reference.index >= self.num_sets {
            return Err(SimError::IndexOutOfRange { index: reference.index, num_sets: self.num_sets });
        }
        let kind = self.sets.entry(reference.index).or_default().access(reference.tag, self.associativity);
        match kind {
            AccessKind::Hit => self.result.hits += 1,
            AccessKind::Miss => self.result.misses += 1,
        }
        self.result.labels.push(kind);
        Ok(kind)
    }

    /// Replays a sequence of references in order
    ///
    /// # Arguments
    ///
    /// * `references`: The decoded trace
    ///
    /// returns: Result<&SimulationResult, SimError>, the totals so far. Stops at the first
    /// reference which doesn't fit the geometry
    pub fn simulate(&mut self, references: &[MemoryReference]) -> Result<&SimulationResult, SimError> {
        let start = Instant::now();
        let outcome = references.iter().try_for_each(|r| self.classify(r).map(|_| ()));
        let end = Instant::now();
        self.simulation_time += end - start;
        outcome.map(|_| &self.result)
    }

    pub fn result(&self) -> &SimulationResult {
        &self.result
    }

    pub fn into_result(self) -> SimulationResult {
        self.result
    }

    /// Gets the wall-clock execution time for processing
    pub fn get_execution_time(&self) -> &Duration {
        &self.simulation_time
    }

    /// Gets the number of resident tags in each set which has been touched, keyed by index.
    /// Useful for analysing how evenly an indexing spreads the trace
    pub fn get_resident_counts(&self) -> BTreeMap<usize, usize> {
        self.sets.iter().map(|(index, set)| (*index, set.len())).collect()
    }
}

/// Everything a report needs about one simulation
#[derive(Debug, Clone, Serialize)]
pub struct SimulationRun {
    pub benchmark: String,
    pub geometry: CacheGeometry,
    pub mode: IndexingMode,
    pub assignment: BitPositionAssignment,
    pub references: Vec<MemoryReference>,
    pub result: SimulationResult,
    pub resident_counts: BTreeMap<usize, usize>,
    #[serde(skip)]
    pub simulation_time: Duration,
}

/// Runs a full simulation of the trace under the configuration
///
/// The indexing is computed once up front, then every address is decoded before the first one is
/// classified, so a malformed address anywhere fails the run without partial results
pub fn run(config: &CacheConfig, trace: &Trace) -> Result<SimulationRun, SimError> {
    let geometry = CacheGeometry::try_from(config)?;
    let assignment = GenericIndexing::from(config.indexing).assign(&geometry, &trace.addresses)?;
    let codec = AddressCodec::new(&assignment);
    let references = trace
        .addresses
        .iter()
        .map(|a| codec.decode(a))
        .collect::<Result<Vec<_>, _>>()?;
    let mut simulator = Simulator::new(&geometry);
    simulator.simulate(&references)?;
    info!(
        "{} ({}): {} hits, {} misses",
        trace.benchmark,
        config.indexing.name(),
        simulator.result().hits,
        simulator.result().misses
    );
    let resident_counts = simulator.get_resident_counts();
    let simulation_time = *simulator.get_execution_time();
    Ok(SimulationRun {
        benchmark: trace.benchmark.clone(),
        geometry,
        mode: config.indexing,
        assignment,
        references,
        result: simulator.into_result(),
        resident_counts,
        simulation_time,
    })
}

/// Runs the trace under both indexing strategies, one thread each
///
/// Each thread owns its own simulator. Returns the lsb run first
pub fn compare(config: &CacheConfig, trace: &Trace) -> Result<(SimulationRun, SimulationRun), SimError> {
    let lsb_config = CacheConfig { indexing: IndexingMode::LeastSignificantBits, ..config.clone() };
    let adaptive_config = CacheConfig { indexing: IndexingMode::Adaptive, ..config.clone() };
    thread::scope(|s| {
        let lsb = s.spawn(|| run(&lsb_config, trace));
        let adaptive = s.spawn(|| run(&adaptive_config, trace));
        let lsb = lsb.join().map_err(|_| SimError::Io("The lsb simulation thread panicked".to_string()))??;
        let adaptive = adaptive.join().map_err(|_| SimError::Io("The adaptive simulation thread panicked".to_string()))??;
        Ok((lsb, adaptive))
    })
}
