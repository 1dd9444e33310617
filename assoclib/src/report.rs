use std::io::{self, Write};
use crate::simulator::SimulationRun;

/// Writes the plain text report for a run
///
/// Geometry, the chosen index bits (as bit numbers, most significant first), the benchmark's
/// addresses with their outcome, and the miss total
pub fn write_report(out: &mut impl Write, run: &SimulationRun) -> io::Result<()> {
    let geometry = &run.geometry;
    writeln!(out, "Address bits: {}", geometry.address_bits())?;
    writeln!(out, "Cache sets: {}", geometry.num_sets())?;
    writeln!(out, "Associativity: {}", geometry.associativity())?;
    writeln!(out, "Block size: {}", geometry.block_size())?;
    writeln!(out)?;

    let index_bits = run
        .assignment
        .index_bit_numbers()
        .iter()
        .map(|b| b.to_string())
        .collect::<Vec<_>>()
        .join(" ");
    writeln!(out, "Indexing bit count: {}", geometry.index_bits())?;
    writeln!(out, "Indexing bits: {index_bits}")?;
    writeln!(out, "Offset bit count: {}", geometry.offset_bits())?;
    writeln!(out)?;

    writeln!(out, ".benchmark {}", run.benchmark)?;
    for (reference, label) in run.references.iter().zip(&run.result.labels) {
        writeln!(out, "{} {label}", reference.address)?;
    }
    writeln!(out, ".end")?;
    writeln!(out)?;

    writeln!(out, "Total cache miss count: {}", run.result.misses)
}

/// Renders the report into a string
pub fn render(run: &SimulationRun) -> io::Result<String> {
    let mut buf = Vec::new();
    write_report(&mut buf, run)?;
    String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}
