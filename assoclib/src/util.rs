use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use lazy_static::lazy_static;
use regex::Regex;
use crate::config::IndexingMode;

lazy_static! {
    static ref OUTPUT_PATTERN: Regex =
        Regex::new(r"^output-(?P<trace>[0-9a-zA-Z_]+)-(?P<config>[0-9a-zA-Z_]+)-(?P<mode>lsb|adaptive)\.rpt$").unwrap();
}

/// The fixture corpus shipped with the crate
pub fn testcases_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("testcases")
}

pub struct TestCasePaths {
    pub config: PathBuf,
    pub trace: PathBuf,
    pub output: PathBuf,
    pub mode: IndexingMode,
}

/// Finds every case under `root` from the expected report names
///
/// `expected/output-<trace>-<config>-<mode>.rpt` is the report for `bench/<trace>.lst` run with
/// `config/<config>.org` in the given mode
pub fn get_cases(root: &Path) -> Result<Vec<TestCasePaths>, Box<dyn Error>> {
    let mut out = Vec::new();
    let mut files = fs::read_dir(root.join("expected"))?
        .map(|entry| entry.map(|e| e.file_name()))
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .filter_map(|name| name.into_string().ok())
        .filter(|name| OUTPUT_PATTERN.is_match(name))
        .collect::<Vec<_>>();
    files.sort();
    for file_name in files {
        let tokens = OUTPUT_PATTERN.captures(&file_name).ok_or("Couldn't parse the file name".to_string())?;
        let trace = tokens.name("trace").ok_or("Couldn't get the trace file from the output file name".to_string())?.as_str();
        let config = tokens.name("config").ok_or("Couldn't get the config file from the output file name".to_string())?.as_str();
        let mode = match tokens.name("mode").map(|m| m.as_str()) {
            Some("adaptive") => IndexingMode::Adaptive,
            _ => IndexingMode::LeastSignificantBits,
        };
        out.push(TestCasePaths {
            config: root.join("config").join(format!("{config}.org")),
            trace: root.join("bench").join(format!("{trace}.lst")),
            output: root.join("expected").join(&file_name),
            mode,
        })
    }
    Ok(out)
}
