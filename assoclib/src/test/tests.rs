use std::error::Error;
use std::fs;
use crate::config::CacheConfig;
use crate::io::{load_config, load_trace};
use crate::report::render;
use crate::simulator::run;
use crate::util::{get_cases, testcases_path};

#[test]
fn run_all_examples() -> Result<(), Box<dyn Error>> {
    let cases = get_cases(&testcases_path())?;
    assert!(!cases.is_empty());
    for test in cases {
        println!("Running test for {}", test.output.display());
        let trace = load_trace(&test.trace)?;
        let config = CacheConfig { indexing: test.mode, ..load_config(&test.config)? };
        let expected_output = fs::read_to_string(&test.output)?;
        // Simulate!
        let result = run(&config, &trace)?;
        assert_eq!(result.result.hits + result.result.misses, trace.addresses.len() as u64);
        assert_eq!(render(&result)?, expected_output);
        println!("Success for {}, time: {}", test.output.display(), result.simulation_time.as_nanos() as f64 / 1e9);
    }
    Ok(())
}

#[test]
fn json_and_key_value_configs_agree() -> Result<(), Box<dyn Error>> {
    let root = testcases_path().join("config");
    let from_json = load_config(root.join("cache1.json"))?;
    let from_key_value = load_config(root.join("cache1.org"))?;
    assert_eq!(from_json, from_key_value);
    Ok(())
}

#[test]
fn missing_files_are_reported() {
    let root = testcases_path();
    assert!(load_trace(root.join("bench").join("missing.lst")).is_err());
    assert!(load_config(root.join("config").join("missing.org")).is_err());
}
