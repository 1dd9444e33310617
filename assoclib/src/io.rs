use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;
use crate::config::CacheConfig;
use crate::error::SimError;
use crate::trace::Trace;

pub fn get_reader(file: File) -> Result<impl Read + Seek, SimError> {
    // Compatibility on other systems
    #[cfg(not(unix))]
    {
        use std::io::BufReader;
        const BUFFER_SIZE: usize = 64 * 1024;
        Ok(BufReader::with_capacity(BUFFER_SIZE, file))
    }
    // Memory map the file on unix systems, traces are read front to back exactly once
    #[cfg(unix)]
    {
        use std::io::Cursor;
        use memmap2::{Advice, Mmap};
        // An empty file can't be mapped
        if file.metadata()?.len() == 0 {
            return Ok(Cursor::new(MappedOrEmpty::Empty));
        }
        unsafe {
            let m = Mmap::map(&file).map_err(|e| SimError::Io(format!("Couldn't memory map the file: {e}")))?;
            m.advise(Advice::Sequential).map_err(|e| SimError::Io(format!("Failed to provide access advice to the OS, {e}")))?;
            Ok(Cursor::new(MappedOrEmpty::Mapped(m)))
        }
    }
}

#[cfg(unix)]
enum MappedOrEmpty {
    Mapped(memmap2::Mmap),
    Empty,
}

#[cfg(unix)]
impl AsRef<[u8]> for MappedOrEmpty {
    fn as_ref(&self) -> &[u8] {
        match self {
            MappedOrEmpty::Mapped(m) => &m[..],
            MappedOrEmpty::Empty => &[],
        }
    }
}

/// Loads a trace file
pub fn load_trace(path: impl AsRef<Path>) -> Result<Trace, SimError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| SimError::Io(format!("Couldn't open the trace file at path {}: {e}", path.display())))?;
    Trace::from_reader(get_reader(file)?)
}

/// Loads a configuration file. Files ending in `.json` are read as JSON, anything else as the
/// key/value format
pub fn load_config(path: impl AsRef<Path>) -> Result<CacheConfig, SimError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| SimError::Io(format!("Couldn't open the config file at path {}: {e}", path.display())))?;
    if path.extension().map_or(false, |e| e == "json") {
        serde_json::from_str(&text).map_err(|e| SimError::Config(e.to_string()))
    } else {
        CacheConfig::from_key_value(&text)
    }
}
