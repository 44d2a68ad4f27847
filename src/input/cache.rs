use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::input::InputError;
use crate::model::RatioEntry;

const CACHE_FORMAT: &str = "wound-ratio/ratiocache";
const CACHE_VERSION: u32 = 1;
const BUFFER_SIZE: usize = 64 * 1024;

/// SHA-256 of the file contents, hex encoded.
pub fn fingerprint_file(path: &Path) -> Result<String, InputError> {
    let file = File::open(path)?;
    let mut reader = BufReader::with_capacity(BUFFER_SIZE, file);
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; BUFFER_SIZE];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

pub fn cache_path_default(reference_path: &Path) -> PathBuf {
    let mut name = reference_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".ratiocache.json");
    reference_path.with_file_name(name)
}

/// Everything a cached map depends on besides the ratios themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheKey {
    pub fingerprint: String,
    pub settings: serde_json::Value,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedStats {
    pub rows_read: usize,
    pub dropped_empty_key: usize,
    pub dropped_bad_category: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedRatios {
    pub stats: CachedStats,
    pub entries: Vec<RatioEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CacheFile {
    format: String,
    version: u32,
    key: CacheKey,
    ratios: CachedRatios,
}

pub fn write_ratio_cache(
    path: &Path,
    key: &CacheKey,
    ratios: &CachedRatios,
) -> Result<(), InputError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = CacheFile {
        format: CACHE_FORMAT.to_string(),
        version: CACHE_VERSION,
        key: key.clone(),
        ratios: ratios.clone(),
    };
    let mut w = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut w, &file)?;
    w.flush()?;
    Ok(())
}

/// Returns `None` for a missing, foreign, outdated or unreadable cache; a
/// cache is never a reason to fail a run.
pub fn read_ratio_cache(path: &Path, key: &CacheKey) -> Option<CachedRatios> {
    let file = File::open(path).ok()?;
    let cached: CacheFile = match serde_json::from_reader(BufReader::new(file)) {
        Ok(cached) => cached,
        Err(err) => {
            tracing::warn!(path = %path.display(), %err, "ignoring unreadable ratio cache");
            return None;
        }
    };
    if cached.format != CACHE_FORMAT || cached.version != CACHE_VERSION {
        return None;
    }
    if &cached.key != key {
        tracing::debug!(path = %path.display(), "ratio cache is stale");
        return None;
    }
    Some(cached.ratios)
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/cache.rs"]
mod tests;
