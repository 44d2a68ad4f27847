use super::*;

use crate::model::{GroupKey, RatioMap, ReferenceRecord};
use crate::pipeline::build;

fn sample_ratios() -> CachedRatios {
    let map = build(&[
        ReferenceRecord::new("P1", "D1", 1i64),
        ReferenceRecord::new("P1", "D1", 2i64),
    ]);
    CachedRatios {
        stats: CachedStats {
            rows_read: 3,
            dropped_empty_key: 1,
            dropped_bad_category: 0,
        },
        entries: map.to_entries(),
    }
}

fn key(fingerprint: &str) -> CacheKey {
    CacheKey {
        fingerprint: fingerprint.to_string(),
        settings: serde_json::json!({ "order": "first-seen" }),
    }
}

#[test]
fn test_fingerprint_changes_with_content() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ref.csv");
    std::fs::write(&path, "a,b\n1,2\n").unwrap();
    let first = fingerprint_file(&path).unwrap();
    assert_eq!(first, hex::encode(Sha256::digest(b"a,b\n1,2\n")));
    assert_eq!(first.len(), 64);

    std::fs::write(&path, "a,b\n1,3\n").unwrap();
    assert_ne!(fingerprint_file(&path).unwrap(), first);
}

#[test]
fn test_cache_path_default() {
    assert_eq!(
        cache_path_default(Path::new("/data/对照表.xlsx")),
        PathBuf::from("/data/对照表.xlsx.ratiocache.json")
    );
}

#[test]
fn test_cache_round_trip_and_staleness() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ref.ratiocache.json");
    let ratios = sample_ratios();
    write_ratio_cache(&path, &key("abc"), &ratios).unwrap();

    let hit = read_ratio_cache(&path, &key("abc")).unwrap();
    assert_eq!(hit.stats, ratios.stats);
    let map = RatioMap::from_entries(hit.entries);
    assert_eq!(
        map.get(&GroupKey::new("P1", "D1")).map(|r| r.as_str()),
        Some("1:50%,2:50%")
    );

    assert!(read_ratio_cache(&path, &key("def")).is_none());
}

#[test]
fn test_corrupt_cache_is_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ref.ratiocache.json");
    std::fs::write(&path, "{not json").unwrap();
    assert!(read_ratio_cache(&path, &key("abc")).is_none());
    assert!(read_ratio_cache(&dir.path().join("missing.json"), &key("abc")).is_none());
}
