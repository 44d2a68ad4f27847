use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use crate::input::cache::{
    CacheKey, CachedRatios, CachedStats, cache_path_default, fingerprint_file, read_ratio_cache,
    write_ratio_cache,
};
use crate::input::{ColumnNames, InputError, Table, read_table};
use crate::model::{Cell, RatioMap, ReferenceRecord};
use crate::pipeline::{BuildOptions, build_with};

#[derive(Debug, Clone)]
pub struct Stage1Output {
    pub records: Vec<ReferenceRecord>,
    pub rows_read: usize,
    pub dropped_empty_key: usize,
}

/// Pulls (procedure, diagnosis, category) triples out of the reference
/// worksheet. Rows missing either key field cannot form a group and are
/// dropped here; category coercion is left to the ratio build.
pub fn extract_reference_records(
    table: &Table,
    columns: &ColumnNames,
) -> Result<Stage1Output, InputError> {
    let procedure_idx = table.require_column(&columns.procedure_code)?;
    let diagnosis_idx = table.require_column(&columns.diagnosis_name)?;
    let category_idx = table.require_column(&columns.wound_category)?;

    let mut records = Vec::with_capacity(table.n_rows());
    let mut dropped_empty_key = 0usize;
    for row in &table.rows {
        let procedure = row.get(procedure_idx).and_then(Cell::key_text);
        let diagnosis = row.get(diagnosis_idx).and_then(Cell::key_text);
        let (Some(procedure), Some(diagnosis)) = (procedure, diagnosis) else {
            dropped_empty_key += 1;
            continue;
        };
        records.push(ReferenceRecord::new(
            procedure,
            diagnosis,
            row.get(category_idx).cloned().unwrap_or_default(),
        ));
    }

    Ok(Stage1Output {
        records,
        rows_read: table.n_rows(),
        dropped_empty_key,
    })
}

#[derive(Debug, Clone)]
pub struct ReferenceSettings {
    pub columns: ColumnNames,
    pub sheet: Option<String>,
    pub options: BuildOptions,
    pub persist_cache: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MapSource {
    Built,
    MemoryCache,
    DiskCache,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReferenceStats {
    pub rows_read: usize,
    pub dropped_empty_key: usize,
    pub dropped_bad_category: usize,
    pub groups: usize,
}

#[derive(Debug, Clone)]
pub struct LoadedReference {
    pub path: PathBuf,
    pub fingerprint: String,
    pub source: MapSource,
    pub stats: ReferenceStats,
    pub map: Arc<RatioMap>,
}

#[derive(Serialize)]
struct CacheSettings<'a> {
    columns: &'a ColumnNames,
    sheet: Option<&'a str>,
    options: &'a BuildOptions,
}

/// Holds the last built ratio map. The map is reused until the reference
/// file's content fingerprint or the build settings change.
#[derive(Debug, Default)]
pub struct ReferenceCache {
    current: Option<(CacheKey, LoadedReference)>,
}

impl ReferenceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(
        &mut self,
        path: &Path,
        settings: &ReferenceSettings,
    ) -> Result<LoadedReference, InputError> {
        if !path.is_file() {
            return Err(InputError::ReferenceUnavailable {
                path: path.to_path_buf(),
            });
        }
        let fingerprint = fingerprint_file(path)?;
        let key = CacheKey {
            fingerprint: fingerprint.clone(),
            settings: serde_json::to_value(CacheSettings {
                columns: &settings.columns,
                sheet: settings.sheet.as_deref(),
                options: &settings.options,
            })?,
        };

        if let Some((cached_key, loaded)) = &self.current {
            if cached_key == &key && loaded.path == path {
                tracing::debug!(path = %path.display(), "reusing ratio map from memory");
                let mut hit = loaded.clone();
                hit.source = MapSource::MemoryCache;
                return Ok(hit);
            }
        }

        let cache_path = cache_path_default(path);
        let from_disk = if settings.persist_cache {
            read_ratio_cache(&cache_path, &key)
        } else {
            None
        };

        let loaded = match from_disk {
            Some(cached) => {
                let map = RatioMap::from_entries(cached.entries);
                tracing::info!(
                    path = %cache_path.display(),
                    groups = map.len(),
                    "ratio map loaded from cache"
                );
                LoadedReference {
                    path: path.to_path_buf(),
                    fingerprint,
                    source: MapSource::DiskCache,
                    stats: ReferenceStats {
                        rows_read: cached.stats.rows_read,
                        dropped_empty_key: cached.stats.dropped_empty_key,
                        dropped_bad_category: cached.stats.dropped_bad_category,
                        groups: map.len(),
                    },
                    map: Arc::new(map),
                }
            }
            None => {
                let loaded = build_reference(path, fingerprint, settings)?;
                if settings.persist_cache {
                    persist(&cache_path, &key, &loaded);
                }
                loaded
            }
        };

        self.current = Some((key, loaded.clone()));
        Ok(loaded)
    }
}

fn build_reference(
    path: &Path,
    fingerprint: String,
    settings: &ReferenceSettings,
) -> Result<LoadedReference, InputError> {
    let table = read_table(path, settings.sheet.as_deref())?;
    let stage1 = extract_reference_records(&table, &settings.columns)?;
    let built = build_with(&stage1.records, &settings.options);

    let stats = ReferenceStats {
        rows_read: stage1.rows_read,
        dropped_empty_key: stage1.dropped_empty_key,
        dropped_bad_category: built.dropped_bad_category,
        groups: built.map.len(),
    };
    tracing::info!(
        path = %path.display(),
        rows = stats.rows_read,
        dropped_empty_key = stats.dropped_empty_key,
        dropped_bad_category = stats.dropped_bad_category,
        groups = stats.groups,
        "ratio map built"
    );

    Ok(LoadedReference {
        path: path.to_path_buf(),
        fingerprint,
        source: MapSource::Built,
        stats,
        map: Arc::new(built.map),
    })
}

fn persist(cache_path: &Path, key: &CacheKey, loaded: &LoadedReference) {
    let ratios = CachedRatios {
        stats: CachedStats {
            rows_read: loaded.stats.rows_read,
            dropped_empty_key: loaded.stats.dropped_empty_key,
            dropped_bad_category: loaded.stats.dropped_bad_category,
        },
        entries: loaded.map.to_entries(),
    };
    match write_ratio_cache(cache_path, key, &ratios) {
        Ok(()) => tracing::debug!(path = %cache_path.display(), "ratio cache written"),
        Err(err) => {
            tracing::warn!(path = %cache_path.display(), %err, "could not write ratio cache")
        }
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage1_reference.rs"]
mod tests;
