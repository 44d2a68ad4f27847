pub mod stage1_reference;
pub mod stage2_count;
pub mod stage3_percent;
pub mod stage4_format;
pub mod stage5_join;
pub mod stage6_write;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::input::{ColumnNames, InputError, read_table};
use crate::model::{PercentPolicy, RatioMap, ReferenceRecord, RoundingPolicy, SegmentOrder};
use crate::report::RunSummary;
use stage1_reference::LoadedReference;
use stage2_count::count_categories;
use stage3_percent::compute_shares;
use stage4_format::format_ratios;
use stage5_join::KeyColumns;
use stage6_write::{Stage6Input, write_output};

pub use stage5_join::{JoinOutput, join};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BuildOptions {
    pub rounding: RoundingPolicy,
    pub percent: PercentPolicy,
    pub order: SegmentOrder,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatioBuild {
    pub map: RatioMap,
    pub records_used: usize,
    pub dropped_bad_category: usize,
}

/// GroupKey -> ratio annotation with the default policies: half-even
/// rounding, independent percentages, first-seen segment order.
pub fn build(reference: &[ReferenceRecord]) -> RatioMap {
    build_with(reference, &BuildOptions::default()).map
}

/// count -> percent -> format. Records whose category does not coerce to
/// an integer are skipped and counted, never reported as errors.
pub fn build_with(reference: &[ReferenceRecord], options: &BuildOptions) -> RatioBuild {
    let counted = count_categories(reference);
    let shares = compute_shares(&counted.groups, options.rounding, options.percent);
    let map = format_ratios(&shares, options.order);
    RatioBuild {
        map,
        records_used: counted.records_used,
        dropped_bad_category: counted.dropped_bad_category,
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("failed to write summary {}: {source}", .path.display())]
    Summary {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode summary: {0}")]
    SummaryEncode(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct InputJob<'a> {
    pub input_path: &'a Path,
    pub output_path: &'a Path,
    pub sheet: Option<&'a str>,
    pub columns: &'a ColumnNames,
    pub options: &'a BuildOptions,
}

/// Reads one worksheet, annotates it against `reference` and writes it out.
pub fn run_input(job: &InputJob<'_>, reference: &LoadedReference) -> Result<RunSummary, PipelineError> {
    let input = read_table(job.input_path, job.sheet)?;
    let keys = KeyColumns::resolve(&input, job.columns)?;
    let joined = join(&input, keys, &job.columns.ratio, &reference.map);
    tracing::info!(
        path = %job.input_path.display(),
        rows = joined.table.n_rows(),
        matched = joined.matched,
        unmatched = joined.unmatched,
        "input annotated"
    );

    let summary = write_output(&Stage6Input {
        input_path: job.input_path,
        output_path: job.output_path,
        joined: &joined,
        reference,
        options: job.options,
    })?;
    Ok(summary)
}

pub fn write_summaries(path: &Path, summaries: &[RunSummary]) -> Result<(), PipelineError> {
    let json = crate::report::json::render_summary_json(summaries)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| PipelineError::Summary {
            path: path.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(path, json).map_err(|source| PipelineError::Summary {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/mod.rs"]
mod tests;
