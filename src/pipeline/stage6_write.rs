use std::path::Path;

use crate::input::{InputError, write_table};
use crate::pipeline::BuildOptions;
use crate::pipeline::stage1_reference::LoadedReference;
use crate::pipeline::stage5_join::JoinOutput;
use crate::report::text::render_summary_text;
use crate::report::{InputSummary, ReferenceSummary, RunSummary, match_rate};

#[derive(Debug, Clone)]
pub struct Stage6Input<'a> {
    pub input_path: &'a Path,
    pub output_path: &'a Path,
    pub joined: &'a JoinOutput,
    pub reference: &'a LoadedReference,
    pub options: &'a BuildOptions,
}

pub fn write_output(input: &Stage6Input<'_>) -> Result<RunSummary, InputError> {
    write_table(input.output_path, &input.joined.table)?;

    let summary = build_summary(input);
    if summary.input.unmatched > 0 {
        tracing::warn!(
            unmatched = summary.input.unmatched,
            keys = summary.input.unmatched_keys,
            "rows without a reference ratio were left blank"
        );
    }
    for line in render_summary_text(&summary).lines() {
        tracing::info!("{line}");
    }
    Ok(summary)
}

pub fn build_summary(input: &Stage6Input<'_>) -> RunSummary {
    let joined = input.joined;
    let rows = joined.table.n_rows();
    RunSummary {
        tool: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        options: *input.options,
        reference: ReferenceSummary {
            path: input.reference.path.display().to_string(),
            fingerprint: input.reference.fingerprint.clone(),
            map_source: input.reference.source,
            stats: input.reference.stats.clone(),
        },
        input: InputSummary {
            path: input.input_path.display().to_string(),
            output_path: input.output_path.display().to_string(),
            ratio_column: joined.ratio_column.clone(),
            rows,
            matched: joined.matched,
            unmatched: joined.unmatched,
            unmatched_keys: joined.unmatched_keys,
            match_rate: match_rate(joined.matched, rows),
        },
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage6_write.rs"]
mod tests;
