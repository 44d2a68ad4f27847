pub mod json;
pub mod text;

use serde::Serialize;

use crate::pipeline::BuildOptions;
use crate::pipeline::stage1_reference::{MapSource, ReferenceStats};

#[derive(Debug, Clone, Serialize)]
pub struct ReferenceSummary {
    pub path: String,
    pub fingerprint: String,
    pub map_source: MapSource,
    #[serde(flatten)]
    pub stats: ReferenceStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct InputSummary {
    pub path: String,
    pub output_path: String,
    pub ratio_column: String,
    pub rows: usize,
    pub matched: usize,
    pub unmatched: usize,
    pub unmatched_keys: usize,
    pub match_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub tool: String,
    pub version: String,
    pub options: BuildOptions,
    pub reference: ReferenceSummary,
    pub input: InputSummary,
}

pub fn match_rate(matched: usize, rows: usize) -> f64 {
    if rows == 0 {
        return 0.0;
    }
    matched as f64 / rows as f64
}

pub fn format_percent_1(fraction: f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}
