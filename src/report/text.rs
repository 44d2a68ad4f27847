use crate::pipeline::stage1_reference::MapSource;
use crate::report::{RunSummary, format_percent_1};

pub fn render_summary_text(summary: &RunSummary) -> String {
    let reference = &summary.reference;
    let input = &summary.input;
    let mut out = String::new();

    out.push_str("Wound category ratio run\n");
    out.push_str("========================\n");
    out.push_str(&format!(
        "Reference: {} ({})\n",
        reference.path,
        source_label(reference.map_source)
    ));
    out.push_str(&format!(
        "  rows {}, groups {}, dropped: {} empty key, {} bad category\n",
        reference.stats.rows_read,
        reference.stats.groups,
        reference.stats.dropped_empty_key,
        reference.stats.dropped_bad_category
    ));
    out.push_str(&format!("Input: {}\n", input.path));
    out.push_str(&format!(
        "  rows {}, matched {} ({}), unmatched {} across {} keys\n",
        input.rows,
        input.matched,
        format_percent_1(input.match_rate),
        input.unmatched,
        input.unmatched_keys
    ));
    out.push_str(&format!(
        "Output: {} (column '{}')\n",
        input.output_path, input.ratio_column
    ));
    out
}

fn source_label(source: MapSource) -> &'static str {
    match source {
        MapSource::Built => "built",
        MapSource::MemoryCache => "reused",
        MapSource::DiskCache => "from cache file",
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/text.rs"]
mod tests;
