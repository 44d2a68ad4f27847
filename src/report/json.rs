use crate::report::RunSummary;

pub fn render_summary_json(summaries: &[RunSummary]) -> Result<String, serde_json::Error> {
    let mut out = serde_json::to_string_pretty(summaries)?;
    out.push('\n');
    Ok(out)
}
