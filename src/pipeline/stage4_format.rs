use crate::input::{ColumnNames, Table};
use crate::model::{Cell, CategoryShare, RatioAnnotation, RatioMap, Segment, SegmentOrder};
use crate::pipeline::stage3_percent::GroupShares;

pub fn render_annotation(shares: &[CategoryShare], order: SegmentOrder) -> RatioAnnotation {
    let mut segments = shares.iter().map(Segment::from).collect::<Vec<_>>();
    if order == SegmentOrder::Ascending {
        segments.sort_by_key(Segment::category);
    }
    RatioAnnotation::from_segments(&segments)
}

pub fn format_ratios(groups: &[GroupShares], order: SegmentOrder) -> RatioMap {
    let mut map = RatioMap::new();
    for group in groups {
        map.insert(group.key.clone(), render_annotation(&group.shares, order));
    }
    map
}

/// The map as a three-column worksheet, one row per group.
pub fn ratio_table(map: &RatioMap, columns: &ColumnNames) -> Table {
    let mut table = Table::new(vec![
        columns.procedure_code.clone(),
        columns.diagnosis_name.clone(),
        columns.ratio.clone(),
    ]);
    for (key, ratio) in map.iter() {
        table.push_row(vec![
            Cell::Text(key.procedure_code.clone()),
            Cell::Text(key.diagnosis_name.clone()),
            Cell::Text(ratio.to_string()),
        ]);
    }
    table
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage4_format.rs"]
mod tests;
