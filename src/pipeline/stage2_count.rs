use std::collections::HashMap;

use crate::model::{CategoryCount, GroupKey, ReferenceRecord};

/// Category tallies for one group, categories in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupCounts {
    pub key: GroupKey,
    pub counts: Vec<CategoryCount>,
}

impl GroupCounts {
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|c| c.n).sum()
    }
}

#[derive(Debug, Clone)]
pub struct Stage2Output {
    pub groups: Vec<GroupCounts>,
    pub records_used: usize,
    pub dropped_bad_category: usize,
}

pub fn count_categories(records: &[ReferenceRecord]) -> Stage2Output {
    let mut index: HashMap<GroupKey, usize> = HashMap::new();
    let mut groups: Vec<GroupCounts> = Vec::new();
    let mut records_used = 0usize;
    let mut dropped_bad_category = 0usize;

    for record in records {
        let Some(category) = record.category() else {
            dropped_bad_category += 1;
            tracing::trace!(
                procedure_code = %record.procedure_code,
                diagnosis_name = %record.diagnosis_name,
                value = %record.wound_category,
                "reference row without an integer wound category"
            );
            continue;
        };
        records_used += 1;

        let key = record.key();
        let idx = match index.get(&key) {
            Some(&idx) => idx,
            None => {
                let idx = groups.len();
                index.insert(key.clone(), idx);
                groups.push(GroupCounts {
                    key,
                    counts: Vec::new(),
                });
                idx
            }
        };

        let counts = &mut groups[idx].counts;
        match counts.iter_mut().find(|c| c.category == category) {
            Some(count) => count.n += 1,
            None => counts.push(CategoryCount { category, n: 1 }),
        }
    }

    if dropped_bad_category > 0 {
        tracing::debug!(
            dropped = dropped_bad_category,
            "reference rows dropped for a non-integer wound category"
        );
    }

    Stage2Output {
        groups,
        records_used,
        dropped_bad_category,
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage2_count.rs"]
mod tests;
