use crate::model::{CategoryCount, CategoryShare, GroupKey, PercentPolicy, RoundingPolicy};
use crate::pipeline::stage2_count::GroupCounts;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupShares {
    pub key: GroupKey,
    pub shares: Vec<CategoryShare>,
}

pub fn compute_shares(
    groups: &[GroupCounts],
    rounding: RoundingPolicy,
    policy: PercentPolicy,
) -> Vec<GroupShares> {
    groups
        .iter()
        .map(|group| {
            let pcts = match policy {
                PercentPolicy::Independent => independent_percents(&group.counts, rounding),
                PercentPolicy::LargestRemainder => largest_remainder_percents(&group.counts),
            };
            let shares = group
                .counts
                .iter()
                .zip(pcts)
                .map(|(count, pct)| CategoryShare {
                    category: count.category,
                    n: count.n,
                    pct,
                })
                .collect();
            GroupShares {
                key: group.key.clone(),
                shares,
            }
        })
        .collect()
}

pub fn independent_percents(counts: &[CategoryCount], rounding: RoundingPolicy) -> Vec<u32> {
    let total: u64 = counts.iter().map(|c| c.n).sum();
    counts
        .iter()
        .map(|c| rounding.percent(c.n, total))
        .collect()
}

/// Floors every share, then gives the missing points to the largest
/// remainders. Equal remainders keep first-seen order.
pub fn largest_remainder_percents(counts: &[CategoryCount]) -> Vec<u32> {
    let total: u128 = counts.iter().map(|c| u128::from(c.n)).sum();
    if total == 0 {
        return vec![0; counts.len()];
    }

    let mut floors = Vec::with_capacity(counts.len());
    let mut remainders = Vec::with_capacity(counts.len());
    for c in counts {
        let num = u128::from(c.n) * 100;
        floors.push(num / total);
        remainders.push(num % total);
    }

    let assigned: u128 = floors.iter().sum();
    let mut leftover = 100u128.saturating_sub(assigned);
    let mut order = (0..counts.len()).collect::<Vec<_>>();
    order.sort_by(|&a, &b| remainders[b].cmp(&remainders[a]));
    for idx in order {
        if leftover == 0 || remainders[idx] == 0 {
            break;
        }
        floors[idx] += 1;
        leftover -= 1;
    }

    floors
        .into_iter()
        .map(|v| u32::try_from(v).unwrap_or(u32::MAX))
        .collect()
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage3_percent.rs"]
mod tests;
