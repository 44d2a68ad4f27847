use serde::{Deserialize, Serialize};

/// How an exact share of 100 is rounded to a whole percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoundingPolicy {
    /// Ties go to the even neighbour (12.5 -> 12, 37.5 -> 38).
    #[default]
    HalfEven,
    /// Ties go up (12.5 -> 13).
    HalfUp,
}

impl RoundingPolicy {
    /// round(100 * n / total) in exact integer arithmetic.
    pub fn percent(self, n: u64, total: u64) -> u32 {
        if total == 0 {
            return 0;
        }
        let num = u128::from(n) * 100;
        let total = u128::from(total);
        let q = num / total;
        let twice_rem = (num % total) * 2;
        let rounded = if twice_rem > total {
            q + 1
        } else if twice_rem == total {
            match self {
                RoundingPolicy::HalfEven => q + (q & 1),
                RoundingPolicy::HalfUp => q + 1,
            }
        } else {
            q
        };
        u32::try_from(rounded).unwrap_or(u32::MAX)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PercentPolicy {
    /// Each category rounded on its own; a group may total 99 or 101.
    #[default]
    Independent,
    /// Floors plus largest-remainder top-up so every group totals 100.
    LargestRemainder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SegmentOrder {
    #[default]
    FirstSeen,
    Ascending,
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/rounding.rs"]
mod tests;
