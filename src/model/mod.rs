pub mod cell;
pub mod ratio;
pub mod record;
pub mod rounding;

pub use cell::Cell;
pub use ratio::{
    CategoryCount, CategoryShare, RatioAnnotation, RatioEntry, RatioMap, Segment,
};
pub use record::{GroupKey, ReferenceRecord, WoundCategory};
pub use rounding::{PercentPolicy, RoundingPolicy, SegmentOrder};
