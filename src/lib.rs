//! Wound-classification ratio annotation.
//!
//! [`build`] turns reference records (procedure code, diagnosis name, wound
//! category) into a [`RatioMap`] of compact distribution strings such as
//! `"1:75%,2:25%"` or, for a single category, `"2"`. [`join`] appends those
//! strings to an input worksheet without reordering or dropping rows.

pub mod input;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod report;

pub use model::{GroupKey, RatioAnnotation, RatioMap, ReferenceRecord, WoundCategory};
pub use pipeline::{BuildOptions, build, build_with, join};
