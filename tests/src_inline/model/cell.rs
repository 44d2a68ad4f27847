use chrono::NaiveDate;

use super::*;

fn at(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, mi, s)
        .unwrap()
}

#[test]
fn test_datetimes_render_date_then_time() {
    assert_eq!(Cell::DateTime(at(2024, 3, 15, 0, 0, 0)).to_string(), "2024-03-15");
    assert_eq!(
        Cell::DateTime(at(2024, 3, 14, 9, 0, 0)).to_string(),
        "2024-03-14 09:00:00"
    );
}

#[test]
fn test_durations_render_unbounded_hours() {
    assert_eq!(Cell::Duration(TimeDelta::hours(12)).to_string(), "12:00:00");
    assert_eq!(Cell::Duration(TimeDelta::minutes(1815)).to_string(), "30:15:00");
    assert_eq!(Cell::Duration(TimeDelta::hours(-1)).to_string(), "-1:00:00");
}

#[test]
fn test_dates_are_keys_not_missing() {
    let cell = Cell::DateTime(at(2024, 3, 15, 0, 0, 0));
    assert!(!cell.is_missing());
    assert_eq!(cell.key_text().as_deref(), Some("2024-03-15"));
}

#[test]
fn test_float_keys_drop_integral_fraction() {
    assert_eq!(Cell::Float(12.0).key_text().as_deref(), Some("12"));
    assert_eq!(Cell::Float(86.2201).to_string(), "86.2201");
    assert!(Cell::Float(f64::NAN).is_missing());
    assert!(Cell::from("").is_missing());
}
