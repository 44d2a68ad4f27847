use super::*;

#[test]
fn test_category_coercion_integers_and_floats() {
    assert_eq!(WoundCategory::coerce(&Cell::Int(2)), Some(WoundCategory(2)));
    assert_eq!(WoundCategory::coerce(&Cell::Float(3.0)), Some(WoundCategory(3)));
    assert_eq!(WoundCategory::coerce(&Cell::Float(2.7)), Some(WoundCategory(2)));
    assert_eq!(WoundCategory::coerce(&Cell::Float(f64::NAN)), None);
    assert_eq!(WoundCategory::coerce(&Cell::Float(f64::INFINITY)), None);
}

#[test]
fn test_category_coercion_text() {
    assert_eq!(WoundCategory::parse(" 1 "), Some(WoundCategory(1)));
    assert_eq!(WoundCategory::parse("4.0"), Some(WoundCategory(4)));
    assert_eq!(WoundCategory::parse("-1"), Some(WoundCategory(-1)));
    assert_eq!(WoundCategory::parse("x"), None);
    assert_eq!(WoundCategory::parse("II"), None);
    assert_eq!(WoundCategory::parse(""), None);
    assert_eq!(WoundCategory::parse("nan"), None);
}

#[test]
fn test_category_coercion_missing() {
    assert_eq!(WoundCategory::coerce(&Cell::Empty), None);
    assert_eq!(WoundCategory::coerce(&Cell::Bool(true)), None);
}

#[test]
fn test_record_key_and_category() {
    let record = ReferenceRecord::new("86.2201", "Appendicitis", "2");
    assert_eq!(record.key(), GroupKey::new("86.2201", "Appendicitis"));
    assert_eq!(record.category(), Some(WoundCategory(2)));

    let missing = ReferenceRecord::new("P", "D", None::<i64>);
    assert_eq!(missing.wound_category, Cell::Empty);
    assert_eq!(missing.category(), None);
}

#[test]
fn test_key_text_of_spreadsheet_numbers() {
    assert_eq!(Cell::Float(12.0).key_text().as_deref(), Some("12"));
    assert_eq!(Cell::Float(86.2201).key_text().as_deref(), Some("86.2201"));
    assert_eq!(Cell::Int(7).key_text().as_deref(), Some("7"));
    assert_eq!(Cell::Text(String::new()).key_text(), None);
    assert_eq!(Cell::Empty.key_text(), None);
}
