use super::*;

#[test]
fn plain_positive() {
    assert_eq!(parse_signed_i32("42"), Some(42));
}

#[test]
fn single_dash_is_negative() {
    assert_eq!(parse_signed_i32("-5"), Some(-5));
}

#[test]
fn double_dash_is_positive() {
    assert_eq!(parse_signed_i32("--5"), Some(5));
}

#[test]
fn triple_dash_is_negative() {
    assert_eq!(parse_signed_i32("---5"), Some(-5));
}

#[test]
fn negative_zero_is_zero() {
    assert_eq!(parse_signed_i32("-0"), Some(0));
}

#[test]
fn i32_min_is_representable() {
    assert_eq!(parse_signed_i32("-2147483648"), Some(i32::MIN));
}

#[test]
fn i32_max_is_representable() {
    assert_eq!(parse_signed_i32("2147483647"), Some(i32::MAX));
}

#[test]
fn overflow_past_min_is_none() {
    assert_eq!(parse_signed_i32("-2147483649"), None);
}

#[test]
fn overflow_past_max_is_none() {
    assert_eq!(parse_signed_i32("2147483648"), None);
}

#[test]
fn huge_digit_run_is_none() {
    assert_eq!(parse_signed_i32("99999999999999999999"), None);
}
