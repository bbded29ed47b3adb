use super::*;

#[test]
fn test_free_shipping_over_threshold() {
    // 60 × 2 = 120 > 100 → free shipping, 15% tax
    let totals = calc_totals(&[(60.0, 2)]);
    assert_eq!(totals.items_price, 120.0);
    assert_eq!(totals.shipping_price, 0.0);
    assert_eq!(totals.tax_price, 18.0);
    assert_eq!(totals.total_price, 138.0);
}

#[test]
fn test_flat_shipping_under_threshold() {
    // 30 × 1 = 30 ≤ 100 → flat 10 shipping
    let totals = calc_totals(&[(30.0, 1)]);
    assert_eq!(totals.items_price, 30.0);
    assert_eq!(totals.shipping_price, 10.0);
    assert_eq!(totals.tax_price, 4.5);
    assert_eq!(totals.total_price, 44.5);
}

#[test]
fn test_threshold_is_exclusive() {
    // exactly 100 still pays shipping
    let totals = calc_totals(&[(50.0, 2)]);
    assert_eq!(totals.items_price, 100.0);
    assert_eq!(totals.shipping_price, 10.0);
    assert_eq!(totals.tax_price, 15.0);
    assert_eq!(totals.total_price, 125.0);
}

#[test]
fn test_tax_rounded_before_summing() {
    // 33.33 × 1 → tax 4.9995 rounds to 5.00, total = 33.33 + 10 + 5.00
    let totals = calc_totals(&[(33.33, 1)]);
    assert_eq!(totals.tax_price, 5.0);
    assert_eq!(totals.total_price, 48.33);
}

#[test]
fn test_multiple_lines_accumulate() {
    let totals = calc_totals(&[(19.99, 3), (5.5, 2)]);
    assert_eq!(totals.items_price, 70.97);
    assert_eq!(totals.shipping_price, 10.0);
    // 70.97 × 0.15 = 10.6455 → 10.65 (away from zero)
    assert_eq!(totals.tax_price, 10.65);
    assert_eq!(totals.total_price, 91.62);
}

#[test]
fn test_empty_cart_is_all_zero_plus_shipping() {
    let totals = calc_totals(&[]);
    assert_eq!(totals.items_price, 0.0);
    assert_eq!(totals.shipping_price, 10.0);
    assert_eq!(totals.tax_price, 0.0);
    assert_eq!(totals.total_price, 10.0);
}

#[test]
fn test_decimal_round_trip() {
    assert_eq!(to_f64(to_decimal(0.005)), 0.01);
    assert_eq!(to_f64(to_decimal(2.675)), 2.68);
    assert_eq!(to_f64(to_decimal(10.0)), 10.0);
}
