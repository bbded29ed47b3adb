//! Pricing Module
//!
//! 订单金额计算。所有金额用 `Decimal` 运算，逢四舍五入 (away from zero)
//! 保留两位小数，最后才转回 `f64` 存储，避免二进制浮点的累积误差。

use rust_decimal::prelude::*;
use rust_decimal::Decimal;

#[cfg(test)]
mod tests;

/// 税率 15%
fn tax_rate() -> Decimal {
    Decimal::new(15, 2)
}

/// 免运费门槛 (商品小计)
fn free_shipping_over() -> Decimal {
    Decimal::new(100, 0)
}

/// 标准运费
fn flat_shipping() -> Decimal {
    Decimal::new(10, 0)
}

/// Computed order totals
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderTotals {
    pub items_price: f64,
    pub shipping_price: f64,
    pub tax_price: f64,
    pub total_price: f64,
}

/// Convert an f64 amount to Decimal, rounded to 2 decimal places
///
/// 四舍五入采用 away-from-zero (0.005 → 0.01)。
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value)
        .unwrap_or(Decimal::ZERO)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert a Decimal back to f64 for storage
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or(0.0)
}

/// Compute order totals from snapshotted (price, qty) pairs
///
/// 固定计算顺序，各分项先舍入再相加：
/// 1. `items_price` = Σ(单价 × 数量)，每行先入 Decimal 再累加
/// 2. `shipping_price` = 小计 > 100 免运费，否则 10
/// 3. `tax_price` = round2(小计 × 0.15)
/// 4. `total_price` = round2(小计 + 运费 + 税)
pub fn calc_totals(lines: &[(f64, i64)]) -> OrderTotals {
    let items: Decimal = lines
        .iter()
        .map(|(price, qty)| to_decimal(*price) * Decimal::from(*qty))
        .sum();
    let items = items.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

    let shipping = if items > free_shipping_over() {
        Decimal::ZERO
    } else {
        flat_shipping()
    };

    let tax =
        (items * tax_rate()).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

    let total =
        (items + shipping + tax).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

    OrderTotals {
        items_price: to_f64(items),
        shipping_price: to_f64(shipping),
        tax_price: to_f64(tax),
        total_price: to_f64(total),
    }
}
