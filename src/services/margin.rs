// src/services/margin.rs

// Motor de margem: funções puras, usadas nos dois sentidos (margem -> preço e preço -> margem).

use rust_decimal::Decimal;

use crate::{
    common::money::div_or_zero,
    models::pricing::PriceQuote,
};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// `custo * (1 + margem/100)`
pub fn price_from_margin(cost: Decimal, margin_pct: Decimal) -> Decimal {
    cost.saturating_mul(Decimal::ONE.saturating_add(div_or_zero(margin_pct, HUNDRED)))
}

/// `(preço - custo) / custo * 100`, ou zero quando o custo não é positivo.
pub fn margin_from_price(cost: Decimal, price: Decimal) -> Decimal {
    if cost <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    div_or_zero(price.saturating_sub(cost), cost).saturating_mul(HUNDRED)
}

pub fn markup(cost: Decimal, price: Decimal) -> Decimal {
    price.saturating_sub(cost)
}

pub fn quote_from_margin(cost: Decimal, margin_pct: Decimal) -> PriceQuote {
    let sale_price = price_from_margin(cost, margin_pct);
    PriceQuote {
        cost,
        sale_price,
        margin_pct,
        markup: markup(cost, sale_price),
    }
}

pub fn quote_from_price(cost: Decimal, sale_price: Decimal) -> PriceQuote {
    PriceQuote {
        cost,
        sale_price,
        margin_pct: margin_from_price(cost, sale_price),
        markup: markup(cost, sale_price),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn price_from_margin_applies_percentage() {
        assert_eq!(price_from_margin(d("5.50"), d("80")), d("9.90"));
        assert_eq!(price_from_margin(d("10"), Decimal::ZERO), d("10"));
    }

    #[test]
    fn margin_round_trips_for_positive_costs() {
        let tolerance = d("0.0000001");
        for cost in ["0.01", "1", "3.33", "5.50", "127.45"] {
            for margin in ["-50", "0", "12.5", "33.333", "80", "250"] {
                let c = d(cost);
                let m = d(margin);
                let back = margin_from_price(c, price_from_margin(c, m));
                assert!((back - m).abs() < tolerance, "custo {} margem {} voltou {}", c, m, back);
            }
        }
    }

    #[test]
    fn zero_cost_yields_zero_margin() {
        assert_eq!(margin_from_price(Decimal::ZERO, d("12.00")), Decimal::ZERO);
        assert_eq!(margin_from_price(Decimal::ZERO, Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn quotes_agree_in_both_directions() {
        let by_margin = quote_from_margin(d("4"), d("50"));
        assert_eq!(by_margin.sale_price, d("6"));
        assert_eq!(by_margin.markup, d("2"));

        let by_price = quote_from_price(d("4"), d("6"));
        assert_eq!(by_price.margin_pct, d("50"));
        assert_eq!(by_price.markup, by_margin.markup);
    }

    #[test]
    fn extreme_values_saturate_without_panicking() {
        let huge = d("100000000000000000000");
        assert_eq!(price_from_margin(huge, huge), Decimal::MAX);

        let quote = quote_from_price(d("0.0000000000000000000001"), Decimal::MAX);
        assert_eq!(quote.margin_pct, Decimal::MAX);
        assert_eq!(markup(Decimal::MIN, Decimal::MAX), Decimal::MAX);
    }
}
