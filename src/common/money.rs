// src/common/money.rs

// Os cálculos usam precisão cheia; o arredondamento só acontece na saída.

use rust_decimal::{Decimal, RoundingStrategy};

/// Casas para preços e custos finais.
pub const CURRENCY_DP: u32 = 2;
/// Casas para preços por grama.
pub const PER_GRAM_DP: u32 = 4;

pub fn round_currency(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(CURRENCY_DP, RoundingStrategy::MidpointAwayFromZero)
}

pub fn round_per_gram(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(PER_GRAM_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// Maior valor aceito pela API para preços e quantidades.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);
/// Faixa aceita para margens e variações percentuais.
pub const MIN_PERCENT: Decimal = Decimal::from_parts(100, 0, 0, true, 0);
pub const MAX_PERCENT: Decimal = Decimal::from_parts(10_000, 0, 0, false, 0);

// Aritmética do motor: nunca entra em pânico. Estouro satura em Decimal::MAX/MIN.

/// Divisor zero resulta em zero.
pub fn div_or_zero(value: Decimal, divisor: Decimal) -> Decimal {
    if divisor.is_zero() {
        return Decimal::ZERO;
    }
    value.checked_div(divisor).unwrap_or_else(|| {
        if value.is_sign_negative() == divisor.is_sign_negative() {
            Decimal::MAX
        } else {
            Decimal::MIN
        }
    })
}

pub fn saturating_sum(values: impl IntoIterator<Item = Decimal>) -> Decimal {
    values.into_iter().fold(Decimal::ZERO, Decimal::saturating_add)
}
