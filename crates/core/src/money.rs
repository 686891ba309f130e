//! Money

use rust_decimal::{Decimal, RoundingStrategy};

/// Currency code printed in front of every amount on documents.
pub const CURRENCY_CODE: &str = "EUR";

/// Price of `quantity` units at `unit_price`.
pub fn line_total(unit_price: Decimal, quantity: u32) -> Decimal {
    unit_price * Decimal::from(quantity)
}

/// Formats an amount with exactly two decimal places, rounding half away from zero.
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

    format!("{rounded:.2}")
}

/// Formats an amount prefixed with the currency code, e.g. `EUR 389.97`.
pub fn format_price(amount: Decimal) -> String {
    format!("{CURRENCY_CODE} {}", format_amount(amount))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_whole_amounts_to_two_places() {
        assert_eq!(format_amount(Decimal::new(129, 0)), "129.00");
    }

    #[test]
    fn rounds_extra_precision() {
        assert_eq!(format_amount(Decimal::new(10_005, 3)), "10.01");
        assert_eq!(format_amount(Decimal::new(10_004, 3)), "10.00");
    }

    #[test]
    fn line_total_multiplies_by_quantity() {
        assert_eq!(line_total(Decimal::new(129_99, 2), 3), Decimal::new(389_97, 2));
    }

    #[test]
    fn price_carries_currency_code() {
        assert_eq!(format_price(Decimal::new(899, 1)), "EUR 89.90");
    }
}
