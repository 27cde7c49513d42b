//! Cart Totals

use decimal_percentage::Percentage;
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::{cart::item::CartItem, money::percent_of_minor};

/// Tax relief (Gift Aid) rate added on top of eligible donations.
pub const RELIEF_RATE: f64 = 0.25;

/// Errors that can occur while calculating cart totals.
#[derive(Debug, Error, PartialEq)]
pub enum TotalsError {
    /// The relief calculation could not be represented.
    #[error("relief calculation overflowed")]
    PercentConversion,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Totals derived from the cart lines and the relief flag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CartTotals {
    /// Sum of all line totals.
    pub subtotal: Money<'static, Currency>,

    /// Relief claimed on the subtotal, zero when relief is disabled.
    pub relief_amount: Money<'static, Currency>,

    /// Amount charged to the payer.
    pub grand_total: Money<'static, Currency>,

    /// Amount received by the charity (`subtotal + relief_amount`).
    pub charity_total: Money<'static, Currency>,

    /// Number of lines (not the sum of quantities).
    pub item_count: usize,
}

impl CartTotals {
    /// All-zero totals in `currency`.
    pub fn zero(currency: &'static Currency) -> Self {
        let zero = Money::from_minor(0, currency);

        Self {
            subtotal: zero,
            relief_amount: zero,
            grand_total: zero,
            charity_total: zero,
            item_count: 0,
        }
    }

    /// Compute totals for `items`, applying `relief_rate` when given.
    ///
    /// # Errors
    ///
    /// - [`TotalsError::Money`]: a line is in another currency.
    /// - [`TotalsError::PercentConversion`]: the relief amount overflowed.
    pub fn compute(
        items: &[CartItem],
        currency: &'static Currency,
        relief_rate: Option<&Percentage>,
    ) -> Result<Self, TotalsError> {
        let subtotal = items
            .iter()
            .try_fold(Money::from_minor(0, currency), |acc, item| {
                acc.add(*item.total())
            })?;

        let relief_minor = match relief_rate {
            Some(rate) => percent_of_minor(rate, subtotal.to_minor_units())
                .ok_or(TotalsError::PercentConversion)?,
            None => 0,
        };

        let relief_amount = Money::from_minor(relief_minor, currency);

        Ok(Self {
            subtotal,
            relief_amount,
            grand_total: subtotal,
            charity_total: subtotal.add(relief_amount)?,
            item_count: items.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{GBP, USD};
    use testresult::TestResult;

    use crate::cart::item::NewCartItem;

    use super::*;

    fn line(minor: i64, quantity: i64) -> Result<CartItem, crate::cart::item::InvalidItem> {
        CartItem::validate(
            NewCartItem::new("general", Money::from_minor(minor, GBP)).with_quantity(quantity),
            GBP,
        )
    }

    #[test]
    fn empty_items_give_zero_totals() -> TestResult {
        let totals = CartTotals::compute(&[], GBP, Some(&Percentage::from(RELIEF_RATE)))?;

        assert_eq!(totals, CartTotals::zero(GBP));

        Ok(())
    }

    #[test]
    fn subtotal_sums_line_totals() -> TestResult {
        let items = [line(1000, 2)?, line(1500, 1)?];
        let totals = CartTotals::compute(&items, GBP, None)?;

        assert_eq!(totals.subtotal, Money::from_minor(3500, GBP));
        assert_eq!(totals.relief_amount, Money::from_minor(0, GBP));
        assert_eq!(totals.charity_total, totals.grand_total);
        assert_eq!(totals.item_count, 2);

        Ok(())
    }

    #[test]
    fn relief_is_rounded_to_minor_units() -> TestResult {
        // 0.25 * 1.01 = 0.2525
        let items = [line(101, 1)?];
        let totals = CartTotals::compute(&items, GBP, Some(&Percentage::from(RELIEF_RATE)))?;

        assert_eq!(totals.relief_amount, Money::from_minor(25, GBP));
        assert_eq!(totals.charity_total, Money::from_minor(126, GBP));
        assert_eq!(totals.grand_total, Money::from_minor(101, GBP));

        Ok(())
    }

    #[test]
    fn mixed_currency_lines_are_an_error() -> TestResult {
        let items = [line(1000, 1)?];
        let result = CartTotals::compute(&items, USD, None);

        assert!(matches!(result, Err(TotalsError::Money(_))));

        Ok(())
    }
}
