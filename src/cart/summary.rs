//! Cart Summary
//!
//! Plain-text rendering of a cart for confirmation screens and the demos.

use std::io;

use tabled::{
    builder::Builder,
    settings::{Alignment, Style, object::Columns},
};
use thiserror::Error;

use crate::cart::{Cart, totals::CartTotals};

/// Errors that can occur when writing a summary.
#[derive(Debug, Error)]
pub enum SummaryError {
    /// Writing to the output failed.
    #[error("IO error")]
    IO(#[from] io::Error),
}

/// Cart lines plus totals, ready to be written out.
#[derive(Debug)]
pub struct CartSummary<'a> {
    cart: &'a Cart,
    totals: CartTotals,
}

impl<'a> CartSummary<'a> {
    /// Snapshot the totals of `cart` for display.
    pub fn new(cart: &'a Cart) -> Self {
        Self {
            cart,
            totals: cart.totals(),
        }
    }

    /// Totals shown in the summary.
    pub fn totals(&self) -> &CartTotals {
        &self.totals
    }

    /// Write the line table and the totals block.
    ///
    /// # Errors
    ///
    /// Returns an error if the output cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), SummaryError> {
        let mut builder = Builder::default();

        builder.push_record(["", "Category", "Date", "Unit", "Qty", "Total"]);

        for (idx, item) in self.cart.iter().enumerate() {
            builder.push_record([
                format!("#{}", idx + 1),
                item.category().to_string(),
                item.date().as_ref().map(ToString::to_string).unwrap_or_default(),
                item.unit_amount().to_string(),
                item.quantity().to_string(),
                item.total().to_string(),
            ]);
        }

        let mut table = builder.build();
        table.with(Style::modern_rounded());
        table.modify(Columns::new(3..6), Alignment::right());

        writeln!(out, "{table}")?;

        let mut lines = vec![("Subtotal:", self.totals.subtotal.to_string())];

        if self.cart.relief_enabled() {
            lines.push(("Gift Aid:", self.totals.relief_amount.to_string()));
            lines.push(("Charity receives:", self.totals.charity_total.to_string()));
        }

        lines.push(("Total:", self.totals.grand_total.to_string()));

        let label_width = lines.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
        let value_width = lines.iter().map(|(_, value)| value.len()).max().unwrap_or(0);

        for (label, value) in lines {
            writeln!(out, " {label:>label_width$}  {value:>value_width$}")?;
        }

        Ok(())
    }
}
